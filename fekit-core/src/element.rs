//! Element trait and implementations.
//!
//! Every element type computes its stiffness matrix from nodal coordinates and
//! recovers element-level quantities (forces, stresses, flows) from element
//! displacements. Elements with distributed loads also implement
//! [`LoadedElement`] to produce the equivalent nodal load vector.
//!
//! # Submodules
//!
//! - [`spring`] - 1D spring, 2 DOFs
//! - [`bar2`] - 2D bar (truss) element, 4 DOFs
//! - [`beam2`] - 2D Euler-Bernoulli beam, 6 DOFs
//! - [`flow_tri3`] - 3-node triangle for heat flow and other scalar fields
//! - [`plane_tri3`] - 3-node triangle for plane stress / plane strain

use crate::error::{Error, Result};
use crate::types::Point2;
use nalgebra::{DMatrix, DVector, Matrix3};

pub mod bar2;
pub mod beam2;
pub mod flow_tri3;
pub mod plane_tri3;
pub mod spring;

pub use bar2::Bar2;
pub use beam2::{Beam2, BeamSectionForces};
pub use flow_tri3::{FlowTri3, FlowResult};
pub use plane_tri3::{PlaneAnalysis, PlaneResult, PlaneTri3};
pub use spring::Spring;

/// Finite element interface.
///
/// Elements must be thread-safe (Send + Sync) to enable parallel assembly.
pub trait Element: Send + Sync {
    /// Distributed load type (`()` for elements without one).
    type Load;

    /// Quantity recovered from element displacements.
    type Output;

    /// Number of nodes in this element.
    fn n_nodes(&self) -> usize;

    /// Degrees of freedom per node.
    fn dofs_per_node(&self) -> usize;

    /// Total degrees of freedom for this element.
    fn n_dofs(&self) -> usize {
        self.n_nodes() * self.dofs_per_node()
    }

    /// Compute the element stiffness matrix.
    ///
    /// # Arguments
    ///
    /// * `coords` - Nodal coordinates, one point per node
    ///
    /// # Returns
    ///
    /// Dense stiffness matrix of shape (n_dofs, n_dofs)
    fn stiffness(&self, coords: &[Point2]) -> Result<DMatrix<f64>>;

    /// Recover element quantities from element displacements.
    ///
    /// # Arguments
    ///
    /// * `coords` - Nodal coordinates
    /// * `ed` - Element displacement vector (length = n_dofs)
    /// * `load` - Distributed load used in the stiffness computation, if any
    fn recover(&self, coords: &[Point2], ed: &[f64], load: Option<&Self::Load>) -> Result<Self::Output>;

    /// Recover quantities for a batch of elements sharing these properties.
    ///
    /// `ed` holds one element displacement row per entry of `coords`.
    fn recover_batch(
        &self,
        coords: &[Vec<Point2>],
        ed: &DMatrix<f64>,
        load: Option<&Self::Load>,
    ) -> Result<Vec<Self::Output>> {
        if coords.len() != ed.nrows() {
            return Err(Error::Shape(format!(
                "{} element coordinate sets, {} displacement rows",
                coords.len(),
                ed.nrows()
            )));
        }
        coords
            .iter()
            .enumerate()
            .map(|(e, xy)| {
                let row: Vec<f64> = ed.row(e).iter().copied().collect();
                self.recover(xy, &row, load).map_err(|err| err.in_element(e))
            })
            .collect()
    }
}

/// Elements that turn a distributed load into equivalent nodal loads.
pub trait LoadedElement: Element {
    /// Compute the stiffness matrix and the element load vector.
    fn stiffness_with_load(&self, coords: &[Point2], load: &Self::Load) -> Result<(DMatrix<f64>, DVector<f64>)>;
}

/// Check the number of nodal points handed to a kernel.
pub(crate) fn check_nodes(coords: &[Point2], expected: usize) -> Result<()> {
    if coords.len() != expected {
        return Err(Error::Shape(format!(
            "element requires {} nodal coordinates, got {}",
            expected,
            coords.len()
        )));
    }
    Ok(())
}

/// Check the length of an element displacement vector.
pub(crate) fn check_displacements(ed: &[f64], expected: usize) -> Result<()> {
    if ed.len() != expected {
        return Err(Error::Shape(format!(
            "element requires {} displacement DOFs, got {}",
            expected,
            ed.len()
        )));
    }
    Ok(())
}

/// Length and unit direction (cosines) of a two-node line element.
pub(crate) fn line_geometry(coords: &[Point2]) -> Result<(f64, Point2)> {
    check_nodes(coords, 2)?;
    let delta = coords[1] - coords[0];
    let length = delta.norm();
    let scale = coords[0].amax().max(coords[1].amax()).max(1.0);
    if !(length > f64::EPSILON * scale) {
        return Err(Error::ZeroLength);
    }
    Ok((length, delta / length))
}

/// Coordinate matrix `[[1, x1, y1], [1, x2, y2], [1, x3, y3]]` of a triangle.
pub(crate) fn triangle_coordinate_matrix(coords: &[Point2]) -> Matrix3<f64> {
    Matrix3::new(
        1.0, coords[0].x, coords[0].y,
        1.0, coords[1].x, coords[1].y,
        1.0, coords[2].x, coords[2].y,
    )
}

/// Area of a triangle, half the determinant of its coordinate matrix.
///
/// Nodes must be ordered counter-clockwise. Collinear nodes give
/// [`Error::DegenerateArea`]; clockwise order gives [`Error::InvertedElement`].
pub(crate) fn triangle_area(coords: &[Point2]) -> Result<f64> {
    check_nodes(coords, 3)?;
    let area = 0.5 * triangle_coordinate_matrix(coords).determinant();

    let longest = (0..3)
        .map(|i| (coords[(i + 1) % 3] - coords[i]).norm())
        .fold(0.0, f64::max);
    if area.abs() <= 1e-12 * longest * longest || !area.is_finite() {
        return Err(Error::DegenerateArea { area });
    }
    if area < 0.0 {
        return Err(Error::InvertedElement { area });
    }
    Ok(area)
}
