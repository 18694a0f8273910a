//! Three-node triangle for scalar field problems (heat flow, seepage, ...).
//!
//! - 3 nodes, 1 DOF per node, 3 DOFs total
//! - Linear shape functions, constant gradient `B` over the element
//!
//! `B = [[0, 1, 0], [0, 0, 1]]·C⁻¹` with `C = [[1, x1, y1], [1, x2, y2],
//! [1, x3, y3]]`; the stiffness is `Ke = Bᵀ·D·B·t·A` and a uniform supply `Q`
//! gives `fe = [1, 1, 1]ᵀ·Q·A·t/3`. Flux follows Fourier's law, `q = -D·∇u`.

use crate::element::{
    check_displacements, check_nodes, triangle_area, triangle_coordinate_matrix, Element, LoadedElement,
};
use crate::error::{Error, Result};
use crate::types::Point2;
use nalgebra::{DMatrix, DVector, Matrix2, Matrix2x3, Vector2, Vector3};

/// Flux and gradient in one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowResult {
    /// Flux `-D·B·u`.
    pub flow: Vector2<f64>,
    /// Gradient `B·u`.
    pub gradient: Vector2<f64>,
}

/// Triangular field element with thickness `t` and conductivity matrix `D`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowTri3 {
    thickness: f64,
    conductivity: Matrix2<f64>,
}

impl FlowTri3 {
    /// Create a flow element.
    ///
    /// # Errors
    ///
    /// Fails if the thickness is not positive.
    pub fn new(thickness: f64, conductivity: Matrix2<f64>) -> Result<Self> {
        if !(thickness > 0.0) {
            return Err(Error::InvalidMaterial(format!(
                "thickness must be positive, got {}",
                thickness
            )));
        }
        Ok(Self {
            thickness,
            conductivity,
        })
    }

    /// Element with isotropic conductivity `D = k·I`.
    pub fn isotropic(thickness: f64, k: f64) -> Result<Self> {
        Self::new(thickness, Matrix2::identity() * k)
    }

    /// Gradient matrix `B` (2×3) and element area.
    fn gradient_matrix(coords: &[Point2]) -> Result<(Matrix2x3<f64>, f64)> {
        check_nodes(coords, 3)?;
        let area = triangle_area(coords)?;
        let c_inv = triangle_coordinate_matrix(coords)
            .try_inverse()
            .ok_or_else(|| Error::SingularMatrix("triangle coordinate matrix".into()))?;
        let select = Matrix2x3::new(
            0.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
        );
        Ok((select * c_inv, area))
    }

    /// Flux and gradient for every element of a batch.
    ///
    /// `ed` holds one row of nodal values per element. Returns the flows and
    /// gradients as `[n_elements x 2]` matrices, row `e` belonging to element
    /// `e`.
    pub fn flows(&self, coords: &[Vec<Point2>], ed: &DMatrix<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        let results = self.recover_batch(coords, ed, None)?;
        let mut flows = DMatrix::zeros(results.len(), 2);
        let mut gradients = DMatrix::zeros(results.len(), 2);
        for (e, r) in results.iter().enumerate() {
            flows.set_row(e, &r.flow.transpose());
            gradients.set_row(e, &r.gradient.transpose());
        }
        Ok((flows, gradients))
    }
}

impl Element for FlowTri3 {
    /// Supply per unit volume.
    type Load = f64;
    type Output = FlowResult;

    fn n_nodes(&self) -> usize {
        3
    }

    fn dofs_per_node(&self) -> usize {
        1
    }

    fn stiffness(&self, coords: &[Point2]) -> Result<DMatrix<f64>> {
        let (b, area) = Self::gradient_matrix(coords)?;
        let ke = b.transpose() * self.conductivity * b * (self.thickness * area);
        Ok(DMatrix::from_iterator(3, 3, ke.iter().copied()))
    }

    /// Flux and gradient for a single element; the supply does not enter.
    fn recover(&self, coords: &[Point2], ed: &[f64], _load: Option<&f64>) -> Result<FlowResult> {
        check_displacements(ed, 3)?;
        let (b, _) = Self::gradient_matrix(coords)?;
        let gradient = b * Vector3::from_column_slice(ed);
        Ok(FlowResult {
            flow: -(self.conductivity * gradient),
            gradient,
        })
    }
}

impl LoadedElement for FlowTri3 {
    fn stiffness_with_load(&self, coords: &[Point2], supply: &f64) -> Result<(DMatrix<f64>, DVector<f64>)> {
        let ke = self.stiffness(coords)?;
        let area = triangle_area(coords)?;
        let fe = DVector::from_element(3, supply * area * self.thickness / 3.0);
        Ok((ke, fe))
    }
}
