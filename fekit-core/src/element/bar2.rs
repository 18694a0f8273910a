//! Two-dimensional bar (truss) element.
//!
//! - 2 nodes, 2 DOFs per node (u, v), 4 DOFs total
//! - Axial stiffness only: `EA/L·[[1, -1], [-1, 1]]` in the bar axis
//!
//! The axial matrix is projected onto global coordinates with
//! `G = [[nx, ny, 0, 0], [0, 0, nx, ny]]`, where `n` is the unit direction
//! from node 1 to node 2: `Ke = Gᵀ·Kle·G`.

use crate::element::{check_displacements, line_geometry, Element};
use crate::error::{Error, Result};
use crate::types::Point2;
use nalgebra::{DMatrix, Matrix2, Matrix2x4, Vector4};

/// 2D bar with Young's modulus `E` and cross-section area `A`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar2 {
    youngs_modulus: f64,
    area: f64,
}

impl Bar2 {
    /// Create a bar element.
    ///
    /// # Errors
    ///
    /// Fails if `E` or `A` is not positive.
    pub fn new(youngs_modulus: f64, area: f64) -> Result<Self> {
        if !(youngs_modulus > 0.0) || !(area > 0.0) {
            return Err(Error::InvalidMaterial(format!(
                "bar requires positive E and A, got E={}, A={}",
                youngs_modulus, area
            )));
        }
        Ok(Self {
            youngs_modulus,
            area,
        })
    }

    /// Axial stiffness `EA/L` and the 2×4 projection matrix `G`.
    fn axial(&self, coords: &[Point2]) -> Result<(f64, Matrix2x4<f64>)> {
        let (length, n) = line_geometry(coords)?;
        let g = Matrix2x4::new(
            n.x, n.y, 0.0, 0.0,
            0.0, 0.0, n.x, n.y,
        );
        Ok((self.youngs_modulus * self.area / length, g))
    }

    /// Normal force, positive in tension: `EA/L·[-1, 1]·G·u`.
    pub fn normal_force(&self, coords: &[Point2], ed: &[f64]) -> Result<f64> {
        check_displacements(ed, 4)?;
        let (k, g) = self.axial(coords)?;
        let u = Vector4::from_column_slice(ed);
        let local = g * u;
        Ok(k * (local[1] - local[0]))
    }
}

impl Element for Bar2 {
    type Load = ();
    type Output = f64;

    fn n_nodes(&self) -> usize {
        2
    }

    fn dofs_per_node(&self) -> usize {
        2
    }

    fn stiffness(&self, coords: &[Point2]) -> Result<DMatrix<f64>> {
        let (k, g) = self.axial(coords)?;
        let kle = Matrix2::new(1.0, -1.0, -1.0, 1.0) * k;
        let ke = g.transpose() * kle * g;
        Ok(DMatrix::from_iterator(4, 4, ke.iter().copied()))
    }

    fn recover(&self, coords: &[Point2], ed: &[f64], _load: Option<&()>) -> Result<f64> {
        self.normal_force(coords, ed)
    }
}
