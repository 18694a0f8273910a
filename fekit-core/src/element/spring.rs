//! Linear spring element.
//!
//! Two nodes with one DOF each. The stiffness is `k·[[1, -1], [-1, 1]]`
//! regardless of geometry, so the same element serves for axial bars along a
//! line and for analog quantities (thermal conductance, hydraulic resistance).

use crate::element::{check_displacements, Element};
use crate::error::{Error, Result};
use crate::types::Point2;
use nalgebra::DMatrix;

/// Spring with stiffness `k` (or an analog quantity).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    stiffness: f64,
}

impl Spring {
    /// Create a spring.
    ///
    /// # Errors
    ///
    /// Fails if `k` is not finite.
    pub fn new(k: f64) -> Result<Self> {
        if !k.is_finite() {
            return Err(Error::InvalidMaterial(format!("spring stiffness {} is not finite", k)));
        }
        Ok(Self { stiffness: k })
    }

    /// The 2×2 stiffness matrix; springs need no geometry.
    pub fn matrix(&self) -> DMatrix<f64> {
        let k = self.stiffness;
        DMatrix::from_row_slice(2, 2, &[k, -k, -k, k])
    }

    /// Spring force `k·(u2 - u1)`.
    pub fn force(&self, ed: &[f64]) -> Result<f64> {
        check_displacements(ed, 2)?;
        Ok(self.stiffness * (ed[1] - ed[0]))
    }
}

impl Element for Spring {
    type Load = ();
    type Output = f64;

    fn n_nodes(&self) -> usize {
        2
    }

    fn dofs_per_node(&self) -> usize {
        1
    }

    fn stiffness(&self, _coords: &[Point2]) -> Result<DMatrix<f64>> {
        Ok(self.matrix())
    }

    fn recover(&self, _coords: &[Point2], ed: &[f64], _load: Option<&()>) -> Result<f64> {
        self.force(ed)
    }
}
