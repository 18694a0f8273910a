//! Two-dimensional Euler-Bernoulli beam element.
//!
//! - 2 nodes, 3 DOFs per node (u, v, θ), 6 DOFs total
//! - Axial (`EA/L`) and bending (`12EI/L³`, `6EI/L²`, `4EI/L`, `2EI/L`) terms
//! - Distributed loads `[qx, qy]` in local beam directions
//!
//! Local quantities are rotated to global coordinates with a 6×6 block
//! rotation built from the direction cosines of the beam axis.
//!
//! # Section forces
//!
//! Recovery fits the exact displacement polynomials of the loaded beam,
//! `u(x) = a₁x + a₂ - qx·x²/(2EA)` and
//! `v(x) = b₁x³ + b₂x² + b₃x + b₄ + qy·x⁴/(24EI)`, to the local nodal values
//! and differentiates them: `N = EA·u'`, `M = EI·v''`, `V = -EI·v'''`.

use crate::element::{check_displacements, line_geometry, Element, LoadedElement};
use crate::error::{Error, Result};
use crate::types::Point2;
use nalgebra::{DMatrix, DVector, Matrix6, Vector2, Vector6};

/// Section forces sampled along a beam element.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamSectionForces {
    /// `[N V M]` per evaluation point, shape (n_points, 3).
    pub forces: DMatrix<f64>,
    /// Local displacements `[u v]` per evaluation point, shape (n_points, 2).
    pub displacements: DMatrix<f64>,
    /// Local x-coordinate of each evaluation point, from 0 to L.
    pub positions: DVector<f64>,
}

impl BeamSectionForces {
    /// Normal force at each evaluation point.
    pub fn normal(&self) -> DVector<f64> {
        self.forces.column(0).into_owned()
    }

    /// Shear force at each evaluation point.
    pub fn shear(&self) -> DVector<f64> {
        self.forces.column(1).into_owned()
    }

    /// Bending moment at each evaluation point.
    pub fn moment(&self) -> DVector<f64> {
        self.forces.column(2).into_owned()
    }
}

/// 2D beam with Young's modulus `E`, area `A` and moment of inertia `I`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beam2 {
    youngs_modulus: f64,
    area: f64,
    inertia: f64,
}

impl Beam2 {
    /// Evaluation points used by [`Element::recover`].
    pub const DEFAULT_POINTS: usize = 2;

    /// Create a beam element.
    ///
    /// # Errors
    ///
    /// Fails if `E`, `A` or `I` is not positive.
    pub fn new(youngs_modulus: f64, area: f64, inertia: f64) -> Result<Self> {
        if !(youngs_modulus > 0.0) || !(area > 0.0) || !(inertia > 0.0) {
            return Err(Error::InvalidMaterial(format!(
                "beam requires positive E, A and I, got E={}, A={}, I={}",
                youngs_modulus, area, inertia
            )));
        }
        Ok(Self {
            youngs_modulus,
            area,
            inertia,
        })
    }

    fn local_stiffness(&self, l: f64) -> Matrix6<f64> {
        let ea = self.youngs_modulus * self.area / l;
        let ei = self.youngs_modulus * self.inertia;
        let k1 = 12.0 * ei / l.powi(3);
        let k2 = 6.0 * ei / l.powi(2);
        let k3 = 4.0 * ei / l;
        let k4 = 2.0 * ei / l;

        Matrix6::new(
            ea,  0.0, 0.0, -ea, 0.0, 0.0,
            0.0, k1,  k2,  0.0, -k1, k2,
            0.0, k2,  k3,  0.0, -k2, k4,
            -ea, 0.0, 0.0, ea,  0.0, 0.0,
            0.0, -k1, -k2, 0.0, k1,  -k2,
            0.0, k2,  k4,  0.0, -k2, k3,
        )
    }

    /// Global → local rotation.
    fn rotation(n: &Point2) -> Matrix6<f64> {
        Matrix6::new(
            n.x,  n.y, 0.0, 0.0,  0.0, 0.0,
            -n.y, n.x, 0.0, 0.0,  0.0, 0.0,
            0.0,  0.0, 1.0, 0.0,  0.0, 0.0,
            0.0,  0.0, 0.0, n.x,  n.y, 0.0,
            0.0,  0.0, 0.0, -n.y, n.x, 0.0,
            0.0,  0.0, 0.0, 0.0,  0.0, 1.0,
        )
    }

    /// Section forces at `n_points` equally spaced points from node 1 to node 2.
    ///
    /// # Errors
    ///
    /// Shape error if `n_points < 2` or `ed` does not have 6 entries.
    pub fn section_forces(
        &self,
        coords: &[Point2],
        ed: &[f64],
        load: Option<&Vector2<f64>>,
        n_points: usize,
    ) -> Result<BeamSectionForces> {
        check_displacements(ed, 6)?;
        if n_points < 2 {
            return Err(Error::Shape(format!(
                "beam recovery needs at least 2 evaluation points, got {}",
                n_points
            )));
        }
        let (l, n) = line_geometry(coords)?;
        let (qx, qy) = load.map_or((0.0, 0.0), |q| (q.x, q.y));
        let ea = self.youngs_modulus * self.area;
        let ei = self.youngs_modulus * self.inertia;

        // Displacement polynomial coefficients [a₁ b₁ b₂ a₂ b₃ b₄] at the nodes.
        let c = Matrix6::new(
            0.0, 0.0,             0.0,       1.0, 0.0, 0.0,
            0.0, 0.0,             0.0,       0.0, 0.0, 1.0,
            0.0, 0.0,             0.0,       0.0, 1.0, 0.0,
            l,   0.0,             0.0,       1.0, 0.0, 0.0,
            0.0, l.powi(3),       l.powi(2), 0.0, l,   1.0,
            0.0, 3.0 * l.powi(2), 2.0 * l,   0.0, 1.0, 0.0,
        );
        let particular = Vector6::new(
            0.0,
            0.0,
            0.0,
            -qx * l.powi(2) / (2.0 * ea),
            qy * l.powi(4) / (24.0 * ei),
            qy * l.powi(3) / (6.0 * ei),
        );
        let local = Self::rotation(&n) * Vector6::from_column_slice(ed);
        let m = c
            .lu()
            .solve(&(local - particular))
            .ok_or_else(|| Error::SingularMatrix("beam shape-function matrix".into()))?;
        let (a1, a2) = (m[0], m[3]);
        let (b1, b2, b3, b4) = (m[1], m[2], m[4], m[5]);

        let mut forces = DMatrix::zeros(n_points, 3);
        let mut displacements = DMatrix::zeros(n_points, 2);
        let mut positions = DVector::zeros(n_points);

        for i in 0..n_points {
            let x = l * i as f64 / (n_points - 1) as f64;

            let u = a1 * x + a2 - x.powi(2) * qx / (2.0 * ea);
            let du = a1 - x * qx / ea;
            let v = b1 * x.powi(3) + b2 * x.powi(2) + b3 * x + b4 + x.powi(4) * qy / (24.0 * ei);
            let d2v = 6.0 * b1 * x + 2.0 * b2 + x.powi(2) * qy / (2.0 * ei);
            let d3v = 6.0 * b1 + x * qy / ei;

            forces[(i, 0)] = ea * du;
            forces[(i, 1)] = -ei * d3v;
            forces[(i, 2)] = ei * d2v;
            displacements[(i, 0)] = u;
            displacements[(i, 1)] = v;
            positions[i] = x;
        }

        Ok(BeamSectionForces {
            forces,
            displacements,
            positions,
        })
    }
}

impl Element for Beam2 {
    type Load = Vector2<f64>;
    type Output = BeamSectionForces;

    fn n_nodes(&self) -> usize {
        2
    }

    fn dofs_per_node(&self) -> usize {
        3
    }

    fn stiffness(&self, coords: &[Point2]) -> Result<DMatrix<f64>> {
        let (l, n) = line_geometry(coords)?;
        let g = Self::rotation(&n);
        let ke = g.transpose() * self.local_stiffness(l) * g;
        Ok(DMatrix::from_iterator(6, 6, ke.iter().copied()))
    }

    fn recover(&self, coords: &[Point2], ed: &[f64], load: Option<&Vector2<f64>>) -> Result<BeamSectionForces> {
        self.section_forces(coords, ed, load, Self::DEFAULT_POINTS)
    }
}

impl LoadedElement for Beam2 {
    fn stiffness_with_load(&self, coords: &[Point2], load: &Vector2<f64>) -> Result<(DMatrix<f64>, DVector<f64>)> {
        let (l, n) = line_geometry(coords)?;
        let (qx, qy) = (load.x, load.y);
        let g = Self::rotation(&n);

        let ke = g.transpose() * self.local_stiffness(l) * g;
        let fle = Vector6::new(
            qx / 2.0,
            qy / 2.0,
            qy * l / 12.0,
            qx / 2.0,
            qy / 2.0,
            -qy * l / 12.0,
        ) * l;
        let fe = g.transpose() * fle;

        Ok((
            DMatrix::from_iterator(6, 6, ke.iter().copied()),
            DVector::from_column_slice(fe.as_slice()),
        ))
    }
}
