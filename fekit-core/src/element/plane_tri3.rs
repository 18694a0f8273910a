//! Three-node triangle for plane stress and plane strain.
//!
//! - 3 nodes, 2 DOFs per node (u, v), 6 DOFs total
//! - Constant strain over the element (CST)
//!
//! The displacement field `u = α₁ + α₂x + α₃y`, `v = α₄ + α₅x + α₆y` is
//! fitted to the nodal values through the 6×6 coordinate matrix `C`; strains
//! follow from `B = S·C⁻¹` where `S` selects `[α₂, α₆, α₃ + α₅]`.
//!
//! # Constitutive matrix
//!
//! D may be given as the 3×3 in-plane matrix or as the 4×4 (plane strain /
//! axisymmetric) or 6×6 (3D) matrix from [`crate::material::hooke`]. The larger
//! forms are reduced to the in-plane components `[σxx, σyy, τxy]`:
//!
//! - plane stress: `Dm = inv(inv(D)[(0,1,3),(0,1,3)])` (σzz = 0)
//! - plane strain: `Dm = D[(0,1,3),(0,1,3)]` (εzz = 0)

use crate::element::{check_displacements, check_nodes, triangle_area, Element, LoadedElement};
use crate::error::{Error, Result};
use crate::types::Point2;
use nalgebra::{DMatrix, DVector, Matrix3, Matrix3x6, Matrix6, Vector2, Vector3, Vector6};

/// In-plane component indices in the 4×4 and 6×6 constitutive matrices.
const IN_PLANE: [usize; 3] = [0, 1, 3];

/// Plane analysis assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneAnalysis {
    /// σzz = 0 (thin plates).
    Stress,
    /// εzz = 0 (thick, long bodies).
    Strain,
}

impl TryFrom<i32> for PlaneAnalysis {
    type Error = Error;

    /// 1 plane stress, 2 plane strain.
    fn try_from(code: i32) -> Result<Self> {
        match code {
            1 => Ok(PlaneAnalysis::Stress),
            2 => Ok(PlaneAnalysis::Strain),
            other => Err(Error::UnsupportedAnalysisType(other)),
        }
    }
}

/// Stresses and strains in one element.
///
/// With a 3×3 D: `[σxx, σyy, τxy]` and `[εxx, εyy, γxy]`.
/// With a 4×4 or 6×6 D: `[σxx, σyy, σzz, τxy]` and `[εxx, εyy, εzz, γxy]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneResult {
    pub stress: DVector<f64>,
    pub strain: DVector<f64>,
}

/// Constant strain triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneTri3 {
    analysis: PlaneAnalysis,
    thickness: f64,
    /// Constitutive matrix as given.
    d: DMatrix<f64>,
    /// In-plane constitutive matrix.
    dm: Matrix3<f64>,
}

fn select3(m: &DMatrix<f64>) -> Matrix3<f64> {
    Matrix3::from_fn(|i, j| m[(IN_PLANE[i], IN_PLANE[j])])
}

impl PlaneTri3 {
    /// Create a triangle element.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidMaterial`] if the thickness is not positive
    /// - [`Error::Shape`] if D is not 3×3, 4×4 or 6×6
    /// - [`Error::SingularMatrix`] if a plane stress reduction cannot invert D
    pub fn new(analysis: PlaneAnalysis, thickness: f64, d: DMatrix<f64>) -> Result<Self> {
        if !(thickness > 0.0) {
            return Err(Error::InvalidMaterial(format!(
                "thickness must be positive, got {}",
                thickness
            )));
        }

        let dm = match (d.shape(), analysis) {
            ((3, 3), _) => Matrix3::from_fn(|i, j| d[(i, j)]),
            ((4, 4), PlaneAnalysis::Strain) | ((6, 6), PlaneAnalysis::Strain) => select3(&d),
            ((4, 4), PlaneAnalysis::Stress) | ((6, 6), PlaneAnalysis::Stress) => {
                let compliance = d
                    .clone()
                    .try_inverse()
                    .ok_or_else(|| Error::SingularMatrix("constitutive matrix".into()))?;
                select3(&compliance)
                    .try_inverse()
                    .ok_or_else(|| Error::SingularMatrix("in-plane compliance".into()))?
            }
            ((rows, cols), _) => {
                return Err(Error::Shape(format!(
                    "constitutive matrix must be 3x3, 4x4 or 6x6, got {}x{}",
                    rows, cols
                )))
            }
        };

        Ok(Self {
            analysis,
            thickness,
            d,
            dm,
        })
    }

    /// The reduced in-plane constitutive matrix.
    pub fn in_plane_constitutive(&self) -> &Matrix3<f64> {
        &self.dm
    }

    /// Strain-displacement matrix (3×6) and element area.
    fn b_matrix(coords: &[Point2]) -> Result<(Matrix3x6<f64>, f64)> {
        check_nodes(coords, 3)?;
        let area = triangle_area(coords)?;

        let (x1, y1) = (coords[0].x, coords[0].y);
        let (x2, y2) = (coords[1].x, coords[1].y);
        let (x3, y3) = (coords[2].x, coords[2].y);
        let c = Matrix6::new(
            1.0, x1,  y1,  0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, x1,  y1,
            1.0, x2,  y2,  0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, x2,  y2,
            1.0, x3,  y3,  0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, x3,  y3,
        );
        let c_inv = c
            .try_inverse()
            .ok_or_else(|| Error::SingularMatrix("triangle coordinate matrix".into()))?;

        let select = Matrix3x6::new(
            0.0, 1.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0, 1.0,
            0.0, 0.0, 1.0, 0.0, 1.0, 0.0,
        );
        Ok((select * c_inv, area))
    }
}

impl Element for PlaneTri3 {
    /// Body force `[bx, by]` per unit volume.
    type Load = Vector2<f64>;
    type Output = PlaneResult;

    fn n_nodes(&self) -> usize {
        3
    }

    fn dofs_per_node(&self) -> usize {
        2
    }

    fn stiffness(&self, coords: &[Point2]) -> Result<DMatrix<f64>> {
        let (b, area) = Self::b_matrix(coords)?;
        let ke = b.transpose() * self.dm * b * (area * self.thickness);
        Ok(DMatrix::from_iterator(6, 6, ke.iter().copied()))
    }

    fn recover(&self, coords: &[Point2], ed: &[f64], _load: Option<&Vector2<f64>>) -> Result<PlaneResult> {
        check_displacements(ed, 6)?;
        let (b, _) = Self::b_matrix(coords)?;
        let strain: Vector3<f64> = b * Vector6::from_column_slice(ed);
        let stress: Vector3<f64> = self.dm * strain;

        if self.d.nrows() == 3 {
            return Ok(PlaneResult {
                stress: DVector::from_column_slice(stress.as_slice()),
                strain: DVector::from_column_slice(strain.as_slice()),
            });
        }

        let (stress, strain) = match self.analysis {
            PlaneAnalysis::Stress => {
                let compliance = self
                    .d
                    .clone()
                    .try_inverse()
                    .ok_or_else(|| Error::SingularMatrix("constitutive matrix".into()))?;
                let ezz = (0..3)
                    .map(|k| compliance[(2, IN_PLANE[k])] * stress[k])
                    .sum::<f64>();
                (
                    [stress[0], stress[1], 0.0, stress[2]],
                    [strain[0], strain[1], ezz, strain[2]],
                )
            }
            PlaneAnalysis::Strain => {
                let szz = (0..3)
                    .map(|k| self.d[(2, IN_PLANE[k])] * strain[k])
                    .sum::<f64>();
                (
                    [stress[0], stress[1], szz, stress[2]],
                    [strain[0], strain[1], 0.0, strain[2]],
                )
            }
        };

        Ok(PlaneResult {
            stress: DVector::from_column_slice(&stress),
            strain: DVector::from_column_slice(&strain),
        })
    }
}

impl LoadedElement for PlaneTri3 {
    fn stiffness_with_load(&self, coords: &[Point2], body_force: &Vector2<f64>) -> Result<(DMatrix<f64>, DVector<f64>)> {
        let ke = self.stiffness(coords)?;
        let area = triangle_area(coords)?;
        let (bx, by) = (body_force.x, body_force.y);
        let fe = DVector::from_column_slice(&[bx, by, bx, by, bx, by]) * (area / 3.0 * self.thickness);
        Ok((ke, fe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::hooke;
    use approx::assert_relative_eq;

    const E: f64 = 210e9;
    const NU: f64 = 0.3;

    fn triangle() -> Vec<Point2> {
        vec![Point2::new(0.0, 0.0), Point2::new(2.0, 0.5), Point2::new(0.5, 1.5)]
    }

    fn assert_matrices_close(a: &DMatrix<f64>, b: &DMatrix<f64>) {
        assert_eq!(a.shape(), b.shape());
        let scale = a.amax();
        for i in 0..a.nrows() {
            for j in 0..a.ncols() {
                assert_relative_eq!(a[(i, j)], b[(i, j)], epsilon = 1e-10 * scale);
            }
        }
    }

    #[test]
    fn test_stiffness_symmetric_with_rigid_modes() {
        let elem = PlaneTri3::new(PlaneAnalysis::Stress, 0.01, hooke(1, E, NU).unwrap()).unwrap();
        let coords = triangle();
        let ke = elem.stiffness(&coords).unwrap();
        assert_matrices_close(&ke, &ke.transpose());

        // Two translations and an infinitesimal rotation carry no force.
        let modes = [
            [1.0, 0.0, 1.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
            [
                -coords[0].y, coords[0].x,
                -coords[1].y, coords[1].x,
                -coords[2].y, coords[2].x,
            ],
        ];
        for mode in modes {
            let f = &ke * DVector::from_column_slice(&mode);
            assert!(f.norm() < 1e-9 * ke.amax(), "rigid mode produces force {}", f.norm());
        }
        assert_eq!(ke.rank(1e-9 * ke.amax()), 3);
    }

    #[test]
    fn test_plane_stress_reduction_from_3d() {
        let coords = triangle();
        let direct = PlaneTri3::new(PlaneAnalysis::Stress, 1.0, hooke(1, E, NU).unwrap()).unwrap();
        let reduced = PlaneTri3::new(PlaneAnalysis::Stress, 1.0, hooke(4, E, NU).unwrap()).unwrap();

        assert_matrices_close(
            &direct.stiffness(&coords).unwrap(),
            &reduced.stiffness(&coords).unwrap(),
        );
    }

    #[test]
    fn test_plane_strain_selects_in_plane_terms() {
        let d = hooke(2, E, NU).unwrap();
        let elem = PlaneTri3::new(PlaneAnalysis::Strain, 1.0, d.clone()).unwrap();
        let dm = elem.in_plane_constitutive();
        assert_eq!(dm[(0, 0)], d[(0, 0)]);
        assert_eq!(dm[(0, 1)], d[(0, 1)]);
        assert_eq!(dm[(2, 2)], d[(3, 3)]);
        assert_eq!(dm[(0, 2)], 0.0);
    }

    #[test]
    fn test_uniform_strain_patch() {
        let d = hooke(1, 1e6, 0.25).unwrap();
        let elem = PlaneTri3::new(PlaneAnalysis::Stress, 1.0, d.clone()).unwrap();
        let coords = triangle();
        // u = 0.001·x, v = 0
        let ed: Vec<f64> = coords.iter().flat_map(|p| [1e-3 * p.x, 0.0]).collect();

        let result = elem.recover(&coords, &ed, None).unwrap();
        assert_eq!(result.stress.len(), 3);
        assert_relative_eq!(result.strain[0], 1e-3, epsilon = 1e-14);
        assert_relative_eq!(result.strain[1], 0.0, epsilon = 1e-14);
        assert_relative_eq!(result.stress[0], d[(0, 0)] * 1e-3, max_relative = 1e-10);
        assert_relative_eq!(result.stress[1], d[(1, 0)] * 1e-3, max_relative = 1e-10);
        assert_relative_eq!(result.stress[2], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_plane_strain_out_of_plane_stress() {
        let elem = PlaneTri3::new(PlaneAnalysis::Strain, 1.0, hooke(2, E, NU).unwrap()).unwrap();
        let coords = triangle();
        let ed: Vec<f64> = coords.iter().flat_map(|p| [1e-4 * p.x, -2e-4 * p.y]).collect();

        let result = elem.recover(&coords, &ed, None).unwrap();
        assert_eq!(result.stress.len(), 4);
        assert_eq!(result.strain[2], 0.0);
        // σzz = ν(σxx + σyy)
        assert_relative_eq!(
            result.stress[2],
            NU * (result.stress[0] + result.stress[1]),
            max_relative = 1e-10
        );
    }

    #[test]
    fn test_plane_stress_out_of_plane_strain() {
        let elem = PlaneTri3::new(PlaneAnalysis::Stress, 1.0, hooke(4, E, NU).unwrap()).unwrap();
        let coords = triangle();
        let ed: Vec<f64> = coords.iter().flat_map(|p| [1e-4 * p.x, 0.0]).collect();

        let result = elem.recover(&coords, &ed, None).unwrap();
        assert_eq!(result.stress[2], 0.0);
        // εzz = -ν(σxx + σyy)/E
        assert_relative_eq!(
            result.strain[2],
            -NU * (result.stress[0] + result.stress[1]) / E,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_body_force_load_vector() {
        let elem = PlaneTri3::new(PlaneAnalysis::Stress, 0.1, hooke(1, E, NU).unwrap()).unwrap();
        let coords = vec![Point2::new(0.0, 0.0), Point2::new(3.0, 0.0), Point2::new(0.0, 2.0)];
        let (_, fe) = elem
            .stiffness_with_load(&coords, &Vector2::new(0.0, -9810.0))
            .unwrap();
        // A = 3, t = 0.1
        for node in 0..3 {
            assert_relative_eq!(fe[2 * node], 0.0);
            assert_relative_eq!(fe[2 * node + 1], -9810.0 * 3.0 / 3.0 * 0.1, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_invalid_constitutive_shape() {
        let result = PlaneTri3::new(PlaneAnalysis::Stress, 1.0, DMatrix::identity(5, 5));
        assert!(matches!(result, Err(Error::Shape(_))));
    }

    #[test]
    fn test_analysis_code() {
        assert_eq!(PlaneAnalysis::try_from(2).unwrap(), PlaneAnalysis::Strain);
        assert!(matches!(
            PlaneAnalysis::try_from(3),
            Err(Error::UnsupportedAnalysisType(3))
        ));
    }
}
