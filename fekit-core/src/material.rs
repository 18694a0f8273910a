//! Isotropic linear elastic material law.
//!
//! [`hooke`] produces the constitutive matrix D for one of four analysis
//! types. Stress/strain component ordering:
//!
//! | analysis           | size | components                          |
//! |--------------------|------|-------------------------------------|
//! | plane stress       | 3×3  | σxx σyy τxy                          |
//! | plane strain       | 4×4  | σxx σyy σzz τxy                      |
//! | axisymmetric       | 4×4  | σrr σzz σθθ τrz                      |
//! | three dimensional  | 6×6  | σxx σyy σzz τxy τxz τyz              |

use crate::error::{Error, Result};
use nalgebra::DMatrix;

/// Analysis type selecting the shape of the constitutive matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisType {
    PlaneStress,
    PlaneStrain,
    Axisymmetric,
    ThreeDimensional,
}

impl AnalysisType {
    /// Number of stress components (rows of D).
    pub fn n_components(self) -> usize {
        match self {
            AnalysisType::PlaneStress => 3,
            AnalysisType::PlaneStrain | AnalysisType::Axisymmetric => 4,
            AnalysisType::ThreeDimensional => 6,
        }
    }
}

impl TryFrom<i32> for AnalysisType {
    type Error = Error;

    /// Numeric codes: 1 plane stress, 2 plane strain, 3 axisymmetric, 4 3D.
    fn try_from(code: i32) -> Result<Self> {
        match code {
            1 => Ok(AnalysisType::PlaneStress),
            2 => Ok(AnalysisType::PlaneStrain),
            3 => Ok(AnalysisType::Axisymmetric),
            4 => Ok(AnalysisType::ThreeDimensional),
            other => Err(Error::UnsupportedAnalysisType(other)),
        }
    }
}

/// Material properties for structural analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Young's modulus.
    pub youngs_modulus: f64,
    /// Poisson's ratio (dimensionless).
    pub poissons_ratio: f64,
}

impl Material {
    /// Create a new isotropic linear elastic material.
    ///
    /// # Arguments
    ///
    /// * `youngs_modulus` - Young's modulus E
    /// * `poissons_ratio` - Poisson's ratio ν (dimensionless, -1 < ν ≤ 0.5)
    ///
    /// ν = 0.5 (incompressible) is accepted here; only the laws that divide
    /// by `1 - 2ν` reject it, see [`Material::constitutive`].
    ///
    /// # Errors
    ///
    /// Returns error if material properties are physically invalid.
    pub fn new(youngs_modulus: f64, poissons_ratio: f64) -> Result<Self> {
        if !(youngs_modulus > 0.0) {
            return Err(Error::InvalidMaterial(
                "Young's modulus must be positive".into(),
            ));
        }
        if !(poissons_ratio > -1.0 && poissons_ratio <= 0.5) {
            return Err(Error::InvalidMaterial(
                "Poisson's ratio must be in range (-1, 0.5]".into(),
            ));
        }
        Ok(Self {
            youngs_modulus,
            poissons_ratio,
        })
    }

    /// Constitutive matrix for the given analysis type.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidMaterial`] for ν = 0.5 with plane strain,
    /// axisymmetric or 3D analysis, where `1 - 2ν` vanishes.
    pub fn constitutive(&self, analysis: AnalysisType) -> Result<DMatrix<f64>> {
        let e = self.youngs_modulus;
        let v = self.poissons_ratio;

        if analysis != AnalysisType::PlaneStress && !(1.0 - 2.0 * v > 0.0) {
            return Err(Error::InvalidMaterial(format!(
                "Poisson's ratio {} is incompressible; {:?} needs ν < 0.5",
                v, analysis
            )));
        }

        let d = match analysis {
            AnalysisType::PlaneStress => {
                let factor = e / (1.0 - v * v);
                DMatrix::from_row_slice(3, 3, &[
                    factor,      factor * v, 0.0,
                    factor * v,  factor,     0.0,
                    0.0,         0.0,        factor * (1.0 - v) / 2.0,
                ])
            }
            AnalysisType::PlaneStrain | AnalysisType::Axisymmetric => {
                let factor = e / ((1.0 + v) * (1.0 - 2.0 * v));
                let c11 = factor * (1.0 - v);
                let c12 = factor * v;
                let c44 = factor * (1.0 - 2.0 * v) / 2.0;
                DMatrix::from_row_slice(4, 4, &[
                    c11, c12, c12, 0.0,
                    c12, c11, c12, 0.0,
                    c12, c12, c11, 0.0,
                    0.0, 0.0, 0.0, c44,
                ])
            }
            AnalysisType::ThreeDimensional => {
                let factor = e / ((1.0 + v) * (1.0 - 2.0 * v));
                let c11 = factor * (1.0 - v);
                let c12 = factor * v;
                let c44 = factor * (1.0 - 2.0 * v) / 2.0; // = G
                DMatrix::from_row_slice(6, 6, &[
                    c11, c12, c12, 0.0, 0.0, 0.0,
                    c12, c11, c12, 0.0, 0.0, 0.0,
                    c12, c12, c11, 0.0, 0.0, 0.0,
                    0.0, 0.0, 0.0, c44, 0.0, 0.0,
                    0.0, 0.0, 0.0, 0.0, c44, 0.0,
                    0.0, 0.0, 0.0, 0.0, 0.0, c44,
                ])
            }
        };
        Ok(d)
    }
}

/// Constitutive matrix from a numeric analysis type code.
///
/// # Errors
///
/// [`Error::UnsupportedAnalysisType`] for codes outside 1..=4, and
/// [`Error::InvalidMaterial`] for non-physical E or ν.
pub fn hooke(analysis_type: i32, youngs_modulus: f64, poissons_ratio: f64) -> Result<DMatrix<f64>> {
    let analysis = AnalysisType::try_from(analysis_type)?;
    Material::new(youngs_modulus, poissons_ratio)?.constitutive(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_material_creation() {
        let mat = Material::new(200e9, 0.3).unwrap();
        assert_relative_eq!(mat.youngs_modulus, 200e9);
        assert_relative_eq!(mat.poissons_ratio, 0.3);
    }

    #[test]
    fn test_invalid_youngs_modulus() {
        assert!(Material::new(-100e9, 0.3).is_err());
        assert!(Material::new(0.0, 0.3).is_err());
    }

    #[test]
    fn test_invalid_poissons_ratio() {
        assert!(Material::new(200e9, -1.0).is_err());
        assert!(Material::new(200e9, f64::NAN).is_err());
        assert!(Material::new(200e9, 0.6).is_err());
    }

    #[test]
    fn test_plane_stress_zero_poisson() {
        let e = 210e9;
        let d = hooke(1, e, 0.0).unwrap();
        assert_eq!(d.shape(), (3, 3));
        assert_relative_eq!(d[(0, 0)], e);
        assert_relative_eq!(d[(1, 1)], e);
        assert_relative_eq!(d[(0, 1)], 0.0);
        assert_relative_eq!(d[(2, 2)], e / 2.0);
    }

    #[test]
    fn test_shapes_per_analysis_type() {
        for (code, n) in [(1, 3), (2, 4), (3, 4), (4, 6)] {
            let d = hooke(code, 1.0, 0.25).unwrap();
            assert_eq!(d.shape(), (n, n));
            assert_eq!(
                AnalysisType::try_from(code).unwrap().n_components(),
                n
            );
        }
    }

    #[test]
    fn test_unsupported_analysis_type() {
        assert!(matches!(
            hooke(5, 1.0, 0.3),
            Err(Error::UnsupportedAnalysisType(5))
        ));
        assert!(matches!(
            hooke(0, 1.0, 0.3),
            Err(Error::UnsupportedAnalysisType(0))
        ));
    }

    #[test]
    fn test_constitutive_symmetry() {
        let mat = Material::new(200e9, 0.3).unwrap();
        for analysis in [
            AnalysisType::PlaneStress,
            AnalysisType::PlaneStrain,
            AnalysisType::Axisymmetric,
            AnalysisType::ThreeDimensional,
        ] {
            let d = mat.constitutive(analysis).unwrap();
            let n = d.nrows();
            for i in 0..n {
                assert!(d[(i, i)] > 0.0);
                for j in 0..n {
                    assert_relative_eq!(d[(i, j)], d[(j, i)], epsilon = 1e-10);
                }
            }
        }
    }

    #[test]
    fn test_incompressible_plane_stress() {
        let e = 3e6;
        let d = hooke(1, e, 0.5).unwrap();
        // E/(1-ν²) = 4E/3
        assert_relative_eq!(d[(0, 0)], 4.0 * e / 3.0, max_relative = 1e-12);
        assert_relative_eq!(d[(0, 1)], 2.0 * e / 3.0, max_relative = 1e-12);
        assert_relative_eq!(d[(2, 2)], e / 3.0, max_relative = 1e-12);

        for code in [2, 3, 4] {
            assert!(matches!(hooke(code, e, 0.5), Err(Error::InvalidMaterial(_))));
        }
    }

    #[test]
    fn test_three_dimensional_values() {
        let e = 1e6;
        let nu = 0.25;
        let d = hooke(4, e, nu).unwrap();

        // E(1-ν)/((1+ν)(1-2ν)) = 1e6 * 0.75 / (1.25 * 0.5)
        assert_relative_eq!(d[(0, 0)], 1.2e6, epsilon = 1e-6);
        assert_relative_eq!(d[(0, 1)], 0.4e6, epsilon = 1e-6);
        // Shear modulus E / (2(1+ν))
        assert_relative_eq!(d[(3, 3)], e / 2.5, epsilon = 1e-6);
    }
}
