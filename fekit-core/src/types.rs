//! Core data types for element geometry.
//!
//! Element kernels take their nodal coordinates as a slice of points. The
//! coordinate extractor produces per-dimension arrays (`ex`, `ey`, `ez`);
//! [`points_from_xy`] zips a pair of those rows into points.

use crate::error::{Error, Result};
use nalgebra::Vector2;

/// A point in the plane.
pub type Point2 = Vector2<f64>;

/// Build planar points from separate x and y coordinate rows.
///
/// Fails with a shape error when the rows have different lengths.
pub fn points_from_xy(ex: &[f64], ey: &[f64]) -> Result<Vec<Point2>> {
    if ex.len() != ey.len() {
        return Err(Error::Shape(format!(
            "ex has {} coordinates, ey has {}",
            ex.len(),
            ey.len()
        )));
    }
    Ok(ex
        .iter()
        .zip(ey.iter())
        .map(|(&x, &y)| Point2::new(x, y))
        .collect())
}
