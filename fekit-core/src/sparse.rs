//! Sparse matrix conversion for the sparse solver backend.
//!
//! The assembled stiffness matrix is dense; the sparse Cholesky backend
//! gathers its nonzero entries as (row, col, value) triplets and converts
//! them to CSR (Compressed Sparse Row) format.

use crate::error::{Error, Result};
use nalgebra::DMatrix;
use nalgebra_sparse::coo::CooMatrix;
use nalgebra_sparse::csr::CsrMatrix as NalgebraCsr;

/// Compressed Sparse Row matrix.
pub type CsrMatrix = NalgebraCsr<f64>;

/// Builder for a sparse matrix from triplets (COO format).
///
/// Duplicate (row, col) entries are summed during conversion.
#[derive(Debug, Clone)]
pub struct TripletMatrix {
    n_rows: usize,
    n_cols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
}

impl TripletMatrix {
    /// Create an empty triplet matrix.
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self::with_capacity(n_rows, n_cols, 0)
    }

    /// Create with an estimated number of nonzeros.
    pub fn with_capacity(n_rows: usize, n_cols: usize, nnz_estimate: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            rows: Vec::with_capacity(nnz_estimate),
            cols: Vec::with_capacity(nnz_estimate),
            values: Vec::with_capacity(nnz_estimate),
        }
    }

    /// Gather the nonzero entries of a dense matrix.
    pub fn from_dense(matrix: &DMatrix<f64>) -> Self {
        let nnz = matrix.iter().filter(|v| **v != 0.0).count();
        let mut triplets = Self::with_capacity(matrix.nrows(), matrix.ncols(), nnz);
        for j in 0..matrix.ncols() {
            for i in 0..matrix.nrows() {
                triplets.add(i, j, matrix[(i, j)]);
            }
        }
        triplets
    }

    /// Add a value at (row, col). Exact zeros are skipped.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.n_rows, "row index out of bounds");
        debug_assert!(col < self.n_cols, "column index out of bounds");

        if value != 0.0 {
            self.rows.push(row);
            self.cols.push(col);
            self.values.push(value);
        }
    }

    /// Number of stored triplets.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Convert to CSR format, summing duplicate entries.
    pub fn to_csr(self) -> Result<CsrMatrix> {
        let coo = CooMatrix::try_from_triplets(self.n_rows, self.n_cols, self.rows, self.cols, self.values)
            .map_err(|e| Error::Shape(format!("invalid triplet data: {}", e)))?;
        Ok(CsrMatrix::from(&coo))
    }
}
