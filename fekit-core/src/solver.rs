//! Linear system solvers and the constrained solve.
//!
//! [`solve_constrained`] partitions the DOFs into free and prescribed sets,
//! solves the reduced system `K[free, free]·a_free = f[free] - K[free, presc]·a_presc`
//! and recovers the reactions `Q = K·a - f` over the full system.
//!
//! # Solver Backends
//!
//! - [`DenseLuSolver`]: full-pivot LU from nalgebra. Works for any nonsingular
//!   system and detects singularity deterministically through a pivot
//!   tolerance scaled by the system size. Default for small systems and for
//!   any nonsymmetric system.
//! - [`DenseCholeskySolver`]: nalgebra dense Cholesky, for SPD systems.
//! - [`SparseCholeskySolver`]: sparse LLᵀ from faer. The reduced stiffness
//!   matrix of a banded mesh is mostly zeros, so this pays off for large
//!   symmetric systems.
//!
//! Both Cholesky backends reject a nonsymmetric matrix instead of factoring
//! one of its triangles.

use crate::boundary::BoundaryConditions;
use crate::error::{Error, Result};
use crate::sparse::{CsrMatrix, TripletMatrix};
use faer::linalg::cholesky::llt::factor::LltError;
use faer::linalg::solvers::Solve;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};
use faer::sparse::linalg::LltError as SparseLltError;
use faer::sparse::{SparseColMat, SymbolicSparseColMat};
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

/// Linear solver interface.
pub trait Solver: Send + Sync {
    /// Solve the linear system Ax = b.
    ///
    /// # Arguments
    ///
    /// * `matrix` - System matrix (K)
    /// * `rhs` - Right-hand side vector (f)
    ///
    /// # Returns
    ///
    /// Solution vector (a)
    fn solve(&self, matrix: &DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>>;

    /// Solver name for diagnostics.
    fn name(&self) -> &str;
}

/// Solver selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverType {
    /// Dense full-pivot LU.
    DenseLu,
    /// Dense Cholesky (SPD systems only).
    DenseCholesky,
    /// Sparse Cholesky via faer (SPD systems only).
    SparseCholesky,
    /// Dense LU below `auto_threshold` free DOFs or for a nonsymmetric
    /// matrix, sparse Cholesky otherwise.
    #[default]
    Auto,
}

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Solver type to use.
    pub solver_type: SolverType,
    /// Dense LU reports a singular matrix when the smallest pivot is at most
    /// `pivot_tolerance · n · (largest pivot)` for an `n x n` system.
    pub pivot_tolerance: f64,
    /// Largest `|K[i,j] - K[j,i]|`, relative to the largest entry, for which
    /// a matrix counts as symmetric.
    pub symmetry_tolerance: f64,
    /// Largest reaction at a free DOF, relative to the largest load or
    /// reaction, accepted without a warning.
    pub reaction_tolerance: f64,
    /// Free DOF count from which `Auto` switches to the sparse backend.
    pub auto_threshold: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solver_type: SolverType::Auto,
            pivot_tolerance: 4.0 * f64::EPSILON,
            symmetry_tolerance: 1e-12,
            reaction_tolerance: 1e-8,
            auto_threshold: 2_000,
        }
    }
}

fn check_system(matrix: &DMatrix<f64>, rhs: &DVector<f64>) -> Result<()> {
    if !matrix.is_square() {
        return Err(Error::Shape(format!(
            "system matrix must be square, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    if matrix.nrows() != rhs.len() {
        return Err(Error::Shape(format!(
            "system matrix has {} rows, right-hand side has {}",
            matrix.nrows(),
            rhs.len()
        )));
    }
    Ok(())
}

/// Whether a square matrix equals its transpose within `tolerance`, relative
/// to its largest entry.
pub fn is_symmetric(matrix: &DMatrix<f64>, tolerance: f64) -> bool {
    if !matrix.is_square() {
        return false;
    }
    let limit = tolerance * matrix.amax();
    let n = matrix.nrows();
    (0..n).all(|j| (j + 1..n).all(|i| (matrix[(i, j)] - matrix[(j, i)]).abs() <= limit))
}

fn check_symmetric(matrix: &DMatrix<f64>) -> Result<()> {
    if is_symmetric(matrix, SolverConfig::default().symmetry_tolerance) {
        Ok(())
    } else {
        Err(Error::Solver("Cholesky factorization needs a symmetric matrix".into()))
    }
}

/// Dense full-pivot LU solver.
#[derive(Debug, Clone)]
pub struct DenseLuSolver {
    pivot_tolerance: f64,
}

impl DenseLuSolver {
    pub fn new(pivot_tolerance: f64) -> Self {
        Self { pivot_tolerance }
    }
}

impl Default for DenseLuSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default().pivot_tolerance)
    }
}

impl Solver for DenseLuSolver {
    fn solve(&self, matrix: &DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>> {
        check_system(matrix, rhs)?;
        if matrix.nrows() == 0 {
            return Ok(DVector::zeros(0));
        }

        let lu = matrix.clone().full_piv_lu();

        // Full pivoting sorts pivots by magnitude, so a rank-deficient matrix
        // ends in pivots at roundoff level, i.e. within a few n·ε of the largest.
        let pivots = lu.u().diagonal();
        let largest = pivots.amax();
        let smallest = pivots.amin();
        let tolerance = self.pivot_tolerance * matrix.nrows() as f64;
        if !largest.is_finite() || !(largest > 0.0) || smallest <= tolerance * largest {
            return Err(Error::SingularMatrix(format!(
                "pivot ratio {:e} below tolerance {:e}",
                if largest > 0.0 { smallest / largest } else { 0.0 },
                tolerance
            )));
        }

        lu.solve(rhs)
            .ok_or_else(|| Error::SingularMatrix("LU solve failed".into()))
    }

    fn name(&self) -> &str {
        "Dense LU (full pivoting)"
    }
}

/// Dense Cholesky solver for SPD systems.
#[derive(Debug, Clone, Default)]
pub struct DenseCholeskySolver;

impl DenseCholeskySolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for DenseCholeskySolver {
    fn solve(&self, matrix: &DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>> {
        check_system(matrix, rhs)?;
        if matrix.nrows() == 0 {
            return Ok(DVector::zeros(0));
        }
        check_symmetric(matrix)?;
        let llt = matrix
            .clone()
            .cholesky()
            .ok_or_else(|| Error::SingularMatrix("matrix is not positive definite".into()))?;
        Ok(llt.solve(rhs))
    }

    fn name(&self) -> &str {
        "Dense Cholesky (LLᵀ)"
    }
}

/// Convert nalgebra-sparse CSR matrix to faer SparseColMat (CSC format).
fn csr_to_faer_csc(csr: &CsrMatrix) -> SparseColMat<usize, f64> {
    let nrows = csr.nrows();
    let ncols = csr.ncols();

    let row_offsets = csr.row_offsets();
    let col_indices = csr.col_indices();
    let values = csr.values();

    let mut col_offsets = vec![0usize; ncols + 1];
    for &col in col_indices {
        col_offsets[col + 1] += 1;
    }
    for i in 0..ncols {
        col_offsets[i + 1] += col_offsets[i];
    }

    // Rows are visited in order, so row indices within each column come out sorted.
    let nnz = values.len();
    let mut csc_row_indices = vec![0usize; nnz];
    let mut csc_values = vec![0.0f64; nnz];
    let mut col_positions = col_offsets[..ncols].to_vec();

    for row in 0..nrows {
        for idx in row_offsets[row]..row_offsets[row + 1] {
            let col = col_indices[idx];
            let pos = col_positions[col];
            csc_row_indices[pos] = row;
            csc_values[pos] = values[idx];
            col_positions[col] += 1;
        }
    }

    // SAFETY: offsets are monotone, end at nnz, and row indices are in
    // bounds and sorted within each column.
    unsafe {
        SparseColMat::new(
            SymbolicSparseColMat::new_unchecked(nrows, ncols, col_offsets, None, csc_row_indices),
            csc_values,
        )
    }
}

/// Sparse Cholesky solver using the faer library.
///
/// The dense system matrix is compressed to CSR, converted to faer's CSC
/// layout and factored as LLᵀ reading the lower triangle. [`Solver::solve`]
/// checks symmetry first; [`SparseCholeskySolver::solve_csr`] trusts the
/// caller.
#[derive(Debug, Clone, Default)]
pub struct SparseCholeskySolver;

impl SparseCholeskySolver {
    pub fn new() -> Self {
        Self
    }

    /// Solve with a matrix already in CSR form.
    pub fn solve_csr(&self, matrix: &CsrMatrix, rhs: &DVector<f64>) -> Result<DVector<f64>> {
        let n = matrix.nrows();
        if n != matrix.ncols() || n != rhs.len() {
            return Err(Error::Shape(format!(
                "system matrix {}x{} does not match right-hand side of length {}",
                n,
                matrix.ncols(),
                rhs.len()
            )));
        }
        if n == 0 {
            return Ok(DVector::zeros(0));
        }

        let csc = csr_to_faer_csc(matrix);
        let csc_ref = csc.as_ref();

        let symbolic = SymbolicLlt::try_new(csc_ref.symbolic(), faer::Side::Lower)
            .map_err(|_| Error::Solver("symbolic Cholesky analysis failed".into()))?;

        let llt = Llt::try_new_with_symbolic(symbolic, csc_ref, faer::Side::Lower)
            .map_err(|e| match e {
                SparseLltError::Generic(err) => Error::Solver(format!("sparse Cholesky error: {:?}", err)),
                SparseLltError::Numeric(LltError::NonPositivePivot { index }) => {
                    Error::SingularMatrix(format!("matrix is not positive definite at pivot {}", index))
                }
            })?;

        let mut x = faer::Mat::from_fn(n, 1, |i, _| rhs[i]);
        llt.solve_in_place(x.as_mut());

        Ok(DVector::from_fn(n, |i, _| x[(i, 0)]))
    }
}

impl Solver for SparseCholeskySolver {
    fn solve(&self, matrix: &DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>> {
        check_system(matrix, rhs)?;
        check_symmetric(matrix)?;
        let csr = TripletMatrix::from_dense(matrix).to_csr()?;
        self.solve_csr(&csr, rhs)
    }

    fn name(&self) -> &str {
        "faer Sparse Cholesky (LLᵀ)"
    }
}

/// Select solver based on configuration, problem size and symmetry.
pub fn select_solver(config: &SolverConfig, matrix: &DMatrix<f64>) -> Box<dyn Solver> {
    match config.solver_type {
        SolverType::DenseLu => Box::new(DenseLuSolver::new(config.pivot_tolerance)),
        SolverType::DenseCholesky => Box::new(DenseCholeskySolver::new()),
        SolverType::SparseCholesky => Box::new(SparseCholeskySolver::new()),
        SolverType::Auto => {
            if matrix.nrows() < config.auto_threshold {
                Box::new(DenseLuSolver::new(config.pivot_tolerance))
            } else if !is_symmetric(matrix, config.symmetry_tolerance) {
                debug!(
                    "{}x{} matrix is not symmetric, using dense LU",
                    matrix.nrows(),
                    matrix.ncols()
                );
                Box::new(DenseLuSolver::new(config.pivot_tolerance))
            } else {
                Box::new(SparseCholeskySolver::new())
            }
        }
    }
}

/// Result of a constrained solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Nodal values over all DOFs; prescribed DOFs hold their prescribed values.
    pub a: DVector<f64>,
    /// Reactions `K·a - f` over all DOFs.
    pub q: DVector<f64>,
    free: Vec<usize>,
}

impl Solution {
    /// 0-based indices of the free DOFs.
    pub fn free_dofs(&self) -> &[usize] {
        &self.free
    }

    /// Largest reaction magnitude at a free DOF.
    ///
    /// Ideally zero; a large value points at an assembly or constraint error.
    pub fn free_residual(&self) -> f64 {
        self.free.iter().map(|&i| self.q[i].abs()).fold(0.0, f64::max)
    }
}

/// Solve `K·a = f` with prescribed DOFs.
///
/// # Errors
///
/// - [`Error::Shape`] if `K` is not square or `f` has the wrong length
/// - [`Error::DofOutOfRange`] if a prescribed DOF is outside the system
/// - [`Error::SingularMatrix`] if the free-free block is singular, e.g. when
///   rigid-body modes are left unconstrained
pub fn solve_constrained(
    k: &DMatrix<f64>,
    f: &DVector<f64>,
    bc: &BoundaryConditions,
    config: &SolverConfig,
) -> Result<Solution> {
    check_system(k, f)?;
    let n = f.len();
    bc.check_range(n)?;

    let (free, prescribed) = bc.partition(n);
    let mut a = DVector::zeros(n);
    for (dof, value) in bc.iter() {
        a[dof] = value;
    }

    if !free.is_empty() {
        let a_prescribed = a.select_rows(&prescribed);
        let k_free = k.select_rows(&free);
        let k_ff = k_free.select_columns(&free);

        let solver = select_solver(config, &k_ff);
        debug!(
            "solving {} DOFs ({} free, {} prescribed) with {}",
            n,
            free.len(),
            prescribed.len(),
            solver.name()
        );

        let f_adj = f.select_rows(&free) - k_free.select_columns(&prescribed) * a_prescribed;

        let a_free = solver.solve(&k_ff, &f_adj)?;
        for (&dof, &value) in free.iter().zip(a_free.iter()) {
            a[dof] = value;
        }
    } else {
        debug!("all {} DOFs prescribed, skipping solve", n);
    }

    let q = k * &a - f;
    let solution = Solution { a, q, free };

    let residual = solution.free_residual();
    let scale = f.amax().max(solution.q.amax());
    if residual > config.reaction_tolerance * scale {
        warn!(
            "reaction {:e} at a free DOF exceeds tolerance ({:e} relative to {:e})",
            residual, config.reaction_tolerance, scale
        );
    }

    Ok(solution)
}

/// [`solve_constrained`] with the default configuration.
pub fn solveq(k: &DMatrix<f64>, f: &DVector<f64>, bc: &BoundaryConditions) -> Result<Solution> {
    solve_constrained(k, f, bc, &SolverConfig::default())
}
