//! fekit core - linear finite element analysis kernel
//!
//! Small-scale linear finite element analysis for structural and field
//! problems:
//! - Element kernels: spring, 2D bar, 2D beam, triangular flow element,
//!   constant strain triangle
//! - Global assembly, sequential or parallel using Rayon
//! - Constrained solve with dense LU, dense Cholesky or faer sparse Cholesky
//! - DOF mapping, element coordinate and displacement extraction
//!
//! # Architecture
//!
//! A typical analysis runs through these steps:
//!
//! 1. [`DofTable`] numbers the node DOFs; [`Topology`] lists each element's
//!    DOFs (1-based on input, 0-based internally).
//! 2. [`coordxtr`] gathers per-element coordinates from the node table.
//! 3. [`Element`] kernels compute `Ke` (and `fe`), which an
//!    [`AssemblyContext`] scatter-adds into `K` and `f`.
//! 4. [`solve_constrained`] solves with the [`BoundaryConditions`] and returns
//!    the nodal values and reactions.
//! 5. [`extract`] gathers element values for [`Element::recover`].

pub mod error;
pub mod types;
pub mod topology;
pub mod dof;
pub mod mesh;
pub mod material;
pub mod element;
pub mod assembly;
pub mod boundary;
pub mod sparse;
pub mod solver;
pub mod extract;

pub use assembly::{AssemblyContext, AssemblyOptions};
pub use boundary::{BoundaryConditions, BoundaryDofs};
pub use dof::DofTable;
pub use element::{Element, LoadedElement};
pub use error::{Error, Result};
pub use extract::{extract, extract_element};
pub use material::{hooke, AnalysisType, Material};
pub use mesh::{coordxtr, Coordinates, ElementCoordinates};
pub use solver::{solve_constrained, solveq, Solution, Solver, SolverConfig, SolverType};
pub use topology::{ElementDofs, Topology};
pub use types::Point2;
