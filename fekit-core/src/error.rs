//! Error types for finite element operations.
//!
//! Errors fall into three groups: input-shape errors (array dimensions that
//! do not agree), domain errors (degenerate geometry, singular systems) and
//! lookup errors (unknown DOF ids, markers or analysis types). All of them are
//! reported immediately; no operation returns a partially assembled system.

use thiserror::Error;

/// Result type alias using the crate [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during element computation, assembly and solution.
#[derive(Error, Debug)]
pub enum Error {
    /// Array dimensions that do not agree with each other.
    #[error("shape mismatch: {0}")]
    Shape(String),

    /// Element whose nodes coincide.
    #[error("zero-length element")]
    ZeroLength,

    /// Triangle whose nodes are collinear.
    #[error("degenerate element area {area:e}")]
    DegenerateArea { area: f64 },

    /// Triangle given in clockwise node order.
    #[error("element nodes are ordered clockwise (signed area {area:e}); counter-clockwise order is required")]
    InvertedElement { area: f64 },

    /// Matrix singularity or conditioning issues.
    #[error("singular matrix: {0}")]
    SingularMatrix(String),

    /// Invalid material properties.
    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    /// DOF id outside the global system (reported 1-based).
    #[error("DOF {dof} out of range (system has {n_dofs} DOFs)")]
    DofOutOfRange { dof: usize, n_dofs: usize },

    /// DOF id 0 given where 1-based ids are expected.
    #[error("DOF ids are 1-based, got 0")]
    InvalidDofId,

    /// Same DOF prescribed twice (reported 1-based).
    #[error("DOF {dof} is constrained more than once")]
    DuplicateConstraint { dof: usize },

    /// Element node DOF tuple with no matching node in the DOF table.
    #[error("element {element}, local node {local_node}: DOF tuple matches no node")]
    NodeNotFound { element: usize, local_node: usize },

    /// Analysis type code outside 1..=4.
    #[error("unsupported analysis type {0}")]
    UnsupportedAnalysisType(i32),

    /// Boundary marker not present in the boundary DOF map.
    #[error("unknown boundary marker {0}")]
    UnknownBoundaryMarker(i32),

    /// Error raised while processing one element of a batch.
    #[error("element {element}: {source}")]
    InElement {
        element: usize,
        #[source]
        source: Box<Error>,
    },

    /// Solver backend errors.
    #[error("solver error: {0}")]
    Solver(String),
}

impl Error {
    /// Attach the index of the element being processed.
    pub fn in_element(self, element: usize) -> Self {
        Error::InElement {
            element,
            source: Box::new(self),
        }
    }
}
