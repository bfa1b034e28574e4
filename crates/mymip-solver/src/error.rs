//! Solver error types.

/// Error type for backend calls.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The solver could not create a problem instance.
    CreateFailed,
    /// A solver call returned a failure status.
    CallFailed {
        operation: &'static str,
        status: i32,
    },
    /// A solver option name or value was rejected.
    InvalidOption { name: String, reason: String },
    /// A row or column count does not fit the solver's index type.
    IndexOverflow(usize),
    /// Array arguments are inconsistent with each other or with the problem.
    InvalidArgument(String),
}

impl SolverError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::CreateFailed => "SOLVER_CREATE_FAILED",
            SolverError::CallFailed { .. } => "SOLVER_CALL_FAILED",
            SolverError::InvalidOption { .. } => "SOLVER_INVALID_OPTION",
            SolverError::IndexOverflow(_) => "SOLVER_INDEX_OVERFLOW",
            SolverError::InvalidArgument(_) => "SOLVER_INVALID_ARGUMENT",
        }
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::CreateFailed => {
                write!(f, "[{}] Failed to create solver instance", self.code())
            }
            SolverError::CallFailed { operation, status } => write!(
                f,
                "[{}] Solver call {operation} returned status {status}",
                self.code()
            ),
            SolverError::InvalidOption { name, reason } => {
                write!(f, "[{}] Option {name}: {reason}", self.code())
            }
            SolverError::IndexOverflow(value) => write!(
                f,
                "[{}] Index {value} exceeds the solver index range",
                self.code()
            ),
            SolverError::InvalidArgument(msg) => write!(f, "[{}] {msg}", self.code()),
        }
    }
}

impl std::error::Error for SolverError {}
