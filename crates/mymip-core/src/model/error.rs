//! Model error types.

use mymip_expr::{ConstraintId, ExprError, VariableId};

/// Structural and domain errors raised by model operations.
///
/// Backend call failures are not represented here: they are logged and kept
/// in [`crate::Model::last_error`].
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Variable ID does not belong to this model
    InvalidVariableId(VariableId),
    /// Invalid variable bounds
    InvalidVariableBounds { lower: f64, upper: f64 },
    /// Constraint ID does not belong to this model (or was deleted)
    InvalidConstraintId(ConstraintId),
    /// Non-finite coefficient or right-hand side
    InvalidCoefficient { value: f64 },
    /// Objective vector does not cover every variable
    ObjectiveLengthMismatch { objective: usize, variables: usize },
    /// A keyed constraint group repeats a key
    DuplicateGroupKey(String),
    /// Expression domain error
    Expr(ExprError),
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::InvalidVariableId(_) => "VARIABLE_INVALID_ID",
            ModelError::InvalidVariableBounds { .. } => "VARIABLE_INVALID_BOUNDS",
            ModelError::InvalidConstraintId(_) => "CONSTRAINT_INVALID_ID",
            ModelError::InvalidCoefficient { .. } => "COEFFICIENT_INVALID",
            ModelError::ObjectiveLengthMismatch { .. } => "OBJECTIVE_LENGTH_MISMATCH",
            ModelError::DuplicateGroupKey(_) => "CONSTRAINT_DUPLICATE_KEY",
            ModelError::Expr(err) => err.code(),
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InvalidVariableId(id) => write!(
                f,
                "[{}] Variable ID {} does not exist",
                self.code(),
                id.inner()
            ),
            ModelError::InvalidVariableBounds { lower, upper } => write!(
                f,
                "[{}] Variable bounds invalid: lower ({}) > upper ({})",
                self.code(),
                lower,
                upper
            ),
            ModelError::InvalidConstraintId(id) => write!(
                f,
                "[{}] Constraint ID {} does not exist",
                self.code(),
                id.inner()
            ),
            ModelError::InvalidCoefficient { value } => {
                write!(f, "[{}] Coefficient must be finite (got {})", self.code(), value)
            }
            ModelError::ObjectiveLengthMismatch {
                objective,
                variables,
            } => write!(
                f,
                "[{}] Objective has {} coefficients but the model has {} variables; \
                 re-declare the objective after adding variables",
                self.code(),
                objective,
                variables
            ),
            ModelError::DuplicateGroupKey(key) => write!(
                f,
                "[{}] Constraint group key '{}' appears more than once",
                self.code(),
                key
            ),
            ModelError::Expr(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Expr(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ExprError> for ModelError {
    fn from(value: ExprError) -> Self {
        ModelError::Expr(value)
    }
}
