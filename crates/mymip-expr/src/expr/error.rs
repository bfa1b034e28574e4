//! Expression domain errors.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    DivisionByZero,
    NonFiniteFactor,
    MismatchedLengths { variables: usize, coefficients: usize },
}

impl ExprError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ExprError::DivisionByZero => "EXPR_DIVISION_BY_ZERO",
            ExprError::NonFiniteFactor => "EXPR_NON_FINITE_FACTOR",
            ExprError::MismatchedLengths { .. } => "EXPR_MISMATCHED_LENGTHS",
        }
    }
}

impl std::fmt::Display for ExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprError::DivisionByZero => {
                write!(f, "[{}] expression divided by zero", self.code())
            }
            ExprError::NonFiniteFactor => {
                write!(f, "[{}] scale factor must be finite", self.code())
            }
            ExprError::MismatchedLengths {
                variables,
                coefficients,
            } => write!(
                f,
                "[{}] {variables} variables but {coefficients} coefficients",
                self.code()
            ),
        }
    }
}

impl std::error::Error for ExprError {}
