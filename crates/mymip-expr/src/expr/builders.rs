//! Builder functions for constructing linear expressions.

use crate::expr::core::Expr;
use crate::expr::error::ExprError;
use crate::ids::VariableId;

/// Build an Expr from parallel variable and coefficient slices.
///
/// Repeated variables accumulate. Returns an error if the lengths differ.
pub fn linear_terms(variables: &[VariableId], coefficients: &[f64]) -> Result<Expr, ExprError> {
    if variables.len() != coefficients.len() {
        return Err(ExprError::MismatchedLengths {
            variables: variables.len(),
            coefficients: coefficients.len(),
        });
    }
    Ok(Expr::from_pairs(
        variables.iter().copied().zip(coefficients.iter().copied()),
    ))
}
