pub mod expr;
pub mod ids;

pub use expr::{
    ComparisonSense, ConstraintExpr, Expr, ExprError, TermKey, TermMap, linear_terms,
};
pub use ids::{ConstraintId, VariableId};
