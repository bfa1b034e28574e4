//! Expression types for linear modeling.
//!
//! - `terms`: TermMap, sparse variable coefficients plus a constant
//! - `core`: Expr, a value-semantics linear expression over a TermMap
//! - `constraint`: ConstraintExpr, normalized `lhs - rhs` with sense and scalar RHS
//! - `builders`: expressions from parallel inputs
//! - `error`: expression domain errors

pub mod builders;
pub mod constraint;
pub mod core;
pub mod error;
pub mod terms;

pub use builders::linear_terms;
pub use constraint::{ComparisonSense, ConstraintExpr};
pub use core::Expr;
pub use error::ExprError;
pub use terms::{TermKey, TermMap};
