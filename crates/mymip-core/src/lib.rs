//! mymip core model builder with a staged/live lifecycle.

pub mod model;
pub mod network;
pub mod types;

pub use model::{
    ConstraintGroup, ConstraintView, Model, ModelError, ModelSnapshot, NamedConstraint,
    ObjectiveView, VariableDecl, VariableView, flatten,
};
pub use network::{ArcId, ArcRecord, Network, NetworkError, NodeId, NodeRecord};
pub use types::{ConstraintRecord, ModelState, Objective, VariableRecord, VariableType};

pub use mymip_expr::{ComparisonSense, ConstraintExpr, ConstraintId, Expr, TermMap, VariableId};
pub use mymip_solver::{ObjectiveSense, SolverStatus, VarKind};
