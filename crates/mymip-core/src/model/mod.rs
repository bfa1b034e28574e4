//! Model module for building LP/MIP problems against a solver backend.
//!
//! A [`Model`] starts in the staged `Building` state, where declarations only
//! touch in-memory records. [`Model::materialize`] loads compressed arrays
//! into the backend; from then on every edit is mirrored as an incremental
//! backend call.
//!
//! # Module Organization
//!
//! - [`error`]: Model error types
//! - [`registry`]: Variable declaration, bounds and kinds
//! - [`objective`]: Objective sense and cost coefficients
//! - [`flatten`]: Nested constraint groups to named rows
//! - [`materialize`]: Compressed array build and backend load
//! - [`controller`]: Solve, result retrieval and row/column edits
//! - [`inspect`]: Serializable model snapshots

mod controller;
mod error;
mod flatten;
mod inspect;
mod materialize;
mod objective;
mod registry;

use std::collections::HashMap;

use mymip_expr::{ConstraintId, VariableId};
use mymip_solver::{ProblemBackend, SolverError};

use crate::types::{ConstraintRecord, ModelState, Objective, VariableRecord};

pub use error::ModelError;
pub use flatten::{ConstraintGroup, NamedConstraint, flatten};
pub use inspect::{ConstraintView, ModelSnapshot, ObjectiveView, VariableView};
pub use registry::VariableDecl;

/// An LP/MIP model bound to one backend problem instance.
pub struct Model {
    name: String,
    pub(crate) backend: Box<dyn ProblemBackend>,
    pub(crate) variables: Vec<VariableRecord>,
    pub(crate) variable_names: HashMap<String, VariableId>,
    pub(crate) constraints: Vec<ConstraintRecord>,
    // ConstraintId -> current row position
    pub(crate) row_positions: HashMap<ConstraintId, usize>,
    pub(crate) next_constraint_id: u32,
    pub(crate) objective: Option<Objective>,
    pub(crate) state: ModelState,
    pub(crate) mip: bool,
    pub(crate) block_count: usize,
    pub(crate) last_error: Option<SolverError>,
}

impl Model {
    /// Create an empty model on top of a fresh backend problem.
    pub fn new(name: impl Into<String>, backend: Box<dyn ProblemBackend>) -> Self {
        let name = name.into();
        tracing::debug!(
            component = "model",
            operation = "create",
            status = "success",
            model = %name,
            backend = backend.name(),
            "Created model"
        );
        Self {
            name,
            backend,
            variables: Vec::new(),
            variable_names: HashMap::new(),
            constraints: Vec::new(),
            row_positions: HashMap::new(),
            next_constraint_id: 0,
            objective: None,
            state: ModelState::Building,
            mip: false,
            block_count: 0,
            last_error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn is_materialized(&self) -> bool {
        self.state.is_materialized()
    }

    /// Whether the model is solved as a mixed-integer problem.
    pub fn is_mip(&self) -> bool {
        self.mip
    }

    /// The most recent backend failure, if any.
    pub fn last_error(&self) -> Option<&SolverError> {
        self.last_error.as_ref()
    }

    pub fn backend(&self) -> &dyn ProblemBackend {
        self.backend.as_ref()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &VariableRecord)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(idx, record)| (VariableId::new(idx as u32), record))
    }

    pub fn constraints(&self) -> impl Iterator<Item = &ConstraintRecord> {
        self.constraints.iter()
    }

    pub fn get_variable(&self, id: VariableId) -> Result<&VariableRecord, ModelError> {
        self.variables
            .get(id.index())
            .ok_or(ModelError::InvalidVariableId(id))
    }

    pub fn get_constraint(&self, id: ConstraintId) -> Result<&ConstraintRecord, ModelError> {
        let row = self.row_index(id)?;
        Ok(&self.constraints[row])
    }

    /// Current row position of a constraint.
    pub fn row_index(&self, id: ConstraintId) -> Result<usize, ModelError> {
        self.row_positions
            .get(&id)
            .copied()
            .ok_or(ModelError::InvalidConstraintId(id))
    }

    pub fn constraint_by_name(&self, name: &str) -> Option<ConstraintId> {
        self.constraints
            .iter()
            .find(|record| record.name == name)
            .map(|record| record.id)
    }

    pub(crate) fn ensure_variable_exists(&self, id: VariableId) -> Result<(), ModelError> {
        if id.index() < self.variables.len() {
            Ok(())
        } else {
            Err(ModelError::InvalidVariableId(id))
        }
    }

    pub(crate) fn variable_mut(&mut self, id: VariableId) -> Result<&mut VariableRecord, ModelError> {
        self.variables
            .get_mut(id.index())
            .ok_or(ModelError::InvalidVariableId(id))
    }

    /// Record a backend failure without interrupting the caller.
    pub(crate) fn report(&mut self, operation: &'static str, result: Result<(), SolverError>) {
        if let Err(err) = result {
            tracing::warn!(
                component = "model",
                operation,
                status = "error",
                model = %self.name,
                error_code = err.code(),
                error = %err,
                "Backend call failed"
            );
            self.last_error = Some(err);
        }
    }

    /// A structural or value edit invalidates a completed solve.
    pub(crate) fn touch(&mut self) {
        if self.state == ModelState::Solved {
            self.state = ModelState::Materialized;
        }
    }

    pub(crate) fn rebuild_row_positions(&mut self) {
        self.row_positions = self
            .constraints
            .iter()
            .enumerate()
            .map(|(row, record)| (record.id, row))
            .collect();
    }

    pub(crate) fn allocate_constraint_id(&mut self) -> ConstraintId {
        let id = ConstraintId::new(self.next_constraint_id);
        self.next_constraint_id += 1;
        id
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("backend", &self.backend.name())
            .field("variables", &self.variables.len())
            .field("constraints", &self.constraints.len())
            .field("state", &self.state)
            .field("mip", &self.mip)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{ModelState, VariableType};
    use mymip_expr::{ComparisonSense, Expr};
    use mymip_solver::{ObjectiveSense, SolverStatus, VarKind};

    mod inspect;
    mod lifecycle;
    mod live;
    mod staged;
    pub(crate) mod support;
}
