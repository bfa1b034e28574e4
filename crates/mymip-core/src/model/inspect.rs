//! Model inspection and snapshot methods.

use serde::Serialize;

use crate::types::ModelState;
use mymip_solver::{ObjectiveSense, VarKind};

use super::Model;

/// View of a variable in a model snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableView {
    pub id: u32,
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub kind: VarKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduced_cost: Option<f64>,
}

/// View of a constraint in a model snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintView {
    pub id: u32,
    pub row: usize,
    pub name: String,
    pub sense: &'static str,
    pub rhs: f64,
    /// Stored coefficients; unknown once coefficients live in the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nnz: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dual: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack: Option<f64>,
}

/// View of the objective in a model snapshot. Only nonzero costs are listed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveView {
    pub sense: ObjectiveSense,
    pub terms: Vec<(u32, f64)>,
}

/// A complete snapshot of a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSnapshot {
    pub name: String,
    pub state: ModelState,
    pub mip: bool,
    pub variables: Vec<VariableView>,
    pub constraints: Vec<ConstraintView>,
    pub objective: Option<ObjectiveView>,
}

impl Model {
    /// Capture the cached model state without touching the backend.
    pub fn inspect(&self) -> ModelSnapshot {
        let variables = self
            .variables()
            .map(|(id, record)| VariableView {
                id: id.inner(),
                name: record.name.clone(),
                lower: record.lower,
                upper: record.upper,
                kind: record.kind,
                value: record.value,
                reduced_cost: record.reduced_cost,
            })
            .collect();

        let constraints = self
            .constraints
            .iter()
            .enumerate()
            .map(|(row, record)| ConstraintView {
                id: record.id.inner(),
                row,
                name: record.name.clone(),
                sense: record.sense.symbol(),
                rhs: record.rhs,
                nnz: record.terms.as_ref().map(|terms| terms.len()),
                dual: record.dual,
                slack: record.slack,
            })
            .collect();

        let objective = self.objective.as_ref().map(|objective| ObjectiveView {
            sense: objective.sense,
            terms: objective
                .coefficients
                .iter()
                .enumerate()
                .filter(|(_, coeff)| **coeff != 0.0)
                .map(|(idx, coeff)| (idx as u32, *coeff))
                .collect(),
        });

        ModelSnapshot {
            name: self.name.clone(),
            state: self.state,
            mip: self.mip,
            variables,
            constraints,
            objective,
        }
    }

    /// Snapshot serialized as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.inspect())
    }
}
