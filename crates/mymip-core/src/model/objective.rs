//! Objective sense and cost coefficients.

use mymip_expr::{Expr, VariableId};
use mymip_solver::ObjectiveSense;

use crate::types::Objective;

use super::Model;
use super::error::ModelError;

impl Model {
    pub fn minimize(&mut self, objective: impl Into<Expr>) -> Result<(), ModelError> {
        self.set_objective(ObjectiveSense::Minimize, objective)
    }

    pub fn maximize(&mut self, objective: impl Into<Expr>) -> Result<(), ModelError> {
        self.set_objective(ObjectiveSense::Maximize, objective)
    }

    /// Replace the objective. Variables absent from `objective` get cost 0 and
    /// the constant term is ignored.
    pub fn set_objective(
        &mut self,
        sense: ObjectiveSense,
        objective: impl Into<Expr>,
    ) -> Result<(), ModelError> {
        let objective = objective.into();
        let mut coefficients = vec![0.0; self.variables.len()];
        for (var, coeff) in objective.terms().variables() {
            self.ensure_variable_exists(var)?;
            coefficients[var.index()] = coeff;
        }

        if self.is_materialized() {
            let result = self.backend.change_objective_sense(sense);
            self.report("change_objective_sense", result);
            let indices = (0..coefficients.len()).collect::<Vec<_>>();
            let result = self.backend.change_objective(&indices, &coefficients);
            self.report("change_objective", result);
            self.touch();
        }

        tracing::debug!(
            component = "model",
            operation = "set_objective",
            status = "success",
            sense = sense.as_str(),
            terms = objective.len(),
            live = self.is_materialized(),
            "Set objective"
        );
        self.objective = Some(Objective {
            sense,
            coefficients,
        });
        Ok(())
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    pub fn objective_sense(&self) -> ObjectiveSense {
        self.objective
            .as_ref()
            .map_or(ObjectiveSense::Minimize, |objective| objective.sense)
    }

    /// Objective coefficient of a variable (0 without an objective).
    pub fn cost(&self, id: VariableId) -> Result<f64, ModelError> {
        self.ensure_variable_exists(id)?;
        Ok(self
            .objective
            .as_ref()
            .and_then(|objective| objective.coefficients.get(id.index()).copied())
            .unwrap_or(0.0))
    }

    pub fn set_cost(&mut self, id: VariableId, cost: f64) -> Result<(), ModelError> {
        self.set_costs(Expr::term(id, cost))
    }

    /// Patch only the cost coefficients of the variables in `costs`.
    pub fn set_costs(&mut self, costs: impl Into<Expr>) -> Result<(), ModelError> {
        let costs = costs.into();
        let mut indices = Vec::with_capacity(costs.len());
        let mut values = Vec::with_capacity(costs.len());
        for (var, coeff) in costs.terms().variables() {
            self.ensure_variable_exists(var)?;
            if !coeff.is_finite() {
                return Err(ModelError::InvalidCoefficient { value: coeff });
            }
            indices.push(var.index());
            values.push(coeff);
        }

        let objective = self.objective_for_update()?;
        for (idx, value) in indices.iter().zip(&values) {
            objective.coefficients[*idx] = *value;
        }

        if self.is_materialized() {
            let result = self.backend.change_objective(&indices, &values);
            self.report("change_objective", result);
            self.touch();
        }
        Ok(())
    }

    /// The objective, created as an all-zero minimization when missing.
    pub(crate) fn objective_for_update(&mut self) -> Result<&mut Objective, ModelError> {
        let variables = self.variables.len();
        let objective = self.objective.get_or_insert_with(|| Objective {
            sense: ObjectiveSense::Minimize,
            coefficients: vec![0.0; variables],
        });
        if objective.coefficients.len() != variables {
            return Err(ModelError::ObjectiveLengthMismatch {
                objective: objective.coefficients.len(),
                variables,
            });
        }
        Ok(objective)
    }
}
