//! Solve, result retrieval and row/column edits.
//!
//! Every edit checks the model state: staged models only mutate in-memory
//! records, materialized models additionally issue the matching backend call
//! so row and column positions stay aligned with the backend problem.

use std::time::Instant;

use mymip_expr::{ComparisonSense, ConstraintId, VariableId};
use mymip_solver::{ColumnBatch, RowBatch, SolverStatus, VarKind};

use crate::types::{ConstraintRecord, ModelState, VariableRecord};

use super::Model;
use super::error::ModelError;
use super::flatten::{ConstraintGroup, flatten};

impl Model {
    /// Materialize if needed, solve, and copy results back into the records.
    ///
    /// Infeasible or unbounded outcomes are not errors: inspect
    /// [`Model::solve_status`] or [`Model::status`].
    pub fn optimize(&mut self) -> Result<SolverStatus, ModelError> {
        self.materialize()?;

        let started = Instant::now();
        let (operation, result) = if self.mip {
            ("solve_mip", self.backend.solve_mip())
        } else {
            ("solve_lp", self.backend.solve_lp())
        };
        self.report(operation, result);
        self.retrieve_solution();
        self.state = ModelState::Solved;

        let status = self.backend.status();
        tracing::debug!(
            component = "model",
            operation = "optimize",
            status = status.as_str(),
            model = %self.name(),
            mip = self.mip,
            objective = self.backend.objective_value(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Solved model"
        );
        Ok(status)
    }

    fn retrieve_solution(&mut self) {
        match self.backend.primal() {
            Ok(values) => {
                for (record, value) in self.variables.iter_mut().zip(values) {
                    record.value = Some(value);
                }
            }
            Err(err) => self.report("primal", Err(err)),
        }

        if !self.mip {
            match self.backend.reduced_cost() {
                Ok(values) => {
                    for (record, value) in self.variables.iter_mut().zip(values) {
                        record.reduced_cost = Some(value);
                    }
                }
                Err(err) => self.report("reduced_cost", Err(err)),
            }
            match self.backend.dual() {
                Ok(values) => {
                    for (record, value) in self.constraints.iter_mut().zip(values) {
                        record.dual = Some(value);
                    }
                }
                Err(err) => self.report("dual", Err(err)),
            }
        }

        match self.backend.slack() {
            Ok(values) => {
                for (record, value) in self.constraints.iter_mut().zip(values) {
                    record.slack = Some(value);
                }
            }
            Err(err) => self.report("slack", Err(err)),
        }
    }

    /// Add a block of constraints named from the block counter (`R<k>`).
    pub fn subject_to(
        &mut self,
        group: impl Into<ConstraintGroup>,
    ) -> Result<Vec<ConstraintId>, ModelError> {
        let prefix = format!("R{}", self.block_count);
        self.block_count += 1;
        self.add_group(group.into(), &prefix)
    }

    /// Add a block of constraints named from `name`.
    pub fn subject_to_named(
        &mut self,
        name: &str,
        group: impl Into<ConstraintGroup>,
    ) -> Result<Vec<ConstraintId>, ModelError> {
        if name.is_empty() {
            return self.subject_to(group);
        }
        self.add_group(group.into(), name)
    }

    /// Same as [`Model::subject_to`]; reads better for edits after a solve.
    pub fn add_rows(
        &mut self,
        group: impl Into<ConstraintGroup>,
    ) -> Result<Vec<ConstraintId>, ModelError> {
        self.subject_to(group)
    }

    pub fn add_rows_named(
        &mut self,
        name: &str,
        group: impl Into<ConstraintGroup>,
    ) -> Result<Vec<ConstraintId>, ModelError> {
        self.subject_to_named(name, group)
    }

    fn add_group(
        &mut self,
        group: ConstraintGroup,
        prefix: &str,
    ) -> Result<Vec<ConstraintId>, ModelError> {
        let rows = flatten(group, prefix)?;
        for named in &rows {
            let constraint = &named.constraint;
            if constraint.rhs().is_nan() {
                return Err(ModelError::InvalidCoefficient {
                    value: constraint.rhs(),
                });
            }
            for (var, coeff) in constraint.terms().variables() {
                self.ensure_variable_exists(var)?;
                if !coeff.is_finite() {
                    return Err(ModelError::InvalidCoefficient { value: coeff });
                }
            }
        }

        let live = self.is_materialized();
        let mut batch = RowBatch::new();
        let mut ids = Vec::with_capacity(rows.len());
        for named in rows {
            let row = self.constraints.len();
            let name = if named.name.is_empty() {
                format!("C{row}")
            } else {
                named.name
            };
            let (terms, sense, rhs) = named.constraint.into_parts();
            if live {
                batch.push(
                    terms.variables().map(|(var, coeff)| (var.index(), coeff)),
                    sense,
                    rhs,
                    name.clone(),
                );
            }

            let id = self.allocate_constraint_id();
            self.constraints.push(ConstraintRecord {
                id,
                name,
                sense,
                rhs,
                terms: (!live).then_some(terms),
                dual: None,
                slack: None,
            });
            self.row_positions.insert(id, row);
            ids.push(id);
        }

        if live && !batch.is_empty() {
            let result = self.backend.add_rows(&batch);
            self.report("add_rows", result);
            self.touch();
        }

        tracing::debug!(
            component = "model",
            operation = "add_rows",
            status = "success",
            prefix,
            rows = ids.len(),
            live,
            "Added constraint block"
        );
        Ok(ids)
    }

    /// Add a variable together with its coefficients in existing rows.
    ///
    /// The cost is appended to the objective (an all-zero minimization is
    /// created when the cost is nonzero and no objective exists).
    pub fn new_column(
        &mut self,
        coefficients: &[(ConstraintId, f64)],
        cost: f64,
        lower: f64,
        upper: f64,
        name: &str,
    ) -> Result<VariableId, ModelError> {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(ModelError::InvalidVariableBounds { lower, upper });
        }
        if !cost.is_finite() {
            return Err(ModelError::InvalidCoefficient { value: cost });
        }
        let mut entries = Vec::with_capacity(coefficients.len());
        for (constraint, coeff) in coefficients {
            if !coeff.is_finite() {
                return Err(ModelError::InvalidCoefficient { value: *coeff });
            }
            entries.push((self.row_index(*constraint)?, *coeff));
        }
        if self.objective.is_some() || cost != 0.0 {
            self.objective_for_update()?;
        }

        let id = VariableId::new(self.variables.len() as u32);
        let name = if name.is_empty() {
            format!("x{}", id.inner())
        } else {
            name.to_string()
        };
        self.variable_names.entry(name.clone()).or_insert(id);
        self.variables.push(VariableRecord::new(
            name.clone(),
            lower,
            upper,
            VarKind::Continuous,
        ));
        if let Some(objective) = self.objective.as_mut() {
            objective.coefficients.push(cost);
        }

        if self.is_materialized() {
            let mut batch = ColumnBatch::new();
            batch.push(entries, cost, lower, upper, name);
            let result = self.backend.add_columns(&batch);
            self.report("add_columns", result);
            self.touch();
        } else {
            for (row, coeff) in entries {
                self.constraints[row]
                    .terms
                    .get_or_insert_with(Default::default)
                    .add_term(id, coeff);
            }
        }

        tracing::trace!(
            component = "model",
            operation = "new_column",
            status = "success",
            variable_id = id.inner(),
            nonzeros = coefficients.len(),
            "Added column"
        );
        Ok(id)
    }

    /// Remove rows. Remaining rows keep their order; deleted ids become invalid.
    pub fn delete_rows(&mut self, ids: &[ConstraintId]) -> Result<(), ModelError> {
        let mut mask = vec![false; self.constraints.len()];
        for id in ids {
            mask[self.row_index(*id)?] = true;
        }

        if self.is_materialized() {
            let result = self.backend.delete_rows(&mask);
            self.report("delete_rows", result);
            self.touch();
        }

        let mut flags = mask.iter();
        self.constraints
            .retain(|_| !flags.next().copied().unwrap_or(false));
        self.rebuild_row_positions();

        tracing::debug!(
            component = "model",
            operation = "delete_rows",
            status = "success",
            deleted = mask.iter().filter(|flag| **flag).count(),
            remaining = self.constraints.len(),
            "Deleted rows"
        );
        Ok(())
    }

    pub fn change_rhs(&mut self, changes: &[(ConstraintId, f64)]) -> Result<(), ModelError> {
        let mut rows = Vec::with_capacity(changes.len());
        for (id, value) in changes {
            if value.is_nan() {
                return Err(ModelError::InvalidCoefficient { value: *value });
            }
            rows.push(self.row_index(*id)?);
        }
        let values = changes.iter().map(|(_, value)| *value).collect::<Vec<_>>();
        for (row, value) in rows.iter().zip(&values) {
            self.constraints[*row].rhs = *value;
        }

        if self.is_materialized() {
            let result = self.backend.change_rhs(&rows, &values);
            self.report("change_rhs", result);
            self.touch();
        }
        Ok(())
    }

    pub fn change_sense(
        &mut self,
        changes: &[(ConstraintId, ComparisonSense)],
    ) -> Result<(), ModelError> {
        let rows = changes
            .iter()
            .map(|(id, _)| self.row_index(*id))
            .collect::<Result<Vec<_>, _>>()?;
        let senses = changes.iter().map(|(_, sense)| *sense).collect::<Vec<_>>();
        for (row, sense) in rows.iter().zip(&senses) {
            self.constraints[*row].sense = *sense;
        }

        if self.is_materialized() {
            let result = self.backend.change_senses(&rows, &senses);
            self.report("change_senses", result);
            self.touch();
        }
        Ok(())
    }

    /// Provide a (possibly partial) starting solution for the next MIP solve.
    pub fn mip_start(&mut self, values: &[(VariableId, f64)]) -> Result<(), ModelError> {
        for (id, _) in values {
            self.ensure_variable_exists(*id)?;
        }
        self.materialize()?;
        let cols = values.iter().map(|(id, _)| id.index()).collect::<Vec<_>>();
        let vals = values.iter().map(|(_, value)| *value).collect::<Vec<_>>();
        let result = self.backend.set_start(&cols, &vals);
        self.report("set_start", result);
        Ok(())
    }

    /// Objective value reported by the backend for the last solve.
    pub fn objective_value(&self) -> f64 {
        self.backend.objective_value()
    }

    pub fn solve_status(&self) -> SolverStatus {
        if self.state == ModelState::Building {
            return SolverStatus::NotSolved;
        }
        self.backend.status()
    }

    pub fn status_code(&self) -> i32 {
        self.backend.status_code()
    }

    /// Backend text for the status of the last solve.
    pub fn status(&self) -> String {
        self.backend.status_string(self.backend.status_code())
    }

    pub fn mip_gap(&self) -> Option<f64> {
        self.backend.mip_gap()
    }

    /// Best proven objective bound of the last MIP solve.
    pub fn best_bound(&self) -> Option<f64> {
        self.backend.best_bound()
    }

    /// Branch-and-bound nodes explored by the last MIP solve.
    pub fn node_count(&self) -> Option<u64> {
        self.backend.node_count()
    }

    pub fn num_rows(&self) -> usize {
        if self.is_materialized() {
            self.backend.num_rows()
        } else {
            self.constraints.len()
        }
    }

    pub fn num_cols(&self) -> usize {
        if self.is_materialized() {
            self.backend.num_cols()
        } else {
            self.variables.len()
        }
    }

    pub fn num_nz(&self) -> usize {
        if self.is_materialized() {
            self.backend.num_nz()
        } else {
            self.constraints
                .iter()
                .filter_map(|record| record.terms.as_ref())
                .map(|terms| terms.len())
                .sum()
        }
    }

    /// Dual value of the last LP solve.
    pub fn dual(&self, id: ConstraintId) -> Option<f64> {
        self.get_constraint(id).ok().and_then(|record| record.dual)
    }

    /// `rhs - activity` at the last solve.
    pub fn slack(&self, id: ConstraintId) -> Option<f64> {
        self.get_constraint(id).ok().and_then(|record| record.slack)
    }
}
