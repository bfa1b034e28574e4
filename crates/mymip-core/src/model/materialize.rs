//! Compressed array build and the one-time backend load.

use std::time::Instant;

use mymip_expr::ComparisonSense;
use mymip_solver::{LpArrays, ObjectiveSense, VarKind};

use crate::types::ModelState;

use super::Model;
use super::error::ModelError;

const DUMMY_ROW_NAME: &str = "dummy";

impl Model {
    /// Build the column-wise arrays for the staged model.
    ///
    /// Coefficients within a column are ordered by increasing row. Rows with
    /// an empty name are named `C<row>`.
    pub(crate) fn build_arrays(&self) -> Result<LpArrays, ModelError> {
        let num_cols = self.variables.len();
        let num_rows = self.constraints.len();

        let (sense, objective) = match &self.objective {
            None => (ObjectiveSense::Minimize, vec![0.0; num_cols]),
            Some(objective) if objective.coefficients.len() != num_cols => {
                return Err(ModelError::ObjectiveLengthMismatch {
                    objective: objective.coefficients.len(),
                    variables: num_cols,
                });
            }
            Some(objective) => (objective.sense, objective.coefficients.clone()),
        };

        let mut columns: Vec<Vec<(usize, f64)>> = vec![Vec::new(); num_cols];
        let mut rhs = Vec::with_capacity(num_rows);
        let mut row_senses = Vec::with_capacity(num_rows);
        let mut row_names = Vec::with_capacity(num_rows);
        for (row, record) in self.constraints.iter().enumerate() {
            rhs.push(record.rhs);
            row_senses.push(record.sense);
            row_names.push(if record.name.is_empty() {
                format!("C{row}")
            } else {
                record.name.clone()
            });
            let Some(terms) = record.terms.as_ref() else {
                continue;
            };
            for (var, coeff) in terms.variables() {
                let column = columns
                    .get_mut(var.index())
                    .ok_or(ModelError::InvalidVariableId(var))?;
                column.push((row, coeff));
            }
        }

        let num_nz = columns.iter().map(Vec::len).sum();
        let mut col_start = Vec::with_capacity(num_cols + 1);
        let mut row_index = Vec::with_capacity(num_nz);
        let mut values = Vec::with_capacity(num_nz);
        col_start.push(0);
        for column in columns {
            for (row, coeff) in column {
                row_index.push(row);
                values.push(coeff);
            }
            col_start.push(values.len());
        }

        let mip = self.variables.iter().any(|record| !record.kind.is_continuous());
        let kinds = mip.then(|| {
            self.variables
                .iter()
                .map(|record| record.kind)
                .collect::<Vec<VarKind>>()
        });

        Ok(LpArrays {
            num_cols,
            num_rows,
            sense,
            objective,
            lower: self.variables.iter().map(|record| record.lower).collect(),
            upper: self.variables.iter().map(|record| record.upper).collect(),
            rhs,
            row_senses,
            col_start,
            row_index,
            values,
            col_names: self.variables.iter().map(|record| record.name.clone()).collect(),
            row_names,
            kinds,
        })
    }

    /// Load the staged model into the backend. A no-op once materialized.
    ///
    /// A failing backend load is logged and kept in [`Model::last_error`];
    /// the model still moves to the materialized state.
    pub fn materialize(&mut self) -> Result<(), ModelError> {
        if self.is_materialized() {
            tracing::trace!(
                component = "model",
                operation = "materialize",
                status = "skipped",
                "Model already materialized"
            );
            return Ok(());
        }

        let started = Instant::now();
        let mut arrays = self.build_arrays()?;
        let dummy_row = arrays.num_rows == 0 && arrays.num_cols > 0;
        if dummy_row {
            push_dummy_row(&mut arrays);
        }

        let result = self.backend.load(&arrays);
        let loaded = result.is_ok();
        self.report("load", result);
        if dummy_row && loaded {
            let result = self.backend.delete_rows(&[true]);
            self.report("delete_rows", result);
        }

        for record in &mut self.constraints {
            record.terms = None;
        }
        self.mip = arrays.is_mip();
        self.state = ModelState::Materialized;

        tracing::debug!(
            component = "model",
            operation = "materialize",
            status = if loaded { "success" } else { "error" },
            model = %self.name(),
            variables = arrays.num_cols,
            constraints = self.constraints.len(),
            nonzeros = arrays.num_nz(),
            mip = self.mip,
            dummy_row,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Materialized model"
        );
        Ok(())
    }
}

/// Append `1 * x_last = 0` so a row-less problem can be loaded.
fn push_dummy_row(arrays: &mut LpArrays) {
    arrays.num_rows = 1;
    arrays.rhs.push(0.0);
    arrays.row_senses.push(ComparisonSense::Equal);
    arrays.row_names.push(DUMMY_ROW_NAME.to_string());
    arrays.row_index.push(0);
    arrays.values.push(1.0);
    if let Some(last) = arrays.col_start.last_mut() {
        *last = 1;
    }
}
