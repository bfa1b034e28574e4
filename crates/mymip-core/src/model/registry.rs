//! Variable declaration and per-variable setters.

use mymip_expr::VariableId;
use mymip_solver::{BoundKind, ColumnBatch, VarKind};

use crate::types::{VariableRecord, VariableType};

use super::Model;
use super::error::ModelError;

/// Declaration of a new variable.
///
/// Defaults: generated name `x<index>`, continuous, bounds `[0, +inf)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableDecl {
    name: Option<String>,
    kind: VarKind,
    lower: Option<f64>,
    upper: Option<f64>,
}

impl VariableDecl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declaration with an explicit name. Declaring an existing name returns
    /// the existing variable.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: VarKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_lower(mut self, lower: f64) -> Self {
        self.lower = Some(lower);
        self
    }

    pub fn with_upper(mut self, upper: f64) -> Self {
        self.upper = Some(upper);
        self
    }

    pub fn with_bounds(self, lower: f64, upper: f64) -> Self {
        self.with_lower(lower).with_upper(upper)
    }

    pub fn with_type(mut self, preset: VariableType) -> Self {
        self.kind = preset.kind;
        if let Some((lower, upper)) = preset.bounds {
            self.lower = Some(lower);
            self.upper = Some(upper);
        }
        self
    }
}

impl Model {
    /// Declare a variable, or return the existing one with the same explicit name.
    pub fn declare(&mut self, decl: VariableDecl) -> Result<VariableId, ModelError> {
        let VariableDecl {
            name,
            kind,
            lower,
            upper,
        } = decl;

        let name = name.filter(|name| !name.is_empty());
        if let Some(existing) = name.as_deref().and_then(|name| self.variable_names.get(name)) {
            return Ok(*existing);
        }

        let lower = lower.unwrap_or(0.0);
        let upper = upper.unwrap_or(f64::INFINITY);
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(ModelError::InvalidVariableBounds { lower, upper });
        }

        Ok(self.push_variable(name, lower, upper, kind))
    }

    /// Declare a continuous `[0, +inf)` variable by name (empty for a generated name).
    pub fn variable(&mut self, name: &str) -> VariableId {
        if let Some(existing) = self.variable_names.get(name) {
            return *existing;
        }
        let name = (!name.is_empty()).then(|| name.to_string());
        self.push_variable(name, 0.0, f64::INFINITY, VarKind::Continuous)
    }

    pub fn variable_by_name(&self, name: &str) -> Option<VariableId> {
        self.variable_names.get(name).copied()
    }

    pub(crate) fn push_variable(
        &mut self,
        name: Option<String>,
        lower: f64,
        upper: f64,
        kind: VarKind,
    ) -> VariableId {
        let id = VariableId::new(self.variables.len() as u32);
        let name = name.unwrap_or_else(|| format!("x{}", id.inner()));
        self.variable_names.entry(name.clone()).or_insert(id);
        self.variables
            .push(VariableRecord::new(name, lower, upper, kind));

        if self.is_materialized() {
            self.append_live_column(id);
        }

        tracing::trace!(
            component = "model",
            operation = "declare",
            status = "success",
            variable_id = id.inner(),
            live = self.is_materialized(),
            "Declared variable"
        );
        id
    }

    /// Mirror a freshly declared variable as an empty backend column.
    fn append_live_column(&mut self, id: VariableId) {
        let record = &self.variables[id.index()];
        let mut batch = ColumnBatch::new();
        batch.push(
            std::iter::empty(),
            0.0,
            record.lower,
            record.upper,
            record.name.clone(),
        );
        let kind = record.kind;
        let result = self.backend.add_columns(&batch);
        self.report("add_columns", result);

        if !kind.is_continuous() {
            let result = self.backend.change_kinds(&[id.index()], &[kind]);
            self.report("change_kinds", result);
            self.mip = true;
        }
        if let Some(objective) = self.objective.as_mut() {
            objective.coefficients.push(0.0);
        }
        self.touch();
    }

    /// Current `(lower, upper)` bounds.
    pub fn bounds(&self, id: VariableId) -> Result<(f64, f64), ModelError> {
        let record = self.get_variable(id)?;
        Ok((record.lower, record.upper))
    }

    /// Primal value of the last solve.
    pub fn value(&self, id: VariableId) -> Option<f64> {
        self.variables.get(id.index()).and_then(|record| record.value)
    }

    /// Reduced cost of the last LP solve.
    pub fn reduced_cost(&self, id: VariableId) -> Option<f64> {
        self.variables
            .get(id.index())
            .and_then(|record| record.reduced_cost)
    }

    pub fn set_lower(&mut self, id: VariableId, value: f64) -> Result<(), ModelError> {
        self.change_bound(id, BoundKind::Lower, value)
    }

    pub fn set_upper(&mut self, id: VariableId, value: f64) -> Result<(), ModelError> {
        self.change_bound(id, BoundKind::Upper, value)
    }

    pub fn set_bounds(&mut self, id: VariableId, lower: f64, upper: f64) -> Result<(), ModelError> {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(ModelError::InvalidVariableBounds { lower, upper });
        }
        self.change_bound(id, BoundKind::Lower, lower)?;
        self.change_bound(id, BoundKind::Upper, upper)
    }

    /// Fix a variable: both bounds become `value`.
    pub fn fix(&mut self, id: VariableId, value: f64) -> Result<(), ModelError> {
        self.change_bound(id, BoundKind::Both, value)
    }

    fn change_bound(&mut self, id: VariableId, kind: BoundKind, value: f64) -> Result<(), ModelError> {
        if value.is_nan() {
            return Err(ModelError::InvalidVariableBounds {
                lower: value,
                upper: value,
            });
        }
        let record = self.variable_mut(id)?;
        match kind {
            BoundKind::Lower => record.lower = value,
            BoundKind::Upper => record.upper = value,
            BoundKind::Both => {
                record.lower = value;
                record.upper = value;
            }
        }

        if self.is_materialized() {
            let result = self.backend.change_bounds(&[id.index()], kind, &[value]);
            self.report("change_bounds", result);
            self.touch();
        }
        Ok(())
    }

    pub fn set_kind(&mut self, id: VariableId, kind: VarKind) -> Result<(), ModelError> {
        self.variable_mut(id)?.kind = kind;
        if self.is_materialized() {
            let result = self.backend.change_kinds(&[id.index()], &[kind]);
            self.report("change_kinds", result);
            if !kind.is_continuous() {
                self.mip = true;
            }
            self.touch();
        }
        Ok(())
    }

    /// Apply a kind preset and, when it carries them, its bounds.
    pub fn apply_type(&mut self, id: VariableId, preset: VariableType) -> Result<(), ModelError> {
        self.set_kind(id, preset.kind)?;
        if let Some((lower, upper)) = preset.bounds {
            self.set_bounds(id, lower, upper)?;
        }
        Ok(())
    }

    pub fn apply_type_all(
        &mut self,
        ids: impl IntoIterator<Item = VariableId>,
        preset: VariableType,
    ) -> Result<(), ModelError> {
        for id in ids {
            self.apply_type(id, preset)?;
        }
        Ok(())
    }
}
