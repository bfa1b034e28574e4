//! Compressed array layouts handed to a backend.
//!
//! `LpArrays` is the full column-wise (CSC) problem passed on load.
//! `RowBatch` (row-wise) and `ColumnBatch` (column-wise) carry incremental
//! appends to a loaded problem.

use mymip_expr::ComparisonSense;

use crate::error::SolverError;
use crate::kinds::{ObjectiveSense, VarKind};

/// A complete problem in compressed sparse column form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LpArrays {
    pub num_cols: usize,
    pub num_rows: usize,
    pub sense: ObjectiveSense,
    pub objective: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub rhs: Vec<f64>,
    pub row_senses: Vec<ComparisonSense>,
    /// Column start offsets, length `num_cols + 1`.
    pub col_start: Vec<usize>,
    pub row_index: Vec<usize>,
    pub values: Vec<f64>,
    pub col_names: Vec<String>,
    pub row_names: Vec<String>,
    /// Column kinds; `None` for a pure LP.
    pub kinds: Option<Vec<VarKind>>,
}

impl LpArrays {
    pub fn num_nz(&self) -> usize {
        self.values.len()
    }

    pub fn is_mip(&self) -> bool {
        self.kinds.is_some()
    }

    /// Entries of column `col` as `(row, value)` pairs.
    pub fn column(&self, col: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.col_start.get(col).copied().unwrap_or(0);
        let end = self.col_start.get(col + 1).copied().unwrap_or(start);
        self.row_index[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter().copied())
    }

    /// Check array lengths and the offset structure.
    pub fn validate(&self) -> Result<(), SolverError> {
        let n = self.num_cols;
        let m = self.num_rows;
        if self.objective.len() != n || self.lower.len() != n || self.upper.len() != n {
            return Err(invalid("column arrays must have num_cols entries"));
        }
        if self.rhs.len() != m || self.row_senses.len() != m {
            return Err(invalid("row arrays must have num_rows entries"));
        }
        if !self.col_names.is_empty() && self.col_names.len() != n {
            return Err(invalid("col_names must be empty or have num_cols entries"));
        }
        if !self.row_names.is_empty() && self.row_names.len() != m {
            return Err(invalid("row_names must be empty or have num_rows entries"));
        }
        if self.kinds.as_ref().is_some_and(|kinds| kinds.len() != n) {
            return Err(invalid("kinds must have num_cols entries"));
        }
        validate_compressed(
            &self.col_start,
            n,
            &self.row_index,
            m,
            &self.values,
            "col_start",
        )
    }
}

/// Rows to append, in compressed sparse row form over existing columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowBatch {
    pub rhs: Vec<f64>,
    pub senses: Vec<ComparisonSense>,
    /// Row start offsets, length `len() + 1`.
    pub row_start: Vec<usize>,
    pub col_index: Vec<usize>,
    pub values: Vec<f64>,
    pub names: Vec<String>,
}

impl RowBatch {
    pub fn new() -> Self {
        Self {
            row_start: vec![0],
            ..Default::default()
        }
    }

    /// Append one row given its `(column, value)` entries.
    pub fn push(
        &mut self,
        entries: impl IntoIterator<Item = (usize, f64)>,
        sense: ComparisonSense,
        rhs: f64,
        name: impl Into<String>,
    ) {
        for (col, value) in entries {
            self.col_index.push(col);
            self.values.push(value);
        }
        self.row_start.push(self.values.len());
        self.senses.push(sense);
        self.rhs.push(rhs);
        self.names.push(name.into());
    }

    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    pub fn num_nz(&self) -> usize {
        self.values.len()
    }

    pub fn validate(&self, num_cols: usize) -> Result<(), SolverError> {
        if self.senses.len() != self.len() || self.names.len() != self.len() {
            return Err(invalid("row batch arrays must have one entry per row"));
        }
        validate_compressed(
            &self.row_start,
            self.len(),
            &self.col_index,
            num_cols,
            &self.values,
            "row_start",
        )
    }
}

/// Columns to append, in compressed sparse column form over existing rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnBatch {
    pub objective: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    /// Column start offsets, length `len() + 1`.
    pub col_start: Vec<usize>,
    pub row_index: Vec<usize>,
    pub values: Vec<f64>,
    pub names: Vec<String>,
}

impl ColumnBatch {
    pub fn new() -> Self {
        Self {
            col_start: vec![0],
            ..Default::default()
        }
    }

    /// Append one column given its `(row, value)` entries.
    pub fn push(
        &mut self,
        entries: impl IntoIterator<Item = (usize, f64)>,
        cost: f64,
        lower: f64,
        upper: f64,
        name: impl Into<String>,
    ) {
        for (row, value) in entries {
            self.row_index.push(row);
            self.values.push(value);
        }
        self.col_start.push(self.values.len());
        self.objective.push(cost);
        self.lower.push(lower);
        self.upper.push(upper);
        self.names.push(name.into());
    }

    pub fn len(&self) -> usize {
        self.objective.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objective.is_empty()
    }

    pub fn num_nz(&self) -> usize {
        self.values.len()
    }

    pub fn validate(&self, num_rows: usize) -> Result<(), SolverError> {
        let n = self.len();
        if self.lower.len() != n || self.upper.len() != n || self.names.len() != n {
            return Err(invalid("column batch arrays must have one entry per column"));
        }
        validate_compressed(
            &self.col_start,
            n,
            &self.row_index,
            num_rows,
            &self.values,
            "col_start",
        )
    }
}

fn invalid(reason: &str) -> SolverError {
    SolverError::InvalidArgument(reason.to_string())
}

fn validate_compressed(
    starts: &[usize],
    outer: usize,
    inner_index: &[usize],
    inner_len: usize,
    values: &[f64],
    label: &str,
) -> Result<(), SolverError> {
    if starts.len() != outer + 1 {
        return Err(SolverError::InvalidArgument(format!(
            "{label} length must be {}",
            outer + 1
        )));
    }
    if inner_index.len() != values.len() {
        return Err(invalid("index and value arrays must be the same length"));
    }
    if starts.first().copied().unwrap_or(0) != 0 {
        return Err(SolverError::InvalidArgument(format!(
            "{label} must start at 0"
        )));
    }
    if starts.last().copied().unwrap_or(0) != values.len() {
        return Err(SolverError::InvalidArgument(format!(
            "{label} last entry must equal values length"
        )));
    }
    if starts.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(SolverError::InvalidArgument(format!(
            "{label} must be non-decreasing"
        )));
    }
    if let Some(position) = inner_index.iter().position(|&idx| idx >= inner_len) {
        return Err(SolverError::InvalidArgument(format!(
            "index out of bounds at position {position}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ColumnBatch, LpArrays, RowBatch};
    use crate::{ObjectiveSense, SolverError};
    use mymip_expr::ComparisonSense;

    fn two_by_two() -> LpArrays {
        LpArrays {
            num_cols: 2,
            num_rows: 1,
            sense: ObjectiveSense::Minimize,
            objective: vec![1.0, 0.0],
            lower: vec![0.0, 0.0],
            upper: vec![1.0, f64::INFINITY],
            rhs: vec![2.0],
            row_senses: vec![ComparisonSense::Equal],
            col_start: vec![0, 1, 2],
            row_index: vec![0, 0],
            values: vec![1.0, 1.0],
            col_names: vec!["x0".into(), "x1".into()],
            row_names: vec!["R0".into()],
            kinds: None,
        }
    }

    #[test]
    fn valid_arrays_pass() {
        let arrays = two_by_two();
        assert_eq!(arrays.validate(), Ok(()));
        assert_eq!(arrays.num_nz(), 2);
        assert_eq!(arrays.column(1).collect::<Vec<_>>(), vec![(0, 1.0)]);
    }

    #[test]
    fn out_of_range_row_is_rejected() {
        let mut arrays = two_by_two();
        arrays.row_index[1] = 3;
        assert!(matches!(
            arrays.validate(),
            Err(SolverError::InvalidArgument(_))
        ));
    }

    #[test]
    fn short_column_starts_are_rejected() {
        let mut arrays = two_by_two();
        arrays.col_start.pop();
        assert!(arrays.validate().is_err());
    }

    #[test]
    fn row_batch_push_builds_offsets() {
        let mut batch = RowBatch::new();
        batch.push([(0, 1.0), (2, -1.0)], ComparisonSense::LessEqual, 4.0, "C0");
        batch.push(std::iter::empty(), ComparisonSense::GreaterEqual, 0.0, "C1");
        assert_eq!(batch.row_start, vec![0, 2, 2]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.validate(3), Ok(()));
        assert!(batch.validate(2).is_err());
    }

    #[test]
    fn column_batch_push_builds_offsets() {
        let mut batch = ColumnBatch::new();
        batch.push([(1, 2.0)], 5.0, 0.0, 10.0, "y");
        assert_eq!(batch.col_start, vec![0, 1]);
        assert_eq!(batch.num_nz(), 1);
        assert_eq!(batch.validate(2), Ok(()));
        assert!(batch.validate(1).is_err());
    }
}
