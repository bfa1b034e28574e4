use std::cell::RefCell;
use std::rc::Rc;

use mymip_expr::ComparisonSense;
use mymip_solver::{
    BoundKind, ColumnBatch, LpArrays, ObjectiveSense, ProblemBackend, RowBatch, SolverError,
    SolverStatus, VarKind,
};

use crate::model::Model;

/// One backend call as observed by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Load,
    ChangeBounds(Vec<usize>, BoundKind, Vec<f64>),
    ChangeObjective(Vec<usize>, Vec<f64>),
    ChangeObjectiveSense(ObjectiveSense),
    ChangeKinds(Vec<usize>, Vec<VarKind>),
    AddRows(usize),
    AddColumns(usize),
    DeleteRows(Vec<bool>),
    ChangeRhs(Vec<usize>, Vec<f64>),
    ChangeSenses(Vec<usize>, Vec<ComparisonSense>),
    SetStart(Vec<usize>, Vec<f64>),
    SolveLp,
    SolveMip,
}

/// Shared state behind a [`RecordingBackend`], kept so tests can look at it
/// after the backend moved into a model.
#[derive(Debug, Default)]
pub(crate) struct Mirror {
    pub calls: Vec<Call>,
    pub loaded: Option<LpArrays>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub objective: Vec<f64>,
    pub row_nnz: Vec<usize>,
    /// Primal values returned after a solve; missing entries read as 0.
    pub primal: Vec<f64>,
    pub solved: bool,
    /// Operation name that should fail.
    pub fail_on: Option<&'static str>,
}

impl Mirror {
    pub fn num_cols(&self) -> usize {
        self.lower.len()
    }
}

pub(crate) struct RecordingBackend {
    mirror: Rc<RefCell<Mirror>>,
}

impl RecordingBackend {
    fn record(&self, operation: &'static str, call: Call) -> Result<(), SolverError> {
        let mut mirror = self.mirror.borrow_mut();
        mirror.calls.push(call);
        if mirror.fail_on == Some(operation) {
            return Err(SolverError::CallFailed {
                operation,
                status: -1,
            });
        }
        Ok(())
    }

    fn per_row(&self, value: impl Fn(usize) -> f64) -> Vec<f64> {
        (0..self.mirror.borrow().row_nnz.len()).map(value).collect()
    }
}

impl ProblemBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn load(&mut self, arrays: &LpArrays) -> Result<(), SolverError> {
        self.record("load", Call::Load)?;
        let mut mirror = self.mirror.borrow_mut();
        mirror.lower = arrays.lower.clone();
        mirror.upper = arrays.upper.clone();
        mirror.objective = arrays.objective.clone();
        mirror.row_nnz = vec![0; arrays.num_rows];
        for row in &arrays.row_index {
            mirror.row_nnz[*row] += 1;
        }
        mirror.loaded = Some(arrays.clone());
        Ok(())
    }

    fn change_bounds(
        &mut self,
        cols: &[usize],
        kind: BoundKind,
        values: &[f64],
    ) -> Result<(), SolverError> {
        self.record(
            "change_bounds",
            Call::ChangeBounds(cols.to_vec(), kind, values.to_vec()),
        )?;
        let mut mirror = self.mirror.borrow_mut();
        for (col, value) in cols.iter().zip(values) {
            if matches!(kind, BoundKind::Lower | BoundKind::Both) {
                mirror.lower[*col] = *value;
            }
            if matches!(kind, BoundKind::Upper | BoundKind::Both) {
                mirror.upper[*col] = *value;
            }
        }
        Ok(())
    }

    fn change_objective(&mut self, cols: &[usize], values: &[f64]) -> Result<(), SolverError> {
        self.record(
            "change_objective",
            Call::ChangeObjective(cols.to_vec(), values.to_vec()),
        )?;
        let mut mirror = self.mirror.borrow_mut();
        for (col, value) in cols.iter().zip(values) {
            mirror.objective[*col] = *value;
        }
        Ok(())
    }

    fn change_objective_sense(&mut self, sense: ObjectiveSense) -> Result<(), SolverError> {
        self.record("change_objective_sense", Call::ChangeObjectiveSense(sense))
    }

    fn change_kinds(&mut self, cols: &[usize], kinds: &[VarKind]) -> Result<(), SolverError> {
        self.record(
            "change_kinds",
            Call::ChangeKinds(cols.to_vec(), kinds.to_vec()),
        )
    }

    fn add_rows(&mut self, rows: &RowBatch) -> Result<(), SolverError> {
        self.record("add_rows", Call::AddRows(rows.len()))?;
        let mut mirror = self.mirror.borrow_mut();
        for window in rows.row_start.windows(2) {
            mirror.row_nnz.push(window[1] - window[0]);
        }
        Ok(())
    }

    fn add_columns(&mut self, columns: &ColumnBatch) -> Result<(), SolverError> {
        self.record("add_columns", Call::AddColumns(columns.len()))?;
        let mut mirror = self.mirror.borrow_mut();
        mirror.lower.extend_from_slice(&columns.lower);
        mirror.upper.extend_from_slice(&columns.upper);
        mirror.objective.extend_from_slice(&columns.objective);
        for row in &columns.row_index {
            mirror.row_nnz[*row] += 1;
        }
        Ok(())
    }

    fn delete_rows(&mut self, mask: &[bool]) -> Result<(), SolverError> {
        self.record("delete_rows", Call::DeleteRows(mask.to_vec()))?;
        let mut mirror = self.mirror.borrow_mut();
        let mut flags = mask.iter();
        mirror
            .row_nnz
            .retain(|_| !flags.next().copied().unwrap_or(false));
        Ok(())
    }

    fn change_rhs(&mut self, rows: &[usize], values: &[f64]) -> Result<(), SolverError> {
        self.record("change_rhs", Call::ChangeRhs(rows.to_vec(), values.to_vec()))
    }

    fn change_senses(
        &mut self,
        rows: &[usize],
        senses: &[ComparisonSense],
    ) -> Result<(), SolverError> {
        self.record(
            "change_senses",
            Call::ChangeSenses(rows.to_vec(), senses.to_vec()),
        )
    }

    fn set_start(&mut self, cols: &[usize], values: &[f64]) -> Result<(), SolverError> {
        self.record("set_start", Call::SetStart(cols.to_vec(), values.to_vec()))
    }

    fn solve_lp(&mut self) -> Result<(), SolverError> {
        self.record("solve_lp", Call::SolveLp)?;
        self.mirror.borrow_mut().solved = true;
        Ok(())
    }

    fn solve_mip(&mut self) -> Result<(), SolverError> {
        self.record("solve_mip", Call::SolveMip)?;
        self.mirror.borrow_mut().solved = true;
        Ok(())
    }

    fn primal(&self) -> Result<Vec<f64>, SolverError> {
        let mirror = self.mirror.borrow();
        Ok((0..mirror.num_cols())
            .map(|col| mirror.primal.get(col).copied().unwrap_or(0.0))
            .collect())
    }

    fn dual(&self) -> Result<Vec<f64>, SolverError> {
        Ok(self.per_row(|row| row as f64 + 0.5))
    }

    fn reduced_cost(&self) -> Result<Vec<f64>, SolverError> {
        Ok(vec![0.25; self.mirror.borrow().num_cols()])
    }

    fn slack(&self) -> Result<Vec<f64>, SolverError> {
        Ok(self.per_row(|row| -(row as f64)))
    }

    fn objective_value(&self) -> f64 {
        let mirror = self.mirror.borrow();
        mirror
            .objective
            .iter()
            .zip(&mirror.primal)
            .map(|(cost, value)| cost * value)
            .sum()
    }

    fn mip_gap(&self) -> Option<f64> {
        None
    }

    fn best_bound(&self) -> Option<f64> {
        self.mirror
            .borrow()
            .solved
            .then(|| self.objective_value())
    }

    fn node_count(&self) -> Option<u64> {
        self.mirror.borrow().solved.then_some(1)
    }

    fn status_code(&self) -> i32 {
        if self.mirror.borrow().solved { 1 } else { 0 }
    }

    fn status(&self) -> SolverStatus {
        if self.mirror.borrow().solved {
            SolverStatus::Optimal
        } else {
            SolverStatus::NotSolved
        }
    }

    fn status_string(&self, code: i32) -> String {
        match code {
            1 => "optimal".to_string(),
            _ => "not solved".to_string(),
        }
    }

    fn num_rows(&self) -> usize {
        self.mirror.borrow().row_nnz.len()
    }

    fn num_cols(&self) -> usize {
        self.mirror.borrow().num_cols()
    }

    fn num_nz(&self) -> usize {
        self.mirror.borrow().row_nnz.iter().sum()
    }

    fn column_bounds(&self, col: usize) -> Option<(f64, f64)> {
        let mirror = self.mirror.borrow();
        Some((*mirror.lower.get(col)?, *mirror.upper.get(col)?))
    }
}

pub(crate) fn recording() -> (Box<dyn ProblemBackend>, Rc<RefCell<Mirror>>) {
    let mirror = Rc::new(RefCell::new(Mirror::default()));
    let backend = RecordingBackend {
        mirror: Rc::clone(&mirror),
    };
    (Box::new(backend), mirror)
}

/// A fresh model over a recording backend plus a handle on its mirror.
pub(crate) fn model() -> (Model, Rc<RefCell<Mirror>>) {
    let (backend, mirror) = recording();
    (Model::new("test", backend), mirror)
}

/// Calls recorded after the initial load.
pub(crate) fn calls_after_load(mirror: &Rc<RefCell<Mirror>>) -> Vec<Call> {
    let mirror = mirror.borrow();
    let start = mirror
        .calls
        .iter()
        .position(|call| *call == Call::Load)
        .map_or(0, |idx| idx + 1);
    mirror.calls[start..].to_vec()
}
