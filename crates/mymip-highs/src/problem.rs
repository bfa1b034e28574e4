//! `ProblemBackend` implementation over a HiGHS instance.

use std::rc::Rc;
use std::time::Instant;

use mymip_expr::ComparisonSense;
use mymip_solver::{
    BoundKind, ColumnBatch, LpArrays, ObjectiveSense, ProblemBackend, RowBatch, SolverError,
    SolverStatus, VarKind,
};
use tracing::{debug, trace};

use crate::environment::Environment;
use crate::ffi::{HighsHandle, HighsInt, ModelArrays, RawSolution, to_highs_int};
use crate::output::OutputGuard;
use crate::status;

/// One HiGHS problem instance created by an [`Environment`].
///
/// HiGHS stores rows as `lower <= a x <= upper`; the problem keeps shadow
/// copies of row sense/rhs and column bounds so single-sided edits can be
/// turned into full bound pairs.
pub struct HighsProblem {
    name: String,
    handle: HighsHandle,
    env: Rc<Environment>,
    col_lower: Vec<f64>,
    col_upper: Vec<f64>,
    row_senses: Vec<ComparisonSense>,
    row_rhs: Vec<f64>,
    solved: bool,
}

impl HighsProblem {
    pub(crate) fn new(env: Rc<Environment>, name: &str) -> Result<Self, SolverError> {
        let handle = HighsHandle::create()?;
        env.configure(&handle)?;
        debug!(
            component = "highs",
            operation = "create_problem",
            status = "success",
            problem = name,
            "Created HiGHS problem"
        );
        Ok(Self {
            name: name.to_string(),
            handle,
            env,
            col_lower: Vec::new(),
            col_upper: Vec::new(),
            row_senses: Vec::new(),
            row_rhs: Vec::new(),
            solved: false,
        })
    }

    pub fn problem_name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> &Rc<Environment> {
        &self.env
    }

    fn check_cols(&self, cols: &[usize]) -> Result<Vec<HighsInt>, SolverError> {
        check_indices(cols, self.col_lower.len(), "column")
    }

    fn check_rows(&self, rows: &[usize]) -> Result<Vec<HighsInt>, SolverError> {
        check_indices(rows, self.row_rhs.len(), "row")
    }

    fn push_row_bounds(&self, rows: &[usize]) -> Result<(), SolverError> {
        let set = self.check_rows(rows)?;
        let (lower, upper): (Vec<f64>, Vec<f64>) = rows
            .iter()
            .map(|row| row_bounds(self.row_senses[*row], self.row_rhs[*row]))
            .unzip();
        self.handle.change_row_bounds(&set, &lower, &upper)
    }

    fn run(&mut self, operation: &'static str) -> Result<(), SolverError> {
        let started = Instant::now();
        let output = self.env.output_enabled();
        let result = {
            let _guard = OutputGuard::new(&self.handle, output);
            self.handle.run()
        };
        self.solved = true;
        debug!(
            component = "highs",
            operation,
            status = if result.is_ok() { "success" } else { "error" },
            problem = %self.name,
            model_status = status::status_text(self.status_code()),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "HiGHS run finished"
        );
        result
    }

    fn raw_solution(&self) -> Result<RawSolution, SolverError> {
        if !self.solved {
            return Ok(RawSolution {
                col_value: vec![0.0; self.col_lower.len()],
                col_dual: vec![0.0; self.col_lower.len()],
                row_value: vec![0.0; self.row_rhs.len()],
                row_dual: vec![0.0; self.row_rhs.len()],
            });
        }
        self.handle.solution()
    }
}

impl ProblemBackend for HighsProblem {
    fn name(&self) -> &str {
        "highs"
    }

    fn load(&mut self, arrays: &LpArrays) -> Result<(), SolverError> {
        arrays.validate()?;
        let (row_lower, row_upper): (Vec<f64>, Vec<f64>) = arrays
            .row_senses
            .iter()
            .zip(&arrays.rhs)
            .map(|(sense, rhs)| row_bounds(*sense, *rhs))
            .unzip();
        let a_start = to_highs_ints(&arrays.col_start[..arrays.num_cols])?;
        let a_index = to_highs_ints(&arrays.row_index)?;
        let integrality = arrays
            .kinds
            .as_ref()
            .map(|kinds| kinds.iter().map(|kind| integrality(*kind)).collect::<Vec<_>>());

        self.handle.pass_model(&ModelArrays {
            sense: objective_sense(arrays.sense),
            col_cost: &arrays.objective,
            col_lower: &arrays.lower,
            col_upper: &arrays.upper,
            row_lower: &row_lower,
            row_upper: &row_upper,
            a_start: &a_start,
            a_index: &a_index,
            a_value: &arrays.values,
            integrality: integrality.as_deref(),
        })?;

        self.col_lower = arrays.lower.clone();
        self.col_upper = arrays.upper.clone();
        self.row_senses = arrays.row_senses.clone();
        self.row_rhs = arrays.rhs.clone();
        self.solved = false;
        debug!(
            component = "highs",
            operation = "load",
            status = "success",
            problem = %self.name,
            num_cols = arrays.num_cols,
            num_rows = arrays.num_rows,
            num_nz = arrays.num_nz(),
            mip = arrays.is_mip(),
            "Passed model to HiGHS"
        );
        Ok(())
    }

    fn change_bounds(
        &mut self,
        cols: &[usize],
        kind: BoundKind,
        values: &[f64],
    ) -> Result<(), SolverError> {
        let set = self.check_cols(cols)?;
        for (col, value) in cols.iter().zip(values) {
            if matches!(kind, BoundKind::Lower | BoundKind::Both) {
                self.col_lower[*col] = *value;
            }
            if matches!(kind, BoundKind::Upper | BoundKind::Both) {
                self.col_upper[*col] = *value;
            }
        }
        let lower = cols.iter().map(|col| self.col_lower[*col]).collect::<Vec<_>>();
        let upper = cols.iter().map(|col| self.col_upper[*col]).collect::<Vec<_>>();
        self.handle.change_col_bounds(&set, &lower, &upper)
    }

    fn change_objective(&mut self, cols: &[usize], values: &[f64]) -> Result<(), SolverError> {
        let set = self.check_cols(cols)?;
        self.handle.change_col_costs(&set, values)
    }

    fn change_objective_sense(&mut self, sense: ObjectiveSense) -> Result<(), SolverError> {
        self.handle.change_objective_sense(objective_sense(sense))
    }

    fn change_kinds(&mut self, cols: &[usize], kinds: &[VarKind]) -> Result<(), SolverError> {
        let set = self.check_cols(cols)?;
        let codes = kinds.iter().map(|kind| integrality(*kind)).collect::<Vec<_>>();
        self.handle.change_integrality(&set, &codes)
    }

    fn add_rows(&mut self, rows: &RowBatch) -> Result<(), SolverError> {
        rows.validate(self.col_lower.len())?;
        let (lower, upper): (Vec<f64>, Vec<f64>) = rows
            .senses
            .iter()
            .zip(&rows.rhs)
            .map(|(sense, rhs)| row_bounds(*sense, *rhs))
            .unzip();
        let starts = to_highs_ints(&rows.row_start[..rows.len()])?;
        let index = to_highs_ints(&rows.col_index)?;
        self.handle
            .add_rows(&lower, &upper, &starts, &index, &rows.values)?;

        self.row_senses.extend_from_slice(&rows.senses);
        self.row_rhs.extend_from_slice(&rows.rhs);
        trace!(
            component = "highs",
            operation = "add_rows",
            status = "success",
            rows = rows.len(),
            num_nz = rows.num_nz(),
            "Added rows"
        );
        Ok(())
    }

    fn add_columns(&mut self, columns: &ColumnBatch) -> Result<(), SolverError> {
        columns.validate(self.row_rhs.len())?;
        let starts = to_highs_ints(&columns.col_start[..columns.len()])?;
        let index = to_highs_ints(&columns.row_index)?;
        self.handle.add_cols(
            &columns.objective,
            &columns.lower,
            &columns.upper,
            &starts,
            &index,
            &columns.values,
        )?;

        self.col_lower.extend_from_slice(&columns.lower);
        self.col_upper.extend_from_slice(&columns.upper);
        trace!(
            component = "highs",
            operation = "add_columns",
            status = "success",
            columns = columns.len(),
            num_nz = columns.num_nz(),
            "Added columns"
        );
        Ok(())
    }

    fn delete_rows(&mut self, mask: &[bool]) -> Result<(), SolverError> {
        if mask.len() != self.row_rhs.len() {
            return Err(SolverError::InvalidArgument(format!(
                "row mask has {} entries, expected {}",
                mask.len(),
                self.row_rhs.len()
            )));
        }
        let mut raw_mask = mask
            .iter()
            .map(|flag| HighsInt::from(*flag))
            .collect::<Vec<_>>();
        self.handle.delete_rows_by_mask(&mut raw_mask)?;

        let mut flags = mask.iter();
        self.row_senses
            .retain(|_| !flags.next().copied().unwrap_or(false));
        let mut flags = mask.iter();
        self.row_rhs
            .retain(|_| !flags.next().copied().unwrap_or(false));
        Ok(())
    }

    fn change_rhs(&mut self, rows: &[usize], values: &[f64]) -> Result<(), SolverError> {
        self.check_rows(rows)?;
        for (row, value) in rows.iter().zip(values) {
            self.row_rhs[*row] = *value;
        }
        self.push_row_bounds(rows)
    }

    fn change_senses(
        &mut self,
        rows: &[usize],
        senses: &[ComparisonSense],
    ) -> Result<(), SolverError> {
        self.check_rows(rows)?;
        for (row, sense) in rows.iter().zip(senses) {
            self.row_senses[*row] = *sense;
        }
        self.push_row_bounds(rows)
    }

    /// Columns not listed start at the value in their bounds closest to zero.
    fn set_start(&mut self, cols: &[usize], values: &[f64]) -> Result<(), SolverError> {
        self.check_cols(cols)?;
        let mut start = self
            .col_lower
            .iter()
            .zip(&self.col_upper)
            .map(|(lower, upper)| start_value(*lower, *upper))
            .collect::<Vec<_>>();
        for (col, value) in cols.iter().zip(values) {
            start[*col] = *value;
        }
        self.handle.set_primal_solution(&start)
    }

    fn solve_lp(&mut self) -> Result<(), SolverError> {
        self.run("solve_lp")
    }

    fn solve_mip(&mut self) -> Result<(), SolverError> {
        self.run("solve_mip")
    }

    fn primal(&self) -> Result<Vec<f64>, SolverError> {
        Ok(self.raw_solution()?.col_value)
    }

    fn dual(&self) -> Result<Vec<f64>, SolverError> {
        Ok(self.raw_solution()?.row_dual)
    }

    fn reduced_cost(&self) -> Result<Vec<f64>, SolverError> {
        Ok(self.raw_solution()?.col_dual)
    }

    fn slack(&self) -> Result<Vec<f64>, SolverError> {
        let solution = self.raw_solution()?;
        Ok(self
            .row_rhs
            .iter()
            .zip(&solution.row_value)
            .map(|(rhs, activity)| rhs - activity)
            .collect())
    }

    fn objective_value(&self) -> f64 {
        if self.solved {
            self.handle.objective_value()
        } else {
            0.0
        }
    }

    fn mip_gap(&self) -> Option<f64> {
        if !self.solved {
            return None;
        }
        self.handle.double_info("mip_gap").filter(|gap| gap.is_finite())
    }

    fn best_bound(&self) -> Option<f64> {
        // Only meaningful once branch-and-bound has run.
        self.node_count()?;
        self.handle
            .double_info("mip_dual_bound")
            .filter(|bound| bound.is_finite())
    }

    fn node_count(&self) -> Option<u64> {
        if !self.solved {
            return None;
        }
        // HiGHS reports -1 when no branch-and-bound ran.
        self.handle
            .int64_info("mip_node_count")
            .and_then(|count| u64::try_from(count).ok())
    }

    fn status_code(&self) -> i32 {
        self.handle.model_status() as i32
    }

    fn status(&self) -> SolverStatus {
        status::to_solver_status(self.status_code())
    }

    fn status_string(&self, code: i32) -> String {
        status::status_text(code).to_string()
    }

    fn num_rows(&self) -> usize {
        self.handle.num_row()
    }

    fn num_cols(&self) -> usize {
        self.handle.num_col()
    }

    fn num_nz(&self) -> usize {
        self.handle.num_nz()
    }

    fn column_bounds(&self, col: usize) -> Option<(f64, f64)> {
        Some((*self.col_lower.get(col)?, *self.col_upper.get(col)?))
    }
}

impl std::fmt::Debug for HighsProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighsProblem")
            .field("name", &self.name)
            .field("num_cols", &self.col_lower.len())
            .field("num_rows", &self.row_rhs.len())
            .field("solved", &self.solved)
            .finish_non_exhaustive()
    }
}

/// HiGHS row bounds for `a x <sense> rhs`.
pub(crate) fn row_bounds(sense: ComparisonSense, rhs: f64) -> (f64, f64) {
    match sense {
        ComparisonSense::LessEqual => (f64::NEG_INFINITY, rhs),
        ComparisonSense::GreaterEqual => (rhs, f64::INFINITY),
        ComparisonSense::Equal => (rhs, rhs),
    }
}

pub(crate) fn integrality(kind: VarKind) -> HighsInt {
    match kind {
        VarKind::Continuous => 0,
        VarKind::Integer => 1,
        VarKind::SemiContinuous => 2,
        VarKind::SemiInteger => 3,
    }
}

/// The value in `[lower, upper]` closest to zero. Inverted bounds yield the
/// lower bound.
pub(crate) fn start_value(lower: f64, upper: f64) -> f64 {
    if lower > 0.0 {
        lower
    } else if upper < 0.0 {
        upper
    } else {
        0.0
    }
}

fn objective_sense(sense: ObjectiveSense) -> HighsInt {
    match sense {
        ObjectiveSense::Minimize => 1,
        ObjectiveSense::Maximize => -1,
    }
}

fn to_highs_ints(values: &[usize]) -> Result<Vec<HighsInt>, SolverError> {
    values.iter().map(|value| to_highs_int(*value)).collect()
}

fn check_indices(
    indices: &[usize],
    len: usize,
    what: &str,
) -> Result<Vec<HighsInt>, SolverError> {
    if let Some(bad) = indices.iter().find(|idx| **idx >= len) {
        return Err(SolverError::InvalidArgument(format!(
            "{what} {bad} out of range ({len} present)"
        )));
    }
    to_highs_ints(indices)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::{check_indices, integrality, row_bounds, start_value};
    use mymip_expr::ComparisonSense;
    use mymip_solver::VarKind;

    #[test]
    fn row_bounds_follow_sense() {
        assert_eq!(
            row_bounds(ComparisonSense::LessEqual, 4.0),
            (f64::NEG_INFINITY, 4.0)
        );
        assert_eq!(
            row_bounds(ComparisonSense::GreaterEqual, -1.0),
            (-1.0, f64::INFINITY)
        );
        assert_eq!(row_bounds(ComparisonSense::Equal, 2.0), (2.0, 2.0));
    }

    #[test]
    fn integrality_codes() {
        assert_eq!(integrality(VarKind::Continuous), 0);
        assert_eq!(integrality(VarKind::Integer), 1);
        assert_eq!(integrality(VarKind::SemiContinuous), 2);
        assert_eq!(integrality(VarKind::SemiInteger), 3);
    }

    #[test]
    fn start_value_stays_closest_to_zero() {
        assert_eq!(start_value(0.0, 1.0), 0.0);
        assert_eq!(start_value(-3.0, -1.0), -1.0);
        assert_eq!(start_value(2.0, f64::INFINITY), 2.0);
        assert_eq!(start_value(5.0, 1.0), 5.0);
        assert_eq!(start_value(f64::NEG_INFINITY, f64::INFINITY), 0.0);
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        assert_eq!(check_indices(&[0, 2], 3, "row"), Ok(vec![0, 2]));
        let err = check_indices(&[3], 3, "row").unwrap_err();
        assert!(err.to_string().contains("row 3 out of range"));
    }
}
