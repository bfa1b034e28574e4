//! Backend capability trait.

use mymip_expr::ComparisonSense;

use crate::{
    BoundKind, ColumnBatch, LpArrays, ObjectiveSense, RowBatch, SolverError, SolverStatus,
    VarKind,
};

/// A single problem instance inside a numerical solver.
///
/// Row and column indices are positions in the backend's current problem.
/// After [`ProblemBackend::load`], every edit is applied incrementally to the
/// loaded problem; nothing is rebuilt.
pub trait ProblemBackend {
    /// Short backend identifier used in logs.
    fn name(&self) -> &str;

    /// Replace the whole problem.
    fn load(&mut self, arrays: &LpArrays) -> Result<(), SolverError>;

    fn change_bounds(
        &mut self,
        cols: &[usize],
        kind: BoundKind,
        values: &[f64],
    ) -> Result<(), SolverError>;

    fn change_objective(&mut self, cols: &[usize], values: &[f64]) -> Result<(), SolverError>;

    fn change_objective_sense(&mut self, sense: ObjectiveSense) -> Result<(), SolverError>;

    fn change_kinds(&mut self, cols: &[usize], kinds: &[VarKind]) -> Result<(), SolverError>;

    fn add_rows(&mut self, rows: &RowBatch) -> Result<(), SolverError>;

    fn add_columns(&mut self, columns: &ColumnBatch) -> Result<(), SolverError>;

    /// Delete every row whose mask entry is `true`. Surviving rows keep their
    /// relative order.
    fn delete_rows(&mut self, mask: &[bool]) -> Result<(), SolverError>;

    fn change_rhs(&mut self, rows: &[usize], values: &[f64]) -> Result<(), SolverError>;

    fn change_senses(
        &mut self,
        rows: &[usize],
        senses: &[ComparisonSense],
    ) -> Result<(), SolverError>;

    /// Pass a (possibly partial) starting point for the next MIP solve.
    fn set_start(&mut self, cols: &[usize], values: &[f64]) -> Result<(), SolverError>;

    fn solve_lp(&mut self) -> Result<(), SolverError>;

    fn solve_mip(&mut self) -> Result<(), SolverError>;

    /// Column values of the last solve.
    fn primal(&self) -> Result<Vec<f64>, SolverError>;

    /// Row duals of the last solve.
    fn dual(&self) -> Result<Vec<f64>, SolverError>;

    /// Column reduced costs of the last solve.
    fn reduced_cost(&self) -> Result<Vec<f64>, SolverError>;

    /// `rhs - activity` per row for the last solve.
    fn slack(&self) -> Result<Vec<f64>, SolverError>;

    fn objective_value(&self) -> f64;

    /// Relative MIP gap of the last solve, when the backend reports one.
    fn mip_gap(&self) -> Option<f64>;

    /// Best proven bound on the objective of the last MIP solve.
    fn best_bound(&self) -> Option<f64>;

    /// Branch-and-bound nodes explored by the last MIP solve.
    fn node_count(&self) -> Option<u64>;

    /// Raw backend status code of the last solve.
    fn status_code(&self) -> i32;

    fn status(&self) -> SolverStatus;

    /// Backend text for a raw status code.
    fn status_string(&self, code: i32) -> String;

    fn num_rows(&self) -> usize;

    fn num_cols(&self) -> usize;

    fn num_nz(&self) -> usize;

    /// Current `(lower, upper)` bounds of a loaded column.
    fn column_bounds(&self, col: usize) -> Option<(f64, f64)>;
}
