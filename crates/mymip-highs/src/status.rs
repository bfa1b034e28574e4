//! HiGHS model status codes.

use mymip_solver::SolverStatus;

pub(crate) const MODEL_STATUS_NOTSET: i32 = 0;
pub(crate) const MODEL_STATUS_LOAD_ERROR: i32 = 1;
pub(crate) const MODEL_STATUS_MODEL_ERROR: i32 = 2;
pub(crate) const MODEL_STATUS_PRESOLVE_ERROR: i32 = 3;
pub(crate) const MODEL_STATUS_SOLVE_ERROR: i32 = 4;
pub(crate) const MODEL_STATUS_POSTSOLVE_ERROR: i32 = 5;
pub(crate) const MODEL_STATUS_MODEL_EMPTY: i32 = 6;
pub(crate) const MODEL_STATUS_OPTIMAL: i32 = 7;
pub(crate) const MODEL_STATUS_INFEASIBLE: i32 = 8;
pub(crate) const MODEL_STATUS_UNBOUNDED_OR_INFEASIBLE: i32 = 9;
pub(crate) const MODEL_STATUS_UNBOUNDED: i32 = 10;
pub(crate) const MODEL_STATUS_OBJECTIVE_BOUND: i32 = 11;
pub(crate) const MODEL_STATUS_OBJECTIVE_TARGET: i32 = 12;
pub(crate) const MODEL_STATUS_TIME_LIMIT: i32 = 13;
pub(crate) const MODEL_STATUS_ITERATION_LIMIT: i32 = 14;
pub(crate) const MODEL_STATUS_UNKNOWN: i32 = 15;
pub(crate) const MODEL_STATUS_SOLUTION_LIMIT: i32 = 16;
pub(crate) const MODEL_STATUS_INTERRUPT: i32 = 17;

/// Map a raw HiGHS model status to the generic status.
///
/// An empty model (no rows and no columns) counts as solved to optimality.
pub(crate) fn to_solver_status(code: i32) -> SolverStatus {
    match code {
        MODEL_STATUS_NOTSET => SolverStatus::NotSolved,
        MODEL_STATUS_OPTIMAL | MODEL_STATUS_MODEL_EMPTY => SolverStatus::Optimal,
        MODEL_STATUS_INFEASIBLE => SolverStatus::Infeasible,
        MODEL_STATUS_UNBOUNDED => SolverStatus::Unbounded,
        MODEL_STATUS_UNBOUNDED_OR_INFEASIBLE => SolverStatus::InfeasibleOrUnbounded,
        MODEL_STATUS_TIME_LIMIT => SolverStatus::ReachedTimeLimit,
        MODEL_STATUS_ITERATION_LIMIT => SolverStatus::ReachedIterationLimit,
        _ => SolverStatus::Unknown,
    }
}

/// HiGHS text for a raw model status.
pub(crate) fn status_text(code: i32) -> &'static str {
    match code {
        MODEL_STATUS_NOTSET => "Not Set",
        MODEL_STATUS_LOAD_ERROR => "Load error",
        MODEL_STATUS_MODEL_ERROR => "Model error",
        MODEL_STATUS_PRESOLVE_ERROR => "Presolve error",
        MODEL_STATUS_SOLVE_ERROR => "Solve error",
        MODEL_STATUS_POSTSOLVE_ERROR => "Postsolve error",
        MODEL_STATUS_MODEL_EMPTY => "Empty",
        MODEL_STATUS_OPTIMAL => "Optimal",
        MODEL_STATUS_INFEASIBLE => "Infeasible",
        MODEL_STATUS_UNBOUNDED_OR_INFEASIBLE => "Primal infeasible or unbounded",
        MODEL_STATUS_UNBOUNDED => "Unbounded",
        MODEL_STATUS_OBJECTIVE_BOUND => "Bound on objective reached",
        MODEL_STATUS_OBJECTIVE_TARGET => "Target for objective reached",
        MODEL_STATUS_TIME_LIMIT => "Time limit reached",
        MODEL_STATUS_ITERATION_LIMIT => "Iteration limit reached",
        MODEL_STATUS_UNKNOWN => "Unknown",
        MODEL_STATUS_SOLUTION_LIMIT => "Solution limit reached",
        MODEL_STATUS_INTERRUPT => "Interrupted by user",
        _ => "Unrecognised HiGHS model status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(to_solver_status(MODEL_STATUS_NOTSET), SolverStatus::NotSolved);
        assert_eq!(to_solver_status(MODEL_STATUS_OPTIMAL), SolverStatus::Optimal);
        assert_eq!(to_solver_status(MODEL_STATUS_MODEL_EMPTY), SolverStatus::Optimal);
        assert_eq!(
            to_solver_status(MODEL_STATUS_UNBOUNDED_OR_INFEASIBLE),
            SolverStatus::InfeasibleOrUnbounded
        );
        assert_eq!(
            to_solver_status(MODEL_STATUS_TIME_LIMIT),
            SolverStatus::ReachedTimeLimit
        );
        assert_eq!(to_solver_status(MODEL_STATUS_INTERRUPT), SolverStatus::Unknown);
    }

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(MODEL_STATUS_OPTIMAL), "Optimal");
        assert_eq!(status_text(MODEL_STATUS_ITERATION_LIMIT), "Iteration limit reached");
        assert_eq!(status_text(99), "Unrecognised HiGHS model status");
    }
}
