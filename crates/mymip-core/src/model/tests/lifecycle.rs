use super::support::{Call, model};
use super::*;

fn two_row_model() -> (Model, std::rc::Rc<std::cell::RefCell<support::Mirror>>) {
    let (mut model, mirror) = model();
    let x = model.variable("x");
    let y = model.variable("y");
    model
        .subject_to_named("cap", (x + 2.0 * y).le_scalar(14.0))
        .unwrap();
    model
        .subject_to_named("mix", (3.0 * x - y).ge_scalar(0.0))
        .unwrap();
    model.maximize(3.0 * x + 4.0 * y).unwrap();
    (model, mirror)
}

#[test]
fn build_arrays_produces_column_major_layout() {
    let (model, _) = two_row_model();
    let arrays = model.build_arrays().unwrap();

    assert_eq!(arrays.validate(), Ok(()));
    assert_eq!((arrays.num_cols, arrays.num_rows), (2, 2));
    assert_eq!(arrays.sense, ObjectiveSense::Maximize);
    assert_eq!(arrays.objective, vec![3.0, 4.0]);
    assert_eq!(arrays.col_start, vec![0, 2, 4]);
    assert_eq!(arrays.row_index, vec![0, 1, 0, 1]);
    assert_eq!(arrays.values, vec![1.0, 3.0, 2.0, -1.0]);
    assert_eq!(arrays.rhs, vec![14.0, 0.0]);
    assert_eq!(
        arrays.row_senses,
        vec![ComparisonSense::LessEqual, ComparisonSense::GreaterEqual]
    );
    assert_eq!(arrays.row_names, vec!["cap", "mix"]);
    assert_eq!(arrays.col_names, vec!["x", "y"]);
    assert!(arrays.kinds.is_none());
}

#[test]
fn build_arrays_without_objective_uses_zero_costs() {
    let (mut model, _) = model();
    model.variable("");
    model.variable("");
    let arrays = model.build_arrays().unwrap();
    assert_eq!(arrays.sense, ObjectiveSense::Minimize);
    assert_eq!(arrays.objective, vec![0.0, 0.0]);
    assert_eq!(arrays.col_start, vec![0, 0, 0]);
}

#[test]
fn kinds_are_present_only_for_mixed_integer_models() {
    let (mut model, _) = model();
    model.variable("a");
    model
        .declare(VariableDecl::named("b").with_type(VariableType::zero_one()))
        .unwrap();
    let arrays = model.build_arrays().unwrap();
    assert_eq!(
        arrays.kinds,
        Some(vec![VarKind::Continuous, VarKind::Integer])
    );
    assert_eq!(arrays.upper, vec![f64::INFINITY, 1.0]);
}

#[test]
fn declaring_after_the_objective_is_a_length_mismatch() {
    let (mut model, _) = model();
    let x = model.variable("x");
    model.minimize(Expr::var(x)).unwrap();
    model.variable("late");

    assert_eq!(
        model.materialize(),
        Err(ModelError::ObjectiveLengthMismatch {
            objective: 1,
            variables: 2
        })
    );
    assert_eq!(model.state(), ModelState::Building);
}

#[test]
fn materialize_loads_once_and_drops_staged_terms() {
    let (mut model, mirror) = two_row_model();
    model.materialize().unwrap();
    model.materialize().unwrap();

    let loads = mirror
        .borrow()
        .calls
        .iter()
        .filter(|call| **call == Call::Load)
        .count();
    assert_eq!(loads, 1);
    assert_eq!(model.state(), ModelState::Materialized);
    assert!(model.constraints().all(|record| record.terms().is_none()));
    assert_eq!(model.num_rows(), 2);
    assert_eq!(model.num_nz(), 4);
}

#[test]
fn row_less_model_loads_with_a_temporary_row() {
    let (mut model, mirror) = model();
    model.variable("x");
    model.variable("y");
    model.materialize().unwrap();

    let mirror = mirror.borrow();
    let loaded = mirror.loaded.as_ref().unwrap();
    assert_eq!(loaded.num_rows, 1);
    assert_eq!(loaded.row_senses, vec![ComparisonSense::Equal]);
    assert_eq!(loaded.rhs, vec![0.0]);
    assert_eq!(loaded.column(1).collect::<Vec<_>>(), vec![(0, 1.0)]);
    assert_eq!(mirror.calls, vec![Call::Load, Call::DeleteRows(vec![true])]);
    assert!(mirror.row_nnz.is_empty());
}

#[test]
fn empty_model_loads_without_temporary_row() {
    let (mut model, mirror) = model();
    model.materialize().unwrap();
    assert_eq!(mirror.borrow().calls, vec![Call::Load]);
    assert_eq!(model.num_cols(), 0);
}

#[test]
fn failed_load_is_recorded_and_still_materializes() {
    let (mut model, mirror) = two_row_model();
    mirror.borrow_mut().fail_on = Some("load");

    model.materialize().unwrap();

    assert_eq!(model.state(), ModelState::Materialized);
    assert_eq!(model.last_error().map(|err| err.code()), Some("SOLVER_CALL_FAILED"));
}

#[test]
fn optimize_lp_retrieves_values_duals_and_slacks() {
    let (mut model, mirror) = two_row_model();
    mirror.borrow_mut().primal = vec![2.0, 6.0];

    let status = model.optimize().unwrap();

    assert_eq!(status, SolverStatus::Optimal);
    assert_eq!(model.state(), ModelState::Solved);
    assert!(mirror.borrow().calls.contains(&Call::SolveLp));
    let x = model.variable_by_name("x").unwrap();
    let y = model.variable_by_name("y").unwrap();
    assert_eq!(model.value(x), Some(2.0));
    assert_eq!(model.value(y), Some(6.0));
    assert_eq!(model.reduced_cost(x), Some(0.25));
    let mix = model.constraint_by_name("mix").unwrap();
    assert_eq!(model.dual(mix), Some(1.5));
    assert_eq!(model.slack(mix), Some(-1.0));
    assert_eq!(model.objective_value(), 30.0);
    assert_eq!(model.status(), "optimal");
    assert_eq!(model.status_code(), 1);
}

#[test]
fn optimize_mip_skips_duals_and_reduced_costs() {
    let (mut model, mirror) = two_row_model();
    let x = model.variable_by_name("x").unwrap();
    model.set_kind(x, VarKind::Integer).unwrap();
    mirror.borrow_mut().primal = vec![4.0, 5.0];

    model.optimize().unwrap();

    assert!(model.is_mip());
    assert!(mirror.borrow().calls.contains(&Call::SolveMip));
    assert_eq!(model.value(x), Some(4.0));
    assert_eq!(model.reduced_cost(x), None);
    let cap = model.constraint_by_name("cap").unwrap();
    assert_eq!(model.dual(cap), None);
    assert_eq!(model.slack(cap), Some(0.0));
}

#[test]
fn status_before_solving_is_not_solved() {
    let (model, _) = two_row_model();
    assert_eq!(model.solve_status(), SolverStatus::NotSolved);
    assert_eq!(model.num_rows(), 2);
    assert_eq!(model.num_cols(), 2);
}

#[test]
fn edits_after_a_solve_return_to_materialized() {
    let (mut model, _) = two_row_model();
    model.optimize().unwrap();
    assert_eq!(model.state(), ModelState::Solved);

    let x = model.variable_by_name("x").unwrap();
    model.set_upper(x, 3.0).unwrap();
    assert_eq!(model.state(), ModelState::Materialized);

    model.optimize().unwrap();
    assert_eq!(model.state(), ModelState::Solved);
}

#[test]
fn mip_start_materializes_first() {
    let (mut model, mirror) = two_row_model();
    let y = model.variable_by_name("y").unwrap();
    model.mip_start(&[(y, 3.0)]).unwrap();

    assert!(model.is_materialized());
    assert_eq!(
        mirror.borrow().calls.last(),
        Some(&Call::SetStart(vec![1], vec![3.0]))
    );
}

#[test]
fn search_statistics_follow_the_last_solve() {
    let (mut model, _) = two_row_model();
    assert_eq!(model.best_bound(), None);
    assert_eq!(model.node_count(), None);

    model.optimize().unwrap();
    assert_eq!(model.best_bound(), Some(model.objective_value()));
    assert_eq!(model.node_count(), Some(1));
}
