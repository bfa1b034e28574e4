use mymip_solver::BoundKind;

use super::support::{Call, calls_after_load, model};
use super::*;

fn loaded() -> (Model, std::rc::Rc<std::cell::RefCell<support::Mirror>>) {
    let (mut model, mirror) = model();
    let x = model.variable("x");
    let y = model.variable("y");
    model
        .subject_to(vec![(x + y).le_scalar(10.0), (x - y).ge_scalar(-2.0)])
        .unwrap();
    model.minimize(x + 2.0 * y).unwrap();
    model.materialize().unwrap();
    (model, mirror)
}

#[test]
fn bound_changes_reach_the_backend() {
    let (mut model, mirror) = loaded();
    let x = model.variable_by_name("x").unwrap();

    model.set_lower(x, 1.0).unwrap();
    model.set_upper(x, 4.0).unwrap();
    model.fix(x, 3.0).unwrap();

    assert_eq!(
        calls_after_load(&mirror),
        vec![
            Call::ChangeBounds(vec![0], BoundKind::Lower, vec![1.0]),
            Call::ChangeBounds(vec![0], BoundKind::Upper, vec![4.0]),
            Call::ChangeBounds(vec![0], BoundKind::Both, vec![3.0]),
        ]
    );
    assert_eq!(model.backend().column_bounds(0), Some((3.0, 3.0)));
    assert_eq!(model.bounds(x).unwrap(), (3.0, 3.0));
}

#[test]
fn kind_change_switches_to_mixed_integer() {
    let (mut model, mirror) = loaded();
    let y = model.variable_by_name("y").unwrap();
    assert!(!model.is_mip());

    model.set_kind(y, VarKind::Integer).unwrap();

    assert!(model.is_mip());
    assert_eq!(
        calls_after_load(&mirror),
        vec![Call::ChangeKinds(vec![1], vec![VarKind::Integer])]
    );
    model.optimize().unwrap();
    assert!(mirror.borrow().calls.contains(&Call::SolveMip));
}

#[test]
fn cost_and_objective_changes_reach_the_backend() {
    let (mut model, mirror) = loaded();
    let x = model.variable_by_name("x").unwrap();
    let y = model.variable_by_name("y").unwrap();

    model.set_cost(y, 5.0).unwrap();
    model.maximize(Expr::var(x)).unwrap();

    assert_eq!(
        calls_after_load(&mirror),
        vec![
            Call::ChangeObjective(vec![1], vec![5.0]),
            Call::ChangeObjectiveSense(ObjectiveSense::Maximize),
            Call::ChangeObjective(vec![0, 1], vec![1.0, 0.0]),
        ]
    );
    assert_eq!(mirror.borrow().objective, vec![1.0, 0.0]);
    assert_eq!(model.objective_sense(), ObjectiveSense::Maximize);
}

#[test]
fn declared_variables_become_empty_columns() {
    let (mut model, mirror) = loaded();
    let z = model
        .declare(VariableDecl::named("z").with_kind(VarKind::Integer))
        .unwrap();

    assert_eq!(z, VariableId::new(2));
    assert_eq!(
        calls_after_load(&mirror),
        vec![
            Call::AddColumns(1),
            Call::ChangeKinds(vec![2], vec![VarKind::Integer]),
        ]
    );
    assert_eq!(model.objective().unwrap().coefficients, vec![1.0, 2.0, 0.0]);
    assert_eq!(model.num_cols(), 3);
    assert!(model.is_mip());
}

#[test]
fn added_rows_are_appended_after_existing_rows() {
    let (mut model, mirror) = loaded();
    let x = model.variable_by_name("x").unwrap();
    let y = model.variable_by_name("y").unwrap();

    let ids = model
        .add_rows_named("extra", (2.0 * x + y).le_scalar(8.0))
        .unwrap();

    assert_eq!(calls_after_load(&mirror), vec![Call::AddRows(1)]);
    assert_eq!(model.row_index(ids[0]).unwrap(), 2);
    assert_eq!(model.num_rows(), 3);
    assert_eq!(model.num_nz(), 6);
    let record = model.get_constraint(ids[0]).unwrap();
    assert_eq!(record.name, "extra");
    assert!(record.terms().is_none());
}

#[test]
fn new_column_links_into_loaded_rows() {
    let (mut model, mirror) = loaded();
    let rows = model.constraints().map(|record| record.id).collect::<Vec<_>>();

    let z = model
        .new_column(&[(rows[1], 4.0)], 7.0, 0.0, 2.0, "z")
        .unwrap();

    assert_eq!(calls_after_load(&mirror), vec![Call::AddColumns(1)]);
    assert_eq!(mirror.borrow().row_nnz, vec![2, 3]);
    assert_eq!(mirror.borrow().objective, vec![1.0, 2.0, 7.0]);
    assert_eq!(model.cost(z).unwrap(), 7.0);
    assert_eq!(model.backend().column_bounds(2), Some((0.0, 2.0)));
}

#[test]
fn deleting_rows_reindexes_survivors() {
    let (mut model, mirror) = loaded();
    let x = model.variable_by_name("x").unwrap();
    let third = model.add_rows(Expr::var(x).le_scalar(6.0)).unwrap();
    let rows = model.constraints().map(|record| record.id).collect::<Vec<_>>();

    model.delete_rows(&[rows[0], rows[1]]).unwrap();

    assert_eq!(
        calls_after_load(&mirror).last(),
        Some(&Call::DeleteRows(vec![true, true, false]))
    );
    assert_eq!(model.row_index(third[0]).unwrap(), 0);
    assert_eq!(model.num_rows(), 1);
    assert!(model.row_index(rows[0]).is_err());

    model.change_rhs(&[(third[0], 9.0)]).unwrap();
    assert_eq!(
        calls_after_load(&mirror).last(),
        Some(&Call::ChangeRhs(vec![0], vec![9.0]))
    );
}

#[test]
fn rhs_and_sense_changes_use_current_positions() {
    let (mut model, mirror) = loaded();
    let rows = model.constraints().map(|record| record.id).collect::<Vec<_>>();

    model.change_rhs(&[(rows[1], 1.0), (rows[0], 12.0)]).unwrap();
    model
        .change_sense(&[(rows[0], ComparisonSense::Equal)])
        .unwrap();

    assert_eq!(
        calls_after_load(&mirror),
        vec![
            Call::ChangeRhs(vec![1, 0], vec![1.0, 12.0]),
            Call::ChangeSenses(vec![0], vec![ComparisonSense::Equal]),
        ]
    );
    let first = model.get_constraint(rows[0]).unwrap();
    assert_eq!((first.rhs, first.sense), (12.0, ComparisonSense::Equal));
}

#[test]
fn backend_failures_are_kept_without_failing_the_edit() {
    let (mut model, mirror) = loaded();
    let x = model.variable_by_name("x").unwrap();
    mirror.borrow_mut().fail_on = Some("change_bounds");

    model.set_upper(x, 2.0).unwrap();

    let err = model.last_error().unwrap();
    assert_eq!(
        *err,
        mymip_solver::SolverError::CallFailed {
            operation: "change_bounds",
            status: -1
        }
    );
    assert_eq!(model.bounds(x).unwrap(), (0.0, 2.0));
}

#[test]
fn invalid_ids_are_rejected_before_any_backend_call() {
    let (mut model, mirror) = loaded();
    let ghost = ConstraintId::new(40);

    assert!(model.change_rhs(&[(ghost, 1.0)]).is_err());
    assert!(model.delete_rows(&[ghost]).is_err());
    assert!(model.add_rows(Expr::var(VariableId::new(9)).le_scalar(1.0)).is_err());

    assert!(calls_after_load(&mirror).is_empty());
    assert_eq!(model.num_rows(), 2);
}

#[test]
fn nan_bound_pair_leaves_variable_untouched() {
    let (mut model, mirror) = loaded();
    let x = model.variable_by_name("x").unwrap();

    let err = model.set_bounds(x, 1.0, f64::NAN).unwrap_err();
    assert_eq!(err.code(), "VARIABLE_INVALID_BOUNDS");
    assert!(model.set_bounds(x, f64::NAN, 1.0).is_err());

    assert_eq!(model.bounds(x).unwrap(), (0.0, f64::INFINITY));
    assert_eq!(model.backend().column_bounds(0), Some((0.0, f64::INFINITY)));
    assert!(calls_after_load(&mirror).is_empty());
}

#[test]
fn unnamed_live_rows_are_named_by_position() {
    let (mut model, _) = loaded();
    let x = model.variable_by_name("x").unwrap();

    let ids = model
        .add_rows(ConstraintGroup::named("", Expr::var(x).le_scalar(3.0)))
        .unwrap();
    assert_eq!(model.get_constraint(ids[0]).unwrap().name, "C2");
    assert_eq!(model.row_index(ids[0]), Ok(2));
}
