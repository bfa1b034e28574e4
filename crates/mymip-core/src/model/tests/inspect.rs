use super::support::model;
use super::*;

#[test]
fn inspect_reports_staged_structure() {
    let (mut model, _) = model();
    let x = model.variable("x");
    let b = model
        .declare(VariableDecl::named("b").with_type(VariableType::zero_one()))
        .unwrap();
    model
        .subject_to_named("link", (x - 5.0 * b).le_scalar(0.0))
        .unwrap();
    model.minimize(2.0 * x).unwrap();

    let snapshot = model.inspect();

    assert_eq!(snapshot.name, "test");
    assert_eq!(snapshot.state, ModelState::Building);
    assert_eq!(snapshot.variables.len(), 2);
    assert_eq!(snapshot.variables[1].name, "b");
    assert_eq!(snapshot.variables[1].kind, VarKind::Integer);
    assert_eq!(snapshot.variables[1].upper, 1.0);
    let link = &snapshot.constraints[0];
    assert_eq!(link.name, "link");
    assert_eq!(link.sense, "<=");
    assert_eq!(link.nnz, Some(2));
    let objective = snapshot.objective.unwrap();
    assert_eq!(objective.sense, ObjectiveSense::Minimize);
    assert_eq!(objective.terms, vec![(0, 2.0)]);
}

#[test]
fn inspect_after_solve_carries_results() {
    let (mut model, mirror) = model();
    let x = model.variable("x");
    let row = model.subject_to(Expr::var(x).le_scalar(3.0)).unwrap();
    model.maximize(Expr::var(x)).unwrap();
    mirror.borrow_mut().primal = vec![3.0];
    model.optimize().unwrap();

    let snapshot = model.inspect();

    assert_eq!(snapshot.state, ModelState::Solved);
    assert_eq!(snapshot.variables[0].value, Some(3.0));
    let constraint = &snapshot.constraints[0];
    assert_eq!(constraint.id, row[0].inner());
    assert_eq!(constraint.nnz, None);
    assert_eq!(constraint.dual, Some(0.5));
}

#[test]
fn json_snapshot_uses_stable_field_names() {
    let (mut model, _) = model();
    let x = model.variable("x");
    model.subject_to(Expr::var(x).ge_scalar(1.0)).unwrap();

    let json = model.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["state"], "building");
    assert_eq!(value["variables"][0]["kind"], "continuous");
    assert_eq!(value["constraints"][0]["name"], "R0");
    assert_eq!(value["constraints"][0]["sense"], ">=");
    assert!(value["objective"].is_null());
    assert!(value["variables"][0].get("value").is_none());
}
