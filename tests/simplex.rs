use approx::assert_abs_diff_eq;

use rsimplex::{
    AffineExpression, Comp, Constraint, Model, OptDir, Simplex, SolveAlgorithm, SolveStatus,
    Solver, VarType, VariableDefinition, VectorConstraint,
};

fn free_var(mdl: &mut Model, name: &str) -> rsimplex::Variable {
    mdl.add_var(VariableDefinition::new(VarType::Float).with_name(name))
}

fn nonneg_var(mdl: &mut Model, name: &str) -> rsimplex::Variable {
    mdl.add_var(
        VariableDefinition::new(VarType::Float)
            .with_lb(0)
            .with_name(name),
    )
}

/// min x1 + 2 x2 with the feasible box written as explicit inequalities over
/// free variables; two rows have a zero right-hand side, so the pivots are
/// degenerate and Bland's rule has to terminate them.
#[test]
fn degenerate_box_minimizes_to_the_origin() {
    let mut mdl = Model::new("box");
    let x1 = free_var(&mut mdl, "x1");
    let x2 = free_var(&mut mdl, "x2");

    mdl.add_constraint(Constraint::new(-1 * &x1, Comp::Le, 0)).unwrap();
    mdl.add_constraint(Constraint::new(&x2 + 0, Comp::Le, 1)).unwrap();
    mdl.add_constraint(Constraint::new(&x1 + &x2, Comp::Le, 1.5)).unwrap();
    mdl.add_constraint(Constraint::new(&x1 + 0, Comp::Le, 1)).unwrap();
    mdl.add_constraint(Constraint::new(-1 * &x2, Comp::Le, 0)).unwrap();
    mdl.set_obj_fn(OptDir::Min, &x1 + 2 * &x2).unwrap();

    let solution = Simplex::new().solve(&mdl).unwrap();
    assert!(solution.is_optimal());
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.var_value(&x1).unwrap(), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.var_value(&x2).unwrap(), 0.0, epsilon = 1e-9);
}

/// max 4 x1 + 3 x2 + 5 x3 with rows <= [4, 6, 8]; the slack-only basis is
/// immediately feasible and the optimum sits at (2, 1, 0).
#[test]
fn reference_lp_solves_from_the_slack_basis() {
    let mut mdl = Model::new("reference");
    let x1 = nonneg_var(&mut mdl, "x1");
    let x2 = nonneg_var(&mut mdl, "x2");
    let x3 = nonneg_var(&mut mdl, "x3");

    mdl.add_constraint(Constraint::new(&x1 + 2 * &x2 + 2 * &x3, Comp::Le, 4))
        .unwrap();
    mdl.add_constraint(Constraint::new(3 * &x1 + 4 * &x3, Comp::Le, 6))
        .unwrap();
    mdl.add_constraint(Constraint::new(2 * &x1 + &x2 + 4 * &x3, Comp::Le, 8))
        .unwrap();
    mdl.set_obj_fn(OptDir::Max, 4 * &x1 + 3 * &x2 + 5 * &x3)
        .unwrap();

    let solution = Simplex::new().solve(&mdl).unwrap();
    assert!(solution.is_optimal());
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 11.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.var_value(&x1).unwrap(), 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.var_value(&x2).unwrap(), 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.var_value(&x3).unwrap(), 0.0, epsilon = 1e-9);
}

/// The same constraint matrix passed as one componentwise vector constraint
/// must solve identically to the scalar-row form.
#[test]
fn vector_constraint_solves_like_its_scalar_rows() {
    let mut mdl = Model::new("reference (vector)");
    let x1 = nonneg_var(&mut mdl, "x1");
    let x2 = nonneg_var(&mut mdl, "x2");
    let x3 = nonneg_var(&mut mdl, "x3");

    let rows = vec![
        &x1 + 2 * &x2 + 2 * &x3,
        3 * &x1 + 4 * &x3,
        2 * &x1 + &x2 + 4 * &x3,
    ];
    let rhs = vec![
        AffineExpression::from(4),
        AffineExpression::from(6),
        AffineExpression::from(8),
    ];
    mdl.add_constraint(Constraint::Vector(
        VectorConstraint::new(rows, Comp::Le, rhs).unwrap(),
    ))
    .unwrap();
    mdl.set_obj_fn(OptDir::Max, 4 * &x1 + 3 * &x2 + 5 * &x3)
        .unwrap();

    let solution = Simplex::new().solve(&mdl).unwrap();
    assert!(solution.is_optimal());
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 11.0, epsilon = 1e-9);
}

/// Chvátal's classic: max 5 x1 + 4 x2 + 3 x3 with rows <= [5, 11, 8],
/// optimum 13 at (2, 0, 1).
#[test]
fn textbook_lp_reaches_thirteen() {
    let mut mdl = Model::new("textbook");
    let x1 = nonneg_var(&mut mdl, "x1");
    let x2 = nonneg_var(&mut mdl, "x2");
    let x3 = nonneg_var(&mut mdl, "x3");

    mdl.add_constraint(Constraint::new(2 * &x1 + 3 * &x2 + &x3, Comp::Le, 5))
        .unwrap();
    mdl.add_constraint(Constraint::new(4 * &x1 + &x2 + 2 * &x3, Comp::Le, 11))
        .unwrap();
    mdl.add_constraint(Constraint::new(3 * &x1 + 4 * &x2 + 2 * &x3, Comp::Le, 8))
        .unwrap();
    mdl.set_obj_fn(OptDir::Max, 5 * &x1 + 4 * &x2 + 3 * &x3)
        .unwrap();

    let solution = Simplex::new().solve(&mdl).unwrap();
    assert!(solution.is_optimal());
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 13.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.var_value(&x1).unwrap(), 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.var_value(&x2).unwrap(), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.var_value(&x3).unwrap(), 1.0, epsilon = 1e-9);
}

/// x >= 2 against x <= 1 has no feasible point; phase 1 ends with a positive
/// artificial sum.
#[test]
fn conflicting_bounds_are_infeasible() {
    let mut mdl = Model::new("conflict");
    let x = nonneg_var(&mut mdl, "x");
    mdl.add_constraint(Constraint::new(&x + 0, Comp::Ge, 2)).unwrap();
    mdl.add_constraint(Constraint::new(&x + 0, Comp::Le, 1)).unwrap();
    mdl.set_obj_fn(OptDir::Min, &x + 0).unwrap();

    let solution = Simplex::new().solve(&mdl).unwrap();
    assert_eq!(*solution.status(), SolveStatus::Infeasible);
    assert_eq!(solution.objective_value(), None);
    assert_eq!(solution.var_value(&x), None);
}

/// max x over x >= 0 alone improves forever; the report names the culprit.
#[test]
fn halfline_maximization_is_unbounded() {
    let mut mdl = Model::new("halfline");
    let x = nonneg_var(&mut mdl, "x");
    mdl.set_obj_fn(OptDir::Max, &x + 0).unwrap();

    let solution = Simplex::new().solve(&mdl).unwrap();
    match solution.status() {
        SolveStatus::Unbounded { entering } => assert_eq!(entering.name(), "x"),
        other => panic!("expected Unbounded, got {:?}", other),
    }
}

/// `>=` rows with positive right-hand sides invalidate the slack basis, so
/// this runs through phase 1; upper bounds arrive as variable metadata.
#[test]
fn covering_lp_needs_phase_one() {
    let mut mdl = Model::new("covering");
    let x = mdl.add_var(
        VariableDefinition::new(VarType::Float)
            .with_lb(0)
            .with_ub(3)
            .with_name("x"),
    );
    let y = mdl.add_var(
        VariableDefinition::new(VarType::Float)
            .with_lb(0)
            .with_ub(3)
            .with_name("y"),
    );
    mdl.add_constraint(Constraint::new(&x + &y, Comp::Ge, 4)).unwrap();
    mdl.set_obj_fn(OptDir::Min, 2 * &x + 3 * &y).unwrap();

    let solution = Simplex::new().solve(&mdl).unwrap();
    assert!(solution.is_optimal());
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 9.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.var_value(&x).unwrap(), 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.var_value(&y).unwrap(), 1.0, epsilon = 1e-9);
}

/// Equality constraints contribute no slack variables at all, so the initial
/// basis cannot be the slack basis.
#[test]
fn pure_equality_lp_solves_through_phase_one() {
    let mut mdl = Model::new("transfer");
    let x = nonneg_var(&mut mdl, "x");
    let y = nonneg_var(&mut mdl, "y");
    mdl.add_constraint(Constraint::new(&x + &y, Comp::Eq, 2)).unwrap();
    mdl.set_obj_fn(OptDir::Min, &x + &y).unwrap();

    let solution = Simplex::new().solve(&mdl).unwrap();
    assert!(solution.is_optimal());
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 2.0, epsilon = 1e-9);
}

/// A variable unbounded below is split into non-negative parts and its value
/// reassembled from their difference.
#[test]
fn unbounded_below_variable_round_trips() {
    let mut mdl = Model::new("floor");
    let x = free_var(&mut mdl, "x");
    mdl.add_constraint(Constraint::new(&x + 0, Comp::Ge, -10)).unwrap();
    mdl.set_obj_fn(OptDir::Min, &x + 0).unwrap();

    let solution = Simplex::new().solve(&mdl).unwrap();
    assert!(solution.is_optimal());
    assert_abs_diff_eq!(solution.objective_value().unwrap(), -10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.var_value(&x).unwrap(), -10.0, epsilon = 1e-9);
}

/// A zero pivot budget surfaces the cap instead of looping.
#[test]
fn zero_iteration_budget_reports_the_cap() {
    let mut mdl = Model::new("capped");
    let x = nonneg_var(&mut mdl, "x");
    mdl.add_constraint(Constraint::new(&x + 0, Comp::Le, 5)).unwrap();
    mdl.set_obj_fn(OptDir::Max, &x + 0).unwrap();

    let solution = Simplex::new().with_max_iterations(0).solve(&mdl).unwrap();
    assert_eq!(*solution.status(), SolveStatus::IterationLimitExceeded);
    assert_eq!(solution.iterations(), 0);
}

/// The `Solver` wrapper drives any `SolveAlgorithm`, and the trait is usable
/// as an object.
#[test]
fn solver_wrapper_delegates_to_the_algorithm() {
    let mut mdl = Model::new("wrapped");
    let x = nonneg_var(&mut mdl, "x");
    mdl.add_constraint(Constraint::new(&x + 0, Comp::Le, 7)).unwrap();
    mdl.set_obj_fn(OptDir::Max, 2 * &x).unwrap();

    let algo: &dyn SolveAlgorithm = &Simplex::new();
    let solution = algo.solve(&mdl).unwrap();
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 14.0, epsilon = 1e-9);

    let solver = Solver::new(mdl, Simplex::new().with_epsilon(1e-12));
    let solution = solver.solve().unwrap();
    assert!(solution.is_optimal());
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 14.0, epsilon = 1e-9);
    assert_eq!(solver.mdl().name(), "wrapped");
}

/// Objective constants ride along unchanged through standardization.
#[test]
fn objective_constant_offsets_the_optimum() {
    let mut mdl = Model::new("offset");
    let x = nonneg_var(&mut mdl, "x");
    mdl.add_constraint(Constraint::new(&x + 0, Comp::Le, 4)).unwrap();
    mdl.set_obj_fn(OptDir::Max, 3 * &x + 100).unwrap();

    let solution = Simplex::new().solve(&mdl).unwrap();
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 112.0, epsilon = 1e-9);
}
