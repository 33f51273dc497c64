//! A dense simplex solver for linear programs.
//!
//! Models are built symbolically: variables (with stable identities and
//! bounds), affine expressions, and `=`/`<=`/`>=` constraints over them.
//! Solving standardizes the model in two composable stages (rewrite every
//! variable to be non-negative, then inject slack variables until every
//! constraint is an equality) and runs a two-phase simplex over an explicit
//! basic/non-basic partition, recomputing `x_B = B⁻¹b − B⁻¹N x_N` at each
//! pivot. Bland's rule breaks ties so degenerate problems terminate, and an
//! iteration cap backstops cycling.
//!
//! ```
//! use rsimplex::{Comp, Constraint, Model, OptDir, Simplex, VarType, VariableDefinition};
//!
//! let mut mdl = Model::new("diet");
//! let x = mdl.add_var(VariableDefinition::new(VarType::Float).with_lb(0).with_name("x"));
//! let y = mdl.add_var(VariableDefinition::new(VarType::Float).with_lb(0).with_name("y"));
//! mdl.add_constraint(Constraint::new(&x + &y, Comp::Le, 4)).unwrap();
//! mdl.set_obj_fn(OptDir::Max, 3 * &x + 2 * &y).unwrap();
//!
//! let solution = Simplex::new().solve(&mdl).unwrap();
//! assert!(solution.is_optimal());
//! assert_eq!(solution.objective_value(), Some(12.0));
//! ```

mod affine_expr;
mod constraint;
mod error;
mod linalg;
mod model;
mod simplex;
mod slice;
mod solver;
mod tableau;
mod var;

pub use affine_expr::AffineExpression;
pub use constraint::{Comp, Constraint, ScalarConstraint, VectorConstraint};
pub use error::SolverError;
pub use linalg::{invert, SingularMatrix};
pub use model::{Model, NonNegativeFormInfo, OptDir, StandardFormInfo};
pub use simplex::{
    Simplex, SolveResult, SolveStatus, DEFAULT_EPSILON, DEFAULT_MAX_ITERATIONS,
};
pub use slice::{set_difference, slice_columns};
pub use solver::{Solution, SolveAlgorithm, Solver};
pub use tableau::Tableau;
pub use var::{VarType, Variable, VariableDefinition, VariableTransformationInfo};
