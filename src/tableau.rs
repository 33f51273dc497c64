use log::trace;
use ndarray::Array1;

use crate::error::SolverError;
use crate::linalg;
use crate::model::Model;
use crate::slice::{set_difference, slice_columns};
use crate::var::Variable;

/// The partition view of a linear program in standard form: an ordered basis
/// (one basic variable per equality row), the remaining variables held at
/// fixed values (zero unless shifted), and the model the partition refers to.
///
/// Invariants: basic and non-basic variables are disjoint and together cover
/// the model's variable list, and the basis has exactly one variable per
/// constraint row so the basis sub-matrix is square.
#[derive(Debug, Clone)]
pub struct Tableau {
    basic_vars: Vec<Variable>,
    nonbasic_vars: Vec<Variable>,
    nonbasic_values: Array1<f64>,
    mdl: Model,
}

impl Tableau {
    /// The initial partition for a standard-form model: the injected slack
    /// variables form the starting basis. This is a valid, feasible basis
    /// exactly when every original constraint was `<=` with a non-negative
    /// right-hand side (the slack columns then form an identity sub-matrix).
    pub fn initial(mdl: &Model, slack_vars: &[Variable]) -> Result<Self, SolverError> {
        Self::with_basis(mdl, slack_vars.to_vec())
    }

    /// A partition with an explicit basis. The basis must consist of model
    /// variables and have one entry per constraint row.
    pub fn with_basis(mdl: &Model, basic_vars: Vec<Variable>) -> Result<Self, SolverError> {
        for var in &basic_vars {
            if !mdl.contains_var(var) {
                return Err(SolverError::VariableNotFound {
                    name: var.name().to_string(),
                });
            }
        }
        let num_rows = mdl.num_rows();
        if basic_vars.len() != num_rows {
            return Err(SolverError::DimensionMismatch {
                expected: num_rows,
                found: basic_vars.len(),
            });
        }

        let nonbasic_vars = set_difference(mdl.variables(), &basic_vars);
        let nonbasic_values = Array1::zeros(nonbasic_vars.len());

        Ok(Self {
            basic_vars,
            nonbasic_vars,
            nonbasic_values,
            mdl: mdl.clone(),
        })
    }

    pub fn basic_vars(&self) -> &[Variable] {
        &self.basic_vars
    }

    pub fn nonbasic_vars(&self) -> &[Variable] {
        &self.nonbasic_vars
    }

    pub fn nonbasic_values(&self) -> &Array1<f64> {
        &self.nonbasic_values
    }

    pub fn model(&self) -> &Model {
        &self.mdl
    }

    pub fn num_basic_vars(&self) -> usize {
        self.basic_vars.len()
    }

    pub fn num_nonbasic_vars(&self) -> usize {
        self.nonbasic_vars.len()
    }

    /// The current values of the basic variables, aligned with the basis
    /// order, from
    ///
    /// ```text
    /// A = [B | N]
    /// x_B = B⁻¹ b − B⁻¹ N x_N
    /// ```
    ///
    /// A non-invertible basis surfaces as `SingularBasis` naming the basis
    /// variables; it means the current partition is not a valid basis.
    pub fn compute_feasible_solution(&self) -> Result<Array1<f64>, SolverError> {
        let (a, b) = self.mdl.linear_equality_constraint_matrices()?;

        let n = slice_columns(&self.mdl, &a, &self.nonbasic_vars)?;
        let bmat = slice_columns(&self.mdl, &a, &self.basic_vars)?;

        if self.nonbasic_values.len() != self.nonbasic_vars.len() {
            return Err(SolverError::DimensionMismatch {
                expected: self.nonbasic_vars.len(),
                found: self.nonbasic_values.len(),
            });
        }

        let binv = linalg::invert(&bmat).map_err(|_| SolverError::SingularBasis {
            basis: self
                .basic_vars
                .iter()
                .map(|var| var.name().to_string())
                .collect(),
        })?;

        let x = binv.dot(&b) - binv.dot(&n).dot(&self.nonbasic_values);
        Ok(x)
    }

    /// Swap `entering` into the basis at `leaving_row`. The displaced basic
    /// variable rejoins the non-basic set at value zero; non-basic order stays
    /// aligned with the model's canonical order.
    pub(crate) fn pivot(&mut self, entering: &Variable, leaving_row: usize) {
        //violations here are engine bugs, not caller errors
        assert!(leaving_row < self.basic_vars.len());
        assert!(
            self.nonbasic_vars.iter().any(|var| var == entering),
            "entering variable must be non-basic"
        );

        let leaving = std::mem::replace(&mut self.basic_vars[leaving_row], entering.clone());
        trace!(
            "pivot: {} enters the basis, {} leaves (row {})",
            entering,
            leaving,
            leaving_row
        );

        self.nonbasic_vars = set_difference(self.mdl.variables(), &self.basic_vars);
        self.nonbasic_values = Array1::zeros(self.nonbasic_vars.len());

        debug_assert_eq!(
            self.basic_vars.len() + self.nonbasic_vars.len(),
            self.mdl.variables().len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    use crate::constraint::{Comp, Constraint};
    use crate::model::OptDir;
    use crate::var::{VarType, VariableDefinition};

    //the reference <=-LP: max 4x1 + 3x2 + 5x3 with rows <= [4, 6, 8]
    fn reference_lp() -> Model {
        let mut mdl = Model::new("reference");
        let x1 = mdl.add_var(
            VariableDefinition::new(VarType::Float)
                .with_lb(0)
                .with_name("x1"),
        );
        let x2 = mdl.add_var(
            VariableDefinition::new(VarType::Float)
                .with_lb(0)
                .with_name("x2"),
        );
        let x3 = mdl.add_var(
            VariableDefinition::new(VarType::Float)
                .with_lb(0)
                .with_name("x3"),
        );

        mdl.add_constraint(Constraint::new(&x1 + 2 * &x2 + 2 * &x3, Comp::Le, 4))
            .unwrap();
        mdl.add_constraint(Constraint::new(3 * &x1 + 4 * &x3, Comp::Le, 6))
            .unwrap();
        mdl.add_constraint(Constraint::new(2 * &x1 + &x2 + 4 * &x3, Comp::Le, 8))
            .unwrap();
        mdl.set_obj_fn(OptDir::Max, 4 * &x1 + 3 * &x2 + 5 * &x3)
            .unwrap();
        mdl
    }

    #[test]
    fn slack_basis_partitions_the_variables() {
        let sf = reference_lp().to_standard_form().unwrap();
        let tableau = Tableau::initial(&sf.mdl, &sf.slack_vars).unwrap();

        assert_eq!(tableau.num_basic_vars(), 3);
        assert_eq!(tableau.num_nonbasic_vars(), 3);
        assert!(tableau
            .basic_vars()
            .iter()
            .all(|var| var.name().starts_with("S_")));
        //non-basic variables keep the canonical order
        let names: Vec<&str> = tableau.nonbasic_vars().iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["x1", "x2", "x3"]);
        assert!(tableau.nonbasic_values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn initial_feasible_solution_is_the_rhs() {
        let sf = reference_lp().to_standard_form().unwrap();
        let tableau = Tableau::initial(&sf.mdl, &sf.slack_vars).unwrap();

        let x_b = tableau.compute_feasible_solution().unwrap();
        assert_eq!(x_b.len(), 3);
        for (value, expected) in x_b.iter().zip([4.0, 6.0, 8.0]) {
            assert_abs_diff_eq!(*value, expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn assembled_solution_satisfies_the_equalities() {
        let sf = reference_lp().to_standard_form().unwrap();
        let tableau = Tableau::initial(&sf.mdl, &sf.slack_vars).unwrap();
        let x_b = tableau.compute_feasible_solution().unwrap();

        let (a, b) = sf.mdl.linear_equality_constraint_matrices().unwrap();
        let index_map = sf.mdl.variable_index_map();
        let mut x = Array1::<f64>::zeros(sf.mdl.variables().len());
        for (i, var) in tableau.basic_vars().iter().enumerate() {
            x[index_map[var]] = x_b[i];
        }

        let residual = a.dot(&x) - &b;
        for r in residual.iter() {
            assert_abs_diff_eq!(*r, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn basis_must_have_one_variable_per_row() {
        let sf = reference_lp().to_standard_form().unwrap();
        let err = Tableau::initial(&sf.mdl, &sf.slack_vars[..2]).unwrap_err();
        assert_eq!(
            err,
            SolverError::DimensionMismatch {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn basis_variables_must_belong_to_the_model() {
        let sf = reference_lp().to_standard_form().unwrap();
        let stranger = Variable::new(
            VariableDefinition::new(VarType::Float)
                .with_lb(0)
                .with_name("q"),
        );
        let err = Tableau::with_basis(
            &sf.mdl,
            vec![stranger, sf.slack_vars[0].clone(), sf.slack_vars[1].clone()],
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::VariableNotFound { .. }));
    }

    #[test]
    fn dependent_basis_columns_are_a_singular_basis() {
        //x1 and x2 appear in a single row each with proportional columns
        let mut mdl = Model::new("singular");
        let x1 = mdl.add_var(
            VariableDefinition::new(VarType::Float)
                .with_lb(0)
                .with_name("x1"),
        );
        let x2 = mdl.add_var(
            VariableDefinition::new(VarType::Float)
                .with_lb(0)
                .with_name("x2"),
        );
        mdl.add_constraint(Constraint::new(&x1 + &x2, Comp::Eq, 1)).unwrap();
        mdl.add_constraint(Constraint::new(2 * &x1 + 2 * &x2, Comp::Eq, 2))
            .unwrap();
        mdl.set_obj_fn(OptDir::Min, &x1 + 0).unwrap();

        let tableau = Tableau::with_basis(&mdl, vec![x1, x2]).unwrap();
        let err = tableau.compute_feasible_solution().unwrap_err();
        match err {
            SolverError::SingularBasis { basis } => {
                assert_eq!(basis, vec!["x1".to_string(), "x2".to_string()]);
            }
            other => panic!("expected SingularBasis, got {:?}", other),
        }
    }

    #[test]
    fn pivot_swaps_the_partition() {
        let sf = reference_lp().to_standard_form().unwrap();
        let mut tableau = Tableau::initial(&sf.mdl, &sf.slack_vars).unwrap();

        let entering = tableau.nonbasic_vars()[0].clone();
        let leaving = tableau.basic_vars()[1].clone();
        tableau.pivot(&entering, 1);

        assert_eq!(tableau.basic_vars()[1], entering);
        assert!(tableau.nonbasic_vars().contains(&leaving));
        assert_eq!(tableau.num_basic_vars(), 3);
        assert_eq!(tableau.num_nonbasic_vars(), 3);
    }
}
