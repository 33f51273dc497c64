use std::collections::HashMap;

use crate::affine_expr::AffineExpression;
use crate::error::SolverError;
use crate::model::Model;
use crate::simplex::{Simplex, SolveResult, SolveStatus};
use crate::var::Variable;

/// An algorithm that can solve a model end to end.
pub trait SolveAlgorithm {
    fn solve(&self, mdl: &Model) -> Result<Solution, SolverError>;
}

impl SolveAlgorithm for Simplex {
    fn solve(&self, mdl: &Model) -> Result<Solution, SolverError> {
        Simplex::solve(self, mdl)
    }
}

/// A terminal solve result mapped back to the caller's variables. Values of
/// transformed variables (shifted, split, renamed) are recovered by
/// evaluating their replacement expressions over the standard-form values.
#[derive(Debug)]
pub struct Solution {
    status: SolveStatus,
    objective: Option<f64>,
    iterations: usize,
    var_map: HashMap<Variable, AffineExpression>,
    var_values: HashMap<Variable, f64>,
}

impl Solution {
    pub(crate) fn from_result(
        var_map: HashMap<Variable, AffineExpression>,
        solved_mdl: &Model,
        result: SolveResult,
    ) -> Self {
        let mut var_values = HashMap::new();
        if let Some(x) = &result.solution {
            for (i, var) in solved_mdl.variables().iter().enumerate() {
                var_values.insert(var.clone(), x[i]);
            }
        }

        Self {
            status: result.status,
            objective: result.objective,
            iterations: result.iterations,
            var_map,
            var_values,
        }
    }

    pub(crate) fn non_optimal(
        status: SolveStatus,
        var_map: HashMap<Variable, AffineExpression>,
        iterations: usize,
    ) -> Self {
        Self {
            status,
            objective: None,
            iterations,
            var_map,
            var_values: HashMap::new(),
        }
    }

    pub fn status(&self) -> &SolveStatus {
        &self.status
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self.status, SolveStatus::Optimal)
    }

    /// The objective value at the optimum; `None` for non-optimal statuses.
    pub fn objective_value(&self) -> Option<f64> {
        self.objective
    }

    /// Total pivots across both phases.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// The value of one of the original model's variables at the optimum.
    pub fn var_value(&self, var: &Variable) -> Option<f64> {
        if !self.is_optimal() {
            return None;
        }
        match self.var_map.get(var) {
            Some(expr) => Some(expr.eval(&self.var_values)),
            None => self.var_values.get(var).copied(),
        }
    }
}

/// Pairs a model with a solve algorithm.
pub struct Solver<T: SolveAlgorithm> {
    mdl: Model,
    solve_algo: T,
}

impl<T: SolveAlgorithm> Solver<T> {
    pub fn new(mdl: Model, solve_algo: T) -> Self {
        Self { mdl, solve_algo }
    }

    pub fn mdl(&self) -> &Model {
        &self.mdl
    }

    pub fn solve(&self) -> Result<Solution, SolverError> {
        self.solve_algo.solve(&self.mdl)
    }
}
