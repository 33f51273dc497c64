use log::{debug, trace};
use ndarray::{Array1, Array2};

use std::collections::{HashMap, HashSet};

use crate::affine_expr::AffineExpression;
use crate::error::SolverError;
use crate::linalg;
use crate::model::{Model, OptDir, StandardFormInfo};
use crate::slice::slice_columns;
use crate::solver::Solution;
use crate::tableau::Tableau;
use crate::var::{VarType, Variable};

pub const DEFAULT_MAX_ITERATIONS: usize = 1_000;
pub const DEFAULT_EPSILON: f64 = 1.0e-9;

/// Terminal state of a solve.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    Optimal,
    /// The objective improves without bound along the named entering variable.
    Unbounded { entering: Variable },
    Infeasible,
    /// The pivot cap was reached; raise the limit or inspect for cycling.
    IterationLimitExceeded,
}

/// Outcome of running the pivot loop over a tableau. The solution vector is
/// aligned with the tableau model's canonical variable order; it and the
/// objective value are present only at `Optimal`.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub status: SolveStatus,
    pub solution: Option<Array1<f64>>,
    pub objective: Option<f64>,
    pub iterations: usize,
}

enum LoopOutcome {
    Optimal,
    Unbounded(Variable),
    IterationLimit,
}

/// The two-phase simplex engine. Magnitudes below `epsilon` count as zero in
/// every sign test (optimality, ratio-test denominators, feasibility); the
/// pivot count across both phases is capped by `max_iterations`.
#[derive(Debug, Clone, Copy)]
pub struct Simplex {
    max_iterations: usize,
    epsilon: f64,
}

impl Default for Simplex {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl Simplex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Run the pivot loop on a prepared tableau until optimality,
    /// unboundedness, or the iteration cap. The tableau's basic solution must
    /// be feasible on entry; a negative basic value reports `Infeasible`
    /// (build the tableau through [`Simplex::solve`] to get the phase-1
    /// treatment instead).
    pub fn solve_tableau(&self, tableau: &mut Tableau) -> Result<SolveResult, SolverError> {
        let x_b = tableau.compute_feasible_solution()?;
        if x_b.iter().any(|v| *v < -self.epsilon) {
            return Ok(SolveResult {
                status: SolveStatus::Infeasible,
                solution: None,
                objective: None,
                iterations: 0,
            });
        }

        let mut iterations = 0;
        let outcome = self.iterate(tableau, &HashSet::new(), &mut iterations)?;
        self.finish(tableau, outcome, iterations)
    }

    /// Standardize and solve a model end to end, mapping the result back to
    /// the model's own variables.
    pub fn solve(&self, mdl: &Model) -> Result<Solution, SolverError> {
        for var in mdl.variables() {
            if var.ty() != VarType::Float {
                return Err(SolverError::UnsupportedVariableDomain {
                    name: var.name().to_string(),
                });
            }
        }

        let sf = mdl.as_standard_form()?;
        let var_map = sf.var_map.clone();
        let num_rows = sf.mdl.num_rows();
        let mut iterations = 0;

        //the slack basis is worth trying whenever it is square
        if sf.slack_vars.len() == num_rows {
            let mut tableau = Tableau::initial(&sf.mdl, &sf.slack_vars)?;
            let x_b = tableau.compute_feasible_solution()?;
            if x_b.iter().all(|v| *v >= -self.epsilon) {
                let outcome = self.iterate(&mut tableau, &HashSet::new(), &mut iterations)?;
                let result = self.finish(&tableau, outcome, iterations)?;
                return Ok(Solution::from_result(var_map, tableau.model(), result));
            }
            debug!("slack basis is infeasible, running phase 1");
        } else {
            debug!(
                "no square slack basis ({} slack variables for {} rows), running phase 1",
                sf.slack_vars.len(),
                num_rows
            );
        }

        self.solve_two_phase(&sf, var_map, iterations)
    }

    /// Phase 1: minimize the sum of one artificial variable per row starting
    /// from the all-artificial basis, then hand the feasible basis to phase 2
    /// with the true objective restored.
    fn solve_two_phase(
        &self,
        sf: &StandardFormInfo,
        var_map: HashMap<Variable, AffineExpression>,
        mut iterations: usize,
    ) -> Result<Solution, SolverError> {
        let (aux_mdl, artificial_vars) = sf.mdl.with_artificial_variables()?;
        let mut tableau = Tableau::with_basis(&aux_mdl, artificial_vars.clone())?;

        let outcome = self.iterate(&mut tableau, &HashSet::new(), &mut iterations)?;
        match outcome {
            LoopOutcome::Optimal => {}
            LoopOutcome::IterationLimit => {
                return Ok(Solution::non_optimal(
                    SolveStatus::IterationLimitExceeded,
                    var_map,
                    iterations,
                ))
            }
            //the auxiliary objective is a sum of non-negative variables
            LoopOutcome::Unbounded(_) => {
                unreachable!("phase 1 objective is bounded below by zero")
            }
        }

        let (_, aux_objective) = self.assemble(&tableau)?;
        if aux_objective > self.epsilon {
            debug!("phase 1 optimum {} > 0: infeasible", aux_objective);
            return Ok(Solution::non_optimal(
                SolveStatus::Infeasible,
                var_map,
                iterations,
            ));
        }

        self.drive_out_artificials(&mut tableau, &artificial_vars)?;

        //phase 2: true objective on the phase-1 basis
        let mut phase2_mdl = aux_mdl;
        phase2_mdl.set_obj_fn(sf.mdl.opt_dir(), sf.mdl.obj_fn().clone())?;
        let mut tableau = Tableau::with_basis(&phase2_mdl, tableau.basic_vars().to_vec())?;

        let barred: HashSet<Variable> = artificial_vars.into_iter().collect();
        let outcome = self.iterate(&mut tableau, &barred, &mut iterations)?;
        let result = self.finish(&tableau, outcome, iterations)?;
        Ok(Solution::from_result(var_map, tableau.model(), result))
    }

    /// Pivot until no reduced cost improves the objective. Variables in
    /// `barred` never enter the basis (phase 2 bars the artificials).
    fn iterate(
        &self,
        tableau: &mut Tableau,
        barred: &HashSet<Variable>,
        iterations: &mut usize,
    ) -> Result<LoopOutcome, SolverError> {
        let mdl = tableau.model().clone();
        let (a, b) = mdl.linear_equality_constraint_matrices()?;
        let (c, _) = mdl.objective_coefficients()?;
        let index_map = mdl.variable_index_map();
        //minimize improves on a negative reduced cost; maximize on a positive
        let sense = match mdl.opt_dir() {
            OptDir::Min => 1.0,
            OptDir::Max => -1.0,
        };

        loop {
            let binv = self.basis_inverse(&mdl, &a, tableau)?;
            let x_b = binv.dot(&b);

            //c_B^T B⁻¹
            let c_b = Array1::from(
                tableau
                    .basic_vars()
                    .iter()
                    .map(|var| c[index_map[var]])
                    .collect::<Vec<f64>>(),
            );
            let y = c_b.dot(&binv);

            //entering variable: improving reduced cost, lowest canonical
            //index (Bland's rule)
            let mut entering: Option<(usize, Variable)> = None;
            for var in tableau.nonbasic_vars() {
                if barred.contains(var) {
                    continue;
                }
                let j = index_map[var];
                let reduced = c[j] - y.dot(&a.column(j));
                if sense * reduced < -self.epsilon {
                    match &entering {
                        Some((best, _)) if *best <= j => {}
                        _ => entering = Some((j, var.clone())),
                    }
                }
            }
            let Some((entering_idx, entering)) = entering else {
                return Ok(LoopOutcome::Optimal);
            };

            //ratio test on the entering direction
            let direction = binv.dot(&a.column(entering_idx));
            let mut leaving: Option<(usize, f64)> = None;
            for (i, d) in direction.iter().enumerate() {
                if *d <= self.epsilon {
                    continue;
                }
                let ratio = x_b[i] / d;
                let replace = match leaving {
                    None => true,
                    Some((row, best)) => {
                        ratio < best - self.epsilon
                            || ((ratio - best).abs() <= self.epsilon
                                && index_map[&tableau.basic_vars()[i]]
                                    < index_map[&tableau.basic_vars()[row]])
                    }
                };
                if replace {
                    leaving = Some((i, ratio));
                }
            }
            let Some((leaving_row, ratio)) = leaving else {
                debug!("unbounded along {}", entering);
                return Ok(LoopOutcome::Unbounded(entering));
            };

            if *iterations >= self.max_iterations {
                debug!("iteration limit of {} reached", self.max_iterations);
                return Ok(LoopOutcome::IterationLimit);
            }

            trace!(
                "iteration {}: {} enters at ratio {}",
                *iterations,
                entering,
                ratio
            );
            tableau.pivot(&entering, leaving_row);
            *iterations += 1;
        }
    }

    /// After a zero-optimum phase 1, pivot leftover artificial variables out
    /// of the basis wherever some non-artificial column has a nonzero entry
    /// in their row. Rows where none exists are redundant; the artificial is
    /// pinned at zero there and phase 2 cannot move it.
    fn drive_out_artificials(
        &self,
        tableau: &mut Tableau,
        artificial_vars: &[Variable],
    ) -> Result<(), SolverError> {
        let artificial: HashSet<&Variable> = artificial_vars.iter().collect();
        let mdl = tableau.model().clone();
        let (a, _) = mdl.linear_equality_constraint_matrices()?;
        let index_map = mdl.variable_index_map();

        for row in 0..tableau.num_basic_vars() {
            if !artificial.contains(&tableau.basic_vars()[row]) {
                continue;
            }
            let binv = self.basis_inverse(&mdl, &a, tableau)?;
            let entering = tableau
                .nonbasic_vars()
                .iter()
                .find(|var| {
                    !artificial.contains(var)
                        && binv.row(row).dot(&a.column(index_map[var])).abs() > self.epsilon
                })
                .cloned();
            match entering {
                Some(var) => {
                    trace!("driving {} out of the basis via {}", tableau.basic_vars()[row], var);
                    tableau.pivot(&var, row);
                }
                None => trace!(
                    "row {} is redundant; {} stays basic at zero",
                    row,
                    tableau.basic_vars()[row]
                ),
            }
        }
        Ok(())
    }

    fn basis_inverse(
        &self,
        mdl: &Model,
        a: &Array2<f64>,
        tableau: &Tableau,
    ) -> Result<Array2<f64>, SolverError> {
        let bmat = slice_columns(mdl, a, tableau.basic_vars())?;
        linalg::invert(&bmat).map_err(|_| SolverError::SingularBasis {
            basis: tableau
                .basic_vars()
                .iter()
                .map(|var| var.name().to_string())
                .collect(),
        })
    }

    fn finish(
        &self,
        tableau: &Tableau,
        outcome: LoopOutcome,
        iterations: usize,
    ) -> Result<SolveResult, SolverError> {
        match outcome {
            LoopOutcome::Optimal => {
                let (solution, objective) = self.assemble(tableau)?;
                Ok(SolveResult {
                    status: SolveStatus::Optimal,
                    solution: Some(solution),
                    objective: Some(objective),
                    iterations,
                })
            }
            LoopOutcome::Unbounded(entering) => Ok(SolveResult {
                status: SolveStatus::Unbounded { entering },
                solution: None,
                objective: None,
                iterations,
            }),
            LoopOutcome::IterationLimit => Ok(SolveResult {
                status: SolveStatus::IterationLimitExceeded,
                solution: None,
                objective: None,
                iterations,
            }),
        }
    }

    /// The full-length solution vector (canonical variable order) and the
    /// objective value at the tableau's current vertex.
    fn assemble(&self, tableau: &Tableau) -> Result<(Array1<f64>, f64), SolverError> {
        let x_b = tableau.compute_feasible_solution()?;
        let mdl = tableau.model();
        let index_map = mdl.variable_index_map();

        let mut x = Array1::<f64>::zeros(mdl.variables().len());
        for (i, var) in tableau.basic_vars().iter().enumerate() {
            x[index_map[var]] = x_b[i];
        }
        for (i, var) in tableau.nonbasic_vars().iter().enumerate() {
            x[index_map[var]] = tableau.nonbasic_values()[i];
        }

        let (c, c0) = mdl.objective_coefficients()?;
        let objective = c.dot(&x) + c0;
        Ok((x, objective))
    }
}
