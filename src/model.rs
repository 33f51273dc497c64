use log::debug;
use ndarray::{Array1, Array2};
use tabular::{Row, Table};

use std::collections::HashMap;
use std::fmt;

use crate::affine_expr::AffineExpression;
use crate::constraint::{Comp, Constraint};
use crate::error::SolverError;
use crate::var::{VarType, Variable, VariableDefinition, VariableTransformationInfo};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OptDir {
    Max,
    Min,
}

impl fmt::Display for OptDir {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OptDir::Max => write!(f, "Max"),
            OptDir::Min => write!(f, "Min"),
        }
    }
}

/// A linear program: an ordered list of variables (insertion order is the
/// canonical column order for every matrix operation), constraints, and one
/// objective. Constraints and the objective may only reference registered
/// variables; violations surface at construction, not at solve time.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    name: String,
    obj_fn: AffineExpression,
    opt_dir: OptDir,
    vars: Vec<Variable>,
    constraints: Vec<Constraint>,
}

/// Result of the non-negative-variable rewrite: the new model plus, for each
/// rewritten variable, the expression replacing it.
pub struct NonNegativeFormInfo {
    pub mdl: Model,
    pub var_map: HashMap<Variable, VariableTransformationInfo>,
}

/// Result of the slack-injection pass: the equality-form model, the map from
/// input variables to their non-negative mirrors, and the injected
/// slack/surplus variables in constraint-encounter order.
pub struct StandardFormInfo {
    pub mdl: Model,
    pub var_map: HashMap<Variable, AffineExpression>,
    pub slack_vars: Vec<Variable>,
}

impl Model {
    pub fn new<S: ToString>(name: S) -> Self {
        Self {
            name: name.to_string(),
            obj_fn: AffineExpression::default(),
            opt_dir: OptDir::Min,
            vars: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn opt_dir(&self) -> OptDir {
        self.opt_dir
    }

    pub fn obj_fn(&self) -> &AffineExpression {
        &self.obj_fn
    }

    pub fn variables(&self) -> &[Variable] {
        &self.vars
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Create a variable and register it at the end of the canonical order.
    pub fn add_var(&mut self, var_def: VariableDefinition) -> Variable {
        let var = Variable::new(var_def);
        self.vars.push(var.clone());
        var
    }

    pub fn contains_var(&self, var: &Variable) -> bool {
        self.vars.iter().any(|v| v == var)
    }

    fn check_vars(&self, vars: &[Variable]) -> Result<(), SolverError> {
        for var in vars {
            if !self.contains_var(var) {
                return Err(SolverError::VariableNotFound {
                    name: var.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Add a constraint to the model. Errors if the constraint references a
    /// variable that was never registered.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), SolverError> {
        self.check_vars(&constraint.variables())?;
        self.constraints.push(constraint);
        Ok(())
    }

    /// Set the objective function and optimization direction.
    pub fn set_obj_fn(
        &mut self,
        opt_dir: OptDir,
        obj_fn: AffineExpression,
    ) -> Result<(), SolverError> {
        self.check_vars(&obj_fn.variables())?;
        self.obj_fn = obj_fn;
        self.opt_dir = opt_dir;
        Ok(())
    }

    /// Map each variable to its canonical column index.
    pub fn variable_index_map(&self) -> HashMap<Variable, usize> {
        self.vars
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, var)| (var, i))
            .collect()
    }

    /// Total number of scalar rows contributed by all constraints.
    pub fn num_rows(&self) -> usize {
        self.constraints.iter().map(|c| c.dim()).sum()
    }

    /// Stage 1 of standardization: rewrite every variable to have a lower
    /// bound of zero. Finite lower bounds are shifted out, variables
    /// unbounded below are split into a difference of non-negative parts, and
    /// upper bounds are materialized as explicit `<=` constraints.
    /// Replacement variables take the original's position so the canonical
    /// order stays deterministic.
    pub fn with_nonnegative_variables(&self) -> NonNegativeFormInfo {
        let mut mdl = Model::new(format!("{} (non-negative variables)", self.name));
        let mut var_map: HashMap<Variable, VariableTransformationInfo> = HashMap::new();

        for var in &self.vars {
            match var.to_nonnegative_form() {
                Some(info) => {
                    mdl.vars.extend(info.added_vars.iter().cloned());
                    var_map.insert(var.clone(), info);
                }
                None => mdl.vars.push(var.clone()),
            }
        }

        let expr_map: HashMap<Variable, AffineExpression> = var_map
            .iter()
            .map(|(var, info)| (var.clone(), info.expr.clone()))
            .collect();

        for constraint in &self.constraints {
            mdl.constraints.push(constraint.substituted(&expr_map));
        }

        //upper bounds survive the rewrite as explicit constraints
        for var in &self.vars {
            if let Some(ub) = var.ub() {
                let lhs = match expr_map.get(var) {
                    Some(expr) => expr.clone(),
                    None => AffineExpression::from(var),
                };
                mdl.constraints
                    .push(Constraint::new(lhs, Comp::Le, ub));
            }
        }

        mdl.opt_dir = self.opt_dir;
        mdl.obj_fn = self.obj_fn.substitute(&expr_map);

        NonNegativeFormInfo { mdl, var_map }
    }

    /// Stage 2 of standardization: mirror every variable 1:1 into a fresh
    /// non-negative variable of the same name, then rewrite every constraint
    /// row into an equality with non-negative right-hand side, injecting one
    /// slack (`<=`) or surplus (`>=`) variable per non-equality row.
    ///
    /// Variables are assumed to already be non-negative in meaning; callers
    /// holding variables unbounded below should run
    /// [`Model::with_nonnegative_variables`] first (or use
    /// [`Model::as_standard_form`], which composes both stages).
    pub fn to_standard_form(&self) -> Result<StandardFormInfo, SolverError> {
        let mut mdl = Model::new(format!("{} (standard form)", self.name));

        //1:1 rename seeding the substitution map
        let mut var_map: HashMap<Variable, AffineExpression> = HashMap::new();
        for var in &self.vars {
            let mirror = mdl.add_var(
                VariableDefinition::new(var.ty())
                    .with_lb(0.0)
                    .with_name(var.name()),
            );
            var_map.insert(var.clone(), AffineExpression::from(&mirror));
        }

        let mut slack_vars = Vec::new();
        let mut rows = Vec::new();
        for constraint in &self.constraints {
            let info = constraint.substituted(&var_map).to_equality_rows(rows.len());
            mdl.vars.extend(info.slack_vars.iter().cloned());
            slack_vars.extend(info.slack_vars);
            rows.extend(info.rows);
        }
        mdl.constraints = rows.into_iter().map(Constraint::Scalar).collect();

        mdl.opt_dir = self.opt_dir;
        mdl.obj_fn = self.obj_fn.substitute(&var_map);

        debug!(
            "standardized \"{}\": {} equality rows, {} slack variables",
            self.name,
            mdl.constraints.len(),
            slack_vars.len()
        );

        Ok(StandardFormInfo {
            mdl,
            var_map,
            slack_vars,
        })
    }

    /// Both standardization stages composed: the returned map takes each of
    /// this model's variables to an expression over the standard-form model's
    /// variables.
    pub fn as_standard_form(&self) -> Result<StandardFormInfo, SolverError> {
        let nn = self.with_nonnegative_variables();
        let sf = nn.mdl.to_standard_form()?;

        let mut var_map: HashMap<Variable, AffineExpression> = HashMap::new();
        for var in &self.vars {
            let expr = match nn.var_map.get(var) {
                Some(info) => info.expr.substitute(&sf.var_map),
                None => sf
                    .var_map
                    .get(var)
                    .cloned()
                    .expect("every stage-1 variable has a stage-2 mirror"),
            };
            var_map.insert(var.clone(), expr);
        }

        Ok(StandardFormInfo {
            mdl: sf.mdl,
            var_map,
            slack_vars: sf.slack_vars,
        })
    }

    /// Internal phase-1 helper: append one artificial variable per row and
    /// replace the objective by the sum of artificials (minimized). Requires
    /// a standard-form model (scalar equality rows only).
    pub(crate) fn with_artificial_variables(&self) -> Result<(Model, Vec<Variable>), SolverError> {
        let mut aux = Model::new(format!("{} (phase 1)", self.name));
        aux.vars = self.vars.clone();

        let mut artificials = Vec::new();
        for (i, constraint) in self.constraints.iter().enumerate() {
            let row = match constraint {
                Constraint::Scalar(row) if row.comp == Comp::Eq => row,
                _ => {
                    return Err(SolverError::UnsupportedConstraintForm {
                        reason: format!("constraint {} is not a scalar equality row", i),
                    })
                }
            };
            let avar = aux.add_var(
                VariableDefinition::new(VarType::Float)
                    .with_lb(0.0)
                    .with_name(format!("A_{}", i)),
            );
            let mut row = row.clone();
            row.lhs += &avar;
            aux.constraints.push(Constraint::Scalar(row));
            artificials.push(avar);
        }

        let mut obj = AffineExpression::default();
        for avar in &artificials {
            obj += avar;
        }
        aux.obj_fn = obj;
        aux.opt_dir = OptDir::Min;

        Ok((aux, artificials))
    }

    /// The `(A, b)` of `A x = b`, rows in constraint order, columns in
    /// canonical variable order. Errors with `UnsupportedConstraintForm` when
    /// a constraint is not an equality.
    pub fn linear_equality_constraint_matrices(
        &self,
    ) -> Result<(Array2<f64>, Array1<f64>), SolverError> {
        let num_rows = self.num_rows();
        let mut a = Array2::<f64>::zeros((num_rows, self.vars.len()));
        let mut b = Array1::<f64>::zeros(num_rows);

        let mut i = 0;
        for constraint in &self.constraints {
            for row in constraint.scalar_rows() {
                if row.comp != Comp::Eq {
                    return Err(SolverError::UnsupportedConstraintForm {
                        reason: format!("constraint row {} is not an equality", i),
                    });
                }
                let diff = row.lhs - row.rhs;
                a.row_mut(i).assign(&diff.coefficient_vector(&self.vars)?);
                b[i] = -diff.constant();
                i += 1;
            }
        }

        Ok((a, b))
    }

    /// The objective's coefficient vector in canonical variable order, plus
    /// its constant term.
    pub fn objective_coefficients(&self) -> Result<(Array1<f64>, f64), SolverError> {
        let c = self.obj_fn.coefficient_vector(&self.vars)?;
        Ok((c, self.obj_fn.constant()))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut table = Table::new("{:<} {:^} {:>} {:^} {:<}");

        let mut row = Row::new();
        row.add_cell(self.opt_dir);
        row.add_cell(":");
        row.add_cell(&self.obj_fn);
        row.add_cell("");
        row.add_cell("");
        table.add_row(row);

        table.add_row(Row::from_cells(vec![
            "Subject to".to_string(),
            ":".to_string(),
            "".to_string(),
            "".to_string(),
            "".to_string(),
        ]));

        for constraint in &self.constraints {
            for scalar in constraint.scalar_rows() {
                let mut row = Row::new();
                row.add_cell("");
                row.add_cell("");
                row.add_cell(&scalar.lhs);
                row.add_cell(scalar.comp);
                row.add_cell(&scalar.rhs);
                table.add_row(row);
            }
        }

        write!(f, "{}", table)
    }
}
