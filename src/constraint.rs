use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::affine_expr::AffineExpression;
use crate::error::SolverError;
use crate::var::{VarType, Variable, VariableDefinition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comp {
    Le, // <=
    Ge, // >=
    Eq, // ==
}

impl Comp {
    /// The sense after multiplying both sides by -1.
    pub(crate) fn flipped(self) -> Self {
        match self {
            Comp::Le => Comp::Ge,
            Comp::Ge => Comp::Le,
            Comp::Eq => Comp::Eq,
        }
    }
}

impl fmt::Display for Comp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Comp::Le => write!(f, "\u{2264}"),
            Comp::Eq => write!(f, "="),
            Comp::Ge => write!(f, "\u{2265}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarConstraint {
    pub lhs: AffineExpression,
    pub comp: Comp,
    pub rhs: AffineExpression,
}

impl fmt::Display for ScalarConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.comp, self.rhs)
    }
}

impl ScalarConstraint {
    pub fn new<T: Into<AffineExpression>, U: Into<AffineExpression>>(
        lhs: T,
        comp: Comp,
        rhs: U,
    ) -> Self {
        Self {
            lhs: lhs.into(),
            comp,
            rhs: rhs.into(),
        }
    }

    pub fn variables(&self) -> Vec<Variable> {
        let vars: HashSet<Variable> = self
            .lhs
            .variables()
            .into_iter()
            .chain(self.rhs.variables())
            .collect();
        vars.into_iter().collect()
    }

    pub fn substituted(&self, map: &HashMap<Variable, AffineExpression>) -> Self {
        Self {
            lhs: self.lhs.substitute(map),
            comp: self.comp,
            rhs: self.rhs.substitute(map),
        }
    }

    /// Move every variable to the left, the constant to the right, and flip
    /// both sides if needed so the right-hand constant is non-negative.
    pub(crate) fn normalized(&self) -> ScalarConstraint {
        let mut lhs = self.lhs.clone();
        let mut rhs = self.rhs.clone();
        let mut comp = self.comp;

        //move all variables to lhs
        lhs -= rhs.clone();
        rhs.clear();

        //move constant to rhs
        rhs -= lhs.constant();
        *lhs.constant_mut() = 0.0_f64;

        //ensure non-negative rhs
        if rhs.constant() < 0.0_f64 {
            lhs *= -1;
            rhs *= -1;
            comp = comp.flipped();
        }

        ScalarConstraint { lhs, comp, rhs }
    }
}

/// A componentwise constraint over a fixed dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorConstraint {
    lhs: Vec<AffineExpression>,
    comp: Comp,
    rhs: Vec<AffineExpression>,
}

impl fmt::Display for VectorConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, (lhs, rhs)) in self.lhs.iter().zip(self.rhs.iter()).enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{} {} {}", lhs, self.comp, rhs)?;
        }
        Ok(())
    }
}

impl VectorConstraint {
    pub fn new(
        lhs: Vec<AffineExpression>,
        comp: Comp,
        rhs: Vec<AffineExpression>,
    ) -> Result<Self, SolverError> {
        if lhs.len() != rhs.len() {
            return Err(SolverError::DimensionMismatch {
                expected: lhs.len(),
                found: rhs.len(),
            });
        }
        Ok(Self { lhs, comp, rhs })
    }

    pub fn dim(&self) -> usize {
        self.lhs.len()
    }

    pub fn comp(&self) -> Comp {
        self.comp
    }
}

/// A constraint of either shape. Scalar and vector constraints normalize
/// through the same operation; a vector constraint of dimension `k` behaves
/// like `k` scalar rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Scalar(ScalarConstraint),
    Vector(VectorConstraint),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Constraint::Scalar(c) => write!(f, "{}", c),
            Constraint::Vector(c) => write!(f, "{}", c),
        }
    }
}

/// A constraint rewritten into equality rows, plus the slack/surplus
/// variables injected along the way (one per non-equality row, in row order).
pub(crate) struct ConstraintTransformationInfo {
    pub rows: Vec<ScalarConstraint>,
    pub slack_vars: Vec<Variable>,
}

impl Constraint {
    pub fn new<T: Into<AffineExpression>, U: Into<AffineExpression>>(
        lhs: T,
        comp: Comp,
        rhs: U,
    ) -> Self {
        Constraint::Scalar(ScalarConstraint::new(lhs, comp, rhs))
    }

    pub fn comp(&self) -> Comp {
        match self {
            Constraint::Scalar(c) => c.comp,
            Constraint::Vector(c) => c.comp,
        }
    }

    /// Number of rows this constraint contributes to the constraint matrix.
    pub fn dim(&self) -> usize {
        match self {
            Constraint::Scalar(_) => 1,
            Constraint::Vector(c) => c.dim(),
        }
    }

    pub fn variables(&self) -> Vec<Variable> {
        match self {
            Constraint::Scalar(c) => c.variables(),
            Constraint::Vector(c) => {
                let vars: HashSet<Variable> = c
                    .lhs
                    .iter()
                    .chain(c.rhs.iter())
                    .flat_map(|e| e.variables())
                    .collect();
                vars.into_iter().collect()
            }
        }
    }

    pub fn substituted(&self, map: &HashMap<Variable, AffineExpression>) -> Constraint {
        match self {
            Constraint::Scalar(c) => Constraint::Scalar(c.substituted(map)),
            Constraint::Vector(c) => Constraint::Vector(VectorConstraint {
                lhs: c.lhs.iter().map(|e| e.substitute(map)).collect(),
                comp: c.comp,
                rhs: c.rhs.iter().map(|e| e.substitute(map)).collect(),
            }),
        }
    }

    /// The componentwise view: one scalar constraint per row.
    pub fn scalar_rows(&self) -> Vec<ScalarConstraint> {
        match self {
            Constraint::Scalar(c) => vec![c.clone()],
            Constraint::Vector(c) => c
                .lhs
                .iter()
                .zip(c.rhs.iter())
                .map(|(lhs, rhs)| ScalarConstraint {
                    lhs: lhs.clone(),
                    comp: c.comp,
                    rhs: rhs.clone(),
                })
                .collect(),
        }
    }

    /// Normalize into equality rows, injecting one fresh non-negative slack
    /// (`<=`) or surplus (`>=`) variable per row. `row_offset` is the number
    /// of rows already emitted by earlier constraints; it only feeds the
    /// injected variables' names.
    pub(crate) fn to_equality_rows(&self, row_offset: usize) -> ConstraintTransformationInfo {
        let mut rows = Vec::new();
        let mut slack_vars = Vec::new();

        for (j, row) in self.scalar_rows().iter().enumerate() {
            let mut row = row.normalized();
            match row.comp {
                Comp::Eq => {}
                Comp::Le => {
                    //add slack variable to lhs
                    let vd = VariableDefinition::new(VarType::Float)
                        .with_lb(0.0)
                        .with_name(format!("S_{}", row_offset + j));
                    let svar = Variable::new(vd);
                    row.lhs += &svar;
                    row.comp = Comp::Eq;
                    slack_vars.push(svar);
                }
                Comp::Ge => {
                    //subtract surplus variable from lhs
                    let vd = VariableDefinition::new(VarType::Float)
                        .with_lb(0.0)
                        .with_name(format!("S_{}", row_offset + j));
                    let svar = Variable::new(vd);
                    row.lhs -= &svar;
                    row.comp = Comp::Eq;
                    slack_vars.push(svar);
                }
            }
            rows.push(row);
        }

        ConstraintTransformationInfo { rows, slack_vars }
    }
}
