use num::ToPrimitive;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use std::fmt;

use uuid::Uuid; //used for variable ID

use crate::affine_expr::AffineExpression;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VarType {
    Float,
    Int,
    Bool,
}

impl Default for VarType {
    fn default() -> Self {
        VarType::Float
    }
}

/// Builder for the metadata of a variable before it is registered in a model.
#[derive(Clone, Debug, Default)]
pub struct VariableDefinition {
    ty: VarType,
    lb: Option<f64>,
    ub: Option<f64>,
    name: String,
}

impl VariableDefinition {
    pub fn new(ty: VarType) -> Self {
        Self {
            ty,
            lb: None,
            ub: None,
            name: String::from(""),
        }
    }

    pub fn with_lb<T: ToPrimitive>(mut self, lb: T) -> Self {
        self.lb = lb.to_f64();
        assert!(self.valid_bounds());
        self
    }

    pub fn with_ub<T: ToPrimitive>(mut self, ub: T) -> Self {
        self.ub = ub.to_f64();
        assert!(self.valid_bounds());
        self
    }

    pub fn with_name<T: ToString>(mut self, name: T) -> Self {
        self.name = name.to_string();
        self
    }

    fn valid_bounds(&self) -> bool {
        //if both bounds exist, lb <= ub
        if let (Some(lb), Some(ub)) = (self.lb, self.ub) {
            return lb <= ub;
        }
        true
    }
}

#[derive(Debug)]
struct VariableData {
    ty: VarType,
    lb: Option<f64>,
    ub: Option<f64>,
    name: String,
    id: Uuid,
}

/// A handle to a variable. Clones share the same underlying variable, and
/// equality/hashing use the stable id only. Names may collide freely (slack
/// variables mirror base names); ids never do.
#[derive(Clone, Debug)]
pub struct Variable {
    data: Rc<VariableData>,
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How a variable was rewritten into non-negative form: the expression that
/// replaces it, and the fresh variables the expression is built from.
pub struct VariableTransformationInfo {
    pub expr: AffineExpression,
    pub added_vars: Vec<Variable>,
}

impl Variable {
    pub fn new(var_def: VariableDefinition) -> Self {
        Self {
            data: Rc::new(VariableData {
                ty: var_def.ty,
                lb: var_def.lb,
                ub: var_def.ub,
                name: var_def.name,
                id: Uuid::new_v4(),
            }),
        }
    }

    pub fn ty(&self) -> VarType {
        self.data.ty
    }

    pub fn lb(&self) -> Option<f64> {
        self.data.lb
    }

    pub fn ub(&self) -> Option<f64> {
        self.data.ub
    }

    pub fn id(&self) -> Uuid {
        self.data.id
    }

    pub fn name(&self) -> &str {
        self.data.name.as_str()
    }

    pub(crate) fn is_standard(&self) -> bool {
        matches!(self.lb(), Some(lb) if lb == 0.0_f64)
    }

    /// Rewrite this variable in terms of fresh non-negative variables.
    ///
    /// Returns `None` when the variable already has a lower bound of zero. A
    /// finite lower bound `l` becomes a shifted variable `x_o + l` with
    /// `x_o >= 0`; a variable unbounded below is split into the difference
    /// `x_p - x_n` of two non-negative parts. Upper bounds are not handled
    /// here; the model-level pass materializes them as constraints.
    pub fn to_nonnegative_form(&self) -> Option<VariableTransformationInfo> {
        if self.is_standard() {
            //lower bound already at zero -> do nothing
            return None;
        }
        match self.lb() {
            //bounded case -> shift by the bound
            Some(lb) => {
                let vd = VariableDefinition::new(VarType::Float)
                    .with_lb(0)
                    .with_name(format!("{}_o", self.name()));
                let var = Variable::new(vd);
                let expr = &var + lb;
                Some(VariableTransformationInfo {
                    expr,
                    added_vars: vec![var],
                })
            }
            //unbounded case -> difference of non-negative parts
            None => {
                let vd1 = VariableDefinition::new(VarType::Float)
                    .with_lb(0)
                    .with_name(format!("{}_p", self.name()));
                let var1 = Variable::new(vd1);
                let vd2 = VariableDefinition::new(VarType::Float)
                    .with_lb(0)
                    .with_name(format!("{}_n", self.name()));
                let var2 = Variable::new(vd2);
                let expr = &var1 - &var2;
                Some(VariableTransformationInfo {
                    expr,
                    added_vars: vec![var1, var2],
                })
            }
        }
    }
}
