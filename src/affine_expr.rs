use num::ToPrimitive;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use ndarray::Array1;

use crate::error::SolverError;
use crate::var::Variable;

/// An affine combination of variables plus a constant term.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AffineExpression {
    pub(crate) coeffs: HashMap<Variable, f64>,
    pub(crate) constant: f64,
}

impl fmt::Display for AffineExpression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let len = self.coeffs.len();
        let mult = "\u{00D7}";
        for (i, (var, coeff)) in self.coeffs.iter().enumerate() {
            if (i + 1 < len) | (self.constant != 0.0_f64) {
                write!(f, "{}{}{} + ", coeff, mult, var)?;
            } else {
                write!(f, "{}{}{}", coeff, mult, var)?;
            };
        }
        if (self.constant != 0.0_f64) | (len == 0) {
            write!(f, "{}", self.constant)?;
        }
        Ok(())
    }
}

impl From<&Variable> for AffineExpression {
    fn from(var: &Variable) -> Self {
        let mut coeffs = HashMap::new();
        coeffs.insert(var.clone(), 1.0_f64);

        Self {
            coeffs,
            constant: 0.0_f64,
        }
    }
}

impl<T: ToPrimitive> From<T> for AffineExpression {
    fn from(num: T) -> Self {
        let mut expr = Self::default();
        expr.constant = num.to_f64().unwrap();
        expr
    }
}

impl AffineExpression {
    pub fn new(coeffs: HashMap<Variable, f64>, constant: f64) -> Self {
        Self { coeffs, constant }
    }

    pub(crate) fn clear(&mut self) {
        self.coeffs.clear();
        self.constant = 0.0_f64;
    }

    pub fn variables(&self) -> Vec<Variable> {
        self.coeffs.keys().cloned().collect()
    }

    pub fn coeff(&self, var: &Variable) -> f64 {
        self.coeffs.get(var).copied().unwrap_or(0.0_f64)
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn constant_mut(&mut self) -> &mut f64 {
        &mut self.constant
    }

    pub fn contains_var(&self, var: &Variable) -> bool {
        self.coeffs.contains_key(var)
    }

    /// Evaluate the expression. Variables absent from `values` count as zero
    /// (the non-basic convention).
    pub fn eval(&self, values: &HashMap<Variable, f64>) -> f64 {
        let mut val = self.constant;
        for (var, coeff) in self.coeffs.iter() {
            val += coeff * values.get(var).copied().unwrap_or(0.0_f64);
        }
        val
    }

    /// Apply a whole substitution map in one pass. Variables without an entry
    /// are left in place, so partial maps are well defined.
    pub fn substitute(&self, map: &HashMap<Variable, AffineExpression>) -> AffineExpression {
        let mut out = AffineExpression::from(self.constant);
        for (var, coeff) in self.coeffs.iter() {
            match map.get(var) {
                Some(expr) => out += expr.clone() * *coeff,
                None => {
                    let c = out.coeffs.entry(var.clone()).or_insert(0.0_f64);
                    *c += coeff;
                }
            }
        }
        out.coeffs.retain(|_, c| *c != 0.0_f64);
        out
    }

    /// The dense coefficient row of this expression relative to an explicit
    /// variable ordering. Errors if the expression references a variable
    /// outside the ordering.
    pub fn coefficient_vector(&self, vars: &[Variable]) -> Result<Array1<f64>, SolverError> {
        let index: HashMap<&Variable, usize> =
            vars.iter().enumerate().map(|(i, v)| (v, i)).collect();
        let mut row = Array1::<f64>::zeros(vars.len());
        for (var, coeff) in self.coeffs.iter() {
            let j = *index
                .get(var)
                .ok_or_else(|| SolverError::VariableNotFound {
                    name: var.name().to_string(),
                })?;
            row[j] = *coeff;
        }
        Ok(row)
    }
}

//AF + AF -> AF
impl Add for AffineExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut exp = self;
        exp += rhs;
        exp
    }
}

//AF - AF -> AF
impl Sub for AffineExpression {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        let mut exp = self;
        exp -= rhs;
        exp
    }
}

//AF + V -> AF
impl Add<&Variable> for AffineExpression {
    type Output = Self;

    fn add(mut self, rhs: &Variable) -> Self::Output {
        self += rhs;
        self
    }
}

//AF - V -> AF
impl Sub<&Variable> for AffineExpression {
    type Output = Self;

    fn sub(mut self, rhs: &Variable) -> Self::Output {
        self -= rhs;
        self
    }
}

//V + AF -> AF
impl Add<AffineExpression> for &Variable {
    type Output = AffineExpression;

    fn add(self, rhs: AffineExpression) -> Self::Output {
        let mut out = rhs;
        out += self;
        out
    }
}

//V - AF -> AF
impl Sub<AffineExpression> for &Variable {
    type Output = AffineExpression;

    fn sub(self, rhs: AffineExpression) -> Self::Output {
        let mut out = -rhs;
        out += self;
        out
    }
}

//V + V -> AF
impl Add for &Variable {
    type Output = AffineExpression;

    fn add(self, rhs: Self) -> Self::Output {
        let mut coeffs = HashMap::new();
        for var in [self, rhs] {
            let c = coeffs.entry(var.clone()).or_insert(0.0_f64);
            *c += 1.0_f64;
        }

        coeffs.retain(|_, c| *c != 0.0_f64);
        Self::Output {
            coeffs,
            constant: 0.0_f64,
        }
    }
}

//V - V -> AF
impl Sub for &Variable {
    type Output = AffineExpression;

    fn sub(self, rhs: Self) -> Self::Output {
        let mut coeffs = HashMap::new();
        coeffs.insert(self.clone(), 1.0_f64);

        let c = coeffs.entry(rhs.clone()).or_insert(0.0_f64);
        *c -= 1.0_f64;

        coeffs.retain(|_, c| *c != 0.0_f64);
        Self::Output {
            coeffs,
            constant: 0.0_f64,
        }
    }
}

//AF + C -> AF
impl<T: ToPrimitive> Add<T> for AffineExpression {
    type Output = AffineExpression;

    fn add(mut self, rhs: T) -> Self::Output {
        self.constant += rhs.to_f64().unwrap();
        self
    }
}

//C + AF -> AF
macro_rules! scalar_left_add_af_impl(
    ($($T: ty), *$(, )*) => {$(
        impl Add<AffineExpression> for $T {
            type Output = AffineExpression;

            fn add(self, rhs: AffineExpression) -> Self::Output {
                let mut rhs = rhs;
                rhs.constant += self.to_f64().unwrap();
                rhs
            }
        }
    )*}
);

scalar_left_add_af_impl!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

//AF - C -> AF
impl<T: ToPrimitive> Sub<T> for AffineExpression {
    type Output = AffineExpression;

    fn sub(mut self, rhs: T) -> Self::Output {
        self.constant -= rhs.to_f64().unwrap();
        self
    }
}

//C - AF -> AF
macro_rules! scalar_left_sub_af_impl(
    ($($T: ty), *$(, )*) => {$(
        impl Sub<AffineExpression> for $T {
            type Output = AffineExpression;

            fn sub(self, rhs: AffineExpression) -> Self::Output {
                let mut rhs = -rhs;
                rhs.constant += self.to_f64().unwrap();
                rhs
            }
        }
    )*}
);

scalar_left_sub_af_impl!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

//AF * C -> AF
impl<T: ToPrimitive> Mul<T> for AffineExpression {
    type Output = AffineExpression;

    fn mul(mut self, rhs: T) -> Self::Output {
        self *= rhs.to_f64().unwrap();
        self
    }
}

//C * AF -> AF
macro_rules! scalar_left_mul_af_impl(
    ($($T: ty), *$(, )*) => {$(
        impl Mul<AffineExpression> for $T {
            type Output = AffineExpression;

            fn mul(self, rhs: AffineExpression) -> Self::Output {
                let mut rhs = rhs;
                rhs *= self.to_f64().unwrap();
                rhs
            }
        }
    )*}
);

scalar_left_mul_af_impl!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

//V + C -> AF
impl<T: ToPrimitive> Add<T> for &Variable {
    type Output = AffineExpression;

    fn add(self, rhs: T) -> Self::Output {
        let mut lhs = AffineExpression::from(self);
        lhs.constant += rhs.to_f64().unwrap();
        lhs
    }
}

//C + V -> AF
macro_rules! scalar_left_add_variable_impl(
    ($($T: ty), *$(, )*) => {$(
        impl Add<&Variable> for $T {
            type Output = AffineExpression;

            fn add(self, rhs: &Variable) -> Self::Output {
                let mut rhs = AffineExpression::from(rhs);
                rhs.constant += self.to_f64().unwrap();
                rhs
            }
        }
    )*}
);

scalar_left_add_variable_impl!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

//V - C -> AF
impl<T: ToPrimitive> Sub<T> for &Variable {
    type Output = AffineExpression;

    fn sub(self, rhs: T) -> Self::Output {
        let mut lhs = AffineExpression::from(self);
        lhs.constant -= rhs.to_f64().unwrap();
        lhs
    }
}

//C - V -> AF
macro_rules! scalar_left_sub_variable_impl(
    ($($T: ty), *$(, )*) => {$(
        impl Sub<&Variable> for $T {
            type Output = AffineExpression;

            fn sub(self, rhs: &Variable) -> Self::Output {
                let mut rhs = -AffineExpression::from(rhs);
                rhs.constant += self.to_f64().unwrap();
                rhs
            }
        }
    )*}
);

scalar_left_sub_variable_impl!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

//V * C -> AF
impl<T: ToPrimitive> Mul<T> for &Variable {
    type Output = AffineExpression;

    fn mul(self, rhs: T) -> Self::Output {
        AffineExpression::from(self) * rhs
    }
}

//C * V -> AF
macro_rules! scalar_left_mul_variable_impl(
    ($($T: ty), *$(, )*) => {$(
        impl Mul<&Variable> for $T {
            type Output = AffineExpression;

            fn mul(self, rhs: &Variable) -> Self::Output {
                AffineExpression::from(rhs) * self.to_f64().unwrap()
            }
        }
    )*}
);

scalar_left_mul_variable_impl!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

//AF += AF
impl AddAssign for AffineExpression {
    fn add_assign(&mut self, rhs: Self) {
        rhs.coeffs.into_iter().for_each(|(rhs_k, rhs_v)| {
            self.coeffs
                .entry(rhs_k)
                .and_modify(|lhs_v| *lhs_v += rhs_v)
                .or_insert(rhs_v);
        });
        self.coeffs.retain(|_, c| *c != 0.0_f64);
        self.constant += rhs.constant;
    }
}

//AF -= AF
impl SubAssign for AffineExpression {
    fn sub_assign(&mut self, rhs: Self) {
        rhs.coeffs.into_iter().for_each(|(rhs_k, rhs_v)| {
            self.coeffs
                .entry(rhs_k)
                .and_modify(|lhs_v| *lhs_v -= rhs_v)
                .or_insert(-rhs_v);
        });
        self.coeffs.retain(|_, c| *c != 0.0_f64);
        self.constant -= rhs.constant;
    }
}

//AF += V
impl AddAssign<&Variable> for AffineExpression {
    fn add_assign(&mut self, rhs: &Variable) {
        self.coeffs
            .entry(rhs.clone())
            .and_modify(|v| *v += 1.0_f64)
            .or_insert(1.0_f64);
        self.coeffs.retain(|_, c| *c != 0.0_f64);
    }
}

//AF -= V
impl SubAssign<&Variable> for AffineExpression {
    fn sub_assign(&mut self, rhs: &Variable) {
        self.coeffs
            .entry(rhs.clone())
            .and_modify(|v| *v -= 1.0_f64)
            .or_insert(-1.0_f64);
        self.coeffs.retain(|_, c| *c != 0.0_f64);
    }
}

//AF += C
impl<T: ToPrimitive> AddAssign<T> for AffineExpression {
    fn add_assign(&mut self, rhs: T) {
        self.constant += rhs.to_f64().unwrap();
    }
}

//AF -= C
impl<T: ToPrimitive> SubAssign<T> for AffineExpression {
    fn sub_assign(&mut self, rhs: T) {
        self.constant -= rhs.to_f64().unwrap();
    }
}

//AF *= C
impl<T: ToPrimitive> MulAssign<T> for AffineExpression {
    fn mul_assign(&mut self, rhs: T) {
        let rhs = rhs.to_f64().unwrap();
        self.coeffs.iter_mut().for_each(|(_, v)| *v *= rhs);
        self.constant *= rhs;
    }
}

impl Neg for AffineExpression {
    type Output = AffineExpression;

    fn neg(mut self) -> Self::Output {
        self *= -1;
        self
    }
}

impl Neg for &Variable {
    type Output = AffineExpression;

    fn neg(self) -> Self::Output {
        -AffineExpression::from(self)
    }
}
