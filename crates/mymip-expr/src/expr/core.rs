//! Core expression type: a linear combination of variables plus a constant.
//!
//! `Expr` is a value type. Every arithmetic method and operator returns a new
//! expression; only the explicitly named accumulation methods (`accumulate`,
//! `accumulate_scaled`, `add_term`) and the compound assignment operators
//! mutate, and only the accumulator they are called on.

use crate::expr::constraint::{ComparisonSense, ConstraintExpr};
use crate::expr::error::ExprError;
use crate::expr::terms::{TermKey, TermMap};
use crate::ids::VariableId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expr {
    terms: TermMap,
}

impl Expr {
    // ── Constructors ────────────────────────────────────────

    /// Empty expression (all zeros).
    pub fn new() -> Self {
        Self::default()
    }

    /// Just a constant, no variable terms.
    pub fn from_constant(constant: f64) -> Self {
        Self {
            terms: TermMap::from_constant(constant),
        }
    }

    /// Single variable with coefficient 1.0.
    pub fn var(var: VariableId) -> Self {
        Self::term(var, 1.0)
    }

    /// Single linear term: coeff * var. A zero coefficient still records the
    /// variable.
    pub fn term(var: VariableId, coeff: f64) -> Self {
        let mut terms = TermMap::new();
        terms.add_term(var, coeff);
        Self { terms }
    }

    /// Sum of `(variable, coefficient)` pairs; repeated variables accumulate.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (VariableId, f64)>) -> Self {
        let mut terms = TermMap::new();
        for (var, coeff) in pairs {
            terms.add_term(var, coeff);
        }
        Self { terms }
    }

    pub fn from_terms(terms: TermMap) -> Self {
        Self { terms }
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn constant(&self) -> f64 {
        self.terms.constant()
    }

    pub fn coefficient(&self, var: VariableId) -> f64 {
        self.terms.coefficient(var)
    }

    /// Coefficient under `key`, or 0 when absent.
    pub fn get(&self, key: impl Into<TermKey>) -> f64 {
        self.terms.get(key)
    }

    /// Ordered `(key, coefficient)` pairs.
    pub fn items(&self) -> impl Iterator<Item = (TermKey, f64)> + '_ {
        self.terms.items()
    }

    pub fn terms(&self) -> &TermMap {
        &self.terms
    }

    pub fn into_terms(self) -> TermMap {
        self.terms
    }

    /// Number of variable terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    // ── Algebra (returns new expressions) ───────────────────

    /// `self + other`, where `other` is a scalar, variable or expression.
    pub fn add(&self, other: impl Into<Expr>) -> Self {
        let mut out = self.clone();
        out.accumulate(other);
        out
    }

    /// `self - other`.
    pub fn subtract(&self, other: impl Into<Expr>) -> Self {
        let mut out = self.clone();
        out.accumulate_scaled(&other.into(), -1.0);
        out
    }

    /// Multiply every coefficient, constant included, by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        let mut out = self.clone();
        out.terms.scale_in_place(factor);
        out
    }

    pub fn negate(&self) -> Self {
        self.scale(-1.0)
    }

    /// Scale by the reciprocal of `divisor`.
    pub fn divide(&self, divisor: f64) -> Result<Self, ExprError> {
        if divisor == 0.0 {
            return Err(ExprError::DivisionByZero);
        }
        if !divisor.is_finite() {
            return Err(ExprError::NonFiniteFactor);
        }
        Ok(self.scale(1.0 / divisor))
    }

    // ── In-place accumulation ───────────────────────────────

    /// Add `other` into this accumulator.
    pub fn accumulate(&mut self, other: impl Into<Expr>) -> &mut Self {
        self.terms.merge_owned(other.into().terms);
        self
    }

    /// Add `factor * other` into this accumulator.
    pub fn accumulate_scaled(&mut self, other: &Expr, factor: f64) -> &mut Self {
        self.terms.merge_scaled(&other.terms, factor);
        self
    }

    pub fn add_term(&mut self, var: VariableId, coeff: f64) -> &mut Self {
        self.terms.add_term(var, coeff);
        self
    }

    // ── Comparison methods (produce ConstraintExpr) ─────────

    pub fn compare(&self, sense: ComparisonSense, rhs: impl Into<Expr>) -> ConstraintExpr {
        ConstraintExpr::compare(self, sense, rhs)
    }

    pub fn le_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare(ComparisonSense::LessEqual, rhs)
    }

    pub fn ge_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare(ComparisonSense::GreaterEqual, rhs)
    }

    pub fn eq_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare(ComparisonSense::Equal, rhs)
    }

    pub fn le_expr(&self, rhs: &Expr) -> ConstraintExpr {
        self.compare(ComparisonSense::LessEqual, rhs)
    }

    pub fn ge_expr(&self, rhs: &Expr) -> ConstraintExpr {
        self.compare(ComparisonSense::GreaterEqual, rhs)
    }

    pub fn eq_expr(&self, rhs: &Expr) -> ConstraintExpr {
        self.compare(ComparisonSense::Equal, rhs)
    }
}

// ── Conversions ─────────────────────────────────────────────

impl From<VariableId> for Expr {
    fn from(value: VariableId) -> Self {
        Expr::var(value)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::from_constant(value)
    }
}

impl From<&Expr> for Expr {
    fn from(value: &Expr) -> Self {
        value.clone()
    }
}

impl From<TermMap> for Expr {
    fn from(value: TermMap) -> Self {
        Expr::from_terms(value)
    }
}

// ── Operator overloads ──────────────────────────────────────

impl<T: Into<Expr>> std::ops::Add<T> for Expr {
    type Output = Expr;

    fn add(mut self, rhs: T) -> Self::Output {
        self.accumulate(rhs);
        self
    }
}

impl<T: Into<Expr>> std::ops::Add<T> for &Expr {
    type Output = Expr;

    fn add(self, rhs: T) -> Self::Output {
        Expr::add(self, rhs)
    }
}

impl<T: Into<Expr>> std::ops::Add<T> for VariableId {
    type Output = Expr;

    fn add(self, rhs: T) -> Self::Output {
        Expr::var(self) + rhs
    }
}

impl std::ops::Add<Expr> for f64 {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Self::Output {
        rhs + self
    }
}

impl std::ops::Add<VariableId> for f64 {
    type Output = Expr;

    fn add(self, rhs: VariableId) -> Self::Output {
        Expr::var(rhs) + self
    }
}

impl<T: Into<Expr>> std::ops::Sub<T> for Expr {
    type Output = Expr;

    fn sub(mut self, rhs: T) -> Self::Output {
        self.accumulate_scaled(&rhs.into(), -1.0);
        self
    }
}

impl<T: Into<Expr>> std::ops::Sub<T> for &Expr {
    type Output = Expr;

    fn sub(self, rhs: T) -> Self::Output {
        Expr::subtract(self, rhs)
    }
}

impl<T: Into<Expr>> std::ops::Sub<T> for VariableId {
    type Output = Expr;

    fn sub(self, rhs: T) -> Self::Output {
        Expr::var(self) - rhs
    }
}

impl std::ops::Sub<Expr> for f64 {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Self::Output {
        -rhs + self
    }
}

impl std::ops::Mul<f64> for Expr {
    type Output = Expr;

    fn mul(mut self, rhs: f64) -> Self::Output {
        self.terms.scale_in_place(rhs);
        self
    }
}

impl std::ops::Mul<f64> for &Expr {
    type Output = Expr;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl std::ops::Mul<f64> for VariableId {
    type Output = Expr;

    fn mul(self, rhs: f64) -> Self::Output {
        Expr::term(self, rhs)
    }
}

impl std::ops::Mul<Expr> for f64 {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Self::Output {
        rhs * self
    }
}

impl std::ops::Mul<VariableId> for f64 {
    type Output = Expr;

    fn mul(self, rhs: VariableId) -> Self::Output {
        Expr::term(rhs, self)
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

impl std::ops::Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl std::ops::Neg for VariableId {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        Expr::term(self, -1.0)
    }
}

impl<T: Into<Expr>> std::ops::AddAssign<T> for Expr {
    fn add_assign(&mut self, rhs: T) {
        self.accumulate(rhs);
    }
}

impl<T: Into<Expr>> std::ops::SubAssign<T> for Expr {
    fn sub_assign(&mut self, rhs: T) {
        self.accumulate_scaled(&rhs.into(), -1.0);
    }
}

impl std::ops::MulAssign<f64> for Expr {
    fn mul_assign(&mut self, rhs: f64) {
        self.terms.scale_in_place(rhs);
    }
}

impl<T: Into<Expr>> std::iter::Sum<T> for Expr {
    fn sum<I: Iterator<Item = T>>(iter: I) -> Self {
        let mut acc = Expr::new();
        for item in iter {
            acc.accumulate(item);
        }
        acc
    }
}
