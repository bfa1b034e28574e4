//! Sparse coefficient accumulator shared by expressions and constraints.
//!
//! Variable entries are kept once inserted, even when their coefficient
//! cancels to zero: presence means "appears in the expression". A zero
//! constant is not reported by [`TermMap::items`].

use crate::ids::VariableId;
use std::collections::BTreeMap;

/// Key of a [`TermMap`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TermKey {
    Constant,
    Variable(VariableId),
}

impl From<VariableId> for TermKey {
    fn from(value: VariableId) -> Self {
        TermKey::Variable(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermMap {
    constant: f64,
    coefficients: BTreeMap<VariableId, f64>,
}

impl TermMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_constant(constant: f64) -> Self {
        Self {
            constant,
            coefficients: BTreeMap::new(),
        }
    }

    /// Coefficient stored under `key`, or 0 when absent.
    pub fn get(&self, key: impl Into<TermKey>) -> f64 {
        match key.into() {
            TermKey::Constant => self.constant,
            TermKey::Variable(var) => self.coefficients.get(&var).copied().unwrap_or(0.0),
        }
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn coefficient(&self, var: VariableId) -> f64 {
        self.get(var)
    }

    pub fn contains(&self, var: VariableId) -> bool {
        self.coefficients.contains_key(&var)
    }

    /// Number of variable entries (the constant is not counted).
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Ordered `(key, coefficient)` pairs: the constant first (when nonzero),
    /// then variables by increasing id.
    pub fn items(&self) -> impl Iterator<Item = (TermKey, f64)> + '_ {
        let constant = (self.constant != 0.0).then_some((TermKey::Constant, self.constant));
        constant.into_iter().chain(
            self.coefficients
                .iter()
                .map(|(var, coeff)| (TermKey::Variable(*var), *coeff)),
        )
    }

    /// Variable entries by increasing id.
    pub fn variables(&self) -> impl Iterator<Item = (VariableId, f64)> + '_ {
        self.coefficients.iter().map(|(var, coeff)| (*var, *coeff))
    }

    pub fn add_term(&mut self, var: VariableId, coeff: f64) {
        *self.coefficients.entry(var).or_insert(0.0) += coeff;
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Overwrite the coefficient of `var`, inserting it if missing.
    pub fn set_term(&mut self, var: VariableId, coeff: f64) {
        self.coefficients.insert(var, coeff);
    }

    /// Accumulate `factor * other` into `self`.
    pub fn merge_scaled(&mut self, other: &TermMap, factor: f64) {
        self.constant += factor * other.constant;
        for (var, coeff) in &other.coefficients {
            self.add_term(*var, factor * coeff);
        }
    }

    pub fn merge(&mut self, other: &TermMap) {
        self.merge_scaled(other, 1.0);
    }

    /// Accumulate an owned map, reusing its allocation when `self` is empty.
    pub fn merge_owned(&mut self, other: TermMap) {
        if self.coefficients.is_empty() {
            self.constant += other.constant;
            self.coefficients = other.coefficients;
            return;
        }
        self.constant += other.constant;
        for (var, coeff) in other.coefficients {
            self.add_term(var, coeff);
        }
    }

    pub fn scale_in_place(&mut self, factor: f64) {
        self.constant *= factor;
        for coeff in self.coefficients.values_mut() {
            *coeff *= factor;
        }
    }

    /// Remove and return the constant term.
    pub fn take_constant(&mut self) -> f64 {
        std::mem::take(&mut self.constant)
    }

    /// Evaluate the variable part against dense values indexed by variable id.
    /// Missing values count as zero.
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .map(|(var, coeff)| coeff * values.get(var.index()).copied().unwrap_or(0.0))
            .sum()
    }
}
