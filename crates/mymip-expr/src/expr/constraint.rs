//! Constraint expressions: normalized `lhs - rhs` with comparison sense and RHS.

use crate::expr::core::Expr;
use crate::expr::terms::TermMap;
use crate::ids::VariableId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl ComparisonSense {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonSense::LessEqual => "le",
            ComparisonSense::GreaterEqual => "ge",
            ComparisonSense::Equal => "eq",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonSense::LessEqual => "<=",
            ComparisonSense::GreaterEqual => ">=",
            ComparisonSense::Equal => "==",
        }
    }

    /// Single-letter row sense code (`L`, `G`, `E`).
    pub fn code(self) -> char {
        match self {
            ComparisonSense::LessEqual => 'L',
            ComparisonSense::GreaterEqual => 'G',
            ComparisonSense::Equal => 'E',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'L' => Some(ComparisonSense::LessEqual),
            'G' => Some(ComparisonSense::GreaterEqual),
            'E' => Some(ComparisonSense::Equal),
            _ => None,
        }
    }

    /// Whether `activity` satisfies `activity <sense> rhs` within `tolerance`.
    pub fn holds(self, activity: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            ComparisonSense::LessEqual => activity <= rhs + tolerance,
            ComparisonSense::GreaterEqual => activity >= rhs - tolerance,
            ComparisonSense::Equal => (activity - rhs).abs() <= tolerance,
        }
    }
}

impl std::fmt::Display for ComparisonSense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A linear row `terms <sense> rhs`.
///
/// The stored terms never carry a constant: it is folded into `rhs` when the
/// constraint is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintExpr {
    terms: TermMap,
    sense: ComparisonSense,
    rhs: f64,
}

impl ConstraintExpr {
    /// Build `lhs - rhs <sense> 0` and move the constant to the right-hand side.
    pub fn compare(
        lhs: impl Into<Expr>,
        sense: ComparisonSense,
        rhs: impl Into<Expr>,
    ) -> Self {
        let mut normalized = lhs.into();
        normalized.accumulate_scaled(&rhs.into(), -1.0);
        let mut terms = normalized.into_terms();
        let constant = terms.take_constant();
        Self {
            terms,
            sense,
            rhs: -constant,
        }
    }

    /// Row from an expression compared against a scalar.
    pub fn new(expr: Expr, sense: ComparisonSense, rhs: f64) -> Self {
        Self::compare(expr, sense, rhs)
    }

    pub fn terms(&self) -> &TermMap {
        &self.terms
    }

    pub fn coefficient(&self, var: VariableId) -> f64 {
        self.terms.coefficient(var)
    }

    pub fn sense(&self) -> ComparisonSense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    pub fn into_parts(self) -> (TermMap, ComparisonSense, f64) {
        (self.terms, self.sense, self.rhs)
    }
}
