use mymip_expr::{ComparisonSense, ConstraintId, TermMap};
use mymip_solver::{ObjectiveSense, VarKind};

/// Lifecycle of a [`crate::Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    /// Declarations are staged in memory.
    #[default]
    Building,
    /// Arrays are loaded into the backend; edits are applied incrementally.
    Materialized,
    /// Materialized and a solve has completed since the last edit.
    Solved,
}

impl ModelState {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelState::Building => "building",
            ModelState::Materialized => "materialized",
            ModelState::Solved => "solved",
        }
    }

    pub fn is_materialized(self) -> bool {
        !matches!(self, ModelState::Building)
    }
}

/// A decision variable as cached by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRecord {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub kind: VarKind,
    /// Primal value of the last solve.
    pub value: Option<f64>,
    /// Reduced cost of the last LP solve.
    pub reduced_cost: Option<f64>,
}

impl VariableRecord {
    pub fn new(name: String, lower: f64, upper: f64, kind: VarKind) -> Self {
        Self {
            name,
            lower,
            upper,
            kind,
            value: None,
            reduced_cost: None,
        }
    }
}

/// A row as cached by the model.
///
/// Staged rows own their coefficients. Once the model is materialized the
/// coefficients live only in the backend and `terms` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintRecord {
    pub id: ConstraintId,
    pub name: String,
    pub sense: ComparisonSense,
    pub rhs: f64,
    pub(crate) terms: Option<TermMap>,
    /// Dual value of the last LP solve.
    pub dual: Option<f64>,
    /// `rhs - activity` at the last solve.
    pub slack: Option<f64>,
}

impl ConstraintRecord {
    pub fn terms(&self) -> Option<&TermMap> {
        self.terms.as_ref()
    }
}

/// Objective sense plus dense coefficients indexed by variable id.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub sense: ObjectiveSense,
    pub coefficients: Vec<f64>,
}

/// Kind preset with optional bounds, applied with [`crate::Model::apply_type`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableType {
    pub kind: VarKind,
    pub bounds: Option<(f64, f64)>,
}

impl VariableType {
    /// Integer in `[0, 1]`.
    pub fn zero_one() -> Self {
        Self {
            kind: VarKind::Integer,
            bounds: Some((0.0, 1.0)),
        }
    }

    pub fn integer() -> Self {
        Self::of(VarKind::Integer)
    }

    pub fn continuous() -> Self {
        Self::of(VarKind::Continuous)
    }

    pub fn semi_continuous() -> Self {
        Self::of(VarKind::SemiContinuous)
    }

    pub fn semi_integer() -> Self {
        Self::of(VarKind::SemiInteger)
    }

    /// A kind change that leaves bounds untouched.
    pub fn of(kind: VarKind) -> Self {
        Self { kind, bounds: None }
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.bounds = Some((lower, upper));
        self
    }
}
