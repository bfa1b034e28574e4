//! Column attributes shared by the model layer and backends.

use serde::Serialize;

/// Variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VarKind {
    #[default]
    Continuous,
    Integer,
    /// Zero, or continuous within its bounds.
    SemiContinuous,
    /// Zero, or integral within its bounds.
    SemiInteger,
}

impl VarKind {
    pub fn is_continuous(self) -> bool {
        matches!(self, VarKind::Continuous)
    }

    /// Single-letter column type code (`C`, `I`, `S`, `N`).
    pub fn code(self) -> char {
        match self {
            VarKind::Continuous => 'C',
            VarKind::Integer => 'I',
            VarKind::SemiContinuous => 'S',
            VarKind::SemiInteger => 'N',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'C' => Some(VarKind::Continuous),
            'I' | 'B' => Some(VarKind::Integer),
            'S' => Some(VarKind::SemiContinuous),
            'N' => Some(VarKind::SemiInteger),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Continuous => "continuous",
            VarKind::Integer => "integer",
            VarKind::SemiContinuous => "semi_continuous",
            VarKind::SemiInteger => "semi_integer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

impl ObjectiveSense {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectiveSense::Minimize => "minimize",
            ObjectiveSense::Maximize => "maximize",
        }
    }
}

/// Which side of a column's bounds an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundKind {
    Lower,
    Upper,
    Both,
}
