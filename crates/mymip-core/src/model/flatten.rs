//! Nested constraint groups and their flattening into named rows.

use std::collections::HashSet;

use mymip_expr::ConstraintExpr;

use super::error::ModelError;

/// A possibly nested collection of constraints.
///
/// - `Single`: one row, named after the enclosing prefix
/// - `Named`: an explicit name for everything inside
/// - `Keyed`: each entry named after its key, in insertion order
/// - `Sequence`: element `i` named `<prefix>_<i>`
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintGroup {
    Single(ConstraintExpr),
    Named(String, Box<ConstraintGroup>),
    Keyed(Vec<(String, ConstraintGroup)>),
    Sequence(Vec<ConstraintGroup>),
}

impl ConstraintGroup {
    pub fn named(name: impl Into<String>, group: impl Into<ConstraintGroup>) -> Self {
        ConstraintGroup::Named(name.into(), Box::new(group.into()))
    }

    pub fn keyed<K, G>(entries: impl IntoIterator<Item = (K, G)>) -> Self
    where
        K: ToString,
        G: Into<ConstraintGroup>,
    {
        ConstraintGroup::Keyed(
            entries
                .into_iter()
                .map(|(key, group)| (key.to_string(), group.into()))
                .collect(),
        )
    }

    /// Number of rows the group flattens to.
    pub fn len(&self) -> usize {
        match self {
            ConstraintGroup::Single(_) => 1,
            ConstraintGroup::Named(_, inner) => inner.len(),
            ConstraintGroup::Keyed(entries) => entries.iter().map(|(_, group)| group.len()).sum(),
            ConstraintGroup::Sequence(items) => items.iter().map(ConstraintGroup::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<ConstraintExpr> for ConstraintGroup {
    fn from(value: ConstraintExpr) -> Self {
        ConstraintGroup::Single(value)
    }
}

impl<T: Into<ConstraintGroup>> From<Vec<T>> for ConstraintGroup {
    fn from(value: Vec<T>) -> Self {
        ConstraintGroup::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ConstraintGroup>> FromIterator<T> for ConstraintGroup {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        ConstraintGroup::Sequence(iter.into_iter().map(Into::into).collect())
    }
}

/// A flattened row with its assigned name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedConstraint {
    pub name: String,
    pub constraint: ConstraintExpr,
}

/// Flatten `group` depth-first in input order, naming rows from `prefix`.
pub fn flatten(group: ConstraintGroup, prefix: &str) -> Result<Vec<NamedConstraint>, ModelError> {
    let mut out = Vec::with_capacity(group.len());
    walk(group, prefix.to_string(), &mut out)?;
    Ok(out)
}

fn walk(
    group: ConstraintGroup,
    name: String,
    out: &mut Vec<NamedConstraint>,
) -> Result<(), ModelError> {
    match group {
        ConstraintGroup::Single(constraint) => out.push(NamedConstraint { name, constraint }),
        ConstraintGroup::Named(inner_name, inner) => walk(*inner, inner_name, out)?,
        ConstraintGroup::Keyed(entries) => {
            let mut seen = HashSet::with_capacity(entries.len());
            for (key, inner) in entries {
                if !seen.insert(key.clone()) {
                    return Err(ModelError::DuplicateGroupKey(key));
                }
                walk(inner, key, out)?;
            }
        }
        ConstraintGroup::Sequence(items) => {
            for (idx, item) in items.into_iter().enumerate() {
                walk(item, format!("{name}_{idx}"), out)?;
            }
        }
    }
    Ok(())
}
