//! Query conditions for stored positions.
//!
//! A key expands to the set of raw values it stands for: a special to its
//! value, a group to its expanded values, the unbound number to "any
//! positive value". Storage layers turn the [`Condition`] into their own
//! query language; [`Condition::render`] shows the SQL shape for debugging.

use std::fmt::Write as _;
use serde::{Deserialize, Serialize};

use crate::error::InvalidKeyError;
use crate::registry::{Collection, PositionKey, Positions, Resolved};
use crate::types::Position;

/// Filter over a stored position column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// column = value
    Eq(i64),

    /// column IN (values)
    In(Vec<i64>),

    /// column > 0
    Positive,

    /// column IS NOT NULL
    Present,

    /// Any of the conditions.
    Any(Vec<Condition>),
}

impl Condition {
    /// Condition for one position.
    ///
    /// Patterns and functions have no fixed value set; they expand to their
    /// own stored code.
    #[must_use]
    pub fn for_position(position: &Position) -> Self {
        if let Some(values) = position.expanded_list() {
            return Self::In(values.to_vec());
        }
        match position.value() {
            Some(value) => Self::Eq(value),
            None => Self::Positive,
        }
    }

    /// Condition for every member of a collection. `None` when no slot
    /// resolved.
    #[must_use]
    pub fn for_collection(collection: &Collection) -> Option<Self> {
        let mut values = Vec::new();
        let mut positive = false;
        for position in collection.iter() {
            match Self::for_position(position) {
                Self::Eq(value) => values.push(value),
                Self::In(expanded) => values.extend(expanded),
                _ => positive = true,
            }
        }
        let mut seen = rustc_hash::FxHashSet::default();
        values.retain(|value| seen.insert(*value));

        match (values.is_empty(), positive) {
            (true, false) => None,
            (true, true) => Some(Self::Positive),
            (false, false) => Some(Self::In(values)),
            (false, true) => Some(Self::Any(vec![Self::In(values), Self::Positive])),
        }
    }

    /// Would a row with this stored value pass?
    #[must_use]
    pub fn matches(&self, stored: Option<i64>) -> bool {
        let Some(value) = stored else {
            return false;
        };
        match self {
            Self::Eq(expected) => value == *expected,
            Self::In(values) => values.contains(&value),
            Self::Positive => value > 0,
            Self::Present => true,
            Self::Any(conditions) => conditions.iter().any(|c| c.matches(stored)),
        }
    }

    /// SQL-shaped text, e.g. `position IN (-1, -2, -100)`.
    #[must_use]
    pub fn render(&self, column: &str) -> String {
        match self {
            Self::Eq(value) => format!("{column} = {value}"),
            Self::In(values) => {
                let mut out = format!("{column} IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{value}");
                }
                out.push(')');
                out
            }
            Self::Positive => format!("{column} > 0"),
            Self::Present => format!("{column} IS NOT NULL"),
            Self::Any(conditions) => {
                let parts: Vec<_> = conditions.iter().map(|c| c.render(column)).collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }
}

impl Positions {
    /// Expand a key into a condition on the stored column.
    ///
    /// `None` when the key resolves to nothing.
    pub fn condition(&self, key: impl Into<PositionKey>) -> Result<Option<Condition>, InvalidKeyError> {
        Ok(match self.lookup(key)? {
            None => None,
            Some(Resolved::Position(position)) => Some(Condition::for_position(&position)),
            Some(Resolved::Collection(collection)) => Condition::for_collection(&collection),
        })
    }
}
