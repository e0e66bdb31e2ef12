//! Position types.
//!
//! ## Variants
//!
//! - **Number** (primitive): every positive integer. Unbound until a lookup
//!   binds it to one value.
//! - **Special** (primitive): a named constant, usually zero or negative.
//! - **Group** (complex): a code plus member positions; covers all of them.
//! - **Pattern** (complex): a code plus a predicate over number values.
//! - **Function** (complex): caller-defined predicate, lowest priority.
//!
//! Primitives sort; complex positions refuse to.

mod group;
mod keyword;
mod position;
mod rule;

pub use group::Expansion;
pub use keyword::Keyword;
pub use position::Position;
pub use rule::{PatternRule, Predicate, PredicateTable};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::NotSortableError;

/// Largest storable position (smallint limit). Declarations use it to sort
/// something last.
pub const MAX_VALUE: i64 = 32767;

/// Position variant tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Number,
    Special,
    Group,
    Pattern,
    Function,
}

impl Kind {
    /// Level of the abstract base, below every concrete variant.
    pub const BASE_LEVEL: u8 = 10;

    /// Generation priority, ascending from most concrete.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Kind::Number | Kind::Special => 0,
            Kind::Group => 1,
            Kind::Pattern => 2,
            Kind::Function => 3,
        }
    }

    /// Number and special are primitives; everything else is complex.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        matches!(self, Kind::Number | Kind::Special)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Number => "number",
            Kind::Special => "special",
            Kind::Group => "group",
            Kind::Pattern => "pattern",
            Kind::Function => "function",
        };
        f.write_str(name)
    }
}

/// Anything a membership test can be asked about: raw integers or positions.
pub trait Candidate {
    /// The raw value, `None` when there is nothing to compare.
    fn raw_value(&self) -> Option<i64>;
}

impl Candidate for i64 {
    fn raw_value(&self) -> Option<i64> {
        Some(*self)
    }
}

impl Candidate for i32 {
    fn raw_value(&self) -> Option<i64> {
        Some(i64::from(*self))
    }
}

impl Candidate for Option<i64> {
    fn raw_value(&self) -> Option<i64> {
        *self
    }
}

impl Candidate for Position {
    fn raw_value(&self) -> Option<i64> {
        self.value()
    }
}

impl Candidate for Arc<Position> {
    fn raw_value(&self) -> Option<i64> {
        self.value()
    }
}

impl<T: Candidate + ?Sized> Candidate for &T {
    fn raw_value(&self) -> Option<i64> {
        (**self).raw_value()
    }
}

/// Sort primitive positions by sort index, ties broken by value.
///
/// Fails without reordering if any position is complex.
pub fn sort_positions(positions: &mut [Arc<Position>]) -> Result<(), NotSortableError> {
    let mut keyed = positions
        .iter()
        .map(|p| Ok(((p.sort_index()?, p.value()), Arc::clone(p))))
        .collect::<Result<Vec<_>, NotSortableError>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    for (slot, (_, position)) in positions.iter_mut().zip(keyed) {
        *slot = position;
    }
    Ok(())
}
