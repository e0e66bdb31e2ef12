//! Group membership and its memoized expansion.

use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::position::Position;

/// Inline capacity of the ordered expansion list. Most groups are a handful
/// of specials.
const INLINE_VALUES: usize = 8;

/// Every fixed value a group stands for: member values (nested groups
/// flattened, pattern codes included) and the group's own code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expansion {
    set: FxHashSet<i64>,
    list: SmallVec<[i64; INLINE_VALUES]>,
}

impl Expansion {
    /// Values as a hash set, for containment checks.
    #[must_use]
    pub fn set(&self) -> &FxHashSet<i64> {
        &self.set
    }

    /// Values in declaration order, members first and the group's own code
    /// last, without duplicates.
    #[must_use]
    pub fn list(&self) -> &[i64] {
        &self.list
    }

    /// Number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Is the expansion empty? Never true for a built group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

pub(crate) struct Group {
    value: i64,
    members: Vec<Arc<Position>>,
    /// Members whose coverage is not a fixed value set: patterns, functions,
    /// the unbound number and groups holding any of those.
    open: Vec<Arc<Position>>,
    expansion: OnceLock<Expansion>,
}

impl Group {
    pub(crate) fn new(value: i64, members: Vec<Arc<Position>>) -> Self {
        let open = members.iter().filter(|m| m.is_open()).cloned().collect();
        Self {
            value,
            members,
            open,
            expansion: OnceLock::new(),
        }
    }

    pub(crate) fn members(&self) -> &[Arc<Position>] {
        &self.members
    }

    /// Does any member cover values outside the expansion?
    pub(crate) fn is_open(&self) -> bool {
        !self.open.is_empty()
    }

    pub(crate) fn includes(&self, candidate: i64) -> bool {
        self.expansion().set().contains(&candidate)
            || self.open.iter().any(|member| member.includes_value(candidate))
    }

    /// Computed on first call, then served from the same storage.
    pub(crate) fn expansion(&self) -> &Expansion {
        self.expansion.get_or_init(|| {
            let mut set = FxHashSet::default();
            let mut list = SmallVec::new();
            let member_values = self
                .members
                .iter()
                .flat_map(|member| member.fixed_values());
            for &value in member_values.chain(std::iter::once(&self.value)) {
                if set.insert(value) {
                    list.push(value);
                }
            }
            Expansion { set, list }
        })
    }
}
