//! Per-keyword predicates, built once when a registry is configured.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::config::PositionsConfig;
use crate::types::{Keyword, Position};

/// How an accessor decides whether a stored value belongs to its position.
#[derive(Clone, Debug)]
pub enum MembershipTest {
    /// Specials: one value.
    Exact(i64),

    /// The number position: any positive value, or one given number.
    Number,

    /// Small groups: linear scan of the expanded values.
    Scan(SmallVec<[i64; 8]>),

    /// Large groups: the group's memoized hash set.
    HashSet(Arc<Position>),

    /// Patterns, functions and groups with open members: ask the position.
    Delegate(Arc<Position>),
}

impl MembershipTest {
    fn for_position(position: &Arc<Position>, scan_threshold: usize) -> Self {
        if position.is_number() {
            return Self::Number;
        }
        if let Some(expansion) = position.expansion().filter(|_| !position.is_open()) {
            return if expansion.len() > scan_threshold {
                Self::HashSet(Arc::clone(position))
            } else {
                Self::Scan(SmallVec::from_slice(expansion.list()))
            };
        }
        match (position.is_primitive(), position.value()) {
            (true, Some(value)) => Self::Exact(value),
            _ => Self::Delegate(Arc::clone(position)),
        }
    }

    /// `number` only narrows the number test; other tests ignore it.
    #[must_use]
    pub fn matches(&self, stored: i64, number: Option<i64>) -> bool {
        match self {
            Self::Exact(value) => stored == *value,
            Self::Number => stored > 0 && number.is_none_or(|n| n == stored),
            Self::Scan(values) => values.contains(&stored),
            Self::HashSet(group) => group
                .expanded_values()
                .is_some_and(|values| values.contains(&stored)),
            Self::Delegate(position) => position.includes_value(stored),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Exact(_) => "exact",
            Self::Number => "number",
            Self::Scan(_) => "scan",
            Self::HashSet(_) => "hash-set",
            Self::Delegate(_) => "delegate",
        }
    }
}

/// Predicate for one declared position.
#[derive(Clone, Debug)]
pub struct Accessor {
    position: Arc<Position>,
    test: MembershipTest,
}

impl Accessor {
    /// Keyword of the accessor's position.
    #[must_use]
    pub fn keyword(&self) -> &Keyword {
        self.position.keyword()
    }

    /// The position this accessor tests for.
    #[must_use]
    pub fn position(&self) -> &Arc<Position> {
        &self.position
    }

    /// Generation priority of the position's variant.
    #[must_use]
    pub fn level(&self) -> u8 {
        self.position.level()
    }

    /// Strategy chosen for this position.
    #[must_use]
    pub fn test(&self) -> &MembershipTest {
        &self.test
    }

    /// Does the stored value belong to this position? Unset never does.
    #[must_use]
    pub fn check(&self, stored: Option<i64>) -> bool {
        self.check_number(stored, None)
    }

    /// Like [`check`](Self::check); for the number accessor, `number`
    /// additionally pins the value.
    #[must_use]
    pub fn check_number(&self, stored: Option<i64>, number: Option<i64>) -> bool {
        stored.is_some_and(|value| self.test.matches(value, number))
    }
}

/// The accessor table of a registry.
#[derive(Clone, Debug, Default)]
pub struct Accessors {
    entries: Vec<Accessor>,
    by_keyword: FxHashMap<Keyword, usize>,
}

impl Accessors {
    pub(crate) fn build<'a>(
        positions: impl IntoIterator<Item = &'a Arc<Position>>,
        config: &PositionsConfig,
    ) -> Self {
        let mut accessors = Self::default();
        for position in positions {
            let test = MembershipTest::for_position(position, config.scan_threshold);
            tracing::debug!(
                keyword = %position.keyword(),
                strategy = test.label(),
                "generated position accessor"
            );
            accessors
                .by_keyword
                .insert(position.keyword().clone(), accessors.entries.len());
            accessors.entries.push(Accessor {
                position: Arc::clone(position),
                test,
            });
        }
        accessors
    }

    /// Accessor for a normalized keyword.
    #[must_use]
    pub fn get(&self, keyword: &str) -> Option<&Accessor> {
        self.by_keyword.get(keyword).map(|&i| &self.entries[i])
    }

    /// Accessors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Accessor> {
        self.entries.iter()
    }

    /// Accessors from most concrete to most abstract; declaration order
    /// within a level.
    #[must_use]
    pub fn by_level(&self) -> Vec<&Accessor> {
        let mut ordered: Vec<_> = self.entries.iter().collect();
        ordered.sort_by_key(|accessor| accessor.level());
        ordered
    }

    /// Every accessor whose predicate holds for the stored value.
    pub fn matching(&self, stored: Option<i64>) -> impl Iterator<Item = &Accessor> {
        self.entries.iter().filter(move |accessor| accessor.check(stored))
    }

    /// Number of accessors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the table empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
