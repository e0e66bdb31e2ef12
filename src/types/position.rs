//! The position descriptor.
//!
//! A `Position` gives meaning to a raw integer. All variants share one
//! struct so the registry can hand out `Arc<Position>` uniformly; the
//! variant-specific part lives in a private enum.
//!
//! Derived text (keyword, short name, titleized name) is computed on first
//! access and cached. Positions never change after construction, so the
//! caches stay valid; a bound number is a new instance with its own caches.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use rustc_hash::FxHashSet;

use super::group::{Expansion, Group};
use super::keyword::Keyword;
use super::rule::{PatternRule, Predicate, PredicateTable};
use super::{Candidate, Kind};
use crate::error::{ConfigurationError, NotSortableError};

/// A capital followed by non-capitals; collapses to the capital.
fn capital_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("([A-Z])[^A-Z]+").expect("capital run regex must compile"))
}

enum Variant {
    Number { owner: Arc<str>, title: Arc<str> },
    Special,
    Group(Group),
    Pattern { rule: Option<PatternRule>, predicate: Predicate },
    Function { predicate: Predicate },
}

/// A resolved position.
///
/// Equality and hashing use the value only: two positions with the same
/// integer are interchangeable.
pub struct Position {
    value: Option<i64>,
    name: String,
    sort_index: Option<i64>,
    variant: Variant,
    keyword: OnceLock<Keyword>,
    short_name: OnceLock<String>,
    titleized: OnceLock<String>,
}

impl Position {
    fn with_variant(value: Option<i64>, name: String, variant: Variant) -> Self {
        Self {
            value,
            name,
            sort_index: None,
            variant,
            keyword: OnceLock::new(),
            short_name: OnceLock::new(),
            titleized: OnceLock::new(),
        }
    }

    /// The unbound number position for an owner type.
    ///
    /// `title` prefixes titleized bound numbers ("Page 3").
    pub fn number(owner: &str, title: &str) -> Self {
        Self::with_variant(
            None,
            owner.to_string(),
            Variant::Number {
                owner: Arc::from(owner),
                title: Arc::from(title),
            },
        )
    }

    /// A named constant.
    ///
    /// ```
    /// use positionable::Position;
    ///
    /// let ceo = Position::special(-1, "CEO");
    /// assert_eq!(ceo.keyword().as_str(), "ceo");
    /// assert_eq!(ceo.sort_index(), Ok(-1));
    /// ```
    pub fn special(value: i64, name: impl Into<String>) -> Self {
        Self::with_variant(Some(value), name.into(), Variant::Special)
    }

    /// Override the sort index of a primitive position (builder pattern).
    ///
    /// Complex positions stay unsortable whatever is set here.
    #[must_use]
    pub fn with_sort_index(mut self, sort_index: i64) -> Self {
        self.sort_index = Some(sort_index);
        self
    }

    /// An aggregate of already resolved positions.
    ///
    /// Any variant can be a member. Fixed member values are expanded up
    /// front; patterns, functions and the unbound number are asked per
    /// candidate.
    pub fn group(value: i64, name: impl Into<String>, members: Vec<Arc<Position>>) -> Self {
        Self::with_variant(
            Some(value),
            name.into(),
            Variant::Group(Group::new(value, members)),
        )
    }

    /// A predicate-defined range, compiled from a rule.
    pub fn pattern(
        value: i64,
        name: impl Into<String>,
        rule: PatternRule,
        predicates: &PredicateTable,
    ) -> Result<Self, ConfigurationError> {
        let predicate = rule.compile(predicates)?;
        Ok(Self::with_variant(
            Some(value),
            name.into(),
            Variant::Pattern {
                rule: Some(rule),
                predicate,
            },
        ))
    }

    /// A predicate-defined range from a closure.
    pub fn pattern_fn(
        value: i64,
        name: impl Into<String>,
        predicate: impl Fn(i64) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::with_variant(
            Some(value),
            name.into(),
            Variant::Pattern {
                rule: None,
                predicate: Arc::new(predicate),
            },
        )
    }

    /// A caller-defined complex position. Its predicate sees every candidate,
    /// including non-number values.
    pub fn function(
        value: i64,
        name: impl Into<String>,
        predicate: impl Fn(i64) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::with_variant(
            Some(value),
            name.into(),
            Variant::Function {
                predicate: Arc::new(predicate),
            },
        )
    }

    // === Identity ===

    /// Variant tag.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self.variant {
            Variant::Number { .. } => Kind::Number,
            Variant::Special => Kind::Special,
            Variant::Group(_) => Kind::Group,
            Variant::Pattern { .. } => Kind::Pattern,
            Variant::Function { .. } => Kind::Function,
        }
    }

    /// Generation priority of the variant.
    #[must_use]
    pub fn level(&self) -> u8 {
        self.kind().level()
    }

    /// Number or special.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.kind().is_primitive()
    }

    /// Group, pattern or function.
    #[must_use]
    pub fn is_complex(&self) -> bool {
        !self.is_primitive()
    }

    /// Is this the number position, bound or not?
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self.variant, Variant::Number { .. })
    }

    /// A number carrying a specific value.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.is_number() && self.value.is_some()
    }

    /// Raw value. `None` only for the unbound number.
    #[must_use]
    pub fn value(&self) -> Option<i64> {
        self.value
    }

    /// Raw value, 0 for the unbound number.
    #[must_use]
    pub fn to_integer(&self) -> i64 {
        self.value.unwrap_or(0)
    }

    // === Names ===

    /// Declared name. Bound numbers are named "{Owner} {n}".
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized name. Always `number` for number positions.
    pub fn keyword(&self) -> &Keyword {
        self.keyword.get_or_init(|| match self.variant {
            Variant::Number { .. } => Keyword::number(),
            _ => Keyword::new(&self.name),
        })
    }

    /// Compact name, not necessarily unique ("Executive Team" -> "ET").
    pub fn short_name(&self) -> &str {
        self.short_name.get_or_init(|| match self.variant {
            Variant::Number { .. } => self.value.map(|v| v.to_string()).unwrap_or_default(),
            _ => capital_run_re().replace_all(&self.name, "$1").into_owned(),
        })
    }

    /// Name for prose ("The CEO", "Page 3").
    pub fn titleized(&self) -> &str {
        self.titleized.get_or_init(|| match (&self.variant, self.value) {
            (Variant::Number { title, .. }, Some(v)) => format!("{title} {v}"),
            (Variant::Number { title, .. }, None) => title.to_string(),
            _ => format!("The {}", self.name),
        })
    }

    // === Ordering ===

    /// Sort key. Primitives only.
    pub fn sort_index(&self) -> Result<i64, NotSortableError> {
        match (&self.variant, self.sort_index.or(self.value)) {
            (Variant::Number { .. } | Variant::Special, Some(index)) => Ok(index),
            _ => Err(NotSortableError {
                keyword: self.keyword().clone(),
                kind: self.kind(),
            }),
        }
    }

    /// Compare by sort index, ties broken by value.
    pub fn compare(&self, other: &Position) -> Result<Ordering, NotSortableError> {
        let ours = (self.sort_index()?, self.value);
        let theirs = (other.sort_index()?, other.value);
        Ok(ours.cmp(&theirs))
    }

    // === Numbers ===

    /// Bind the number position to a specific value.
    ///
    /// Returns a new instance; `self` is untouched. `None` for non-number
    /// positions.
    ///
    /// ```
    /// use positionable::Position;
    ///
    /// let number = Position::number("Employee", "Page");
    /// let three = number.bind(3).unwrap();
    /// assert_eq!(three.value(), Some(3));
    /// assert_eq!(three.name(), "Employee 3");
    /// assert!(three.includes(3));
    /// assert!(!three.includes(4));
    /// assert!(number.includes(4));
    /// ```
    #[must_use]
    pub fn bind(&self, n: i64) -> Option<Arc<Position>> {
        let Variant::Number { owner, title } = &self.variant else {
            return None;
        };
        Some(Arc::new(Self::with_variant(
            Some(n),
            format!("{owner} {n}"),
            Variant::Number {
                owner: owner.clone(),
                title: title.clone(),
            },
        )))
    }

    // === Membership ===

    /// Does this position cover `candidate`?
    ///
    /// - number: unbound covers every positive value, bound only its own.
    /// - special: its own value.
    /// - group: its own value, or anything a member covers.
    /// - pattern: its own value, or a positive value matching the rule.
    /// - function: whatever the predicate says.
    pub fn includes(&self, candidate: impl Candidate) -> bool {
        candidate
            .raw_value()
            .is_some_and(|value| self.includes_value(value))
    }

    pub(crate) fn includes_value(&self, candidate: i64) -> bool {
        match &self.variant {
            Variant::Number { .. } => match self.value {
                None => candidate > 0,
                Some(value) => value == candidate,
            },
            Variant::Special => self.value == Some(candidate),
            Variant::Group(group) => group.includes(candidate),
            Variant::Pattern { predicate, .. } => {
                self.value == Some(candidate) || (candidate > 0 && predicate(candidate))
            }
            Variant::Function { predicate } => predicate(candidate),
        }
    }

    // === Groups ===

    /// Group members in declaration order. Empty for other variants.
    #[must_use]
    pub fn members(&self) -> &[Arc<Position>] {
        match &self.variant {
            Variant::Group(group) => group.members(),
            _ => &[],
        }
    }

    /// The group's memoized expansion.
    #[must_use]
    pub fn expansion(&self) -> Option<&Expansion> {
        match &self.variant {
            Variant::Group(group) => Some(group.expansion()),
            _ => None,
        }
    }

    /// Every fixed value a group stands for, itself included. Groups with
    /// open members cover more than this; see [`is_open`](Self::is_open).
    #[must_use]
    pub fn expanded_values(&self) -> Option<&FxHashSet<i64>> {
        self.expansion().map(Expansion::set)
    }

    /// Expanded values in declaration order, the group's own code last.
    #[must_use]
    pub fn expanded_list(&self) -> Option<&[i64]> {
        self.expansion().map(Expansion::list)
    }

    /// Is membership more than a fixed value set? True for patterns,
    /// functions, the unbound number and groups containing any of them.
    #[must_use]
    pub fn is_open(&self) -> bool {
        match &self.variant {
            Variant::Number { .. } => self.value.is_none(),
            Variant::Special => false,
            Variant::Group(group) => group.is_open(),
            Variant::Pattern { .. } | Variant::Function { .. } => true,
        }
    }

    /// Values this position contributes to a group expansion. A pattern
    /// always covers its own code; a function only if its predicate says so.
    pub(crate) fn fixed_values(&self) -> &[i64] {
        match &self.variant {
            Variant::Number { .. } | Variant::Special | Variant::Pattern { .. } => match &self.value {
                Some(value) => std::slice::from_ref(value),
                None => &[],
            },
            Variant::Group(group) => group.expansion().list(),
            Variant::Function { .. } => &[],
        }
    }

    /// Rule a pattern was declared with, if it came from one.
    #[must_use]
    pub fn rule(&self) -> Option<&PatternRule> {
        match &self.variant {
            Variant::Pattern { rule, .. } => rule.as_ref(),
            _ => None,
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("kind", &self.kind())
            .field("value", &self.value)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Position {}

impl PartialEq<i64> for Position {
    fn eq(&self, other: &i64) -> bool {
        self.value == Some(*other)
    }
}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executive_team() -> Position {
        let members = vec![
            Arc::new(Position::special(-1, "CEO")),
            Arc::new(Position::special(-2, "CTO")),
            Arc::new(Position::special(-3, "CFO")),
        ];
        Position::group(-100, "Executive Team", members)
    }

    #[test]
    fn test_equality_by_value() {
        let a = Position::special(-1, "CEO");
        let b = Position::special(-1, "Chief");
        assert_eq!(a, b);
        assert_eq!(a, -1);
        assert_ne!(a, Position::special(-2, "CEO"));

        let mut set = rustc_hash::FxHashSet::default();
        set.insert(Arc::new(a));
        assert!(set.contains(&Arc::new(b)));
    }

    #[test]
    fn test_derived_names() {
        let team = executive_team();
        assert_eq!(team.keyword().as_str(), "executive_team");
        assert_eq!(team.short_name(), "ET");
        assert_eq!(team.titleized(), "The Executive Team");

        let vp = Position::special(-4, "VP Corporate Development");
        assert_eq!(vp.short_name(), "VPCD");
        assert_eq!(Position::special(-1, "CEO").short_name(), "CEO");
    }

    #[test]
    fn test_derived_names_are_cached() {
        let ceo = Position::special(-1, "CEO");
        assert!(std::ptr::eq(ceo.keyword(), ceo.keyword()));
        assert!(std::ptr::eq(ceo.titleized(), ceo.titleized()));
    }

    #[test]
    fn test_number_names() {
        let number = Position::number("Employee", "Page");
        assert_eq!(number.keyword().as_str(), "number");
        assert_eq!(number.name(), "Employee");
        assert_eq!(number.short_name(), "");

        let eight = number.bind(8).unwrap();
        assert_eq!(eight.keyword().as_str(), "number");
        assert_eq!(eight.name(), "Employee 8");
        assert_eq!(eight.short_name(), "8");
        assert_eq!(eight.titleized(), "Page 8");
    }

    #[test]
    fn test_bind_leaves_original_unbound() {
        let number = Position::number("Employee", "Page");
        let three = number.bind(3).unwrap();
        let four = number.bind(4).unwrap();

        assert_eq!(number.value(), None);
        assert!(!number.is_bound());
        assert!(three.is_bound());
        assert_eq!(three.value(), Some(3));
        assert_eq!(four.value(), Some(4));
        assert!(Position::special(-1, "CEO").bind(3).is_none());
    }

    #[test]
    fn test_number_includes() {
        let number = Position::number("Employee", "Page");
        for (candidate, expected) in [(3, true), (0, false), (1_003_434, true), (-1, false)] {
            assert_eq!(number.includes(candidate), expected, "unbound {candidate}");
        }

        let eight = number.bind(8).unwrap();
        for (candidate, expected) in [(8, true), (0, false), (1_003_434, false), (-1, false)] {
            assert_eq!(eight.includes(candidate), expected, "bound {candidate}");
        }
    }

    #[test]
    fn test_special_includes() {
        let ceo = Position::special(-1, "CEO");
        assert!(ceo.includes(-1));
        assert!(!ceo.includes(-2));
        assert!(ceo.includes(&Position::special(-1, "Other")));
        assert!(!ceo.includes(&Position::number("Employee", "Page")));
    }

    #[test]
    fn test_group_expansion() {
        let team = executive_team();
        let mut values: Vec<_> = team.expanded_values().unwrap().iter().copied().collect();
        values.sort_unstable();
        assert_eq!(values, vec![-100, -3, -2, -1]);
        assert_eq!(team.expanded_list(), Some(&[-1, -2, -3, -100][..]));

        assert!(team.includes(-1));
        assert!(team.includes(-100));
        assert!(!team.includes(-4));
        assert!(!team.includes(3));

        let names: Vec<_> = team.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["CEO", "CTO", "CFO"]);
    }

    #[test]
    fn test_group_expansion_is_memoized() {
        let team = executive_team();
        let first = team.expanded_values().unwrap();
        let second = team.expanded_values().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_nested_group() {
        let team = Arc::new(executive_team());
        let vp = Arc::new(Position::special(-4, "VP Marketing"));
        let staff = Position::group(-101, "Staff", vec![team, vp]);

        assert_eq!(staff.expansion().unwrap().list(), &[-1, -2, -3, -100, -4, -101]);
        assert!(staff.includes(-2));
    }

    #[test]
    fn test_group_over_pattern() {
        let ceo = Arc::new(Position::special(-1, "CEO"));
        let odd = Arc::new(Position::pattern_fn(-200, "Odd", |v| v % 2 != 0));
        let mixed = Position::group(-300, "Mixed", vec![ceo, odd]);

        assert!(mixed.is_open());
        assert_eq!(mixed.expanded_list(), Some(&[-1, -200, -300][..]));
        for (candidate, expected) in [(-1, true), (-200, true), (-300, true), (7, true), (4, false), (-3, false)] {
            assert_eq!(mixed.includes(candidate), expected, "mixed includes {candidate}");
        }
    }

    #[test]
    fn test_group_over_number_and_function() {
        let number = Arc::new(Position::number("Employee", "Page"));
        let basement = Arc::new(Position::function(-400, "Basement", |v| (-19..=-11).contains(&v)));
        let group = Position::group(-100, "Anyone", vec![Arc::clone(&number), basement]);

        assert!(group.is_open());
        assert_eq!(group.expanded_list(), Some(&[-100][..]));
        assert!(group.includes(5));
        assert!(group.includes(-11));
        assert!(!group.includes(-400));
        assert!(!group.includes(0));

        let fifth = Position::group(-101, "Fifth", vec![number.bind(5).unwrap()]);
        assert!(!fifth.is_open());
        assert!(fifth.includes(5));
        assert!(!fifth.includes(6));
    }

    #[test]
    fn test_nested_open_group() {
        let odd = Arc::new(Position::pattern_fn(-200, "Odd", |v| v % 2 != 0));
        let inner = Arc::new(Position::group(-300, "Inner", vec![odd]));
        let outer = Position::group(-301, "Outer", vec![inner]);

        assert!(outer.is_open());
        assert_eq!(outer.expanded_list(), Some(&[-200, -300, -301][..]));
        assert!(outer.includes(9));
        assert!(!outer.includes(8));
    }

    #[test]
    fn test_pattern_includes() {
        let odd = Position::pattern(-200, "Odd", PatternRule::Odd, &PredicateTable::default()).unwrap();
        for (candidate, expected) in [(1, true), (1001, true), (4, false), (-3, false), (3, true), (-200, true)] {
            assert_eq!(odd.includes(candidate), expected, "odd includes {candidate}");
        }
        assert_eq!(odd.rule(), Some(&PatternRule::Odd));
    }

    #[test]
    fn test_function_sees_all_candidates() {
        let negative = Position::function(-300, "Negative", |v| v < 0);
        assert!(negative.includes(-3));
        assert!(!negative.includes(3));
        assert_eq!(negative.level(), 3);
    }

    #[test]
    fn test_sort_index() {
        assert_eq!(Position::special(-1, "CEO").sort_index(), Ok(-1));
        assert_eq!(
            Position::special(-5, "VP Marketing").with_sort_index(1_000_000).sort_index(),
            Ok(1_000_000)
        );

        let number = Position::number("Employee", "Page");
        assert!(number.sort_index().is_err());
        assert_eq!(number.bind(7).unwrap().sort_index(), Ok(7));

        let err = executive_team().sort_index().unwrap_err();
        assert_eq!(err.kind, Kind::Group);
        assert_eq!(err.keyword.as_str(), "executive_team");

        let odd = Position::pattern_fn(-200, "Odd", |v| v % 2 != 0).with_sort_index(5);
        assert!(odd.sort_index().is_err());
    }

    #[test]
    fn test_compare() {
        let ceo = Position::special(-1, "CEO");
        let last = Position::special(-5, "VP Marketing").with_sort_index(1_000_000);
        assert_eq!(ceo.compare(&last), Ok(Ordering::Less));
        assert!(ceo.compare(&executive_team()).is_err());
    }

    #[test]
    fn test_to_integer() {
        assert_eq!(Position::special(-1, "CEO").to_integer(), -1);
        assert_eq!(Position::number("Employee", "Page").to_integer(), 0);
    }
}
