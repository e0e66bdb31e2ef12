//! Predicates over a one-to-many association of positioned records.
//!
//! Loaded records are scanned in memory. Without them, the question goes to
//! the [`PositionStore`] as a [`Condition`]. Conditions for patterns,
//! functions and open groups cannot be exact, so those fetch candidates and
//! filter locally.

use crate::error::PositionError;
use crate::query::Condition;
use crate::registry::Positions;
use crate::types::Keyword;

use super::Accessor;

/// A record carrying a stored position.
pub trait Positioned {
    fn position_value(&self) -> Option<i64>;
}

impl Positioned for Option<i64> {
    fn position_value(&self) -> Option<i64> {
        *self
    }
}

/// Where unloaded associated records live.
pub trait PositionStore<R> {
    /// First record matching the condition.
    fn find_first(&self, condition: &Condition) -> Option<R>;

    /// Every record matching the condition, in storage order.
    fn find_all(&self, condition: &Condition) -> Vec<R>;
}

/// Records already in memory can serve as their own store.
impl<R: Positioned + Clone> PositionStore<R> for Vec<R> {
    fn find_first(&self, condition: &Condition) -> Option<R> {
        self.iter()
            .find(|r| condition.matches(r.position_value()))
            .cloned()
    }

    fn find_all(&self, condition: &Condition) -> Vec<R> {
        self.iter()
            .filter(|r| condition.matches(r.position_value()))
            .cloned()
            .collect()
    }
}

/// What a keyword reader returns: primitives find one record, complex
/// positions find all of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Found<R> {
    One(Option<R>),
    Many(Vec<R>),
}

impl<R> Found<R> {
    /// Did the reader find anything?
    #[must_use]
    pub fn is_found(&self) -> bool {
        match self {
            Self::One(record) => record.is_some(),
            Self::Many(records) => !records.is_empty(),
        }
    }

    /// Found records as a list, empty when nothing was found.
    #[must_use]
    pub fn into_vec(self) -> Vec<R> {
        match self {
            Self::One(record) => record.into_iter().collect(),
            Self::Many(records) => records,
        }
    }
}

/// Keyword readers over an association.
pub struct HasManyPositions<'a, R, S> {
    positions: &'a Positions,
    store: &'a S,
    loaded: Option<&'a [R]>,
}

impl<'a, R, S> HasManyPositions<'a, R, S>
where
    R: Positioned + Clone,
    S: PositionStore<R>,
{
    /// Readers answering from `store`.
    #[must_use]
    pub fn new(positions: &'a Positions, store: &'a S) -> Self {
        Self {
            positions,
            store,
            loaded: None,
        }
    }

    /// Answer from these records instead of the store.
    #[must_use]
    pub fn with_loaded(mut self, records: &'a [R]) -> Self {
        self.loaded = Some(records);
        self
    }

    /// Are answers coming from loaded records?
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Records in the keyword's position.
    ///
    /// The number keyword behaves like [`number(None)`](Self::number).
    pub fn read(&self, keyword: &str) -> Result<Found<R>, PositionError> {
        let accessor = self.accessor(keyword)?;
        let position = accessor.position();
        if position.is_number() {
            return Ok(Found::One(self.number(None)));
        }
        Ok(if position.is_primitive() {
            Found::One(self.first(accessor))
        } else {
            Found::Many(self.all(accessor))
        })
    }

    /// Is any record in the keyword's position?
    pub fn is(&self, keyword: &str) -> Result<bool, PositionError> {
        Ok(self.read(keyword)?.is_found())
    }

    /// The record holding number `n`, or the first numbered record.
    /// Non-positive `n` finds nothing.
    #[must_use]
    pub fn number(&self, number: Option<i64>) -> Option<R> {
        if number.is_some_and(|n| n <= 0) {
            return None;
        }
        let accessor = self.positions.accessors().get(Keyword::NUMBER)?;
        match self.loaded {
            Some(records) => records
                .iter()
                .find(|r| accessor.check_number(r.position_value(), number))
                .cloned(),
            None => self
                .store
                .find_first(&number.map_or(Condition::Positive, Condition::Eq)),
        }
    }

    /// Does any record hold a number (`n`, if given)?
    #[must_use]
    pub fn is_number(&self, number: Option<i64>) -> bool {
        self.number(number).is_some()
    }

    /// Stored positions of the association. From the store, only records
    /// that hold a position.
    #[must_use]
    pub fn values(&self) -> Vec<Option<i64>> {
        match self.loaded {
            Some(records) => records.iter().map(Positioned::position_value).collect(),
            None => self
                .store
                .find_all(&Condition::Present)
                .iter()
                .map(Positioned::position_value)
                .collect(),
        }
    }

    fn first(&self, accessor: &Accessor) -> Option<R> {
        match self.loaded {
            Some(records) => records
                .iter()
                .find(|r| accessor.check(r.position_value()))
                .cloned(),
            None if is_exact(accessor) => self.store.find_first(&stored_condition(accessor)),
            None => self.all(accessor).into_iter().next(),
        }
    }

    fn all(&self, accessor: &Accessor) -> Vec<R> {
        match self.loaded {
            Some(records) => records
                .iter()
                .filter(|r| accessor.check(r.position_value()))
                .cloned()
                .collect(),
            None if is_exact(accessor) => self.store.find_all(&stored_condition(accessor)),
            None => self
                .store
                .find_all(&Condition::Present)
                .into_iter()
                .filter(|r| accessor.check(r.position_value()))
                .collect(),
        }
    }

    fn accessor(&self, keyword: &str) -> Result<&'a Accessor, PositionError> {
        self.positions
            .accessors()
            .get(keyword)
            .ok_or_else(|| PositionError::UnknownAccessor(Keyword::new(keyword)))
    }
}

/// Can the store answer for this accessor without local filtering?
fn is_exact(accessor: &Accessor) -> bool {
    let position = accessor.position();
    position.is_primitive() || (position.expansion().is_some() && !position.is_open())
}

fn stored_condition(accessor: &Accessor) -> Condition {
    Condition::for_position(accessor.position())
}
