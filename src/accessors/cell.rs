//! One stored position attribute.

use std::sync::Arc;

use crate::error::{InvalidKeyError, PositionError};
use crate::registry::{PositionKey, Positions};
use crate::types::{Keyword, Position};

/// A raw stored value tied to the registry that interprets it.
///
/// Reads resolve the raw value through the registry every time; writes
/// accept any key and store the resolved value. Keys that resolve to
/// nothing clear the cell.
#[derive(Clone, Debug)]
pub struct PositionCell {
    positions: Arc<Positions>,
    raw: Option<i64>,
}

impl PositionCell {
    /// An empty cell.
    #[must_use]
    pub fn new(positions: Arc<Positions>) -> Self {
        Self { positions, raw: None }
    }

    /// A cell holding a value loaded from storage. The value is kept as is.
    #[must_use]
    pub fn loaded(positions: Arc<Positions>, raw: Option<i64>) -> Self {
        Self { positions, raw }
    }

    /// The registry interpreting the stored value.
    #[must_use]
    pub fn positions(&self) -> &Arc<Positions> {
        &self.positions
    }

    /// The value as stored.
    #[must_use]
    pub fn raw(&self) -> Option<i64> {
        self.raw
    }

    /// The stored value resolved to a position.
    #[must_use]
    pub fn get(&self) -> Option<Arc<Position>> {
        self.raw
            .and_then(|value| self.positions.position(value).ok().flatten())
    }

    /// Store a key. Positive integers are stored verbatim; every other key is
    /// looked up and its value stored.
    pub fn set(&mut self, key: impl Into<PositionKey>) -> Result<(), InvalidKeyError> {
        self.raw = match key.into() {
            PositionKey::Int(value) if value > 0 => Some(value),
            key => self.positions.position(key)?.and_then(|position| position.value()),
        };
        Ok(())
    }

    /// Store the value of a declared position by keyword.
    ///
    /// The number position has no value of its own; use
    /// [`set_number`](Self::set_number).
    pub fn set_flag(&mut self, keyword: &str) -> Result<(), PositionError> {
        let accessor = self.accessor(keyword)?;
        match accessor.position().value() {
            Some(value) => {
                self.raw = Some(value);
                Ok(())
            }
            None => Err(PositionError::NoOwnValue(accessor.keyword().clone())),
        }
    }

    /// Store a number. Anything but a positive value clears the cell.
    pub fn set_number(&mut self, number: Option<i64>) {
        self.raw = number.filter(|n| *n > 0);
    }

    /// Unset the stored value.
    pub fn clear(&mut self) {
        self.raw = None;
    }

    /// Does the stored value belong to the keyword's position?
    pub fn is(&self, keyword: &str) -> Result<bool, PositionError> {
        Ok(self.accessor(keyword)?.check(self.raw))
    }

    /// Is a number stored? With `Some(n)`, is it `n`?
    #[must_use]
    pub fn is_number(&self, number: Option<i64>) -> bool {
        self.positions
            .accessors()
            .get(Keyword::NUMBER)
            .is_some_and(|accessor| accessor.check_number(self.raw, number))
    }

    /// The stored number, if the cell holds one.
    #[must_use]
    pub fn number(&self) -> Option<i64> {
        self.raw.filter(|_| self.is_number(None))
    }

    /// Name of the stored position, or an empty string.
    #[must_use]
    pub fn name(&self) -> String {
        self.get().map(|p| p.name().to_string()).unwrap_or_default()
    }

    /// Short name of the stored position, or an empty string.
    #[must_use]
    pub fn short_name(&self) -> String {
        self.get().map(|p| p.short_name().to_string()).unwrap_or_default()
    }

    /// Titleized name of the stored position, or an empty string.
    #[must_use]
    pub fn titleized(&self) -> String {
        self.get().map(|p| p.titleized().to_string()).unwrap_or_default()
    }

    /// Keyword of the stored position.
    #[must_use]
    pub fn keyword(&self) -> Option<Keyword> {
        self.get().map(|p| p.keyword().clone())
    }

    /// Stored value as an integer, `0` when unset.
    #[must_use]
    pub fn to_integer(&self) -> i64 {
        self.get().map_or(0, |p| p.to_integer())
    }

    fn accessor(&self, keyword: &str) -> Result<&super::Accessor, PositionError> {
        self.positions
            .accessors()
            .get(keyword)
            .ok_or_else(|| PositionError::UnknownAccessor(Keyword::new(keyword)))
    }
}
