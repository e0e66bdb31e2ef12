//! Position storage and the lookup protocol.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::collection::{Collection, Resolved};
use super::key::PositionKey;
use crate::error::{ConfigurationError, InvalidKeyError};
use crate::types::{Keyword, Position};

/// Positions indexed by value and by keyword, in declaration order.
///
/// The number position lives outside the value index: it stands for every
/// positive value and is bound per lookup.
#[derive(Debug, Default)]
pub(crate) struct PositionIndex {
    by_value: FxHashMap<i64, Arc<Position>>,
    by_keyword: FxHashMap<Keyword, Arc<Position>>,
    order: Vec<Arc<Position>>,
    number: Option<Arc<Position>>,
}

impl PositionIndex {
    /// Register a position under its value and keyword.
    pub(crate) fn insert(&mut self, position: Position) -> Result<Arc<Position>, ConfigurationError> {
        let keyword = position.keyword().clone();
        if self.by_keyword.contains_key(&keyword) {
            if position.is_number() && self.number.is_some() {
                return Err(ConfigurationError::DuplicateNumber);
            }
            return Err(ConfigurationError::DuplicateKeyword { keyword });
        }

        let position = Arc::new(position);
        if position.is_number() {
            if position.is_bound() {
                return Err(ConfigurationError::invalid(
                    "number",
                    "the number position must be declared unbound",
                ));
            }
            self.number = Some(Arc::clone(&position));
        } else if let Some(value) = position.value() {
            if value > 0 {
                return Err(ConfigurationError::ValueInNumberRange { keyword, value });
            }
            if let Some(existing) = self.by_value.get(&value) {
                return Err(ConfigurationError::DuplicateValue {
                    value,
                    existing: existing.keyword().clone(),
                    new: keyword,
                });
            }
            self.by_value.insert(value, Arc::clone(&position));
        }

        tracing::trace!(
            keyword = %keyword,
            kind = %position.kind(),
            value = ?position.value(),
            "registered position"
        );
        self.by_keyword.insert(keyword, Arc::clone(&position));
        self.order.push(Arc::clone(&position));
        Ok(position)
    }

    /// Resolve any key shape. Lists become collections.
    pub(crate) fn resolve(&self, key: &PositionKey) -> Result<Option<Resolved>, InvalidKeyError> {
        match key {
            PositionKey::List(keys) => {
                let mut slots = Vec::with_capacity(keys.len());
                self.resolve_into(keys, &mut slots)?;
                Ok(Some(Resolved::Collection(Collection::new(slots))))
            }
            _ => Ok(self.resolve_one(key)?.map(Resolved::Position)),
        }
    }

    /// Resolve a scalar key. Lists are rejected.
    pub(crate) fn resolve_one(&self, key: &PositionKey) -> Result<Option<Arc<Position>>, InvalidKeyError> {
        match key {
            PositionKey::Int(value) if *value > 0 => {
                Ok(self.number.as_ref().and_then(|number| number.bind(*value)))
            }
            PositionKey::Int(value) => Ok(self.by_value.get(value).cloned()),
            PositionKey::Keyword(keyword) => Ok(self.by_keyword.get(keyword).cloned()),
            PositionKey::Nil => Ok(None),
            PositionKey::Text(text) => Ok(self.resolve_text(text)),
            PositionKey::Position(position) => Ok(Some(Arc::clone(position))),
            PositionKey::List(_) | PositionKey::Unsupported(_) => {
                Err(InvalidKeyError::new(key.shape()))
            }
        }
    }

    fn resolve_text(&self, text: &str) -> Option<Arc<Position>> {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            // Too many digits for an i64 is no position at all.
            let value = text.parse::<i64>().ok()?;
            return self.resolve_one(&PositionKey::Int(value)).ok().flatten();
        }
        self.by_keyword.get(Keyword::new(text).as_str()).cloned()
    }

    // Nested lists flatten into the outer collection.
    fn resolve_into(
        &self,
        keys: &[PositionKey],
        slots: &mut Vec<Option<Arc<Position>>>,
    ) -> Result<(), InvalidKeyError> {
        for key in keys {
            match key {
                PositionKey::List(inner) => self.resolve_into(inner, slots)?,
                _ => slots.push(self.resolve_one(key)?),
            }
        }
        Ok(())
    }

    pub(crate) fn number(&self) -> Option<&Arc<Position>> {
        self.number.as_ref()
    }

    pub(crate) fn by_value(&self, value: i64) -> Option<&Arc<Position>> {
        self.by_value.get(&value)
    }

    pub(crate) fn by_keyword(&self, keyword: &str) -> Option<&Arc<Position>> {
        self.by_keyword.get(keyword)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<Position>> {
        self.order.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}
