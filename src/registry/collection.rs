//! Lookup results.

use std::sync::Arc;

use crate::types::{Candidate, Position};

/// Positions resolved from a list of keys.
///
/// Slot order follows the keys; keys that resolved to nothing leave an empty
/// slot so positions stay aligned with their keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Collection {
    slots: Vec<Option<Arc<Position>>>,
}

impl Collection {
    /// A collection over resolved slots.
    #[must_use]
    pub fn new(slots: Vec<Option<Arc<Position>>>) -> Self {
        Self { slots }
    }

    /// True when any member covers `candidate`.
    pub fn includes(&self, candidate: impl Candidate) -> bool {
        let Some(value) = candidate.raw_value() else {
            return false;
        };
        self.iter().any(|position| position.includes_value(value))
    }

    /// Every slot, empty ones included.
    #[must_use]
    pub fn slots(&self) -> &[Option<Arc<Position>>] {
        &self.slots
    }

    /// Resolved members in order, skipping empty slots.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Position>> {
        self.slots.iter().flatten()
    }

    /// Raw values per slot.
    #[must_use]
    pub fn values(&self) -> Vec<Option<i64>> {
        self.slots
            .iter()
            .map(|slot| slot.as_ref().and_then(|p| p.value()))
            .collect()
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Does the collection have no slots?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl FromIterator<Option<Arc<Position>>> for Collection {
    fn from_iter<I: IntoIterator<Item = Option<Arc<Position>>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// What a key resolves to.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved {
    Position(Arc<Position>),
    Collection(Collection),
}

impl Resolved {
    /// Membership across either shape.
    pub fn includes(&self, candidate: impl Candidate) -> bool {
        match self {
            Self::Position(position) => position.includes(candidate),
            Self::Collection(collection) => collection.includes(candidate),
        }
    }

    /// The single position, if this is one.
    #[must_use]
    pub fn as_position(&self) -> Option<&Arc<Position>> {
        match self {
            Self::Position(position) => Some(position),
            Self::Collection(_) => None,
        }
    }

    /// The single position, if this is one, by value.
    #[must_use]
    pub fn into_position(self) -> Option<Arc<Position>> {
        match self {
            Self::Position(position) => Some(position),
            Self::Collection(_) => None,
        }
    }

    /// The collection, if this is one.
    #[must_use]
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Self::Position(_) => None,
            Self::Collection(collection) => Some(collection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specials() -> (Arc<Position>, Arc<Position>, Arc<Position>) {
        let ceo = Arc::new(Position::special(-1, "CEO"));
        let cto = Arc::new(Position::special(-2, "CTO"));
        let team = Arc::new(Position::group(
            -100,
            "Executive Team",
            vec![Arc::clone(&ceo), Arc::clone(&cto)],
        ));
        (ceo, cto, team)
    }

    #[test]
    fn test_includes_is_union() {
        let (ceo, _, team) = specials();
        let vp = Arc::new(Position::special(-4, "VP"));
        let collection = Collection::new(vec![Some(team.clone()), Some(vp)]);

        assert!(collection.includes(&ceo));
        assert!(collection.includes(&team));
        assert!(collection.includes(-4));
        assert!(!collection.includes(-5));
        assert!(!collection.includes(None::<i64>));
    }

    #[test]
    fn test_empty_slots() {
        let (ceo, _, _) = specials();
        let collection: Collection = vec![Some(ceo), None].into_iter().collect();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.iter().count(), 1);
        assert_eq!(collection.values(), vec![Some(-1), None]);
        assert!(!collection.includes(0));
    }

    #[test]
    fn test_resolved_accessors() {
        let (ceo, cto, _) = specials();
        let single = Resolved::Position(ceo.clone());
        assert!(single.includes(-1));
        assert_eq!(single.as_position(), Some(&ceo));
        assert!(single.as_collection().is_none());

        let many = Resolved::Collection(Collection::new(vec![Some(ceo), Some(cto)]));
        assert!(many.includes(-2));
        assert!(many.clone().into_position().is_none());
        assert_eq!(many.as_collection().map(Collection::len), Some(2));
    }
}
