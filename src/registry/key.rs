//! Lookup keys.
//!
//! Stored integers, user-entered strings, keywords and already resolved
//! positions all go through the same lookup. `PositionKey` names those
//! shapes; `From` impls let call sites pass plain values.

use std::sync::Arc;

use serde_json::Value;

use crate::types::{Keyword, Position};

/// Anything [`Positions::lookup`](crate::Positions::lookup) accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum PositionKey {
    /// Raw value. Positive values bind the number position.
    Int(i64),

    /// Exact keyword.
    Keyword(Keyword),

    /// No position.
    Nil,

    /// Free text: digits become an integer, anything else is normalized to a
    /// keyword.
    Text(String),

    /// Already resolved; returned unchanged.
    Position(Arc<Position>),

    /// Several keys, resolved into a collection in order.
    List(Vec<PositionKey>),

    /// A shape lookup cannot handle (booleans, fractions, maps). Resolving it
    /// fails with an invalid key error.
    Unsupported(&'static str),
}

impl PositionKey {
    /// Short name of the shape, for error messages.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Keyword(_) => "keyword",
            Self::Nil => "nil",
            Self::Text(_) => "string",
            Self::Position(_) => "position",
            Self::List(_) => "list",
            Self::Unsupported(shape) => shape,
        }
    }
}

impl From<i64> for PositionKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PositionKey {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<Keyword> for PositionKey {
    fn from(keyword: Keyword) -> Self {
        Self::Keyword(keyword)
    }
}

impl From<&Keyword> for PositionKey {
    fn from(keyword: &Keyword) -> Self {
        Self::Keyword(keyword.clone())
    }
}

impl From<&str> for PositionKey {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for PositionKey {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Arc<Position>> for PositionKey {
    fn from(position: Arc<Position>) -> Self {
        Self::Position(position)
    }
}

impl From<&Arc<Position>> for PositionKey {
    fn from(position: &Arc<Position>) -> Self {
        Self::Position(Arc::clone(position))
    }
}

impl<T: Into<PositionKey>> From<Option<T>> for PositionKey {
    fn from(key: Option<T>) -> Self {
        key.map_or(Self::Nil, Into::into)
    }
}

impl<T: Into<PositionKey>> From<Vec<T>> for PositionKey {
    fn from(keys: Vec<T>) -> Self {
        Self::List(keys.into_iter().map(Into::into).collect())
    }
}

impl From<&Value> for PositionKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Nil,
            Value::Number(n) => n.as_i64().map_or(Self::Unsupported("non-integer number"), Self::Int),
            Value::String(text) => Self::Text(text.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from).collect()),
            Value::Bool(_) => Self::Unsupported("boolean"),
            Value::Object(_) => Self::Unsupported("map"),
        }
    }
}

impl From<Value> for PositionKey {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}
