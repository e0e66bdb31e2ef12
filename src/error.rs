//! Error types.
//!
//! Lookups that find nothing are not errors: an unset stored position is a
//! legitimate state and resolves to `None`. Errors are reserved for broken
//! configuration, unsupported key shapes and sorting complex positions.

use crate::types::{Keyword, Kind};

/// Fatal error raised while configuring a [`Positions`](crate::Positions) registry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// `configure` was called on a registry that is already frozen.
    #[error("positions for {owner} are already configured")]
    AlreadyConfigured { owner: String },

    /// Configuration was borrowed from a registry that has none yet.
    #[error("positions for {owner} are not configured yet")]
    SourceNotConfigured { owner: String },

    /// A second `number` declaration.
    #[error("the number position can only be declared once")]
    DuplicateNumber,

    /// A group lists a member that was not declared before it.
    #[error("group {group} references undeclared position {member:?}")]
    UnknownMember { group: Keyword, member: String },

    /// Two non-number positions share a value.
    #[error("value {value} is declared by both {existing} and {new}")]
    DuplicateValue {
        value: i64,
        existing: Keyword,
        new: Keyword,
    },

    /// Two positions normalize to the same keyword.
    #[error("keyword {keyword} is declared twice")]
    DuplicateKeyword { keyword: Keyword },

    /// Positive values belong to the number position.
    #[error("{keyword} uses value {value}, but positive values are reserved for numbers")]
    ValueInNumberRange { keyword: Keyword, value: i64 },

    /// No built-in or caller-supplied constructor for a verb.
    #[error("unknown declaration verb {0:?}")]
    UnknownVerb(String),

    /// A declaration's arguments do not fit its verb.
    #[error("invalid arguments for {verb}: {reason}")]
    InvalidArguments { verb: String, reason: String },

    /// A pattern rule names a custom predicate nobody registered.
    #[error("no predicate registered under {0:?}")]
    UnknownPredicate(String),
}

impl ConfigurationError {
    pub(crate) fn invalid(verb: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            verb: verb.to_string(),
            reason: reason.into(),
        }
    }
}

/// A lookup key outside the supported shapes.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error(
    "position keys must be integers, keywords, strings, positions or lists of those (got {shape})"
)]
pub struct InvalidKeyError {
    /// Short description of the rejected shape, e.g. `"boolean"`.
    pub shape: &'static str,
}

impl InvalidKeyError {
    pub(crate) const fn new(shape: &'static str) -> Self {
        Self { shape }
    }
}

/// `sort_index` requested on a position without an intrinsic order.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} position {keyword} cannot be sorted")]
pub struct NotSortableError {
    pub keyword: Keyword,
    pub kind: Kind,
}

/// Any error the crate can produce.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    InvalidKey(#[from] InvalidKeyError),

    #[error(transparent)]
    NotSortable(#[from] NotSortableError),

    /// A predicate or reader was requested for a keyword that was never declared.
    #[error("no accessor for {0}")]
    UnknownAccessor(Keyword),

    /// A flag write named a position without a value of its own (the
    /// unbound number).
    #[error("{0} has no value of its own to store")]
    NoOwnValue(Keyword),
}
