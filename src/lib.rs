//! # positionable
//!
//! Ordinal positions stored as a single integer per record.
//!
//! Positive values are plain numbers ("Employee 3"). Zero and negative values
//! name special positions ("CEO"), groups of positions ("Executive Team") and
//! patterns over numbers ("Odd"). One registry per owner type maps between
//! stored integers, keywords and [`Position`] instances.
//!
//! ## Design Principles
//!
//! 1. **Configure Once**: A [`Positions`] registry is built from a [`Script`]
//!    and is read-only afterwards. Share it through an `Arc`.
//!
//! 2. **Absence Is Not An Error**: Unknown keys and unset values resolve to
//!    `None`. Errors mean broken configuration or an unsupported key shape.
//!
//! 3. **Values Are Identity**: Positions compare and hash by value. Lookups
//!    return the registered instance; binding a number creates a new one.
//!
//! ## Modules
//!
//! - `types`: Position variants, keywords, pattern rules, ordering
//! - `registry`: Declaration scripts, building and lookup
//! - `accessors`: Per-keyword predicates, attribute cell, has-many readers
//! - `query`: Expanding keys into storage conditions
//! - `config`: Per-owner settings
//! - `error`: Error types
//!
//! ```
//! use positionable::{PatternRule, Positions, PositionsConfig, Script};
//!
//! let script = Script::new()
//!     .number()
//!     .special(-1, "CEO")
//!     .special(-2, "CTO")
//!     .group(-100, "Executive Team", ["ceo", "cto"])
//!     .pattern(-200, "Odd", PatternRule::Odd);
//! let positions = Positions::build(PositionsConfig::for_owner("Employee"), script).unwrap();
//!
//! let team = positions.position("executive_team").unwrap().unwrap();
//! assert!(team.includes(-1));
//! assert_eq!(positions.position(3).unwrap().unwrap().name(), "Employee 3");
//! ```

pub mod accessors;
pub mod config;
pub mod error;
pub mod query;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use crate::accessors::{
    Accessor, Accessors, Found, HasManyPositions, MembershipTest,
    PositionCell, PositionStore, Positioned,
};

pub use crate::config::PositionsConfig;

pub use crate::error::{ConfigurationError, InvalidKeyError, NotSortableError, PositionError};

pub use crate::query::Condition;

pub use crate::registry::{
    Arg, BuildContext, Collection, Constructor, Declaration,
    PositionKey, Positions, Resolved, Script, VerbTable,
};

pub use crate::types::{
    sort_positions, Candidate, Expansion, Keyword, Kind,
    PatternRule, Position, Predicate, PredicateTable, MAX_VALUE,
};
