//! Per-keyword predicates and the attribute wrappers built on them.
//!
//! ## Key Types
//!
//! - [`Accessors`]: one [`Accessor`] per declared keyword, generated at configure time
//! - [`PositionCell`]: a single stored position attribute
//! - [`HasManyPositions`]: keyword readers over an association of positioned records

mod cell;
mod has_many;
mod table;

pub use cell::PositionCell;
pub use has_many::{Found, HasManyPositions, PositionStore, Positioned};
pub use table::{Accessor, Accessors, MembershipTest};
