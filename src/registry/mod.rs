//! Position registry: declaration scripts, storage and lookup.
//!
//! ## Key Types
//!
//! - [`Script`]: ordered declarations, written in Rust or loaded from JSON
//! - [`Positions`]: the configured, read-only registry of one owner type
//! - [`PositionKey`]: every key shape lookup accepts
//! - [`Collection`]: positions resolved from a list of keys

mod builder;
mod collection;
mod index;
mod key;
mod positions;

pub use builder::{Arg, BuildContext, Constructor, Declaration, Script, VerbTable};
pub use collection::{Collection, Resolved};
pub use key::PositionKey;
pub use positions::Positions;
