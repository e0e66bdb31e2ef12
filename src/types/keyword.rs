//! Keywords: the normalized symbolic form of a position name.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized position name: lowercase, spaces replaced by underscores.
///
/// ```
/// use positionable::Keyword;
///
/// assert_eq!(Keyword::new("Executive Team").as_str(), "executive_team");
/// assert_eq!(Keyword::new("CEO"), Keyword::new("ceo"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Keyword(String);

impl Keyword {
    /// Keyword of the number position, whatever the owner type is called.
    pub const NUMBER: &'static str = "number";

    /// Normalize a name into a keyword.
    pub fn new(name: &str) -> Self {
        Self(name.to_lowercase().replace(' ', "_"))
    }

    /// Wrap text that is already normalized.
    pub(crate) fn from_normalized(keyword: impl Into<String>) -> Self {
        Self(keyword.into())
    }

    /// The number sentinel.
    pub fn number() -> Self {
        Self::from_normalized(Self::NUMBER)
    }

    /// The normalized text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Is this the number sentinel?
    #[must_use]
    pub fn is_number(&self) -> bool {
        self.0 == Self::NUMBER
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes, so deserialized names match registered keywords.
impl From<String> for Keyword {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<Keyword> for String {
    fn from(keyword: Keyword) -> Self {
        keyword.0
    }
}

impl Borrow<str> for Keyword {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Keyword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Keyword {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
