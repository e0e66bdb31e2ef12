//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Per-owner settings for a [`Positions`](crate::Positions) registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionsConfig {
    /// Owner type name. Names number positions ("Employee 3").
    pub owner: String,

    /// Column holding the raw position value. Used when rendering conditions.
    pub column: String,

    /// Prefix of a titleized number ("Page 3").
    pub number_title: String,

    /// Largest expanded group that is still tested by scanning its value list.
    /// Bigger groups are tested against a hash set.
    pub scan_threshold: usize,
}

impl Default for PositionsConfig {
    fn default() -> Self {
        Self {
            owner: "Position".to_string(),
            column: "position".to_string(),
            number_title: "Page".to_string(),
            scan_threshold: 100,
        }
    }
}

impl PositionsConfig {
    /// Config for a named owner type, other settings default.
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }

    /// Set the column name.
    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Set the number title prefix.
    #[must_use]
    pub fn with_number_title(mut self, title: impl Into<String>) -> Self {
        self.number_title = title.into();
        self
    }

    /// Set the scan/hash-set switch point.
    #[must_use]
    pub fn with_scan_threshold(mut self, threshold: usize) -> Self {
        self.scan_threshold = threshold;
        self
    }
}
