//! Pattern rules.
//!
//! A pattern position classifies number values with a predicate. Rules are
//! plain data so scripts can be written in JSON; they are compiled into a
//! closure once, when the pattern is declared. Anything the built-in rules
//! cannot express goes through [`PatternRule::Custom`], resolved against
//! predicates registered on the registry.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Predicate over a raw position value.
pub type Predicate = Arc<dyn Fn(i64) -> bool + Send + Sync>;

/// Named predicates available to [`PatternRule::Custom`].
pub type PredicateTable = FxHashMap<String, Predicate>;

/// Declarative predicate over a raw value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternRule {
    /// Odd values.
    Odd,

    /// Even values.
    Even,

    /// Values divisible by N. N must not be zero.
    MultipleOf(i64),

    /// Values >= N.
    AtLeast(i64),

    /// Values <= N.
    AtMost(i64),

    /// Values in [min, max].
    InRange { min: i64, max: i64 },

    // === Combinators ===

    /// All rules must match.
    All(Vec<PatternRule>),

    /// At least one rule must match.
    Any(Vec<PatternRule>),

    /// Rule must not match.
    Not(Box<PatternRule>),

    /// Predicate registered by the caller under this name.
    Custom(String),
}

impl PatternRule {
    /// Rule from a bare name: `odd`, `even`, anything else is custom.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "odd" => Self::Odd,
            "even" => Self::Even,
            _ => Self::Custom(name.to_string()),
        }
    }

    /// Add another rule with AND.
    pub fn and(self, other: PatternRule) -> Self {
        match self {
            Self::All(mut rules) => {
                rules.push(other);
                Self::All(rules)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Add another rule with OR.
    pub fn or(self, other: PatternRule) -> Self {
        match self {
            Self::Any(mut rules) => {
                rules.push(other);
                Self::Any(rules)
            }
            _ => Self::Any(vec![self, other]),
        }
    }

    /// Negate this rule.
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Compile into a closure, resolving custom names against `custom`.
    pub fn compile(&self, custom: &PredicateTable) -> Result<Predicate, ConfigurationError> {
        let predicate: Predicate = match self {
            Self::Odd => Arc::new(|v| v.rem_euclid(2) == 1),

            Self::Even => Arc::new(|v| v.rem_euclid(2) == 0),

            Self::MultipleOf(0) => {
                return Err(ConfigurationError::invalid("pattern", "multiple of zero"));
            }

            Self::MultipleOf(n) => {
                let n = n.unsigned_abs();
                Arc::new(move |v| v.unsigned_abs() % n == 0)
            }

            Self::AtLeast(min) => {
                let min = *min;
                Arc::new(move |v| v >= min)
            }

            Self::AtMost(max) => {
                let max = *max;
                Arc::new(move |v| v <= max)
            }

            Self::InRange { min, max } => {
                let (min, max) = (*min, *max);
                Arc::new(move |v| v >= min && v <= max)
            }

            Self::All(rules) => {
                let compiled = compile_all(rules, custom)?;
                Arc::new(move |v| compiled.iter().all(|p| p(v)))
            }

            Self::Any(rules) => {
                let compiled = compile_all(rules, custom)?;
                Arc::new(move |v| compiled.iter().any(|p| p(v)))
            }

            Self::Not(inner) => {
                let inner = inner.compile(custom)?;
                Arc::new(move |v| !inner(v))
            }

            Self::Custom(name) => custom
                .get(name)
                .cloned()
                .ok_or_else(|| ConfigurationError::UnknownPredicate(name.clone()))?,
        };
        Ok(predicate)
    }
}

fn compile_all(
    rules: &[PatternRule],
    custom: &PredicateTable,
) -> Result<Vec<Predicate>, ConfigurationError> {
    rules.iter().map(|rule| rule.compile(custom)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(rule: &PatternRule, value: i64) -> bool {
        rule.compile(&PredicateTable::default()).unwrap()(value)
    }

    #[test]
    fn test_parity() {
        assert!(check(&PatternRule::Odd, 7));
        assert!(!check(&PatternRule::Odd, 4));
        assert!(check(&PatternRule::Odd, -3));
        assert!(check(&PatternRule::Even, 0));
        assert!(!check(&PatternRule::Even, 21));
    }

    #[test]
    fn test_bounds() {
        assert!(check(&PatternRule::AtLeast(10), 10));
        assert!(!check(&PatternRule::AtLeast(10), 9));
        assert!(check(&PatternRule::AtMost(10), -4));
        assert!(check(&PatternRule::InRange { min: 3, max: 7 }, 5));
        assert!(!check(&PatternRule::InRange { min: 3, max: 7 }, 8));
        assert!(check(&PatternRule::MultipleOf(5), 25));
        assert!(!check(&PatternRule::MultipleOf(5), 26));
        assert!(check(&PatternRule::MultipleOf(-1), i64::MIN));
    }

    #[test]
    fn test_multiple_of_zero_rejected() {
        let err = PatternRule::MultipleOf(0)
            .compile(&PredicateTable::default())
            .err()
            .unwrap();
        assert!(matches!(err, ConfigurationError::InvalidArguments { .. }));
    }

    #[test]
    fn test_combinators() {
        let rule = PatternRule::Odd.and(PatternRule::AtLeast(10));
        assert!(check(&rule, 11));
        assert!(!check(&rule, 9));
        assert!(!check(&rule, 12));

        let rule = PatternRule::AtMost(2).or(PatternRule::AtLeast(100));
        assert!(check(&rule, 1));
        assert!(check(&rule, 150));
        assert!(!check(&rule, 50));

        assert!(check(&PatternRule::Odd.negate(), 8));

        if let PatternRule::All(rules) = PatternRule::Odd
            .and(PatternRule::AtLeast(1))
            .and(PatternRule::AtMost(9))
        {
            assert_eq!(rules.len(), 3);
        } else {
            panic!("Expected All rule");
        }
    }

    #[test]
    fn test_custom_rule() {
        let mut table = PredicateTable::default();
        table.insert("square".to_string(), Arc::new(|v: i64| {
            let root = (v as f64).sqrt() as i64;
            root * root == v
        }));

        let square = PatternRule::Custom("square".to_string()).compile(&table).unwrap();
        assert!(square(49));
        assert!(!square(50));

        let missing = PatternRule::Custom("prime".to_string()).compile(&table);
        assert_eq!(
            missing.err(),
            Some(ConfigurationError::UnknownPredicate("prime".to_string()))
        );
    }

    #[test]
    fn test_from_name() {
        assert_eq!(PatternRule::from_name("Odd"), PatternRule::Odd);
        assert_eq!(PatternRule::from_name("even"), PatternRule::Even);
        assert_eq!(
            PatternRule::from_name("prime"),
            PatternRule::Custom("prime".to_string())
        );
    }

    #[test]
    fn test_rule_serialization() {
        let rule = PatternRule::All(vec![
            PatternRule::Odd,
            PatternRule::InRange { min: 1, max: 99 },
        ]);
        let json = serde_json::to_string(&rule).unwrap();
        let deserialized: PatternRule = serde_json::from_str(&json).unwrap();
        assert_eq!(rule, deserialized);
    }
}
