//! The position registry of one owner type.

use std::sync::Arc;

use super::builder::{BuildContext, Builder, Constructor, Declaration, Script, VerbTable};
use super::collection::{Collection, Resolved};
use super::index::PositionIndex;
use super::key::PositionKey;
use crate::accessors::Accessors;
use crate::config::PositionsConfig;
use crate::error::{ConfigurationError, InvalidKeyError};
use crate::types::{Keyword, Position, PredicateTable, MAX_VALUE};

/// All positions declared for an owner type.
///
/// Configure once, then share behind an `Arc`; after configuration nothing
/// inside changes and every read is safe from any thread.
///
/// ## Example
///
/// ```
/// use positionable::{PatternRule, Positions, PositionsConfig, Script};
///
/// let script = Script::new()
///     .number()
///     .special(-1, "CEO")
///     .special(-2, "CTO")
///     .special(-3, "CFO")
///     .group(-100, "Executive Team", ["ceo", "cto", "cfo"])
///     .pattern(-200, "Odd", PatternRule::Odd);
///
/// let positions = Positions::build(PositionsConfig::for_owner("Employee"), script).unwrap();
///
/// let ceo = positions.position(-1).unwrap().unwrap();
/// assert_eq!(ceo.keyword().as_str(), "ceo");
///
/// let team = positions.position("executive_team").unwrap().unwrap();
/// assert!(team.includes(-1));
/// assert!(!team.includes(-4));
///
/// let three = positions.position(3).unwrap().unwrap();
/// assert!(!three.includes(7));
/// assert!(positions.number().unwrap().includes(7));
/// ```
pub struct Positions {
    config: PositionsConfig,
    verbs: VerbTable,
    predicates: PredicateTable,
    script: Option<Script>,
    index: PositionIndex,
    accessors: Accessors,
}

impl Positions {
    /// An empty registry. Register extensions, then [`configure`](Self::configure).
    #[must_use]
    pub fn new(config: PositionsConfig) -> Self {
        Self {
            config,
            verbs: VerbTable::default(),
            predicates: PredicateTable::default(),
            script: None,
            index: PositionIndex::default(),
            accessors: Accessors::default(),
        }
    }

    /// New registry configured with `script`.
    pub fn build(config: PositionsConfig, script: Script) -> Result<Self, ConfigurationError> {
        let mut positions = Self::new(config);
        positions.configure(script)?;
        Ok(positions)
    }

    /// Register a declaration verb (builder pattern). Consulted before the
    /// built-in verbs, so it can also replace one.
    #[must_use]
    pub fn with_verb<F>(mut self, verb: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&Declaration, &BuildContext<'_>) -> Result<Position, ConfigurationError>
            + Send
            + Sync
            + 'static,
    {
        let constructor: Constructor = Arc::new(constructor);
        self.verbs.insert(verb.into(), constructor);
        self
    }

    /// Register a predicate for [`PatternRule::Custom`](crate::PatternRule::Custom)
    /// (builder pattern).
    #[must_use]
    pub fn with_predicate<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(i64) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Arc::new(predicate));
        self
    }

    /// Run the declaration script, then freeze.
    ///
    /// Fails if already configured, or if any declaration is invalid. On
    /// failure the registry stays unconfigured.
    pub fn configure(&mut self, script: Script) -> Result<(), ConfigurationError> {
        if self.is_configured() {
            return Err(ConfigurationError::AlreadyConfigured {
                owner: self.config.owner.clone(),
            });
        }
        tracing::debug!(
            owner = %self.config.owner,
            declarations = script.len(),
            "configuring positions"
        );

        let index = Builder::new(&self.config, &self.verbs, &self.predicates).build(&script)?;
        let accessors = Accessors::build(index.iter(), &self.config);

        tracing::debug!(
            owner = %self.config.owner,
            positions = index.len(),
            "positions configured"
        );
        self.index = index;
        self.accessors = accessors;
        self.script = Some(script);
        Ok(())
    }

    /// Configure with another owner type's script, verbs and predicates.
    ///
    /// Verbs and predicates registered on `self` win over borrowed ones.
    pub fn configure_like(&mut self, other: &Positions) -> Result<(), ConfigurationError> {
        if self.is_configured() {
            return Err(ConfigurationError::AlreadyConfigured {
                owner: self.config.owner.clone(),
            });
        }
        let script = other
            .script
            .clone()
            .ok_or_else(|| ConfigurationError::SourceNotConfigured {
                owner: other.config.owner.clone(),
            })?;
        for (verb, constructor) in &other.verbs {
            self.verbs
                .entry(verb.clone())
                .or_insert_with(|| Arc::clone(constructor));
        }
        for (name, predicate) in &other.predicates {
            self.predicates
                .entry(name.clone())
                .or_insert_with(|| Arc::clone(predicate));
        }
        self.configure(script)
    }

    /// Has `configure` succeeded?
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.script.is_some()
    }

    /// Settings this registry was created with.
    #[must_use]
    pub fn config(&self) -> &PositionsConfig {
        &self.config
    }

    /// The script this registry was configured with.
    #[must_use]
    pub fn script(&self) -> Option<&Script> {
        self.script.as_ref()
    }

    /// Largest storable position.
    #[must_use]
    pub const fn max_value(&self) -> i64 {
        MAX_VALUE
    }

    // === Lookup ===

    /// Resolve any key shape.
    ///
    /// - positive integer: the number position bound to it
    /// - zero or negative integer, keyword: exact match
    /// - string: digits as an integer, otherwise normalized to a keyword
    /// - position: returned as is
    /// - list: a [`Collection`] in key order
    /// - nil, or nothing matching: `None`
    ///
    /// Unsupported shapes are an error.
    pub fn lookup(&self, key: impl Into<PositionKey>) -> Result<Option<Resolved>, InvalidKeyError> {
        self.index.resolve(&key.into())
    }

    /// Resolve a single key. Lists are an error.
    pub fn position(&self, key: impl Into<PositionKey>) -> Result<Option<Arc<Position>>, InvalidKeyError> {
        self.index.resolve_one(&key.into())
    }

    /// Resolve several keys into a collection.
    pub fn collection<I, K>(&self, keys: I) -> Result<Collection, InvalidKeyError>
    where
        I: IntoIterator<Item = K>,
        K: Into<PositionKey>,
    {
        let key = PositionKey::List(keys.into_iter().map(Into::into).collect());
        match self.index.resolve(&key)? {
            Some(Resolved::Collection(collection)) => Ok(collection),
            _ => Ok(Collection::default()),
        }
    }

    /// Registered position with exactly this value. Never binds the number.
    #[must_use]
    pub fn by_value(&self, value: i64) -> Option<&Arc<Position>> {
        self.index.by_value(value)
    }

    /// Registered position under an already normalized keyword.
    #[must_use]
    pub fn by_keyword(&self, keyword: &str) -> Option<&Arc<Position>> {
        self.index.by_keyword(keyword)
    }

    /// The unbound number position, if declared.
    #[must_use]
    pub fn number(&self) -> Option<&Arc<Position>> {
        self.index.number()
    }

    /// Keywords in declaration order, optionally without `number`.
    #[must_use]
    pub fn symbol_keys(&self, include_number: bool) -> Vec<&Keyword> {
        self.index
            .iter()
            .filter(|position| include_number || !position.is_number())
            .map(|position| position.keyword())
            .collect()
    }

    /// Declared positions in order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Position>> {
        self.index.iter()
    }

    /// Number of declared positions, the number position included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Were no positions declared?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.len() == 0
    }

    /// Per-keyword predicates.
    #[must_use]
    pub fn accessors(&self) -> &Accessors {
        &self.accessors
    }
}

impl std::fmt::Debug for Positions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Positions")
            .field("owner", &self.config.owner)
            .field("positions", &self.index.len())
            .field("configured", &self.is_configured())
            .finish()
    }
}
