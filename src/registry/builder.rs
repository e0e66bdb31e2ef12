//! Declaration scripts and the builder that runs them.
//!
//! A script is an ordered list of `(verb, args, options)` declarations.
//! Built-in verbs are `number`, `special`, `group` and `pattern`; callers can
//! register more verbs on the registry, and those are consulted first.
//!
//! ## Example
//!
//! ```
//! use positionable::{PatternRule, Positions, PositionsConfig, Script};
//!
//! let script = Script::new()
//!     .number()
//!     .special(-1, "Front Cover")
//!     .special_sorted(-2, "Back Cover", Script::MAX_VALUE + 1)
//!     .special(-3, "Spine")
//!     .group(-100, "Cover", ["front_cover", "back_cover", "spine"])
//!     .pattern(-200, "Odd", PatternRule::Odd);
//!
//! let mut positions = Positions::new(PositionsConfig::for_owner("Page"));
//! positions.configure(script).unwrap();
//!
//! let cover = positions.position("cover").unwrap().unwrap();
//! assert!(cover.includes(-2));
//! ```

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::collection::Resolved;
use super::index::PositionIndex;
use super::key::PositionKey;
use crate::config::PositionsConfig;
use crate::error::{ConfigurationError, InvalidKeyError};
use crate::types::{PatternRule, Position, PredicateTable, MAX_VALUE};

/// A declaration argument.
///
/// Serialized untagged, except rules, which travel as `{"rule": ...}` so a
/// bare rule name like `"Odd"` stays text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    Int(i64),
    Text(String),
    List(Vec<Arg>),
    Rule(#[serde(with = "tagged_rule")] PatternRule),
}

mod tagged_rule {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::types::PatternRule;

    #[derive(Serialize)]
    struct Borrowed<'a> {
        rule: &'a PatternRule,
    }

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Owned {
        rule: PatternRule,
    }

    pub(super) fn serialize<S: Serializer>(rule: &PatternRule, serializer: S) -> Result<S::Ok, S::Error> {
        Borrowed { rule }.serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PatternRule, D::Error> {
        Owned::deserialize(deserializer).map(|owned| owned.rule)
    }
}

impl Arg {
    /// The argument as an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Arg::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The argument as text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Arg::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The argument as a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Arg]> {
        match self {
            Arg::List(items) => Some(items),
            _ => None,
        }
    }

    /// The argument as a lookup key.
    #[must_use]
    pub fn to_key(&self) -> PositionKey {
        match self {
            Arg::Int(v) => PositionKey::Int(*v),
            Arg::Text(s) => PositionKey::Text(s.clone()),
            Arg::List(items) => PositionKey::List(items.iter().map(Arg::to_key).collect()),
            Arg::Rule(_) => PositionKey::Unsupported("rule"),
        }
    }
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<i32> for Arg {
    fn from(v: i32) -> Self {
        Arg::Int(i64::from(v))
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Text(v.to_string())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Text(v)
    }
}

impl From<PatternRule> for Arg {
    fn from(v: PatternRule) -> Self {
        Arg::Rule(v)
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(v: Vec<Arg>) -> Self {
        Arg::List(v)
    }
}

/// One script line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub verb: String,

    #[serde(default)]
    pub args: Vec<Arg>,

    #[serde(default)]
    pub options: FxHashMap<String, Arg>,
}

impl Declaration {
    /// A declaration with no arguments.
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            args: Vec::new(),
            options: FxHashMap::default(),
        }
    }

    /// Append a positional argument (builder pattern).
    #[must_use]
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set an option (builder pattern).
    #[must_use]
    pub fn option(mut self, name: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Integer argument at `index`.
    pub fn int_arg(&self, index: usize, what: &str) -> Result<i64, ConfigurationError> {
        self.args
            .get(index)
            .and_then(Arg::as_int)
            .ok_or_else(|| self.invalid(format!("argument {index} ({what}) must be an integer")))
    }

    /// Text argument at `index`.
    pub fn text_arg(&self, index: usize, what: &str) -> Result<&str, ConfigurationError> {
        self.args
            .get(index)
            .and_then(Arg::as_text)
            .ok_or_else(|| self.invalid(format!("argument {index} ({what}) must be a string")))
    }

    /// Integer option, if present.
    pub fn int_option(&self, name: &str) -> Result<Option<i64>, ConfigurationError> {
        match self.options.get(name) {
            None => Ok(None),
            Some(arg) => arg
                .as_int()
                .map(Some)
                .ok_or_else(|| self.invalid(format!("option {name} must be an integer"))),
        }
    }

    /// Fail unless there are exactly `count` positional arguments.
    pub fn expect_args(&self, count: usize) -> Result<(), ConfigurationError> {
        if self.args.len() == count {
            Ok(())
        } else {
            Err(self.invalid(format!("expected {count} arguments, got {}", self.args.len())))
        }
    }

    /// An invalid-arguments error for this declaration's verb.
    pub fn invalid(&self, reason: impl Into<String>) -> ConfigurationError {
        ConfigurationError::invalid(&self.verb, reason)
    }
}

/// Ordered list of declarations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    declarations: Vec<Declaration>,
}

impl Script {
    /// Largest storable position, for "sort last" indexes.
    pub const MAX_VALUE: i64 = MAX_VALUE;

    /// An empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the number position.
    #[must_use]
    pub fn number(self) -> Self {
        self.declare(Declaration::new("number"))
    }

    /// Declare a named constant.
    #[must_use]
    pub fn special(self, value: i64, name: &str) -> Self {
        self.declare(Declaration::new("special").arg(value).arg(name))
    }

    /// Declare a named constant with its own sort index.
    #[must_use]
    pub fn special_sorted(self, value: i64, name: &str, sort_index: i64) -> Self {
        self.declare(
            Declaration::new("special")
                .arg(value)
                .arg(name)
                .option("sort_index", sort_index),
        )
    }

    /// Declare a group over previously declared positions.
    #[must_use]
    pub fn group<I, K>(self, value: i64, name: &str, members: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Arg>,
    {
        let members = members.into_iter().map(Into::into).collect::<Vec<Arg>>();
        self.declare(Declaration::new("group").arg(value).arg(name).arg(members))
    }

    /// Declare a pattern.
    #[must_use]
    pub fn pattern(self, value: i64, name: &str, rule: PatternRule) -> Self {
        self.declare(Declaration::new("pattern").arg(value).arg(name).arg(rule))
    }

    /// Append any declaration, e.g. for a caller-registered verb.
    #[must_use]
    pub fn declare(mut self, declaration: Declaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Declarations in order.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Does the script declare anything?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// What a constructor sees while the script runs: configuration, custom
/// predicates, and every position declared so far.
pub struct BuildContext<'a> {
    config: &'a PositionsConfig,
    predicates: &'a PredicateTable,
    index: &'a PositionIndex,
}

impl BuildContext<'_> {
    /// Settings of the registry being built.
    #[must_use]
    pub fn config(&self) -> &PositionsConfig {
        self.config
    }

    /// Predicates available to custom pattern rules.
    #[must_use]
    pub fn predicates(&self) -> &PredicateTable {
        self.predicates
    }

    /// Largest storable position.
    #[must_use]
    pub fn max_value(&self) -> i64 {
        MAX_VALUE
    }

    /// Look up among the positions declared so far.
    pub fn lookup(&self, key: &PositionKey) -> Result<Option<Resolved>, InvalidKeyError> {
        self.index.resolve(key)
    }

    /// Resolve a group's member list. Every member must already be declared.
    pub fn resolve_members(
        &self,
        declaration: &Declaration,
        index: usize,
    ) -> Result<Vec<Arc<Position>>, ConfigurationError> {
        let group = declaration.text_arg(1, "name")?;
        let members = declaration
            .args
            .get(index)
            .and_then(Arg::as_list)
            .ok_or_else(|| declaration.invalid(format!("argument {index} (members) must be a list")))?;

        members
            .iter()
            .map(|member| {
                let key = member.to_key();
                match self.index.resolve_one(&key) {
                    Ok(Some(position)) => Ok(position),
                    Ok(None) => Err(ConfigurationError::UnknownMember {
                        group: group.into(),
                        member: describe(member),
                    }),
                    Err(err) => Err(declaration.invalid(err.to_string())),
                }
            })
            .collect()
    }
}

fn describe(arg: &Arg) -> String {
    match arg {
        Arg::Int(v) => v.to_string(),
        Arg::Text(s) => s.clone(),
        other => format!("{other:?}"),
    }
}

/// Builds one position from a declaration.
pub type Constructor =
    Arc<dyn Fn(&Declaration, &BuildContext<'_>) -> Result<Position, ConfigurationError> + Send + Sync>;

/// Caller-registered verbs.
pub type VerbTable = FxHashMap<String, Constructor>;

type BuiltinConstructor = fn(&Declaration, &BuildContext<'_>) -> Result<Position, ConfigurationError>;

fn builtin(verb: &str) -> Option<BuiltinConstructor> {
    match verb {
        "number" => Some(build_number),
        "special" => Some(build_special),
        "group" => Some(build_group),
        "pattern" => Some(build_pattern),
        _ => None,
    }
}

fn build_number(declaration: &Declaration, ctx: &BuildContext<'_>) -> Result<Position, ConfigurationError> {
    declaration.expect_args(0)?;
    Ok(Position::number(&ctx.config.owner, &ctx.config.number_title))
}

fn build_special(declaration: &Declaration, _ctx: &BuildContext<'_>) -> Result<Position, ConfigurationError> {
    declaration.expect_args(2)?;
    let value = declaration.int_arg(0, "value")?;
    let name = declaration.text_arg(1, "name")?;
    let position = Position::special(value, name);
    Ok(match declaration.int_option("sort_index")? {
        Some(sort_index) => position.with_sort_index(sort_index),
        None => position,
    })
}

fn build_group(declaration: &Declaration, ctx: &BuildContext<'_>) -> Result<Position, ConfigurationError> {
    declaration.expect_args(3)?;
    let value = declaration.int_arg(0, "value")?;
    let name = declaration.text_arg(1, "name")?;
    let members = ctx.resolve_members(declaration, 2)?;
    Ok(Position::group(value, name, members))
}

fn build_pattern(declaration: &Declaration, ctx: &BuildContext<'_>) -> Result<Position, ConfigurationError> {
    declaration.expect_args(3)?;
    let value = declaration.int_arg(0, "value")?;
    let name = declaration.text_arg(1, "name")?;
    let rule = match &declaration.args[2] {
        Arg::Rule(rule) => rule.clone(),
        Arg::Text(rule) => PatternRule::from_name(rule),
        _ => return Err(declaration.invalid("argument 2 (rule) must be a rule or a rule name")),
    };
    Position::pattern(value, name, rule, ctx.predicates)
}

/// Runs a script into a fresh index.
pub(crate) struct Builder<'a> {
    config: &'a PositionsConfig,
    verbs: &'a VerbTable,
    predicates: &'a PredicateTable,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(
        config: &'a PositionsConfig,
        verbs: &'a VerbTable,
        predicates: &'a PredicateTable,
    ) -> Self {
        Self {
            config,
            verbs,
            predicates,
        }
    }

    pub(crate) fn build(&self, script: &Script) -> Result<PositionIndex, ConfigurationError> {
        let mut index = PositionIndex::default();
        for declaration in script.declarations() {
            let position = {
                let ctx = BuildContext {
                    config: self.config,
                    predicates: self.predicates,
                    index: &index,
                };
                self.construct(declaration, &ctx)?
            };
            index.insert(position)?;
        }
        Ok(index)
    }

    fn construct(
        &self,
        declaration: &Declaration,
        ctx: &BuildContext<'_>,
    ) -> Result<Position, ConfigurationError> {
        if let Some(constructor) = self.verbs.get(&declaration.verb) {
            return constructor(declaration, ctx);
        }
        match builtin(&declaration.verb) {
            Some(constructor) => constructor(declaration, ctx),
            None => Err(ConfigurationError::UnknownVerb(declaration.verb.clone())),
        }
    }
}
