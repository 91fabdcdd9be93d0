//! pmatch-test: Reference matchables for conformance testing
//!
//! Provides the everyday pattern vocabulary built on the [`Matchable`] seam:
//! wildcards, captures, optional fields, guards, unions, negation, regex and
//! type checks. This is the reference extension that demonstrates how to build
//! pmatch extensions.
//!
//! # Example
//!
//! ```
//! use pmatch_test::prelude::*;
//!
//! // { kind: "circle", radius: select("r"), label: optional(any) }
//! let pattern = Pattern::record([
//!     ("kind", Pattern::from("circle")),
//!     ("radius", select("r")),
//!     ("label", optional(any())),
//! ]);
//!
//! let value = Value::record([("kind", Value::from("circle")), ("radius", Value::from(2))]);
//! let selection = pattern.select(&value).unwrap();
//! assert_eq!(selection.get("r"), Some(&Value::from(2)));
//! ```

use pmatch::prelude::*;


// ═══════════════════════════════════════════════════════════════════════════════
// Any
// ═══════════════════════════════════════════════════════════════════════════════

/// Wildcard: matches every value, `Undefined` included. Captures nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Any;

impl Matchable for Any {
    fn matchable_type(&self) -> &str {
        "any"
    }

    fn predicate(&self, _value: &Value) -> bool {
        true
    }
}

/// A wildcard pattern node.
#[must_use]
pub fn any() -> Pattern {
    Pattern::matchable(Any)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Select
// ═══════════════════════════════════════════════════════════════════════════════

/// Captures the value under `name`, optionally constrained by an inner pattern.
///
/// Emits its own capture first, then whatever the inner pattern emits. Both
/// are emitted even when the inner pattern fails to match.
#[derive(Debug, Clone)]
pub struct Select {
    name: String,
    inner: Option<Pattern>,
}

impl Select {
    /// Capture any value under `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: None,
        }
    }

    /// Capture under `name` only values matching `inner`.
    pub fn with_pattern(name: impl Into<String>, inner: Pattern) -> Self {
        Self {
            name: name.into(),
            inner: Some(inner),
        }
    }

    /// The capture name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Matchable for Select {
    fn matchable_type(&self) -> &str {
        "select"
    }

    fn predicate(&self, value: &Value) -> bool {
        self.inner.as_ref().map_or(true, |p| p.test(value))
    }

    fn selector(&self, value: &Value) -> Selection {
        let mut selection = Selection::new().with(self.name.clone(), value.clone());
        if let Some(inner) = &self.inner {
            inner.select_into(value, &mut selection);
        }
        selection
    }
}

/// Capture any value under `name`.
pub fn select(name: impl Into<String>) -> Pattern {
    Pattern::matchable(Select::new(name))
}

/// Capture under `name` a value that must also match `inner`.
pub fn select_with(name: impl Into<String>, inner: Pattern) -> Pattern {
    Pattern::matchable(Select::with_pattern(name, inner))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Optional
// ═══════════════════════════════════════════════════════════════════════════════

/// Matches `Undefined` (an absent field) or a value matching the inner pattern.
///
/// Tagged [`OPTIONAL`], so a record pattern does not fail when the field is
/// missing. Emits nothing for `Undefined`; otherwise emits the inner captures.
#[derive(Debug, Clone)]
pub struct Optional {
    inner: Pattern,
}

impl Optional {
    /// Wrap `inner` as optional.
    #[must_use]
    pub fn new(inner: Pattern) -> Self {
        Self { inner }
    }
}

impl Matchable for Optional {
    fn matchable_type(&self) -> &str {
        OPTIONAL
    }

    fn predicate(&self, value: &Value) -> bool {
        value.is_undefined() || self.inner.test(value)
    }

    fn selector(&self, value: &Value) -> Selection {
        let mut selection = Selection::new();
        if !value.is_undefined() {
            self.inner.select_into(value, &mut selection);
        }
        selection
    }
}

/// Make `inner` optional.
#[must_use]
pub fn optional(inner: Pattern) -> Pattern {
    Pattern::matchable(Optional::new(inner))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Guard
// ═══════════════════════════════════════════════════════════════════════════════

/// A predicate-only node built from a closure.
///
/// ```
/// use pmatch_test::prelude::*;
///
/// let positive = guard(|v| v.as_number().is_some_and(|n| n > 0.0));
/// assert!(positive.test(&Value::from(1)));
/// assert!(!positive.test(&Value::from("1")));
/// ```
pub fn guard<F>(predicate: F) -> Pattern
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Pattern::matchable(CustomMatchable::new("guard", predicate))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Union
// ═══════════════════════════════════════════════════════════════════════════════

/// Matches if any alternative matches. Captures come from the first match only.
#[derive(Debug, Clone)]
pub struct Union {
    alternatives: Vec<Pattern>,
}

impl Union {
    /// Build a union. An empty union matches nothing.
    #[must_use]
    pub fn new(alternatives: Vec<Pattern>) -> Self {
        Self { alternatives }
    }
}

impl Matchable for Union {
    fn matchable_type(&self) -> &str {
        "union"
    }

    fn predicate(&self, value: &Value) -> bool {
        self.alternatives.iter().any(|p| p.test(value))
    }

    fn selector(&self, value: &Value) -> Selection {
        self.alternatives
            .iter()
            .find_map(|p| p.select(value))
            .unwrap_or_default()
    }
}

/// Match any of `alternatives`.
pub fn union<I, P>(alternatives: I) -> Pattern
where
    I: IntoIterator<Item = P>,
    P: Into<Pattern>,
{
    Pattern::matchable(Union::new(
        alternatives.into_iter().map(Into::into).collect(),
    ))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Not
// ═══════════════════════════════════════════════════════════════════════════════

/// Matches values the inner pattern rejects. Captures nothing.
#[derive(Debug, Clone)]
pub struct Not {
    inner: Pattern,
}

impl Not {
    /// Negate `inner`.
    #[must_use]
    pub fn new(inner: Pattern) -> Self {
        Self { inner }
    }
}

impl Matchable for Not {
    fn matchable_type(&self) -> &str {
        "not"
    }

    fn predicate(&self, value: &Value) -> bool {
        !self.inner.test(value)
    }
}

/// Negate `inner`.
#[must_use]
pub fn not(inner: Pattern) -> Pattern {
    Pattern::matchable(Not::new(inner))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Regex
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum regex source length accepted by [`Regex::new`].
pub const MAX_REGEX_LENGTH: usize = 4096;

/// Matches strings the regex finds a match in. Non-strings never match.
///
/// Uses the `regex` crate (linear time, RE2 semantics), so no input can
/// trigger catastrophic backtracking.
#[derive(Debug, Clone)]
pub struct Regex {
    regex: regex::Regex,
}

impl Regex {
    /// Compile a regex node.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidPattern`] if the source is longer than
    /// [`MAX_REGEX_LENGTH`] or fails to compile.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        if pattern.len() > MAX_REGEX_LENGTH {
            return Err(PatternError::InvalidPattern {
                pattern: pattern.chars().take(64).collect(),
                reason: format!(
                    "regex is {} bytes, but maximum allowed is {MAX_REGEX_LENGTH}",
                    pattern.len()
                ),
            });
        }
        let regex = regex::Regex::new(pattern).map_err(|e| PatternError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    /// The regex source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Matchable for Regex {
    fn matchable_type(&self) -> &str {
        "regex"
    }

    fn predicate(&self, value: &Value) -> bool {
        value.as_str().is_some_and(|s| self.regex.is_match(s))
    }
}

/// Match strings against a regex.
///
/// # Errors
///
/// Returns [`PatternError::InvalidPattern`] if the regex is invalid.
pub fn regex(pattern: &str) -> Result<Pattern, PatternError> {
    Ok(Pattern::matchable(Regex::new(pattern)?))
}

// ═══════════════════════════════════════════════════════════════════════════════
// TypeOf
// ═══════════════════════════════════════════════════════════════════════════════

/// Matches values whose [`Value::type_name`] equals the given kind.
#[derive(Debug, Clone)]
pub struct TypeOf {
    kind: String,
}

impl TypeOf {
    /// Match values of `kind` (`"string"`, `"number"`, `"record"`, ...).
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

impl Matchable for TypeOf {
    fn matchable_type(&self) -> &str {
        "type_of"
    }

    fn predicate(&self, value: &Value) -> bool {
        value.type_name() == self.kind
    }
}

/// Match values of the given kind.
pub fn type_of(kind: impl Into<String>) -> Pattern {
    Pattern::matchable(TypeOf::new(kind))
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        any, guard, not, optional, regex, select, select_with, type_of, union, Any, Not,
        Optional, Regex, Select, TypeOf, Union,
    };
    pub use pmatch::prelude::*;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry support (feature = "registry")
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "registry")]
mod configs {
    use super::*;
    use pmatch::{IntoMatchable, PatternConfig, Registry, UnitConfig, MAX_ELEMENTS};
    use serde::Deserialize;
    use std::sync::Arc;

    /// Configuration for [`Select`].
    #[derive(Debug, Deserialize)]
    pub struct SelectConfig {
        /// The capture name.
        pub name: String,
        /// Optional constraint on the captured value.
        #[serde(default)]
        pub pattern: Option<PatternConfig>,
    }

    /// Configuration for [`Optional`]. A missing `pattern` means any value.
    #[derive(Debug, Deserialize)]
    pub struct OptionalConfig {
        /// The wrapped pattern.
        #[serde(default)]
        pub pattern: Option<PatternConfig>,
    }

    /// Configuration for [`Union`].
    #[derive(Debug, Deserialize)]
    pub struct UnionConfig {
        /// Alternatives, tried in order.
        pub patterns: Vec<PatternConfig>,
    }

    /// Configuration for [`Not`].
    #[derive(Debug, Deserialize)]
    pub struct NotConfig {
        /// The negated pattern.
        pub pattern: PatternConfig,
    }

    /// Configuration for [`Regex`].
    #[derive(Debug, Deserialize)]
    pub struct RegexConfig {
        /// The regex source.
        pub pattern: String,
    }

    /// Configuration for [`TypeOf`].
    #[derive(Debug, Deserialize)]
    pub struct TypeOfConfig {
        /// The expected [`Value::type_name`].
        pub kind: String,
    }

    impl IntoMatchable for Any {
        type Config = UnitConfig;

        fn from_config(_: UnitConfig, _: &Registry) -> Result<Arc<dyn Matchable>, PatternError> {
            Ok(Arc::new(Any))
        }
    }

    impl IntoMatchable for Select {
        type Config = SelectConfig;

        fn from_config(
            config: SelectConfig,
            registry: &Registry,
        ) -> Result<Arc<dyn Matchable>, PatternError> {
            if config.name.is_empty() {
                return Err(PatternError::InvalidConfig {
                    reason: "select name must not be empty".into(),
                });
            }
            let inner = config
                .pattern
                .map(|p| registry.load_pattern(p))
                .transpose()?;
            Ok(Arc::new(Select {
                name: config.name,
                inner,
            }))
        }
    }

    impl IntoMatchable for Optional {
        type Config = OptionalConfig;

        fn from_config(
            config: OptionalConfig,
            registry: &Registry,
        ) -> Result<Arc<dyn Matchable>, PatternError> {
            let inner = match config.pattern {
                Some(p) => registry.load_pattern(p)?,
                None => any(),
            };
            Ok(Arc::new(Optional::new(inner)))
        }
    }

    impl IntoMatchable for Union {
        type Config = UnionConfig;

        fn from_config(
            config: UnionConfig,
            registry: &Registry,
        ) -> Result<Arc<dyn Matchable>, PatternError> {
            if config.patterns.len() > MAX_ELEMENTS {
                return Err(PatternError::TooManyElements {
                    count: config.patterns.len(),
                    max: MAX_ELEMENTS,
                });
            }
            let alternatives = config
                .patterns
                .into_iter()
                .map(|p| registry.load_pattern(p))
                .collect::<Result<_, _>>()?;
            Ok(Arc::new(Union::new(alternatives)))
        }
    }

    impl IntoMatchable for Not {
        type Config = NotConfig;

        fn from_config(
            config: NotConfig,
            registry: &Registry,
        ) -> Result<Arc<dyn Matchable>, PatternError> {
            Ok(Arc::new(Not::new(registry.load_pattern(config.pattern)?)))
        }
    }

    impl IntoMatchable for Regex {
        type Config = RegexConfig;

        fn from_config(config: RegexConfig, _: &Registry) -> Result<Arc<dyn Matchable>, PatternError> {
            Ok(Arc::new(Regex::new(&config.pattern)?))
        }
    }

    impl IntoMatchable for TypeOf {
        type Config = TypeOfConfig;

        fn from_config(config: TypeOfConfig, _: &Registry) -> Result<Arc<dyn Matchable>, PatternError> {
            if config.kind.is_empty() {
                return Err(PatternError::InvalidConfig {
                    reason: "type_of kind must not be empty".into(),
                });
            }
            Ok(Arc::new(TypeOf::new(config.kind)))
        }
    }
}

#[cfg(feature = "registry")]
pub use configs::{NotConfig, OptionalConfig, RegexConfig, SelectConfig, TypeOfConfig, UnionConfig};

/// Register all pmatch-test matchables with the given builder.
///
/// - `pmatch.test.v1.Any` → [`Any`]
/// - `pmatch.test.v1.Select` → [`Select`]
/// - `pmatch.test.v1.Optional` → [`Optional`]
/// - `pmatch.test.v1.Union` → [`Union`]
/// - `pmatch.test.v1.Not` → [`Not`]
/// - `pmatch.test.v1.Regex` → [`Regex`]
/// - `pmatch.test.v1.TypeOf` → [`TypeOf`]
#[cfg(feature = "registry")]
#[must_use]
pub fn register(builder: pmatch::RegistryBuilder) -> pmatch::RegistryBuilder {
    builder
        .matchable::<Any>("pmatch.test.v1.Any")
        .matchable::<Select>("pmatch.test.v1.Select")
        .matchable::<Optional>("pmatch.test.v1.Optional")
        .matchable::<Union>("pmatch.test.v1.Union")
        .matchable::<Not>("pmatch.test.v1.Not")
        .matchable::<Regex>("pmatch.test.v1.Regex")
        .matchable::<TypeOf>("pmatch.test.v1.TypeOf")
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use pretty_assertions::assert_eq;

    fn capture(name: &str, value: impl Into<Value>) -> (String, Value) {
        (name.to_string(), value.into())
    }

    fn emitted(pattern: &Pattern, value: &Value) -> (bool, Vec<(String, Value)>) {
        let mut out = Vec::new();
        let matched = pattern.matches(value, &mut |n: &str, v: &Value| {
            out.push((n.to_string(), v.clone()));
        });
        (matched, out)
    }

    #[test]
    fn test_any_matches_everything() {
        for v in [
            Value::Undefined,
            Value::Null,
            Value::from(1),
            Value::sequence([1, 2]),
            Value::record([("a", 1)]),
        ] {
            assert!(any().test(&v));
        }
        assert!(emitted(&any(), &Value::from(1)).1.is_empty());
    }

    #[test]
    fn test_select_captures() {
        let (matched, captured) = emitted(&select("x"), &Value::from("hi"));
        assert!(matched);
        assert_eq!(captured, vec![capture("x", "hi")]);
    }

    #[test]
    fn test_select_with_inner_emits_own_name_first() {
        let pattern = select_with("pair", Pattern::sequence([select("l"), select("r")]));
        let (matched, captured) = emitted(&pattern, &Value::sequence([1, 2]));
        assert!(matched);
        assert_eq!(
            captured,
            vec![
                capture("pair", Value::sequence([1, 2])),
                capture("l", 1),
                capture("r", 2),
            ]
        );
    }

    #[test]
    fn test_select_emits_even_when_inner_fails() {
        let pattern = select_with("n", Pattern::from(1));
        let (matched, captured) = emitted(&pattern, &Value::from(2));
        assert!(!matched);
        assert_eq!(captured, vec![capture("n", 2)]);
        assert_eq!(pattern.select(&Value::from(2)), None);
    }

    #[test]
    fn test_optional_field() {
        let pattern = Pattern::record([("a", optional(select("a")))]);

        let (matched, captured) = emitted(&pattern, &Value::record([("b", 1)]));
        assert!(matched);
        assert!(captured.is_empty());

        let (matched, captured) = emitted(&pattern, &Value::record([("a", 1)]));
        assert!(matched);
        assert_eq!(captured, vec![capture("a", 1)]);
    }

    #[test]
    fn test_optional_rejects_mismatched_present_value() {
        let pattern = Pattern::record([("a", optional(Pattern::from("x")))]);
        assert!(pattern.test(&Value::record(Vec::<(String, Value)>::new())));
        assert!(pattern.test(&Value::record([("a", "x")])));
        assert!(!pattern.test(&Value::record([("a", "y")])));
    }

    #[test]
    fn test_non_optional_wildcard_requires_field() {
        let pattern = Pattern::record([("a", any())]);
        assert!(!pattern.test(&Value::record(Vec::<(String, Value)>::new())));
    }

    #[test]
    fn test_guard() {
        let even = guard(|v| v.as_number().is_some_and(|n| n % 2.0 == 0.0));
        assert!(even.test(&Value::from(4)));
        assert!(!even.test(&Value::from(3)));
        assert_eq!(even.as_matchable().map(|m| m.matchable_type()), Some("guard"));
    }

    #[test]
    fn test_union_first_match_captures() {
        let pattern = union([
            Pattern::record([("circle", select("r"))]),
            Pattern::record([("square", select("side"))]),
        ]);

        assert_eq!(
            pattern.select(&Value::record([("square", 3)])),
            Some(Selection::new().with("side", 3))
        );
        assert!(!pattern.test(&Value::record([("triangle", 1)])));
        assert!(!union(Vec::<Pattern>::new()).test(&Value::Null));
    }

    #[test]
    fn test_not() {
        let pattern = not(Pattern::from("admin"));
        assert!(pattern.test(&Value::from("guest")));
        assert!(!pattern.test(&Value::from("admin")));
    }

    #[test]
    fn test_regex() {
        let pattern = regex(r"^/api/v\d+/").unwrap();
        assert!(pattern.test(&Value::from("/api/v2/users")));
        assert!(!pattern.test(&Value::from("/web")));
        assert!(!pattern.test(&Value::from(2)));
    }

    #[test]
    fn test_invalid_regex() {
        let err = regex("(unclosed").unwrap_err();
        assert!(matches!(err, PatternError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_regex_too_long() {
        let source = "a".repeat(super::MAX_REGEX_LENGTH + 1);
        assert!(matches!(
            Regex::new(&source),
            Err(PatternError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_type_of() {
        assert!(type_of("string").test(&Value::from("x")));
        assert!(type_of("record").test(&Value::record([("a", 1)])));
        assert!(!type_of("number").test(&Value::from("1")));
        assert!(type_of("undefined").test(&Value::Undefined));
    }

    #[test]
    fn test_singleton_set_with_select() {
        let pattern = Pattern::set([select("only")]);
        assert_eq!(
            pattern.select(&Value::set(["x"])),
            Some(Selection::new().with("only", "x"))
        );
        assert_eq!(pattern.select(&Value::set(["x", "y"])), None);
    }
}

#[cfg(all(test, feature = "registry"))]
mod registry_tests {
    use super::*;
    use pmatch::{PatternConfig, RegistryBuilder};
    use serde_json::json;

    fn load(json: serde_json::Value) -> Result<Pattern, PatternError> {
        let registry = register(RegistryBuilder::new()).build();
        let config: PatternConfig = serde_json::from_value(json).unwrap();
        registry.load_pattern(config)
    }

    #[test]
    fn register_adds_all_types() {
        let registry = register(RegistryBuilder::new()).build();
        assert_eq!(registry.len(), 7);
        assert_eq!(
            registry.type_names(),
            vec![
                "pmatch.test.v1.Any",
                "pmatch.test.v1.Not",
                "pmatch.test.v1.Optional",
                "pmatch.test.v1.Regex",
                "pmatch.test.v1.Select",
                "pmatch.test.v1.TypeOf",
                "pmatch.test.v1.Union",
            ]
        );
    }

    #[test]
    fn load_select_with_regex() {
        let pattern = load(json!({
            "type": "matchable",
            "type_name": "pmatch.test.v1.Select",
            "config": {
                "name": "path",
                "pattern": {
                    "type": "matchable",
                    "type_name": "pmatch.test.v1.Regex",
                    "config": { "pattern": "^/api/" }
                }
            }
        }))
        .unwrap();

        assert_eq!(
            pattern.select(&Value::from("/api/x")),
            Some(Selection::new().with("path", "/api/x"))
        );
        assert_eq!(pattern.select(&Value::from("/web")), None);
    }

    #[test]
    fn load_optional_without_pattern_is_any() {
        let pattern = load(json!({
            "type": "record",
            "fields": [{
                "name": "a",
                "pattern": { "type": "matchable", "type_name": "pmatch.test.v1.Optional" }
            }]
        }))
        .unwrap();

        assert!(pattern.test(&Value::record([("b", 1)])));
        assert!(pattern.test(&Value::record([("a", 1)])));
    }

    #[test]
    fn load_invalid_regex() {
        let err = load(json!({
            "type": "matchable",
            "type_name": "pmatch.test.v1.Regex",
            "config": { "pattern": "[" }
        }))
        .unwrap_err();
        assert!(matches!(err, PatternError::InvalidPattern { .. }));
    }

    #[test]
    fn load_empty_select_name() {
        let err = load(json!({
            "type": "matchable",
            "type_name": "pmatch.test.v1.Select",
            "config": { "name": "" }
        }))
        .unwrap_err();
        assert!(matches!(err, PatternError::InvalidConfig { .. }));
    }
}
