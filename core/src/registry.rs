//! Type registry for config-driven pattern construction.
//!
//! The registry enables **generic config loading**: JSON/YAML config -> [`Pattern`]
//! without hand-written construction code.
//!
//! # Architecture (axum `BoxedIntoRoute` pattern)
//!
//! Each `Matchable` type registers itself via [`IntoMatchable`]. At registration
//! time, the concrete type `T` is monomorphized into a closure and erased behind
//! `Box<dyn Fn>`. Early type erasure at registration, late invocation at load time.
//!
//! Structural nodes (literal, sequence, map, set, record) need no registration:
//! the registry builds them directly. Only `matchable` nodes are resolved by name.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pmatch::{
//!     CustomMatchable, IntoMatchable, Matchable, PatternConfig, PatternError, Registry,
//!     RegistryBuilder, UnitConfig, Value,
//! };
//!
//! struct Anything;
//!
//! impl IntoMatchable for Anything {
//!     type Config = UnitConfig;
//!
//!     fn from_config(_: UnitConfig, _: &Registry) -> Result<Arc<dyn Matchable>, PatternError> {
//!         Ok(Arc::new(CustomMatchable::new("any", |_| true)))
//!     }
//! }
//!
//! let registry = RegistryBuilder::new()
//!     .matchable::<Anything>("example.Any")
//!     .build();
//!
//! let config: PatternConfig = serde_json::from_str(r#"{
//!     "type": "sequence",
//!     "items": [
//!         { "type": "literal", "value": { "type": "number", "value": 1 } },
//!         { "type": "matchable", "type_name": "example.Any" }
//!     ]
//! }"#).unwrap();
//!
//! let pattern = registry.load_pattern(config).unwrap();
//! assert!(pattern.test(&Value::sequence([1, 99])));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::{check_width, MatchableConfig, PatternConfig, ValueConfig};
use crate::{Matchable, Pattern, PatternError, Value};

// ═══════════════════════════════════════════════════════════════════════════════
// Trait
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait for `Matchable` types that can be constructed from configuration.
///
/// Each type knows its own config shape via the associated `Config` type.
/// The registry calls [`from_config`](Self::from_config) at load time.
///
/// The registry is passed in so wrapping matchables (`select`, `optional`,
/// unions) can load the sub-patterns they carry.
pub trait IntoMatchable: Send + Sync + 'static {
    /// The configuration type deserialized from JSON/YAML.
    type Config: DeserializeOwned + Send + Sync;

    /// Construct a matchable from deserialized configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidConfig`] if the config is semantically invalid,
    /// or any error from loading nested patterns through `registry`.
    fn from_config(
        config: Self::Config,
        registry: &Registry,
    ) -> Result<Arc<dyn Matchable>, PatternError>;
}

/// Type-erased matchable factory closure.
type BoxedMatchableFactory = Box<
    dyn Fn(&serde_json::Value, &Registry) -> Result<Arc<dyn Matchable>, PatternError>
        + Send
        + Sync,
>;

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`Registry`].
///
/// Register `Matchable` types with their type names, then call
/// [`build()`](Self::build) to produce an immutable `Registry`.
/// No runtime registration is possible after that.
pub struct RegistryBuilder {
    factories: HashMap<String, BoxedMatchableFactory>,
}

impl RegistryBuilder {
    /// Create a new empty registry builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a `Matchable` type under a type name.
    ///
    /// At load time, the registry deserializes config as `T::Config` and calls
    /// `T::from_config()`. Registering the same name twice keeps the later type.
    #[must_use]
    pub fn matchable<T: IntoMatchable>(mut self, type_name: &str) -> Self {
        self.factories.insert(
            type_name.to_owned(),
            Box::new(|value: &serde_json::Value, registry: &Registry| {
                let config: T::Config = serde_json::from_value(value.clone()).map_err(|e| {
                    PatternError::InvalidConfig {
                        reason: e.to_string(),
                    }
                })?;
                T::from_config(config, registry)
            }),
        );
        self
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> Registry {
        Registry {
            factories: self.factories,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("matchables", &sorted_names(&self.factories))
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable registry of `Matchable` factories.
///
/// Constructed via [`RegistryBuilder`]. Use [`load_pattern()`](Self::load_pattern)
/// to turn config into a runtime `Pattern`.
pub struct Registry {
    factories: HashMap<String, BoxedMatchableFactory>,
}

impl Registry {
    /// Load a `Pattern` from configuration.
    ///
    /// Walks the config tree, builds structural nodes directly, constructs
    /// matchables via registered factories, then validates depth.
    ///
    /// # Errors
    ///
    /// - [`PatternError::UnknownMatchableType`] — `type_name` not registered
    /// - [`PatternError::InvalidConfig`] — config deserialization or construction failed
    /// - [`PatternError::InvalidPattern`] — a matchable rejected its textual pattern
    /// - [`PatternError::TooManyElements`] — a container exceeds [`MAX_ELEMENTS`](crate::MAX_ELEMENTS)
    /// - [`PatternError::DepthExceeded`] — nesting exceeds [`MAX_DEPTH`](crate::MAX_DEPTH)
    pub fn load_pattern(&self, config: PatternConfig) -> Result<Pattern, PatternError> {
        let pattern = self.build_pattern(config)?;
        pattern.validate()?;
        Ok(pattern)
    }

    /// Load a `Value` from configuration.
    ///
    /// # Errors
    ///
    /// - [`PatternError::TooManyElements`] — a container exceeds [`MAX_ELEMENTS`](crate::MAX_ELEMENTS)
    /// - [`PatternError::InvalidConfig`] — an unrecognized number spelling
    pub fn load_value(&self, config: ValueConfig) -> Result<Value, PatternError> {
        config.into_value()
    }

    /// Returns the number of registered matchable types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no matchable types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns `true` if the given type name is registered.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Returns the registered type names, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        sorted_names(&self.factories)
    }

    fn build_pattern(&self, config: PatternConfig) -> Result<Pattern, PatternError> {
        Ok(match config {
            PatternConfig::Literal { value } => Pattern::Literal(value.into_value()?),
            PatternConfig::Sequence { items } => {
                check_width(items.len())?;
                Pattern::Sequence(self.build_all(items)?)
            }
            PatternConfig::Set { items } => {
                check_width(items.len())?;
                Pattern::Set(self.build_all(items)?)
            }
            PatternConfig::Map { entries } => {
                check_width(entries.len())?;
                let mut built = Vec::with_capacity(entries.len());
                for entry in entries {
                    built.push((entry.key.into_value()?, self.build_pattern(entry.pattern)?));
                }
                Pattern::map(built)
            }
            PatternConfig::Record { fields } => {
                check_width(fields.len())?;
                let mut built = Vec::with_capacity(fields.len());
                for field in fields {
                    built.push((field.name, self.build_pattern(field.pattern)?));
                }
                Pattern::record(built)
            }
            PatternConfig::Matchable(config) => Pattern::Matchable(self.build_matchable(config)?),
        })
    }

    fn build_all(&self, items: Vec<PatternConfig>) -> Result<Vec<Pattern>, PatternError> {
        items
            .into_iter()
            .map(|item| self.build_pattern(item))
            .collect()
    }

    fn build_matchable(&self, config: MatchableConfig) -> Result<Arc<dyn Matchable>, PatternError> {
        let Some(factory) = self.factories.get(&config.type_name) else {
            tracing::debug!(type_name = %config.type_name, "unknown matchable type");
            return Err(PatternError::UnknownMatchableType {
                type_name: config.type_name,
                available: self.type_names().into_iter().map(String::from).collect(),
            });
        };
        let matchable = factory(&config.config, self).inspect_err(|err| {
            tracing::debug!(type_name = %config.type_name, error = %err, "matchable construction failed");
        })?;
        tracing::debug!(
            type_name = %config.type_name,
            matchable_type = matchable.matchable_type(),
            "constructed matchable"
        );
        Ok(matchable)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("matchables", &self.type_names())
            .finish()
    }
}

fn sorted_names(factories: &HashMap<String, BoxedMatchableFactory>) -> Vec<&str> {
    let mut names: Vec<&str> = factories.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}
