//! Config types for declarative pattern construction.
//!
//! These types mirror [`Value`] and [`Pattern`](crate::Pattern) but are
//! serde-deserializable, enabling config-driven pattern construction via
//! [`Registry::load_pattern()`](crate::Registry::load_pattern).
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime type | Loader method |
//! |-------------|-------------|---------------|
//! | [`ValueConfig`] | [`Value`] | `Registry::load_value()` |
//! | [`PatternConfig`] | [`Pattern`](crate::Pattern) | `Registry::load_pattern()` |
//! | [`MatchableConfig`] | `Arc<dyn Matchable>` | via registry factory |
//!
//! Both trees use `#[serde(tag = "type")]` discriminated unions:
//!
//! ```json
//! { "type": "record", "fields": [
//!     { "name": "kind", "pattern": { "type": "literal", "value": { "type": "string", "value": "circle" } } },
//!     { "name": "r", "pattern": { "type": "matchable", "type_name": "pmatch.test.v1.Any" } }
//! ] }
//! ```

use crate::{PatternError, Record, Value, ValueMap, ValueSet, MAX_ELEMENTS};
use serde::Deserialize;

/// Configuration for a [`Value`].
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueConfig {
    /// `Value::Undefined`.
    Undefined,
    /// `Value::Null`.
    Null,
    /// A boolean.
    Bool {
        /// The boolean.
        value: bool,
    },
    /// A number. Non-finite values and `-0` are spelled as strings.
    Number {
        /// The number.
        value: NumberConfig,
    },
    /// A string.
    String {
        /// The string.
        value: String,
    },
    /// Raw bytes, as a list of octets.
    Bytes {
        /// The bytes.
        value: Vec<u8>,
    },
    /// An ordered sequence.
    Sequence {
        /// Elements in order.
        #[serde(default)]
        items: Vec<ValueConfig>,
    },
    /// A key/value map.
    Map {
        /// Entries in order.
        #[serde(default)]
        entries: Vec<MapEntryConfig>,
    },
    /// A set. Duplicates are dropped.
    Set {
        /// Elements in order.
        #[serde(default)]
        items: Vec<ValueConfig>,
    },
    /// A string-keyed record.
    Record {
        /// Fields in order.
        #[serde(default)]
        fields: Vec<FieldConfig>,
    },
}

/// A number written either as a JSON number or as one of the strings
/// `"NaN"`, `"Infinity"`, `"-Infinity"`, `"-0"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberConfig {
    /// A plain JSON number.
    Plain(f64),
    /// A spelled-out special value.
    Named(String),
}

impl NumberConfig {
    /// Resolve to an `f64`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidConfig`] for an unrecognized spelling.
    pub fn to_f64(&self) -> Result<f64, PatternError> {
        match self {
            Self::Plain(n) => Ok(*n),
            Self::Named(name) => match name.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                "-0" => Ok(-0.0),
                other => Err(PatternError::InvalidConfig {
                    reason: format!(
                        "unrecognized number \"{other}\" (expected a number, \"NaN\", \"Infinity\", \"-Infinity\" or \"-0\")"
                    ),
                }),
            },
        }
    }
}

/// One entry of a [`ValueConfig::Map`].
#[derive(Debug, Clone, Deserialize)]
pub struct MapEntryConfig {
    /// The key.
    pub key: ValueConfig,
    /// The value.
    pub value: ValueConfig,
}

/// One field of a [`ValueConfig::Record`].
#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    /// The field name.
    pub name: String,
    /// The field value.
    pub value: ValueConfig,
}

impl ValueConfig {
    /// Build the runtime [`Value`].
    ///
    /// # Errors
    ///
    /// - [`PatternError::TooManyElements`] if a container exceeds [`MAX_ELEMENTS`]
    /// - [`PatternError::InvalidConfig`] for an unrecognized number spelling
    pub fn into_value(self) -> Result<Value, PatternError> {
        Ok(match self {
            Self::Undefined => Value::Undefined,
            Self::Null => Value::Null,
            Self::Bool { value } => Value::Bool(value),
            Self::Number { value } => Value::Number(value.to_f64()?),
            Self::String { value } => Value::String(value),
            Self::Bytes { value } => Value::Bytes(value),
            Self::Sequence { items } => {
                check_width(items.len())?;
                Value::Sequence(
                    items
                        .into_iter()
                        .map(Self::into_value)
                        .collect::<Result<_, _>>()?,
                )
            }
            Self::Map { entries } => {
                check_width(entries.len())?;
                let mut map = ValueMap::new();
                for entry in entries {
                    map.insert(entry.key.into_value()?, entry.value.into_value()?);
                }
                Value::Map(map)
            }
            Self::Set { items } => {
                check_width(items.len())?;
                let mut set = ValueSet::new();
                for item in items {
                    set.insert(item.into_value()?);
                }
                Value::Set(set)
            }
            Self::Record { fields } => {
                check_width(fields.len())?;
                let mut record = Record::new();
                for field in fields {
                    record.insert(field.name, field.value.into_value()?);
                }
                Value::Record(record)
            }
        })
    }
}

/// Configuration for a [`Pattern`](crate::Pattern).
///
/// A `literal` holding a container value stays a literal: it compares by
/// deep same-value equality rather than partially.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternConfig {
    /// Same-value equality against a value.
    Literal {
        /// The expected value.
        value: ValueConfig,
    },
    /// Fixed-length positional pattern.
    Sequence {
        /// Sub-patterns in order.
        #[serde(default)]
        items: Vec<PatternConfig>,
    },
    /// Partial map pattern.
    Map {
        /// Required keys and their sub-patterns.
        #[serde(default)]
        entries: Vec<MapPatternEntryConfig>,
    },
    /// Set pattern.
    Set {
        /// Members.
        #[serde(default)]
        items: Vec<PatternConfig>,
    },
    /// Partial record pattern.
    Record {
        /// Declared fields and their sub-patterns.
        #[serde(default)]
        fields: Vec<FieldPatternConfig>,
    },
    /// A registered matchable, resolved by type name.
    Matchable(MatchableConfig),
}

/// One entry of a [`PatternConfig::Map`].
#[derive(Debug, Clone, Deserialize)]
pub struct MapPatternEntryConfig {
    /// The key to look up.
    pub key: ValueConfig,
    /// Pattern for the looked-up value.
    pub pattern: PatternConfig,
}

/// One field of a [`PatternConfig::Record`].
#[derive(Debug, Clone, Deserialize)]
pub struct FieldPatternConfig {
    /// The field name.
    pub name: String,
    /// Pattern for the field's value.
    pub pattern: PatternConfig,
}

/// Reference to a registered matchable type with its configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchableConfig {
    /// The registered type name, e.g. `"pmatch.test.v1.Select"`.
    pub type_name: String,

    /// Type-specific configuration payload.
    /// Deserialized as the `Config` associated type of the registered
    /// [`IntoMatchable`](crate::IntoMatchable).
    #[serde(default = "default_config")]
    pub config: serde_json::Value,
}

fn default_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Empty configuration for matchables that need no parameters.
///
/// Accepts any JSON value (`{}`, `null`, etc.) and ignores it.
#[derive(Debug, Clone, Copy)]
pub struct UnitConfig;

impl<'de> Deserialize<'de> for UnitConfig {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(UnitConfig)
    }
}

pub(crate) fn check_width(count: usize) -> Result<(), PatternError> {
    if count > MAX_ELEMENTS {
        tracing::debug!(count, max = MAX_ELEMENTS, "config rejected: too many elements");
        return Err(PatternError::TooManyElements {
            count,
            max: MAX_ELEMENTS,
        });
    }
    Ok(())
}
