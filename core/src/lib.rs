//! pmatch - structural pattern matching over dynamic values
//!
//! Tests a runtime [`Value`] against a declaratively built [`Pattern`] tree
//! and, on success, extracts named sub-values ("captures").
//!
//! # Architecture
//!
//! - [`Value`] — Closed data model: primitives + containers (sequence, map, set, record)
//! - [`Pattern`] — Closed shape vocabulary mirroring `Value`, plus opaque [`Matchable`] nodes
//! - [`Matchable`] — Extension protocol: a node supplies its own predicate and selector
//! - [`matches`] — The engine: single-pass, top-down, no backtracking
//! - [`Selection`] — Insertion-ordered capture collector
//!
//! # Key Design Insights
//!
//! 1. **Matchable first**: a `Pattern::Matchable` node is never treated structurally.
//!
//! 2. **Patterns are partial**: maps and records ignore keys the pattern does not
//!    mention. Sequences are tuples: length must match exactly.
//!
//! 3. **Captures leak on failure**: a Matchable's selector runs even when its
//!    predicate fails, and conjunctions do not retract captures already emitted.
//!    Captures are only meaningful when the top-level call returns `true`.
//!    [`Pattern::select`] gives the clean "captures only on success" contract.
//!
//! # Example
//!
//! ```
//! use pmatch::prelude::*;
//!
//! let pattern = Pattern::sequence([
//!     Pattern::from(1),
//!     Pattern::matchable(
//!         CustomMatchable::new("select", |_| true)
//!             .with_selector(|v| Selection::new().with("rest", v.clone())),
//!     ),
//! ]);
//!
//! let value = Value::sequence([1, 2]);
//! let selection = pattern.select(&value).unwrap();
//! assert_eq!(selection.get("rest"), Some(&Value::from(2)));
//! ```
//!
//! # Extensions
//!
//! - `pmatch-test` (`ext/test` in this workspace): reference matchables and conformance fixtures

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod engine;
mod matchable;
mod pattern;
mod selection;
mod trace;
mod value;

#[cfg(feature = "registry")]
mod config;
#[cfg(feature = "registry")]
mod registry;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use engine::{matches, matches_with_trace};
pub use matchable::{CustomMatchable, Matchable, OPTIONAL};
pub use pattern::{Pattern, PatternKind};
pub use selection::Selection;
pub use value::{CustomValue, Record, Value, ValueMap, ValueSet};

// Trace types
pub use trace::{MatchTrace, MismatchReason, SetRule};

// Registry (feature-gated)
#[cfg(feature = "registry")]
pub use config::{
    FieldConfig, FieldPatternConfig, MapEntryConfig, MapPatternEntryConfig, MatchableConfig,
    NumberConfig, PatternConfig, UnitConfig, ValueConfig,
};
#[cfg(feature = "registry")]
pub use registry::{IntoMatchable, Registry, RegistryBuilder};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use pmatch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Engine
        matches,
        matches_with_trace,
        // Traits
        CustomMatchable,
        CustomValue,
        // Trace types
        MatchTrace,
        Matchable,
        MismatchReason,
        // Core types
        Pattern,
        PatternError,
        PatternKind,
        Record,
        Selection,
        SetRule,
        Value,
        ValueMap,
        ValueSet,
        OPTIONAL,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed nesting depth of a pattern tree.
///
/// Recursion depth of [`matches`] equals pattern depth, so this bounds stack use.
/// Enforced when loading configuration and via [`Pattern::validate`].
pub const MAX_DEPTH: usize = 64;

/// Maximum number of elements in a single container pattern or value loaded from config.
///
/// Width-based counterpart of [`MAX_DEPTH`]: a config with a million record fields
/// at depth 1 passes the depth check but still costs as much to load and match.
pub const MAX_ELEMENTS: usize = 256;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from pattern construction and validation.
///
/// Matching itself never fails: a pattern either matches a value or it does not.
/// These errors surface at config load or validation time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// Pattern nesting exceeds [`MAX_DEPTH`].
    #[error(
        "pattern nesting depth is {depth}, but maximum allowed is {max} \
         — reduce nesting or split the pattern"
    )]
    DepthExceeded {
        /// Actual depth of the pattern tree.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// A container holds more than [`MAX_ELEMENTS`] entries.
    #[error("container has {count} elements, but maximum allowed is {max}")]
    TooManyElements {
        /// Actual element count.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// A regex or other textual pattern is invalid.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error message.
        reason: String,
    },

    /// Configuration deserialization or construction failed.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// The underlying error message.
        reason: String,
    },

    /// A matchable type name was not found in the registry.
    #[error("unknown matchable type \"{type_name}\"{}", available_suffix(.available))]
    UnknownMatchableType {
        /// The unregistered type name.
        type_name: String,
        /// Type names that ARE registered.
        available: Vec<String>,
    },
}

fn available_suffix(available: &[String]) -> String {
    if available.is_empty() {
        " — no matchable types are registered".to_string()
    } else {
        format!(" — registered: {}", available.join(", "))
    }
}
