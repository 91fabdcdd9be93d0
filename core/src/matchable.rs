//! `Matchable` — The extension protocol for opaque pattern nodes
//!
//! A pattern node that implements [`Matchable`] opts out of structural
//! comparison. Instead of being destructured, it answers two questions about
//! the value under test:
//!
//! - [`predicate`](Matchable::predicate) — does the value match?
//! - [`selector`](Matchable::selector) — which named captures does it produce?
//!
//! Wildcards, guards, unions, `select(...)` and `optional(...)` are all
//! built on this one seam. The engine knows only one tag, [`OPTIONAL`].

use crate::{Selection, Value};
use std::fmt;
use std::fmt::Debug;
use std::sync::Arc;

/// The `matchable_type` tag that tells a record pattern a missing field is not a failure.
pub const OPTIONAL: &str = "optional";

/// An opaque pattern node supplying its own predicate and selector.
///
/// The engine trusts implementations: it does not check that `predicate` and
/// `selector` are pure or idempotent.
///
/// # INV: selector runs regardless of predicate
///
/// The engine calls [`selector`](Self::selector) and emits every entry even when
/// [`predicate`](Self::predicate) returned `false`. Captures are only meaningful
/// when the top-level match succeeds.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so patterns can be shared.
///
/// # Example
///
/// ```
/// use pmatch::{Matchable, Pattern, Selection, Value};
///
/// #[derive(Debug)]
/// struct Positive;
///
/// impl Matchable for Positive {
///     fn matchable_type(&self) -> &str {
///         "positive"
///     }
///
///     fn predicate(&self, value: &Value) -> bool {
///         value.as_number().is_some_and(|n| n > 0.0)
///     }
/// }
///
/// let pattern = Pattern::matchable(Positive);
/// assert!(pattern.test(&Value::from(3)));
/// assert!(!pattern.test(&Value::from(-3)));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Matchable`",
    label = "this type cannot be used as a pattern node",
    note = "implement `matchable_type` and `predicate` (and optionally `selector`), or wrap closures in `CustomMatchable`"
)]
pub trait Matchable: Send + Sync + Debug {
    /// A stable tag drawn from an open set.
    ///
    /// Only [`OPTIONAL`] carries meaning inside the engine.
    fn matchable_type(&self) -> &str;

    /// Returns `true` if the value matches.
    fn predicate(&self, value: &Value) -> bool;

    /// Captures produced for the value, in emission order. Default: none.
    fn selector(&self, value: &Value) -> Selection {
        let _ = value;
        Selection::new()
    }

    /// Returns `true` if this node is an optional pattern.
    fn is_optional(&self) -> bool {
        self.matchable_type() == OPTIONAL
    }
}

#[diagnostic::do_not_recommend]
impl Matchable for Box<dyn Matchable> {
    fn matchable_type(&self) -> &str {
        (**self).matchable_type()
    }

    fn predicate(&self, value: &Value) -> bool {
        (**self).predicate(value)
    }

    fn selector(&self, value: &Value) -> Selection {
        (**self).selector(value)
    }

    fn is_optional(&self) -> bool {
        (**self).is_optional()
    }
}

#[diagnostic::do_not_recommend]
impl Matchable for Arc<dyn Matchable> {
    fn matchable_type(&self) -> &str {
        (**self).matchable_type()
    }

    fn predicate(&self, value: &Value) -> bool {
        (**self).predicate(value)
    }

    fn selector(&self, value: &Value) -> Selection {
        (**self).selector(value)
    }

    fn is_optional(&self) -> bool {
        (**self).is_optional()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CustomMatchable
// ═══════════════════════════════════════════════════════════════════════════════

type PredicateFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
type SelectorFn = Arc<dyn Fn(&Value) -> Selection + Send + Sync>;

/// A closure-backed [`Matchable`]: a tag, a predicate, and an optional selector.
///
/// The "opaque custom" node for callers that do not want to define a type.
///
/// # Example
///
/// ```
/// use pmatch::{CustomMatchable, Matchable, Selection, Value};
///
/// let even = CustomMatchable::new("even", |v| v.as_number().is_some_and(|n| n % 2.0 == 0.0))
///     .with_selector(|v| Selection::new().with("n", v.clone()));
///
/// assert!(even.predicate(&Value::from(4)));
/// assert_eq!(even.selector(&Value::from(4)).get("n"), Some(&Value::from(4)));
/// ```
#[derive(Clone)]
pub struct CustomMatchable {
    matchable_type: String,
    predicate: PredicateFn,
    selector: Option<SelectorFn>,
}

impl CustomMatchable {
    /// Create a matchable from a tag and a predicate closure.
    pub fn new<F>(matchable_type: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            matchable_type: matchable_type.into(),
            predicate: Arc::new(predicate),
            selector: None,
        }
    }

    /// Attach a selector closure.
    #[must_use]
    pub fn with_selector<F>(mut self, selector: F) -> Self
    where
        F: Fn(&Value) -> Selection + Send + Sync + 'static,
    {
        self.selector = Some(Arc::new(selector));
        self
    }
}

impl Matchable for CustomMatchable {
    fn matchable_type(&self) -> &str {
        &self.matchable_type
    }

    fn predicate(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }

    fn selector(&self, value: &Value) -> Selection {
        self.selector
            .as_ref()
            .map_or_else(Selection::new, |select| select(value))
    }
}

impl Debug for CustomMatchable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomMatchable")
            .field("matchable_type", &self.matchable_type)
            .field("has_selector", &self.selector.is_some())
            .finish_non_exhaustive()
    }
}
