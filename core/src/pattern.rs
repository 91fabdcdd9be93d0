//! `Pattern` — A tree of constraints a [`Value`] must satisfy
//!
//! The shape vocabulary mirrors [`Value`]: literals, sequences, maps, sets and
//! records, plus one extra variant for opaque [`Matchable`] nodes. The shape is
//! fixed when the pattern is built; the engine dispatches on the enum, never
//! on runtime inspection.

use crate::{engine, Matchable, PatternError, Selection, Value, MAX_DEPTH};
use std::fmt;
use std::sync::Arc;

/// A pattern node.
///
/// # INV: Matchable or structural, never both
///
/// A `Matchable` node is never destructured, even if the matchable wraps a
/// structural pattern internally.
///
/// # Example
///
/// ```
/// use pmatch::{Pattern, Value};
///
/// // { kind: "point", coords: [0, 0] }
/// let pattern = Pattern::record([
///     ("kind", Pattern::from("point")),
///     ("coords", Pattern::sequence([Pattern::from(0), Pattern::from(0)])),
/// ]);
///
/// let value = Value::record([
///     ("kind", Value::from("point")),
///     ("coords", Value::sequence([0, 0])),
///     ("label", Value::from("origin")),
/// ]);
/// assert!(pattern.test(&value));
/// ```
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matches by same-value equality.
    Literal(Value),
    /// Fixed-length tuple: same length, positionally matched.
    Sequence(Vec<Pattern>),
    /// Every listed key must be present in the value map and match. Extra keys ignored.
    Map(Vec<(Value, Pattern)>),
    /// Size-dependent set semantics (empty / single element / subset).
    Set(Vec<Pattern>),
    /// Every declared field must be present (unless optional) and match. Extra fields ignored.
    Record(Vec<(String, Pattern)>),
    /// Opaque node with its own predicate and selector.
    Matchable(Arc<dyn Matchable>),
}

/// The shape of a pattern node, without its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// [`Pattern::Literal`]
    Literal,
    /// [`Pattern::Sequence`]
    Sequence,
    /// [`Pattern::Map`]
    Map,
    /// [`Pattern::Set`]
    Set,
    /// [`Pattern::Record`]
    Record,
    /// [`Pattern::Matchable`]
    Matchable,
}

impl PatternKind {
    /// Lowercase name of the shape.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Sequence => "sequence",
            Self::Map => "map",
            Self::Set => "set",
            Self::Record => "record",
            Self::Matchable => "matchable",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Pattern {
    /// A literal pattern. Container values stay literal and compare deeply;
    /// use `Pattern::from(Value)` for the structural equivalent.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// A sequence (tuple) pattern.
    pub fn sequence<I, P>(items: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// A map pattern. A repeated key replaces the earlier sub-pattern in place.
    pub fn map<I, K, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<Value>,
        P: Into<Pattern>,
    {
        let mut out: Vec<(Value, Pattern)> = Vec::new();
        for (key, pattern) in entries {
            let key = key.into();
            let pattern = pattern.into();
            match out.iter_mut().find(|(k, _)| k.same_value_zero(&key)) {
                Some((_, slot)) => *slot = pattern,
                None => out.push((key, pattern)),
            }
        }
        Self::Map(out)
    }

    /// A set pattern.
    pub fn set<I, P>(items: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    /// A record pattern. A repeated field replaces the earlier sub-pattern in place.
    pub fn record<I, K, P>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<Pattern>,
    {
        let mut out: Vec<(String, Pattern)> = Vec::new();
        for (name, pattern) in fields {
            let name = name.into();
            let pattern = pattern.into();
            match out.iter_mut().find(|(n, _)| *n == name) {
                Some((_, slot)) => *slot = pattern,
                None => out.push((name, pattern)),
            }
        }
        Self::Record(out)
    }

    /// Wrap a [`Matchable`] as a pattern node.
    pub fn matchable(matchable: impl Matchable + 'static) -> Self {
        Self::Matchable(Arc::new(matchable))
    }

    /// The shape of this node.
    #[must_use]
    pub fn kind(&self) -> PatternKind {
        match self {
            Self::Literal(_) => PatternKind::Literal,
            Self::Sequence(_) => PatternKind::Sequence,
            Self::Map(_) => PatternKind::Map,
            Self::Set(_) => PatternKind::Set,
            Self::Record(_) => PatternKind::Record,
            Self::Matchable(_) => PatternKind::Matchable,
        }
    }

    /// Returns `true` for a [`Matchable`] node.
    ///
    /// This is the capability check the single-element set rule relies on.
    #[must_use]
    pub fn is_matchable(&self) -> bool {
        matches!(self, Self::Matchable(_))
    }

    /// Returns the matchable if this is a `Matchable` node.
    #[must_use]
    pub fn as_matchable(&self) -> Option<&dyn Matchable> {
        match self {
            Self::Matchable(m) => Some(m.as_ref()),
            _ => None,
        }
    }

    /// Returns `true` for a `Matchable` node tagged [`OPTIONAL`](crate::OPTIONAL).
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.as_matchable().is_some_and(|m| m.is_optional())
    }

    /// Convert a Matchable-free pattern back to the value it describes.
    ///
    /// Returns `None` if the tree contains a `Matchable` node anywhere.
    #[must_use]
    pub fn as_value(&self) -> Option<Value> {
        match self {
            Self::Literal(v) => Some(v.clone()),
            Self::Sequence(items) => items
                .iter()
                .map(Self::as_value)
                .collect::<Option<Vec<_>>>()
                .map(Value::Sequence),
            Self::Map(entries) => entries
                .iter()
                .map(|(k, p)| p.as_value().map(|v| (k.clone(), v)))
                .collect::<Option<Vec<_>>>()
                .map(Value::map),
            Self::Set(items) => items
                .iter()
                .map(Self::as_value)
                .collect::<Option<Vec<_>>>()
                .map(Value::set),
            Self::Record(fields) => fields
                .iter()
                .map(|(n, p)| p.as_value().map(|v| (n.clone(), v)))
                .collect::<Option<Vec<_>>>()
                .map(Value::record),
            Self::Matchable(_) => None,
        }
    }

    /// Nesting depth of this pattern. Leaves (literals, matchables) have depth 1.
    ///
    /// A `Matchable` is opaque, so patterns it wraps internally are not counted.
    #[must_use]
    pub fn depth(&self) -> usize {
        let children = match self {
            Self::Literal(_) | Self::Matchable(_) => 0,
            Self::Sequence(items) | Self::Set(items) => {
                items.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Map(entries) => entries.iter().map(|(_, p)| p.depth()).max().unwrap_or(0),
            Self::Record(fields) => fields.iter().map(|(_, p)| p.depth()).max().unwrap_or(0),
        };
        1 + children
    }

    /// Validate this pattern against safety constraints.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::DepthExceeded`] if nesting exceeds [`MAX_DEPTH`].
    pub fn validate(&self) -> Result<(), PatternError> {
        let depth = self.depth();
        if depth > MAX_DEPTH {
            tracing::debug!(depth, max = MAX_DEPTH, "pattern rejected: too deep");
            return Err(PatternError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }
        Ok(())
    }

    /// Match a value, delivering every capture to `select`.
    ///
    /// Method form of [`matches`](crate::matches); see there for the capture contract.
    pub fn matches<F>(&self, value: &Value, select: &mut F) -> bool
    where
        F: FnMut(&str, &Value) + ?Sized,
    {
        engine::matches(self, value, select)
    }

    /// Match a value, discarding captures.
    #[must_use]
    pub fn test(&self, value: &Value) -> bool {
        engine::matches(self, value, &mut |_, _| {})
    }

    /// Match a value and return its captures only if the whole match succeeded.
    ///
    /// Captures emitted by failing branches never escape: on `false` the
    /// partially filled selection is dropped.
    ///
    /// ```
    /// use pmatch::{CustomMatchable, Pattern, Selection, Value};
    ///
    /// let grab = CustomMatchable::new("select", |_| true)
    ///     .with_selector(|v| Selection::new().with("x", v.clone()));
    /// let pattern = Pattern::record([
    ///     ("a", Pattern::matchable(grab)),
    ///     ("b", Pattern::from(5)),
    /// ]);
    ///
    /// let miss = Value::record([("a", 1), ("b", 6)]);
    /// assert!(pattern.select(&miss).is_none());
    /// ```
    #[must_use]
    pub fn select(&self, value: &Value) -> Option<Selection> {
        let mut selection = Selection::new();
        self.select_into(value, &mut selection).then_some(selection)
    }

    /// Match a value, writing captures into `selection`.
    ///
    /// This is the raw engine contract: on `false`, `selection` may hold
    /// captures from branches visited before the failure.
    pub fn select_into(&self, value: &Value, selection: &mut Selection) -> bool {
        engine::matches(self, value, &mut |name, v| selection.select(name, v))
    }
}

impl From<Value> for Pattern {
    fn from(value: Value) -> Self {
        match value {
            Value::Sequence(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Map(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v.clone())))
                    .collect(),
            ),
            Value::Set(set) => Self::Set(set.iter().cloned().map(Self::from).collect()),
            Value::Record(record) => Self::Record(
                record
                    .iter()
                    .map(|(n, v)| (n.to_string(), Self::from(v.clone())))
                    .collect(),
            ),
            primitive => Self::Literal(primitive),
        }
    }
}

impl From<Arc<dyn Matchable>> for Pattern {
    fn from(matchable: Arc<dyn Matchable>) -> Self {
        Self::Matchable(matchable)
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Self::Literal(Value::from(s))
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Self::Literal(Value::from(s))
    }
}

impl From<f64> for Pattern {
    fn from(n: f64) -> Self {
        Self::Literal(Value::from(n))
    }
}

impl From<i32> for Pattern {
    fn from(n: i32) -> Self {
        Self::Literal(Value::from(n))
    }
}

impl From<bool> for Pattern {
    fn from(b: bool) -> Self {
        Self::Literal(Value::from(b))
    }
}
