//! Match trace types for debugging pattern behavior.
//!
//! [`MatchTrace`] mirrors the [`Pattern`](crate::Pattern) tree but captures
//! results instead of constraints. Use
//! [`matches_with_trace()`](crate::matches_with_trace) to see which node
//! failed and why.
//!
//! # INV: trace agrees with the engine
//!
//! The trace walk follows the engine exactly, short-circuits included:
//! `trace.matched()` equals what [`matches`](crate::matches) returns, and
//! [`MatchTrace::captures`] lists the captures it emits, in order.
//!
//! # Example
//!
//! ```
//! use pmatch::{matches_with_trace, MismatchReason, Pattern, Value};
//!
//! let pattern = Pattern::sequence([1, 2]);
//! let trace = matches_with_trace(&pattern, &Value::sequence([1, 2, 3]));
//! assert!(!trace.matched());
//! assert_eq!(
//!     trace.reason(),
//!     Some(&MismatchReason::LengthMismatch { expected: 2, actual: 3 })
//! );
//! ```

use crate::{PatternKind, Selection, Value};

/// Why a structural node failed before (or instead of) recursing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchReason {
    /// The value's shape does not fit the pattern's shape.
    ShapeMismatch {
        /// The pattern's shape.
        expected: PatternKind,
        /// The value's type name.
        actual: &'static str,
    },
    /// Sequence lengths differ.
    LengthMismatch {
        /// Pattern length.
        expected: usize,
        /// Value length.
        actual: usize,
    },
    /// A required record field is absent.
    MissingField(String),
    /// A set member (or the single element count) is not satisfied.
    NotAMember,
    /// The empty set pattern met a non-empty set.
    NotEmpty,
}

/// Which of the size-dependent set rules applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetRule {
    /// Empty pattern: value must be empty.
    Empty,
    /// Single matchable element: value must hold exactly one element matching it.
    EachElement,
    /// Single literal element: value must contain it.
    Contains,
    /// Two or more elements: value must contain all of them.
    ContainsAll,
}

/// Trace of one pattern node's evaluation.
#[derive(Debug, Clone)]
pub enum MatchTrace {
    /// A literal comparison.
    Literal {
        /// Whether the value was same-value equal.
        matched: bool,
        /// The literal (Debug format).
        expected: String,
        /// The value (Debug format).
        actual: String,
    },
    /// A sequence pattern.
    Sequence {
        /// Whether every position matched.
        matched: bool,
        /// Set when the node failed without visiting all items.
        reason: Option<MismatchReason>,
        /// Trace of each visited position.
        items: Vec<MatchTrace>,
    },
    /// A map pattern.
    Map {
        /// Whether every key matched.
        matched: bool,
        /// Set when the value is not a map.
        reason: Option<MismatchReason>,
        /// Trace of each visited key (key in Debug format).
        entries: Vec<(String, MatchTrace)>,
    },
    /// A set pattern.
    Set {
        /// Whether the applicable set rule held.
        matched: bool,
        /// The rule that applied, if the value was a set.
        rule: Option<SetRule>,
        /// Set on failure.
        reason: Option<MismatchReason>,
        /// Element trace for [`SetRule::EachElement`].
        items: Vec<MatchTrace>,
    },
    /// A record pattern.
    Record {
        /// Whether every field held.
        matched: bool,
        /// Set when the value is not a record or a required field is absent.
        reason: Option<MismatchReason>,
        /// Trace of each visited field.
        fields: Vec<(String, MatchTrace)>,
    },
    /// A matchable node.
    Matchable {
        /// The predicate's result.
        matched: bool,
        /// The node's `matchable_type` tag.
        matchable_type: String,
        /// The value (Debug format).
        value: String,
        /// What the selector emitted (even when `matched` is `false`).
        captures: Selection,
    },
}

impl MatchTrace {
    /// Get the overall match result of this node.
    #[must_use]
    pub fn matched(&self) -> bool {
        match self {
            Self::Literal { matched, .. }
            | Self::Sequence { matched, .. }
            | Self::Map { matched, .. }
            | Self::Set { matched, .. }
            | Self::Record { matched, .. }
            | Self::Matchable { matched, .. } => *matched,
        }
    }

    /// The pattern shape this node traced.
    #[must_use]
    pub fn kind(&self) -> PatternKind {
        match self {
            Self::Literal { .. } => PatternKind::Literal,
            Self::Sequence { .. } => PatternKind::Sequence,
            Self::Map { .. } => PatternKind::Map,
            Self::Set { .. } => PatternKind::Set,
            Self::Record { .. } => PatternKind::Record,
            Self::Matchable { .. } => PatternKind::Matchable,
        }
    }

    /// The structural failure reason recorded on this node, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&MismatchReason> {
        match self {
            Self::Sequence { reason, .. }
            | Self::Map { reason, .. }
            | Self::Set { reason, .. }
            | Self::Record { reason, .. } => reason.as_ref(),
            Self::Literal { .. } | Self::Matchable { .. } => None,
        }
    }

    /// Every capture emitted under this node, in emission order.
    ///
    /// Unlike a [`Selection`], a name emitted twice appears twice.
    #[must_use]
    pub fn captures(&self) -> Vec<(String, Value)> {
        let mut out = Vec::new();
        self.collect_captures(&mut out);
        out
    }

    fn collect_captures(&self, out: &mut Vec<(String, Value)>) {
        match self {
            Self::Literal { .. } => {}
            Self::Sequence { items, .. } | Self::Set { items, .. } => {
                for item in items {
                    item.collect_captures(out);
                }
            }
            Self::Map { entries, .. } => {
                for (_, entry) in entries {
                    entry.collect_captures(out);
                }
            }
            Self::Record { fields, .. } => {
                for (_, field) in fields {
                    field.collect_captures(out);
                }
            }
            Self::Matchable { captures, .. } => {
                out.extend(captures.iter().map(|(n, v)| (n.to_string(), v.clone())));
            }
        }
    }
}
