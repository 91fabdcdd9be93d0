//! The match engine — a pure recursive walk over pattern and value
//!
//! [`matches`] decides whether a value satisfies a pattern, emitting captures
//! through a callback as it goes. [`matches_with_trace`] walks the same path
//! and records it.
//!
//! # Precedence at every node
//!
//! 1. `Matchable` — predicate decides; selector entries are emitted regardless
//! 2. `Literal` — same-value equality
//! 3. container pattern vs a value of another shape — `false`
//! 4. `Sequence` — equal length, positional, conjoined
//! 5. `Map` — every pattern key; absent keys read as `Undefined`
//! 6. `Set` — empty / single matchable / single literal / subset
//! 7. `Record` — every declared field present (or optional) and matching
//!
//! Conjunctions short-circuit on the first failing child. Captures already
//! emitted by earlier children are not retracted.

use crate::trace::{MatchTrace, MismatchReason, SetRule};
use crate::{Pattern, Record, Value, ValueMap, ValueSet};

static UNDEFINED: Value = Value::Undefined;

/// Test `value` against `pattern`, delivering every capture to `select`.
///
/// Captures arrive in depth-first, left-to-right order. A `Matchable` node's
/// selector runs even when its predicate fails.
///
/// # INV: captures are only meaningful on `true`
///
/// When this returns `false`, `select` may already have received captures from
/// the failing branch and from siblings visited before it. Use
/// [`Pattern::select`] for a collector that is discarded on failure.
///
/// # Example
///
/// ```
/// use pmatch::{matches, CustomMatchable, Pattern, Selection, Value};
///
/// let rest = CustomMatchable::new("select", |_| true)
///     .with_selector(|v| Selection::new().with("rest", v.clone()));
/// let pattern = Pattern::sequence([Pattern::from(1), Pattern::matchable(rest)]);
///
/// let mut captured = Vec::new();
/// let matched = matches(&pattern, &Value::sequence([1, 2]), &mut |name, value| {
///     captured.push((name.to_string(), value.clone()));
/// });
///
/// assert!(matched);
/// assert_eq!(captured, vec![("rest".to_string(), Value::from(2))]);
/// ```
pub fn matches<F>(pattern: &Pattern, value: &Value, select: &mut F) -> bool
where
    F: FnMut(&str, &Value) + ?Sized,
{
    match pattern {
        Pattern::Matchable(matchable) => {
            let matched = matchable.predicate(value);
            for (name, captured) in matchable.selector(value).iter() {
                select(name, captured);
            }
            matched
        }
        Pattern::Literal(literal) => value.same_value(literal),
        Pattern::Sequence(items) => match value {
            Value::Sequence(values) => match_items(items, values, select),
            _ => shape_mismatch(pattern, value),
        },
        Pattern::Map(entries) => match value {
            Value::Map(map) => match_map(entries, map, select),
            _ => shape_mismatch(pattern, value),
        },
        Pattern::Set(members) => match value {
            Value::Set(set) => match_set(members, set, select),
            _ => shape_mismatch(pattern, value),
        },
        Pattern::Record(fields) => match value {
            Value::Record(record) => match_record(fields, record, select),
            _ => shape_mismatch(pattern, value),
        },
    }
}

fn shape_mismatch(pattern: &Pattern, value: &Value) -> bool {
    tracing::trace!(
        expected = %pattern.kind(),
        actual = value.type_name(),
        "shape mismatch"
    );
    false
}

fn match_items<F>(items: &[Pattern], values: &[Value], select: &mut F) -> bool
where
    F: FnMut(&str, &Value) + ?Sized,
{
    if items.len() != values.len() {
        tracing::trace!(
            expected = items.len(),
            actual = values.len(),
            "sequence length mismatch"
        );
        return false;
    }
    items
        .iter()
        .zip(values)
        .all(|(item, value)| matches(item, value, &mut *select))
}

fn match_map<F>(entries: &[(Value, Pattern)], map: &ValueMap, select: &mut F) -> bool
where
    F: FnMut(&str, &Value) + ?Sized,
{
    entries.iter().all(|(key, sub)| {
        let value = map.get(key).unwrap_or(&UNDEFINED);
        matches(sub, value, &mut *select)
    })
}

fn match_set<F>(members: &[Pattern], set: &ValueSet, select: &mut F) -> bool
where
    F: FnMut(&str, &Value) + ?Sized,
{
    match set_rule(members) {
        SetRule::Empty => set.is_empty(),
        SetRule::EachElement => match_items(members, set.as_slice(), select),
        SetRule::Contains | SetRule::ContainsAll => {
            let held = members.iter().all(|member| contains(set, member));
            if !held {
                tracing::trace!("set member missing");
            }
            held
        }
    }
}

fn set_rule(members: &[Pattern]) -> SetRule {
    match members {
        [] => SetRule::Empty,
        [only] if only.is_matchable() => SetRule::EachElement,
        [_] => SetRule::Contains,
        _ => SetRule::ContainsAll,
    }
}

// A matchable can never be a member: membership is value equality.
fn contains(set: &ValueSet, member: &Pattern) -> bool {
    match member {
        Pattern::Literal(value) => set.contains(value),
        Pattern::Matchable(_) => false,
        structural => structural.as_value().is_some_and(|v| set.contains(&v)),
    }
}

fn match_record<F>(fields: &[(String, Pattern)], record: &Record, select: &mut F) -> bool
where
    F: FnMut(&str, &Value) + ?Sized,
{
    fields.iter().all(|(name, sub)| {
        let field = record.get(name);
        if field.is_none() && !sub.is_optional() {
            tracing::trace!(field = name.as_str(), "required field missing");
            return false;
        }
        matches(sub, field.unwrap_or(&UNDEFINED), &mut *select)
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Traced walk
// ═══════════════════════════════════════════════════════════════════════════════

/// Walk `value` against `pattern` like [`matches`], recording every visited node.
///
/// Follows the same short-circuiting as [`matches`], so the trace holds exactly
/// the nodes the engine visits and exactly the captures it emits.
#[must_use]
pub fn matches_with_trace(pattern: &Pattern, value: &Value) -> MatchTrace {
    match pattern {
        Pattern::Matchable(matchable) => MatchTrace::Matchable {
            matched: matchable.predicate(value),
            matchable_type: matchable.matchable_type().to_string(),
            value: format!("{value:?}"),
            captures: matchable.selector(value),
        },
        Pattern::Literal(literal) => MatchTrace::Literal {
            matched: value.same_value(literal),
            expected: format!("{literal:?}"),
            actual: format!("{value:?}"),
        },
        Pattern::Sequence(items) => match value {
            Value::Sequence(values) => {
                let (matched, reason, items) = trace_items(items, values);
                MatchTrace::Sequence {
                    matched,
                    reason,
                    items,
                }
            }
            _ => MatchTrace::Sequence {
                matched: false,
                reason: Some(shape_reason(pattern, value)),
                items: Vec::new(),
            },
        },
        Pattern::Map(entries) => match value {
            Value::Map(map) => {
                let mut traced = Vec::with_capacity(entries.len());
                let mut matched = true;
                for (key, sub) in entries {
                    let child = matches_with_trace(sub, map.get(key).unwrap_or(&UNDEFINED));
                    let ok = child.matched();
                    traced.push((format!("{key:?}"), child));
                    if !ok {
                        matched = false;
                        break;
                    }
                }
                MatchTrace::Map {
                    matched,
                    reason: None,
                    entries: traced,
                }
            }
            _ => MatchTrace::Map {
                matched: false,
                reason: Some(shape_reason(pattern, value)),
                entries: Vec::new(),
            },
        },
        Pattern::Set(members) => match value {
            Value::Set(set) => trace_set(members, set),
            _ => MatchTrace::Set {
                matched: false,
                rule: None,
                reason: Some(shape_reason(pattern, value)),
                items: Vec::new(),
            },
        },
        Pattern::Record(fields) => match value {
            Value::Record(record) => trace_record(fields, record),
            _ => MatchTrace::Record {
                matched: false,
                reason: Some(shape_reason(pattern, value)),
                fields: Vec::new(),
            },
        },
    }
}

fn shape_reason(pattern: &Pattern, value: &Value) -> MismatchReason {
    MismatchReason::ShapeMismatch {
        expected: pattern.kind(),
        actual: value.type_name(),
    }
}

fn trace_items(
    items: &[Pattern],
    values: &[Value],
) -> (bool, Option<MismatchReason>, Vec<MatchTrace>) {
    if items.len() != values.len() {
        let reason = MismatchReason::LengthMismatch {
            expected: items.len(),
            actual: values.len(),
        };
        return (false, Some(reason), Vec::new());
    }
    let mut traced = Vec::with_capacity(items.len());
    for (item, value) in items.iter().zip(values) {
        let child = matches_with_trace(item, value);
        let ok = child.matched();
        traced.push(child);
        if !ok {
            return (false, None, traced);
        }
    }
    (true, None, traced)
}

fn trace_set(members: &[Pattern], set: &ValueSet) -> MatchTrace {
    let rule = set_rule(members);
    let (matched, reason, items) = match rule {
        SetRule::Empty if set.is_empty() => (true, None, Vec::new()),
        SetRule::Empty => (false, Some(MismatchReason::NotEmpty), Vec::new()),
        SetRule::EachElement => trace_items(members, set.as_slice()),
        SetRule::Contains | SetRule::ContainsAll => {
            if members.iter().all(|member| contains(set, member)) {
                (true, None, Vec::new())
            } else {
                (false, Some(MismatchReason::NotAMember), Vec::new())
            }
        }
    };
    MatchTrace::Set {
        matched,
        rule: Some(rule),
        reason,
        items,
    }
}

fn trace_record(fields: &[(String, Pattern)], record: &Record) -> MatchTrace {
    let mut traced = Vec::with_capacity(fields.len());
    for (name, sub) in fields {
        let field = record.get(name);
        if field.is_none() && !sub.is_optional() {
            return MatchTrace::Record {
                matched: false,
                reason: Some(MismatchReason::MissingField(name.clone())),
                fields: traced,
            };
        }
        let child = matches_with_trace(sub, field.unwrap_or(&UNDEFINED));
        let ok = child.matched();
        traced.push((name.clone(), child));
        if !ok {
            return MatchTrace::Record {
                matched: false,
                reason: None,
                fields: traced,
            };
        }
    }
    MatchTrace::Record {
        matched: true,
        reason: None,
        fields: traced,
    }
}
