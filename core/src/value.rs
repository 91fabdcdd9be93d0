//! `Value` — The runtime data a [`Pattern`](crate::Pattern) is tested against
//!
//! A closed data model: primitives compared under same-value semantics, plus
//! four container shapes the engine knows how to destructure.
//!
//! # Extensibility via `Custom`
//!
//! For host types not covered by the primitives, implement [`CustomValue`]
//! and wrap in `Value::Custom(Arc::new(your_type))`. Custom values compare by
//! identity (same allocation), never structurally.

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

/// Extension trait for opaque host values.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use std::sync::Arc;
/// use pmatch::{CustomValue, Value};
///
/// #[derive(Debug)]
/// struct Handle(u32);
///
/// impl CustomValue for Handle {
///     fn custom_type_name(&self) -> &'static str {
///         "handle"
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let value = Value::Custom(Arc::new(Handle(7)));
/// assert!(value.is_primitive());
/// assert_eq!(value.type_name(), "handle");
/// ```
pub trait CustomValue: Send + Sync + Debug {
    /// Returns a human-readable type identifier, e.g. `"file_handle"`.
    ///
    /// Named `custom_type_name` to avoid collision with `Any::type_id`.
    fn custom_type_name(&self) -> &'static str;

    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// A runtime value.
///
/// # Variants
///
/// Primitives (terminal, compared by [`same_value`](Self::same_value)):
/// - `Undefined` — absence of a value (a missing map key or record field reads as this)
/// - `Null`, `Bool`, `Number` (IEEE 754 double), `String`, `Bytes`
/// - `Custom` — opaque host value, compared by `Arc` identity
///
/// Containers (destructured by the engine):
/// - `Sequence` — ordered, positional
/// - `Map` — key → value, keys compared by equality, order irrelevant to lookup
/// - `Set` — unique elements
/// - `Record` — string field → value
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// No value. Also what a missing key or field reads as.
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Double-precision number.
    Number(f64),
    /// UTF-8 string.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Opaque host value, compared by identity.
    Custom(Arc<dyn CustomValue>),
    /// Ordered sequence.
    Sequence(Vec<Value>),
    /// Key/value map.
    Map(ValueMap),
    /// Set of unique elements.
    Set(ValueSet),
    /// String-keyed record.
    Record(Record),
}

// Same-value semantics, not IEEE: NaN equals itself, +0 and -0 differ.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

impl Value {
    /// Build a sequence from anything convertible to values.
    pub fn sequence<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Build a map from key/value pairs. Later duplicates replace earlier ones.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Map(entries.into_iter().collect())
    }

    /// Build a set. Duplicates are dropped.
    pub fn set<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::Set(items.into_iter().collect())
    }

    /// Build a record from field/value pairs.
    pub fn record<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Record(fields.into_iter().collect())
    }

    /// Build a bytes value.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Same-value equality.
    ///
    /// - `NaN` equals `NaN`
    /// - `+0` does not equal `-0`
    /// - `Custom` values are equal only when they share an allocation
    /// - containers are equal when they have the same shape and contents
    /// - set members are compared by membership, which ignores the sign of zero
    ///
    /// ```
    /// use pmatch::Value;
    ///
    /// assert!(Value::from(f64::NAN).same_value(&Value::from(f64::NAN)));
    /// assert!(!Value::from(0.0).same_value(&Value::from(-0.0)));
    /// ```
    #[must_use]
    pub fn same_value(&self, other: &Self) -> bool {
        self.equals(other, false)
    }

    /// Same-value-zero equality: like [`same_value`](Self::same_value) but `+0 == -0`.
    ///
    /// Used for map keys and set membership.
    #[must_use]
    pub fn same_value_zero(&self, other: &Self) -> bool {
        self.equals(other, true)
    }

    fn equals(&self, other: &Self, zero: bool) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => number_eq(*a, *b, zero),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            (Self::Sequence(a), Self::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y, zero))
            }
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.equals(w, zero)))
            }
            // Membership is same-value-zero, so a set cannot tell +0 from -0.
            (Self::Set(a), Self::Set(b)) => a.len() == b.len() && a.iter().all(|x| b.contains(x)),
            (Self::Record(a), Self::Record(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.equals(w, zero)))
            }
            _ => false,
        }
    }

    /// Returns `true` for `Undefined`.
    #[inline]
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns `true` for terminal values (everything except the four containers).
    #[inline]
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        !self.is_container()
    }

    /// Returns `true` for `Sequence`, `Map`, `Set` and `Record`.
    #[inline]
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Sequence(_) | Self::Map(_) | Self::Set(_) | Self::Record(_)
        )
    }

    /// Try to get the value as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to get the value as a number.
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a boolean.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get the value as a slice of elements.
    #[inline]
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Try to get the value as a map.
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Try to get the value as a set.
    #[inline]
    #[must_use]
    pub fn as_set(&self) -> Option<&ValueSet> {
        match self {
            Self::Set(set) => Some(set),
            _ => None,
        }
    }

    /// Try to get the value as a record.
    #[inline]
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Try to get the value as a custom value reference.
    ///
    /// Use [`CustomValue::as_any`] to downcast to the concrete type.
    #[inline]
    #[must_use]
    pub fn as_custom(&self) -> Option<&dyn CustomValue> {
        match self {
            Self::Custom(c) => Some(c.as_ref()),
            _ => None,
        }
    }

    /// Returns a string describing the kind of this value.
    ///
    /// For `Custom` variants this delegates to [`CustomValue::custom_type_name`].
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Custom(c) => c.custom_type_name(),
            Self::Sequence(_) => "sequence",
            Self::Map(_) => "map",
            Self::Set(_) => "set",
            Self::Record(_) => "record",
        }
    }
}

fn number_eq(a: f64, b: f64, zero: bool) -> bool {
    if a.is_nan() && b.is_nan() {
        return true;
    }
    if zero && a == 0.0 && b == 0.0 {
        return true;
    }
    a.to_bits() == b.to_bits()
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(items)
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Self::Map(map)
    }
}

impl From<ValueSet> for Value {
    fn from(set: ValueSet) -> Self {
        Self::Set(set)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Self::Undefined,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Containers
// ═══════════════════════════════════════════════════════════════════════════════

/// Insertion-ordered key → value map.
///
/// Keys compare with [`Value::same_value_zero`]. Lookup is linear; maps under
/// test are expected to be small.
#[derive(Debug, Clone, Default)]
pub struct ValueMap {
    entries: Vec<(Value, Value)>,
}

impl ValueMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Replacing keeps the key's original position.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k.same_value_zero(&key)) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up a key.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.same_value_zero(key))
            .map(|(_, v)| v)
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Insertion-ordered set of unique values.
///
/// Membership uses [`Value::same_value_zero`].
#[derive(Debug, Clone, Default)]
pub struct ValueSet {
    items: Vec<Value>,
}

impl ValueSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. Returns `false` if it was already present.
    pub fn insert(&mut self, value: impl Into<Value>) -> bool {
        let value = value.into();
        if self.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Returns `true` if the value is a member.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.items.iter().any(|item| item.same_value_zero(value))
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    /// Iterate elements in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }
}

impl<T: Into<Value>> FromIterator<T> for ValueSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

/// Insertion-ordered string field → value mapping.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field (builder pattern).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field. Replacing keeps the field's original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Look up a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns `true` if the field is present (even if its value is `Undefined`).
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
