//! `Selection` — Insertion-ordered capture collector

use crate::Value;

/// An insertion-ordered mapping from capture name to captured value.
///
/// Selecting a name twice keeps its first position and takes the latest value.
///
/// # INV: trusted only after a successful match
///
/// The engine writes into a selection while it walks, and never retracts
/// writes made by branches that later fail. A selection filled by
/// [`Pattern::select_into`](crate::Pattern::select_into) is only a valid capture
/// set when that call returned `true`.
///
/// # Example
///
/// ```
/// use pmatch::{Selection, Value};
///
/// let mut selection = Selection::new();
/// selection.select("x", &Value::from(1));
/// selection.select("y", &Value::from(2));
/// selection.select("x", &Value::from(3));
///
/// let names: Vec<_> = selection.names().collect();
/// assert_eq!(names, ["x", "y"]);
/// assert_eq!(selection.get("x"), Some(&Value::from(3)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    entries: Vec<(String, Value)>,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a capture (builder pattern).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Capture callback form: clones the value.
    ///
    /// This is the signature [`matches`](crate::matches) expects, so a selection
    /// can be used as the sink with `&mut |name, value| selection.select(name, value)`.
    pub fn select(&mut self, name: &str, value: &Value) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value.clone(),
            None => self.entries.push((name.to_owned(), value.clone())),
        }
    }

    /// Insert or replace a capture. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Look up a capture by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns `true` if the name was captured.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of distinct captured names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Captured names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate captures in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Fold another selection into this one, in its order.
    pub fn merge(&mut self, other: Selection) {
        for (name, value) in other.entries {
            self.insert(name, value);
        }
    }

    /// Consume into the ordered list of captures.
    #[must_use]
    pub fn into_vec(self) -> Vec<(String, Value)> {
        self.entries
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Selection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut selection = Self::new();
        selection.extend(iter);
        selection
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Selection {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl IntoIterator for Selection {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
