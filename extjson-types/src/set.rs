//! Unordered collection of distinct values.

use crate::ExtValue;

/// A set of [`ExtValue`]s.
///
/// Members are kept distinct under `ExtValue` equality and the set compares
/// by membership, never by order. `ExtValue` cannot be hashed (floats,
/// custom values), so membership checks are linear; this type is meant for
/// the small sets that show up in documents, not as a general index.
#[derive(Debug, Clone, Default)]
pub struct ValueSet {
    items: Vec<ExtValue>,
}

impl ValueSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Inserts a value. Returns false if an equal value was already present.
    pub fn insert(&mut self, value: impl Into<ExtValue>) -> bool {
        let value = value.into();
        if self.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Removes a value. Returns true if it was present.
    pub fn remove(&mut self, value: &ExtValue) -> bool {
        match self.items.iter().position(|item| item == value) {
            Some(index) => {
                self.items.swap_remove(index);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, value: &ExtValue) -> bool {
        self.items.iter().any(|item| item == value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates members in insertion order. The order carries no meaning.
    pub fn iter(&self) -> std::slice::Iter<'_, ExtValue> {
        self.items.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ExtValue> {
        self.items
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.items.iter().all(|item| other.contains(item))
    }
}

impl<V: Into<ExtValue>> FromIterator<V> for ValueSet {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a ExtValue;
    type IntoIter = std::slice::Iter<'a, ExtValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for ValueSet {
    type Item = ExtValue;
    type IntoIter = std::vec::IntoIter<ExtValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
