//! Ordered, id-keyed collections shared by the list controller and projector

use std::fmt::Debug;
use std::ops::RangeInclusive;

use crate::models::{Project, ProjectId};

/// Something with a stable identity inside a collection
pub trait Keyed {
    type Key: Copy + PartialEq + Debug;

    fn key(&self) -> Self::Key;
}

impl Keyed for Project {
    type Key = ProjectId;

    fn key(&self) -> ProjectId {
        self.id
    }
}

/// A `Vec` that keeps keys unique and supports drag-style moves
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedCollection<T> {
    items: Vec<T>,
}

impl<T> Default for OrderedCollection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Keyed + Clone> OrderedCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, keeping the first occurrence of each key
    pub fn from_vec(items: Vec<T>) -> Self {
        let mut collection = Self::new();
        for item in items {
            collection.push_unique(item);
        }
        collection
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn find(&self, key: T::Key) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn find_mut(&mut self, key: T::Key) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.key() == key)
    }

    pub fn position(&self, key: T::Key) -> Option<usize> {
        self.items.iter().position(|item| item.key() == key)
    }

    pub fn contains(&self, key: T::Key) -> bool {
        self.position(key).is_some()
    }

    pub fn keys(&self) -> Vec<T::Key> {
        self.items.iter().map(Keyed::key).collect()
    }

    /// Append unless the key is already present; returns whether it was added
    pub fn push_unique(&mut self, item: T) -> bool {
        if self.contains(item.key()) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove by key, returning the removed item
    pub fn remove(&mut self, key: T::Key) -> Option<T> {
        let index = self.position(key)?;
        Some(self.items.remove(index))
    }

    /// Move the item at `from` so it ends up at `to`
    ///
    /// Returns the contiguous index range whose contents changed, or `None`
    /// when either index is out of bounds or nothing moved.
    pub fn move_item(&mut self, from: usize, to: usize) -> Option<RangeInclusive<usize>> {
        if from >= self.items.len() || to >= self.items.len() || from == to {
            return None;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        Some(from.min(to)..=from.max(to))
    }

    pub fn replace_all(&mut self, items: Vec<T>) {
        *self = Self::from_vec(items);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Owned copy of the current contents
    pub fn snapshot(&self) -> Vec<T> {
        self.items.clone()
    }
}

impl<'a, T> IntoIterator for &'a OrderedCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
