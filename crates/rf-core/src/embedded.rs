//! # Embedded Collections
//!
//! Votes, Comments and Answers live inside their owning Thread document.
//! `Embedded<T>` keeps them in insertion order while addressing them by
//! their own stable id, never by position. Lookups are a linear scan:
//! these collections are bounded by a single document.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anything that carries a stable identity inside a parent document.
pub trait Identified {
    fn key(&self) -> Uuid;
}

/// Ordered sequence of sub-documents addressed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedded<T> {
    items: Vec<T>,
}

impl<T> Default for Embedded<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Identified> Embedded<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.items.iter().find(|item| item.key() == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.key() == id)
    }

    pub fn find_mut<P>(&mut self, predicate: P) -> Option<&mut T>
    where
        P: FnMut(&&mut T) -> bool,
    {
        self.items.iter_mut().find(predicate)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    /// Removes the item with `id`, preserving the order of the rest.
    pub fn remove(&mut self, id: Uuid) -> Option<T> {
        let index = self.items.iter().position(|item| item.key() == id)?;
        Some(self.items.remove(index))
    }
}

impl<'a, T> IntoIterator for &'a Embedded<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for Embedded<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}
