//! Cached collections.
//!
//! A collection keeps records in insertion order with at most one record per
//! primary key.

use std::fmt::Debug;
use std::hash::Hash;

use board_protocol_types::{ChatMessage, Comment, CommentId, Post};
use chrono::{DateTime, Utc};

/// A record that can live in a [`CachedCollection`].
pub trait Record: Clone {
    type Key: Copy + Eq + Hash + Debug;

    fn key(&self) -> Self::Key;

    fn created_at(&self) -> DateTime<Utc>;
}

impl Record for Post {
    type Key = board_protocol_types::PostId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for Comment {
    type Key = CommentId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for ChatMessage {
    type Key = board_protocol_types::MessageId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Ordered records, unique by primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedCollection<T: Record> {
    items: Vec<T>,
}

impl<T: Record> Default for CachedCollection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Record> CachedCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from fetched records. Later duplicates of a key are
    /// dropped.
    pub fn from_records(records: impl IntoIterator<Item = T>) -> Self {
        let mut collection = Self::new();
        for record in records {
            collection.insert_if_absent(record);
        }
        collection
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn keys(&self) -> Vec<T::Key> {
        self.items.iter().map(Record::key).collect()
    }

    pub fn get(&self, key: T::Key) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn contains(&self, key: T::Key) -> bool {
        self.position(key).is_some()
    }

    fn position(&self, key: T::Key) -> Option<usize> {
        self.items.iter().position(|item| item.key() == key)
    }

    /// Append the record unless its key is already present.
    pub fn insert_if_absent(&mut self, record: T) -> bool {
        if self.contains(record.key()) {
            return false;
        }
        self.items.push(record);
        true
    }

    /// Replace the record with the same key. Returns false if absent.
    pub fn replace(&mut self, record: T) -> bool {
        match self.position(record.key()) {
            Some(index) => {
                self.items[index] = record;
                true
            }
            None => false,
        }
    }

    /// Replace the record with the same key, or append it.
    pub fn upsert(&mut self, record: T) {
        if !self.replace(record.clone()) {
            self.items.push(record);
        }
    }

    pub fn remove(&mut self, key: T::Key) -> Option<T> {
        self.position(key).map(|index| self.items.remove(index))
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }

    /// Records ordered by creation time, oldest first. Ties keep insertion
    /// order.
    pub fn sorted_by_created_at(&self) -> Vec<&T> {
        let mut sorted: Vec<&T> = self.items.iter().collect();
        sorted.sort_by_key(|item| item.created_at());
        sorted
    }
}

impl CachedCollection<Comment> {
    /// Direct replies to `parent`, or top-level comments for `None`.
    pub fn children_of(&self, parent: Option<CommentId>) -> Vec<&Comment> {
        self.items
            .iter()
            .filter(|comment| comment.parent_id == parent)
            .collect()
    }

    /// Remove a comment and every reply below it. Returns how many were removed.
    pub fn remove_thread(&mut self, root: CommentId) -> usize {
        let mut doomed = vec![root];
        let mut frontier = vec![root];
        while let Some(parent) = frontier.pop() {
            for reply in self.children_of(Some(parent)) {
                doomed.push(reply.id);
                frontier.push(reply.id);
            }
        }

        let before = self.items.len();
        self.items.retain(|comment| !doomed.contains(&comment.id));
        before - self.items.len()
    }
}

impl<T: Record> FromIterator<T> for CachedCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}
