use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlattenError {
    #[error("no rows for the requested record")]
    NotFound,
}

/// One flat record of a LEFT JOIN, keyed by the id of its parent.
pub trait JoinRow: Sized {
    type Key: Copy + Eq + Hash;
    type Aggregate: FoldRows<Self>;

    fn parent_key(&self) -> Self::Key;
}

/// The nested object a group of join rows folds into.
pub trait FoldRows<R>: Sized {
    /// Build from the first row of a parent. Scalars and one-to-one relations
    /// are identical on every row of the parent, so only this row is read for them.
    fn start(row: &R) -> Self;

    /// Fold the one-to-many relations of a row (including the first) into `self`.
    fn absorb(&mut self, row: &R);
}

/// Treat a LEFT JOIN id of NULL or 0 as "no related row".
pub fn related_id(id: Option<i64>) -> Option<i64> {
    id.filter(|&id| id != 0)
}

/// A one-to-many relation list that keeps each related id once, in order of
/// first appearance. Serializes as a plain array.
#[derive(Debug, Clone)]
pub struct RelatedList<T> {
    items: Vec<T>,
    seen: HashSet<i64>,
}

impl<T> RelatedList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Append `make(id)` unless the id is absent, zero, or already present.
    /// Returns whether an entry was added.
    pub fn insert_with(&mut self, id: Option<i64>, make: impl FnOnce(i64) -> T) -> bool {
        let Some(id) = related_id(id) else {
            return false;
        };
        if !self.seen.insert(id) {
            return false;
        }
        self.items.push(make(id));
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for RelatedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for RelatedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Serialize> Serialize for RelatedList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

/// Aggregates keyed by parent id, in order of first appearance.
#[derive(Debug)]
pub struct Flattened<K, A> {
    entries: Vec<(K, A)>,
    index: HashMap<K, usize>,
}

impl<K: Copy + Eq + Hash, A> Flattened<K, A> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&A> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn into_values(self) -> impl Iterator<Item = A> {
        self.entries.into_iter().map(|(_, a)| a)
    }
}

/// Fold every row into one aggregate per distinct parent id.
pub fn flatten_many<R: JoinRow>(rows: &[R]) -> Flattened<R::Key, R::Aggregate> {
    let mut entries: Vec<(R::Key, R::Aggregate)> = Vec::new();
    let mut index: HashMap<R::Key, usize> = HashMap::new();

    for row in rows {
        let key = row.parent_key();
        let slot = *index.entry(key).or_insert_with(|| {
            entries.push((key, R::Aggregate::start(row)));
            entries.len() - 1
        });
        entries[slot].1.absorb(row);
    }

    Flattened { entries, index }
}

/// Fold the rows of a single-record query. Rows for any other parent are ignored.
pub fn flatten_one<R: JoinRow>(rows: &[R]) -> Result<R::Aggregate, FlattenError> {
    let first = rows.first().ok_or(FlattenError::NotFound)?.parent_key();
    let mut aggregate = R::Aggregate::start(&rows[0]);
    for row in rows.iter().filter(|r| r.parent_key() == first) {
        aggregate.absorb(row);
    }
    Ok(aggregate)
}
