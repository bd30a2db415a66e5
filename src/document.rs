//! Arena-backed storage for schema documents
//!
//! Uses a generational arena for memory-safe node handles and O(1) lookups.
//! Each [`SchemaArena`] holds one complete document; the arena `Index` of a
//! node is its reference identity for the walker's cycle oracle.

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::schema::Schema;

/// One schema document: an arena of nodes plus an optional root handle.
#[derive(Debug, Default)]
pub struct SchemaArena {
    arena: Arena<Schema>,
    root: Option<Index>,
}

impl SchemaArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Stores a node and returns its identity handle. The node is not
    /// reachable from the root until some edge points at it.
    #[instrument(level = "trace", skip(self, schema))]
    pub fn insert(&mut self, schema: Schema) -> Index {
        self.arena.insert(schema)
    }

    /// Stores a node and makes it the document root.
    #[instrument(level = "trace", skip(self, schema))]
    pub fn insert_root(&mut self, schema: Schema) -> Index {
        let idx = self.arena.insert(schema);
        self.root = Some(idx);
        idx
    }

    /// Removes a node from the arena. Edges still pointing at it become
    /// stale and surface as `NodeNotFound` when walked.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, idx: Index) -> Option<Schema> {
        if self.root == Some(idx) {
            self.root = None;
        }
        self.arena.remove(idx)
    }

    pub fn get(&self, idx: Index) -> Option<&Schema> {
        self.arena.get(idx)
    }

    pub fn get_mut(&mut self, idx: Index) -> Option<&mut Schema> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn set_root(&mut self, idx: Option<Index>) {
        self.root = idx;
    }

    /// Number of stored nodes, reachable or not.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Iterates over all stored nodes in arena order, reachable or not.
    pub fn iter(&self) -> impl Iterator<Item = (Index, &Schema)> {
        self.arena.iter()
    }

    /// Iterates mutably over all stored nodes in arena order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Index, &mut Schema)> {
        self.arena.iter_mut()
    }
}
