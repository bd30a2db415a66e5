//! Identity tracker: the cycle oracle of the depth-first walker
//!
//! Maintains, for the path currently being walked, a map from node identity
//! (arena `Index`) to the depth at which that identity was first recorded on
//! the path. A node about to be entered is a genuine back-edge exactly when
//! its identity is still recorded at a strictly shallower depth; anything
//! recorded at the entering depth or deeper belongs to an already-exited
//! sibling subtree and is purged first. Aliasing across siblings is therefore
//! never mistaken for a cycle.

use std::collections::HashMap;

use generational_arena::Index;
use tracing::trace;

use crate::errors::{WalkError, WalkResult};

#[derive(Debug, Default)]
pub(crate) struct IdentityTracker {
    /// Identities live somewhere on the current ancestor chain, keyed to the
    /// depth at which they were first recorded.
    open: HashMap<Index, i64>,
}

impl IdentityTracker {
    pub(crate) fn new() -> Self {
        Self {
            open: HashMap::new(),
        }
    }

    /// Registers entry of `idx` at `depth` (the depth the walker is about to
    /// occupy). Returns `WalkError::CycleDetected` when `idx` is an open
    /// ancestor of the current path.
    pub(crate) fn enter(&mut self, idx: Index, depth: i64) -> WalkResult<()> {
        // Close bookkeeping from sibling subtrees that have fully exited.
        self.open.retain(|_, recorded| *recorded < depth);

        // Anything that survived the purge sits strictly above the entering
        // depth, so a hit is an ancestor reappearing on its own path.
        if self.open.contains_key(&idx) {
            trace!(?idx, depth, "back-edge to open ancestor");
            return Err(WalkError::CycleDetected { depth });
        }

        self.open.insert(idx, depth);
        Ok(())
    }

    /// Number of identities currently recorded as open.
    #[cfg(test)]
    pub(crate) fn open_count(&self) -> usize {
        self.open.len()
    }
}
