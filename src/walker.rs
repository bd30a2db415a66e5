//! Depth-first walker with aliasing-aware cycle detection
//!
//! Visits every reachable node of a [`SchemaArena`] in a fixed branch order,
//! strictly post-order: all descendants of a node are visited and mutated
//! before the node itself. Cycle detection is path-sensitive (see
//! [`crate::tracker`]): a shared node reached through two sibling branches is
//! walked once per path, only a still-open ancestor is treated as a back-edge
//! and skipped.
//!
//! One [`Walker`] serves exactly one traversal. Construct a fresh instance per
//! independent walk; counters and the cycle log are not reset between calls.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::document::SchemaArena;
use crate::errors::{WalkError, WalkResult};
use crate::schema::Schema;
use crate::tracker::IdentityTracker;

/// Per-node mutation callback, invoked post-order with exclusive access to
/// the node. It may rewrite scalar fields and branch contents freely; it must
/// not re-invoke the walker and must not alias an in-progress ancestor back
/// into its own subtree.
pub trait Mutator {
    fn on_schema(&mut self, schema: &mut Schema) -> WalkResult<()>;
}

impl<F> Mutator for F
where
    F: FnMut(&mut Schema) -> WalkResult<()>,
{
    fn on_schema(&mut self, schema: &mut Schema) -> WalkResult<()> {
        self(schema)
    }
}

/// One detected back-edge, retained for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleEvent {
    /// Value of the entry counter when the back-edge was attempted.
    pub iter: usize,
    /// Depth the walker was about to occupy.
    pub depth: i64,
}

/// Traversal state for one depth-first walk.
#[derive(Debug)]
pub struct Walker {
    iter: usize,
    depth: i64,
    open: IdentityTracker,
    cycles: Vec<CycleEvent>,
}

impl Default for Walker {
    fn default() -> Self {
        Self::new()
    }
}

impl Walker {
    pub fn new() -> Self {
        Self {
            iter: 0,
            depth: -1,
            open: IdentityTracker::new(),
            cycles: Vec::new(),
        }
    }

    /// Walks the document from its root, applying `mutator` to every visited
    /// node post-order.
    ///
    /// Returns `WalkError::NilRoot` when the document has no root. Back-edges
    /// are skipped and logged, never surfaced as errors; the first error the
    /// mutator returns aborts the traversal and is handed back unchanged.
    /// Mutations applied before an abort are kept.
    #[instrument(level = "trace", skip_all)]
    pub fn depth_first<M: Mutator>(
        &mut self,
        doc: &mut SchemaArena,
        mutator: &mut M,
    ) -> WalkResult<()> {
        let root = doc.root().ok_or(WalkError::NilRoot)?;
        self.walk(doc, root, mutator)
    }

    /// Count of node-entry attempts so far, back-edge attempts included.
    pub fn iter(&self) -> usize {
        self.iter
    }

    /// Current recursion depth; `-1` outside of a walk.
    pub fn depth(&self) -> i64 {
        self.depth
    }

    /// Back-edges detected so far, in detection order.
    pub fn cycles(&self) -> &[CycleEvent] {
        &self.cycles
    }

    fn walk<M: Mutator>(
        &mut self,
        doc: &mut SchemaArena,
        idx: Index,
        mutator: &mut M,
    ) -> WalkResult<()> {
        // The entry counter ticks before the identity check: a back-edge
        // attempt consumes an iteration slot but never reaches the mutator.
        self.iter += 1;
        let entering = self.depth + 1;

        if let Err(err) = self.open.enter(idx, entering) {
            return self.recover(err);
        }

        self.depth = entering;
        let outcome = self.walk_open(doc, idx, mutator);
        self.depth = entering - 1;
        outcome
    }

    fn walk_open<M: Mutator>(
        &mut self,
        doc: &mut SchemaArena,
        idx: Index,
        mutator: &mut M,
    ) -> WalkResult<()> {
        // Snapshot the child edges up front. A descendant's mutator only ever
        // sees its own node, so the edge list of the node being walked cannot
        // change underneath the loop.
        let edges = doc
            .get(idx)
            .ok_or(WalkError::NodeNotFound(idx))?
            .child_edges();

        for child in edges {
            self.walk(doc, child, mutator)?;
        }

        // Post-order: the node itself is mutated only after every branch has
        // completed. Branches hold arena indices, so containers observe the
        // mutated children without an explicit write-back.
        let node = doc.get_mut(idx).ok_or(WalkError::NodeNotFound(idx))?;
        mutator.on_schema(node)
    }

    /// Recovers the tracker's cycle signal locally; any other error is fatal
    /// and propagates unchanged.
    fn recover(&mut self, err: WalkError) -> WalkResult<()> {
        match err {
            WalkError::CycleDetected { depth } => {
                let event = CycleEvent {
                    iter: self.iter,
                    depth,
                };
                debug!(
                    iter = event.iter,
                    depth = event.depth,
                    "back-edge skipped"
                );
                self.cycles.push(event);
                Ok(())
            }
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_root_is_fatal() {
        let mut doc = SchemaArena::new();
        let mut walker = Walker::new();
        let mut mutator = |_: &mut Schema| Ok(());

        let err = walker.depth_first(&mut doc, &mut mutator).unwrap_err();
        assert!(matches!(err, WalkError::NilRoot));
        assert_eq!(walker.iter(), 0, "no entry attempt without a root");
    }

    #[test]
    fn fresh_walker_starts_outside_the_tree() {
        let walker = Walker::new();
        assert_eq!(walker.depth(), -1);
        assert_eq!(walker.iter(), 0);
        assert!(walker.cycles().is_empty());
    }

    #[test]
    fn stale_branch_index_is_fatal() {
        let mut doc = SchemaArena::new();
        let child = doc.insert(Schema::new());

        let mut root = Schema::new();
        root.any_of.push(child);
        doc.insert_root(root);
        doc.remove(child);

        let mut walker = Walker::new();
        let mut mutator = |_: &mut Schema| Ok(());
        let err = walker.depth_first(&mut doc, &mut mutator).unwrap_err();
        assert!(matches!(err, WalkError::NodeNotFound(_)));
    }
}
