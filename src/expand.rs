//! Reference expander: turns `$ref` markers into shared edges
//!
//! Runs before a traversal so the walker only ever sees real node sharing.
//! Every traversal edge that points at a pure `#/definitions/<name>` marker
//! is rewritten to point at the definition's own arena node. Two references
//! to one definition thereby become true aliasing; a definition that refers
//! to itself, directly or through a chain, becomes a genuine back-edge for
//! the walker's cycle oracle.
//!
//! Marker nodes stay in the arena but become unreachable from the root.
//! The `definitions` map is not a traversal edge and is never rewritten,
//! though traversal edges inside a definition's subtree are.

use std::collections::{BTreeMap, HashMap, HashSet};

use generational_arena::Index;
use regex::Regex;
use tracing::{debug, instrument};

use crate::document::SchemaArena;
use crate::errors::{DocumentError, DocumentResult};

/// Resolves all local references in place.
///
/// Errors on a pointer that is not of the form `#/definitions/<name>`, on a
/// name missing from the root's `definitions`, and on a marker chain that
/// never reaches a concrete schema.
#[instrument(level = "debug", skip(doc))]
pub fn expand_references(doc: &mut SchemaArena) -> DocumentResult<()> {
    let root = doc.root().ok_or(DocumentError::EmptyDocument)?;
    let definitions = doc
        .get(root)
        .ok_or(DocumentError::DanglingEdge(root))?
        .definitions
        .clone();

    let pointer = Regex::new(r"^#/definitions/([^/]+)$").unwrap();

    // Chase every marker node down to its concrete target first; rewriting
    // happens in one pass afterwards so chains and forward references do not
    // depend on arena iteration order.
    let markers: Vec<Index> = doc
        .iter()
        .filter(|(_, node)| node.reference.is_some())
        .map(|(idx, _)| idx)
        .collect();

    let mut resolved: HashMap<Index, Index> = HashMap::new();
    for marker in markers {
        let target = resolve(doc, marker, &definitions, &pointer)?;
        debug!(?marker, ?target, "reference resolved");
        resolved.insert(marker, target);
    }

    if resolved.is_empty() {
        return Ok(());
    }

    for (_, node) in doc.iter_mut() {
        for edge in node.child_edges_mut() {
            if let Some(target) = resolved.get(edge) {
                *edge = *target;
            }
        }
    }
    if let Some(target) = resolved.get(&root) {
        doc.set_root(Some(*target));
    }

    Ok(())
}

fn resolve(
    doc: &SchemaArena,
    start: Index,
    definitions: &BTreeMap<String, Index>,
    pointer: &Regex,
) -> DocumentResult<Index> {
    let mut current = start;
    let mut seen: HashSet<Index> = HashSet::new();

    loop {
        let node = doc.get(current).ok_or(DocumentError::DanglingEdge(current))?;
        let Some(reference) = node.reference.clone() else {
            return Ok(current);
        };
        if !seen.insert(current) {
            return Err(DocumentError::ReferenceLoop(reference));
        }

        let name = match pointer.captures(&reference) {
            Some(caps) => caps.get(1).unwrap().as_str().to_string(),
            None => return Err(DocumentError::UnsupportedReference(reference)),
        };
        current = *definitions
            .get(&name)
            .ok_or(DocumentError::UnresolvedReference(reference))?;
    }
}
