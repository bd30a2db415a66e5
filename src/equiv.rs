//! Structural equivalence between two schema documents
//!
//! Content equality from the roots: arena layout, aliasing and cycles never
//! affect the verdict. A pair of nodes already under comparison is assumed
//! equal, which makes the check terminate on cyclic documents. Used by the
//! surrounding system and tests, never by the walker.

use std::collections::{BTreeMap, HashSet};

use generational_arena::Index;

use crate::document::SchemaArena;
use crate::schema::{AdditionalBranch, Items};

/// Compares two documents for structural content equality.
pub fn schemas_are_equivalent(a: &SchemaArena, b: &SchemaArena) -> bool {
    match (a.root(), b.root()) {
        (Some(root_a), Some(root_b)) => {
            let mut in_progress = HashSet::new();
            nodes_equivalent(a, root_a, b, root_b, &mut in_progress)
        }
        (None, None) => true,
        _ => false,
    }
}

fn nodes_equivalent(
    a: &SchemaArena,
    ia: Index,
    b: &SchemaArena,
    ib: Index,
    in_progress: &mut HashSet<(Index, Index)>,
) -> bool {
    if !in_progress.insert((ia, ib)) {
        return true;
    }
    let (Some(na), Some(nb)) = (a.get(ia), b.get(ib)) else {
        return false;
    };

    na.title == nb.title
        && na.description == nb.description
        && na.schema_type == nb.schema_type
        && na.reference == nb.reference
        && lists_equivalent(a, &na.any_of, b, &nb.any_of, in_progress)
        && lists_equivalent(a, &na.all_of, b, &nb.all_of, in_progress)
        && lists_equivalent(a, &na.one_of, b, &nb.one_of, in_progress)
        && maps_equivalent(a, &na.properties, b, &nb.properties, in_progress)
        && maps_equivalent(
            a,
            &na.pattern_properties,
            b,
            &nb.pattern_properties,
            in_progress,
        )
        && additional_equivalent(
            a,
            na.additional_properties.as_ref(),
            b,
            nb.additional_properties.as_ref(),
            in_progress,
        )
        && additional_equivalent(
            a,
            na.additional_items.as_ref(),
            b,
            nb.additional_items.as_ref(),
            in_progress,
        )
        && items_equivalent(a, na.items.as_ref(), b, nb.items.as_ref(), in_progress)
        && maps_equivalent(a, &na.definitions, b, &nb.definitions, in_progress)
}

fn lists_equivalent(
    a: &SchemaArena,
    la: &[Index],
    b: &SchemaArena,
    lb: &[Index],
    in_progress: &mut HashSet<(Index, Index)>,
) -> bool {
    la.len() == lb.len()
        && la
            .iter()
            .zip(lb)
            .all(|(&ia, &ib)| nodes_equivalent(a, ia, b, ib, in_progress))
}

fn maps_equivalent(
    a: &SchemaArena,
    ma: &BTreeMap<String, Index>,
    b: &SchemaArena,
    mb: &BTreeMap<String, Index>,
    in_progress: &mut HashSet<(Index, Index)>,
) -> bool {
    ma.len() == mb.len()
        && ma.iter().all(|(key, &ia)| match mb.get(key) {
            Some(&ib) => nodes_equivalent(a, ia, b, ib, in_progress),
            None => false,
        })
}

fn additional_equivalent(
    a: &SchemaArena,
    ba: Option<&AdditionalBranch>,
    b: &SchemaArena,
    bb: Option<&AdditionalBranch>,
    in_progress: &mut HashSet<(Index, Index)>,
) -> bool {
    match (ba, bb) {
        (None, None) => true,
        (Some(ba), Some(bb)) => {
            ba.allows == bb.allows
                && match (ba.schema, bb.schema) {
                    (None, None) => true,
                    (Some(ia), Some(ib)) => nodes_equivalent(a, ia, b, ib, in_progress),
                    _ => false,
                }
        }
        _ => false,
    }
}

fn items_equivalent(
    a: &SchemaArena,
    ia: Option<&Items>,
    b: &SchemaArena,
    ib: Option<&Items>,
    in_progress: &mut HashSet<(Index, Index)>,
) -> bool {
    match (ia, ib) {
        (None, None) => true,
        (Some(Items::Single(sa)), Some(Items::Single(sb))) => {
            nodes_equivalent(a, *sa, b, *sb, in_progress)
        }
        (Some(Items::List(la)), Some(Items::List(lb))) => {
            lists_equivalent(a, la, b, lb, in_progress)
        }
        _ => false,
    }
}
