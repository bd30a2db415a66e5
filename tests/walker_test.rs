//! Walker tests built directly on the arena: branch kinds, post-order,
//! error propagation, aliasing and cycle handling.

use generational_arena::Index;

use rswalk::util::testing::init_test_setup;
use rswalk::{AdditionalBranch, Items, Schema, SchemaArena, WalkError, Walker};

fn new_test_schema() -> Schema {
    Schema::new().with_type("object")
}

/// Adds a subschema to a sequence-type branch, AnyOf chosen arbitrarily.
fn with_slice_child(doc: &mut SchemaArena, parent: Index) -> Index {
    let child = doc.insert(new_test_schema());
    doc.get_mut(parent).unwrap().any_of.push(child);
    child
}

/// Adds a subschema to a map-type branch, Properties chosen arbitrarily.
/// The key is persisted as the child's title so tests can look it up again.
fn with_map_child(doc: &mut SchemaArena, parent: Index, key: &str) -> Index {
    let child = doc.insert(new_test_schema().with_title(key));
    doc.get_mut(parent)
        .unwrap()
        .properties
        .insert(key.to_string(), child);
    child
}

/// The stock mutator: appends a "." to the description, for want of a better
/// way of tracking mutations.
fn touch(schema: &mut Schema) -> Result<(), WalkError> {
    let seen = schema.description.take().unwrap_or_default();
    schema.description = Some(seen + ".");
    Ok(())
}

fn description_of(doc: &SchemaArena, idx: Index) -> String {
    doc.get(idx).unwrap().description.clone().unwrap_or_default()
}

// ============================================================
// Basic Functionality Tests
// ============================================================

#[test]
fn given_root_only_when_walking_then_root_is_touched_once() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema());
    let mut walker = Walker::new();

    walker.depth_first(&mut doc, &mut touch).unwrap();

    assert_eq!(walker.iter(), 1);
    assert_eq!(description_of(&doc, root), ".", "root touched");
    assert!(walker.cycles().is_empty());
}

#[test]
fn given_single_child_when_walking_then_both_nodes_are_touched() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema());
    let child = with_slice_child(&mut doc, root);
    let mut walker = Walker::new();

    walker.depth_first(&mut doc, &mut touch).unwrap();

    assert_eq!(walker.iter(), 2, "iter");
    assert_eq!(description_of(&doc, root), ".", "root touched");
    assert_eq!(description_of(&doc, child), ".", "child touched");
}

#[test]
fn given_slice_children_when_walking_then_every_element_is_touched() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema());
    let child1 = with_slice_child(&mut doc, root);
    let child2 = with_slice_child(&mut doc, root);
    let mut walker = Walker::new();

    walker.depth_first(&mut doc, &mut touch).unwrap();

    assert_eq!(walker.iter(), 3);
    assert_eq!(description_of(&doc, root), ".");
    assert_eq!(description_of(&doc, child1), ".");
    assert_eq!(description_of(&doc, child2), ".");
}

#[test]
fn given_map_children_when_walking_then_every_entry_is_touched() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema());
    let child1 = with_map_child(&mut doc, root, "alpha");
    let child2 = with_map_child(&mut doc, root, "beta");
    let mut walker = Walker::new();

    walker.depth_first(&mut doc, &mut touch).unwrap();

    assert_eq!(walker.iter(), 3);
    assert_eq!(description_of(&doc, root), ".");
    assert_eq!(description_of(&doc, child1), ".", "child touched");
    assert_eq!(description_of(&doc, child2), ".", "child2 touched");
}

// ============================================================
// Ordering Tests
// ============================================================

#[test]
fn given_two_level_tree_when_walking_then_mutation_is_post_order() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema().with_title("root"));
    let child = doc.insert(new_test_schema().with_title("child"));
    doc.get_mut(root).unwrap().any_of.push(child);

    let mut order: Vec<String> = Vec::new();
    let mut walker = Walker::new();
    walker
        .depth_first(&mut doc, &mut |s: &mut Schema| {
            // The child's earlier in-place change must already be visible
            // when the root is reached.
            if s.title.as_deref() == Some("root") {
                assert!(s.any_of.len() == 1);
            }
            order.push(s.title.clone().unwrap());
            s.description = Some("mutated".to_string());
            Ok(())
        })
        .unwrap();

    assert_eq!(order, vec!["child", "root"]);
    assert_eq!(description_of(&doc, child), "mutated");
}

#[test]
fn given_mixed_branches_when_walking_then_branch_kinds_follow_fixed_order() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema().with_title("root"));

    let any = doc.insert(new_test_schema().with_title("any"));
    let all = doc.insert(new_test_schema().with_title("all"));
    let one = doc.insert(new_test_schema().with_title("one"));
    let extra = doc.insert(new_test_schema().with_title("extra"));
    let item = doc.insert(new_test_schema().with_title("item"));
    {
        let node = doc.get_mut(root).unwrap();
        node.any_of.push(any);
        node.all_of.push(all);
        node.one_of.push(one);
        node.additional_properties = Some(AdditionalBranch::schema(extra));
        node.items = Some(Items::Single(item));
    }

    let mut order: Vec<String> = Vec::new();
    let mut walker = Walker::new();
    walker
        .depth_first(&mut doc, &mut |s: &mut Schema| {
            order.push(s.title.clone().unwrap());
            Ok(())
        })
        .unwrap();

    assert_eq!(order, vec!["any", "all", "one", "extra", "item", "root"]);
}

#[test]
fn given_disabled_additional_branch_when_walking_then_it_is_skipped() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema());
    let hidden = doc.insert(new_test_schema());
    {
        let node = doc.get_mut(root).unwrap();
        node.additional_properties = Some(AdditionalBranch {
            allows: false,
            schema: Some(hidden),
        });
        node.additional_items = Some(AdditionalBranch::allowed(true));
    }

    let mut walker = Walker::new();
    walker.depth_first(&mut doc, &mut touch).unwrap();

    assert_eq!(walker.iter(), 1, "only the root is entered");
    assert_eq!(description_of(&doc, hidden), "");
}

#[test]
fn given_items_list_when_walking_then_elements_are_visited_in_sequence_order() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema().with_title("root"));
    let first = doc.insert(new_test_schema().with_title("first"));
    let second = doc.insert(new_test_schema().with_title("second"));
    doc.get_mut(root).unwrap().items = Some(Items::List(vec![first, second]));

    let mut order: Vec<String> = Vec::new();
    let mut walker = Walker::new();
    walker
        .depth_first(&mut doc, &mut |s: &mut Schema| {
            order.push(s.title.clone().unwrap());
            Ok(())
        })
        .unwrap();

    assert_eq!(order, vec!["first", "second", "root"]);
}

// ============================================================
// Error Propagation Tests
// ============================================================

#[test]
fn given_failing_mutator_when_walking_then_no_mutation_survives_before_first_call() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema());
    let child = with_slice_child(&mut doc, root);

    let mut walker = Walker::new();
    let err = walker
        .depth_first(&mut doc, &mut |_: &mut Schema| {
            Err(WalkError::Mutator("myError".to_string()))
        })
        .unwrap_err();

    assert!(matches!(err, WalkError::Mutator(_)));
    assert_eq!(walker.iter(), 2);
    assert_eq!(description_of(&doc, root), "", "root untouched");
    assert_eq!(description_of(&doc, child), "", "child untouched");
}

#[test]
fn given_error_on_third_node_when_walking_then_first_two_mutations_are_kept() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema());
    let a = with_slice_child(&mut doc, root);
    let b = with_slice_child(&mut doc, root);
    let c = with_slice_child(&mut doc, root);

    let mut calls = 0;
    let mut walker = Walker::new();
    let err = walker
        .depth_first(&mut doc, &mut |s: &mut Schema| {
            calls += 1;
            if calls == 3 {
                return Err(WalkError::Mutator("third node".to_string()));
            }
            touch(s)
        })
        .unwrap_err();

    assert!(matches!(err, WalkError::Mutator(_)));
    assert_eq!(calls, 3, "traversal stops at the failing call");
    assert_eq!(description_of(&doc, a), ".", "first mutation kept");
    assert_eq!(description_of(&doc, b), ".", "second mutation kept");
    assert_eq!(description_of(&doc, c), "", "failing node not mutated");
    assert_eq!(description_of(&doc, root), "", "root never reached");
}

// ============================================================
// Aliasing Tests
// ============================================================

#[test]
fn given_shared_instance_in_sibling_slots_when_walking_then_each_path_is_visited() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema());
    let shared = doc.insert(new_test_schema());
    {
        let node = doc.get_mut(root).unwrap();
        node.any_of.push(shared);
        node.any_of.push(shared);
    }

    let mut walker = Walker::new();
    walker.depth_first(&mut doc, &mut touch).unwrap();

    // One storage location, two path occurrences: the second call sees the
    // first call's mutation.
    assert_eq!(walker.iter(), 3);
    assert_eq!(description_of(&doc, shared), "..");
    assert_eq!(description_of(&doc, root), ".");
    assert!(walker.cycles().is_empty(), "aliasing is not a cycle");
}

#[test]
fn given_equal_content_in_separate_instances_when_walking_then_each_is_mutated_independently() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema());
    let twin1 = doc.insert(new_test_schema().with_title("twin"));
    let twin2 = doc.insert(new_test_schema().with_title("twin"));
    {
        let node = doc.get_mut(root).unwrap();
        node.any_of.push(twin1);
        node.any_of.push(twin2);
    }

    let mut walker = Walker::new();
    walker.depth_first(&mut doc, &mut touch).unwrap();

    assert_eq!(description_of(&doc, twin1), ".", "content equality is not identity");
    assert_eq!(description_of(&doc, twin2), ".");
}

#[test]
fn given_shared_subtree_across_branch_kinds_when_walking_then_no_cycle_is_reported() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema());
    let shared = doc.insert(new_test_schema());
    let leaf = doc.insert(new_test_schema());
    doc.get_mut(shared)
        .unwrap()
        .properties
        .insert("leaf".to_string(), leaf);
    {
        let node = doc.get_mut(root).unwrap();
        node.any_of.push(shared);
        node.one_of.push(shared);
    }

    let mut walker = Walker::new();
    walker.depth_first(&mut doc, &mut touch).unwrap();

    // shared and its leaf are walked once per path occurrence.
    assert_eq!(walker.iter(), 5);
    assert_eq!(description_of(&doc, shared), "..");
    assert_eq!(description_of(&doc, leaf), "..");
    assert!(walker.cycles().is_empty());
}

// ============================================================
// Cycle Detection Tests
// ============================================================

#[test]
fn given_two_node_cycle_when_walking_then_back_edge_is_skipped() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema());
    let child = doc.insert(new_test_schema());
    doc.get_mut(root).unwrap().additional_properties = Some(AdditionalBranch::schema(child));
    doc.get_mut(child).unwrap().additional_properties = Some(AdditionalBranch::schema(root));

    let mut walker = Walker::new();
    walker.depth_first(&mut doc, &mut touch).unwrap();

    // The back-edge attempt consumes an iteration slot without a mutator call.
    assert_eq!(walker.iter(), 3);
    assert_eq!(description_of(&doc, root), ".");
    assert_eq!(description_of(&doc, child), ".");
    assert_eq!(walker.cycles().len(), 1);
    assert_eq!(walker.cycles()[0].iter, 3);
    assert_eq!(walker.cycles()[0].depth, 2);
}

#[test]
fn given_nested_cycle_when_walking_then_every_real_node_is_touched_once() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema());
    let child = doc.insert(new_test_schema());
    let grandchild = doc.insert(new_test_schema());
    doc.get_mut(root).unwrap().additional_properties = Some(AdditionalBranch::schema(child));
    doc.get_mut(child).unwrap().additional_properties = Some(AdditionalBranch::schema(grandchild));
    doc.get_mut(grandchild).unwrap().additional_properties = Some(AdditionalBranch::schema(root));

    let mut walker = Walker::new();
    walker.depth_first(&mut doc, &mut touch).unwrap();

    assert_eq!(walker.iter(), 4);
    assert_eq!(description_of(&doc, root), ".");
    assert_eq!(description_of(&doc, child), ".");
    assert_eq!(description_of(&doc, grandchild), ".");
    assert_eq!(walker.cycles().len(), 1);
}

#[test]
fn given_two_back_edges_when_walking_then_both_are_logged() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema());
    let child1 = doc.insert(new_test_schema());
    let child2 = doc.insert(new_test_schema());
    doc.get_mut(child1).unwrap().additional_properties = Some(AdditionalBranch::schema(root));
    doc.get_mut(child2).unwrap().additional_properties = Some(AdditionalBranch::schema(root));
    {
        let node = doc.get_mut(root).unwrap();
        node.additional_properties = Some(AdditionalBranch::schema(child1));
        node.additional_items = Some(AdditionalBranch::schema(child2));
    }

    let mut walker = Walker::new();
    walker.depth_first(&mut doc, &mut touch).unwrap();

    assert_eq!(walker.iter(), 5);
    assert_eq!(description_of(&doc, root), ".");
    assert_eq!(description_of(&doc, child1), ".");
    assert_eq!(description_of(&doc, child2), ".");
    assert_eq!(walker.cycles().len(), 2);
}

#[test]
fn given_back_edge_to_root_at_depth_two_when_walking_then_event_records_that_depth() {
    init_test_setup();
    let mut doc = SchemaArena::new();
    let root = doc.insert_root(new_test_schema());
    let child = with_map_child(&mut doc, root, "inner");
    doc.get_mut(child).unwrap().additional_properties = Some(AdditionalBranch::schema(root));

    let mut calls = 0;
    let mut walker = Walker::new();
    walker
        .depth_first(&mut doc, &mut |_: &mut Schema| {
            calls += 1;
            Ok(())
        })
        .unwrap();

    assert_eq!(calls, 2, "the ancestor is never mutated along the back-edge");
    assert_eq!(walker.cycles().len(), 1);
    assert_eq!(walker.cycles()[0].depth, 2);
}
