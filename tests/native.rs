//! Tests for the native binary format.
mod common;
use common::*;
use kairo::native::{MAGIC_HEADER, NODES_MAGIC};
use kairo::prelude::*;
use std::sync::Arc;

/// Offset of the first node tag in a graph holding a single state node:
/// header, counter, pins table (2 pins without links), links table header,
/// nodes table header.
const SINGLE_STATE_TAG_OFFSET: usize = 4 + 8 + (4 + 8 + 2 * 24) + (4 + 8) + (4 + 8);

fn assert_same_graph(left: &FsmGraph, right: &FsmGraph) {
    assert_eq!(left.last_allocated_id(), right.last_allocated_id());
    assert_eq!(left.node_count(), right.node_count());
    assert_eq!(left.pin_count(), right.pin_count());
    assert_eq!(left.link_count(), right.link_count());
    for node in left.nodes() {
        assert_eq!(Some(node), right.node(node.id()));
    }
    for (pin, info) in left.pins() {
        assert_eq!(Some(info), right.pin_info(pin));
    }
    for (link, pair) in left.links() {
        assert_eq!(Some(pair), right.link_info(link));
    }
}

#[test]
fn test_round_trip_preserves_ids_and_payloads() {
    let mut fixture = state_if_two_states();
    let cond = fixture.graph.create_cond(2).expect("cond");
    set_cond_text(&mut fixture.graph, cond, 1, "self.timer > 3");
    link(&mut fixture.graph, fixture.on_false, 0, cond);

    let bytes = fixture.graph.to_native_bytes().expect("write");
    let loaded = FsmGraph::read_native(&mut bytes.as_slice(), fixture.graph.catalog().cloned())
        .expect("read");

    assert_same_graph(&fixture.graph, &loaded);

    let guard = loaded.node(fixture.check).and_then(|n| n.as_if()).expect("if").guard();
    assert!(guard.has_option("on ground"));
    assert_eq!(guard.as_expression_text(), "self.on_ground");
}

#[test]
fn test_writer_is_deterministic() {
    let fixture = state_cond_chain();
    let first = fixture.graph.to_native_bytes().expect("write");
    let second = fixture.graph.to_native_bytes().expect("write");
    assert_eq!(first, second);

    let loaded = FsmGraph::read_native(&mut first.as_slice(), None).expect("read");
    assert_eq!(loaded.to_native_bytes().expect("write"), first);
}

#[test]
fn test_layout_is_little_endian() {
    let mut graph = FsmGraph::new();
    graph.create_state("S").expect("state");
    let bytes = graph.to_native_bytes().expect("write");

    assert_eq!(&bytes[0..4], &MAGIC_HEADER.to_le_bytes());
    assert_eq!(&bytes[4..12], &graph.last_allocated_id().to_le_bytes());
    assert_eq!(
        &bytes[SINGLE_STATE_TAG_OFFSET - 12..SINGLE_STATE_TAG_OFFSET - 8],
        &NODES_MAGIC.to_le_bytes()
    );
    assert_eq!(bytes[SINGLE_STATE_TAG_OFFSET], NodeVariant::State.tag());
    // tag, id, inputs, outputs, then the name: length and raw bytes.
    let name_at = SINGLE_STATE_TAG_OFFSET + 1 + 8 + 16 + 16;
    assert_eq!(&bytes[name_at..name_at + 8], &1u64.to_le_bytes());
    assert_eq!(&bytes[name_at + 8..], b"S");
}

#[test]
fn test_bad_magic_is_rejected() {
    let graph = state_cond_chain().graph;
    let mut bytes = graph.to_native_bytes().expect("write");
    bytes[0] ^= 0xFF;

    let err = FsmGraph::read_native(&mut bytes.as_slice(), None).unwrap_err();
    assert!(matches!(
        err,
        NativeFormatError::BadMagic { section: "header", expected: MAGIC_HEADER, .. }
    ));
}

#[test]
fn test_unknown_node_tag_is_rejected() {
    let mut graph = FsmGraph::new();
    let state = graph.create_state("S").expect("state");
    let mut bytes = graph.to_native_bytes().expect("write");
    bytes[SINGLE_STATE_TAG_OFFSET] = 7;

    let err = FsmGraph::read_native(&mut bytes.as_slice(), None).unwrap_err();
    assert!(matches!(
        err,
        NativeFormatError::UnknownNodeTag { node_id, tag: 7 } if node_id == state
    ));
}

#[test]
fn test_oversized_text_is_rejected() {
    let mut graph = FsmGraph::new();
    graph.create_state("S").expect("state");
    let mut bytes = graph.to_native_bytes().expect("write");
    let name_at = SINGLE_STATE_TAG_OFFSET + 1 + 8 + 16 + 16;
    bytes[name_at..name_at + 8].copy_from_slice(&5000u64.to_le_bytes());

    let err = FsmGraph::read_native(&mut bytes.as_slice(), None).unwrap_err();
    assert!(matches!(err, NativeFormatError::TextOverflow { len: 5000, .. }));
}

#[test]
fn test_ids_above_the_saved_counter_are_rejected() {
    let graph = state_cond_chain().graph;
    let mut bytes = graph.to_native_bytes().expect("write");
    bytes[4..12].copy_from_slice(&1u64.to_le_bytes());

    let err = FsmGraph::read_native(&mut bytes.as_slice(), None).unwrap_err();
    assert!(matches!(
        err,
        NativeFormatError::InvalidGraph(GraphError::IdAboveCounter { .. })
    ));
}

#[test]
fn test_counter_at_the_sentinel_is_rejected() {
    let mut graph = FsmGraph::new();
    graph.create_state("S").expect("state");
    let mut bytes = graph.to_native_bytes().expect("write");
    bytes[4..12].copy_from_slice(&u64::MAX.to_le_bytes());

    let err = FsmGraph::read_native(&mut bytes.as_slice(), None).unwrap_err();
    assert!(matches!(
        err,
        NativeFormatError::InvalidGraph(GraphError::CounterOutOfRange {
            last_allocated: u64::MAX,
            max: MAX_ID
        })
    ));
}

#[test]
fn test_reserved_and_shared_ids_are_rejected() {
    let mut graph = FsmGraph::new();
    let state = graph.create_state("S").expect("state");
    let input = input_of(&graph, state);
    let bytes = graph.to_native_bytes().expect("write");
    let node_id_at = SINGLE_STATE_TAG_OFFSET + 1;

    let mut zeroed = bytes.clone();
    zeroed[node_id_at..node_id_at + 8].copy_from_slice(&0u64.to_le_bytes());
    let err = FsmGraph::read_native(&mut zeroed.as_slice(), None).unwrap_err();
    assert!(matches!(
        err,
        NativeFormatError::InvalidGraph(GraphError::ReservedId)
    ));

    let mut shared = bytes;
    shared[node_id_at..node_id_at + 8].copy_from_slice(&input.raw().to_le_bytes());
    let err = FsmGraph::read_native(&mut shared.as_slice(), None).unwrap_err();
    assert!(matches!(
        err,
        NativeFormatError::InvalidGraph(GraphError::DuplicateId { id }) if id == input
    ));
}

#[test]
fn test_input_to_input_link_in_file_is_rejected() {
    let mut graph = FsmGraph::new();
    let a = graph.create_state("A").expect("state");
    let b = graph.create_state("B").expect("state");
    let a_in = input_of(&graph, a);
    let b_in = input_of(&graph, b);
    let link_id = graph.create_link(a_in, b_in).expect("link");
    let bytes = graph.to_native_bytes().expect("write");

    let err = FsmGraph::read_native(&mut bytes.as_slice(), None).unwrap_err();
    assert!(matches!(
        err,
        NativeFormatError::InvalidGraph(GraphError::LinkDirection { link_id: id }) if id == link_id
    ));
}

#[test]
fn test_conditional_cycle_in_file_is_rejected() {
    let mut graph = FsmGraph::new();
    let a = graph.create_if().expect("if");
    let b = graph.create_cond(1).expect("cond");
    link(&mut graph, a, IfNode::THEN, b);
    let b_out = output_of(&graph, b, 0);
    let a_in = input_of(&graph, a);
    graph.create_link(b_out, a_in).expect("link");
    let bytes = graph.to_native_bytes().expect("write");

    let mut target = FsmGraph::new();
    let err = target.load_native(&mut bytes.as_slice()).unwrap_err();
    assert!(matches!(
        err,
        NativeFormatError::InvalidGraph(GraphError::ConditionalCycle { .. })
    ));
    assert!(target.is_empty());
}

#[test]
fn test_failed_load_leaves_graph_untouched() {
    let mut fixture = state_if_two_states();
    let before = fixture.graph.to_native_bytes().expect("write");

    let other = state_cond_chain().graph.to_native_bytes().expect("write");
    let truncated = &other[..other.len() / 2];

    assert!(fixture.graph.load_native(&mut &truncated[..]).is_err());
    assert_eq!(fixture.graph.to_native_bytes().expect("write"), before);
    assert!(fixture.graph.validate().is_ok());
}

#[test]
fn test_load_replaces_graph_and_keeps_catalog() {
    let source = state_cond_chain().graph;
    let bytes = source.to_native_bytes().expect("write");

    let mut target = state_if_two_states().graph;
    let catalog = target.catalog().cloned().expect("catalog");
    target.load_native(&mut bytes.as_slice()).expect("load");

    assert_same_graph(&source, &target);
    assert!(Arc::ptr_eq(target.catalog().expect("catalog"), &catalog));
}

#[test]
fn test_unknown_shorthands_are_dropped() {
    let mut graph = FsmGraph::builder().with_catalog(sample_catalog()).build();
    let check = graph.create_if().expect("if");
    let catalog = graph.catalog().cloned().expect("catalog");
    {
        let guard = graph
            .node_mut(check)
            .and_then(|n| n.as_if_mut())
            .expect("if")
            .guard_mut();
        for shorthand in ["falling", "low health"] {
            guard.insert_option(catalog.find_by_shorthand(shorthand).expect("option"));
        }
    }
    let bytes = graph.to_native_bytes().expect("write");

    let mut reduced = ExpressionCatalog::new();
    reduced
        .add_option("Movement", ExpressionOption::new("falling", "self.velocity.y < 0"))
        .expect("add");
    let loaded = FsmGraph::read_native(&mut bytes.as_slice(), Some(Arc::new(reduced)))
        .expect("load succeeds");

    let guard = loaded.node(check).and_then(|n| n.as_if()).expect("if").guard();
    assert!(guard.has_option("falling"));
    assert!(!guard.has_option("low health"));

    let without_catalog = FsmGraph::read_native(&mut bytes.as_slice(), None).expect("load");
    let guard = without_catalog.node(check).and_then(|n| n.as_if()).expect("if").guard();
    assert_eq!(guard.options().count(), 0);
}

#[test]
fn test_save_and_load_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("machine.fsm");
    let path = path.to_str().expect("utf-8 path");

    let fixture = state_if_two_states();
    fixture.graph.save(path).expect("save");

    let mut loaded = FsmGraph::builder().with_catalog(sample_catalog()).build();
    loaded.load(path).expect("load");
    assert_same_graph(&fixture.graph, &loaded);

    let missing = dir.path().join("missing.fsm");
    let err = loaded.load(missing.to_str().expect("utf-8 path")).unwrap_err();
    assert!(matches!(err, NativeFormatError::Io { .. }));
    assert_same_graph(&fixture.graph, &loaded);
}
