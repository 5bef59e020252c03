//! Tests for link feasibility and the predecessor scanner.
mod common;
use common::*;
use kairo::prelude::*;
use kairo::verify::{PredecessorScanner, ScanBoundary, orient};

#[test]
fn test_pins_of_the_same_node_cannot_link() {
    let mut graph = FsmGraph::new();
    let state = graph.create_state("Idle").expect("state");
    let check = graph.create_if().expect("if");

    let state_in = input_of(&graph, state);
    let state_out = output_of(&graph, state, 0);
    assert_eq!(verify(&graph, state_out, state_in), Feasibility::CannotLinkToItself);
    assert_eq!(verify(&graph, state_in, state_out), Feasibility::CannotLinkToItself);

    let check_in = input_of(&graph, check);
    for index in [IfNode::THEN, IfNode::ELSE] {
        let out = output_of(&graph, check, index);
        assert_eq!(verify(&graph, out, check_in), Feasibility::CannotLinkToItself);
    }
}

#[test]
fn test_outputs_and_inputs_cannot_link_together() {
    let mut graph = FsmGraph::new();
    let a = graph.create_state("A").expect("state");
    let b = graph.create_if().expect("if");

    assert_eq!(
        verify(&graph, output_of(&graph, a, 0), output_of(&graph, b, 1)),
        Feasibility::CannotLinkOutputs
    );
    assert_eq!(
        verify(&graph, input_of(&graph, a), input_of(&graph, b)),
        Feasibility::CannotLinkInputs
    );
    // Two outputs of one node are rejected as outputs before the same-node check.
    assert_eq!(
        verify(&graph, output_of(&graph, b, 0), output_of(&graph, b, 1)),
        Feasibility::CannotLinkOutputs
    );
}

#[test]
fn test_duplicate_link_in_either_order() {
    let mut graph = FsmGraph::new();
    let a = graph.create_state("A").expect("state");
    let b = graph.create_state("B").expect("state");
    let out = output_of(&graph, a, 0);
    let input = input_of(&graph, b);

    assert_eq!(verify(&graph, out, input), Feasibility::Feasible);
    graph.try_link(out, input).expect("first link");

    assert_eq!(verify(&graph, out, input), Feasibility::DuplicateLink);
    assert_eq!(verify(&graph, input, out), Feasibility::DuplicateLink);
    assert_eq!(graph.try_link(input, out), Err(Feasibility::DuplicateLink));
    assert_eq!(graph.link_count(), 1);
}

#[test]
fn test_conditional_cycle_is_rejected() {
    let mut graph = FsmGraph::new();
    let a = graph.create_if().expect("if");
    let b = graph.create_if().expect("if");
    link(&mut graph, a, IfNode::THEN, b);

    let back = (output_of(&graph, b, IfNode::ELSE), input_of(&graph, a));
    assert_eq!(
        verify(&graph, back.0, back.1),
        Feasibility::CannotLinkToPredecessor
    );
    assert_eq!(graph.try_link(back.1, back.0), Err(Feasibility::CannotLinkToPredecessor));
}

#[test]
fn test_state_predecessor_allows_cycle() {
    let mut graph = FsmGraph::new();
    let a = graph.create_state("A").expect("state");
    let b = graph.create_if().expect("if");
    link(&mut graph, a, 0, b);

    let out = output_of(&graph, b, IfNode::THEN);
    let input = input_of(&graph, a);
    assert_eq!(verify(&graph, out, input), Feasibility::Feasible);
    assert!(graph.try_link(out, input).is_ok());
    assert!(graph.validate().is_ok());
}

#[test]
fn test_predecessor_search_crosses_conditional_chains() {
    let mut graph = FsmGraph::new();
    let a = graph.create_if().expect("if");
    let b = graph.create_cond(2).expect("cond");
    let c = graph.create_if().expect("if");
    link(&mut graph, a, IfNode::THEN, b);
    link(&mut graph, b, 1, c);

    assert_eq!(
        verify(&graph, output_of(&graph, c, 0), input_of(&graph, a)),
        Feasibility::CannotLinkToPredecessor
    );
}

#[test]
fn test_state_nodes_bound_the_predecessor_search() {
    let mut graph = FsmGraph::new();
    let a = graph.create_if().expect("if");
    let state = graph.create_state("Between").expect("state");
    let c = graph.create_if().expect("if");
    link(&mut graph, a, IfNode::THEN, state);
    link(&mut graph, state, 0, c);

    assert_eq!(
        verify(&graph, output_of(&graph, c, 0), input_of(&graph, a)),
        Feasibility::Feasible
    );

    let bounded = PredecessorScanner::new(&graph, ScanBoundary::StateNodes);
    assert!(!bounded.is_predecessor(c, state));
    assert!(!bounded.is_predecessor(c, a));

    let unbounded = PredecessorScanner::new(&graph, ScanBoundary::Unbounded);
    assert!(unbounded.is_predecessor(c, state));
    assert!(unbounded.is_predecessor(c, a));
}

#[test]
fn test_predecessor_scan_terminates_on_diamonds_and_state_cycles() {
    let mut graph = FsmGraph::new();
    let s1 = graph.create_state("S1").expect("state");
    let s2 = graph.create_state("S2").expect("state");
    link(&mut graph, s1, 0, s2);
    link(&mut graph, s2, 0, s1);

    let top = graph.create_if().expect("if");
    let left = graph.create_if().expect("if");
    let right = graph.create_if().expect("if");
    let bottom = graph.create_cond(1).expect("cond");
    link(&mut graph, s1, 0, top);
    link(&mut graph, top, IfNode::THEN, left);
    link(&mut graph, top, IfNode::ELSE, right);
    link(&mut graph, left, 0, bottom);
    link(&mut graph, right, 0, bottom);

    let unrelated = graph.create_state("Unrelated").expect("state");

    let unbounded = PredecessorScanner::new(&graph, ScanBoundary::Unbounded);
    assert!(unbounded.is_predecessor(bottom, s2));
    assert!(!unbounded.is_predecessor(bottom, unrelated));
}

#[test]
fn test_unknown_pins_are_invalid() {
    let mut graph = FsmGraph::new();
    let a = graph.create_state("A").expect("state");
    let out = output_of(&graph, a, 0);

    assert_eq!(verify(&graph, out, Id::new(999)), Feasibility::InvalidNode);
    assert_eq!(verify(&graph, Id::NONE, out), Feasibility::InvalidNode);
}

#[test]
fn test_try_link_orients_output_to_input() {
    let mut graph = FsmGraph::new();
    let a = graph.create_state("A").expect("state");
    let b = graph.create_state("B").expect("state");
    let out = output_of(&graph, a, 0);
    let input = input_of(&graph, b);

    assert_eq!(orient(&graph, input, out), Some(PinPair::new(out, input)));

    let link_id = graph.try_link(input, out).expect("feasible");
    assert_eq!(graph.link_info(link_id), Some(PinPair::new(out, input)));
    assert_eq!(graph.find_link(out, input), Some(link_id));
    assert_eq!(graph.find_link(input, out), None);
}

#[test]
fn test_feasibility_messages() {
    assert!(Feasibility::Feasible.is_feasible());
    assert!(!Feasibility::DuplicateLink.is_feasible());
    assert_eq!(
        Feasibility::CannotLinkToPredecessor.to_string(),
        "This node cannot be connected to a predecessor."
    );
    assert_eq!(
        Feasibility::CannotLinkInputs.to_string(),
        "Cannot link inputs together."
    );
}
