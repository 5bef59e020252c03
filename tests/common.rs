//! Common test utilities for building FSM graphs.
use kairo::prelude::*;

/// Catalog with two categories and three options.
#[allow(dead_code)]
pub fn sample_catalog() -> ExpressionCatalog {
    ExpressionCatalog::from_json_str(SAMPLE_CATALOG_JSON).expect("sample catalog parses")
}

#[allow(dead_code)]
pub const SAMPLE_CATALOG_JSON: &str = r#"{
    "Movement": [
        { "shorthand": "on ground", "expression": "self.on_ground" },
        { "shorthand": "falling", "lua_expression": "self.velocity.y < 0" }
    ],
    "Combat": [
        { "shorthand": "low health", "expression": "self.health < 20" }
    ]
}"#;

#[allow(dead_code)]
pub fn input_of(graph: &FsmGraph, node: NodeId) -> PinId {
    graph.node(node).expect("node exists").inputs()[0]
}

#[allow(dead_code)]
pub fn output_of(graph: &FsmGraph, node: NodeId, index: usize) -> PinId {
    graph.node(node).expect("node exists").outputs()[index]
}

/// Links output `index` of `from` to the input of `to`, panicking if the
/// link is rejected.
#[allow(dead_code)]
pub fn link(graph: &mut FsmGraph, from: NodeId, index: usize, to: NodeId) -> LinkId {
    let output = output_of(graph, from, index);
    let input = input_of(graph, to);
    graph
        .try_link(output, input)
        .unwrap_or_else(|f| panic!("link {} -> {} rejected: {}", from, to, f))
}

#[allow(dead_code)]
pub fn set_if_text(graph: &mut FsmGraph, node: NodeId, text: &str) {
    let guard = graph
        .node_mut(node)
        .and_then(|n| n.as_if_mut())
        .expect("if node")
        .guard_mut();
    guard.set_mode(GuardMode::FreeText);
    guard.set_text(text);
}

/// Sets the guard of output `index` of a `Cond` node to free text.
#[allow(dead_code)]
pub fn set_cond_text(graph: &mut FsmGraph, node: NodeId, index: usize, text: &str) {
    let output = output_of(graph, node, index);
    let guard = graph
        .node_mut(node)
        .and_then(|n| n.as_cond_mut())
        .and_then(|cond| cond.guard_mut(output))
        .expect("cond guard");
    guard.set_mode(GuardMode::FreeText);
    guard.set_text(text);
}

/// `Idle -> If(grounded) -> {Walk, Fall}`
#[allow(dead_code)]
pub struct IfFixture {
    pub graph: FsmGraph,
    pub root: NodeId,
    pub check: NodeId,
    pub on_true: NodeId,
    pub on_false: NodeId,
}

#[allow(dead_code)]
pub fn state_if_two_states() -> IfFixture {
    let mut graph = FsmGraph::builder().with_catalog(sample_catalog()).build();
    let root = graph.create_state("Idle").expect("state");
    let check = graph.create_if().expect("if");
    let on_true = graph.create_state("Walk").expect("state");
    let on_false = graph.create_state("Fall").expect("state");

    let option = graph
        .catalog()
        .and_then(|c| c.find_by_shorthand("on ground"))
        .expect("option exists");
    graph
        .node_mut(check)
        .and_then(|n| n.as_if_mut())
        .expect("if node")
        .guard_mut()
        .insert_option(option);

    link(&mut graph, root, 0, check);
    link(&mut graph, check, IfNode::THEN, on_true);
    link(&mut graph, check, IfNode::ELSE, on_false);

    IfFixture {
        graph,
        root,
        check,
        on_true,
        on_false,
    }
}

/// `Idle -> Cond(a, b, c) -> {A, B, C}`
#[allow(dead_code)]
pub struct CondFixture {
    pub graph: FsmGraph,
    pub root: NodeId,
    pub cond: NodeId,
    pub targets: Vec<NodeId>,
}

#[allow(dead_code)]
pub fn state_cond_chain() -> CondFixture {
    let mut graph = FsmGraph::new();
    let root = graph.create_state("Idle").expect("state");
    let cond = graph.create_cond(3).expect("cond");
    link(&mut graph, root, 0, cond);

    let mut targets = Vec::new();
    for (index, name) in ["A", "B", "C"].iter().enumerate() {
        let target = graph.create_state(name).expect("state");
        set_cond_text(&mut graph, cond, index, &format!("x == {}", index));
        link(&mut graph, cond, index, target);
        targets.push(target);
    }

    CondFixture {
        graph,
        root,
        cond,
        targets,
    }
}
