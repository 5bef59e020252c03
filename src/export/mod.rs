//! Export Linearizer
//!
//! Flattens the part of the graph reachable from a state into a list of
//! statements for the runtime. `If` and `Cond` nodes become binary branches;
//! a `Cond` with N outputs becomes a chain of N branches where each `on_false`
//! points at the next branch. The transform is one-way.

pub mod text;

pub use text::{NONE_SENTINEL, render};

use crate::error::ExportError;
use crate::graph::{FsmGraph, IfNode, Node, NodeKind, NodeVariant};
use crate::id::{Id, NodeId, PinId};
use ahash::AHashSet;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    State {
        id: Id,
        name: String,
    },
    Branch {
        id: Id,
        expression: String,
        on_true: Option<Id>,
        on_false: Option<Id>,
    },
}

impl Statement {
    pub fn id(&self) -> Id {
        match self {
            Statement::State { id, .. } | Statement::Branch { id, .. } => *id,
        }
    }
}

/// Linearizes the graph starting at the state `root`.
///
/// Nodes are emitted in pre-order, each at most once, so diamonds and state
/// cycles terminate. Fails if any reached output pin has more than one link.
pub fn export(graph: &FsmGraph, root: NodeId) -> Result<Vec<Statement>, ExportError> {
    let node = graph
        .node(root)
        .ok_or(ExportError::UnknownNode(root))?;
    if node.variant() != NodeVariant::State {
        return Err(ExportError::NotAState(root));
    }

    let mut visited = AHashSet::new();
    let mut statements = Vec::new();
    export_recursive(graph, node, &mut visited, &mut statements)?;
    Ok(statements)
}

fn export_recursive(
    graph: &FsmGraph,
    node: &Node,
    visited: &mut AHashSet<NodeId>,
    statements: &mut Vec<Statement>,
) -> Result<(), ExportError> {
    if !visited.insert(node.id()) {
        return Ok(());
    }

    let mut targets = Vec::with_capacity(node.outputs().len());
    for output in node.outputs() {
        targets.push(target_of(graph, node.id(), *output)?);
    }

    match node.kind() {
        NodeKind::State(state) => statements.push(Statement::State {
            id: node.id(),
            name: state.name().to_string(),
        }),
        NodeKind::If(if_node) => statements.push(Statement::Branch {
            id: node.id(),
            expression: if_node.guard().as_expression_text(),
            on_true: targets.get(IfNode::THEN).copied().flatten(),
            on_false: targets.get(IfNode::ELSE).copied().flatten(),
        }),
        NodeKind::Cond(_) => {
            let guards = node.cond_guards();
            // Branch i is named by the guard of output i, except the first,
            // which takes the node id so incoming links resolve to it.
            let ids: Vec<Id> = guards
                .iter()
                .enumerate()
                .map(|(i, (_, guard))| if i == 0 { node.id() } else { guard.id() })
                .collect();
            for (i, (_, guard)) in guards.iter().enumerate() {
                statements.push(Statement::Branch {
                    id: ids[i],
                    expression: guard.as_expression_text(),
                    on_true: targets.get(i).copied().flatten(),
                    on_false: ids.get(i + 1).copied(),
                });
            }
        }
    }

    for target in targets.into_iter().flatten() {
        if let Some(next) = graph.node(target) {
            export_recursive(graph, next, visited, statements)?;
        }
    }
    Ok(())
}

/// The node reached through `output`, if it is linked.
fn target_of(
    graph: &FsmGraph,
    node_id: NodeId,
    output: PinId,
) -> Result<Option<NodeId>, ExportError> {
    let outgoing: Vec<_> = graph
        .links_of(output)
        .filter(|(_, pair)| pair.from == output)
        .collect();
    match outgoing.as_slice() {
        [] => Ok(None),
        [(_, pair)] => Ok(graph.node_by_pin(pair.to).map(Node::id)),
        _ => Err(ExportError::FanOut {
            node_id,
            pin_id: output,
            links: outgoing.len(),
        }),
    }
}
