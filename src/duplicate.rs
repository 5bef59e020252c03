//! Node Cloner
//!
//! Copies a node's configuration (state name or guards) onto another node of
//! the same variant. Pins and links are never copied; the destination keeps
//! the pins it was provisioned with.

use crate::error::CloneError;
use crate::graph::{FsmGraph, NodeKind};
use crate::guard::Guard;
use crate::id::NodeId;
use tracing::debug;

/// Suffix appended to the name of a duplicated state.
pub const DUPLICATE_SUFFIX: &str = " (new)";

/// Snapshot of a node's configuration, detached from the registry borrow.
enum Config {
    State(String),
    If(Guard),
    Cond(Vec<Guard>),
}

fn read_config(graph: &FsmGraph, id: NodeId) -> Result<Config, CloneError> {
    let node = graph.node(id).ok_or(CloneError::UnknownNode(id))?;
    Ok(match node.kind() {
        NodeKind::State(state) => Config::State(state.name().to_string()),
        NodeKind::If(if_node) => Config::If(if_node.guard().clone()),
        NodeKind::Cond(_) => Config::Cond(
            node.cond_guards()
                .into_iter()
                .map(|(_, guard)| guard.clone())
                .collect(),
        ),
    })
}

/// Copies the configuration of `source` onto `dest`.
///
/// A `Cond` destination is first resized to the source's output count, then
/// guards are copied by output position. Guard ids stay those of `dest`.
pub fn clone_config(graph: &mut FsmGraph, source: NodeId, dest: NodeId) -> Result<(), CloneError> {
    let config = read_config(graph, source)?;
    let dest_variant = graph
        .node(dest)
        .ok_or(CloneError::UnknownNode(dest))?
        .variant();

    let mismatch = CloneError::VariantMismatch {
        source_id: source,
        target_id: dest,
    };

    match config {
        Config::State(name) => {
            let state = graph
                .node_mut(dest)
                .and_then(|node| node.as_state_mut())
                .ok_or(mismatch)?;
            state.set_name(&name);
        }
        Config::If(guard) => {
            let if_node = graph
                .node_mut(dest)
                .and_then(|node| node.as_if_mut())
                .ok_or(mismatch)?;
            if_node.guard_mut().copy_config_from(&guard);
        }
        Config::Cond(guards) => {
            if !graph.set_output_count(dest, guards.len())? {
                return Err(mismatch);
            }
            let node = graph.node_mut(dest).ok_or(CloneError::UnknownNode(dest))?;
            let outputs = node.outputs().to_vec();
            let cond = node.as_cond_mut().ok_or(mismatch)?;
            for (output, guard) in outputs.iter().zip(&guards) {
                if let Some(target) = cond.guard_mut(*output) {
                    target.copy_config_from(guard);
                }
            }
        }
    }

    debug!(%source, %dest, variant = %dest_variant, "cloned node configuration");
    Ok(())
}

/// Creates a new node of the same variant as `source` carrying a copy of its
/// configuration. Duplicated states get [`DUPLICATE_SUFFIX`] appended.
/// `None` if `source` does not exist or the ids run out.
pub fn duplicate_node(graph: &mut FsmGraph, source: NodeId) -> Option<NodeId> {
    let variant = graph.node(source)?.variant();
    let clone = graph.create_node(variant).ok()?.id();

    if clone_config(graph, source, clone).is_err() {
        graph.destroy_node(clone);
        return None;
    }

    if let Some(state) = graph.node_mut(clone).and_then(|node| node.as_state_mut()) {
        let name = format!("{}{}", state.name(), DUPLICATE_SUFFIX);
        state.set_name(&name);
    }
    Some(clone)
}
