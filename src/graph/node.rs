//! Graph Nodes
//!
//! The three node variants and the pin bookkeeping they share.

use crate::guard::Guard;
use crate::id::{NodeId, PinId};
use crate::text::BoundedText;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The variant of a node without its payload. The discriminants are the
/// persisted node tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeVariant {
    State = 0,
    If = 1,
    Cond = 2,
}

impl NodeVariant {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(NodeVariant::State),
            1 => Some(NodeVariant::If),
            2 => Some(NodeVariant::Cond),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Whether links leaving this variant take part in boolean routing and
    /// must therefore stay acyclic.
    pub fn is_conditional(self) -> bool {
        matches!(self, NodeVariant::If | NodeVariant::Cond)
    }

    /// Number of output pins a freshly created node starts with.
    pub fn default_output_count(self) -> usize {
        match self {
            NodeVariant::State => 1,
            NodeVariant::If => 2,
            NodeVariant::Cond => 1,
        }
    }
}

impl fmt::Display for NodeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeVariant::State => write!(f, "state"),
            NodeVariant::If => write!(f, "if"),
            NodeVariant::Cond => write!(f, "cond"),
        }
    }
}

/// Role of a pin relative to a given node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinKind {
    Input,
    Output,
    /// The pin is not listed by the node it was checked against.
    External,
}

/// A transition-graph vertex carrying a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateNode {
    name: BoundedText,
}

impl StateNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name.set(name);
    }
}

/// A single guard with a "then" and an "else" output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfNode {
    guard: Guard,
}

impl IfNode {
    pub const THEN: usize = 0;
    pub const ELSE: usize = 1;

    pub(crate) fn new(guard: Guard) -> Self {
        Self { guard }
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    pub fn guard_mut(&mut self) -> &mut Guard {
        &mut self.guard
    }
}

/// An if/elseif chain: one guard per output pin, tried in pin order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CondNode {
    guards: AHashMap<PinId, Guard>,
}

impl CondNode {
    pub fn guard(&self, output: PinId) -> Option<&Guard> {
        self.guards.get(&output)
    }

    pub fn guard_mut(&mut self, output: PinId) -> Option<&mut Guard> {
        self.guards.get_mut(&output)
    }

    pub fn guard_count(&self) -> usize {
        self.guards.len()
    }

    pub(crate) fn insert_guard(&mut self, output: PinId, guard: Guard) {
        self.guards.insert(output, guard);
    }

    pub(crate) fn remove_guard(&mut self, output: PinId) -> Option<Guard> {
        self.guards.remove(&output)
    }

    pub(crate) fn has_guard(&self, output: PinId) -> bool {
        self.guards.contains_key(&output)
    }
}

/// Variant payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    State(StateNode),
    If(IfNode),
    Cond(CondNode),
}

impl NodeKind {
    pub fn variant(&self) -> NodeVariant {
        match self {
            NodeKind::State(_) => NodeVariant::State,
            NodeKind::If(_) => NodeVariant::If,
            NodeKind::Cond(_) => NodeVariant::Cond,
        }
    }
}

/// A vertex of the FSM graph.
///
/// The node lists its pin ids in order; the pin records themselves live in
/// the registry. Pin lists are only changed through the registry so that pin
/// records, links and guards stay in step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    pub(crate) inputs: Vec<PinId>,
    pub(crate) outputs: Vec<PinId>,
    kind: NodeKind,
}

impl Node {
    pub(crate) fn new(id: NodeId, inputs: Vec<PinId>, outputs: Vec<PinId>, kind: NodeKind) -> Self {
        Self {
            id,
            inputs,
            outputs,
            kind,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn variant(&self) -> NodeVariant {
        self.kind.variant()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn inputs(&self) -> &[PinId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PinId] {
        &self.outputs
    }

    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.inputs.iter().chain(self.outputs.iter()).copied()
    }

    pub fn pin_kind(&self, pin: PinId) -> PinKind {
        if self.input_index(pin).is_some() {
            PinKind::Input
        } else if self.output_index(pin).is_some() {
            PinKind::Output
        } else {
            PinKind::External
        }
    }

    pub fn input_index(&self, pin: PinId) -> Option<usize> {
        self.inputs.iter().position(|p| *p == pin)
    }

    pub fn output_index(&self, pin: PinId) -> Option<usize> {
        self.outputs.iter().position(|p| *p == pin)
    }

    pub fn as_state(&self) -> Option<&StateNode> {
        match &self.kind {
            NodeKind::State(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_state_mut(&mut self) -> Option<&mut StateNode> {
        match &mut self.kind {
            NodeKind::State(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_if(&self) -> Option<&IfNode> {
        match &self.kind {
            NodeKind::If(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_if_mut(&mut self) -> Option<&mut IfNode> {
        match &mut self.kind {
            NodeKind::If(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_cond(&self) -> Option<&CondNode> {
        match &self.kind {
            NodeKind::Cond(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_cond_mut(&mut self) -> Option<&mut CondNode> {
        match &mut self.kind {
            NodeKind::Cond(node) => Some(node),
            _ => None,
        }
    }

    /// The guards of a `Cond` node in output order. Empty for other variants.
    pub fn cond_guards(&self) -> Vec<(PinId, &Guard)> {
        match &self.kind {
            NodeKind::Cond(cond) => self
                .outputs
                .iter()
                .filter_map(|pin| cond.guard(*pin).map(|guard| (*pin, guard)))
                .collect(),
            NodeKind::State(_) | NodeKind::If(_) => Vec::new(),
        }
    }
}
