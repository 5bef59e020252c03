//! Graph Registry
//!
//! `FsmGraph` owns every node, pin record and link record of an FSM graph and
//! is the only place where they are created or destroyed.
//!
//! # Ownership
//!
//! - Nodes list their pin ids, in order; the registry owns the pin records.
//! - Links live in a single authoritative table. Every pin record keeps the
//!   ids of the links attached to it as an index, which is only ever touched
//!   by `create_link` and `destroy_link` so both sides stay in step.
//! - Destroying a node destroys its pins; destroying a pin destroys the links
//!   touching it first.
//!
//! Every public operation leaves the registry consistent on return. Operations
//! that need fresh ids draw all of them before touching any table, so running
//! out of ids leaves the registry as it was.

pub mod node;
mod validate;

pub use node::{CondNode, IfNode, Node, NodeKind, NodeVariant, PinKind, StateNode};

use crate::error::GraphError;
use crate::guard::{ExpressionCatalog, Guard};
use crate::id::{Id, IdAllocator, LinkId, NodeId, PinId};
use crate::verify::{self, Feasibility};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// The two ends of a link: an output pin and an input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinPair {
    pub from: PinId,
    pub to: PinId,
}

impl PinPair {
    pub fn new(from: PinId, to: PinId) -> Self {
        Self { from, to }
    }

    /// The end opposite to `pin`, if `pin` is one of the two ends.
    pub fn other(&self, pin: PinId) -> Option<PinId> {
        if pin == self.from {
            Some(self.to)
        } else if pin == self.to {
            Some(self.from)
        } else {
            None
        }
    }
}

/// Registry record of a pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinInfo {
    pub(crate) owner: NodeId,
    pub(crate) links: Vec<LinkId>,
}

impl PinInfo {
    pub(crate) fn new(owner: NodeId) -> Self {
        Self {
            owner,
            links: Vec::new(),
        }
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Ids of the links attached to this pin, in creation order.
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }
}

#[derive(Debug, Clone, Default)]
pub struct FsmGraph {
    pub(crate) ids: IdAllocator,
    pub(crate) nodes: AHashMap<NodeId, Node>,
    pub(crate) pins: AHashMap<PinId, PinInfo>,
    pub(crate) links: AHashMap<LinkId, PinPair>,
    pub(crate) catalog: Option<Arc<ExpressionCatalog>>,
}

/// Configures a new [`FsmGraph`].
#[derive(Debug, Default)]
pub struct FsmGraphBuilder {
    catalog: Option<Arc<ExpressionCatalog>>,
    id_floor: u64,
}

impl FsmGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog used to resolve structured guard options when loading.
    pub fn with_catalog(mut self, catalog: ExpressionCatalog) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    pub fn with_shared_catalog(mut self, catalog: Arc<ExpressionCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Start allocating ids above `floor`, clamped to [`MAX_ID`](crate::id::MAX_ID).
    pub fn with_id_floor(mut self, floor: u64) -> Self {
        self.id_floor = floor;
        self
    }

    pub fn build(self) -> FsmGraph {
        FsmGraph {
            ids: IdAllocator::starting_after(self.id_floor),
            catalog: self.catalog,
            ..FsmGraph::default()
        }
    }
}

impl FsmGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> FsmGraphBuilder {
        FsmGraphBuilder::new()
    }

    /// Draws a fresh id from the shared counter.
    pub fn next_id(&mut self) -> Result<Id, GraphError> {
        self.ids.next_id().ok_or_else(|| {
            let last_allocated = self.ids.last_allocated();
            warn!(last_allocated, "id space exhausted");
            GraphError::IdSpaceExhausted { last_allocated }
        })
    }

    pub fn last_allocated_id(&self) -> u64 {
        self.ids.last_allocated()
    }

    pub fn catalog(&self) -> Option<&Arc<ExpressionCatalog>> {
        self.catalog.as_ref()
    }

    pub fn set_catalog(&mut self, catalog: Option<Arc<ExpressionCatalog>>) {
        self.catalog = catalog;
    }

    /// Removes every node, pin and link. The id counter keeps its value so
    /// ids issued before the clear are never handed out again.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.pins.clear();
        self.links.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // --- Nodes ---

    /// Creates a node of the given variant together with its default pins
    /// and guards, and returns a handle to it.
    pub fn create_node(&mut self, variant: NodeVariant) -> Result<&mut Node, GraphError> {
        let id = self.next_id()?;
        let inputs = vec![self.next_id()?];
        let mut outputs = Vec::with_capacity(variant.default_output_count());
        for _ in 0..variant.default_output_count() {
            outputs.push(self.next_id()?);
        }

        let kind = match variant {
            NodeVariant::State => NodeKind::State(StateNode::default()),
            NodeVariant::If => NodeKind::If(IfNode::new(Guard::new(self.next_id()?))),
            NodeVariant::Cond => {
                let mut cond = CondNode::default();
                for pin in &outputs {
                    cond.insert_guard(*pin, Guard::new(self.next_id()?));
                }
                NodeKind::Cond(cond)
            }
        };

        for pin in inputs.iter().chain(&outputs) {
            self.pins.insert(*pin, PinInfo::new(id));
        }
        debug!(node_id = %id, %variant, "created node");
        Ok(self
            .nodes
            .entry(id)
            .or_insert_with(|| Node::new(id, inputs, outputs, kind)))
    }

    pub fn create_state(&mut self, name: &str) -> Result<NodeId, GraphError> {
        let node = self.create_node(NodeVariant::State)?;
        if let Some(state) = node.as_state_mut() {
            state.set_name(name);
        }
        Ok(node.id())
    }

    pub fn create_if(&mut self) -> Result<NodeId, GraphError> {
        Ok(self.create_node(NodeVariant::If)?.id())
    }

    /// Creates a `Cond` node with `outputs` outputs (at least one). Nothing
    /// is left behind if the ids run out part way.
    pub fn create_cond(&mut self, outputs: usize) -> Result<NodeId, GraphError> {
        let id = self.create_node(NodeVariant::Cond)?.id();
        if let Err(err) = self.set_output_count(id, outputs) {
            self.destroy_node(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Destroys a node, its pins and every link attached to them.
    pub fn destroy_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.remove(&id) else {
            return false;
        };
        for pin in node.pins() {
            self.remove_pin_record(pin);
        }
        debug!(node_id = %id, "destroyed node");
        true
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn node_by_pin(&self, pin: PinId) -> Option<&Node> {
        self.pins.get(&pin).and_then(|info| self.nodes.get(&info.owner))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // --- Cond outputs ---

    /// Resizes a `Cond` node to `count` outputs, never below one. Removed
    /// outputs take their links and guards with them; new outputs get a
    /// fresh guard. Returns `Ok(false)` if `node` is not a `Cond` node.
    ///
    /// If the ids run out while growing, the outputs added so far are kept
    /// and the error is returned.
    pub fn set_output_count(&mut self, node: NodeId, count: usize) -> Result<bool, GraphError> {
        let Some(current) = self.cond_output_count(node) else {
            return Ok(false);
        };
        let target = count.max(1);

        for _ in target..current {
            let removed = self.nodes.get_mut(&node).and_then(|n| {
                let pin = n.outputs.pop()?;
                if let Some(cond) = n.as_cond_mut() {
                    cond.remove_guard(pin);
                }
                Some(pin)
            });
            if let Some(pin) = removed {
                self.remove_pin_record(pin);
            }
        }
        for _ in current..target {
            self.push_cond_output(node)?;
        }
        Ok(true)
    }

    /// Erases the output at `index` of a `Cond` node. A node left without
    /// outputs gets a fresh one.
    pub fn erase_output(&mut self, node: NodeId, index: usize) -> bool {
        let pin = self
            .nodes
            .get(&node)
            .filter(|n| n.variant() == NodeVariant::Cond)
            .and_then(|n| n.outputs.get(index).copied());
        match pin {
            Some(pin) => self.destroy_pin(pin),
            None => false,
        }
    }

    fn cond_output_count(&self, node: NodeId) -> Option<usize> {
        self.nodes
            .get(&node)
            .filter(|n| n.variant() == NodeVariant::Cond)
            .map(|n| n.outputs.len())
    }

    /// Appends a guarded output to a `Cond` node. `Ok(None)` if `node` is
    /// not a `Cond` node.
    fn push_cond_output(&mut self, node: NodeId) -> Result<Option<PinId>, GraphError> {
        if self.cond_output_count(node).is_none() {
            return Ok(None);
        }
        let pin = self.next_id()?;
        let guard = Guard::new(self.next_id()?);

        let Some(n) = self.nodes.get_mut(&node) else {
            return Ok(None);
        };
        n.outputs.push(pin);
        if let Some(cond) = n.as_cond_mut() {
            cond.insert_guard(pin, guard);
        }
        self.pins.insert(pin, PinInfo::new(node));
        Ok(Some(pin))
    }

    // --- Pins ---

    /// Adds a pin of the given kind to `owner` and returns its id.
    ///
    /// Only `Cond` nodes have a variable pin layout: an output added to one
    /// comes with a fresh guard. Every other combination would break the
    /// owner's arity and returns `None`, as does a missing owner or an
    /// exhausted id space.
    pub fn create_pin(&mut self, owner: NodeId, kind: PinKind) -> Option<PinId> {
        if kind != PinKind::Output {
            return None;
        }
        self.push_cond_output(owner).ok().flatten()
    }

    /// Destroys a pin and every link touching it, then repairs the owner:
    /// inputs and `State`/`If` outputs are replaced in place by a fresh pin,
    /// `Cond` outputs are erased along with their guard. The last output of a
    /// `Cond` node is replaced by a fresh output with a fresh guard.
    ///
    /// Returns `false`, leaving everything in place, if `pin` does not exist
    /// or the replacement cannot be given an id.
    pub fn destroy_pin(&mut self, pin: PinId) -> bool {
        let Some(owner) = self.pins.get(&pin).map(PinInfo::owner) else {
            return false;
        };
        let Some((variant, input_index, output_index, output_count)) =
            self.nodes.get(&owner).map(|n| {
                (
                    n.variant(),
                    n.input_index(pin),
                    n.output_index(pin),
                    n.outputs.len(),
                )
            })
        else {
            return self.remove_pin_record(pin);
        };

        if input_index.is_none() && output_index.is_none() {
            return self.remove_pin_record(pin);
        }

        let cond_output = variant == NodeVariant::Cond && output_index.is_some();
        if cond_output && output_count > 1 {
            self.remove_pin_record(pin);
            if let Some(n) = self.nodes.get_mut(&owner) {
                n.outputs.retain(|p| *p != pin);
                if let Some(cond) = n.as_cond_mut() {
                    cond.remove_guard(pin);
                }
            }
            return true;
        }

        let Ok(fresh) = self.next_id() else {
            return false;
        };
        let guard = if cond_output {
            match self.next_id() {
                Ok(id) => Some(Guard::new(id)),
                Err(_) => return false,
            }
        } else {
            None
        };

        self.remove_pin_record(pin);
        self.pins.insert(fresh, PinInfo::new(owner));
        if let Some(n) = self.nodes.get_mut(&owner) {
            if let Some(index) = input_index {
                n.inputs[index] = fresh;
            } else if let Some(index) = output_index {
                n.outputs[index] = fresh;
                if let (Some(cond), Some(guard)) = (n.as_cond_mut(), guard) {
                    cond.remove_guard(pin);
                    cond.insert_guard(fresh, guard);
                }
            }
        }
        true
    }

    pub fn pin_info(&self, pin: PinId) -> Option<&PinInfo> {
        self.pins.get(&pin)
    }

    pub fn pins(&self) -> impl Iterator<Item = (PinId, &PinInfo)> {
        self.pins.iter().map(|(id, info)| (*id, info))
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    fn remove_pin_record(&mut self, pin: PinId) -> bool {
        self.unlink_pin(pin);
        self.pins.remove(&pin).is_some()
    }

    // --- Links ---

    /// Creates a link from an output pin to an input pin.
    ///
    /// Feasibility is the caller's responsibility (see [`verify::verify`]);
    /// this only fails if one of the pin records is missing or no id is left.
    pub fn create_link(&mut self, from: PinId, to: PinId) -> Option<LinkId> {
        if !self.pins.contains_key(&from) || !self.pins.contains_key(&to) {
            return None;
        }
        let id = self.next_id().ok()?;
        self.links.insert(id, PinPair::new(from, to));
        for pin in [from, to] {
            if let Some(info) = self.pins.get_mut(&pin) {
                info.links.push(id);
            }
        }
        debug!(link_id = %id, %from, %to, "created link");
        Some(id)
    }

    /// Verifies a link between two pins given in any order and creates it,
    /// oriented from the output to the input, if it is feasible.
    pub fn try_link(&mut self, a: PinId, b: PinId) -> Result<LinkId, Feasibility> {
        match verify::check_link(self, a, b) {
            Ok(pair) => self
                .create_link(pair.from, pair.to)
                .ok_or(Feasibility::InvalidNode),
            Err(feasibility) => {
                warn!(pin_a = %a, pin_b = %b, %feasibility, "rejected link");
                Err(feasibility)
            }
        }
    }

    pub fn destroy_link(&mut self, link: LinkId) -> bool {
        let Some(pair) = self.links.remove(&link) else {
            return false;
        };
        for pin in [pair.from, pair.to] {
            if let Some(info) = self.pins.get_mut(&pin) {
                info.links.retain(|l| *l != link);
            }
        }
        debug!(link_id = %link, "destroyed link");
        true
    }

    /// Destroys every link attached to `pin` and returns how many there were.
    pub fn unlink_pin(&mut self, pin: PinId) -> usize {
        let attached = self
            .pins
            .get(&pin)
            .map(|info| info.links.clone())
            .unwrap_or_default();
        for link in &attached {
            self.destroy_link(*link);
        }
        attached.len()
    }

    pub fn link_info(&self, link: LinkId) -> Option<PinPair> {
        self.links.get(&link).copied()
    }

    /// The link going from `from` to `to`, if there is one.
    pub fn find_link(&self, from: PinId, to: PinId) -> Option<LinkId> {
        self.links_of(from)
            .find(|(_, pair)| pair.from == from && pair.to == to)
            .map(|(id, _)| id)
    }

    /// Links attached to `pin`, resolved through the link table.
    pub fn links_of(&self, pin: PinId) -> impl Iterator<Item = (LinkId, PinPair)> + '_ {
        self.pins
            .get(&pin)
            .map(|info| info.links.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.links.get(id).map(|pair| (*id, *pair)))
    }

    pub fn links(&self) -> impl Iterator<Item = (LinkId, PinPair)> + '_ {
        self.links.iter().map(|(id, pair)| (*id, *pair))
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Nodes reached by following the links of `output`.
    pub fn targets_of(&self, output: PinId) -> impl Iterator<Item = &Node> + '_ {
        self.links_of(output)
            .filter(move |(_, pair)| pair.from == output)
            .filter_map(|(_, pair)| self.node_by_pin(pair.to))
    }
}
