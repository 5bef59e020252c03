use super::{FsmGraph, NodeKind, NodeVariant, PinKind};
use crate::error::GraphError;
use crate::id::{Id, MAX_ID};
use crate::verify::{PredecessorScanner, ScanBoundary};
use ahash::AHashSet;

impl FsmGraph {
    /// Checks the structural invariants of the registry.
    ///
    /// The mutation API maintains these on its own, except that
    /// [`create_link`](FsmGraph::create_link) trusts its caller; this exists
    /// for loaded data and for diagnostics.
    pub fn validate(&self) -> Result<(), GraphError> {
        self.validate_ids()?;
        self.validate_pins()?;
        self.validate_links()?;
        self.validate_nodes()?;
        self.validate_link_rules()
    }

    /// Ids are non-zero, name one entity each and sit at or below the counter.
    fn validate_ids(&self) -> Result<(), GraphError> {
        let last_allocated = self.ids.last_allocated();
        if last_allocated > MAX_ID {
            return Err(GraphError::CounterOutOfRange {
                last_allocated,
                max: MAX_ID,
            });
        }

        let guard_ids = self.nodes.values().flat_map(|node| match node.kind() {
            NodeKind::State(_) => Vec::new(),
            NodeKind::If(if_node) => vec![if_node.guard().id()],
            NodeKind::Cond(_) => node.cond_guards().iter().map(|(_, g)| g.id()).collect(),
        });
        let all_ids = self
            .nodes
            .keys()
            .chain(self.pins.keys())
            .chain(self.links.keys())
            .copied()
            .chain(guard_ids);

        let mut seen = AHashSet::new();
        for id in all_ids {
            if id == Id::NONE {
                return Err(GraphError::ReservedId);
            }
            if id.raw() > last_allocated {
                return Err(GraphError::IdAboveCounter { id, last_allocated });
            }
            if !seen.insert(id) {
                return Err(GraphError::DuplicateId { id });
            }
        }
        Ok(())
    }

    fn validate_pins(&self) -> Result<(), GraphError> {
        for (pin_id, info) in &self.pins {
            let owner = self
                .nodes
                .get(&info.owner)
                .ok_or(GraphError::PinOwnerMissing {
                    pin_id: *pin_id,
                    owner_id: info.owner,
                })?;
            if !owner.pins().any(|p| p == *pin_id) {
                return Err(GraphError::PinNotOnOwner {
                    pin_id: *pin_id,
                    owner_id: info.owner,
                });
            }
            for link_id in &info.links {
                let attached = self
                    .links
                    .get(link_id)
                    .is_some_and(|pair| pair.from == *pin_id || pair.to == *pin_id);
                if !attached {
                    return Err(GraphError::LinkIndexMismatch { link_id: *link_id });
                }
            }
        }
        Ok(())
    }

    fn validate_links(&self) -> Result<(), GraphError> {
        for (link_id, pair) in &self.links {
            for pin_id in [pair.from, pair.to] {
                let info = self.pins.get(&pin_id).ok_or(GraphError::LinkPinMissing {
                    link_id: *link_id,
                    pin_id,
                })?;
                if !info.links.contains(link_id) {
                    return Err(GraphError::LinkIndexMismatch { link_id: *link_id });
                }
            }
        }
        Ok(())
    }

    fn validate_nodes(&self) -> Result<(), GraphError> {
        for (node_id, node) in &self.nodes {
            for pin_id in node.pins() {
                let owned = self
                    .pins
                    .get(&pin_id)
                    .is_some_and(|info| info.owner == *node_id);
                if !owned {
                    return Err(GraphError::NodePinMissing {
                        node_id: *node_id,
                        pin_id,
                    });
                }
            }

            let outputs_ok = match node.variant() {
                NodeVariant::State | NodeVariant::If => {
                    node.outputs.len() == node.variant().default_output_count()
                }
                NodeVariant::Cond => !node.outputs.is_empty(),
            };
            if node.inputs.len() != 1 || !outputs_ok {
                return Err(GraphError::BadArity {
                    node_id: *node_id,
                    inputs: node.inputs.len(),
                    outputs: node.outputs.len(),
                });
            }

            if let NodeKind::Cond(cond) = node.kind() {
                let layout_ok = cond.guard_count() == node.outputs.len()
                    && node.outputs.iter().all(|pin| cond.has_guard(*pin));
                if !layout_ok {
                    return Err(GraphError::GuardLayout { node_id: *node_id });
                }
            }
        }
        Ok(())
    }

    /// The rules `try_link` enforces when a link is made: output to input,
    /// two distinct nodes, one link per pin pair, and no cycle made only of
    /// conditional nodes. Runs after the structural checks, so every pin
    /// resolves to its owner here.
    fn validate_link_rules(&self) -> Result<(), GraphError> {
        let scanner = PredecessorScanner::new(self, ScanBoundary::StateNodes);
        let mut pairs = AHashSet::new();

        for (link_id, pair) in &self.links {
            let link_id = *link_id;
            let (Some(from_node), Some(to_node)) =
                (self.node_by_pin(pair.from), self.node_by_pin(pair.to))
            else {
                return Err(GraphError::LinkDirection { link_id });
            };

            if from_node.pin_kind(pair.from) != PinKind::Output
                || to_node.pin_kind(pair.to) != PinKind::Input
            {
                return Err(GraphError::LinkDirection { link_id });
            }
            if from_node.id() == to_node.id() {
                return Err(GraphError::SelfLink {
                    link_id,
                    node_id: from_node.id(),
                });
            }
            if !pairs.insert(*pair) {
                return Err(GraphError::DuplicateLink {
                    link_id,
                    from: pair.from,
                    to: pair.to,
                });
            }
            if from_node.variant().is_conditional()
                && scanner.is_predecessor(from_node.id(), to_node.id())
            {
                return Err(GraphError::ConditionalCycle { link_id });
            }
        }
        Ok(())
    }
}
