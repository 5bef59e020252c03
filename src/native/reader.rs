use super::{LINKS_MAGIC, MAGIC_HEADER, NODES_MAGIC, PINS_MAGIC, config};
use crate::error::{GraphError, NativeFormatError};
use crate::graph::{
    CondNode, FsmGraph, IfNode, Node, NodeKind, NodeVariant, PinInfo, PinPair, StateNode,
};
use crate::guard::{ExpressionCatalog, Guard, GuardMode};
use crate::id::{Id, LinkId, MAX_ID, PinId};
use crate::text::MAX_TEXT_LEN;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, warn};

pub(super) struct NativeReader<'r, R: Read> {
    input: &'r mut R,
    catalog: Option<Arc<ExpressionCatalog>>,
    dropped_options: usize,
}

impl<'r, R: Read> NativeReader<'r, R> {
    pub(super) fn new(input: &'r mut R, catalog: Option<Arc<ExpressionCatalog>>) -> Self {
        Self {
            input,
            catalog,
            dropped_options: 0,
        }
    }

    /// Builds a fresh registry from the stream. Nothing outside the returned
    /// graph is touched, so a failed read leaves the caller's state alone.
    pub(super) fn read_graph(mut self) -> Result<FsmGraph, NativeFormatError> {
        self.expect_magic("header", MAGIC_HEADER)?;
        let last_allocated = self.read_u64()?;
        if last_allocated > MAX_ID {
            return Err(GraphError::CounterOutOfRange {
                last_allocated,
                max: MAX_ID,
            }
            .into());
        }

        let mut graph = FsmGraph::builder().with_id_floor(last_allocated).build();
        graph.catalog = self.catalog.clone();

        self.expect_magic("pins", PINS_MAGIC)?;
        let mut listed: Vec<(PinId, LinkId, PinPair)> = Vec::new();
        for _ in 0..self.read_u64()? {
            let pin_id = self.read_id()?;
            let mut info = PinInfo::new(Id::NONE);
            for _ in 0..self.read_u64()? {
                let (link_id, pair) = self.read_link()?;
                info.links.push(link_id);
                listed.push((pin_id, link_id, pair));
            }
            info.owner = self.read_id()?;
            graph.pins.insert(pin_id, info);
        }

        self.expect_magic("links", LINKS_MAGIC)?;
        for _ in 0..self.read_u64()? {
            let (link_id, pair) = self.read_link()?;
            graph.links.insert(link_id, pair);
        }

        for (pin_id, link_id, pair) in listed {
            if graph.links.get(&link_id) != Some(&pair) {
                return Err(NativeFormatError::InconsistentLink { link_id, pin_id });
            }
        }

        self.expect_magic("nodes", NODES_MAGIC)?;
        for _ in 0..self.read_u64()? {
            let node = self.read_node()?;
            graph.nodes.insert(node.id(), node);
        }

        graph.validate()?;

        if self.dropped_options > 0 {
            warn!(
                dropped = self.dropped_options,
                "guard options missing from the catalog were dropped"
            );
        }
        debug!(
            nodes = graph.node_count(),
            pins = graph.pin_count(),
            links = graph.link_count(),
            last_allocated,
            "read graph"
        );
        Ok(graph)
    }

    fn read_node(&mut self) -> Result<Node, NativeFormatError> {
        let tag = self.read_u8()?;
        let node_id = self.read_id()?;
        let variant =
            NodeVariant::from_tag(tag).ok_or(NativeFormatError::UnknownNodeTag { node_id, tag })?;
        let inputs = self.read_ids()?;
        let outputs = self.read_ids()?;

        let kind = match variant {
            NodeVariant::State => {
                let mut state = StateNode::default();
                state.set_name(&self.read_text()?);
                NodeKind::State(state)
            }
            NodeVariant::If => NodeKind::If(IfNode::new(self.read_guard()?)),
            NodeVariant::Cond => {
                let mut cond = CondNode::default();
                for output in &outputs {
                    cond.insert_guard(*output, self.read_guard()?);
                }
                NodeKind::Cond(cond)
            }
        };

        Ok(Node::new(node_id, inputs, outputs, kind))
    }

    fn read_guard(&mut self) -> Result<Guard, NativeFormatError> {
        let guard_id = self.read_id()?;
        let mode_byte = self.read_u8()?;
        let mode = GuardMode::from_byte(mode_byte).ok_or(NativeFormatError::UnknownGuardMode {
            guard_id,
            mode: mode_byte,
        })?;

        let mut guard = Guard::new(guard_id);
        guard.set_mode(mode);
        guard.set_text(&self.read_text()?);

        for _ in 0..self.read_u64()? {
            let shorthand = self.read_text()?;
            let option = self
                .catalog
                .as_ref()
                .and_then(|catalog| catalog.find_by_shorthand(&shorthand));
            match option {
                Some(option) => guard.insert_option(option),
                None => {
                    warn!(%guard_id, %shorthand, "unknown guard option, dropping it");
                    self.dropped_options += 1;
                }
            }
        }
        Ok(guard)
    }

    fn read_link(&mut self) -> Result<(LinkId, PinPair), NativeFormatError> {
        let link_id = self.read_id()?;
        let from = self.read_id()?;
        let to = self.read_id()?;
        Ok((link_id, PinPair::new(from, to)))
    }

    fn read_ids(&mut self) -> Result<Vec<Id>, NativeFormatError> {
        let count = self.read_u64()?;
        let mut ids = Vec::new();
        for _ in 0..count {
            ids.push(self.read_id()?);
        }
        Ok(ids)
    }

    /// Lengths above the text capacity are rejected before anything is
    /// allocated.
    fn read_text(&mut self) -> Result<String, NativeFormatError> {
        let len = self.read_u64()?;
        if len > MAX_TEXT_LEN as u64 {
            return Err(NativeFormatError::TextOverflow {
                len,
                max: MAX_TEXT_LEN,
            });
        }
        let mut bytes = vec![0u8; len as usize];
        self.input.read_exact(&mut bytes)?;
        Ok(String::from_utf8(bytes)?)
    }

    fn expect_magic(
        &mut self,
        section: &'static str,
        expected: u32,
    ) -> Result<(), NativeFormatError> {
        let found = self.read_u32()?;
        if found != expected {
            return Err(NativeFormatError::BadMagic {
                section,
                expected,
                found,
            });
        }
        Ok(())
    }

    fn read_id(&mut self) -> Result<Id, NativeFormatError> {
        Ok(Id::new(self.read_u64()?))
    }

    fn read_u64(&mut self) -> Result<u64, NativeFormatError> {
        Ok(bincode::decode_from_std_read(&mut *self.input, config())?)
    }

    fn read_u32(&mut self) -> Result<u32, NativeFormatError> {
        Ok(bincode::decode_from_std_read(&mut *self.input, config())?)
    }

    fn read_u8(&mut self) -> Result<u8, NativeFormatError> {
        Ok(bincode::decode_from_std_read(&mut *self.input, config())?)
    }
}
