use super::{LINKS_MAGIC, MAGIC_HEADER, NODES_MAGIC, PINS_MAGIC, config};
use crate::error::NativeFormatError;
use crate::graph::{FsmGraph, Node, NodeKind, PinPair};
use crate::guard::Guard;
use crate::id::{Id, LinkId};
use itertools::Itertools;
use std::io::Write;

pub(super) struct NativeWriter<'w, W: Write> {
    output: &'w mut W,
}

impl<'w, W: Write> NativeWriter<'w, W> {
    pub(super) fn new(output: &'w mut W) -> Self {
        Self { output }
    }

    /// Tables are written in ascending id order so that equal graphs give
    /// equal bytes.
    pub(super) fn write_graph(mut self, graph: &FsmGraph) -> Result<(), NativeFormatError> {
        self.write_u32(MAGIC_HEADER)?;
        self.write_u64(graph.last_allocated_id())?;

        self.write_u32(PINS_MAGIC)?;
        self.write_u64(graph.pin_count() as u64)?;
        for (pin_id, info) in graph.pins().sorted_by_key(|(id, _)| *id) {
            self.write_id(pin_id)?;
            let attached: Vec<(LinkId, PinPair)> = graph.links_of(pin_id).collect();
            self.write_u64(attached.len() as u64)?;
            for (link_id, pair) in attached {
                self.write_link(link_id, pair)?;
            }
            self.write_id(info.owner())?;
        }

        self.write_u32(LINKS_MAGIC)?;
        self.write_u64(graph.link_count() as u64)?;
        for (link_id, pair) in graph.links().sorted_by_key(|(id, _)| *id) {
            self.write_link(link_id, pair)?;
        }

        self.write_u32(NODES_MAGIC)?;
        self.write_u64(graph.node_count() as u64)?;
        for node in graph.nodes().sorted_by_key(|node| node.id()) {
            self.write_node(node)?;
        }

        self.output.flush()?;
        Ok(())
    }

    fn write_node(&mut self, node: &Node) -> Result<(), NativeFormatError> {
        self.write_u8(node.variant().tag())?;
        self.write_id(node.id())?;
        self.write_ids(node.inputs())?;
        self.write_ids(node.outputs())?;

        match node.kind() {
            NodeKind::State(state) => self.write_text(state.name()),
            NodeKind::If(if_node) => self.write_guard(if_node.guard()),
            NodeKind::Cond(_) => {
                for (_, guard) in node.cond_guards() {
                    self.write_guard(guard)?;
                }
                Ok(())
            }
        }
    }

    fn write_guard(&mut self, guard: &Guard) -> Result<(), NativeFormatError> {
        self.write_id(guard.id())?;
        self.write_u8(guard.mode().as_byte())?;
        self.write_text(guard.text())?;
        let shorthands: Vec<&str> = guard
            .options()
            .map(|option| option.shorthand.as_str())
            .collect();
        self.write_u64(shorthands.len() as u64)?;
        for shorthand in shorthands {
            self.write_text(shorthand)?;
        }
        Ok(())
    }

    fn write_link(&mut self, link_id: LinkId, pair: PinPair) -> Result<(), NativeFormatError> {
        self.write_id(link_id)?;
        self.write_id(pair.from)?;
        self.write_id(pair.to)
    }

    fn write_ids(&mut self, ids: &[Id]) -> Result<(), NativeFormatError> {
        self.write_u64(ids.len() as u64)?;
        for id in ids {
            self.write_id(*id)?;
        }
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), NativeFormatError> {
        self.write_u64(text.len() as u64)?;
        self.output.write_all(text.as_bytes())?;
        Ok(())
    }

    fn write_id(&mut self, id: Id) -> Result<(), NativeFormatError> {
        self.write_u64(id.raw())
    }

    fn write_u64(&mut self, value: u64) -> Result<(), NativeFormatError> {
        bincode::encode_into_std_write(value, &mut *self.output, config())?;
        Ok(())
    }

    fn write_u32(&mut self, value: u32) -> Result<(), NativeFormatError> {
        bincode::encode_into_std_write(value, &mut *self.output, config())?;
        Ok(())
    }

    fn write_u8(&mut self, value: u8) -> Result<(), NativeFormatError> {
        bincode::encode_into_std_write(value, &mut *self.output, config())?;
        Ok(())
    }
}
