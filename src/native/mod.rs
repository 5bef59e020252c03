//! Native binary format
//!
//! Bit-exact persistence of a whole registry. Layout, all integers fixed-width
//! little-endian, strings as a `u64` byte length followed by the raw bytes:
//!
//! ```text
//! u32 MAGIC_HEADER
//! u64 id allocator high-water mark
//! u32 PINS_MAGIC   u64 count, per pin  { u64 id, u64 n, n * {u64 link, u64 from, u64 to}, u64 owner }
//! u32 LINKS_MAGIC  u64 count, per link { u64 id, u64 from, u64 to }
//! u32 NODES_MAGIC  u64 count, per node { u8 tag, u64 id, u64 n, n * u64 input,
//!                                        u64 m, m * u64 output, payload }
//! ```
//!
//! Payloads: a state writes its name; an `If` node writes its guard; a `Cond`
//! node writes one guard per output, in output order. A guard is
//! `{u64 id, u8 mode, string text, u64 n, n * string shorthand}`.

mod reader;
mod writer;

use crate::error::NativeFormatError;
use crate::graph::FsmGraph;
use crate::guard::ExpressionCatalog;
use bincode::config::{Configuration, Fixint, LittleEndian};
use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::sync::Arc;
use tracing::info;

pub const MAGIC_HEADER: u32 = 0xCCAA_FFEE;
pub const PINS_MAGIC: u32 = 0x01C0_FFEE;
pub const LINKS_MAGIC: u32 = 0x02C0_FFEE;
pub const NODES_MAGIC: u32 = 0x03C0_FFEE;

/// Encoding used for every integer of the format.
pub(crate) fn config() -> Configuration<LittleEndian, Fixint> {
    bincode::config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
}

impl FsmGraph {
    /// Writes the whole registry in the native format.
    pub fn write_native<W: Write>(&self, output: &mut W) -> Result<(), NativeFormatError> {
        writer::NativeWriter::new(output).write_graph(self)
    }

    pub fn to_native_bytes(&self) -> Result<Vec<u8>, NativeFormatError> {
        let mut bytes = Vec::new();
        self.write_native(&mut bytes)?;
        Ok(bytes)
    }

    /// Reads a registry from the native format. Structured guard options are
    /// resolved against `catalog`; options it does not know are dropped.
    pub fn read_native<R: Read>(
        input: &mut R,
        catalog: Option<Arc<ExpressionCatalog>>,
    ) -> Result<FsmGraph, NativeFormatError> {
        reader::NativeReader::new(input, catalog).read_graph()
    }

    /// Replaces this registry with one read from `input`, keeping the current
    /// catalog. On failure the registry is left exactly as it was.
    pub fn load_native<R: Read>(&mut self, input: &mut R) -> Result<(), NativeFormatError> {
        let loaded = Self::read_native(input, self.catalog.clone())?;
        *self = loaded;
        Ok(())
    }

    /// Saves the registry to a file in the native format.
    pub fn save(&self, path: &str) -> Result<(), NativeFormatError> {
        let file = fs::File::create(path).map_err(|source| NativeFormatError::Io {
            path: path.to_string(),
            source,
        })?;
        let mut output = BufWriter::new(file);
        self.write_native(&mut output)?;
        output.flush().map_err(|source| NativeFormatError::Io {
            path: path.to_string(),
            source,
        })?;
        info!(
            path,
            nodes = self.node_count(),
            pins = self.pin_count(),
            links = self.link_count(),
            "saved graph"
        );
        Ok(())
    }

    /// Loads a file written by [`FsmGraph::save`] into this registry.
    pub fn load(&mut self, path: &str) -> Result<(), NativeFormatError> {
        let file = fs::File::open(path).map_err(|source| NativeFormatError::Io {
            path: path.to_string(),
            source,
        })?;
        self.load_native(&mut BufReader::new(file))?;
        info!(
            path,
            nodes = self.node_count(),
            pins = self.pin_count(),
            links = self.link_count(),
            "loaded graph"
        );
        Ok(())
    }
}
