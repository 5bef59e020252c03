use crate::id::{Id, LinkId, NodeId, PinId};
use thiserror::Error;

/// Errors that can occur while reading or writing the native graph format.
#[derive(Error, Debug)]
pub enum NativeFormatError {
    #[error("I/O error while accessing '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read native graph data: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to decode native graph data: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Failed to encode native graph data: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Unexpected magic value in {section}: expected {expected:#010X}, found {found:#010X}")]
    BadMagic {
        section: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("Node '{node_id}' has an unknown variant tag {tag}")]
    UnknownNodeTag { node_id: NodeId, tag: u8 },

    #[error("Guard '{guard_id}' has an unknown mode byte {mode}")]
    UnknownGuardMode { guard_id: Id, mode: u8 },

    #[error("Serialized text of {len} bytes is larger than the {max} byte buffer")]
    TextOverflow { len: u64, max: usize },

    #[error("Serialized text is not valid UTF-8")]
    InvalidText(#[from] std::string::FromUtf8Error),

    #[error("Link '{link_id}' listed by pin '{pin_id}' does not match the link table")]
    InconsistentLink { link_id: LinkId, pin_id: PinId },

    #[error("Loaded graph is inconsistent: {0}")]
    InvalidGraph(#[from] GraphError),
}

/// Invariant violations reported by [`FsmGraph::validate`](crate::graph::FsmGraph::validate),
/// and id exhaustion in the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Pin '{pin_id}' belongs to node '{owner_id}', which does not exist")]
    PinOwnerMissing { pin_id: PinId, owner_id: NodeId },

    #[error("Pin '{pin_id}' claims node '{owner_id}' as owner, but the node does not list it")]
    PinNotOnOwner { pin_id: PinId, owner_id: NodeId },

    #[error("Node '{node_id}' lists pin '{pin_id}', which is missing or owned by another node")]
    NodePinMissing { node_id: NodeId, pin_id: PinId },

    #[error("Link '{link_id}' references pin '{pin_id}', which does not exist")]
    LinkPinMissing { link_id: LinkId, pin_id: PinId },

    #[error("Link '{link_id}' is not indexed consistently by its endpoint pins")]
    LinkIndexMismatch { link_id: LinkId },

    #[error("Node '{node_id}' has {inputs} inputs and {outputs} outputs, which its variant does not allow")]
    BadArity {
        node_id: NodeId,
        inputs: usize,
        outputs: usize,
    },

    #[error("Cond node '{node_id}' does not have exactly one guard per output")]
    GuardLayout { node_id: NodeId },

    #[error("Id '{id}' is above the allocator high-water mark {last_allocated}")]
    IdAboveCounter { id: Id, last_allocated: u64 },

    #[error("Allocator high-water mark {last_allocated} is above the largest issuable id {max}")]
    CounterOutOfRange { last_allocated: u64, max: u64 },

    #[error("Id space exhausted after {last_allocated}")]
    IdSpaceExhausted { last_allocated: u64 },

    #[error("The reserved id 0 names an entity")]
    ReservedId,

    #[error("Id '{id}' names more than one entity")]
    DuplicateId { id: Id },

    #[error("Link '{link_id}' does not run from an output pin to an input pin")]
    LinkDirection { link_id: LinkId },

    #[error("Link '{link_id}' joins two pins of node '{node_id}'")]
    SelfLink { link_id: LinkId, node_id: NodeId },

    #[error("Link '{link_id}' repeats the link from pin '{from}' to pin '{to}'")]
    DuplicateLink { link_id: LinkId, from: PinId, to: PinId },

    #[error("Link '{link_id}' closes a cycle of conditional nodes")]
    ConditionalCycle { link_id: LinkId },
}

/// Reasons a graph cannot be flattened into a statement list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("Node '{0}' not found")]
    UnknownNode(NodeId),

    #[error("Export must start from a state node, but node '{0}' is not one")]
    NotAState(NodeId),

    #[error("Output pin '{pin_id}' of node '{node_id}' has {links} links; only one outgoing link per output can be exported")]
    FanOut {
        node_id: NodeId,
        pin_id: PinId,
        links: usize,
    },
}

/// Errors raised while copying a node's configuration onto another node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloneError {
    #[error("Node '{0}' not found")]
    UnknownNode(NodeId),

    #[error("Cannot copy configuration from node '{source_id}' onto node '{target_id}' of a different variant")]
    VariantMismatch { source_id: NodeId, target_id: NodeId },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors that can occur while building an expression catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Could not read catalog file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("An option in category '{category}' has an empty shorthand")]
    EmptyShorthand { category: String },

    #[error("Shorthand of {len} bytes in category '{category}' is longer than {max} bytes")]
    ShorthandTooLong {
        category: String,
        len: usize,
        max: usize,
    },

    #[error("Shorthand '{0}' is registered more than once")]
    DuplicateShorthand(String),
}
