//! Prelude module for convenient imports
//!
//! Re-exports the types needed to build, verify, persist and export a graph.
//!
//! # Example
//!
//! ```rust,no_run
//! use kairo::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let catalog = ExpressionCatalog::from_file("path/to/catalog.json")?;
//! let mut graph = FsmGraph::builder().with_catalog(catalog).build();
//! graph.load("path/to/machine.fsm")?;
//!
//! let root = graph
//!     .nodes()
//!     .find(|node| node.variant() == NodeVariant::State)
//!     .map(|node| node.id());
//! if let Some(root) = root {
//!     print!("{}", render(&export(&graph, root)?));
//! }
//! # Ok(())
//! # }
//! ```

// Registry and node types
pub use crate::graph::{
    FsmGraph, FsmGraphBuilder, IfNode, Node, NodeKind, NodeVariant, PinKind, PinPair,
};
pub use crate::id::{Id, LinkId, MAX_ID, NodeId, PinId};

// Guards
pub use crate::guard::{ExpressionCatalog, ExpressionOption, Guard, GuardMode};

// Link verification
pub use crate::verify::{Feasibility, verify};

// Export and cloning
pub use crate::duplicate::{clone_config, duplicate_node};
pub use crate::export::{Statement, export, render};

// Error types
pub use crate::error::{CatalogError, CloneError, ExportError, GraphError, NativeFormatError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
