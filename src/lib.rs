//! # Kairo - FSM Graph Core
//!
//! **Kairo** is the data core of a finite-state-machine graph editor. It owns the graph of
//! state and conditional nodes, decides which links a user may draw, saves and loads the
//! graph in a compact native binary format, and flattens it into a linear statement list
//! for an external runtime.
//!
//! ## Core Workflow
//!
//! 1.  **Build a Graph**: Create an `FsmGraph` (optionally with an `ExpressionCatalog` of
//!     structured guard options) and add `State`, `If` and `Cond` nodes.
//! 2.  **Link Nodes**: Use `FsmGraph::try_link` to verify and create links. Rejections come
//!     back as a `Feasibility` value that can be shown to the user.
//! 3.  **Persist**: `FsmGraph::save` and `FsmGraph::load` read and write the native format.
//! 4.  **Export**: `export::export` turns everything reachable from a state into statements.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kairo::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut catalog = ExpressionCatalog::new();
//!     let armed = catalog.add_option("Sensors", ExpressionOption::new("armed", "sensor.armed"))?;
//!
//!     let mut graph = FsmGraph::builder().with_catalog(catalog).build();
//!
//!     let idle = graph.create_state("Idle")?;
//!     let check = graph.create_if()?;
//!     let alarm = graph.create_state("Alarm")?;
//!
//!     if let Some(if_node) = graph.node_mut(check).and_then(|n| n.as_if_mut()) {
//!         if_node.guard_mut().insert_option(armed);
//!     }
//!
//!     let idle_out = graph.node(idle).map(|n| n.outputs()[0]).unwrap_or_default();
//!     let check_in = graph.node(check).map(|n| n.inputs()[0]).unwrap_or_default();
//!     let check_then = graph.node(check).map(|n| n.outputs()[IfNode::THEN]).unwrap_or_default();
//!     let alarm_in = graph.node(alarm).map(|n| n.inputs()[0]).unwrap_or_default();
//!
//!     graph.try_link(idle_out, check_in).map_err(|f| f.to_string())?;
//!     graph.try_link(check_then, alarm_in).map_err(|f| f.to_string())?;
//!
//!     graph.save("machine.fsm")?;
//!
//!     for statement in export(&graph, idle)? {
//!         println!("{}", statement);
//!     }
//!     Ok(())
//! }
//! ```

pub mod duplicate;
pub mod error;
pub mod export;
pub mod graph;
pub mod guard;
pub mod id;
pub mod native;
pub mod prelude;
pub mod text;
pub mod verify;
