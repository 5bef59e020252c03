//! Link Feasibility
//!
//! Decides whether a link may be created between two pins. The check is
//! read-only; creating the link is a separate call on the registry.

pub mod predecessor;

pub use predecessor::{PredecessorScanner, ScanBoundary};

use crate::graph::{FsmGraph, PinKind, PinPair};
use crate::id::PinId;
use serde::Serialize;
use std::fmt;

/// Outcome of a link feasibility check. Anything but `Feasible` is a
/// user-facing rejection, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Feasibility {
    Feasible,
    CannotLinkInputs,
    CannotLinkOutputs,
    CannotLinkToItself,
    CannotLinkToPredecessor,
    DuplicateLink,
    InvalidNode,
}

impl Feasibility {
    pub fn is_feasible(self) -> bool {
        self == Feasibility::Feasible
    }
}

impl fmt::Display for Feasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Feasibility::Feasible => "Feasible.",
            Feasibility::CannotLinkInputs => "Cannot link inputs together.",
            Feasibility::CannotLinkOutputs => "Cannot link outputs together.",
            Feasibility::CannotLinkToItself => "Cannot link a node to itself.",
            Feasibility::CannotLinkToPredecessor => {
                "This node cannot be connected to a predecessor."
            }
            Feasibility::DuplicateLink => "An identical link exists already.",
            Feasibility::InvalidNode => "One of the pins does not belong to a valid node.",
        };
        f.write_str(message)
    }
}

/// Checks whether a link between `a` and `b`, given in any order, may be
/// created.
pub fn verify(graph: &FsmGraph, a: PinId, b: PinId) -> Feasibility {
    match check_link(graph, a, b) {
        Ok(_) => Feasibility::Feasible,
        Err(feasibility) => feasibility,
    }
}

/// Orders two pins as (output, input) without checking anything else.
pub fn orient(graph: &FsmGraph, a: PinId, b: PinId) -> Option<PinPair> {
    let a_kind = graph.node_by_pin(a)?.pin_kind(a);
    let b_kind = graph.node_by_pin(b)?.pin_kind(b);
    match (a_kind, b_kind) {
        (PinKind::Output, PinKind::Input) => Some(PinPair::new(a, b)),
        (PinKind::Input, PinKind::Output) => Some(PinPair::new(b, a)),
        _ => None,
    }
}

/// Runs the feasibility checks in order and returns the oriented pair on
/// success.
pub(crate) fn check_link(graph: &FsmGraph, a: PinId, b: PinId) -> Result<PinPair, Feasibility> {
    let (Some(a_node), Some(b_node)) = (graph.node_by_pin(a), graph.node_by_pin(b)) else {
        return Err(Feasibility::InvalidNode);
    };

    let (from, to, from_node, to_node) = match (a_node.pin_kind(a), b_node.pin_kind(b)) {
        (PinKind::Input, PinKind::Input) => return Err(Feasibility::CannotLinkInputs),
        (PinKind::Output, PinKind::Output) => return Err(Feasibility::CannotLinkOutputs),
        (PinKind::External, _) | (_, PinKind::External) => return Err(Feasibility::InvalidNode),
        _ if a_node.id() == b_node.id() => return Err(Feasibility::CannotLinkToItself),
        (PinKind::Output, PinKind::Input) => (a, b, a_node, b_node),
        (PinKind::Input, PinKind::Output) => (b, a, b_node, a_node),
    };

    if graph.find_link(from, to).is_some() {
        return Err(Feasibility::DuplicateLink);
    }

    if from_node.variant().is_conditional()
        && PredecessorScanner::new(graph, ScanBoundary::StateNodes)
            .is_predecessor(from_node.id(), to_node.id())
    {
        return Err(Feasibility::CannotLinkToPredecessor);
    }

    Ok(PinPair::new(from, to))
}
