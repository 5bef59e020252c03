use crate::graph::{FsmGraph, NodeVariant};
use crate::id::NodeId;
use ahash::AHashSet;

/// Which predecessors the backward search may walk through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanBoundary {
    /// State nodes are opaque: they are neither reported nor expanded, so the
    /// search stays inside the conditional subgraph.
    #[default]
    StateNodes,
    /// Every predecessor is expanded.
    Unbounded,
}

/// Backward depth-first search over the links feeding a node's inputs.
pub struct PredecessorScanner<'g> {
    graph: &'g FsmGraph,
    boundary: ScanBoundary,
}

impl<'g> PredecessorScanner<'g> {
    pub fn new(graph: &'g FsmGraph, boundary: ScanBoundary) -> Self {
        Self { graph, boundary }
    }

    /// Whether `target` can be reached from `root` by walking links backwards.
    ///
    /// `root` itself is always expanded, whatever its variant. Each node is
    /// expanded at most once.
    pub fn is_predecessor(&self, root: NodeId, target: NodeId) -> bool {
        let mut visited = AHashSet::new();
        let mut stack = vec![root];
        visited.insert(root);

        while let Some(current) = stack.pop() {
            let Some(node) = self.graph.node(current) else {
                continue;
            };

            for input in node.inputs() {
                for (_, pair) in self.graph.links_of(*input) {
                    let Some(source) = self.graph.node_by_pin(pair.from) else {
                        continue;
                    };
                    if !self.crosses(source.variant()) {
                        continue;
                    }
                    if source.id() == target {
                        return true;
                    }
                    if visited.insert(source.id()) {
                        stack.push(source.id());
                    }
                }
            }
        }
        false
    }

    fn crosses(&self, variant: NodeVariant) -> bool {
        match self.boundary {
            ScanBoundary::StateNodes => variant.is_conditional(),
            ScanBoundary::Unbounded => true,
        }
    }
}
