//! Layer assignment and node placement.
//!
//! Layers are found with a variant of Kahn's algorithm: every node whose
//! in-degree has dropped to zero forms the next layer. When nodes remain but
//! none has in-degree zero the rest of the graph is cyclic, and all of it is
//! placed in one final layer instead of failing.
//!
//! Ties inside a layer follow node insertion order.

use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{LayoutConfig, NodeArena};
use crate::display::DisplayConnection;
use crate::equipment::Position;

/// Node ids grouped into layers, top layer first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerAssignment {
    pub layers: Vec<Vec<String>>,

    /// True if the cycle fallback produced the last layer
    pub cyclic: bool,
}

impl LayerAssignment {
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Index of the layer holding `id`
    pub fn layer_of(&self, id: &str) -> Option<usize> {
        self.layers
            .iter()
            .position(|layer| layer.iter().any(|n| n == id))
    }
}

/// Rank the arena's nodes by topological depth
///
/// Connections with an endpoint outside the arena are ignored.
pub fn assign_layers(arena: &NodeArena, connections: &[DisplayConnection]) -> LayerAssignment {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for id in arena.ids() {
        graph.add_node(id);
    }
    for connection in connections {
        let source = connection.source_id.as_str();
        let target = connection.target_id.as_str();
        if graph.contains_node(source) && graph.contains_node(target) {
            graph.add_edge(source, target, ());
        } else {
            tracing::debug!("Ignoring connection {} for layering", connection.id);
        }
    }

    let mut in_degree: HashMap<&str, usize> = graph
        .nodes()
        .map(|n| (n, graph.neighbors_directed(n, Direction::Incoming).count()))
        .collect();
    let mut remaining: Vec<&str> = graph.nodes().collect();
    let mut assignment = LayerAssignment::default();

    while !remaining.is_empty() {
        let layer: Vec<&str> = remaining
            .iter()
            .copied()
            .filter(|n| in_degree.get(n).copied().unwrap_or(0) == 0)
            .collect();

        if layer.is_empty() {
            tracing::debug!(
                "Cycle among {} nodes, placing them in a single layer",
                remaining.len()
            );
            assignment
                .layers
                .push(remaining.iter().map(|n| n.to_string()).collect());
            assignment.cyclic = true;
            break;
        }

        remaining.retain(|n| !layer.contains(n));
        for &node in &layer {
            for target in graph.neighbors_directed(node, Direction::Outgoing) {
                if let Some(degree) = in_degree.get_mut(target) {
                    *degree = degree.saturating_sub(1);
                }
            }
        }

        assignment
            .layers
            .push(layer.into_iter().map(str::to_string).collect());
    }

    assignment
}

/// Place every layered node, centring each layer on the canvas
pub fn position_layers(arena: &mut NodeArena, assignment: &LayerAssignment, config: &LayoutConfig) {
    for (index, layer) in assignment.layers.iter().enumerate() {
        let widths: f64 = layer
            .iter()
            .filter_map(|id| arena.get(id))
            .map(|node| node.size.width)
            .sum();
        let gaps = layer.len().saturating_sub(1) as f64 * config.node_spacing;
        let total_width = widths + gaps;

        let mut x = config.margin + ((config.canvas_width - total_width) / 2.0).max(0.0);
        let y = config.margin + index as f64 * config.layer_spacing;

        for id in layer {
            if let Some(node) = arena.get_mut(id) {
                node.position = Position::new(x, y);
                x += node.size.width + config.node_spacing;
            }
        }
    }
}
