//! Layout Engine
//!
//! Turns display nodes and connections into a drawn diagram:
//!
//! 1. [`layering`] ranks nodes into horizontal layers (Kahn's algorithm,
//!    cycles collapse into one final layer) and places them.
//! 2. [`routing`] computes connector polylines and, while routing bus
//!    connections, resizes each bus bar to span the equipment it serves.
//! 3. A final bus pass re-derives bus widths from the connected node spans
//!    and recentres the bars.
//!
//! All three steps read and write the same [`NodeArena`]. Later steps
//! overwrite what earlier ones wrote (bus size and position in particular),
//! so the step order is part of the result.

pub mod layering;
pub mod routing;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::DiagramError;
use crate::display::{to_display_connections, to_display_nodes, DisplayConnection, DisplayNode};
use crate::equipment::Equipment;
use crate::registry::Registry;

pub use layering::LayerAssignment;

/// Spacing and routing constants for a layout pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Space left of the first node and above the first layer
    pub margin: f64,

    /// Horizontal gap between neighbouring nodes in a layer
    pub node_spacing: f64,

    /// Vertical distance between the tops of consecutive layers
    pub layer_spacing: f64,

    /// Canvas width assumed when centring a layer
    pub canvas_width: f64,

    /// Drop below the source before a single-source route turns horizontal
    pub route_offset: f64,

    /// Height of the shared fan-in segment above its target
    pub multi_source_offset: f64,

    /// How far the shared fan-in segment extends past its outermost leg
    pub multi_source_extension: f64,

    /// Overhang of a bus bar past its outermost connection
    pub bus_padding: f64,

    pub min_bus_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 50.0,
            node_spacing: 50.0,
            layer_spacing: 150.0,
            canvas_width: 1200.0,
            route_offset: 40.0,
            multi_source_offset: 30.0,
            multi_source_extension: 20.0,
            bus_padding: 20.0,
            min_bus_width: 100.0,
        }
    }
}

impl LayoutConfig {
    /// Parse a JSON config; absent keys take their defaults
    pub fn from_json(content: &str) -> Result<Self, DiagramError> {
        let config: LayoutConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, DiagramError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Reject negative or non-finite values
    pub fn validate(&self) -> Result<(), DiagramError> {
        let fields = [
            ("margin", self.margin),
            ("nodeSpacing", self.node_spacing),
            ("layerSpacing", self.layer_spacing),
            ("canvasWidth", self.canvas_width),
            ("routeOffset", self.route_offset),
            ("multiSourceOffset", self.multi_source_offset),
            ("multiSourceExtension", self.multi_source_extension),
            ("busPadding", self.bus_padding),
            ("minBusWidth", self.min_bus_width),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(DiagramError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Id-addressed store of the nodes being laid out
///
/// Keeps first-insertion order so results are deterministic.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: IndexMap<String, DisplayNode>,
}

impl NodeArena {
    /// Build an arena; a repeated id replaces the earlier node in place
    pub fn from_nodes(nodes: Vec<DisplayNode>) -> Self {
        let mut arena = Self::default();
        for node in nodes {
            arena.insert(node);
        }
        arena
    }

    pub fn insert(&mut self, node: DisplayNode) {
        if self.nodes.contains_key(&node.id) {
            tracing::warn!("Duplicate display node {}, keeping the last one", node.id);
        }
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn get(&self, id: &str) -> Option<&DisplayNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut DisplayNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplayNode> {
        self.nodes.values()
    }

    pub fn into_nodes(self) -> Vec<DisplayNode> {
        self.nodes.into_values().collect()
    }
}

/// Axis-aligned box around everything drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl LayoutBounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

/// Positioned nodes and routed connections, ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub nodes: Vec<DisplayNode>,
    pub connections: Vec<DisplayConnection>,
    pub layers: LayerAssignment,
}

impl LayoutResult {
    pub fn node(&self, id: &str) -> Option<&DisplayNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn connection(&self, id: &str) -> Option<&DisplayConnection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Bounding box of all nodes and route points, `None` when empty
    pub fn bounds(&self) -> Option<LayoutBounds> {
        let mut bounds: Option<LayoutBounds> = None;
        let corners = self.nodes.iter().flat_map(|n| {
            [(n.left(), n.top()), (n.right(), n.bottom())]
        });
        let points = self.connections.iter().flat_map(|c| c.vertices());

        for (x, y) in corners.chain(points) {
            match bounds.as_mut() {
                Some(b) => b.include(x, y),
                None => {
                    bounds = Some(LayoutBounds {
                        min_x: x,
                        min_y: y,
                        max_x: x,
                        max_y: y,
                    })
                }
            }
        }
        bounds
    }
}

/// Sequences layering, routing and the bus adjustment pass
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out a diagram from scratch
    ///
    /// Incoming positions and route points are ignored and replaced. Nodes
    /// come back in input order, connections in input order.
    pub fn calculate_layout(
        &self,
        nodes: Vec<DisplayNode>,
        mut connections: Vec<DisplayConnection>,
    ) -> LayoutResult {
        let mut arena = NodeArena::from_nodes(nodes);

        let layers = layering::assign_layers(&arena, &connections);
        layering::position_layers(&mut arena, &layers, &self.config);

        routing::route_connections(&mut arena, &mut connections, &self.config);
        routing::adjust_bus_nodes(&mut arena, &mut connections, &self.config);

        tracing::debug!(
            "Laid out {} nodes in {} layers, {} connections",
            arena.len(),
            layers.len(),
            connections.len()
        );

        LayoutResult {
            nodes: arena.into_nodes(),
            connections,
            layers,
        }
    }

    /// Project equipment through the display adapter and lay it out
    pub fn layout_equipment<'a, I>(&self, equipment: I) -> LayoutResult
    where
        I: IntoIterator<Item = &'a Equipment>,
    {
        let equipment: Vec<&Equipment> = equipment.into_iter().collect();
        let nodes = to_display_nodes(equipment.iter().copied());
        let connections = to_display_connections(equipment.iter().copied());
        self.calculate_layout(nodes, connections)
    }

    pub fn layout_registry(&self, registry: &Registry) -> LayoutResult {
        self.layout_equipment(registry.iter())
    }
}
