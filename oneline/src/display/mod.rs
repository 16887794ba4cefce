//! Display Adapter
//!
//! Maps equipment into geometry-bearing display nodes and connections for a
//! renderer. Nothing here decides where a node goes: positions are copied
//! from the equipment and overwritten by the layout pass, and connection
//! paths are left empty for the router.

mod decorations;

use serde::{Deserialize, Serialize};

use crate::equipment::{Equipment, EquipmentKind, Position};

pub use decorations::decorations_for;

/// Box used for kinds without a dedicated size
pub const DEFAULT_SIZE: Size = Size {
    width: 80.0,
    height: 60.0,
};

/// Width and height of a node box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        DEFAULT_SIZE
    }
}

/// Default node box for each kind
pub fn default_size(kind: EquipmentKind) -> Size {
    match kind {
        EquipmentKind::Generator => Size::new(60.0, 60.0),
        EquipmentKind::Transformer => Size::new(60.0, 80.0),
        EquipmentKind::Switchgear => Size::new(100.0, 60.0),
        EquipmentKind::Motor => Size::new(60.0, 60.0),
        EquipmentKind::Panel => Size::new(80.0, 100.0),
        EquipmentKind::Bus => Size::new(200.0, 10.0),
        EquipmentKind::Breaker => Size::new(40.0, 40.0),
        EquipmentKind::Relay => Size::new(40.0, 40.0),
        EquipmentKind::Load => Size::new(60.0, 60.0),
        EquipmentKind::Source => Size::new(60.0, 60.0),
        EquipmentKind::Other => DEFAULT_SIZE,
    }
}

/// Side of the node box a text decoration is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Extra displacement from the anchor point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

/// A line of text drawn next to a node (rating, voltage, status, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDecoration {
    pub text: String,

    pub anchor: Anchor,

    pub align: TextAlign,

    /// CSS colour, renderer default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Offset>,
}

impl TextDecoration {
    /// Text at `anchor`, aligned away from the box
    pub fn new(text: impl Into<String>, anchor: Anchor) -> Self {
        let align = match anchor {
            Anchor::Left => TextAlign::Right,
            Anchor::Right => TextAlign::Left,
            Anchor::Top | Anchor::Bottom | Anchor::Center => TextAlign::Center,
        };
        Self {
            text: text.into(),
            anchor,
            align,
            color: None,
            offset: None,
        }
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.offset = Some(Offset { dx, dy });
        self
    }
}

/// Renderable projection of one piece of equipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayNode {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: EquipmentKind,

    /// Top-left corner, absolute canvas coordinates
    pub position: Position,

    pub size: Size,

    pub label: String,

    /// Icon reference, the kind's slug
    pub icon: String,

    #[serde(default)]
    pub decorations: Vec<TextDecoration>,

    /// Id of the equipment this node was built from
    pub equipment_id: String,
}

impl DisplayNode {
    pub fn is_bus(&self) -> bool {
        self.kind.is_bus()
    }

    pub fn left(&self) -> f64 {
        self.position.x
    }

    pub fn right(&self) -> f64 {
        self.position.x + self.size.width
    }

    pub fn top(&self) -> f64 {
        self.position.y
    }

    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.height
    }

    pub fn center_x(&self) -> f64 {
        self.position.x + self.size.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.position.y + self.size.height / 2.0
    }
}

/// Shared horizontal segment drawn for a fan-in of several sources
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Junction {
    pub y: f64,
    pub x_start: f64,
    pub x_end: f64,
}

/// Renderable projection of one source → load link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConnection {
    /// `"{source_id}-{target_id}"`
    pub id: String,

    pub source_id: String,

    pub target_id: String,

    /// Polyline vertices as a flat `[x0, y0, x1, y1, ...]` list; empty until
    /// routed
    #[serde(default)]
    pub points: Vec<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub junction: Option<Junction>,
}

impl DisplayConnection {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        let source_id = source_id.into();
        let target_id = target_id.into();
        Self {
            id: format!("{}-{}", source_id, target_id),
            source_id,
            target_id,
            points: Vec::new(),
            junction: None,
        }
    }

    pub fn is_routed(&self) -> bool {
        !self.points.is_empty()
    }

    /// Polyline vertices as `(x, y)` pairs
    pub fn vertices(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.chunks_exact(2).map(|p| (p[0], p[1]))
    }
}

/// Build one display node per piece of equipment
pub fn to_display_nodes<'a, I>(equipment: I) -> Vec<DisplayNode>
where
    I: IntoIterator<Item = &'a Equipment>,
{
    equipment.into_iter().map(to_display_node).collect()
}

pub fn to_display_node(equipment: &Equipment) -> DisplayNode {
    let kind = equipment.kind();
    DisplayNode {
        id: equipment.id().to_string(),
        kind,
        position: equipment.position(),
        size: default_size(kind),
        label: equipment.name().to_string(),
        icon: kind.slug().to_string(),
        decorations: decorations_for(equipment.spec()),
        equipment_id: equipment.id().to_string(),
    }
}

/// Build one unrouted connection per `load_ids` entry
pub fn to_display_connections<'a, I>(equipment: I) -> Vec<DisplayConnection>
where
    I: IntoIterator<Item = &'a Equipment>,
{
    equipment
        .into_iter()
        .flat_map(|e| {
            e.load_ids()
                .iter()
                .map(move |load| DisplayConnection::new(e.id(), load.as_str()))
        })
        .collect()
}
