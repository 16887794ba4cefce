//! Oneline - single-line electrical diagram graph and layout library
//!
//! This library models the equipment of a power distribution system
//! (generators, transformers, buses, breakers, loads, ...) as a directed
//! source → load graph and lays it out as a top-down single-line diagram
//! with orthogonal connectors and auto-sized bus bars.
//!
//! # Quick Start
//!
//! ```
//! use oneline::{EquipmentKind, LayoutEngine, Registry};
//!
//! let mut registry = Registry::new();
//! registry.create("UTIL", "Utility", EquipmentKind::Source).unwrap();
//! registry.create("BUS1", "Main Bus", EquipmentKind::Bus).unwrap();
//! registry.create("M1", "Pump", EquipmentKind::Motor).unwrap();
//! registry.add_load("UTIL", "BUS1").unwrap();
//! registry.add_load("BUS1", "M1").unwrap();
//!
//! let result = LayoutEngine::default().layout_registry(&registry);
//! for node in &result.nodes {
//!     println!("{} at ({}, {})", node.label, node.position.x, node.position.y);
//! }
//! ```
//!
//! # Features
//!
//! - **Graph model**: bidirectional links kept consistent by the registry
//! - **Layering**: topological layers with a fallback for cyclic graphs
//! - **Routing**: right-angle connectors, shared fan-in segments, bus drops
//! - **Documents**: JSON save/load with link reconstruction

pub mod core;
pub mod display;
pub mod equipment;
pub mod layout;
pub mod registry;

// Re-export main types
pub use crate::core::{DiagramCore, DiagramDocument, DiagramError, DiagramMetadata};
pub use display::{DisplayConnection, DisplayNode, Junction, Size, TextDecoration};
pub use equipment::{Equipment, EquipmentKind, EquipmentRecord, EquipmentSpec, Position};
pub use layout::{LayoutConfig, LayoutEngine, LayoutResult};
pub use registry::{RebuildSummary, Registry, RegistryError, RegistryStats, SharedRegistry};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        DiagramCore, DiagramError, DisplayConnection, DisplayNode, Equipment, EquipmentKind,
        EquipmentSpec, LayoutConfig, LayoutEngine, LayoutResult, Registry, RegistryError,
    };
}
