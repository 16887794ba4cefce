//! Diagram document I/O shared by the CLI and any GUI front end.
//! No rendering or windowing dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::equipment::EquipmentRecord;
use crate::layout::{LayoutConfig, LayoutEngine, LayoutResult};
use crate::registry::{RebuildSummary, Registry, RegistryError};

/// Schema version written into saved documents
pub const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid diagram JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid layout config: {0}")]
    Config(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramMetadata {
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub schema_version: String,
}

impl DiagramMetadata {
    /// Metadata stamped with the current time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            saved_at: Utc::now(),
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }
}

/// A saved diagram: metadata plus one record per piece of equipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramDocument {
    pub metadata: DiagramMetadata,
    pub equipment: Vec<EquipmentRecord>,
}

impl DiagramDocument {
    pub fn from_registry(registry: &Registry, name: impl Into<String>) -> Self {
        Self {
            metadata: DiagramMetadata::new(name),
            equipment: registry.to_records(),
        }
    }

    /// Parse a document, or a bare array of records
    ///
    /// A bare array gets fresh metadata named `fallback_name`.
    pub fn from_json(content: &str, fallback_name: &str) -> Result<Self, DiagramError> {
        let value: Value = serde_json::from_str(content)?;
        if value.is_array() {
            let equipment: Vec<EquipmentRecord> = serde_json::from_value(value)?;
            return Ok(Self {
                metadata: DiagramMetadata::new(fallback_name),
                equipment,
            });
        }

        let document: DiagramDocument = serde_json::from_value(value)?;
        if document.metadata.schema_version != SCHEMA_VERSION {
            tracing::warn!(
                "Diagram '{}' has schema version {}, expected {}",
                document.metadata.name,
                document.metadata.schema_version,
                SCHEMA_VERSION
            );
        }
        Ok(document)
    }

    pub fn to_json(&self) -> Result<String, DiagramError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a registry holding this document's equipment and links
    pub fn to_registry(&self) -> Result<(Registry, RebuildSummary), DiagramError> {
        let mut registry = Registry::new();
        let summary = registry.load_records(&self.equipment)?;
        Ok((registry, summary))
    }
}

/// Core diagram API used by both CLI and GUI.
pub struct DiagramCore;

impl DiagramCore {
    /// Read a diagram document file
    pub fn load_document(path: &Path) -> Result<DiagramDocument, DiagramError> {
        let content = std::fs::read_to_string(path)?;
        let fallback_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled");
        let document = DiagramDocument::from_json(&content, fallback_name)?;
        tracing::info!(
            "Loaded diagram '{}' ({} equipment) from {}",
            document.metadata.name,
            document.equipment.len(),
            path.display()
        );
        Ok(document)
    }

    /// Open a diagram file as a fresh registry
    pub fn open(path: &Path) -> Result<(Registry, RebuildSummary), DiagramError> {
        Self::load_document(path)?.to_registry()
    }

    /// Replace `registry`'s contents with the diagram in `path`
    ///
    /// On error the registry is left untouched.
    pub fn load_into(registry: &mut Registry, path: &Path) -> Result<RebuildSummary, DiagramError> {
        let document = Self::load_document(path)?;
        Ok(registry.load_records(&document.equipment)?)
    }

    /// Write `registry` to `path` as a diagram document
    pub fn save(
        registry: &Registry,
        name: &str,
        path: &Path,
    ) -> Result<DiagramDocument, DiagramError> {
        let document = DiagramDocument::from_registry(registry, name);
        std::fs::write(path, document.to_json()?)?;
        tracing::info!(
            "Saved diagram '{}' ({} equipment) to {}",
            name,
            document.equipment.len(),
            path.display()
        );
        Ok(document)
    }

    /// Open a diagram file and lay it out
    pub fn layout_file(path: &Path, config: LayoutConfig) -> Result<LayoutResult, DiagramError> {
        config.validate()?;
        let (registry, summary) = Self::open(path)?;
        if !summary.dangling.is_empty() {
            tracing::warn!(
                "Laying out {} with {} dangling references",
                path.display(),
                summary.dangling.len()
            );
        }
        Ok(LayoutEngine::new(config).layout_registry(&registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::EquipmentKind;
    use tempfile::TempDir;

    fn create_test_registry() -> Registry {
        let mut registry = Registry::new();
        registry.create("UTIL", "Utility", EquipmentKind::Source).unwrap();
        registry.create("T1", "Main Xfmr", EquipmentKind::Transformer).unwrap();
        registry.create("M1", "Pump", EquipmentKind::Motor).unwrap();
        registry.add_load("UTIL", "T1").unwrap();
        registry.add_load("T1", "M1").unwrap();
        registry
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plant.json");
        let registry = create_test_registry();

        DiagramCore::save(&registry, "Plant", &path).unwrap();
        let document = DiagramCore::load_document(&path).unwrap();
        assert_eq!(document.metadata.name, "Plant");
        assert_eq!(document.metadata.schema_version, SCHEMA_VERSION);

        let mut reloaded = Registry::new();
        reloaded.create("STALE", "Stale", EquipmentKind::Other).unwrap();
        let summary = DiagramCore::load_into(&mut reloaded, &path).unwrap();

        assert!(summary.dangling.is_empty());
        assert!(!reloaded.contains("STALE"));
        assert_eq!(reloaded.to_records(), registry.to_records());
    }

    #[test]
    fn test_bare_array_is_accepted() {
        let content = r#"[
            {"id": "G1", "name": "Gen", "type": "Generator", "sourceIds": [], "loadIds": ["L1"]},
            {"id": "L1", "name": "Load", "type": "Load", "sourceIds": ["G1"], "loadIds": []}
        ]"#;

        let document = DiagramDocument::from_json(content, "feeder").unwrap();
        let (registry, _) = document.to_registry().unwrap();

        assert_eq!(document.metadata.name, "feeder");
        assert!(registry.is_connected("G1", "L1"));
    }

    #[test]
    fn test_malformed_json_is_a_json_error() {
        let err = DiagramDocument::from_json("{ not json", "x").unwrap_err();
        assert!(matches!(err, DiagramError::Json(_)));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let content = r#"[
            {"id": "A", "name": "A", "type": "Load"},
            {"id": "A", "name": "A again", "type": "Load"}
        ]"#;

        let document = DiagramDocument::from_json(content, "dup").unwrap();
        let err = document.to_registry().unwrap_err();

        assert!(matches!(
            err,
            DiagramError::Registry(RegistryError::DuplicateId(ref id)) if id == "A"
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = DiagramCore::load_document(&temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, DiagramError::Io(_)));
    }

    #[test]
    fn test_layout_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plant.json");
        DiagramCore::save(&create_test_registry(), "Plant", &path).unwrap();

        let result = DiagramCore::layout_file(&path, LayoutConfig::default()).unwrap();

        assert_eq!(result.nodes.len(), 3);
        assert_eq!(result.layers.len(), 3);
        assert!(result.connections.iter().all(|c| c.is_routed()));
    }
}
