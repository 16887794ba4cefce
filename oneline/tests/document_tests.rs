//! Integration tests for diagram document save/load

use oneline::prelude::*;
use oneline::{DiagramDocument, RegistryError};
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_fixture_metadata() {
    let document = DiagramCore::load_document(&fixture_path("feeder.json")).unwrap();

    assert_eq!(document.metadata.name, "Plant Feeder");
    assert_eq!(document.metadata.schema_version, "1.0");
    assert_eq!(document.metadata.saved_at.to_rfc3339(), "2026-03-02T14:30:00+00:00");
    assert_eq!(document.equipment.len(), 10);
}

#[test]
fn test_bare_array_takes_file_name() {
    let document = DiagramCore::load_document(&fixture_path("cyclic.json")).unwrap();

    assert_eq!(document.metadata.name, "cyclic");
    assert_eq!(document.equipment.len(), 4);
}

#[test]
fn test_save_reload_preserves_layout_input() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("copy.json");
    let (original, _) = DiagramCore::open(&fixture_path("feeder.json")).unwrap();

    DiagramCore::save(&original, "Copy", &path).unwrap();
    let (reloaded, summary) = DiagramCore::open(&path).unwrap();

    assert!(summary.dangling.is_empty());
    assert_eq!(reloaded.to_records(), original.to_records());

    let engine = LayoutEngine::default();
    assert_eq!(engine.layout_registry(&reloaded), engine.layout_registry(&original));
}

#[test]
fn test_saved_records_use_camel_case() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out.json");
    let (registry, _) = DiagramCore::open(&fixture_path("feeder.json")).unwrap();

    DiagramCore::save(&registry, "Plant", &path).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(json["metadata"]["schemaVersion"], "1.0");
    assert!(json["metadata"]["savedAt"].is_string());
    let t1 = &json["equipment"][3];
    assert_eq!(t1["id"], "T1");
    assert_eq!(t1["type"], "Transformer");
    assert_eq!(t1["ratingKva"], 1500.0);
    assert_eq!(t1["sourceIds"][0], "UTIL");
}

#[test]
fn test_failed_load_leaves_registry_untouched() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dup.json");
    std::fs::write(
        &path,
        r#"[{"id": "X", "name": "X", "type": "Load"}, {"id": "X", "name": "Y", "type": "Load"}]"#,
    )
    .unwrap();

    let (mut registry, _) = DiagramCore::open(&fixture_path("feeder.json")).unwrap();
    let err = DiagramCore::load_into(&mut registry, &path).unwrap_err();

    assert!(matches!(
        err,
        DiagramError::Registry(RegistryError::DuplicateId(_))
    ));
    assert_eq!(registry.len(), 10);
}

#[test]
fn test_unknown_type_is_rejected() {
    let err = DiagramDocument::from_json(r#"[{"id": "Q", "name": "Q", "type": "Capacitor"}]"#, "x")
        .unwrap_err();

    assert!(matches!(err, DiagramError::Json(_)));
}
