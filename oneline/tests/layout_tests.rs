//! Integration tests for layout of saved diagrams

use oneline::prelude::*;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn layout_fixture(name: &str) -> LayoutResult {
    DiagramCore::layout_file(&fixture_path(name), LayoutConfig::default())
        .expect("fixture should lay out")
}

#[test]
fn test_feeder_layers() {
    let result = layout_fixture("feeder.json");
    let layers = &result.layers;

    assert!(!layers.cyclic);
    assert_eq!(layers.len(), 4);
    assert_eq!(layers.layers[0], vec!["UTIL", "G1", "G2", "SPARE"]);
    assert_eq!(layers.layer_of("T1"), Some(1));
    assert_eq!(layers.layer_of("SWG1"), Some(1));
    assert_eq!(layers.layer_of("BUS1"), Some(2));
    assert_eq!(layers.layers[3], vec!["M1", "M2", "P1"]);
}

#[test]
fn test_feeder_positions_ignore_saved_coordinates() {
    let result = layout_fixture("feeder.json");
    let config = LayoutConfig::default();

    // four 60-wide nodes and three gaps
    let start = config.margin + (config.canvas_width - 390.0) / 2.0;
    let util = result.node("UTIL").unwrap();
    let spare = result.node("SPARE").unwrap();

    assert_eq!(util.position.x, start);
    assert_eq!(util.position.y, config.margin);
    assert_eq!(spare.position.y, config.margin);
    assert_ne!(spare.position.x, 900.0);
}

#[test]
fn test_feeder_every_connection_is_routed() {
    let result = layout_fixture("feeder.json");

    assert_eq!(result.connections.len(), 8);
    for connection in &result.connections {
        assert!(connection.is_routed(), "{} should be routed", connection.id);
        assert_eq!(connection.points.len() % 2, 0);
    }
}

#[test]
fn test_generators_share_fan_in_segment() {
    let result = layout_fixture("feeder.json");
    let swg = result.node("SWG1").unwrap();
    let shared_y = swg.top() - LayoutConfig::default().multi_source_offset;

    let g1 = result.connection("G1-SWG1").unwrap();
    let g2 = result.connection("G2-SWG1").unwrap();

    assert!(g1.vertices().any(|(_, y)| y == shared_y));
    assert!(g2.vertices().any(|(_, y)| y == shared_y));
    assert_eq!(g1.vertices().last(), Some((swg.center_x(), swg.top())));
    assert_eq!(g2.vertices().last(), Some((swg.center_x(), swg.top())));

    let junction = g1.junction.expect("fan-in should carry a junction");
    assert_eq!(junction.y, shared_y);
    assert!(junction.x_start < junction.x_end);
}

#[test]
fn test_bus_spans_its_connections() {
    let result = layout_fixture("feeder.json");
    let bus = result.node("BUS1").unwrap();

    assert!(bus.size.width >= LayoutConfig::default().min_bus_width);
    for id in ["T1", "SWG1", "M1", "M2", "P1"] {
        let node = result.node(id).unwrap();
        assert!(bus.left() <= node.left(), "bus should reach {}", id);
        assert!(node.right() <= bus.right(), "bus should reach {}", id);
    }

    let bus_legs = result
        .connections
        .iter()
        .filter(|c| c.source_id == "BUS1" || c.target_id == "BUS1");
    for leg in bus_legs {
        let vertices: Vec<(f64, f64)> = leg.vertices().collect();
        assert_eq!(vertices.len(), 2, "{} should be a single drop", leg.id);
        assert_eq!(vertices[0].0, vertices[1].0);
        assert!(bus.left() <= vertices[0].0 && vertices[0].0 <= bus.right());
    }
}

#[test]
fn test_bus_legs_touch_the_bar() {
    let result = layout_fixture("feeder.json");
    let bus = result.node("BUS1").unwrap();

    let incoming = result.connection("T1-BUS1").unwrap();
    assert_eq!(incoming.vertices().last().map(|(_, y)| y), Some(bus.top()));

    let outgoing = result.connection("BUS1-M1").unwrap();
    assert_eq!(outgoing.vertices().next().map(|(_, y)| y), Some(bus.bottom()));
}

#[test]
fn test_cyclic_diagram_still_lays_out() {
    let result = layout_fixture("cyclic.json");

    assert!(result.layers.cyclic);
    assert_eq!(result.nodes.len(), 4);
    assert_eq!(result.layers.layers, vec![vec!["R"], vec!["A", "B", "C"]]);
    assert!(result.bounds().is_some());
}

#[test]
fn test_custom_config_changes_spacing() {
    let config = LayoutConfig::from_file(&fixture_path("layout_config.json")).unwrap();
    assert_eq!(config.layer_spacing, 120.0);
    assert_eq!(config.margin, LayoutConfig::default().margin);

    let result = DiagramCore::layout_file(&fixture_path("feeder.json"), config).unwrap();

    let util = result.node("UTIL").unwrap();
    let t1 = result.node("T1").unwrap();
    assert_eq!(t1.top() - util.top(), 120.0);
    assert!(result.node("BUS1").unwrap().size.width >= 150.0);
}

#[test]
fn test_invalid_config_is_rejected_before_loading() {
    let config = LayoutConfig {
        bus_padding: -1.0,
        ..LayoutConfig::default()
    };

    let err = DiagramCore::layout_file(&fixture_path("does_not_exist.json"), config).unwrap_err();

    assert!(matches!(err, DiagramError::Config(_)));
}

#[test]
fn test_layout_result_serializes_for_renderers() {
    let result = layout_fixture("feeder.json");
    let json = serde_json::to_value(&result).unwrap();

    let first = &json["nodes"][0];
    assert_eq!(first["id"], "UTIL");
    assert_eq!(first["type"], "Source");
    assert_eq!(first["icon"], "source");
    assert!(json["connections"][0]["points"].is_array());
}
