//! Lay out a diagram file and print where everything landed.

use oneline::prelude::*;
use std::path::Path;

fn main() -> Result<(), DiagramError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/feeder.json".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example feeder_layout [path/to/diagram.json]");
        std::process::exit(1);
    }

    let result = DiagramCore::layout_file(path, LayoutConfig::default())?;

    println!("Layout for: {}", path.display());
    println!("Layers: {}", result.layers.len());
    println!();

    for node in &result.nodes {
        println!(
            "{:<8} {:<12} x={:<8} y={:<8} {}x{}",
            node.id, node.kind, node.position.x, node.position.y, node.size.width, node.size.height
        );
        for decoration in &node.decorations {
            println!("         {}", decoration.text);
        }
    }

    println!();
    for connection in &result.connections {
        let kind = if connection.junction.is_some() {
            "fan-in"
        } else {
            "route"
        };
        println!("{:<14} {:<7} {:?}", connection.id, kind, connection.points);
    }

    if let Some(bounds) = result.bounds() {
        println!("\nDrawing size: {} x {}", bounds.width(), bounds.height());
    }
    Ok(())
}
