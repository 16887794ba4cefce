//! Build a small diagram in code, save it, and load it back.

use oneline::equipment::{LoadAttributes, TransformerAttributes};
use oneline::prelude::*;

fn main() -> Result<(), DiagramError> {
    let mut registry = Registry::new();
    registry.create("UTIL", "Utility", EquipmentKind::Source)?;
    registry.create(
        "T1",
        "Service Transformer",
        EquipmentSpec::Transformer(TransformerAttributes {
            rating_kva: Some(750.0),
            primary_voltage: Some(12_470.0),
            secondary_voltage: Some(480.0),
            impedance_percent: Some(5.5),
        }),
    )?;
    registry.create("BUS1", "Main Bus", EquipmentKind::Bus)?;
    for (id, kw) in [("L1", 120.0), ("L2", 85.0)] {
        registry.create(
            id,
            format!("Load {}", id),
            EquipmentSpec::Load(LoadAttributes {
                demand_kw: Some(kw),
                voltage: Some(480.0),
                power_factor: Some(0.9),
            }),
        )?;
    }

    registry.add_load("UTIL", "T1")?;
    registry.add_load("T1", "BUS1")?;
    registry.add_load("BUS1", "L1")?;
    registry.add_load("BUS1", "L2")?;

    let path = std::env::temp_dir().join("oneline_save_and_reload.json");
    DiagramCore::save(&registry, "Service Entrance", &path)?;
    println!("Saved {} equipment to {}", registry.len(), path.display());

    let mut reloaded = Registry::new();
    let summary = DiagramCore::load_into(&mut reloaded, &path)?;
    println!(
        "Reloaded {} equipment, {} links, {} dangling",
        reloaded.len(),
        summary.links_created,
        summary.dangling.len()
    );

    if let Some(path) = reloaded.find_path("UTIL", "L2") {
        let ids: Vec<&str> = path.iter().map(|e| e.id()).collect();
        println!("UTIL to L2: {}", ids.join(" -> "));
    }

    std::fs::remove_file(&path)?;
    Ok(())
}
