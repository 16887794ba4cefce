//! Oneline CLI - lay out and inspect single-line diagrams from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use oneline::display::default_size;
use oneline::registry::DanglingLink;
use oneline::{DiagramCore, EquipmentKind, LayoutConfig, LayoutEngine, LayoutResult, RegistryStats};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;

#[derive(Parser)]
#[command(name = "oneline")]
#[command(about = "Single-line electrical diagram layout tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute node positions and connector routes for a diagram
    Layout {
        /// Diagram document or JSON array of equipment records
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// JSON file with layout settings (missing keys use defaults)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Find a chain of connections between two pieces of equipment
    Path {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Starting equipment id
        from: String,

        /// Target equipment id
        to: String,
    },

    /// Show equipment and connection counts
    Stats {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Report dangling references and cycles
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Exit with error code if the diagram contains a cycle
        #[arg(long)]
        fail_on_cycle: bool,
    },

    /// List equipment kinds and their default sizes
    Kinds,
}

/// Layout output plus the references that could not be linked
#[derive(Serialize)]
struct LayoutReport<'a> {
    #[serde(flatten)]
    result: &'a LayoutResult,
    dangling: &'a [DanglingLink],
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for other tools
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Layout {
            file,
            config,
            format,
        } => handle_layout(&file, config.as_deref(), format),
        Commands::Path { file, from, to } => handle_path(&file, &from, &to),
        Commands::Stats { file, format } => handle_stats(&file, format),
        Commands::Check {
            file,
            fail_on_cycle,
        } => handle_check(&file, fail_on_cycle),
        Commands::Kinds => {
            handle_kinds();
            0
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn handle_layout(file: &Path, config: Option<&Path>, format: OutputFormat) -> i32 {
    let config = match config {
        Some(path) => match LayoutConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        },
        None => LayoutConfig::default(),
    };

    let (registry, summary) = match DiagramCore::open(file) {
        Ok(opened) => opened,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let result = LayoutEngine::new(config).layout_registry(&registry);
    let report = LayoutReport {
        result: &result,
        dangling: &summary.dangling,
    };
    match format {
        OutputFormat::Human => {
            output_layout_human(&report);
            0
        }
        OutputFormat::Json => print_json(&report),
    }
}

fn output_layout_human(report: &LayoutReport) {
    let result = report.result;
    println!("\nLayers: {}", result.layers.len());
    println!("{}", "─".repeat(60));
    for (index, layer) in result.layers.layers.iter().enumerate() {
        println!("  {}: {}", index, layer.join(", "));
    }
    if result.layers.cyclic {
        println!("  (cycle detected, last layer holds the cyclic remainder)");
    }

    println!("\n  Nodes:");
    for node in &result.nodes {
        println!(
            "    {:<12} {:<12} at ({}, {}) size {}x{}",
            node.id, node.kind, node.position.x, node.position.y, node.size.width, node.size.height
        );
    }

    println!("\n  Connections:");
    for connection in &result.connections {
        if connection.is_routed() {
            let path: Vec<String> = connection
                .vertices()
                .map(|(x, y)| format!("({}, {})", x, y))
                .collect();
            println!("    {:<20} {}", connection.id, path.join(" -> "));
        } else {
            println!("    {:<20} unrouted", connection.id);
        }
    }

    if let Some(bounds) = result.bounds() {
        println!("\n  Bounds: {} x {}", bounds.width(), bounds.height());
    }

    if !report.dangling.is_empty() {
        println!("\n  Dangling references: {}", report.dangling.len());
        for link in report.dangling {
            println!("    - {} -> {}", link.source, link.load);
        }
    }
}

fn handle_path(file: &Path, from: &str, to: &str) -> i32 {
    let (registry, _) = match DiagramCore::open(file) {
        Ok(opened) => opened,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    match registry.find_path(from, to) {
        Some(path) => {
            let ids: Vec<&str> = path.iter().map(|e| e.id()).collect();
            println!("{}", ids.join(" -> "));
            0
        }
        None => {
            eprintln!("No path from {} to {}", from, to);
            1
        }
    }
}

fn handle_stats(file: &Path, format: OutputFormat) -> i32 {
    let (registry, _) = match DiagramCore::open(file) {
        Ok(opened) => opened,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let stats = registry.stats();
    match format {
        OutputFormat::Human => {
            output_stats_human(&stats);
            0
        }
        OutputFormat::Json => print_json(&stats),
    }
}

fn output_stats_human(stats: &RegistryStats) {
    println!("\n  Summary:");
    println!("    Equipment:   {}", stats.equipment_count);
    println!("    Connections: {}", stats.connection_count);
    println!("    Buses:       {}", stats.bus_count);
    println!("    Roots:       {}", stats.root_count);
    println!("    Isolated:    {}", stats.isolated_count);

    if !stats.by_kind.is_empty() {
        println!("\n  By kind:");
        for (kind, count) in &stats.by_kind {
            println!("    {:<12} {}", kind, count);
        }
    }
}

fn handle_check(file: &Path, fail_on_cycle: bool) -> i32 {
    let (registry, summary) = match DiagramCore::open(file) {
        Ok(opened) => opened,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    println!("\nFile: {}", file.display());
    println!("{}", "─".repeat(60));

    let mut exit_code = 0;
    if summary.dangling.is_empty() {
        println!("  No dangling references");
    } else {
        println!("\n  DANGLING:");
        for link in &summary.dangling {
            println!("    - {} -> {}", link.source, link.load);
        }
        exit_code = 1;
    }

    if registry.has_cycle() {
        println!("\n  CYCLE: diagram contains a cycle");
        if fail_on_cycle {
            exit_code = 1;
        }
    } else {
        println!("  No cycles");
    }

    exit_code
}

fn handle_kinds() {
    println!("Equipment kinds:\n");
    for kind in EquipmentKind::ALL {
        let size = default_size(kind);
        println!("  {:<12} {:<12} {}x{}", kind, kind.slug(), size.width, size.height);
    }
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}
