// Example showing how to export the lightmaps of a world described in a JSON file
//
// Writes `<output_dir>/<WorldName>/<Texture>.png` for every lightmap texture and
// `<output_dir>/<WorldName>/<ActorName>.json` for every lightmapped actor.
//
// Usage: cargo run --example export_world -- <path_to_world_json> [output_dir]

use lightmap_export::export::ExporterRegistry;
use lightmap_export::scene::description::read_world;
use lightmap_export::{ActorFileNaming, ExportOptions, export_world_lightmaps_to};
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let world_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        eprintln!("Usage: {} <path_to_world_json> [output_dir]", args[0]);
        eprintln!("Example: cargo run --example export_world -- /path/to/level01.json exported");
        std::process::exit(1);
    };
    let output_dir = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("exported_lightmaps"));

    if !world_path.exists() {
        eprintln!("Error: File not found: {}", world_path.display());
        std::process::exit(1);
    }

    let world = read_world(&world_path)?;
    println!("Exporting world: {}", world.name);

    let options = ExportOptions::new().actor_file_naming(ActorFileNaming::DisplayName);
    let report = export_world_lightmaps_to(
        &world,
        &output_dir,
        &ExporterRegistry::with_default_exporters(),
        &options,
    )?;

    for path in &report.written {
        println!("✓ {}", path.display());
    }
    for failure in &report.failures {
        eprintln!("✗ {failure}");
    }
    if report.cancelled {
        eprintln!("Export was cancelled by an exporter");
    }

    if report.is_success() {
        println!(
            "✓ Exported {} files to: {}",
            report.written.len(),
            output_dir.join(&world.name).display()
        );
        Ok(())
    } else {
        std::process::exit(1);
    }
}
