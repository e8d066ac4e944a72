use clap::Parser;
use log::{error, info, warn};
use rtscene_core::cli::report::{SeriesSummary, TextReport};
use rtscene_core::cli::{Cli, OutputFormat};
use rtscene_core::classify::classify_files;
use rtscene_core::extraction::{DicomRtReader, DicomVolumeLoader};
use rtscene_core::import::import_loadable;
use rtscene_core::isodose::{IsodoseColorCache, IsodoseSurfaceGenerator};
use rtscene_core::scene::{MemoryScene, Node, NodeId, SceneGraph};
use rtscene_core::{ImportOptions, IsodoseLevel, Result};
use std::process;

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    let loadables = classify_files(cli.files.iter().cloned());
    if loadables.is_empty() {
        eprintln!("Error: No RT structure set, dose or plan found in the given files");
        process::exit(1);
    }
    info!("Found {} RT objects", loadables.len());

    let options = ImportOptions::default().auto_contour_opacity(!cli.no_auto_opacity);
    let generator = IsodoseSurfaceGenerator::default();
    let mut color_cache = IsodoseColorCache::new();
    let mut scene = MemoryScene::new();
    let mut summaries = Vec::with_capacity(loadables.len());

    for loadable in &loadables {
        let report = match import_loadable(
            loadable,
            &DicomRtReader,
            &DicomVolumeLoader,
            &options,
            &mut scene,
        ) {
            Ok(report) => report,
            Err(e) => {
                error!("Failed to import '{}': {}", loadable.name, e);
                summaries.push(SeriesSummary::failed(loadable, &e));
                continue;
            }
        };

        let mut summary = SeriesSummary::from_report(loadable, &report, &scene);
        if let (Some(volume), false) = (report.dose_volume, cli.isodose.is_empty()) {
            match generate_isodose(
                &generator,
                &mut color_cache,
                volume,
                &cli.isodose,
                &mut scene,
            ) {
                Ok(levels) => summary = summary.with_isodose(&levels, &scene),
                Err(e) => {
                    warn!("Isodose generation failed for '{}': {}", loadable.name, e);
                    summary.errors.push(e.to_string());
                }
            }
        }
        summaries.push(summary);
    }

    output_summaries(&summaries, cli.format);

    if summaries.iter().all(|s| !s.success) {
        process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

fn generate_isodose(
    generator: &IsodoseSurfaceGenerator,
    color_cache: &mut IsodoseColorCache,
    volume: NodeId,
    levels: &[f64],
    scene: &mut MemoryScene,
) -> Result<Vec<IsodoseLevel>> {
    let table_id = color_cache.get_or_create(scene)?;
    let table = match scene.node(table_id) {
        Some(Node::ColorTable(table)) => table.clone(),
        _ => return Err("isodose color table missing from scene".into()),
    };
    let volume = scene
        .volume(volume)
        .cloned()
        .ok_or("dose volume missing from scene")?;
    generator.generate(&volume, levels, &table, None, scene)
}

fn output_summaries(summaries: &[SeriesSummary], format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            let report = TextReport::new(summaries);
            println!("{}", report);
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match serde_json::to_string_pretty(summaries) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}
