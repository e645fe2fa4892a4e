use astral_game::cli::CliArgs;
use astral_game::collaborators::Collaborators;
use astral_mapgen::{GenerationOutcome, GenerationStage, MapConfig, MapGenerator};
use clap::Parser;

/// Upper bound on simulated frames in cooperative mode
const MAX_FRAMES: u32 = 100_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = CliArgs::parse();

    if let Some(path) = &args.write_default_config {
        MapConfig::default().save(path)?;
        println!("[CONFIG] Default config written to {}", path.display());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => MapConfig::load(path)?,
        None => MapConfig::default(),
    };
    args.apply_overrides(&mut config);

    println!("=== ASTRAL MAP GENERATOR ===\n");
    println!("[CONFIG] {}x{} tiles, tile size {}", config.width, config.height, config.tile_size);

    let mut generator = MapGenerator::new(config);
    let mut collaborators = Collaborators::default();

    if args.sync {
        for i in 0..args.regenerations.max(1) {
            match generator.regenerate(&mut collaborators) {
                GenerationOutcome::Skipped => println!("[GENERATOR] Regeneration {} skipped, map exists", i + 1),
                _ => println!("[GENERATOR] Regeneration {} complete", i + 1),
            }
        }
    } else {
        if generator.start() == GenerationOutcome::Skipped {
            println!("[GENERATOR] Skipped, map exists");
            return Ok(());
        }

        let mut frame = 0;
        let mut last = GenerationStage::Idle;
        while generator.is_running() && frame < MAX_FRAMES {
            let stage = generator.tick(&mut collaborators);
            if stage != last {
                log::info!("Frame {}: reached {:?}", frame, stage);
                last = stage;
            } else {
                log::debug!("Frame {}: still in {:?}", frame, stage);
            }
            frame += 1;
        }
        println!("[GENERATOR] Cooperative run finished after {} frames", frame);
    }

    print_summary(&generator, &collaborators);
    Ok(())
}

fn print_summary(generator: &MapGenerator, collaborators: &Collaborators) {
    let Some(map) = generator.generated() else {
        println!("\n[SUMMARY] No map generated");
        return;
    };
    let stats = &map.stats;

    println!("\n[SUMMARY] Noise seed: {}", stats.noise_seed);
    println!(
        "[SUMMARY] Tiles: {} emitted, {} water cells",
        stats.tiles, stats.water_cells
    );

    for (layer, report) in map.report.layers.iter().enumerate() {
        let triangles: usize = generator
            .scene()
            .combined_meshes()
            .filter(|m| m.layer == layer)
            .map(|m| m.mesh.triangle_count())
            .sum();
        println!(
            "[SUMMARY] Layer {}: {} tiles in {} merged meshes, {} triangles",
            layer,
            report.tiles,
            report.flushes.len(),
            triangles
        );
    }

    println!(
        "[SUMMARY] Mountains: {} ranges, {} tiles",
        stats.mountain_ranges, stats.mountain_tiles
    );
    println!("[SUMMARY] Rocks placed: {}", stats.rocks);
    println!(
        "[SUMMARY] Map objects placed: {} of {} candidates",
        stats.objects, stats.object_candidates
    );
    println!(
        "[SUMMARY] Navigation: {} walkable, {} blocked ({} scans)",
        collaborators.navigation.walkable, collaborators.navigation.blocked, collaborators.navigation.scans
    );
}
