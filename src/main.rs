use std::path::PathBuf;
use std::process;

use clap::Parser;
use rand::Rng;

use coarse_world::config::GeneratorConfig;
use coarse_world::erosion::ErosionPreset;
use coarse_world::export;
use coarse_world::map_export::{self, PreviewMode};
use coarse_world::world::GridStats;

#[derive(Parser, Debug)]
#[command(name = "coarse_world")]
#[command(about = "Generate a deterministic 2048x1024 planetary terrain grid")]
struct Args {
    /// Seed string (a time-based seed is generated if not specified)
    #[arg(short, long)]
    seed: Option<String>,

    /// Output directory for the binary fields
    #[arg(short, long, default_value = "data")]
    output: PathBuf,

    /// JSON configuration file; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Erosion preset, overrides the config file's erosion section
    /// (none, gentle, normal, strong)
    #[arg(short, long)]
    erosion: Option<ErosionPreset>,

    /// Also save a PNG preview (composite, biome or height mode, see --preview-mode)
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Preview mode
    #[arg(long, default_value = "composite")]
    preview_mode: PreviewMode,

    /// Write grid statistics as JSON
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

/// Base36 digits of `n`, most significant first.
fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// `<base36 unix millis>_<6 random base36 chars>`
fn random_seed() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| {
            let d = rng.gen_range(0..36u32);
            char::from_digit(d, 36).unwrap_or('0')
        })
        .collect();
    format!("{}_{}", to_base36(millis), suffix)
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {}", message);
    process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path).unwrap_or_else(|e| fail(e)),
        None => GeneratorConfig::default(),
    };
    if let Some(preset) = args.erosion {
        println!("Erosion preset: {} ({})", preset, preset.description());
        config = config.with_erosion_preset(preset);
    }
    if let Err(e) = config.validate() {
        fail(e);
    }

    if args.dump_config {
        match config.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        }
        return;
    }

    let seed = args.seed.clone().unwrap_or_else(random_seed);
    println!("Generating world with seed: {}", seed);

    let grid = coarse_world::generate_with_config(&seed, &config);
    let stats = GridStats::from_grid(&grid);

    println!("Grid: {}x{} cells", grid.width, grid.height);
    println!("Elevation range: {:.3} to {:.3}", stats.min_elevation, stats.max_elevation);
    println!("Land: {:.1}%", stats.land_fraction * 100.0);
    println!("River cells: {}", stats.river_cells);
    println!("Biomes:");
    for (biome, count) in stats.biome_ranking() {
        println!(
            "  {:<26} {:>8} ({:.1}%)",
            biome.display_name(),
            count,
            count as f64 * 100.0 / grid.cell_count() as f64
        );
    }

    match export::export_world(&grid, &args.output) {
        Ok(summary) => println!(
            "Exported {} files ({:.1} MiB) to {}",
            summary.files.len(),
            summary.bytes_written as f64 / (1024.0 * 1024.0),
            args.output.display()
        ),
        Err(e) => fail(e),
    }

    if let Some(path) = &args.preview {
        if let Err(e) = map_export::save_preview(&grid, args.preview_mode, path) {
            fail(e);
        }
    }

    if let Some(path) = &args.stats {
        let json = serde_json::to_string_pretty(&stats).unwrap_or_else(|e| fail(e));
        if let Err(e) = std::fs::write(path, json) {
            fail(format!("{}: {}", path.display(), e));
        }
        println!("Saved statistics to {}", path.display());
    }
}
