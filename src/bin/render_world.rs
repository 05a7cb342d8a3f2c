//! Render PNG previews from an exported world directory.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use coarse_world::export;
use coarse_world::map_export::{self, PreviewMode};

#[derive(Parser, Debug)]
#[command(name = "render_world")]
#[command(about = "Render a preview image from exported coarse-world fields")]
struct Args {
    /// Directory written by coarse_world
    #[arg(default_value = "data")]
    data: PathBuf,

    /// Output image path
    #[arg(short, long, default_value = "world.png")]
    output: PathBuf,

    /// Preview mode (composite, biome, height)
    #[arg(short, long, default_value = "composite")]
    mode: PreviewMode,

    /// Render every mode, suffixing the output name with the mode
    #[arg(long)]
    all: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!("Loading {}...", args.data.display());
    let grid = match export::load_world(&args.data) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("error: failed to load world data: {}", e);
            process::exit(1);
        }
    };
    if grid.seed.is_empty() {
        println!("Loaded {}x{} grid (no seed recorded)", grid.width, grid.height);
    } else {
        println!("Loaded {}x{} grid, seed {}", grid.width, grid.height, grid.seed);
    }

    let targets: Vec<(PreviewMode, PathBuf)> = if args.all {
        PreviewMode::all()
            .iter()
            .map(|&mode| (mode, with_mode_suffix(&args.output, mode)))
            .collect()
    } else {
        vec![(args.mode, args.output.clone())]
    };

    for (mode, path) in targets {
        println!("Rendering {} ({})...", mode, mode.description());
        if let Err(e) = map_export::save_preview(&grid, mode, &path) {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

/// `world.png` -> `world_height.png`
fn with_mode_suffix(path: &std::path::Path, mode: PreviewMode) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("world");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("png");
    path.with_file_name(format!("{}_{}.{}", stem, mode, ext))
}
