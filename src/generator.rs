//! Coarse-grid generation pipeline
//!
//! Runs the stages strictly in order, each consuming the previous stage's
//! committed output:
//! 1. Continental mask and raw elevation
//! 2. Plate seam ridges and rifts
//! 3. Banded elevation shaping
//! 4. Erosion smoothing
//! 5. Domain-warp beautification, remapped to [0, 1]
//! 6. Flow routing and river intensity
//! 7. Climate fields and biome classification
//!
//! All intermediate buffers live only for the duration of one call.

use std::time::Instant;

use noise::NoiseFn;

use crate::beautify::{self, BeautifyNoise};
use crate::biomes::{self, BiomeInputs};
use crate::climate::{self, ClimateNoise};
use crate::config::GeneratorConfig;
use crate::continent;
use crate::erosion::{self, rivers};
use crate::heightmap;
use crate::noise_fields::{NoiseProvider, SimplexProvider, StageNoise};
use crate::plates;
use crate::seeds::WorldSeeds;
use crate::world::{CoarseGrid, COARSE_HEIGHT, COARSE_WIDTH};

/// Generate the coarse grid for `seed` with the default configuration.
pub fn generate(seed: &str) -> CoarseGrid {
    generate_with_config(seed, &GeneratorConfig::default())
}

/// Generate the coarse grid for `seed` with a custom configuration.
pub fn generate_with_config(seed: &str, config: &GeneratorConfig) -> CoarseGrid {
    generate_with_provider(seed, &SimplexProvider, config)
}

/// Generate the coarse grid drawing noise from `provider`.
pub fn generate_with_provider<P: NoiseProvider>(
    seed: &str,
    provider: &P,
    config: &GeneratorConfig,
) -> CoarseGrid {
    run_pipeline(COARSE_WIDTH, COARSE_HEIGHT, seed, provider, config)
}

pub(crate) fn run_pipeline<P: NoiseProvider>(
    width: usize,
    height: usize,
    seed: &str,
    provider: &P,
    config: &GeneratorConfig,
) -> CoarseGrid {
    let started = Instant::now();
    let seeds = WorldSeeds::from_master(seed);
    let noise = StageNoise::from_provider(provider, &seeds);
    log::info!("Generating {}x{} coarse grid for seed {:?}", width, height, seed);

    let elevation = build_elevation(width, height, &noise, config);

    let stage = Instant::now();
    let flow = rivers::route_flow(&elevation, &config.hydrology);
    let river = rivers::river_intensity(&flow, &config.hydrology);
    log::info!(
        "Hydrology: max accumulation {} ({:.2?})",
        flow.max_accumulation(),
        stage.elapsed()
    );
    drop(flow);

    let stage = Instant::now();
    let climate_noise = ClimateNoise {
        temperature: &noise.temperature,
        humidity: &noise.humidity,
        wind_u: &noise.wind_u,
        wind_v: &noise.wind_v,
    };
    let climate = climate::generate_climate(&elevation, &climate_noise, &config.climate);
    let biome = biomes::generate_biomes(&BiomeInputs {
        elevation: &elevation,
        temperature: &climate.temperature,
        humidity: &climate.humidity,
        rainfall: &climate.rainfall,
        river: &river,
    });
    log::info!("Climate and biomes ({:.2?})", stage.elapsed());

    log::info!("Coarse grid complete in {:.2?}", started.elapsed());

    CoarseGrid {
        seed: seed.to_string(),
        width,
        height,
        elevation,
        temperature: climate.temperature,
        humidity: climate.humidity,
        rainfall: climate.rainfall,
        wind_u: climate.wind_u,
        wind_v: climate.wind_v,
        river,
        biome,
    }
}

/// Stages 1-5: from noise to the public [0, 1] elevation.
fn build_elevation<N: NoiseFn<f64, 2> + Sync>(
    width: usize,
    height: usize,
    noise: &StageNoise<N>,
    config: &GeneratorConfig,
) -> crate::tilemap::Tilemap<f32> {
    let stage = Instant::now();
    let continent::ContinentLayers {
        mask,
        mut base_elevation,
    } = continent::build_continents(width, height, &noise.continental, &noise.warp, &config.continent);
    plates::apply_plate_boundaries(&mut base_elevation, &mask, &noise.plate, &config.tectonics);
    base_elevation.clamp_all(-1.0, 1.0);
    log::info!("Continents and plate seams ({:.2?})", stage.elapsed());

    let stage = Instant::now();
    let shaped = heightmap::shape_elevation(&mask, &base_elevation, &config.shaping);
    drop(base_elevation);
    drop(mask);
    log::info!("Elevation shaping ({:.2?})", stage.elapsed());

    let stage = Instant::now();
    // The pre-erosion copy exists only for debug statistics.
    let before = log::log_enabled!(log::Level::Debug).then(|| shaped.clone());
    let eroded = erosion::simulate_erosion(shaped, &config.erosion);
    log::info!("Erosion: {} passes ({:.2?})", config.erosion.iterations, stage.elapsed());
    if let Some(before) = before {
        let stats = erosion::erosion_stats(&before, &eroded, config.erosion.iterations);
        log::debug!(
            "Erosion: eroded {:.1}, deposited {:.1}, max erosion {:.3}, max deposition {:.3}",
            stats.total_eroded,
            stats.total_deposited,
            stats.max_erosion,
            stats.max_deposition
        );
    }

    let stage = Instant::now();
    let beautify_noise = BeautifyNoise {
        warp_x: &noise.beauty_warp_1,
        warp_y: &noise.beauty_warp_2,
        detail_1: &noise.detail_1,
        detail_2: &noise.detail_2,
    };
    let beautified = beautify::beautify(&eroded, &beautify_noise, &config.beautify);
    let elevation = beautify::to_unit_elevation(&beautified);
    log::info!("Beautify ({:.2?})", stage.elapsed());

    elevation
}
