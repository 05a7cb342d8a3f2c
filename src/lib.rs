//! Coarse planetary terrain generation
//!
//! A seed string deterministically produces a 2048x1024 grid of elevation,
//! climate, river and biome fields. See [`generate`].

pub mod beautify;
pub mod biomes;
pub mod climate;
pub mod config;
pub mod continent;
pub mod erosion;
pub mod export;
pub mod generator;
pub mod heightmap;
pub mod map_export;
pub mod noise_fields;
pub mod plates;
pub mod seeds;
pub mod tilemap;
pub mod world;

pub use biomes::Biome;
pub use config::GeneratorConfig;
pub use generator::{generate, generate_with_config, generate_with_provider};
pub use world::CoarseGrid;
