//! Biome classification
//!
//! A fixed decision tree over elevation, temperature, humidity and rainfall,
//! with strong rivers overriding everything on land.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::tilemap::Tilemap;

/// Elevation below which a cell is deep ocean.
pub const DEEP_SEA_LEVEL: f32 = 0.25;
/// Elevation below which a cell is shelf water; at or above it is land.
pub const SHALLOW_SEA_LEVEL: f32 = 0.38;
/// River intensity above which land becomes wetlands.
pub const WETLAND_RIVER_THRESHOLD: f32 = 0.45;

/// The 15 coarse biome classes. The discriminant is the exported id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Biome {
    #[default]
    DeepOcean = 0,
    ColdShelf = 1,
    WarmShelf = 2,
    Desert = 3,
    Scrub = 4,
    Savanna = 5,
    Grassland = 6,
    TemperateForest = 7,
    TropicalSeasonalForest = 8,
    Rainforest = 9,
    Taiga = 10,
    Tundra = 11,
    RockyMountain = 12,
    AlpineSnow = 13,
    Wetlands = 14,
}

impl Biome {
    pub const COUNT: usize = 15;

    pub fn all() -> &'static [Biome; Biome::COUNT] {
        &[
            Biome::DeepOcean,
            Biome::ColdShelf,
            Biome::WarmShelf,
            Biome::Desert,
            Biome::Scrub,
            Biome::Savanna,
            Biome::Grassland,
            Biome::TemperateForest,
            Biome::TropicalSeasonalForest,
            Biome::Rainforest,
            Biome::Taiga,
            Biome::Tundra,
            Biome::RockyMountain,
            Biome::AlpineSnow,
            Biome::Wetlands,
        ]
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Biome> {
        Biome::all().get(id as usize).copied()
    }

    pub fn is_water(self) -> bool {
        matches!(self, Biome::DeepOcean | Biome::ColdShelf | Biome::WarmShelf)
    }

    /// Get the display color for this biome
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Biome::DeepOcean => (4, 24, 68),
            Biome::ColdShelf => (20, 80, 136),
            Biome::WarmShelf => (42, 118, 170),
            Biome::Desert => (211, 130, 78),
            Biome::Scrub => (204, 167, 94),
            Biome::Savanna => (194, 180, 96),
            Biome::Grassland => (134, 168, 80),
            Biome::TemperateForest => (99, 146, 76),
            Biome::TropicalSeasonalForest => (76, 122, 69),
            Biome::Rainforest => (60, 103, 62),
            Biome::Taiga => (87, 120, 93),
            Biome::Tundra => (178, 177, 153),
            Biome::RockyMountain => (122, 116, 99),
            Biome::AlpineSnow => (233, 233, 232),
            Biome::Wetlands => (96, 160, 140),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Biome::DeepOcean => "Deep Ocean",
            Biome::ColdShelf => "Cold Shelf",
            Biome::WarmShelf => "Warm Shelf",
            Biome::Desert => "Desert",
            Biome::Scrub => "Semi-arid Scrub",
            Biome::Savanna => "Savanna",
            Biome::Grassland => "Grassland",
            Biome::TemperateForest => "Temperate Forest",
            Biome::TropicalSeasonalForest => "Tropical Seasonal Forest",
            Biome::Rainforest => "Rainforest",
            Biome::Taiga => "Taiga",
            Biome::Tundra => "Tundra",
            Biome::RockyMountain => "Rocky Mountain",
            Biome::AlpineSnow => "Alpine Snow",
            Biome::Wetlands => "River Valley / Wetlands",
        }
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Climate inputs for one cell, all in [0, 1].
#[derive(Clone, Copy, Debug)]
pub struct CellClimate {
    pub elevation: f32,
    pub temperature: f32,
    pub humidity: f32,
    pub rainfall: f32,
    pub river: f32,
}

/// Classify one cell.
pub fn classify(cell: CellClimate) -> Biome {
    let CellClimate {
        elevation: elev,
        temperature: t,
        humidity,
        rainfall,
        river,
    } = cell;

    if elev < DEEP_SEA_LEVEL {
        return Biome::DeepOcean;
    }
    if elev < SHALLOW_SEA_LEVEL {
        return if t > 0.6 { Biome::WarmShelf } else { Biome::ColdShelf };
    }

    let dryness = 1.0 - humidity;
    let land = if t < 0.18 {
        if elev > 0.8 {
            Biome::AlpineSnow
        } else {
            Biome::Tundra
        }
    } else if t < 0.35 {
        if elev > 0.8 {
            Biome::AlpineSnow
        } else if elev > 0.6 {
            Biome::RockyMountain
        } else {
            Biome::Taiga
        }
    } else if t > 0.7 {
        if dryness > 0.75 {
            Biome::Desert
        } else if dryness > 0.55 {
            Biome::Scrub
        } else if humidity > 0.8 && rainfall > 0.65 {
            Biome::Rainforest
        } else if humidity > 0.55 {
            Biome::TropicalSeasonalForest
        } else {
            Biome::Savanna
        }
    } else if dryness > 0.7 {
        Biome::Desert
    } else if dryness > 0.5 {
        Biome::Grassland
    } else if humidity > 0.7 {
        Biome::TemperateForest
    } else {
        Biome::Grassland
    };

    // Rivers win over climate zoning on all land.
    if river > WETLAND_RIVER_THRESHOLD {
        Biome::Wetlands
    } else {
        land
    }
}

/// Inputs for whole-grid classification.
pub struct BiomeInputs<'a> {
    pub elevation: &'a Tilemap<f32>,
    pub temperature: &'a Tilemap<f32>,
    pub humidity: &'a Tilemap<f32>,
    pub rainfall: &'a Tilemap<f32>,
    pub river: &'a Tilemap<f32>,
}

/// Classify every cell of the grid.
pub fn generate_biomes(inputs: &BiomeInputs<'_>) -> Tilemap<Biome> {
    let width = inputs.elevation.width;
    let height = inputs.elevation.height;
    let mut biomes = Tilemap::new(width, height);

    biomes
        .as_mut_slice()
        .par_iter_mut()
        .enumerate()
        .for_each(|(idx, out)| {
            *out = classify(CellClimate {
                elevation: inputs.elevation.as_slice()[idx],
                temperature: inputs.temperature.as_slice()[idx],
                humidity: inputs.humidity.as_slice()[idx],
                rainfall: inputs.rainfall.as_slice()[idx],
                river: inputs.river.as_slice()[idx],
            });
        });

    biomes
}
