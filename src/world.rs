//! World data containers
//!
//! [`CoarseGrid`] is what the generator produces. The region, local and
//! simulation grids describe the finer levels of the world hierarchy that
//! downstream tools build from the coarse grid; this crate only declares
//! their shape.

use serde::Serialize;

use crate::biomes::{Biome, SHALLOW_SEA_LEVEL};
use crate::tilemap::Tilemap;

/// Width of the coarse planetary grid in cells.
pub const COARSE_WIDTH: usize = 2048;
/// Height of the coarse planetary grid in cells.
pub const COARSE_HEIGHT: usize = 1024;

/// Region cells per coarse cell along each axis.
pub const REGION_SUBDIVISION: usize = 8;
/// Local cells per region cell along each axis.
pub const LOCAL_SUBDIVISION: usize = 32;

/// All generated coarse-grid fields bundled together
#[derive(Clone, Debug, PartialEq)]
pub struct CoarseGrid {
    /// Seed string the grid was generated from
    pub seed: String,
    pub width: usize,
    pub height: usize,
    /// 0.0 (deepest ocean) to 1.0 (highest peak)
    pub elevation: Tilemap<f32>,
    /// 0.0 to 1.0
    pub temperature: Tilemap<f32>,
    /// 0.0 to 1.0
    pub humidity: Tilemap<f32>,
    /// 0.0 to 1.0
    pub rainfall: Tilemap<f32>,
    /// East (+) / west (-), -1.0 to 1.0
    pub wind_u: Tilemap<f32>,
    /// North (+) / south (-), -1.0 to 1.0
    pub wind_v: Tilemap<f32>,
    /// Normalized flow accumulation, 0.0 to 1.0
    pub river: Tilemap<f32>,
    pub biome: Tilemap<Biome>,
}

impl CoarseGrid {
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Fields in [0, 1], with their export names.
    pub fn unit_fields(&self) -> [(&'static str, &Tilemap<f32>); 5] {
        [
            ("elevation", &self.elevation),
            ("temperature", &self.temperature),
            ("humidity", &self.humidity),
            ("rainfall", &self.rainfall),
            ("river", &self.river),
        ]
    }

    /// Fields in [-1, 1], with their export names.
    pub fn signed_fields(&self) -> [(&'static str, &Tilemap<f32>); 2] {
        [("windU", &self.wind_u), ("windV", &self.wind_v)]
    }
}

/// Summary statistics of a generated grid.
#[derive(Clone, Debug, Serialize)]
pub struct GridStats {
    pub seed: String,
    pub width: usize,
    pub height: usize,
    /// Share of cells at or above the shallow sea level.
    pub land_fraction: f64,
    /// Cells with nonzero river intensity.
    pub river_cells: usize,
    pub min_elevation: f32,
    pub max_elevation: f32,
    /// Cell count per biome, indexed by biome id.
    pub biome_counts: Vec<usize>,
}

impl GridStats {
    pub fn from_grid(grid: &CoarseGrid) -> Self {
        let cells = grid.cell_count().max(1);
        let land = grid
            .elevation
            .as_slice()
            .iter()
            .filter(|&&h| h >= SHALLOW_SEA_LEVEL)
            .count();
        let river_cells = grid.river.as_slice().iter().filter(|&&r| r > 0.0).count();
        let (min_elevation, max_elevation) = grid.elevation.min_max().unwrap_or((0.0, 0.0));

        let mut biome_counts = vec![0usize; Biome::COUNT];
        for &b in grid.biome.as_slice() {
            biome_counts[b.id() as usize] += 1;
        }

        Self {
            seed: grid.seed.clone(),
            width: grid.width,
            height: grid.height,
            land_fraction: land as f64 / cells as f64,
            river_cells,
            min_elevation,
            max_elevation,
            biome_counts,
        }
    }

    /// Biomes with at least one cell, most common first.
    pub fn biome_ranking(&self) -> Vec<(Biome, usize)> {
        let mut ranking: Vec<(Biome, usize)> = Biome::all()
            .iter()
            .zip(&self.biome_counts)
            .filter(|(_, &count)| count > 0)
            .map(|(&b, &count)| (b, count))
            .collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.id().cmp(&b.0.id())));
        ranking
    }
}

// =============================================================================
// HIERARCHY SHAPES
// =============================================================================

/// Simulation-resolution planetary state.
#[derive(Clone, Debug, Default)]
pub struct WorldSimGrid {
    pub width: usize,
    pub height: usize,
    pub elevation: Vec<f32>,
    pub temperature: Vec<f32>,
    pub pressure: Vec<f32>,
    pub humidity: Vec<f32>,
    pub wind_u: Vec<f32>,
    pub wind_v: Vec<f32>,
    pub rainfall: Vec<f32>,
    pub plate_id: Vec<u16>,
}

/// Region level: each coarse cell subdivided [`REGION_SUBDIVISION`] times per axis.
#[derive(Clone, Debug, Default)]
pub struct RegionGrid {
    pub width: usize,
    pub height: usize,
    pub biome: Vec<Biome>,
    /// Inherited from coarse humidity
    pub moisture: Vec<f32>,
    /// Inherited from coarse temperature
    pub heat: Vec<f32>,
    /// Interpolated from coarse elevation
    pub elevation: Vec<f32>,
    pub region_id: Vec<u32>,
}

impl RegionGrid {
    pub fn dimensions_for(coarse_width: usize, coarse_height: usize) -> (usize, usize) {
        (coarse_width * REGION_SUBDIVISION, coarse_height * REGION_SUBDIVISION)
    }
}

/// Local level: each region cell subdivided [`LOCAL_SUBDIVISION`] times per axis.
#[derive(Clone, Debug, Default)]
pub struct LocalGrid {
    pub width: usize,
    pub height: usize,
    /// Packed RGBA per cell
    pub color: Vec<u32>,
}

impl LocalGrid {
    pub fn dimensions_for(region_width: usize, region_height: usize) -> (usize, usize) {
        (region_width * LOCAL_SUBDIVISION, region_height * LOCAL_SUBDIVISION)
    }
}

/// Surface heat balance state.
#[derive(Clone, Debug, Default)]
pub struct ClimateState {
    pub surface: Vec<f32>,
    /// Cloud cover fraction, used for cooling
    pub cloud_cover: Vec<f32>,
    /// Incoming solar radiation by latitude / day
    pub solar_insolation: Vec<f32>,
    /// Heat flux from the mantle (tectonic influence)
    pub heat_flux: Vec<f32>,
}

/// The full world hierarchy.
#[derive(Clone, Debug, Default)]
pub struct World {
    pub sim: WorldSimGrid,
    pub region: RegionGrid,
    pub local: LocalGrid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_grid() -> CoarseGrid {
        let elevation = Tilemap::from_vec(2, 2, vec![0.1f32, 0.4, 0.9, 0.38]).unwrap();
        let river = Tilemap::from_vec(2, 2, vec![0.0f32, 0.6, 0.0, 0.05]).unwrap();
        let biome = Tilemap::from_vec(
            2,
            2,
            vec![Biome::DeepOcean, Biome::Wetlands, Biome::AlpineSnow, Biome::Grassland],
        )
        .unwrap();
        let zeros = Tilemap::new_with(2, 2, 0.0f32);
        CoarseGrid {
            seed: "tiny".to_string(),
            width: 2,
            height: 2,
            elevation,
            temperature: zeros.clone(),
            humidity: zeros.clone(),
            rainfall: zeros.clone(),
            wind_u: zeros.clone(),
            wind_v: zeros,
            river,
            biome,
        }
    }

    #[test]
    fn test_stats() {
        let stats = GridStats::from_grid(&tiny_grid());
        assert_eq!(stats.land_fraction, 0.75);
        assert_eq!(stats.river_cells, 2);
        assert_eq!(stats.min_elevation, 0.1);
        assert_eq!(stats.max_elevation, 0.9);
        assert_eq!(stats.biome_counts.iter().sum::<usize>(), 4);
        assert_eq!(stats.biome_counts[14], 1);
    }

    #[test]
    fn test_biome_ranking_skips_empty() {
        let ranking = GridStats::from_grid(&tiny_grid()).biome_ranking();
        assert_eq!(ranking.len(), 4);
        assert_eq!(ranking[0], (Biome::DeepOcean, 1));
    }

    #[test]
    fn test_hierarchy_dimensions() {
        let (rw, rh) = RegionGrid::dimensions_for(COARSE_WIDTH, COARSE_HEIGHT);
        assert_eq!((rw, rh), (16384, 8192));
        assert_eq!(LocalGrid::dimensions_for(2, 1), (64, 32));
    }
}
