//! PNG previews of a coarse grid
//!
//! Three modes:
//! - composite: the biome view with a river overlay on land
//! - biome: depth-banded ocean, beach fringe and biome land colors
//! - height: grayscale elevation with the coast stretched apart

use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::biomes::{Biome, SHALLOW_SEA_LEVEL};
use crate::export::ExportError;
use crate::world::CoarseGrid;

/// Ocean color bands over elevation normalized by the shallow sea level.
const OCEAN_BANDS: [(f32, (u8, u8, u8)); 5] = [
    (0.25, (4, 24, 68)),
    (0.5, (6, 44, 104)),
    (0.75, (20, 80, 136)),
    (0.9, (42, 118, 170)),
    (1.0, (125, 202, 230)),
];

const BEACH_BAND: f32 = 0.012;
const BEACH: (u8, u8, u8) = (218, 204, 140);
const MOUNTAIN_PEAK: (u8, u8, u8) = (181, 178, 170);
const PLAINS: (u8, u8, u8) = (196, 177, 96);

/// River intensity below which no overlay is drawn.
const RIVER_MIN: f32 = 0.15;
/// Intensity span over which the overlay reaches full strength.
const RIVER_SPAN: f32 = 0.5;
const RIVER_COLOR: (u8, u8, u8) = (125, 198, 240);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PreviewMode {
    #[default]
    Composite,
    Biome,
    Height,
}

impl PreviewMode {
    pub fn all() -> &'static [PreviewMode] {
        &[PreviewMode::Composite, PreviewMode::Biome, PreviewMode::Height]
    }

    pub fn description(&self) -> &'static str {
        match self {
            PreviewMode::Composite => "Terrain colors with ocean depth bands and rivers",
            PreviewMode::Biome => "Terrain colors with ocean depth bands",
            PreviewMode::Height => "Grayscale elevation",
        }
    }
}

impl std::fmt::Display for PreviewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreviewMode::Composite => write!(f, "composite"),
            PreviewMode::Biome => write!(f, "biome"),
            PreviewMode::Height => write!(f, "height"),
        }
    }
}

impl std::str::FromStr for PreviewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "composite" => Ok(PreviewMode::Composite),
            "biome" | "biomes" => Ok(PreviewMode::Biome),
            "height" | "elevation" => Ok(PreviewMode::Height),
            _ => Err(format!("Unknown preview mode: {}. Use composite, biome, or height", s)),
        }
    }
}

fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

fn lerp_color(a: (u8, u8, u8), b: (u8, u8, u8), t: f32) -> (u8, u8, u8) {
    (lerp_channel(a.0, b.0, t), lerp_channel(a.1, b.1, t), lerp_channel(a.2, b.2, t))
}

fn ocean_band(t: f32) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    OCEAN_BANDS
        .iter()
        .find(|(limit, _)| t <= *limit)
        .map(|&(_, color)| color)
        .unwrap_or(OCEAN_BANDS[OCEAN_BANDS.len() - 1].1)
}

/// Terrain color of one cell, before the river overlay.
pub fn terrain_color(biome: Biome, elevation: f32) -> (u8, u8, u8) {
    let e = elevation.clamp(0.0, 1.0);
    if e < SHALLOW_SEA_LEVEL {
        return ocean_band(e / SHALLOW_SEA_LEVEL);
    }
    if e < SHALLOW_SEA_LEVEL + BEACH_BAND {
        return BEACH;
    }
    match biome {
        Biome::RockyMountain => {
            let t = ((e - 0.62) / 0.25).clamp(0.0, 1.0);
            lerp_color(Biome::RockyMountain.color(), MOUNTAIN_PEAK, t)
        }
        // A water id above sea level has no land color of its own.
        b if b.is_water() => PLAINS,
        b => b.color(),
    }
}

/// Blend the river color over `base` for land cells with enough flow.
pub fn river_overlay(base: (u8, u8, u8), elevation: f32, river: f32) -> (u8, u8, u8) {
    if river <= RIVER_MIN || elevation < SHALLOW_SEA_LEVEL {
        return base;
    }
    let intensity = ((river - RIVER_MIN) / RIVER_SPAN).clamp(0.0, 1.0);
    let alpha = 0.25 + intensity * 0.45;
    lerp_color(base, RIVER_COLOR, alpha)
}

/// Gray level for an elevation: ocean compressed into the dark end, land
/// stretched over the rest.
pub fn height_gray(elevation: f32) -> u8 {
    let v = elevation.clamp(0.0, 1.0);
    let t = if v < SHALLOW_SEA_LEVEL {
        v * 0.8
    } else {
        0.2 + (v - SHALLOW_SEA_LEVEL) / (1.0 - SHALLOW_SEA_LEVEL) * 0.8
    };
    (t.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn render_with<F>(grid: &CoarseGrid, color: F) -> RgbImage
where
    F: Fn(usize, usize) -> (u8, u8, u8),
{
    let mut img = ImageBuffer::new(grid.width as u32, grid.height as u32);
    for y in 0..grid.height {
        for x in 0..grid.width {
            let (r, g, b) = color(x, y);
            img.put_pixel(x as u32, y as u32, Rgb([r, g, b]));
        }
    }
    img
}

pub fn render_composite(grid: &CoarseGrid) -> RgbImage {
    render_with(grid, |x, y| {
        let e = *grid.elevation.get(x, y);
        let base = terrain_color(*grid.biome.get(x, y), e);
        river_overlay(base, e, *grid.river.get(x, y))
    })
}

pub fn render_biomes(grid: &CoarseGrid) -> RgbImage {
    render_with(grid, |x, y| terrain_color(*grid.biome.get(x, y), *grid.elevation.get(x, y)))
}

pub fn render_height(grid: &CoarseGrid) -> RgbImage {
    render_with(grid, |x, y| {
        let g = height_gray(*grid.elevation.get(x, y));
        (g, g, g)
    })
}

pub fn render(grid: &CoarseGrid, mode: PreviewMode) -> RgbImage {
    match mode {
        PreviewMode::Composite => render_composite(grid),
        PreviewMode::Biome => render_biomes(grid),
        PreviewMode::Height => render_height(grid),
    }
}

/// Render `grid` in `mode` and save it; the format follows the file extension.
pub fn save_preview<P: AsRef<Path>>(grid: &CoarseGrid, mode: PreviewMode, path: P) -> Result<(), ExportError> {
    let path = path.as_ref();
    render(grid, mode).save(path)?;
    log::info!("Saved {} preview to {}", mode, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::Tilemap;

    #[test]
    fn test_ocean_bands() {
        assert_eq!(terrain_color(Biome::DeepOcean, 0.0), (4, 24, 68));
        assert_eq!(terrain_color(Biome::DeepOcean, 0.15), (6, 44, 104));
        assert_eq!(terrain_color(Biome::WarmShelf, 0.37), (125, 202, 230));
    }

    #[test]
    fn test_beach_fringe_overrides_biome() {
        assert_eq!(terrain_color(Biome::Desert, 0.385), BEACH);
        assert_eq!(terrain_color(Biome::Desert, 0.4), Biome::Desert.color());
    }

    #[test]
    fn test_water_id_on_land_drawn_as_plains() {
        assert_eq!(terrain_color(Biome::ColdShelf, 0.5), PLAINS);
        assert_eq!(terrain_color(Biome::DeepOcean, 0.9), PLAINS);
    }

    #[test]
    fn test_mountain_gradient() {
        assert_eq!(terrain_color(Biome::RockyMountain, 0.6), (122, 116, 99));
        assert_eq!(terrain_color(Biome::RockyMountain, 0.95), MOUNTAIN_PEAK);
    }

    #[test]
    fn test_river_overlay() {
        let base = (105, 100, 100);
        assert_eq!(river_overlay(base, 0.5, 0.15), base);
        assert_eq!(river_overlay(base, 0.3, 0.9), base);
        // Full intensity: alpha 0.7.
        assert_eq!(river_overlay(base, 0.5, 0.9), (119, 169, 198));
    }

    #[test]
    fn test_height_gray() {
        assert_eq!(height_gray(0.0), 0);
        assert_eq!(height_gray(SHALLOW_SEA_LEVEL), 51);
        assert_eq!(height_gray(1.0), 255);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Biome".parse::<PreviewMode>().unwrap(), PreviewMode::Biome);
        assert_eq!("elevation".parse::<PreviewMode>().unwrap(), PreviewMode::Height);
        assert!("relief".parse::<PreviewMode>().is_err());
        for mode in PreviewMode::all() {
            assert_eq!(mode.to_string().parse::<PreviewMode>().unwrap(), *mode);
        }
    }

    #[test]
    fn test_render_dimensions() {
        let zeros = Tilemap::new_with(3, 2, 0.0f32);
        let grid = CoarseGrid {
            seed: String::new(),
            width: 3,
            height: 2,
            elevation: Tilemap::from_vec(3, 2, vec![0.0, 0.2, 0.5, 0.7, 0.9, 1.0]).unwrap(),
            temperature: zeros.clone(),
            humidity: zeros.clone(),
            rainfall: zeros.clone(),
            wind_u: zeros.clone(),
            wind_v: zeros.clone(),
            river: zeros,
            biome: Tilemap::new_with(3, 2, Biome::Grassland),
        };
        for &mode in PreviewMode::all() {
            let img = render(&grid, mode);
            assert_eq!(img.dimensions(), (3, 2));
        }
        assert_eq!(render_height(&grid).get_pixel(2, 1), &Rgb([255, 255, 255]));
        assert_eq!(render_composite(&grid).get_pixel(0, 0), &Rgb([4, 24, 68]));
    }

    #[test]
    fn test_biome_view_keeps_ocean_bands_and_skips_rivers() {
        let zeros = Tilemap::new_with(3, 1, 0.0f32);
        let grid = CoarseGrid {
            seed: String::new(),
            width: 3,
            height: 1,
            elevation: Tilemap::from_vec(3, 1, vec![0.0, 0.385, 0.5]).unwrap(),
            temperature: zeros.clone(),
            humidity: zeros.clone(),
            rainfall: zeros.clone(),
            wind_u: zeros.clone(),
            wind_v: zeros,
            river: Tilemap::new_with(3, 1, 1.0f32),
            biome: Tilemap::new_with(3, 1, Biome::Grassland),
        };
        let img = render_biomes(&grid);
        assert_eq!(img.get_pixel(0, 0), &Rgb([4, 24, 68]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([218, 204, 140]));
        let (r, g, b) = Biome::Grassland.color();
        assert_eq!(img.get_pixel(2, 0), &Rgb([r, g, b]));
        // The composite view draws the river over the same land cell.
        assert_ne!(render_composite(&grid).get_pixel(2, 0), img.get_pixel(2, 0));
    }
}
