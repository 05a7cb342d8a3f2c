//! Continental mask synthesis
//!
//! A radial falloff keeps land near the centre of the canvas; low-frequency
//! shape noise carves it into continents and a second field bends the
//! coastlines. The same shape noise, sampled at a higher frequency and
//! weighted by the mask, gives the raw elevation signal later stages refine.

use noise::NoiseFn;
use serde::{Deserialize, Serialize};

use crate::noise_fields::{sample, sample_unit};
use crate::tilemap::Tilemap;

/// Parameters for the continental mask and raw elevation signal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinentParams {
    /// Radius (in normalized [-1, 1] canvas units) at which land fades out.
    pub world_radius: f64,
    /// Exponent of the radial falloff (higher = sharper edge).
    pub falloff_exponent: f64,
    /// Frequency of the continental shape noise.
    pub shape_frequency: f64,
    /// Exponent applied to the shape noise, pushing it toward 0 or 1.
    pub shape_exponent: f64,
    /// Frequency of the coastline warp noise.
    pub warp_frequency: f64,
    /// Centre of the warp factor range.
    pub warp_base: f64,
    /// Width of the warp factor range.
    pub warp_range: f64,
    /// Frequency of the raw elevation sample.
    pub raw_frequency: f64,
    /// Offset added to the raw sample coordinates so it does not line up with the shape sample.
    pub raw_offset: (f64, f64),
}

impl Default for ContinentParams {
    fn default() -> Self {
        Self {
            world_radius: 0.8,
            falloff_exponent: 2.5,
            shape_frequency: 0.004,
            shape_exponent: 1.8,
            warp_frequency: 0.003,
            warp_base: 0.7,
            warp_range: 0.6,
            raw_frequency: 0.01,
            raw_offset: (100.0, 200.0),
        }
    }
}

/// Continental mask in [0, 1] plus the raw (unshaped) elevation signal.
pub struct ContinentLayers {
    pub mask: Tilemap<f32>,
    pub base_elevation: Tilemap<f32>,
}

/// Landness of one cell.
pub fn mask_at(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    continental: &impl NoiseFn<f64, 2>,
    warp: &impl NoiseFn<f64, 2>,
    params: &ContinentParams,
) -> f64 {
    let nx = normalized_axis(x, width);
    let ny = normalized_axis(y, height);

    let r_norm = (nx * nx + ny * ny).sqrt() / params.world_radius;
    let radial = (1.0 - r_norm.powf(params.falloff_exponent)).clamp(0.0, 1.0);

    let fx = x as f64;
    let fy = y as f64;
    let shape = sample_unit(continental, fx * params.shape_frequency, fy * params.shape_frequency)
        .powf(params.shape_exponent);

    let w = sample_unit(warp, fx * params.warp_frequency, fy * params.warp_frequency);
    let warp_factor = params.warp_base + params.warp_range * (w - 0.5);

    (radial * shape * warp_factor).clamp(0.0, 1.0)
}

/// Build the continental mask and raw elevation for a `width x height` grid.
pub fn build_continents(
    width: usize,
    height: usize,
    continental: &(impl NoiseFn<f64, 2> + Sync),
    warp: &(impl NoiseFn<f64, 2> + Sync),
    params: &ContinentParams,
) -> ContinentLayers {
    let mask = Tilemap::from_fn_par(width, height, |x, y| {
        mask_at(x, y, width, height, continental, warp, params) as f32
    });

    let (ox, oy) = params.raw_offset;
    let base_elevation = Tilemap::from_fn_par(width, height, |x, y| {
        let n = sample(
            continental,
            x as f64 * params.raw_frequency + ox,
            y as f64 * params.raw_frequency + oy,
        );
        (n * *mask.get(x, y) as f64) as f32
    });

    ContinentLayers { mask, base_elevation }
}

/// Map a cell coordinate onto [-1, 1]. A one-cell axis maps to the centre.
fn normalized_axis(v: usize, len: usize) -> f64 {
    if len <= 1 {
        return 0.0;
    }
    (v as f64 / (len - 1) as f64) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use noise::Constant;

    #[test]
    fn test_mask_peaks_at_centre_and_vanishes_at_corners() {
        // Shape noise at +1 gives shape == 1; warp at 0 gives warp factor 0.7.
        let shape = Constant::new(1.0);
        let warp = Constant::new(0.0);
        let params = ContinentParams::default();
        let layers = build_continents(65, 33, &shape, &warp, &params);

        let centre = *layers.mask.get(32, 16);
        assert!((centre - 0.7).abs() < 1e-6, "centre mask {}", centre);
        assert_eq!(*layers.mask.get(0, 0), 0.0);
        assert_eq!(*layers.mask.get(64, 32), 0.0);
    }

    #[test]
    fn test_mask_in_unit_range() {
        let shape = Constant::new(1.0);
        let warp = Constant::new(1.0);
        let layers = build_continents(40, 20, &shape, &warp, &ContinentParams::default());
        for (_, _, &m) in layers.mask.iter() {
            assert!((0.0..=1.0).contains(&m));
        }
    }

    #[test]
    fn test_base_elevation_scaled_by_mask() {
        let shape = Constant::new(0.5);
        let warp = Constant::new(0.0);
        let layers = build_continents(31, 31, &shape, &warp, &ContinentParams::default());
        for (x, y, &m) in layers.mask.iter() {
            let raw = *layers.base_elevation.get(x, y);
            assert!((raw - 0.5 * m).abs() < 1e-6);
        }
        // Outside the radial falloff there is no signal at all.
        assert_eq!(*layers.base_elevation.get(0, 0), 0.0);
    }

    #[test]
    fn test_normalized_axis_endpoints() {
        assert_eq!(normalized_axis(0, 2048), -1.0);
        assert_eq!(normalized_axis(2047, 2048), 1.0);
        assert_eq!(normalized_axis(0, 1), 0.0);
    }
}
