//! Elevation shaping
//!
//! Turns the continental mask and the raw tectonic signal into banded relative
//! elevation in [-1, 1]: deep ocean basins, continental shelves, and land that
//! rises toward the interior with extra height where the raw signal was
//! already strongly positive.

use serde::{Deserialize, Serialize};

use crate::tilemap::Tilemap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapingParams {
    /// Mask below which a cell is deep ocean.
    pub deep_ocean_mask: f64,
    /// Mask below which a cell is continental shelf (and above which it is land).
    pub land_mask: f64,
    /// Elevation of the deepest basin.
    pub ocean_floor: f64,
    /// Elevation where deep ocean meets the shelf.
    pub shelf_floor: f64,
    /// Elevation at the coast, where the shelf meets land.
    pub coast: f64,
    /// Land elevation at the coast before mountain boost.
    pub land_base: f64,
    /// Land elevation at full mask before mountain boost.
    pub land_top: f64,
    /// Offset added to the raw signal before the mountain boost.
    pub mountain_offset: f64,
    /// Gain of the mountain boost.
    pub mountain_gain: f64,
    /// Cap on the mountain boost.
    pub mountain_max: f64,
}

impl Default for ShapingParams {
    fn default() -> Self {
        Self {
            deep_ocean_mask: 0.2,
            land_mask: 0.35,
            ocean_floor: -1.0,
            shelf_floor: -0.4,
            coast: 0.0,
            land_base: -0.1,
            land_top: 1.0,
            mountain_offset: 0.3,
            mountain_gain: 0.8,
            mountain_max: 0.8,
        }
    }
}

/// Shape one cell from its mask and raw elevation.
pub fn shape_cell(mask: f64, raw: f64, params: &ShapingParams) -> f64 {
    let h = raw.clamp(-1.0, 1.0);

    let shaped = if mask < params.deep_ocean_mask {
        let t = mask / params.deep_ocean_mask;
        lerp(params.ocean_floor, params.shelf_floor, t)
    } else if mask < params.land_mask {
        let t = (mask - params.deep_ocean_mask) / (params.land_mask - params.deep_ocean_mask);
        lerp(params.shelf_floor, params.coast, t)
    } else {
        let t = (mask - params.land_mask) / (1.0 - params.land_mask);
        let base_land = lerp(params.land_base, params.land_top, t);
        let mountain_boost =
            ((h + params.mountain_offset) * params.mountain_gain).clamp(0.0, params.mountain_max);
        base_land + mountain_boost
    };

    shaped.clamp(-1.0, 1.0)
}

/// Produce the shaped elevation field in [-1, 1].
pub fn shape_elevation(
    mask: &Tilemap<f32>,
    base_elevation: &Tilemap<f32>,
    params: &ShapingParams,
) -> Tilemap<f32> {
    Tilemap::from_fn_par(mask.width, mask.height, |x, y| {
        shape_cell(*mask.get(x, y) as f64, *base_elevation.get(x, y) as f64, params) as f32
    })
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
