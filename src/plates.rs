//! Synthetic plate tectonics
//!
//! There is no plate motion here. A very low-frequency noise field stands in
//! for the plate layout: its zero-crossings are the plate seams. Cells close
//! to a seam are lifted into ridges on the positive side and dropped into
//! rifts on the negative side, weighted by how continental the cell is.

use noise::NoiseFn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::noise_fields::sample;
use crate::tilemap::Tilemap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TectonicParams {
    /// Frequency of the plate noise (very low: few, large plates).
    pub frequency: f64,
    /// How quickly boundary influence falls off away from a seam.
    pub boundary_sharpness: f64,
    /// Uplift factor on the positive side of a seam.
    pub ridge_uplift: f64,
    /// Depression factor on the negative side of a seam.
    pub rift_depression: f64,
}

impl Default for TectonicParams {
    fn default() -> Self {
        Self {
            frequency: 0.0015,
            boundary_sharpness: 6.0,
            ridge_uplift: 0.7,
            rift_depression: -0.5,
        }
    }
}

/// Boundary proximity in [0, 1] for a plate noise value `p`.
pub fn boundary_strength(p: f64, params: &TectonicParams) -> f64 {
    (1.0 - p.abs() * params.boundary_sharpness).clamp(0.0, 1.0)
}

/// Elevation change contributed by the plate seam at one cell.
pub fn plate_delta(p: f64, mask: f64, params: &TectonicParams) -> f64 {
    if mask <= 0.0 {
        return 0.0;
    }
    let boundary = boundary_strength(p, params);
    if boundary <= 0.0 {
        return 0.0;
    }
    let factor = if p >= 0.0 {
        params.ridge_uplift
    } else {
        params.rift_depression
    };
    boundary * mask * factor
}

/// Add ridge/rift perturbations to `base_elevation` in place.
///
/// Deep ocean (mask <= 0) is left untouched.
pub fn apply_plate_boundaries(
    base_elevation: &mut Tilemap<f32>,
    mask: &Tilemap<f32>,
    plate: &(impl NoiseFn<f64, 2> + Sync),
    params: &TectonicParams,
) {
    let width = base_elevation.width;
    if width == 0 {
        return;
    }
    let mask_rows = mask.as_slice().par_chunks(width);
    base_elevation
        .as_mut_slice()
        .par_chunks_mut(width)
        .zip(mask_rows)
        .enumerate()
        .for_each(|(y, (row, mask_row))| {
            for (x, (h, &m)) in row.iter_mut().zip(mask_row).enumerate() {
                if m <= 0.0 {
                    continue;
                }
                let p = sample(plate, x as f64 * params.frequency, y as f64 * params.frequency);
                let delta = plate_delta(p, m as f64, params);
                if delta != 0.0 {
                    *h = (*h as f64 + delta) as f32;
                }
            }
        });
}
