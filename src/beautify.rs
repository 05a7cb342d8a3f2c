//! Final elevation polish: a small domain warp plus two detail octaves,
//! then the remap from relative [-1, 1] height to the public [0, 1] scale.

use noise::NoiseFn;
use serde::{Deserialize, Serialize};

use crate::noise_fields::sample;
use crate::tilemap::Tilemap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeautifyParams {
    pub warp_frequency: f64,
    /// Maximum displacement of the warped sample, in cells.
    pub warp_amplitude: f64,
    pub detail_1_frequency: f64,
    pub detail_1_weight: f64,
    pub detail_2_frequency: f64,
    pub detail_2_weight: f64,
}

impl Default for BeautifyParams {
    fn default() -> Self {
        Self {
            warp_frequency: 0.01,
            warp_amplitude: 8.0,
            detail_1_frequency: 0.03,
            detail_1_weight: 0.08,
            detail_2_frequency: 0.06,
            detail_2_weight: 0.04,
        }
    }
}

pub struct BeautifyNoise<'a, N> {
    pub warp_x: &'a N,
    pub warp_y: &'a N,
    pub detail_1: &'a N,
    pub detail_2: &'a N,
}

/// Round a warped coordinate and clamp it onto the grid axis.
fn warped_axis(v: f64, len: usize) -> usize {
    let max = len.saturating_sub(1) as f64;
    v.round().clamp(0.0, max) as usize
}

/// Warp and detail the eroded field. Output stays in [-1, 1].
pub fn beautify<N: NoiseFn<f64, 2> + Sync>(
    eroded: &Tilemap<f32>,
    noise: &BeautifyNoise<'_, N>,
    params: &BeautifyParams,
) -> Tilemap<f32> {
    let width = eroded.width;
    let height = eroded.height;
    let wf = params.warp_frequency;
    let (f1, f2) = (params.detail_1_frequency, params.detail_2_frequency);

    Tilemap::from_fn_par(width, height, |x, y| {
        let fx = x as f64;
        let fy = y as f64;

        let w1 = sample(noise.warp_x, fx * wf, fy * wf);
        let w2 = sample(noise.warp_y, fx * wf, fy * wf);
        let sx = warped_axis(fx + w1 * params.warp_amplitude, width);
        let sy = warped_axis(fy + w2 * params.warp_amplitude, height);

        let h = *eroded.get(sx, sy) as f64;
        let detail = sample(noise.detail_1, fx * f1, fy * f1) * params.detail_1_weight
            + sample(noise.detail_2, fx * f2, fy * f2) * params.detail_2_weight;

        (h + detail).clamp(-1.0, 1.0) as f32
    })
}

/// Remap relative height in [-1, 1] to the public [0, 1] elevation.
pub fn to_unit_elevation(beautified: &Tilemap<f32>) -> Tilemap<f32> {
    Tilemap::from_fn_par(beautified.width, beautified.height, |x, y| {
        ((*beautified.get(x, y) + 1.0) * 0.5).clamp(0.0, 1.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use noise::Constant;

    #[test]
    fn test_warp_shifts_and_clamps_at_border() {
        // Warp +1 moves every sample 8 cells right/down, clamped to the last column/row.
        let eroded = Tilemap::from_fn_par(20, 12, |x, y| (x + y * 20) as f32 / 240.0);
        let shift = Constant::new(1.0);
        let zero = Constant::new(0.0);
        let noise = BeautifyNoise {
            warp_x: &shift,
            warp_y: &zero,
            detail_1: &zero,
            detail_2: &zero,
        };
        let out = beautify(&eroded, &noise, &BeautifyParams::default());

        assert_eq!(*out.get(0, 3), *eroded.get(8, 3));
        assert_eq!(*out.get(15, 5), *eroded.get(19, 5));
    }

    #[test]
    fn test_detail_added_and_clamped() {
        let eroded = Tilemap::new_with(4, 4, 0.95f32);
        let zero = Constant::new(0.0);
        let one = Constant::new(1.0);
        let noise = BeautifyNoise {
            warp_x: &zero,
            warp_y: &zero,
            detail_1: &one,
            detail_2: &one,
        };
        let out = beautify(&eroded, &noise, &BeautifyParams::default());
        // 0.95 + 0.12 clamps to 1.
        assert!(out.as_slice().iter().all(|&h| h == 1.0));

        let low = Tilemap::new_with(4, 4, -0.5f32);
        let out = beautify(&low, &noise, &BeautifyParams::default());
        assert!(out.as_slice().iter().all(|&h| (h - -0.38).abs() < 1e-6));
    }

    #[test]
    fn test_unit_elevation_remap() {
        let rel = Tilemap::from_vec(3, 1, vec![-1.0f32, 0.0, 1.0]).unwrap();
        let unit = to_unit_elevation(&rel);
        assert_eq!(unit.as_slice(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_warped_axis_rounding() {
        assert_eq!(warped_axis(-3.2, 10), 0);
        assert_eq!(warped_axis(4.6, 10), 5);
        assert_eq!(warped_axis(42.0, 10), 9);
    }
}
