//! Climate system for generating temperature, humidity, rainfall and wind
//! Based on latitude, elevation, coastline proximity and noise

use noise::NoiseFn;
use serde::{Deserialize, Serialize};

use crate::biomes::{DEEP_SEA_LEVEL, SHALLOW_SEA_LEVEL};
use crate::noise_fields::{sample, sample_unit};
use crate::tilemap::Tilemap;

// =============================================================================
// CLIMATE PARAMETERS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateParams {
    /// Weight of the latitude term in temperature.
    pub latitude_weight: f64,
    /// Weight of the noise term in temperature.
    pub temperature_noise_weight: f64,
    /// Temperature lost per unit of elevation.
    pub altitude_cooling: f64,
    pub temperature_frequency: f64,
    pub humidity_frequency: f64,
    /// Offset of the humidity sample so it does not line up with temperature.
    pub humidity_offset: (f64, f64),
    /// Humidity gained per unit of depth below the shallow sea level on the shelf.
    pub coastal_humidity: f64,
    pub wind_frequency: f64,
}

impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            latitude_weight: 0.65,
            temperature_noise_weight: 0.35,
            altitude_cooling: 0.3,
            temperature_frequency: 0.01,
            humidity_frequency: 0.01,
            humidity_offset: (999.0, 123.0),
            coastal_humidity: 0.4,
            wind_frequency: 0.02,
        }
    }
}

/// Noise fields the climate stage samples.
pub struct ClimateNoise<'a, N> {
    pub temperature: &'a N,
    pub humidity: &'a N,
    pub wind_u: &'a N,
    pub wind_v: &'a N,
}

/// Per-cell climate fields.
pub struct ClimateFields {
    /// 0.0 (coldest) to 1.0 (hottest)
    pub temperature: Tilemap<f32>,
    /// 0.0 to 1.0
    pub humidity: Tilemap<f32>,
    /// 0.0 to 1.0
    pub rainfall: Tilemap<f32>,
    /// East (+) / west (-), -1.0 to 1.0
    pub wind_u: Tilemap<f32>,
    /// North (+) / south (-), -1.0 to 1.0
    pub wind_v: Tilemap<f32>,
}

/// Latitude warmth: 1 at the vertical centre, 0 at the top and bottom rows.
pub fn latitude_warmth(y: usize, height: usize) -> f64 {
    let lat = y as f64 / height as f64;
    1.0 - (lat - 0.5).abs() * 2.0
}

pub fn temperature_at(
    x: usize,
    y: usize,
    height: usize,
    elevation: f64,
    noise: &impl NoiseFn<f64, 2>,
    params: &ClimateParams,
) -> f64 {
    let f = params.temperature_frequency;
    let noise_temp = sample_unit(noise, x as f64 * f, y as f64 * f);
    let t = params.latitude_weight * latitude_warmth(y, height)
        + params.temperature_noise_weight * noise_temp
        - elevation * params.altitude_cooling;
    t.clamp(0.0, 1.0)
}

pub fn humidity_at(
    x: usize,
    y: usize,
    elevation: f64,
    noise: &impl NoiseFn<f64, 2>,
    params: &ClimateParams,
) -> f64 {
    let f = params.humidity_frequency;
    let (ox, oy) = params.humidity_offset;
    let mut h = sample_unit(noise, (x as f64 + ox) * f, (y as f64 + oy) * f);

    // Shelf waters near the coast are damper
    let shallow = SHALLOW_SEA_LEVEL as f64;
    if elevation < shallow && elevation > DEEP_SEA_LEVEL as f64 {
        h += (shallow - elevation) * params.coastal_humidity;
    }
    h.clamp(0.0, 1.0)
}

/// Rain peaks at mid elevation and falls off toward sea floor and summits.
pub fn rainfall_from(humidity: f64, elevation: f64) -> f64 {
    (humidity * (1.0 - (elevation - 0.5).abs())).clamp(0.0, 1.0)
}

/// Generate all climate fields from the final [0, 1] elevation.
pub fn generate_climate<N: NoiseFn<f64, 2> + Sync>(
    elevation: &Tilemap<f32>,
    noise: &ClimateNoise<'_, N>,
    params: &ClimateParams,
) -> ClimateFields {
    let width = elevation.width;
    let height = elevation.height;

    let temperature = Tilemap::from_fn_par(width, height, |x, y| {
        let e = *elevation.get(x, y) as f64;
        temperature_at(x, y, height, e, noise.temperature, params) as f32
    });

    let humidity = Tilemap::from_fn_par(width, height, |x, y| {
        let e = *elevation.get(x, y) as f64;
        humidity_at(x, y, e, noise.humidity, params) as f32
    });

    let rainfall = Tilemap::from_fn_par(width, height, |x, y| {
        rainfall_from(*humidity.get(x, y) as f64, *elevation.get(x, y) as f64) as f32
    });

    let wf = params.wind_frequency;
    let wind_u = Tilemap::from_fn_par(width, height, |x, y| {
        sample(noise.wind_u, x as f64 * wf, y as f64 * wf) as f32
    });
    let wind_v = Tilemap::from_fn_par(width, height, |x, y| {
        sample(noise.wind_v, x as f64 * wf, y as f64 * wf) as f32
    });

    ClimateFields {
        temperature,
        humidity,
        rainfall,
        wind_u,
        wind_v,
    }
}
