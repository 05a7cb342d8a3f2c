//! Generator configuration
//!
//! Every tunable constant of the pipeline, grouped per stage. The defaults
//! reproduce the reference terrain; any subset can be overridden from a JSON
//! file because each group fills missing fields from its own defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::beautify::BeautifyParams;
use crate::climate::ClimateParams;
use crate::continent::ContinentParams;
use crate::erosion::{ErosionParams, ErosionPreset, HydrologyParams};
use crate::heightmap::ShapingParams;
use crate::plates::TectonicParams;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub continent: ContinentParams,
    pub tectonics: TectonicParams,
    pub shaping: ShapingParams,
    pub erosion: ErosionParams,
    pub beautify: BeautifyParams,
    pub hydrology: HydrologyParams,
    pub climate: ClimateParams,
}

impl GeneratorConfig {
    /// Default configuration with the erosion stage replaced by a preset.
    pub fn with_erosion_preset(mut self, preset: ErosionPreset) -> Self {
        self.erosion = ErosionParams::from_preset(preset);
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make a stage divide by zero or produce
    /// non-finite values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.continent;
        positive("continent.world_radius", c.world_radius)?;
        positive("continent.falloff_exponent", c.falloff_exponent)?;
        positive("continent.shape_exponent", c.shape_exponent)?;
        finite("continent.shape_frequency", c.shape_frequency)?;
        finite("continent.warp_frequency", c.warp_frequency)?;
        finite("continent.warp_base", c.warp_base)?;
        finite("continent.warp_range", c.warp_range)?;
        finite("continent.raw_frequency", c.raw_frequency)?;
        finite("continent.raw_offset.0", c.raw_offset.0)?;
        finite("continent.raw_offset.1", c.raw_offset.1)?;

        let t = &self.tectonics;
        finite("tectonics.frequency", t.frequency)?;
        finite("tectonics.boundary_sharpness", t.boundary_sharpness)?;
        finite("tectonics.ridge_uplift", t.ridge_uplift)?;
        finite("tectonics.rift_depression", t.rift_depression)?;

        let s = &self.shaping;
        finite("shaping.deep_ocean_mask", s.deep_ocean_mask)?;
        finite("shaping.land_mask", s.land_mask)?;
        if !(0.0 < s.deep_ocean_mask && s.deep_ocean_mask < s.land_mask && s.land_mask < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "shaping bands need 0 < deep_ocean_mask < land_mask < 1, got {} and {}",
                s.deep_ocean_mask, s.land_mask
            )));
        }
        for (name, v) in [
            ("shaping.ocean_floor", s.ocean_floor),
            ("shaping.shelf_floor", s.shelf_floor),
            ("shaping.coast", s.coast),
            ("shaping.land_base", s.land_base),
            ("shaping.land_top", s.land_top),
            ("shaping.mountain_offset", s.mountain_offset),
            ("shaping.mountain_gain", s.mountain_gain),
            ("shaping.mountain_max", s.mountain_max),
        ] {
            finite(name, v)?;
        }

        unit("erosion.strength", self.erosion.strength)?;
        unit("erosion.fill_ratio", self.erosion.fill_ratio)?;

        let b = &self.beautify;
        for (name, v) in [
            ("beautify.warp_frequency", b.warp_frequency),
            ("beautify.warp_amplitude", b.warp_amplitude),
            ("beautify.detail_1_frequency", b.detail_1_frequency),
            ("beautify.detail_1_weight", b.detail_1_weight),
            ("beautify.detail_2_frequency", b.detail_2_frequency),
            ("beautify.detail_2_weight", b.detail_2_weight),
        ] {
            finite(name, v)?;
        }

        let h = &self.hydrology;
        finite("hydrology.sea_level", h.sea_level as f64)?;
        finite("hydrology.min_drop", h.min_drop as f64)?;
        finite("hydrology.trickle_threshold", h.trickle_threshold as f64)?;

        let cl = &self.climate;
        for (name, v) in [
            ("climate.latitude_weight", cl.latitude_weight),
            ("climate.temperature_noise_weight", cl.temperature_noise_weight),
            ("climate.altitude_cooling", cl.altitude_cooling),
            ("climate.temperature_frequency", cl.temperature_frequency),
            ("climate.humidity_frequency", cl.humidity_frequency),
            ("climate.humidity_offset.0", cl.humidity_offset.0),
            ("climate.humidity_offset.1", cl.humidity_offset.1),
            ("climate.coastal_humidity", cl.coastal_humidity),
            ("climate.wind_frequency", cl.wind_frequency),
        ] {
            finite(name, v)?;
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Parse)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

fn finite(name: &str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{} must be finite, got {}", name, v)))
    }
}

fn positive(name: &str, v: f64) -> Result<(), ConfigError> {
    finite(name, v)?;
    if v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, v)))
    }
}

fn unit(name: &str, v: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{} must be within [0, 1], got {}", name, v)))
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Reading or writing the config file failed
    Io { path: String, source: std::io::Error },
    /// The file is not valid configuration JSON
    Parse(serde_json::Error),
    /// A value would break generation (zero-width band, non-finite number, ...)
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "Failed to access config {}: {}", path, source),
            ConfigError::Parse(e) => write!(f, "Invalid config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}
