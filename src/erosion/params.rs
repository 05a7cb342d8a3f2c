//! Erosion smoothing parameters and presets

use serde::{Deserialize, Serialize};

/// Erosion intensity preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErosionPreset {
    /// No erosion - raw shaped terrain
    None,
    /// Fewer, softer passes
    Gentle,
    /// Balanced erosion
    #[default]
    Normal,
    /// More passes, stronger peak erosion
    Strong,
}

impl ErosionPreset {
    pub fn all() -> &'static [Self] {
        &[Self::None, Self::Gentle, Self::Normal, Self::Strong]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "No erosion (shaped terrain)",
            Self::Gentle => "Subtle smoothing",
            Self::Normal => "Balanced erosion",
            Self::Strong => "Worn-down peaks and filled valleys",
        }
    }
}

impl std::fmt::Display for ErosionPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Gentle => write!(f, "gentle"),
            Self::Normal => write!(f, "normal"),
            Self::Strong => write!(f, "strong"),
        }
    }
}

impl std::str::FromStr for ErosionPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|preset| preset.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown erosion preset '{}'", s))
    }
}

/// Parameters for the asymmetric thermal smoothing pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParams {
    /// Number of full-grid passes.
    pub iterations: usize,
    /// Fraction of a peak's excess height (over its neighbor average) removed per pass.
    pub strength: f64,
    /// Valleys fill at `strength * fill_ratio` instead of `strength`.
    pub fill_ratio: f64,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self::from_preset(ErosionPreset::Normal)
    }
}

impl ErosionParams {
    pub fn from_preset(preset: ErosionPreset) -> Self {
        match preset {
            ErosionPreset::None => Self {
                iterations: 0,
                strength: 0.0,
                fill_ratio: 0.0,
            },
            ErosionPreset::Gentle => Self {
                iterations: 3,
                strength: 0.3,
                fill_ratio: 0.35,
            },
            ErosionPreset::Normal => Self {
                iterations: 6,
                strength: 0.45,
                fill_ratio: 0.35,
            },
            ErosionPreset::Strong => Self {
                iterations: 10,
                strength: 0.6,
                fill_ratio: 0.35,
            },
        }
    }

    /// Blend factor used where a cell sits below its neighbor average.
    pub fn fill_strength(&self) -> f64 {
        self.strength * self.fill_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_normal() {
        let params = ErosionParams::default();
        assert_eq!(params.iterations, 6);
        assert_eq!(params.strength, 0.45);
        assert!((params.fill_strength() - 0.1575).abs() < 1e-12);
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!("strong".parse::<ErosionPreset>(), Ok(ErosionPreset::Strong));
        assert_eq!("None".parse::<ErosionPreset>(), Ok(ErosionPreset::None));
        assert!("wild".parse::<ErosionPreset>().is_err());
    }
}
