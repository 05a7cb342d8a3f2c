//! Seeded noise provider
//!
//! Maps a seed string to a deterministic 2D noise function with values in
//! [-1, 1]. Stages never construct noise themselves; they receive the fields
//! they need through [`StageNoise`], which the orchestrator builds from a
//! [`NoiseProvider`].

use noise::{NoiseFn, Simplex};

use crate::seeds::{self, WorldSeeds};

/// Source of seeded noise functions.
///
/// The production implementation is [`SimplexProvider`]; tests substitute
/// constant or hand-shaped fields.
pub trait NoiseProvider {
    type Noise: NoiseFn<f64, 2> + Sync;

    fn noise(&self, seed: &str) -> Self::Noise;
}

/// Simplex noise seeded from the hashed seed string.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimplexProvider;

impl NoiseProvider for SimplexProvider {
    type Noise = SeededNoise;

    fn noise(&self, seed: &str) -> SeededNoise {
        SeededNoise::new(seed)
    }
}

/// A 2D simplex field bound to one seed string. Output is clamped to [-1, 1].
#[derive(Clone, Debug)]
pub struct SeededNoise {
    simplex: Simplex,
}

impl SeededNoise {
    pub fn new(seed: &str) -> Self {
        Self {
            simplex: Simplex::new(seeds::noise_seed(seed)),
        }
    }
}

impl NoiseFn<f64, 2> for SeededNoise {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.simplex.get(point).clamp(-1.0, 1.0)
    }
}

/// Sample a field, clamped to [-1, 1] regardless of the source.
#[inline]
pub fn sample(noise: &impl NoiseFn<f64, 2>, x: f64, y: f64) -> f64 {
    noise.get([x, y]).clamp(-1.0, 1.0)
}

/// Sample a field remapped to [0, 1].
#[inline]
pub fn sample_unit(noise: &impl NoiseFn<f64, 2>, x: f64, y: f64) -> f64 {
    (sample(noise, x, y) + 1.0) * 0.5
}

/// The eleven decorrelated noise fields one world is built from.
pub struct StageNoise<N> {
    pub continental: N,
    pub warp: N,
    pub plate: N,
    pub temperature: N,
    pub humidity: N,
    pub wind_u: N,
    pub wind_v: N,
    pub detail_1: N,
    pub detail_2: N,
    pub beauty_warp_1: N,
    pub beauty_warp_2: N,
}

impl<N: NoiseFn<f64, 2> + Sync> StageNoise<N> {
    pub fn from_provider<P>(provider: &P, seeds: &WorldSeeds) -> Self
    where
        P: NoiseProvider<Noise = N>,
    {
        Self {
            continental: provider.noise(&seeds.continental),
            warp: provider.noise(&seeds.warp),
            plate: provider.noise(&seeds.plate),
            temperature: provider.noise(&seeds.temperature),
            humidity: provider.noise(&seeds.humidity),
            wind_u: provider.noise(&seeds.wind_u),
            wind_v: provider.noise(&seeds.wind_v),
            detail_1: provider.noise(&seeds.detail_1),
            detail_2: provider.noise(&seeds.detail_2),
            beauty_warp_1: provider.noise(&seeds.beauty_warp_1),
            beauty_warp_2: provider.noise(&seeds.beauty_warp_2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noise::Constant;

    #[test]
    fn test_same_seed_same_values() {
        let a = SeededNoise::new("test-1_continental");
        let b = SeededNoise::new("test-1_continental");
        for i in 0..64 {
            let x = i as f64 * 0.37;
            let y = i as f64 * -1.13;
            assert_eq!(a.get([x, y]).to_bits(), b.get([x, y]).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_decorrelate() {
        let a = SeededNoise::new("test-1_continental");
        let b = SeededNoise::new("test-1_warp");
        let differs = (0..64).any(|i| {
            let p = [i as f64 * 0.41 + 0.1, i as f64 * 0.29 + 0.2];
            a.get(p) != b.get(p)
        });
        assert!(differs);
    }

    #[test]
    fn test_range_at_large_coordinates() {
        let n = SeededNoise::new("range");
        for i in 0..200 {
            let v = n.get([1.0e7 + i as f64 * 13.7, -3.0e6 + i as f64 * 0.9]);
            assert!(v.is_finite());
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_sample_clamps_foreign_sources() {
        let loud = Constant::new(3.5);
        assert_eq!(sample(&loud, 0.0, 0.0), 1.0);
        assert_eq!(sample_unit(&loud, 0.0, 0.0), 1.0);
        let quiet = Constant::new(-7.0);
        assert_eq!(sample_unit(&quiet, 1.0, 1.0), 0.0);
    }
}
