//! Seed management for world generation
//!
//! Every noise field gets its own sub-seed string, formed by appending a fixed
//! stage suffix to the master seed. The suffixes and the concatenation order
//! are part of the output contract: changing either changes every world.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const CONTINENTAL: &str = "_continental";
pub const WARP: &str = "_warp";
pub const PLATE: &str = "_plate";
pub const TEMPERATURE: &str = "_temp";
pub const HUMIDITY: &str = "_humidity";
pub const WIND_U: &str = "_windU";
pub const WIND_V: &str = "_windV";
pub const DETAIL_1: &str = "_detail1";
pub const DETAIL_2: &str = "_detail2";
pub const BEAUTY_WARP_1: &str = "_beautyWarp1";
pub const BEAUTY_WARP_2: &str = "_beautyWarp2";

/// Full sub-seed strings for all eleven noise fields of one world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference)
    pub master: String,
    pub continental: String,
    pub warp: String,
    pub plate: String,
    pub temperature: String,
    pub humidity: String,
    pub wind_u: String,
    pub wind_v: String,
    pub detail_1: String,
    pub detail_2: String,
    pub beauty_warp_1: String,
    pub beauty_warp_2: String,
}

impl WorldSeeds {
    /// Derive all sub-seeds from a master seed.
    pub fn from_master(master: &str) -> Self {
        Self {
            master: master.to_string(),
            continental: derive_seed(master, CONTINENTAL),
            warp: derive_seed(master, WARP),
            plate: derive_seed(master, PLATE),
            temperature: derive_seed(master, TEMPERATURE),
            humidity: derive_seed(master, HUMIDITY),
            wind_u: derive_seed(master, WIND_U),
            wind_v: derive_seed(master, WIND_V),
            detail_1: derive_seed(master, DETAIL_1),
            detail_2: derive_seed(master, DETAIL_2),
            beauty_warp_1: derive_seed(master, BEAUTY_WARP_1),
            beauty_warp_2: derive_seed(master, BEAUTY_WARP_2),
        }
    }
}

/// Sub-seed for one stage: the master seed followed by the stage suffix.
pub fn derive_seed(master: &str, suffix: &str) -> String {
    let mut seed = String::with_capacity(master.len() + suffix.len());
    seed.push_str(master);
    seed.push_str(suffix);
    seed
}

/// Reduce a seed string to the 32-bit seed a noise generator takes.
///
/// FNV-1a keeps the string hash identical on every platform and toolchain;
/// the hash then seeds a ChaCha stream so that seeds differing in one byte
/// still land far apart.
pub fn noise_seed(seed: &str) -> u32 {
    let mut rng = ChaCha8Rng::seed_from_u64(fnv1a_64(seed.as_bytes()));
    rng.next_u32()
}

/// FNV-1a 64-bit hash.
fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x00000100000001B3;
    let mut h = OFFSET;
    for &b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(PRIME);
    }
    h
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WorldSeeds {{ master: {:?} }}", self.master)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_concatenation() {
        let seeds = WorldSeeds::from_master("abc");
        assert_eq!(seeds.continental, "abc_continental");
        assert_eq!(seeds.wind_u, "abc_windU");
        assert_eq!(seeds.beauty_warp_2, "abc_beautyWarp2");
        assert_eq!(seeds.master, "abc");
    }

    #[test]
    fn test_fnv_reference_values() {
        assert_eq!(fnv1a_64(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a_64(b"a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn test_noise_seed_deterministic() {
        assert_eq!(noise_seed("test-1_plate"), noise_seed("test-1_plate"));
        assert_ne!(noise_seed("test-1_plate"), noise_seed("test-1_warp"));
    }
}
