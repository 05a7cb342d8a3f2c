//! Binary export of the coarse grid, and the matching loader.
//!
//! File set, one value per cell in row-major order:
//! - `elevation.bin`, `temp.bin`, `rainfall.bin`, `humidity.bin`, `river.bin`:
//!   little-endian i16, `round(clamp(v, 0, 1) * 32767)`
//! - `windU.bin`, `windV.bin`: little-endian i16, `round(clamp(v, -1, 1) * 32767)`
//! - `biome.bin`: one u8 biome id per cell
//! - `seed.txt`: the seed string

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::biomes::Biome;
use crate::tilemap::Tilemap;
use crate::world::{CoarseGrid, COARSE_HEIGHT, COARSE_WIDTH};

/// Quantization scale shared by every i16 field.
pub const I16_SCALE: f32 = 32767.0;

pub const SEED_FILE: &str = "seed.txt";
pub const BIOME_FILE: &str = "biome.bin";

/// Value range of an exported field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRange {
    /// [0, 1]
    Unit,
    /// [-1, 1]
    Signed,
}

impl FieldRange {
    pub fn clamp(self, v: f32) -> f32 {
        match self {
            FieldRange::Unit => v.clamp(0.0, 1.0),
            FieldRange::Signed => v.clamp(-1.0, 1.0),
        }
    }
}

/// One i16 field of the file set.
#[derive(Clone, Copy)]
pub struct Int16Field {
    pub file: &'static str,
    pub range: FieldRange,
    pub get: fn(&CoarseGrid) -> &Tilemap<f32>,
    pub get_mut: fn(&mut CoarseGrid) -> &mut Tilemap<f32>,
}

/// The i16 fields in export order.
pub const INT16_FIELDS: [Int16Field; 7] = [
    Int16Field {
        file: "elevation.bin",
        range: FieldRange::Unit,
        get: |g| &g.elevation,
        get_mut: |g| &mut g.elevation,
    },
    Int16Field {
        file: "temp.bin",
        range: FieldRange::Unit,
        get: |g| &g.temperature,
        get_mut: |g| &mut g.temperature,
    },
    Int16Field {
        file: "rainfall.bin",
        range: FieldRange::Unit,
        get: |g| &g.rainfall,
        get_mut: |g| &mut g.rainfall,
    },
    Int16Field {
        file: "humidity.bin",
        range: FieldRange::Unit,
        get: |g| &g.humidity,
        get_mut: |g| &mut g.humidity,
    },
    Int16Field {
        file: "windU.bin",
        range: FieldRange::Signed,
        get: |g| &g.wind_u,
        get_mut: |g| &mut g.wind_u,
    },
    Int16Field {
        file: "windV.bin",
        range: FieldRange::Signed,
        get: |g| &g.wind_v,
        get_mut: |g| &mut g.wind_v,
    },
    Int16Field {
        file: "river.bin",
        range: FieldRange::Unit,
        get: |g| &g.river,
        get_mut: |g| &mut g.river,
    },
];

/// Export errors
#[derive(Debug)]
pub enum ExportError {
    /// A file or directory could not be created, written or read
    Io { path: PathBuf, source: std::io::Error },
    /// A field file does not hold exactly one value per cell
    SizeMismatch { path: PathBuf, expected_bytes: usize, actual_bytes: usize },
    /// `biome.bin` holds an id outside the biome taxonomy
    InvalidBiome { path: PathBuf, index: usize, id: u8 },
    /// Encoding or saving a preview image failed
    Image(image::ImageError),
}

impl ExportError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ExportError::SizeMismatch { path, expected_bytes, actual_bytes } => write!(
                f,
                "{}: expected {} bytes, found {}",
                path.display(),
                expected_bytes,
                actual_bytes
            ),
            ExportError::InvalidBiome { path, index, id } => {
                write!(f, "{}: invalid biome id {} at cell {}", path.display(), id, index)
            }
            ExportError::Image(e) => write!(f, "Failed to save image: {}", e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io { source, .. } => Some(source),
            ExportError::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for ExportError {
    fn from(e: image::ImageError) -> Self {
        ExportError::Image(e)
    }
}

/// What an export wrote.
#[derive(Clone, Debug)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
    pub bytes_written: usize,
}

/// Quantize one value to the stored i16.
pub fn encode_i16(v: f32, range: FieldRange) -> i16 {
    // The clamp keeps the product inside i16, so the cast cannot saturate.
    (range.clamp(v) * I16_SCALE).round() as i16
}

/// Decode a stored i16 back into its range.
pub fn decode_i16(v: i16, range: FieldRange) -> f32 {
    range.clamp(v as f32 / I16_SCALE)
}

/// Write `grid` into `dir` (created if missing).
pub fn export_world<P: AsRef<Path>>(grid: &CoarseGrid, dir: P) -> Result<ExportSummary, ExportError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, e))?;

    let mut summary = ExportSummary {
        files: Vec::with_capacity(INT16_FIELDS.len() + 2),
        bytes_written: 0,
    };

    for field in &INT16_FIELDS {
        let path = dir.join(field.file);
        let values = (field.get)(grid).as_slice();
        let bytes = write_i16_field(&path, values, field.range)?;
        log::debug!("Wrote {} ({} bytes)", path.display(), bytes);
        summary.bytes_written += bytes;
        summary.files.push(path);
    }

    let path = dir.join(BIOME_FILE);
    let ids: Vec<u8> = grid.biome.as_slice().iter().map(|b| b.id()).collect();
    fs::write(&path, &ids).map_err(|e| ExportError::io(&path, e))?;
    summary.bytes_written += ids.len();
    summary.files.push(path);

    let path = dir.join(SEED_FILE);
    fs::write(&path, grid.seed.as_bytes()).map_err(|e| ExportError::io(&path, e))?;
    summary.bytes_written += grid.seed.len();
    summary.files.push(path);

    log::info!("Exported {} files to {}", summary.files.len(), dir.display());
    Ok(summary)
}

fn write_i16_field(path: &Path, values: &[f32], range: FieldRange) -> Result<usize, ExportError> {
    let file = File::create(path).map_err(|e| ExportError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for &v in values {
        writer
            .write_all(&encode_i16(v, range).to_le_bytes())
            .map_err(|e| ExportError::io(path, e))?;
    }
    writer.flush().map_err(|e| ExportError::io(path, e))?;
    Ok(values.len() * 2)
}

/// Load a grid exported by [`export_world`] at the standard coarse size.
pub fn load_world<P: AsRef<Path>>(dir: P) -> Result<CoarseGrid, ExportError> {
    load_world_sized(dir, COARSE_WIDTH, COARSE_HEIGHT)
}

/// Load an exported grid of a known size.
pub fn load_world_sized<P: AsRef<Path>>(
    dir: P,
    width: usize,
    height: usize,
) -> Result<CoarseGrid, ExportError> {
    let dir = dir.as_ref();
    let cells = width * height;

    let biome = read_biomes(&dir.join(BIOME_FILE), cells)?;
    let mut grid = CoarseGrid {
        seed: String::new(),
        width,
        height,
        elevation: Tilemap::new(0, 0),
        temperature: Tilemap::new(0, 0),
        humidity: Tilemap::new(0, 0),
        rainfall: Tilemap::new(0, 0),
        wind_u: Tilemap::new(0, 0),
        wind_v: Tilemap::new(0, 0),
        river: Tilemap::new(0, 0),
        biome: to_tilemap(width, height, biome),
    };
    for field in &INT16_FIELDS {
        let values = read_i16_field(&dir.join(field.file), cells, field.range)?;
        *(field.get_mut)(&mut grid) = to_tilemap(width, height, values);
    }

    let seed_path = dir.join(SEED_FILE);
    let seed = match fs::read_to_string(&seed_path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(ExportError::io(&seed_path, e)),
    };
    grid.seed = seed;

    Ok(grid)
}

fn to_tilemap<T: Clone + Default>(width: usize, height: usize, values: Vec<T>) -> Tilemap<T> {
    // Lengths are checked against width * height by the readers.
    Tilemap::from_vec(width, height, values).unwrap_or_else(|| Tilemap::new(width, height))
}

fn read_checked(path: &Path, expected_bytes: usize) -> Result<Vec<u8>, ExportError> {
    let bytes = fs::read(path).map_err(|e| ExportError::io(path, e))?;
    if bytes.len() != expected_bytes {
        return Err(ExportError::SizeMismatch {
            path: path.to_path_buf(),
            expected_bytes,
            actual_bytes: bytes.len(),
        });
    }
    Ok(bytes)
}

/// Read one i16 field, decoding and re-clamping every value.
pub fn read_i16_field(path: &Path, cells: usize, range: FieldRange) -> Result<Vec<f32>, ExportError> {
    let bytes = read_checked(path, cells * 2)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| decode_i16(i16::from_le_bytes([pair[0], pair[1]]), range))
        .collect())
}

/// Read `biome.bin`.
pub fn read_biomes(path: &Path, cells: usize) -> Result<Vec<Biome>, ExportError> {
    let bytes = read_checked(path, cells)?;
    bytes
        .iter()
        .enumerate()
        .map(|(index, &id)| {
            Biome::from_id(id).ok_or_else(|| ExportError::InvalidBiome {
                path: path.to_path_buf(),
                index,
                id,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("coarse_world_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn sample_grid() -> CoarseGrid {
        let (w, h) = (4, 3);
        let ramp = |lo: f32, hi: f32| {
            Tilemap::from_fn_par(w, h, move |x, y| lo + (hi - lo) * (x + y * w) as f32 / 11.0)
        };
        CoarseGrid {
            seed: "export-test".to_string(),
            width: w,
            height: h,
            elevation: ramp(0.0, 1.0),
            temperature: ramp(0.2, 0.8),
            humidity: ramp(1.0, 0.0),
            rainfall: ramp(0.0, 0.5),
            wind_u: ramp(-1.0, 1.0),
            wind_v: ramp(1.0, -1.0),
            river: ramp(0.0, 0.3),
            biome: Tilemap::from_fn_par(w, h, |x, y| Biome::from_id(((x + y * w) % 15) as u8).unwrap_or_default()),
        }
    }

    #[test]
    fn test_encoding_endpoints() {
        assert_eq!(encode_i16(1.0, FieldRange::Unit), 32767);
        assert_eq!(encode_i16(-0.3, FieldRange::Unit), 0);
        assert_eq!(encode_i16(2.0, FieldRange::Unit), 32767);
        assert_eq!(encode_i16(-1.0, FieldRange::Signed), -32767);
        assert_eq!(encode_i16(0.5, FieldRange::Signed), 16384);
        assert_eq!(decode_i16(-32767, FieldRange::Unit), 0.0);
        assert_eq!(decode_i16(32767, FieldRange::Signed), 1.0);
    }

    #[test]
    fn test_export_file_set_and_sizes() {
        let dir = scratch_dir("files");
        let grid = sample_grid();
        let summary = export_world(&grid, &dir).unwrap();

        assert_eq!(summary.files.len(), 9);
        for field in &INT16_FIELDS {
            assert_eq!(fs::metadata(dir.join(field.file)).unwrap().len(), 24);
        }
        assert_eq!(fs::metadata(dir.join(BIOME_FILE)).unwrap().len(), 12);
        assert_eq!(fs::read_to_string(dir.join(SEED_FILE)).unwrap(), "export-test");

        // Little-endian i16 of the first elevation (0.0) and last (1.0) cells.
        let elevation = fs::read(dir.join("elevation.bin")).unwrap();
        assert_eq!(&elevation[..2], &[0, 0]);
        assert_eq!(&elevation[22..], &32767i16.to_le_bytes());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_restores_quantized_grid() {
        let dir = scratch_dir("load");
        let grid = sample_grid();
        export_world(&grid, &dir).unwrap();
        let loaded = load_world_sized(&dir, grid.width, grid.height).unwrap();

        assert_eq!(loaded.seed, grid.seed);
        assert_eq!(loaded.biome, grid.biome);
        let tolerance = 1.0 / I16_SCALE;
        for ((_, a), (_, b)) in grid.unit_fields().iter().zip(loaded.unit_fields().iter()) {
            for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
                assert!((x - y).abs() <= tolerance);
            }
        }
        for ((_, a), (_, b)) in grid.signed_fields().iter().zip(loaded.signed_fields().iter()) {
            for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
                assert!((x - y).abs() <= tolerance);
            }
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_each_file_holds_its_own_field() {
        let dir = scratch_dir("fields");
        let mut grid = sample_grid();
        // A distinct constant per field, so a swapped accessor shows up.
        for (i, field) in INT16_FIELDS.iter().enumerate() {
            (field.get_mut)(&mut grid).fill(0.1 * i as f32);
        }
        export_world(&grid, &dir).unwrap();

        let mut names: Vec<&str> = INT16_FIELDS.iter().map(|f| f.file).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), INT16_FIELDS.len());

        for (i, field) in INT16_FIELDS.iter().enumerate() {
            let values = read_i16_field(&dir.join(field.file), 12, field.range).unwrap();
            let expected = encode_i16(0.1 * i as f32, field.range);
            assert!(values.iter().all(|&v| encode_i16(v, field.range) == expected), "{}", field.file);
        }
        assert_eq!(fs::read(dir.join("windU.bin")).unwrap()[..2], encode_i16(0.4, FieldRange::Signed).to_le_bytes());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_rejects_truncated_field() {
        let dir = scratch_dir("truncated");
        let grid = sample_grid();
        export_world(&grid, &dir).unwrap();
        fs::write(dir.join("river.bin"), [0u8; 10]).unwrap();

        let err = load_world_sized(&dir, grid.width, grid.height).unwrap_err();
        assert!(matches!(err, ExportError::SizeMismatch { expected_bytes: 24, actual_bytes: 10, .. }));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_rejects_unknown_biome() {
        let dir = scratch_dir("biome");
        let grid = sample_grid();
        export_world(&grid, &dir).unwrap();
        let mut ids = fs::read(dir.join(BIOME_FILE)).unwrap();
        ids[5] = 200;
        fs::write(dir.join(BIOME_FILE), ids).unwrap();

        let err = load_world_sized(&dir, grid.width, grid.height).unwrap_err();
        assert!(matches!(err, ExportError::InvalidBiome { index: 5, id: 200, .. }));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_seed_file_loads_empty_seed() {
        let dir = scratch_dir("noseed");
        let grid = sample_grid();
        export_world(&grid, &dir).unwrap();
        fs::remove_file(dir.join(SEED_FILE)).unwrap();

        let loaded = load_world_sized(&dir, grid.width, grid.height).unwrap();
        assert_eq!(loaded.seed, "");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let err = load_world_sized(scratch_dir("absent"), 2, 2).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
