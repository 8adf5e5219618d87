//! Occupancy raster loading.
//!
//! A map is a grayscale image plus a YAML sidecar in the `map_server` layout:
//!
//! ```yaml
//! image: map.png
//! resolution: 0.05
//! origin: [-10.0, -10.0, 0.0]
//! ```
//!
//! Cells equal to [`FREE_CELL`] or [`UNKNOWN_CELL`] are background; every
//! other value marks an obstacle.
//!
//! # Example
//!
//! ```rust
//! use semmap_perception::raster::{MapMetadata, OccupancyMap};
//!
//! let meta = MapMetadata::new(1.0, [0.0, 0.0]).unwrap();
//! let mut cells = vec![255u8; 16];
//! cells[1 * 4 + 2] = 128;
//! let map = OccupancyMap::from_cells(4, 4, cells, meta).unwrap();
//!
//! assert_eq!(map.obstacle_pixels().collect::<Vec<_>>(), vec![(2, 1)]);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use image::GrayImage;
use semmap_types::{ConfigError, LoadError, SceneError};
use serde::Deserialize;
use tracing::{debug, info};

/// Cell value of known free space.
pub const FREE_CELL: u8 = 255;

/// Cell value of unexplored space.
pub const UNKNOWN_CELL: u8 = 0;

/// True when a raster cell marks an obstacle, i.e. it is neither free nor
/// unknown.
pub fn is_obstacle(value: u8) -> bool {
    value != UNKNOWN_CELL && value != FREE_CELL
}

// ────────────────────────────────────────────────────────────────────────────
// MapMetadata
// ────────────────────────────────────────────────────────────────────────────

/// Sidecar fields as they appear on disk.  Extra keys (`negate`,
/// `occupied_thresh`, …) are ignored.
#[derive(Debug, Deserialize)]
struct RawMetadata {
    resolution: f64,
    origin: Vec<f64>,
    #[serde(default)]
    image: Option<String>,
}

/// Resolution and origin of an occupancy raster.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMetadata {
    /// World units per cell.  Always positive and finite.
    pub resolution: f64,
    /// World coordinate of the raster's lower-left corner.
    pub origin: [f64; 2],
    /// Image referenced by the sidecar, resolved against the sidecar's
    /// directory when loaded from disk.
    pub image: Option<PathBuf>,
}

impl MapMetadata {
    /// Build metadata from its parts, rejecting non-positive resolutions.
    pub fn new(resolution: f64, origin: [f64; 2]) -> Result<Self, ConfigError> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(ConfigError::NonPositiveResolution(resolution));
        }
        Ok(Self {
            resolution,
            origin,
            image: None,
        })
    }

    /// Parse a YAML sidecar.
    pub fn from_yaml_str(raw: &str) -> Result<Self, SceneError> {
        let parsed: RawMetadata = serde_yaml::from_str(raw)
            .map_err(|e| LoadError::Metadata(format!("invalid map descriptor: {e}")))?;

        let origin = match parsed.origin.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => [*x, *y],
            [_, _, ..] => {
                return Err(LoadError::Metadata("origin must be finite".to_string()).into());
            }
            other => {
                return Err(LoadError::Metadata(format!(
                    "origin needs at least 2 components, got {}",
                    other.len()
                ))
                .into());
            }
        };

        let mut meta = Self::new(parsed.resolution, origin)?;
        meta.image = parsed.image.map(PathBuf::from);
        Ok(meta)
    }

    /// Read and parse a YAML sidecar from disk.
    ///
    /// A relative `image:` entry is resolved against the sidecar's directory.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let raw = fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut meta = Self::from_yaml_str(&raw)?;
        if let Some(image) = meta.image.take() {
            let resolved = match path.parent() {
                Some(dir) if image.is_relative() => dir.join(image),
                _ => image,
            };
            meta.image = Some(resolved);
        }
        Ok(meta)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OccupancyMap
// ────────────────────────────────────────────────────────────────────────────

/// A read-only occupancy raster.
///
/// Cells are stored row-major; row 0 is the top row of the source image.
#[derive(Debug, Clone)]
pub struct OccupancyMap {
    width: u32,
    height: u32,
    cells: Vec<u8>,
    metadata: MapMetadata,
}

impl OccupancyMap {
    /// Wrap raw row-major cells.
    ///
    /// # Errors
    ///
    /// [`LoadError::Raster`] when `cells` does not hold exactly
    /// `width * height` values.
    pub fn from_cells(
        width: u32,
        height: u32,
        cells: Vec<u8>,
        metadata: MapMetadata,
    ) -> Result<Self, LoadError> {
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(LoadError::Raster(format!(
                "{width}x{height} raster needs {expected} cells, got {}",
                cells.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
            metadata,
        })
    }

    /// Take ownership of a decoded grayscale image.
    pub fn from_image(image: GrayImage, metadata: MapMetadata) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            cells: image.into_raw(),
            metadata,
        }
    }

    /// Load an image and its sidecar descriptor.
    ///
    /// Color images are converted to 8-bit luma.
    pub fn load(image_path: &Path, metadata_path: &Path) -> Result<Self, SceneError> {
        let metadata = MapMetadata::load(metadata_path)?;
        Self::load_image(image_path, metadata)
    }

    /// Load a map from its sidecar alone, following the sidecar's `image:`
    /// entry.
    pub fn load_from_descriptor(metadata_path: &Path) -> Result<Self, SceneError> {
        let metadata = MapMetadata::load(metadata_path)?;
        let image_path = metadata.image.clone().ok_or_else(|| {
            LoadError::Metadata(format!(
                "{} has no 'image' entry",
                metadata_path.display()
            ))
        })?;
        Self::load_image(&image_path, metadata)
    }

    fn load_image(image_path: &Path, metadata: MapMetadata) -> Result<Self, SceneError> {
        info!(path = %image_path.display(), "loading occupancy raster");
        let decoded = image::open(image_path)
            .map_err(|e| LoadError::Raster(format!("{}: {e}", image_path.display())))?;
        let map = Self::from_image(decoded.to_luma8(), metadata);
        debug!(
            width = map.width,
            height = map.height,
            resolution = map.metadata.resolution,
            "occupancy raster decoded"
        );
        Ok(map)
    }

    /// Raster width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Raster height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn metadata(&self) -> &MapMetadata {
        &self.metadata
    }

    /// Cell value at column `px`, row `py`, or `None` outside the raster.
    pub fn value(&self, px: u32, py: u32) -> Option<u8> {
        if px >= self.width || py >= self.height {
            return None;
        }
        self.cells
            .get(py as usize * self.width as usize + px as usize)
            .copied()
    }

    /// Every obstacle cell as `(px, py)`, rows top to bottom, columns left to
    /// right.
    pub fn obstacle_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, v)| is_obstacle(**v))
            .map(move |(i, _)| ((i % width) as u32, (i / width) as u32))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
