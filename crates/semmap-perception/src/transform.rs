//! Pixel ↔ world conversion and z-layer stratification.
//!
//! Raster rows grow downward while the world y axis grows upward, so the
//! transformer measures y from the bottom edge of the raster:
//!
//! ```text
//! world_x = px * resolution + origin_x
//! world_y = (height - py) * resolution + origin_y + vertical_offset
//! world_z = 0
//! ```
//!
//! # Example
//!
//! ```rust
//! use semmap_perception::raster::MapMetadata;
//! use semmap_perception::transform::CoordinateTransformer;
//!
//! let meta = MapMetadata::new(1.0, [0.0, 0.0]).unwrap();
//! let tf = CoordinateTransformer::new(&meta, 4);
//!
//! let p = tf.pixel_to_world(2.0, 1.0);
//! assert_eq!((p.x, p.y, p.z), (2.0, 3.0, 0.0));
//! ```

use semmap_types::Point3;

use crate::raster::{MapMetadata, OccupancyMap};

/// Elevation of the occupancy layer.
pub const BASE_LAYER_Z: f64 = 0.0;

/// Affine map from raster cells to world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransformer {
    resolution: f64,
    origin: [f64; 2],
    raster_height: f64,
    vertical_offset: f64,
}

impl CoordinateTransformer {
    /// Create a transformer for a raster `raster_height` rows tall.
    pub fn new(metadata: &MapMetadata, raster_height: u32) -> Self {
        Self {
            resolution: metadata.resolution,
            origin: metadata.origin,
            raster_height: f64::from(raster_height),
            vertical_offset: 0.0,
        }
    }

    /// Create a transformer matching a loaded map.
    pub fn for_map(map: &OccupancyMap) -> Self {
        Self::new(map.metadata(), map.height())
    }

    /// Shift every world y by a constant, used to line the raster up with a
    /// detection graph recorded in a slightly different frame.
    pub fn with_vertical_offset(mut self, offset: f64) -> Self {
        self.vertical_offset = offset;
        self
    }

    pub fn vertical_offset(&self) -> f64 {
        self.vertical_offset
    }

    /// World position of the cell at column `px`, row `py`, on the base layer.
    pub fn pixel_to_world(&self, px: f64, py: f64) -> Point3 {
        Point3::new(
            px * self.resolution + self.origin[0],
            (self.raster_height - py) * self.resolution + self.origin[1] + self.vertical_offset,
            BASE_LAYER_Z,
        )
    }

    /// Inverse of [`pixel_to_world`][Self::pixel_to_world]; z is ignored.
    pub fn world_to_pixel(&self, point: Point3) -> (f64, f64) {
        let px = (point.x - self.origin[0]) / self.resolution;
        let py = self.raster_height
            - (point.y - self.origin[1] - self.vertical_offset) / self.resolution;
        (px, py)
    }
}

/// Copy of `pose` moved to elevation `z`.
pub fn assign_layer(pose: Point3, z: f64) -> Point3 {
    pose.with_z(z)
}

/// Copy of `pose` with its y component negated.
///
/// Applied to graph-sourced poses only; raster-derived points are already in
/// the world frame.
pub fn flip_y(pose: Point3) -> Point3 {
    Point3::new(pose.x, -pose.y, pose.z)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
