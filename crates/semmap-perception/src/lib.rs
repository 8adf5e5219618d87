//! `semmap-perception` – occupancy raster side of the scene pipeline.
//!
//! Turns a grayscale occupancy map and its sidecar descriptor into world-space
//! obstacle points.
//!
//! # Modules
//!
//! - [`raster`] – [`OccupancyMap`][raster::OccupancyMap]: the loaded raster
//!   plus its [`MapMetadata`][raster::MapMetadata] (resolution, origin) and
//!   the free/unknown cell classification.
//! - [`transform`] – [`CoordinateTransformer`][transform::CoordinateTransformer]:
//!   pixel ↔ world conversion, z-layer assignment and the y-axis flip used to
//!   reconcile graph poses with the raster frame.
//! - [`obstacles`] – [`ObstacleSet`][obstacles::ObstacleSet]: the obstacle
//!   point cloud and its planar [`Bounds2`][obstacles::Bounds2].

pub mod obstacles;
pub mod raster;
pub mod transform;

pub use obstacles::{Bounds2, ObstacleSet};
pub use raster::{FREE_CELL, MapMetadata, OccupancyMap, UNKNOWN_CELL, is_obstacle};
pub use transform::{CoordinateTransformer, assign_layer, flip_y};
