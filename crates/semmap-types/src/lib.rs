//! `semmap-types` – shared vocabulary for the SemMap workspace.
//!
//! Holds the world-space [`Point3`] every stage passes around and the error
//! taxonomy that the loaders, the configuration layer and the scene builder
//! report through.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// Create a new point.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Same (x, y) position, different elevation.
    pub fn with_z(self, z: f64) -> Self {
        Self::new(self.x, self.y, z)
    }

    /// Euclidean distance in the x/y plane, ignoring elevation.
    pub fn planar_distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Malformed or missing input: raster, map metadata, palette or graph.
///
/// Always fatal; the pipeline aborts before any geometry is computed.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("raster error: {0}")]
    Raster(String),

    #[error("map metadata error: {0}")]
    Metadata(String),

    #[error("palette error: {0}")]
    Palette(String),

    #[error("detection graph error: {0}")]
    Graph(String),

    #[error("detection node {node} is missing the '{attribute}' attribute")]
    MissingAttribute { node: String, attribute: &'static str },
}

/// A configuration value that can never produce a valid scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("resolution must be positive and finite, got {0}")]
    NonPositiveResolution(f64),

    #[error("palette must contain at least one color")]
    EmptyPalette,

    #[error("palette lists color '{0}' more than once")]
    DuplicateColor(String),

    #[error("head spacing must be non-negative and finite, got {0}")]
    NegativeSpacing(f64),

    #[error("invalid scene setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Internal wiring violation between the category index and the builder.
///
/// Unreachable when the index is built by the pipeline itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("category '{0}' is not registered in the category index")]
    UnregisteredCategory(String),

    #[error("expected {expected} head anchors, got {actual}")]
    AnchorCountMismatch { expected: usize, actual: usize },

    #[error("category '{0}' has no head anchor")]
    MissingAnchor(String),
}

/// Top-level error returned by the scene pipeline.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("render error: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_with_z_keeps_plane_position() {
        let p = Point3::new(1.5, -2.0, 7.0).with_z(2.5);
        assert_eq!(p, Point3::new(1.5, -2.0, 2.5));
    }

    #[test]
    fn planar_distance_ignores_z() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 100.0);
        assert!((a.planar_distance(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn point_serialization_roundtrip() {
        let p = Point3::new(2.0, 3.0, 0.0);
        let json = serde_json::to_string(&p).unwrap();
        let back: Point3 = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn scene_error_wraps_each_class() {
        let err: SceneError = ConfigError::EmptyPalette.into();
        assert!(err.to_string().contains("config error"));

        let err: SceneError = BuildError::UnregisteredCategory("lamp".into()).into();
        assert!(err.to_string().contains("lamp"));

        let err: SceneError = LoadError::MissingAttribute {
            node: "7".into(),
            attribute: "pose",
        }
        .into();
        assert!(err.to_string().contains("'pose'"));
        assert!(matches!(err, SceneError::Load(_)));
    }
}
