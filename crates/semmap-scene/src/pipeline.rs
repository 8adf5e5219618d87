//! [`ScenePipeline`] – runs every stage in order.
//!
//! ```text
//! transform graph ─► obstacles ─► category index ─► head layout ─► build
//! ```
//!
//! Each stage consumes the complete output of the previous one.  The graph is
//! transformed in a single eager pass, so all input errors surface before any
//! geometry is computed.

use std::path::PathBuf;

use semmap_perception::obstacles::{Bounds2, ObstacleSet};
use semmap_perception::raster::OccupancyMap;
use semmap_perception::transform::CoordinateTransformer;
use semmap_semantic::category::CategoryIndex;
use semmap_semantic::detection::DetectionGraph;
use semmap_semantic::palette::Palette;
use semmap_types::{ConfigError, SceneError};
use tracing::{debug, info};

use crate::builder::SceneGraphBuilder;
use crate::config::SceneConfig;
use crate::layout::CircularLayout;
use crate::scene::SceneDescription;

/// File locations for [`ScenePipeline::run_files`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineInputs {
    /// YAML sidecar with resolution and origin.
    pub map_yaml: PathBuf,
    /// Raster image.  Falls back to the sidecar's `image:` entry.
    pub map_image: Option<PathBuf>,
    /// Node-link detection graph.
    pub graph_json: PathBuf,
}

/// A validated configuration and palette, ready to turn inputs into scenes.
#[derive(Debug, Clone)]
pub struct ScenePipeline {
    config: SceneConfig,
    palette: Palette,
}

impl ScenePipeline {
    /// # Errors
    ///
    /// Any [`ConfigError`] reported by [`SceneConfig::validate`].
    pub fn new(config: SceneConfig, palette: Palette) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, palette })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Build a scene from an already-loaded map and graph.
    pub fn run(
        &self,
        map: &OccupancyMap,
        graph: &DetectionGraph,
    ) -> Result<SceneDescription, SceneError> {
        let nodes = graph.transform_all(self.config.detection_frame())?;

        let transformer =
            CoordinateTransformer::for_map(map).with_vertical_offset(self.config.vertical_offset);
        let obstacles = ObstacleSet::from_map(map, &transformer);
        debug!(
            vertical_offset = transformer.vertical_offset(),
            count = obstacles.len(),
            "obstacles placed"
        );

        let index = CategoryIndex::from_nodes(nodes);
        info!(
            obstacles = obstacles.len(),
            categories = index.len(),
            detections = index.member_count(),
            outside_map = obstacles.bounds().map_or(0, |b| detections_outside(&index, &b)),
            "inputs indexed"
        );

        let layout = CircularLayout::new(
            obstacles.centroid(),
            self.config.spacing,
            self.config.head_z,
        )?;
        let anchors = layout.assign(&index);
        debug!(centre = ?layout.centre(), spacing = layout.spacing(), "head anchors placed");

        let scene = SceneGraphBuilder::new(&self.config, &self.palette).build(
            &obstacles,
            &index,
            &anchors,
        )?;
        info!(
            points = scene.point_count(),
            edges = scene.edge_count(),
            "scene built"
        );
        Ok(scene)
    }

    /// Load the map and graph from disk, then [`run`][Self::run].
    pub fn run_files(&self, inputs: &PipelineInputs) -> Result<SceneDescription, SceneError> {
        let map = match &inputs.map_image {
            Some(image) => OccupancyMap::load(image, &inputs.map_yaml)?,
            None => OccupancyMap::load_from_descriptor(&inputs.map_yaml)?,
        };
        let graph = DetectionGraph::load(&inputs.graph_json)?;
        self.run(&map, &graph)
    }
}

/// Detections whose (x, y) falls outside `bounds`.  A large share usually
/// means the graph and the raster disagree on the y flip or offset.
fn detections_outside(index: &CategoryIndex, bounds: &Bounds2) -> usize {
    index
        .categories()
        .filter_map(|key| index.members(key))
        .flatten()
        .filter(|p| !bounds.contains(**p))
        .count()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
