//! Detection graph loading.
//!
//! The graph arrives as node-link JSON (the layout written by `networkx`):
//!
//! ```json
//! {
//!   "directed": false,
//!   "multigraph": false,
//!   "graph": {},
//!   "nodes": [
//!     {"id": 0, "category": "table", "pose": [1.0, 2.0, 0.0],
//!      "children": [{"category": "cup", "pose": [1.2, 2.1]}]}
//!   ],
//!   "links": []
//! }
//! ```
//!
//! Only node attributes matter here; links are parsed away.
//!
//! # Ordering contract
//!
//! [`DetectionGraph::nodes`] yields nodes in the order they appear in the
//! serialized `nodes` array.  Category colors and head-anchor angles are
//! derived from that order, so it is part of the input contract.

use std::fs;
use std::path::Path;

use semmap_perception::transform::{assign_layer, flip_y};
use semmap_types::{LoadError, Point3};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

// ────────────────────────────────────────────────────────────────────────────
// Wire shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct NodeLinkDocument {
    #[serde(default)]
    directed: bool,
    #[serde(default)]
    multigraph: bool,
    nodes: Vec<RawNode>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawNode {
    id: Option<Value>,
    category: Option<String>,
    pose: Option<Vec<f64>>,
    children: Option<Vec<RawChild>>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawChild {
    category: Option<String>,
    pose: Option<Vec<f64>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Public types
// ────────────────────────────────────────────────────────────────────────────

/// How graph poses are brought into the scene frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionFrame {
    /// Elevation given to every detection.
    pub detection_z: f64,
    /// Elevation given to every child detection.
    pub child_z: f64,
    /// Negate y of detection poses.
    pub flip_y: bool,
    /// Negate y of child poses.
    pub flip_child_y: bool,
}

impl Default for DetectionFrame {
    fn default() -> Self {
        Self {
            detection_z: 2.5,
            child_z: 0.0,
            flip_y: true,
            flip_child_y: false,
        }
    }
}

/// A detection owned by a parent node.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildNode {
    pub category: String,
    pub pose: Point3,
}

/// A transformed detection.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionNode {
    /// The node's `id`, or its ordinal position when the id is absent.
    pub id: String,
    pub category: String,
    pub pose: Point3,
    pub children: Vec<ChildNode>,
}

/// A parsed node-link detection graph.
#[derive(Debug, Clone)]
pub struct DetectionGraph {
    directed: bool,
    multigraph: bool,
    nodes: Vec<RawNode>,
}

impl DetectionGraph {
    /// Parse node-link JSON.
    ///
    /// Structural problems (not JSON, no `nodes` array, a non-numeric pose)
    /// fail here.  Missing node attributes are reported when the node is
    /// visited, see [`nodes`][Self::nodes] and
    /// [`transform_all`][Self::transform_all].
    pub fn from_json_str(raw: &str) -> Result<Self, LoadError> {
        let doc: NodeLinkDocument = serde_json::from_str(raw)
            .map_err(|e| LoadError::Graph(format!("invalid node-link document: {e}")))?;
        Ok(Self {
            directed: doc.directed,
            multigraph: doc.multigraph,
            nodes: doc.nodes,
        })
    }

    /// Read and parse a node-link JSON file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        info!(path = %path.display(), "loading detection graph");
        let raw = fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let graph = Self::from_json_str(&raw)?;
        debug!(
            nodes = graph.len(),
            directed = graph.directed,
            multigraph = graph.multigraph,
            "detection graph parsed"
        );
        Ok(graph)
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Lazily transform every node in serialized order.
    ///
    /// Each call starts a fresh pass over the graph.
    pub fn nodes(
        &self,
        frame: DetectionFrame,
    ) -> impl Iterator<Item = Result<DetectionNode, LoadError>> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(move |(ordinal, raw)| transform_node(ordinal, raw, &frame))
    }

    /// Transform every node in one eager pass, stopping at the first
    /// malformed node.
    pub fn transform_all(&self, frame: DetectionFrame) -> Result<Vec<DetectionNode>, LoadError> {
        self.nodes(frame).collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn node_id(ordinal: usize, id: Option<&Value>) -> String {
    match id {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => ordinal.to_string(),
        Some(other) => other.to_string(),
    }
}

fn planar_pose(owner: &str, pose: &[f64]) -> Result<Point3, LoadError> {
    match pose {
        [x, y] => Ok(Point3::new(*x, *y, 0.0)),
        [x, y, z, ..] => Ok(Point3::new(*x, *y, *z)),
        _ => Err(LoadError::Graph(format!(
            "pose of {owner} needs at least 2 components, got {}",
            pose.len()
        ))),
    }
}

fn transform_node(
    ordinal: usize,
    raw: &RawNode,
    frame: &DetectionFrame,
) -> Result<DetectionNode, LoadError> {
    let id = node_id(ordinal, raw.id.as_ref());

    let category = raw.category.clone().ok_or_else(|| LoadError::MissingAttribute {
        node: id.clone(),
        attribute: "category",
    })?;
    let pose = raw.pose.as_deref().ok_or_else(|| LoadError::MissingAttribute {
        node: id.clone(),
        attribute: "pose",
    })?;

    let mut pose = planar_pose(&id, pose)?;
    if frame.flip_y {
        pose = flip_y(pose);
    }
    let pose = assign_layer(pose, frame.detection_z);

    let children = raw
        .children
        .as_deref()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, child)| transform_child(&format!("{id}.children[{i}]"), child, frame))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DetectionNode {
        id,
        category,
        pose,
        children,
    })
}

fn transform_child(
    owner: &str,
    raw: &RawChild,
    frame: &DetectionFrame,
) -> Result<ChildNode, LoadError> {
    let category = raw.category.clone().ok_or_else(|| LoadError::MissingAttribute {
        node: owner.to_string(),
        attribute: "category",
    })?;
    let pose = raw.pose.as_deref().ok_or_else(|| LoadError::MissingAttribute {
        node: owner.to_string(),
        attribute: "pose",
    })?;

    let mut pose = planar_pose(owner, pose)?;
    if frame.flip_child_y {
        pose = flip_y(pose);
    }
    Ok(ChildNode {
        category,
        pose: assign_layer(pose, frame.child_z),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
