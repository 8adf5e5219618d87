//! Scene description handed to a renderer.
//!
//! Everything here is plain data: point sets, labeled points and line
//! segments, each with its own color and a flag saying whether it belongs in
//! the legend.  The layout is serializable so that an out-of-process renderer
//! can consume it; [`SceneDescription::json_schema`] documents the shape.

use schemars::JsonSchema;
use schemars::schema::RootSchema;
use semmap_types::Point3;
use serde::{Deserialize, Serialize};

/// Marker shape for a point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSymbol {
    Circle,
    Square,
    Diamond,
}

/// A group of points drawn with one style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PointSet {
    /// Legend entry, when the set has one.
    pub name: Option<String>,
    /// Text drawn next to the points.
    pub label: Option<String>,
    pub points: Vec<Point3>,
    pub color: String,
    pub symbol: MarkerSymbol,
    pub size: f64,
    pub show_in_legend: bool,
}

/// What a connector joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Category head anchor to one of its members.
    HeadToMember,
    /// The same member on two z-layers.
    Vertical,
    /// A parent detection to one of its children.
    ParentToChild,
}

/// A straight line segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Edge {
    pub kind: EdgeKind,
    pub from: Point3,
    pub to: Point3,
    pub color: String,
    pub width: f64,
}

/// Everything drawn for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryScene {
    /// Category key as it appears in the detection graph.
    pub key: String,
    /// Display label.
    pub label: String,
    pub color: String,
    /// Palette slot the color came from.
    pub color_index: usize,
    /// Head anchor, drawn as a labeled legend entry.
    pub head: PointSet,
    /// Member clusters, one per configured layer.
    pub clusters: Vec<PointSet>,
    /// Child detections, one set per child.
    pub children: Vec<PointSet>,
    pub edges: Vec<Edge>,
}

impl CategoryScene {
    /// Position of the head anchor.
    pub fn head_position(&self) -> Option<Point3> {
        self.head.points.first().copied()
    }
}

/// Suggested x/y ranges for the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ViewBox {
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
}

/// The assembled scene.  Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneDescription {
    pub obstacles: PointSet,
    /// Categories in first-occurrence order.
    pub categories: Vec<CategoryScene>,
    /// Padded obstacle bounds; absent when there are no obstacles.
    pub view: Option<ViewBox>,
}

impl SceneDescription {
    /// Every edge of every category, in category order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.categories.iter().flat_map(|c| c.edges.iter())
    }

    pub fn edge_count(&self) -> usize {
        self.categories.iter().map(|c| c.edges.len()).sum()
    }

    /// Number of points across all point sets, obstacles included.
    pub fn point_count(&self) -> usize {
        self.obstacles.points.len()
            + self
                .categories
                .iter()
                .map(|c| {
                    c.head.points.len()
                        + c.clusters.iter().map(|s| s.points.len()).sum::<usize>()
                        + c.children.iter().map(|s| s.points.len()).sum::<usize>()
                })
                .sum::<usize>()
    }

    /// Look up a category by key.
    pub fn category(&self, key: &str) -> Option<&CategoryScene> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// JSON schema of the serialized scene.
    pub fn json_schema() -> RootSchema {
        schemars::schema_for!(SceneDescription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(points: Vec<Point3>) -> PointSet {
        PointSet {
            name: None,
            label: None,
            points,
            color: "black".into(),
            symbol: MarkerSymbol::Circle,
            size: 1.0,
            show_in_legend: false,
        }
    }

    fn edge() -> Edge {
        Edge {
            kind: EdgeKind::Vertical,
            from: Point3::new(0.0, 0.0, 2.5),
            to: Point3::new(0.0, 0.0, 0.0),
            color: "red".into(),
            width: 0.5,
        }
    }

    #[test]
    fn counts_cover_every_primitive() {
        let scene = SceneDescription {
            obstacles: set(vec![Point3::zero(); 3]),
            categories: vec![CategoryScene {
                key: "lamp".into(),
                label: "Lamp".into(),
                color: "red".into(),
                color_index: 0,
                head: set(vec![Point3::new(30.0, 0.0, 5.0)]),
                clusters: vec![set(vec![Point3::zero(); 2]), set(vec![Point3::zero(); 2])],
                children: vec![set(vec![Point3::zero()])],
                edges: vec![edge(), edge()],
            }],
            view: None,
        };
        assert_eq!(scene.point_count(), 3 + 1 + 4 + 1);
        assert_eq!(scene.edge_count(), 2);
        assert_eq!(scene.edges().count(), 2);
        assert_eq!(
            scene.category("lamp").and_then(|c| c.head_position()),
            Some(Point3::new(30.0, 0.0, 5.0))
        );
        assert!(scene.category("sofa").is_none());
    }

    #[test]
    fn enums_use_renderer_friendly_names() {
        assert_eq!(
            serde_json::to_string(&EdgeKind::HeadToMember).unwrap(),
            "\"head_to_member\""
        );
        assert_eq!(
            serde_json::to_string(&MarkerSymbol::Diamond).unwrap(),
            "\"diamond\""
        );
    }

    #[test]
    fn schema_names_top_level_fields() {
        let schema = serde_json::to_value(SceneDescription::json_schema()).unwrap();
        let props = &schema["properties"];
        assert!(props.get("obstacles").is_some());
        assert!(props.get("categories").is_some());
        assert!(props.get("view").is_some());
    }
}
