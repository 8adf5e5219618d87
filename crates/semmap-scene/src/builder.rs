//! [`SceneGraphBuilder`] – assembles the [`SceneDescription`].
//!
//! For every category, in first-occurrence order, the builder emits
//!
//! 1. a labeled head point at the category's [`HeadAnchor`],
//! 2. one member cluster per configured [`MemberLayer`][crate::config::MemberLayer],
//! 3. head → member edges on every layer with `link_head`,
//! 4. member vertical edges between the two layers of `vertical_link`,
//! 5. child points and parent → child edges when `include_children` is set.
//!
//! Building is a pure function of its inputs.

use semmap_perception::obstacles::ObstacleSet;
use semmap_perception::transform::assign_layer;
use semmap_semantic::category::CategoryIndex;
use semmap_semantic::palette::Palette;
use semmap_types::{BuildError, Point3};
use tracing::debug;

use crate::config::SceneConfig;
use crate::layout::HeadAnchor;
use crate::scene::{CategoryScene, Edge, EdgeKind, MarkerSymbol, PointSet, SceneDescription, ViewBox};

const OBSTACLE_LEGEND: &str = "Occupancy Map";
const OBSTACLE_COLOR: &str = "black";
const OBSTACLE_SIZE: f64 = 1.0;
const HEAD_SIZE: f64 = 10.0;
const CHILD_SIZE: f64 = 5.0;

/// Turns the outputs of the earlier stages into a [`SceneDescription`].
pub struct SceneGraphBuilder<'a> {
    config: &'a SceneConfig,
    palette: &'a Palette,
}

impl<'a> SceneGraphBuilder<'a> {
    pub fn new(config: &'a SceneConfig, palette: &'a Palette) -> Self {
        Self { config, palette }
    }

    /// Build the scene.
    ///
    /// # Errors
    ///
    /// [`BuildError`] when `anchors` does not line up one-to-one with the
    /// categories of `index`.
    pub fn build(
        &self,
        obstacles: &ObstacleSet,
        index: &CategoryIndex,
        anchors: &[HeadAnchor],
    ) -> Result<SceneDescription, BuildError> {
        let ordered = order_anchors(index, anchors)?;

        let mut categories = Vec::with_capacity(index.len());
        for (key, head) in index.categories().zip(ordered) {
            categories.push(self.category_scene(index, key, head)?);
        }

        let view = obstacles.bounds().map(|b| {
            let padded = b.padded(self.config.view_margin);
            ViewBox {
                x_range: [padded.min_x, padded.max_x],
                y_range: [padded.min_y, padded.max_y],
            }
        });

        let scene = SceneDescription {
            obstacles: PointSet {
                name: Some(OBSTACLE_LEGEND.to_string()),
                label: None,
                points: obstacles.points().to_vec(),
                color: OBSTACLE_COLOR.to_string(),
                symbol: MarkerSymbol::Circle,
                size: OBSTACLE_SIZE,
                show_in_legend: true,
            },
            categories,
            view,
        };
        debug!(
            categories = scene.categories.len(),
            points = scene.point_count(),
            edges = scene.edge_count(),
            "scene assembled"
        );
        Ok(scene)
    }

    fn category_scene(
        &self,
        index: &CategoryIndex,
        key: &str,
        head: Point3,
    ) -> Result<CategoryScene, BuildError> {
        let unregistered = || BuildError::UnregisteredCategory(key.to_string());
        let members = index.members(key).ok_or_else(unregistered)?;
        let color = index
            .color_for(key, self.palette)
            .ok_or_else(unregistered)?
            .to_string();
        let color_index = index
            .color_index_for(key, self.palette)
            .ok_or_else(unregistered)?;
        let label = display_label(key);
        let width = self.config.edge_width;
        let mut edges = Vec::new();

        let mut clusters = Vec::with_capacity(self.config.layers.len());
        for layer in &self.config.layers {
            let points: Vec<Point3> = members.iter().map(|p| assign_layer(*p, layer.z)).collect();
            if layer.link_head {
                edges.extend(points.iter().map(|p| Edge {
                    kind: EdgeKind::HeadToMember,
                    from: head,
                    to: *p,
                    color: color.clone(),
                    width,
                }));
            }
            if !points.is_empty() {
                clusters.push(PointSet {
                    name: None,
                    label: None,
                    points,
                    color: color.clone(),
                    symbol: layer.symbol,
                    size: layer.size,
                    show_in_legend: false,
                });
            }
        }

        let layer_z = |i: usize| self.config.layers.get(i).map(|l| l.z);
        if let Some(pair) = self.config.vertical_link
            && let (Some(upper), Some(lower)) = (layer_z(pair.upper), layer_z(pair.lower))
        {
            edges.extend(members.iter().map(|p| Edge {
                kind: EdgeKind::Vertical,
                from: assign_layer(*p, upper),
                to: assign_layer(*p, lower),
                color: color.clone(),
                width,
            }));
        }

        let mut children = Vec::new();
        if self.config.include_children {
            for family in index.families(key).unwrap_or_default() {
                for child in &family.children {
                    children.push(PointSet {
                        name: Some(child.category.clone()),
                        label: None,
                        points: vec![child.pose],
                        color: color.clone(),
                        symbol: MarkerSymbol::Diamond,
                        size: CHILD_SIZE,
                        show_in_legend: false,
                    });
                    edges.push(Edge {
                        kind: EdgeKind::ParentToChild,
                        from: family.parent,
                        to: child.pose,
                        color: color.clone(),
                        width,
                    });
                }
            }
        }

        Ok(CategoryScene {
            key: key.to_string(),
            head: PointSet {
                name: Some(label.clone()),
                label: Some(label.clone()),
                points: vec![head],
                color: color.clone(),
                symbol: MarkerSymbol::Circle,
                size: HEAD_SIZE,
                show_in_legend: true,
            },
            label,
            color,
            color_index,
            clusters,
            children,
            edges,
        })
    }
}

/// Head positions in the index's category order.
fn order_anchors(index: &CategoryIndex, anchors: &[HeadAnchor]) -> Result<Vec<Point3>, BuildError> {
    if anchors.len() != index.len() {
        return Err(BuildError::AnchorCountMismatch {
            expected: index.len(),
            actual: anchors.len(),
        });
    }

    let mut slots: Vec<Option<Point3>> = vec![None; index.len()];
    for anchor in anchors {
        let ordinal = index
            .index_of(&anchor.category)
            .ok_or_else(|| BuildError::UnregisteredCategory(anchor.category.clone()))?;
        slots[ordinal] = Some(anchor.position);
    }

    index
        .categories()
        .zip(slots)
        .map(|(key, slot)| slot.ok_or_else(|| BuildError::MissingAnchor(key.to_string())))
        .collect()
}

/// First letter upper-cased, the rest lower-cased.
fn display_label(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
