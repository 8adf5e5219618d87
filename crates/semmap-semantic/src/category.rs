//! Category index.
//!
//! Groups detections by category in **first-occurrence order**: the first
//! time a category key is seen it is appended to the order, and its position
//! in that order is its ordinal for the rest of the run.  The ordinal selects
//! the palette color and the head-anchor angle, so both stay consistent with
//! each other for any given traversal of the detection graph.
//!
//! The index has a single writer ([`register`][CategoryIndex::register],
//! called once per node during one pass) and is only read afterwards.
//!
//! # Example
//!
//! ```rust
//! use semmap_semantic::category::CategoryIndex;
//! use semmap_semantic::detection::DetectionNode;
//! use semmap_types::Point3;
//!
//! let node = |cat: &str| DetectionNode {
//!     id: cat.to_string(),
//!     category: cat.to_string(),
//!     pose: Point3::zero(),
//!     children: Vec::new(),
//! };
//!
//! let index = CategoryIndex::from_nodes([node("chair"), node("table"), node("chair")]);
//! assert_eq!(index.categories().collect::<Vec<_>>(), vec!["chair", "table"]);
//! assert_eq!(index.members("chair").unwrap().len(), 2);
//! ```

use std::collections::HashMap;

use semmap_types::Point3;

use crate::detection::{ChildNode, DetectionNode};
use crate::palette::Palette;

/// A detection that owns children, kept with its transformed pose.
#[derive(Debug, Clone, PartialEq)]
pub struct Family {
    pub parent_id: String,
    pub parent: Point3,
    pub children: Vec<ChildNode>,
}

#[derive(Debug, Clone, PartialEq)]
struct CategoryEntry {
    key: String,
    members: Vec<Point3>,
    families: Vec<Family>,
}

/// Detections grouped by category, in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryIndex {
    entries: Vec<CategoryEntry>,
    positions: HashMap<String, usize>,
}

impl CategoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from already-transformed nodes in one pass.
    pub fn from_nodes(nodes: impl IntoIterator<Item = DetectionNode>) -> Self {
        let mut index = Self::new();
        for node in nodes {
            index.register(node);
        }
        index
    }

    /// Add one detection.
    ///
    /// A category seen for the first time is appended to the order, which
    /// fixes its color and its head-anchor angle.
    pub fn register(&mut self, node: DetectionNode) {
        let slot = match self.positions.get(&node.category) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.positions.insert(node.category.clone(), slot);
                self.entries.push(CategoryEntry {
                    key: node.category,
                    members: Vec::new(),
                    families: Vec::new(),
                });
                slot
            }
        };

        let entry = &mut self.entries[slot];
        entry.members.push(node.pose);
        if !node.children.is_empty() {
            entry.families.push(Family {
                parent_id: node.id,
                parent: node.pose,
                children: node.children,
            });
        }
    }

    /// Number of distinct categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Category keys in first-occurrence order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Position of `category` in first-occurrence order.
    pub fn index_of(&self, category: &str) -> Option<usize> {
        self.positions.get(category).copied()
    }

    /// Member poses of `category`, in registration order.
    pub fn members(&self, category: &str) -> Option<&[Point3]> {
        self.entry(category).map(|e| e.members.as_slice())
    }

    /// Detections of `category` that carry children.
    pub fn families(&self, category: &str) -> Option<&[Family]> {
        self.entry(category).map(|e| e.families.as_slice())
    }

    /// Pose of the first detection registered under `category`.
    pub fn first_pose(&self, category: &str) -> Option<Point3> {
        self.members(category).and_then(|m| m.first().copied())
    }

    /// Total number of registered detections.
    pub fn member_count(&self) -> usize {
        self.entries.iter().map(|e| e.members.len()).sum()
    }

    /// Palette slot of `category`.
    pub fn color_index_for(&self, category: &str, palette: &Palette) -> Option<usize> {
        self.index_of(category).map(|i| palette.index_for(i))
    }

    /// Palette color of `category`.
    pub fn color_for<'p>(&self, category: &str, palette: &'p Palette) -> Option<&'p str> {
        self.index_of(category).map(|i| palette.color(i))
    }

    fn entry(&self, category: &str) -> Option<&CategoryEntry> {
        self.index_of(category).map(|i| &self.entries[i])
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, category: &str, x: f64) -> DetectionNode {
        DetectionNode {
            id: id.to_string(),
            category: category.to_string(),
            pose: Point3::new(x, 0.0, 2.5),
            children: Vec::new(),
        }
    }

    fn palette(colors: &[&str]) -> Palette {
        Palette::new(colors.iter().map(|c| c.to_string()).collect()).unwrap()
    }

    #[test]
    fn order_follows_first_occurrence() {
        let index = CategoryIndex::from_nodes([
            node("0", "table", 0.0),
            node("1", "chair", 1.0),
            node("2", "table", 2.0),
            node("3", "lamp", 3.0),
            node("4", "chair", 4.0),
        ]);
        assert_eq!(
            index.categories().collect::<Vec<_>>(),
            vec!["table", "chair", "lamp"]
        );
        assert_eq!(index.index_of("lamp"), Some(2));
        assert_eq!(index.index_of("sofa"), None);
        assert_eq!(index.member_count(), 5);
    }

    #[test]
    fn members_keep_registration_order() {
        let index = CategoryIndex::from_nodes([
            node("0", "table", 5.0),
            node("1", "chair", 1.0),
            node("2", "table", -3.0),
        ]);
        let xs: Vec<_> = index.members("table").unwrap().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![5.0, -3.0]);
        assert_eq!(index.first_pose("table"), Some(Point3::new(5.0, 0.0, 2.5)));
        assert_eq!(index.first_pose("sofa"), None);
    }

    #[test]
    fn colors_cycle_in_first_occurrence_order() {
        let cats = ["a", "b", "c", "d", "e"];
        let index = CategoryIndex::from_nodes(
            cats.iter().enumerate().map(|(i, c)| node(&i.to_string(), c, 0.0)),
        );
        let p = palette(&["red", "blue"]);
        let slots: Vec<_> = cats
            .iter()
            .map(|c| index.color_index_for(c, &p).unwrap())
            .collect();
        assert_eq!(slots, vec![0, 1, 0, 1, 0]);
        assert_eq!(index.color_for("d", &p), Some("blue"));
    }

    #[test]
    fn permuting_first_occurrences_permutes_colors() {
        let p = palette(&["red", "green", "blue"]);
        let forward = CategoryIndex::from_nodes([
            node("0", "table", 0.0),
            node("1", "chair", 0.0),
            node("2", "lamp", 0.0),
        ]);
        let reversed = CategoryIndex::from_nodes([
            node("2", "lamp", 0.0),
            node("1", "chair", 0.0),
            node("0", "table", 0.0),
        ]);
        assert_eq!(forward.color_for("table", &p), Some("red"));
        assert_eq!(reversed.color_for("table", &p), Some("blue"));
        assert_eq!(forward.color_for("chair", &p), reversed.color_for("chair", &p));
    }

    #[test]
    fn rebuilding_from_same_input_is_identical() {
        let nodes = || {
            vec![
                node("0", "table", 0.0),
                node("1", "chair", 1.0),
                node("2", "table", 2.0),
            ]
        };
        assert_eq!(CategoryIndex::from_nodes(nodes()), CategoryIndex::from_nodes(nodes()));
    }

    #[test]
    fn families_record_only_nodes_with_children() {
        let mut parent = node("7", "desk", 1.0);
        parent.children.push(ChildNode {
            category: "pen".into(),
            pose: Point3::new(1.1, 0.2, 0.0),
        });
        let index = CategoryIndex::from_nodes([parent, node("8", "desk", 2.0)]);
        let families = index.families("desk").unwrap();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].parent_id, "7");
        assert_eq!(families[0].parent, Point3::new(1.0, 0.0, 2.5));
        assert_eq!(families[0].children[0].category, "pen");
    }

    #[test]
    fn empty_index() {
        let index = CategoryIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.categories().count(), 0);
        assert_eq!(index.member_count(), 0);
    }
}
