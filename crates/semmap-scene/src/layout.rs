//! Circular head-anchor layout.
//!
//! Category `i` of `n` gets its head at angle `2πi/n` on a circle of radius
//! `spacing` around the obstacle centroid:
//!
//! ```text
//! head_i = (cx + spacing·cos θ_i, cy + spacing·sin θ_i, head_z)
//! ```
//!
//! # Example
//!
//! ```rust
//! use semmap_scene::layout::CircularLayout;
//!
//! let layout = CircularLayout::new((0.0, 0.0), 30.0, 5.0).unwrap();
//! let heads = layout.place(3);
//! assert!((heads[0].x - 30.0).abs() < 1e-9);
//! assert!((heads[1].x + 15.0).abs() < 1e-9);
//! ```

use std::f64::consts::TAU;

use semmap_semantic::category::CategoryIndex;
use semmap_types::{ConfigError, Point3};

/// A category's head position.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadAnchor {
    pub category: String,
    pub position: Point3,
}

/// Evenly spaced anchors on a circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularLayout {
    centre: (f64, f64),
    spacing: f64,
    head_z: f64,
}

impl CircularLayout {
    /// # Errors
    ///
    /// [`ConfigError::NegativeSpacing`] when `spacing` is negative or not
    /// finite.
    pub fn new(centre: (f64, f64), spacing: f64, head_z: f64) -> Result<Self, ConfigError> {
        if !(spacing.is_finite() && spacing >= 0.0) {
            return Err(ConfigError::NegativeSpacing(spacing));
        }
        Ok(Self {
            centre,
            spacing,
            head_z,
        })
    }

    pub fn centre(&self) -> (f64, f64) {
        self.centre
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Angle of slot `index` out of `count`.
    pub fn angle(index: usize, count: usize) -> f64 {
        TAU * index as f64 / count as f64
    }

    /// `count` anchor positions, starting due east and going counter-clockwise.
    pub fn place(&self, count: usize) -> Vec<Point3> {
        (0..count)
            .map(|i| {
                let (sin, cos) = Self::angle(i, count).sin_cos();
                Point3::new(
                    self.centre.0 + self.spacing * cos,
                    self.centre.1 + self.spacing * sin,
                    self.head_z,
                )
            })
            .collect()
    }

    /// One anchor per category, in the index's first-occurrence order.
    pub fn assign(&self, index: &CategoryIndex) -> Vec<HeadAnchor> {
        index
            .categories()
            .zip(self.place(index.len()))
            .map(|(category, position)| HeadAnchor {
                category: category.to_string(),
                position,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semmap_semantic::detection::DetectionNode;

    fn layout(spacing: f64) -> CircularLayout {
        CircularLayout::new((0.0, 0.0), spacing, 5.0).unwrap()
    }

    #[test]
    fn no_categories_no_anchors() {
        assert!(layout(30.0).place(0).is_empty());
    }

    #[test]
    fn single_anchor_sits_due_east() {
        let heads = CircularLayout::new((3.0, -2.0), 10.0, 5.0).unwrap().place(1);
        assert_eq!(heads.len(), 1);
        assert!((heads[0].x - 13.0).abs() < 1e-12);
        assert!((heads[0].y + 2.0).abs() < 1e-12);
        assert_eq!(heads[0].z, 5.0);
    }

    #[test]
    fn three_categories_at_thirds_of_a_turn() {
        let heads = layout(30.0).place(3);
        let expected = [(30.0, 0.0), (-15.0, 25.980762), (-15.0, -25.980762)];
        for (h, (x, y)) in heads.iter().zip(expected) {
            assert!((h.x - x).abs() < 1e-5, "x {} vs {x}", h.x);
            assert!((h.y - y).abs() < 1e-5, "y {} vs {y}", h.y);
            assert_eq!(h.z, 5.0);
        }
    }

    #[test]
    fn anchors_are_equidistant_and_evenly_separated() {
        let centre = (12.5, -7.25);
        for n in 1..=12 {
            let heads = CircularLayout::new(centre, 50.0, 5.0).unwrap().place(n);
            assert_eq!(heads.len(), n);
            let angles: Vec<f64> = heads
                .iter()
                .map(|h| {
                    let r = (h.x - centre.0).hypot(h.y - centre.1);
                    assert!((r - 50.0).abs() < 1e-9, "radius {r} for n={n}");
                    (h.y - centre.1).atan2(h.x - centre.0).rem_euclid(TAU)
                })
                .collect();
            for i in 1..n {
                let gap = angles[i] - angles[i - 1];
                assert!((gap - TAU / n as f64).abs() < 1e-9, "gap {gap} for n={n}");
            }
        }
    }

    #[test]
    fn negative_spacing_is_config_error() {
        assert_eq!(
            CircularLayout::new((0.0, 0.0), -5.0, 5.0),
            Err(ConfigError::NegativeSpacing(-5.0))
        );
    }

    #[test]
    fn assign_follows_first_occurrence_order() {
        let node = |c: &str| DetectionNode {
            id: c.into(),
            category: c.into(),
            pose: Point3::zero(),
            children: Vec::new(),
        };
        let index = CategoryIndex::from_nodes([node("table"), node("chair"), node("lamp")]);
        let anchors = layout(30.0).assign(&index);
        let keys: Vec<_> = anchors.iter().map(|a| a.category.as_str()).collect();
        assert_eq!(keys, vec!["table", "chair", "lamp"]);
        assert!((anchors[0].position.x - 30.0).abs() < 1e-12);
        assert!(anchors[1].position.y > 0.0);
        assert!(anchors[2].position.y < 0.0);
    }
}
