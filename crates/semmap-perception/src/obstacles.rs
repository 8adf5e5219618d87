//! Obstacle point cloud extracted from an occupancy raster.

use semmap_types::Point3;
use tracing::debug;

use crate::raster::OccupancyMap;
use crate::transform::CoordinateTransformer;

// ────────────────────────────────────────────────────────────────────────────
// Bounds2
// ────────────────────────────────────────────────────────────────────────────

/// Planar axis-aligned bounds, defined by their minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2 {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds2 {
    /// Smallest bounds containing every point, or `None` for no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let seed = Self {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(iter.fold(seed, |b, p| Self {
            min_x: b.min_x.min(p.x),
            max_x: b.max_x.max(p.x),
            min_y: b.min_y.min(p.y),
            max_y: b.max_y.max(p.y),
        }))
    }

    /// Midpoint of each axis' extent.
    pub fn centre(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Bounds grown by `margin` on every side.
    pub fn padded(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            max_x: self.max_x + margin,
            min_y: self.min_y - margin,
            max_y: self.max_y + margin,
        }
    }

    /// True when the point's (x, y) lies inside or on the boundary.
    pub fn contains(&self, p: Point3) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ObstacleSet
// ────────────────────────────────────────────────────────────────────────────

/// World-space obstacle points on the base layer, in raster scan order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObstacleSet {
    points: Vec<Point3>,
}

impl ObstacleSet {
    /// Convert every obstacle cell of `map` to world coordinates.
    pub fn from_map(map: &OccupancyMap, transformer: &CoordinateTransformer) -> Self {
        let points: Vec<Point3> = map
            .obstacle_pixels()
            .map(|(px, py)| transformer.pixel_to_world(f64::from(px), f64::from(py)))
            .collect();
        debug!(count = points.len(), "obstacle cells extracted");
        Self { points }
    }

    pub fn from_points(points: Vec<Point3>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Planar bounds, `None` when there are no obstacles.
    pub fn bounds(&self) -> Option<Bounds2> {
        Bounds2::from_points(&self.points)
    }

    /// Centre of the bounds; the world origin for an empty set.
    pub fn centroid(&self) -> (f64, f64) {
        self.bounds().map_or((0.0, 0.0), |b| b.centre())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{FREE_CELL, MapMetadata, UNKNOWN_CELL};

    fn map_4x4_with_single_obstacle() -> OccupancyMap {
        let mut cells = vec![FREE_CELL; 16];
        cells[0] = UNKNOWN_CELL;
        cells[15] = UNKNOWN_CELL;
        cells[4 + 2] = 128; // (2, 1)
        OccupancyMap::from_cells(4, 4, cells, MapMetadata::new(1.0, [0.0, 0.0]).unwrap()).unwrap()
    }

    #[test]
    fn single_obstacle_lands_at_expected_world_point() {
        let map = map_4x4_with_single_obstacle();
        let set = ObstacleSet::from_map(&map, &CoordinateTransformer::for_map(&map));
        assert_eq!(set.points(), &[Point3::new(2.0, 3.0, 0.0)]);
    }

    #[test]
    fn every_obstacle_sits_on_base_layer() {
        let cells: Vec<u8> = (0..=255).collect();
        let map =
            OccupancyMap::from_cells(16, 16, cells, MapMetadata::new(0.1, [5.0, 5.0]).unwrap())
                .unwrap();
        let tf = CoordinateTransformer::for_map(&map).with_vertical_offset(1.7);
        let set = ObstacleSet::from_map(&map, &tf);
        assert_eq!(set.len(), 254);
        assert!(set.points().iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn bounds_and_centroid() {
        let set = ObstacleSet::from_points(vec![
            Point3::new(-2.0, 1.0, 0.0),
            Point3::new(4.0, 3.0, 0.0),
            Point3::new(0.0, -5.0, 0.0),
        ]);
        let b = set.bounds().unwrap();
        assert_eq!((b.min_x, b.max_x, b.min_y, b.max_y), (-2.0, 4.0, -5.0, 3.0));
        assert_eq!(set.centroid(), (1.0, -1.0));
    }

    #[test]
    fn empty_set_has_no_bounds_and_origin_centroid() {
        let set = ObstacleSet::default();
        assert!(set.is_empty());
        assert!(set.bounds().is_none());
        assert_eq!(set.centroid(), (0.0, 0.0));
    }

    #[test]
    fn padded_bounds_contain_original_points() {
        let set = ObstacleSet::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ]);
        let view = set.bounds().unwrap().padded(10.0);
        assert_eq!((view.min_x, view.max_y), (-10.0, 11.0));
        assert!(view.contains(Point3::new(-9.5, 10.5, 3.0)));
        assert!(!view.contains(Point3::new(-10.5, 0.0, 0.0)));
    }
}
