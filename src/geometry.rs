//! Planar geometry primitives
//!
//! Points are `glam::DVec2`. Rectangles are closed (edges included) and are
//! stored as min/max corners.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A planar point. No identity beyond its value.
pub type Point = DVec2;

/// Axis-aligned closed rectangle
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Lower-left corner
    pub min: Point,
    /// Upper-right corner
    pub max: Point,
}

impl Rect {
    /// Create a rectangle from an origin and a size
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min: DVec2::new(x, y),
            max: DVec2::new(x + width, y + height),
        }
    }

    /// Create a rectangle from its lower and upper corners
    pub fn from_corners(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Smallest rectangle enclosing all points, `None` for an empty slice
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Point {
        (self.min + self.max) * 0.5
    }

    /// True when the rectangle has no positive extent on some axis
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.max.x > self.min.x && self.max.y > self.min.y)
    }

    /// True when every coordinate is finite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Point containment, edges included
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Overlap test, touching edges count as intersecting
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Grow the rectangle by `margin` on all four sides
    pub fn expand(&self, margin: f64) -> Self {
        let m = DVec2::splat(margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// True when the point lies exactly on one of the four edges
    pub fn on_border(&self, p: Point) -> bool {
        self.contains(p)
            && (p.x == self.min.x || p.x == self.max.x || p.y == self.min.y || p.y == self.max.y)
    }

    /// The four corners, counter-clockwise from `min`
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            DVec2::new(self.max.x, self.min.y),
            self.max,
            DVec2::new(self.min.x, self.max.y),
        ]
    }
}

/// Arithmetic mean of a polygon's vertices
///
/// This is the cheap centroid approximation used by relaxation. It is not
/// area-weighted, so it is biased toward densely-vertexed sides.
pub fn vertex_average(polygon: &[Point]) -> Option<Point> {
    if polygon.is_empty() {
        return None;
    }
    let sum: DVec2 = polygon.iter().copied().sum();
    Some(sum / polygon.len() as f64)
}

/// Unsigned polygon area (shoelace formula)
pub fn polygon_area(polygon: &[Point]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let twice: f64 = polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .map(|(a, b)| a.perp_dot(*b))
        .sum();
    twice.abs() * 0.5
}
