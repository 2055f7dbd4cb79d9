//! Spatial indexing for fast position-to-cell lookups
//!
//! This module is only available with the `spatial-index` feature.

use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

use crate::geometry::Point;

/// Wrapper around KD-tree for spatial queries
///
/// Indexes the generating points of the final cells. Because every cell is
/// the Voronoi region of its generating point, the nearest point to a
/// position identifies the cell containing it.
///
/// # Performance
///
/// - Construction: O(n log n)
/// - Query: O(log n)
#[derive(Clone)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, usize, 2, 32>,
}

impl SpatialIndex {
    /// Build spatial index from cell centers
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_map::*;
    ///
    /// let centers = vec![
    ///     Point::new(10.0, 10.0),
    ///     Point::new(90.0, 10.0),
    ///     Point::new(50.0, 90.0),
    /// ];
    ///
    /// let index = SpatialIndex::new(&centers);
    /// assert_eq!(index.find_nearest(Point::new(80.0, 20.0)), 1);
    /// ```
    pub fn new(centers: &[Point]) -> Self {
        let points: Vec<[f64; 2]> = centers.iter().map(|c| [c.x, c.y]).collect();

        Self {
            tree: ImmutableKdTree::new_from_slice(&points),
        }
    }

    /// Find the nearest cell to a position
    ///
    /// Returns the cell ID (index) of the nearest center.
    pub fn find_nearest(&self, position: Point) -> usize {
        let query = [position.x, position.y];
        let result = self.tree.nearest_one::<SquaredEuclidean>(&query);
        result.item as usize
    }
}
