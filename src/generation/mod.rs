//! Core map generation algorithm
//!
//! Samples seeded points, tessellates them into bounded Voronoi cells,
//! relaxes the cells with Lloyd's algorithm and finally builds the shared
//! corner graph and the cell neighbor graph.

mod corners;
mod lloyd;
mod neighbors;
mod points;
mod tessellation;

pub use corners::build_corner_graph;
pub use lloyd::{lloyd_relaxation, relax_once, relaxed_points, LloydOptions, Relaxed};
pub use neighbors::{build_neighbor_graph, NeighborStrategy};
pub use points::{sample_points, seed_from_str, PointSampler};
pub use tessellation::{tessellate_checked, validate_sites, ClippedVoronoi, Polygon, Tessellator};

use crate::cell::Cell;
use crate::error::Result;
use crate::geometry::{Point, Rect};

/// One tessellation snapshot: generating points and the cells built from them
///
/// Cell `i` is generated by `points[i]`. A pass is never patched in place;
/// relaxation produces a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct TessellationPass {
    pub points: Vec<Point>,
    pub cells: Vec<Cell>,
}

/// Tessellate `points` and wrap every polygon in a fresh cell
///
/// Cells carry no corners or neighbors yet.
pub fn tessellate_pass<T>(tessellator: &T, points: Vec<Point>, bounds: Rect) -> Result<TessellationPass>
where
    T: Tessellator + ?Sized,
{
    let polygons = tessellate_checked(tessellator, &points, bounds)?;

    let cells = points
        .iter()
        .zip(polygons)
        .enumerate()
        .map(|(id, (&center, boundary))| Cell::new(id, center, boundary))
        .collect();

    Ok(TessellationPass { points, cells })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tessellate_pass() {
        let domain = Rect::new(0.0, 0.0, 100.0, 100.0);
        let points = sample_points(42, domain, 25).unwrap();
        let pass = tessellate_pass(&ClippedVoronoi::default(), points.clone(), domain).unwrap();

        assert_eq!(pass.points, points);
        assert_eq!(pass.cells.len(), 25);
        for (i, cell) in pass.cells.iter().enumerate() {
            assert_eq!(cell.id, i);
            assert_eq!(cell.center, points[i]);
            assert!(cell.boundary.len() >= 3, "Cell should have at least 3 vertices");
            assert!(cell.corners.is_empty());
            assert!(cell.neighbors.is_empty());
        }
    }

    #[test]
    fn test_tessellate_pass_rejects_outside_points() {
        let domain = Rect::new(0.0, 0.0, 10.0, 10.0);
        let points = vec![Point::new(1.0, 1.0), Point::new(5.0, 5.0), Point::new(50.0, 5.0)];
        assert!(tessellate_pass(&ClippedVoronoi::default(), points, domain).is_err());
    }
}
