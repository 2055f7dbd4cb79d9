//! Map Cell Structure
//!
//! Represents one tessellation region with its polygon, shared corners and neighbors.

use crate::corner::CornerId;
use crate::geometry::{polygon_area, vertex_average, Point, Rect};

/// A single polygonal region of the map
///
/// Cells are created fresh on every tessellation pass. `corners`, `neighbors`
/// and `border` stay empty until the map is finalized, after relaxation has
/// completed.
///
/// # Invariants (once finalized)
///
/// - `corners.len() == boundary.len()`, same cyclic order
/// - `neighbors` is sorted, never contains `id`, and is symmetric across cells
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Index of this cell (and of its generating point)
    ///
    /// Ids are deterministic: the same configuration always produces the same
    /// cell at the same id.
    pub id: usize,

    /// Generating point of this region
    pub center: Point,

    /// Polygon vertices, in the winding order produced by the tessellator
    pub boundary: Vec<Point>,

    /// Shared corner ids, one per boundary vertex
    pub corners: Vec<CornerId>,

    /// Ids of cells sharing at least one corner with this cell
    pub neighbors: Vec<usize>,

    /// True when any corner of this cell lies on the domain edge
    pub border: bool,
}

impl Cell {
    /// Create a cell from a tessellation pass, with no topology yet
    pub fn new(id: usize, center: Point, boundary: Vec<Point>) -> Self {
        Self {
            id,
            center,
            boundary,
            corners: Vec::new(),
            neighbors: Vec::new(),
            border: false,
        }
    }

    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Check if this cell is a neighbor of another cell
    #[inline]
    pub fn is_neighbor_of(&self, other_cell_id: usize) -> bool {
        self.neighbors.binary_search(&other_cell_id).is_ok()
    }

    /// Get the vertex count (polygon complexity)
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.boundary.len()
    }

    /// Area of the boundary polygon
    pub fn area(&self) -> f64 {
        polygon_area(&self.boundary)
    }

    /// Mean of the boundary vertices
    ///
    /// This is the point relaxation moves the generating point to. Returns
    /// `None` for a cell without vertices.
    pub fn vertex_centroid(&self) -> Option<Point> {
        vertex_average(&self.boundary)
    }

    /// Bounding extent of the boundary polygon
    ///
    /// Falls back to a zero-size rectangle at the center for an empty boundary.
    pub fn bounds(&self) -> Rect {
        Rect::bounding(&self.boundary)
            .unwrap_or_else(|| Rect::from_corners(self.center, self.center))
    }
}
