//! Corner graph construction
//!
//! Deduplicates every cell's boundary vertices into shared corners and links
//! each corner to its cyclic predecessor and successor within every cell
//! that uses it.

use crate::cell::Cell;
use crate::corner::{Corner, CornerRegistry};
use crate::error::{MapError, Result};
use crate::geometry::Rect;

/// Build the shared corner graph over the final cell set
///
/// Fills `corners` and `border` on every cell and returns the corners in
/// id order. Existing corner data on the cells is replaced.
///
/// # Errors
///
/// Returns `DegenerateCell` if any cell has fewer than 3 boundary vertices.
/// Cells are checked before any of them is modified.
pub fn build_corner_graph(
    cells: &mut [Cell],
    domain: Rect,
    snap: Option<f64>,
) -> Result<Vec<Corner>> {
    if let Some(cell) = cells.iter().find(|c| c.boundary.len() < 3) {
        return Err(MapError::DegenerateCell {
            cell: cell.id,
            vertices: cell.boundary.len(),
        });
    }

    let mut registry = CornerRegistry::new(snap);

    for cell in cells.iter_mut() {
        cell.corners = cell
            .boundary
            .iter()
            .map(|&vertex| registry.resolve(vertex))
            .collect();

        let ring = &cell.corners;
        let n = ring.len();
        for (i, &corner) in ring.iter().enumerate() {
            if let Some(c) = registry.get_mut(corner) {
                c.touch(cell.id);
            }
            registry.link(corner, ring[(i + 1) % n]);
        }
    }

    let mut corners = registry.into_corners();
    for corner in &mut corners {
        corner.border = domain.on_border(corner.position);
    }
    for cell in cells.iter_mut() {
        cell.border = cell.corners.iter().any(|&id| corners[id].border);
    }

    Ok(corners)
}
