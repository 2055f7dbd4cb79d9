//! Neighbor graph construction
//!
//! Two distinct cells are neighbors iff they share at least one corner id.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::corner::{Corner, CornerId};

/// How neighbor relations are discovered
///
/// Both strategies produce identical neighbor sets.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NeighborStrategy {
    /// Compare every unordered pair of cells once: O(N²) corner-set intersections
    Pairwise,
    /// Pair up the cells touching each corner: near-linear in the corner count
    #[default]
    SharedCorners,
}

/// Fill `neighbors` on every cell from the corner graph
///
/// `corners` must be the graph built over `cells`. Existing neighbor lists
/// are replaced. Returns the number of undirected neighbor edges.
pub fn build_neighbor_graph(
    cells: &mut [Cell],
    corners: &[Corner],
    strategy: NeighborStrategy,
) -> usize {
    let mut adjacency: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); cells.len()];

    match strategy {
        NeighborStrategy::Pairwise => pairwise(cells, &mut adjacency),
        NeighborStrategy::SharedCorners => shared_corners(corners, &mut adjacency),
    }

    let mut edges = 0;
    for (cell, neighbors) in cells.iter_mut().zip(adjacency) {
        edges += neighbors.len();
        cell.neighbors = neighbors.into_iter().collect();
    }
    edges / 2
}

/// Record `a ~ b` on both sides at once
fn link_cells(adjacency: &mut [BTreeSet<usize>], a: usize, b: usize) {
    if a == b {
        return;
    }
    adjacency[a].insert(b);
    adjacency[b].insert(a);
}

fn pairwise(cells: &[Cell], adjacency: &mut [BTreeSet<usize>]) {
    let corner_sets: Vec<Vec<CornerId>> = cells
        .iter()
        .map(|cell| {
            let mut ids = cell.corners.clone();
            ids.sort_unstable();
            ids.dedup();
            ids
        })
        .collect();

    for a in 0..cells.len() {
        for b in (a + 1)..cells.len() {
            if shares_any(&corner_sets[a], &corner_sets[b]) {
                link_cells(adjacency, a, b);
            }
        }
    }
}

fn shared_corners(corners: &[Corner], adjacency: &mut [BTreeSet<usize>]) {
    for corner in corners {
        for (i, &a) in corner.touches.iter().enumerate() {
            for &b in &corner.touches[i + 1..] {
                link_cells(adjacency, a, b);
            }
        }
    }
}

/// Intersection test over two sorted id lists
fn shares_any(a: &[CornerId], b: &[CornerId]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => return true,
        }
    }
    false
}
