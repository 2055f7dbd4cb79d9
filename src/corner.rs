//! Shared corner vertices
//!
//! A corner is a polygon vertex deduplicated across every cell that uses it.
//! Corners are owned by a [`CornerRegistry`] and referenced by index.

use std::collections::HashMap;

use crate::geometry::Point;

/// Index of a corner in the registry (and in the finalized map)
pub type CornerId = usize;

/// A deduplicated vertex shared by one or more cells
#[derive(Debug, Clone, PartialEq)]
pub struct Corner {
    /// Index of this corner
    pub id: CornerId,

    /// Position of the first vertex that resolved to this corner
    pub position: Point,

    /// Corners adjacent to this one along some cell boundary
    ///
    /// Sorted, free of duplicates, never contains `id`.
    pub connections: Vec<CornerId>,

    /// Cells whose boundary passes through this corner, in discovery order
    pub touches: Vec<usize>,

    /// True when the corner lies on the domain edge
    pub border: bool,
}

impl Corner {
    pub fn new(id: CornerId, position: Point) -> Self {
        Self {
            id,
            position,
            connections: Vec::new(),
            touches: Vec::new(),
            border: false,
        }
    }

    /// Add a connection, keeping the set sorted and unique
    ///
    /// Returns `false` if the connection already existed or points at itself.
    pub fn connect(&mut self, other: CornerId) -> bool {
        if other == self.id {
            return false;
        }
        match self.connections.binary_search(&other) {
            Ok(_) => false,
            Err(pos) => {
                self.connections.insert(pos, other);
                true
            }
        }
    }

    /// Record a cell that uses this corner (once per cell)
    pub fn touch(&mut self, cell: usize) {
        if !self.touches.contains(&cell) {
            self.touches.push(cell);
        }
    }

    #[inline]
    pub fn is_connected_to(&self, other: CornerId) -> bool {
        self.connections.binary_search(&other).is_ok()
    }

    #[inline]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

/// Structured identity key for a corner position
///
/// Both coordinates are kept as separate components so distinct pairs can
/// never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CornerKey {
    /// Bit pattern of the exact coordinates (`-0.0` folded into `0.0`)
    Exact(u64, u64),
    /// Coordinates quantized to a grid
    Snapped(i64, i64),
}

impl CornerKey {
    pub fn exact(p: Point) -> Self {
        CornerKey::Exact(canonical_bits(p.x), canonical_bits(p.y))
    }

    pub fn snapped(p: Point, grid: f64) -> Self {
        CornerKey::Snapped((p.x / grid).round() as i64, (p.y / grid).round() as i64)
    }
}

#[inline]
fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

/// Owns every corner of one generation and resolves positions to corner ids
#[derive(Debug, Clone, Default)]
pub struct CornerRegistry {
    corners: Vec<Corner>,
    index: HashMap<CornerKey, CornerId>,
    snap: Option<f64>,
}

impl CornerRegistry {
    /// Create an empty registry
    ///
    /// With `snap = None` positions must match exactly; otherwise they are
    /// merged when they quantize to the same `snap`-sized grid cell.
    pub fn new(snap: Option<f64>) -> Self {
        Self {
            corners: Vec::new(),
            index: HashMap::new(),
            snap,
        }
    }

    pub fn key(&self, position: Point) -> CornerKey {
        match self.snap {
            Some(grid) => CornerKey::snapped(position, grid),
            None => CornerKey::exact(position),
        }
    }

    /// Return the corner at `position`, creating it on first encounter
    pub fn resolve(&mut self, position: Point) -> CornerId {
        let key = self.key(position);
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.corners.len();
        self.corners.push(Corner::new(id, position));
        self.index.insert(key, id);
        id
    }

    /// Link two corners in both directions
    pub fn link(&mut self, a: CornerId, b: CornerId) {
        if a == b {
            return;
        }
        self.corners[a].connect(b);
        self.corners[b].connect(a);
    }

    pub fn get(&self, id: CornerId) -> Option<&Corner> {
        self.corners.get(id)
    }

    pub fn get_mut(&mut self, id: CornerId) -> Option<&mut Corner> {
        self.corners.get_mut(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.corners.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Corner> {
        self.corners.iter()
    }

    pub fn into_corners(self) -> Vec<Corner> {
        self.corners
    }
}
