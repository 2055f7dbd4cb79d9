//! Seeded Voronoi map generation
//!
//! Partitions a rectangular domain into polygonal cells grown from a seeded
//! random point set, smooths them with Lloyd relaxation, and builds explicit
//! topology over the result: shared corners and cell neighbors.
//!
//! # Quick Start
//!
//! ```rust
//! use voronoi_map::*;
//!
//! let config = MapConfigBuilder::new()
//!     .seed("abc")
//!     .bounds(0.0, 0.0, 100.0, 100.0).unwrap()
//!     .num_points(10).unwrap()
//!     .max_relax(1).unwrap()
//!     .build().unwrap();
//!
//! let map = MapGenerator::generate(config).unwrap();
//!
//! for cell in map.get_cells(Rect::new(0.0, 0.0, 50.0, 50.0)).unwrap() {
//!     println!("cell {} has {} neighbors", cell.id, cell.neighbor_count());
//! }
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) position-to-cell lookups using KD-tree
//! - `serde`: Enables serialization support for configuration types

// Modules
pub mod error;
pub mod geometry;
pub mod config;
pub mod cell;
pub mod corner;
pub mod generation;
pub mod map;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{MapError, Result};
pub use geometry::{Point, Rect};
pub use config::{MapConfig, MapConfigBuilder, DEFAULT_DISPLAY_MARGIN, MAX_RELAX_ITERATIONS};
pub use cell::Cell;
pub use corner::{Corner, CornerId, CornerKey, CornerRegistry};
pub use generation::{
    ClippedVoronoi, LloydOptions, NeighborStrategy, PointSampler, Polygon, TessellationPass,
    Tessellator,
};
pub use map::{GenerationPhase, MapGenerator};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;
