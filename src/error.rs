//! Error types for map generation

use std::fmt;

use crate::map::GenerationPhase;

/// Errors that can occur during map generation or queries
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    /// Sampling bounds, point count or another configuration value is invalid
    InvalidParameter(String),
    /// The tessellation input (or its output) is degenerate: sites outside the
    /// domain, duplicate sites, or a polygon count that does not match the sites
    DegenerateInput(String),
    /// A cell polygon has too few vertices to form a corner ring
    DegenerateCell {
        /// Id of the offending cell
        cell: usize,
        /// Number of boundary vertices it carried
        vertices: usize,
    },
    /// A query was made before the map reached the `Finalized` phase
    NotReady(GenerationPhase),
    /// A pipeline step was invoked out of order
    InvalidPhase {
        /// Name of the step that was attempted
        operation: &'static str,
        /// Phase the generator was in at the time
        phase: GenerationPhase,
    },
    /// Requested cell ID does not exist
    CellNotFound(usize),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidParameter(msg) => write!(f, "invalid parameter: {}", msg),
            MapError::DegenerateInput(msg) => write!(f, "degenerate input: {}", msg),
            MapError::DegenerateCell { cell, vertices } => write!(
                f,
                "degenerate cell {}: {} boundary vertices (need at least 3)",
                cell, vertices
            ),
            MapError::NotReady(phase) => write!(f, "map not ready (phase: {})", phase),
            MapError::InvalidPhase { operation, phase } => {
                write!(f, "cannot {} during phase {}", operation, phase)
            }
            MapError::CellNotFound(id) => write!(f, "cell not found: {}", id),
        }
    }
}

impl std::error::Error for MapError {}

/// Result type alias for map operations
pub type Result<T> = std::result::Result<T, MapError>;
