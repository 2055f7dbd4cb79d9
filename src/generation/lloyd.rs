//! Lloyd's Relaxation for uniform cell sizes
//!
//! Lloyd's Relaxation iteratively moves each generating point to the centroid
//! of its cell and re-tessellates, producing more uniformly sized cells.
//!
//! The centroid used here is the vertex average of the cell polygon, not the
//! area-weighted centroid. It is cheaper but biased for irregular polygons.

use std::time::Instant;

use tracing::debug;

use super::tessellation::Tessellator;
use super::{tessellate_pass, TessellationPass};
use crate::error::{MapError, Result};
use crate::geometry::{Point, Rect};

/// Options for Lloyd's relaxation algorithm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LloydOptions {
    /// Number of relaxation passes to run
    pub max_iterations: usize,
    /// Stop early when no point moved farther than this (absolute distance)
    ///
    /// Set to 0.0 to disable early termination and always run
    /// `max_iterations` passes.
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1,
            convergence_threshold: 0.0,
        }
    }
}

/// Outcome of a full relaxation run
#[derive(Debug, Clone)]
pub struct Relaxed {
    /// Final tessellation pass, built from the last relaxed points
    pub pass: TessellationPass,
    /// Passes actually run
    pub iterations: usize,
    /// Largest point displacement of the last pass
    pub max_displacement: f64,
    /// True if the run stopped on the convergence threshold
    pub converged: bool,
}

/// Compute relaxed generating points from a tessellation pass
///
/// Returns the vertex average of every cell, in cell order, plus the largest
/// distance any point moved.
///
/// # Errors
///
/// Returns `DegenerateCell` for a cell with fewer than 3 boundary vertices.
pub fn relaxed_points(pass: &TessellationPass) -> Result<(Vec<Point>, f64)> {
    let mut max_displacement: f64 = 0.0;

    let points = pass
        .cells
        .iter()
        .map(|cell| {
            if cell.boundary.len() < 3 {
                return Err(MapError::DegenerateCell {
                    cell: cell.id,
                    vertices: cell.boundary.len(),
                });
            }
            let centroid = cell.vertex_centroid().ok_or(MapError::DegenerateCell {
                cell: cell.id,
                vertices: 0,
            })?;
            max_displacement = max_displacement.max(centroid.distance(cell.center));
            Ok(centroid)
        })
        .collect::<Result<Vec<Point>>>()?;

    Ok((points, max_displacement))
}

/// Run one relaxation pass: recompute points, then re-tessellate
///
/// The input pass is left untouched; a fresh pass is returned.
pub fn relax_once<T>(
    pass: &TessellationPass,
    tessellator: &T,
    bounds: Rect,
) -> Result<(TessellationPass, f64)>
where
    T: Tessellator + ?Sized,
{
    let (points, max_displacement) = relaxed_points(pass)?;
    let next = tessellate_pass(tessellator, points, bounds)?;
    Ok((next, max_displacement))
}

/// Apply Lloyd's Relaxation with custom options
///
/// # Algorithm
///
/// For each iteration:
/// 1. Move every point to the vertex average of its cell
/// 2. Discard the current cells
/// 3. Re-tessellate from the moved points
///
/// Any failure aborts the whole run; no partially relaxed pass is returned.
pub fn lloyd_relaxation<T>(
    mut pass: TessellationPass,
    tessellator: &T,
    bounds: Rect,
    options: LloydOptions,
) -> Result<Relaxed>
where
    T: Tessellator + ?Sized,
{
    let total_start = Instant::now();
    let mut iterations = 0;
    let mut max_displacement = 0.0;
    let mut converged = false;

    debug!(
        points = pass.points.len(),
        max_iterations = options.max_iterations,
        threshold = options.convergence_threshold,
        "lloyd relaxation starting"
    );

    for iteration in 0..options.max_iterations {
        let iter_start = Instant::now();
        let (next, displacement) = relax_once(&pass, tessellator, bounds)?;
        pass = next;
        iterations = iteration + 1;
        max_displacement = displacement;

        debug!(
            iteration = iterations,
            max_displacement,
            elapsed = ?iter_start.elapsed(),
            "lloyd pass complete"
        );

        if options.convergence_threshold > 0.0 && displacement < options.convergence_threshold {
            converged = true;
            debug!(iteration = iterations, "lloyd relaxation converged");
            break;
        }
    }

    debug!(
        iterations,
        converged,
        elapsed = ?total_start.elapsed(),
        "lloyd relaxation finished"
    );

    Ok(Relaxed {
        pass,
        iterations,
        max_displacement,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::generation::points::sample_points;
    use crate::generation::tessellation::ClippedVoronoi;

    fn domain() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    fn initial_pass(seed: u64, count: usize) -> TessellationPass {
        let points = sample_points(seed, domain(), count).unwrap();
        tessellate_pass(&ClippedVoronoi::default(), points, domain()).unwrap()
    }

    fn area_variance(pass: &TessellationPass) -> f64 {
        let areas: Vec<f64> = pass.cells.iter().map(Cell::area).collect();
        let mean = areas.iter().sum::<f64>() / areas.len() as f64;
        areas.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / areas.len() as f64
    }

    #[test]
    fn test_relaxed_points_are_vertex_averages() {
        let pass = initial_pass(42, 20);
        let (points, max_displacement) = relaxed_points(&pass).unwrap();

        assert_eq!(points.len(), 20);
        assert!(max_displacement > 0.0);
        for (point, cell) in points.iter().zip(&pass.cells) {
            assert_eq!(Some(*point), cell.vertex_centroid());
            assert!(domain().contains(*point));
        }
    }

    #[test]
    fn test_relaxed_points_rejects_degenerate_cell() {
        let pass = TessellationPass {
            points: vec![Point::new(1.0, 1.0)],
            cells: vec![Cell::new(
                0,
                Point::new(1.0, 1.0),
                vec![Point::new(0.0, 0.0), Point::new(2.0, 2.0)],
            )],
        };
        assert!(matches!(
            relaxed_points(&pass),
            Err(MapError::DegenerateCell { cell: 0, vertices: 2 })
        ));
    }

    #[test]
    fn test_lloyd_relaxation_replaces_points() {
        let pass = initial_pass(42, 50);
        let before = pass.points.clone();
        let relaxed = lloyd_relaxation(
            pass,
            &ClippedVoronoi::default(),
            domain(),
            LloydOptions::default(),
        )
        .unwrap();

        assert_eq!(relaxed.iterations, 1);
        assert!(!relaxed.converged);
        assert_eq!(relaxed.pass.points.len(), 50);
        assert_ne!(relaxed.pass.points, before);
        for (cell, point) in relaxed.pass.cells.iter().zip(&relaxed.pass.points) {
            assert_eq!(cell.center, *point);
        }
    }

    #[test]
    fn test_lloyd_relaxation_determinism() {
        let options = LloydOptions {
            max_iterations: 3,
            convergence_threshold: 0.0,
        };
        let a = lloyd_relaxation(initial_pass(7, 40), &ClippedVoronoi::default(), domain(), options)
            .unwrap();
        let b = lloyd_relaxation(initial_pass(7, 40), &ClippedVoronoi::default(), domain(), options)
            .unwrap();

        assert_eq!(a.pass.points, b.pass.points);
        assert_eq!(a.pass.cells, b.pass.cells);
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let pass = initial_pass(3, 15);
        let before = pass.clone();
        let options = LloydOptions {
            max_iterations: 0,
            convergence_threshold: 0.0,
        };
        let relaxed =
            lloyd_relaxation(pass, &ClippedVoronoi::default(), domain(), options).unwrap();
        assert_eq!(relaxed.iterations, 0);
        assert_eq!(relaxed.pass.points, before.points);
    }

    #[test]
    fn test_convergence_stops_early() {
        let options = LloydOptions {
            max_iterations: 20,
            convergence_threshold: 1e6,
        };
        let relaxed = lloyd_relaxation(
            initial_pass(9, 30),
            &ClippedVoronoi::default(),
            domain(),
            options,
        )
        .unwrap();
        assert_eq!(relaxed.iterations, 1);
        assert!(relaxed.converged);
    }

    #[test]
    fn test_relaxation_reduces_area_spread() {
        // statistical property: summed over several seeds
        let mut before_total = 0.0;
        let mut after_total = 0.0;
        for seed in 0..8u64 {
            let pass = initial_pass(seed, 60);
            before_total += area_variance(&pass);
            let (relaxed, _) = relax_once(&pass, &ClippedVoronoi::default(), domain()).unwrap();
            after_total += area_variance(&relaxed);
        }
        assert!(
            after_total <= before_total,
            "area variance grew: {} -> {}",
            before_total,
            after_total
        );
    }
}
