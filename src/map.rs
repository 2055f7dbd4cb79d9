//! MapGenerator: pipeline driver and query surface

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::cell::Cell;
use crate::config::MapConfig;
use crate::corner::{Corner, CornerId};
use crate::error::{MapError, Result};
use crate::generation::{
    build_corner_graph, build_neighbor_graph, lloyd_relaxation, tessellate_pass, ClippedVoronoi,
    LloydOptions, PointSampler, TessellationPass, Tessellator,
};
use crate::geometry::{Point, Rect};

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// Lifecycle of a [`MapGenerator`]
///
/// `Uninitialized → Sampled → Tessellated → (Relaxing → Tessellated)* → Finalized`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationPhase {
    /// Nothing generated yet
    Uninitialized,
    /// Points sampled, no cells
    Sampled,
    /// Cells built for the current points, no topology
    Tessellated,
    /// A relaxation pass is in progress
    Relaxing,
    /// Corners and neighbors built; the map is read-only
    Finalized,
}

impl fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationPhase::Uninitialized => "Uninitialized",
            GenerationPhase::Sampled => "Sampled",
            GenerationPhase::Tessellated => "Tessellated",
            GenerationPhase::Relaxing => "Relaxing",
            GenerationPhase::Finalized => "Finalized",
        };
        f.write_str(name)
    }
}

/// A seeded, relaxed Voronoi map with corner and neighbor topology
///
/// Generic over the tessellation backend `T`. The generator owns every piece
/// of generation state (random generator, points, cells, corners), so
/// independent instances never interfere.
///
/// # Examples
///
/// ```
/// use voronoi_map::*;
///
/// let config = MapConfigBuilder::new()
///     .seed("abc")
///     .bounds(0.0, 0.0, 100.0, 100.0)
///     .unwrap()
///     .num_points(10)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let map = MapGenerator::generate(config).unwrap();
/// let visible = map.get_cells(Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
/// assert_eq!(visible.len(), 10);
/// ```
///
/// Driving the phases by hand:
///
/// ```
/// use voronoi_map::*;
///
/// let mut map = MapGenerator::new(MapConfigBuilder::new().seed("steps").build().unwrap());
/// map.sample().unwrap();
/// assert!(matches!(
///     map.get_cells(Rect::new(0.0, 0.0, 10.0, 10.0)),
///     Err(MapError::NotReady(GenerationPhase::Sampled))
/// ));
/// map.tessellate().unwrap();
/// map.relax().unwrap();
/// map.finalize().unwrap();
/// assert_eq!(map.phase(), GenerationPhase::Finalized);
/// ```
#[derive(Clone)]
pub struct MapGenerator<T = ClippedVoronoi> {
    /// Configuration used to generate this map
    config: MapConfig,

    /// Backend turning points into cell polygons
    tessellator: T,

    /// Seeded source of the initial points
    sampler: PointSampler,

    phase: GenerationPhase,

    /// Generating points of the current pass
    points: Vec<Point>,

    /// Cells of the current pass (indexed by cell ID)
    cells: Vec<Cell>,

    /// Shared corners, populated on finalize (indexed by corner ID)
    corners: Vec<Corner>,

    /// Relaxation passes run so far
    relax_count: usize,

    /// Set when relaxation stopped on its convergence threshold
    converged: bool,

    /// Spatial index over the final cell centers
    #[cfg(feature = "spatial-index")]
    spatial_index: Option<SpatialIndex>,
}

impl MapGenerator<ClippedVoronoi> {
    /// Create a generator using the default `voronoice`-backed tessellator
    pub fn new(config: MapConfig) -> Self {
        Self::with_tessellator(config, ClippedVoronoi::default())
    }

    /// Generate a finalized map in one call
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_map::*;
    ///
    /// let config = MapConfigBuilder::new().seed("12345").num_points(200).unwrap().build().unwrap();
    /// let map = MapGenerator::generate(config).unwrap();
    /// assert_eq!(map.cell_count(), 200);
    /// ```
    pub fn generate(config: MapConfig) -> Result<Self> {
        let mut generator = Self::new(config);
        generator.run()?;
        Ok(generator)
    }
}

impl<T: Tessellator> MapGenerator<T> {
    /// Create a generator with a custom tessellation backend
    pub fn with_tessellator(config: MapConfig, tessellator: T) -> Self {
        let sampler = PointSampler::new(config.seed_value());
        Self {
            config,
            tessellator,
            sampler,
            phase: GenerationPhase::Uninitialized,
            points: Vec::new(),
            cells: Vec::new(),
            corners: Vec::new(),
            relax_count: 0,
            converged: false,
            #[cfg(feature = "spatial-index")]
            spatial_index: None,
        }
    }

    /// Generate a finalized map with a custom tessellation backend
    pub fn generate_with_tessellator(config: MapConfig, tessellator: T) -> Result<Self> {
        let mut generator = Self::with_tessellator(config, tessellator);
        generator.run()?;
        Ok(generator)
    }

    /// Advance through every remaining phase up to `Finalized`
    pub fn run(&mut self) -> Result<()> {
        let start = Instant::now();
        loop {
            match self.phase {
                GenerationPhase::Uninitialized => self.sample()?,
                GenerationPhase::Sampled => self.tessellate()?,
                GenerationPhase::Tessellated | GenerationPhase::Relaxing => {
                    if self.relaxations_pending() > 0 {
                        self.relax()?;
                    } else {
                        self.finalize()?;
                    }
                }
                GenerationPhase::Finalized => break,
            }
        }
        debug!(elapsed = ?start.elapsed(), "map generation complete");
        Ok(())
    }

    /// `Uninitialized → Sampled`: draw the initial points
    pub fn sample(&mut self) -> Result<()> {
        self.expect_phase("sample", GenerationPhase::Uninitialized)?;
        let result = self
            .config
            .validate()
            .and_then(|_| self.sampler.sample(self.config.domain(), self.config.num_points));
        let points = self.guard(result)?;

        debug!(points = points.len(), seed = %self.config.seed, "points sampled");
        self.points = points;
        self.phase = GenerationPhase::Sampled;
        Ok(())
    }

    /// `Sampled → Tessellated`: first tessellation pass
    pub fn tessellate(&mut self) -> Result<()> {
        self.expect_phase("tessellate", GenerationPhase::Sampled)?;
        let start = Instant::now();
        let points = std::mem::take(&mut self.points);
        let result = tessellate_pass(&self.tessellator, points, self.config.domain());
        let pass = self.guard(result)?;

        debug!(cells = pass.cells.len(), elapsed = ?start.elapsed(), "initial tessellation");
        self.commit(pass);
        self.phase = GenerationPhase::Tessellated;
        Ok(())
    }

    /// Run every pending relaxation pass
    ///
    /// Each pass recomputes the points from the current cells, discards the
    /// cells and re-tessellates. A failing pass aborts the whole generation
    /// and resets the generator to `Uninitialized`.
    pub fn relax(&mut self) -> Result<()> {
        self.expect_phase("relax", GenerationPhase::Tessellated)?;
        let options = LloydOptions {
            max_iterations: self.relaxations_pending(),
            convergence_threshold: self.config.relax_convergence,
        };
        if options.max_iterations == 0 {
            return Ok(());
        }

        self.phase = GenerationPhase::Relaxing;
        let current = TessellationPass {
            points: std::mem::take(&mut self.points),
            cells: std::mem::take(&mut self.cells),
        };
        let result = lloyd_relaxation(current, &self.tessellator, self.config.domain(), options);
        let relaxed = self.guard(result)?;

        self.commit(relaxed.pass);
        self.relax_count += relaxed.iterations;
        self.converged = relaxed.converged;
        self.phase = GenerationPhase::Tessellated;
        Ok(())
    }

    /// `Tessellated → Finalized`: build the corner and neighbor graphs once
    pub fn finalize(&mut self) -> Result<()> {
        self.expect_phase("finalize", GenerationPhase::Tessellated)?;
        if self.relaxations_pending() > 0 {
            return Err(MapError::InvalidPhase {
                operation: "finalize with relaxation passes pending",
                phase: self.phase,
            });
        }
        let start = Instant::now();

        let mut cells = std::mem::take(&mut self.cells);
        let result = build_corner_graph(&mut cells, self.config.domain(), self.config.corner_snap);
        let corners = self.guard(result)?;
        let edges = build_neighbor_graph(&mut cells, &corners, self.config.neighbor_strategy);

        #[cfg(feature = "spatial-index")]
        {
            self.spatial_index = Some(SpatialIndex::new(&self.points));
        }

        info!(
            cells = cells.len(),
            corners = corners.len(),
            neighbor_edges = edges,
            relax_passes = self.relax_count,
            elapsed = ?start.elapsed(),
            "map finalized"
        );
        self.cells = cells;
        self.corners = corners;
        self.phase = GenerationPhase::Finalized;
        Ok(())
    }

    /// Current lifecycle phase
    #[inline]
    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    /// Configuration used to generate this map
    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Relaxation passes run so far
    #[inline]
    pub fn relax_count(&self) -> usize {
        self.relax_count
    }

    /// Relaxation passes still to run before the map can be finalized
    pub fn relaxations_pending(&self) -> usize {
        if self.converged {
            0
        } else {
            self.config.max_relax.saturating_sub(self.relax_count)
        }
    }

    /// Generating points of the current pass (empty before sampling)
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of cells in the current pass
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cells whose bounding extent intersects `display` grown by the configured margin
    ///
    /// This is a coarse culling test: cells near the edge may be reported
    /// even if their polygon does not strictly intersect `display`.
    ///
    /// # Errors
    ///
    /// Returns `NotReady` before the map is finalized.
    pub fn get_cells(&self, display: Rect) -> Result<Vec<&Cell>> {
        self.get_cells_with_margin(display, self.config.display_margin)
    }

    /// Visibility query with an explicit margin
    pub fn get_cells_with_margin(&self, display: Rect, margin: f64) -> Result<Vec<&Cell>> {
        let cells = self.cells()?;
        let view = display.expand(margin);
        Ok(cells
            .iter()
            .filter(|cell| cell.bounds().intersects(&view))
            .collect())
    }

    /// All finalized cells, indexed by cell ID
    pub fn cells(&self) -> Result<&[Cell]> {
        self.ensure_finalized()?;
        Ok(&self.cells)
    }

    /// All corners, indexed by corner ID
    pub fn corners(&self) -> Result<&[Corner]> {
        self.ensure_finalized()?;
        Ok(&self.corners)
    }

    /// Get a cell by ID
    ///
    /// # Errors
    ///
    /// `NotReady` before finalization, `CellNotFound` for an unknown ID.
    pub fn get_cell(&self, id: usize) -> Result<&Cell> {
        self.cells()?.get(id).ok_or(MapError::CellNotFound(id))
    }

    /// Get a corner by ID, `None` if out of range
    pub fn get_corner(&self, id: CornerId) -> Result<Option<&Corner>> {
        Ok(self.corners()?.get(id))
    }

    /// Neighbor IDs of a cell
    pub fn get_neighbors(&self, cell_id: usize) -> Result<&[usize]> {
        Ok(self.get_cell(cell_id)?.neighbors.as_slice())
    }

    /// Find the cell containing a position (requires spatial-index feature)
    ///
    /// Uses the KD-tree over generating points; positions outside the
    /// domain resolve to the nearest cell.
    #[cfg(feature = "spatial-index")]
    pub fn find_cell_at(&self, position: Point) -> Result<usize> {
        self.ensure_finalized()?;
        self.spatial_index
            .as_ref()
            .map(|index| index.find_nearest(position))
            .ok_or(MapError::NotReady(self.phase))
    }

    /// Find cells within a given hop count from a center cell (BFS)
    ///
    /// Returns the IDs reachable in at most `hops` neighbor steps, including
    /// the center cell itself, in breadth-first order.
    pub fn find_cells_within_radius(&self, center_id: usize, hops: usize) -> Result<Vec<usize>> {
        let cells = self.cells()?;
        if center_id >= cells.len() {
            return Err(MapError::CellNotFound(center_id));
        }

        let mut visited = HashSet::from([center_id]);
        let mut order = vec![center_id];
        let mut queue = VecDeque::from([(center_id, 0usize)]);

        while let Some((cell_id, depth)) = queue.pop_front() {
            if depth == hops {
                continue;
            }
            for &neighbor in &cells[cell_id].neighbors {
                if visited.insert(neighbor) {
                    order.push(neighbor);
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }

        Ok(order)
    }

    fn ensure_finalized(&self) -> Result<()> {
        match self.phase {
            GenerationPhase::Finalized => Ok(()),
            phase => Err(MapError::NotReady(phase)),
        }
    }

    fn expect_phase(&self, operation: &'static str, expected: GenerationPhase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(MapError::InvalidPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    fn commit(&mut self, pass: TessellationPass) {
        self.points = pass.points;
        self.cells = pass.cells;
        self.corners.clear();
    }

    /// Pass a step result through, resetting the generator on failure
    fn guard<V>(&mut self, result: Result<V>) -> Result<V> {
        if let Err(err) = &result {
            warn!(phase = %self.phase, error = %err, "map generation aborted");
            self.reset();
        }
        result
    }

    /// Drop all generated state and re-seed the sampler
    fn reset(&mut self) {
        self.sampler = PointSampler::new(self.config.seed_value());
        self.phase = GenerationPhase::Uninitialized;
        self.points.clear();
        self.cells.clear();
        self.corners.clear();
        self.relax_count = 0;
        self.converged = false;
        #[cfg(feature = "spatial-index")]
        {
            self.spatial_index = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::Polygon;
    use crate::MapConfigBuilder;

    fn small_config(seed: &str) -> MapConfig {
        MapConfigBuilder::new()
            .seed(seed)
            .bounds(0.0, 0.0, 100.0, 100.0)
            .unwrap()
            .num_points(30)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_map_generation() {
        let map = MapGenerator::generate(small_config("abc")).unwrap();

        assert_eq!(map.phase(), GenerationPhase::Finalized);
        assert_eq!(map.cell_count(), 30);
        assert_eq!(map.relax_count(), 1);
        assert_eq!(map.relaxations_pending(), 0);
        assert!(!map.corners().unwrap().is_empty());
    }

    #[test]
    fn test_phase_order_enforced() {
        let mut map = MapGenerator::new(small_config("order"));
        assert!(matches!(
            map.tessellate(),
            Err(MapError::InvalidPhase { operation: "tessellate", .. })
        ));
        map.sample().unwrap();
        assert!(matches!(map.sample(), Err(MapError::InvalidPhase { .. })));
        assert!(matches!(map.relax(), Err(MapError::InvalidPhase { .. })));
        map.tessellate().unwrap();
        assert!(matches!(map.finalize(), Err(MapError::InvalidPhase { .. })));
        map.relax().unwrap();
        map.finalize().unwrap();
        assert!(matches!(map.relax(), Err(MapError::InvalidPhase { .. })));
        // nothing left to do
        map.run().unwrap();
    }

    #[test]
    fn test_queries_before_finalize() {
        let mut map = MapGenerator::new(small_config("early"));
        let display = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(matches!(
            map.get_cells(display),
            Err(MapError::NotReady(GenerationPhase::Uninitialized))
        ));

        map.sample().unwrap();
        map.tessellate().unwrap();
        assert!(matches!(
            map.get_cells(display),
            Err(MapError::NotReady(GenerationPhase::Tessellated))
        ));
        assert!(map.cells().is_err());
        assert!(map.corners().is_err());
        assert!(map.get_cell(0).is_err());
        assert!(map.find_cells_within_radius(0, 1).is_err());
    }

    #[test]
    fn test_zero_relaxation() {
        let mut config = small_config("raw");
        config.max_relax = 0;
        let mut map = MapGenerator::new(config);
        map.sample().unwrap();
        let sampled = map.points().to_vec();
        map.tessellate().unwrap();
        map.finalize().unwrap();

        assert_eq!(map.relax_count(), 0);
        assert_eq!(map.points(), sampled.as_slice());
        for (cell, point) in map.cells().unwrap().iter().zip(&sampled) {
            assert_eq!(cell.center, *point);
        }
    }

    #[test]
    fn test_relaxation_moves_centers() {
        let mut map = MapGenerator::new(small_config("move"));
        map.sample().unwrap();
        let sampled = map.points().to_vec();
        map.run().unwrap();

        assert_ne!(map.points(), sampled.as_slice());
        for cell in map.cells().unwrap() {
            assert_eq!(cell.center, map.points()[cell.id]);
        }
    }

    #[test]
    fn test_convergence_threshold_skips_passes() {
        let mut config = small_config("converge");
        config.max_relax = 10;
        config.relax_convergence = 1e9;
        let map = MapGenerator::generate(config).unwrap();
        assert_eq!(map.relax_count(), 1);
        assert_eq!(map.relaxations_pending(), 0);
        assert_eq!(map.phase(), GenerationPhase::Finalized);
    }

    #[test]
    fn test_relax_matches_standalone_lloyd() {
        let mut config = small_config("lloyd");
        config.max_relax = 3;
        let domain = config.domain();

        let mut map = MapGenerator::new(config);
        map.sample().unwrap();
        map.tessellate().unwrap();
        let initial = TessellationPass {
            points: map.points().to_vec(),
            cells: map.cells.clone(),
        };
        map.relax().unwrap();
        assert_eq!(map.relax_count(), 3);
        assert_eq!(map.phase(), GenerationPhase::Tessellated);

        let options = LloydOptions {
            max_iterations: 3,
            convergence_threshold: 0.0,
        };
        let relaxed =
            lloyd_relaxation(initial, &ClippedVoronoi::default(), domain, options).unwrap();
        assert_eq!(map.points(), relaxed.pass.points.as_slice());
        assert_eq!(map.cells, relaxed.pass.cells);
    }

    #[test]
    fn test_get_cell_and_neighbors() {
        let map = MapGenerator::generate(small_config("lookup")).unwrap();

        assert_eq!(map.get_cell(0).unwrap().id, 0);
        assert!(matches!(map.get_cell(30), Err(MapError::CellNotFound(30))));
        let neighbors = map.get_neighbors(0).unwrap();
        assert!(!neighbors.is_empty());
        assert!(map.get_corner(0).unwrap().is_some());
        assert!(map.get_corner(usize::MAX).unwrap().is_none());
    }

    #[test]
    fn test_find_cells_within_radius() {
        let map = MapGenerator::generate(small_config("bfs")).unwrap();

        // Radius 0 should return just the center cell
        let cells_r0 = map.find_cells_within_radius(0, 0).unwrap();
        assert_eq!(cells_r0, vec![0]);

        // Radius 1 should return center + neighbors
        let cells_r1 = map.find_cells_within_radius(0, 1).unwrap();
        let neighbors = map.get_neighbors(0).unwrap();
        assert_eq!(cells_r1.len(), 1 + neighbors.len());

        // Large radius reaches every cell of a connected map
        let all = map.find_cells_within_radius(0, 30).unwrap();
        assert_eq!(all.len(), 30);

        assert!(matches!(
            map.find_cells_within_radius(999, 1),
            Err(MapError::CellNotFound(999))
        ));
    }

    #[cfg(feature = "spatial-index")]
    #[test]
    fn test_find_cell_at() {
        let map = MapGenerator::generate(small_config("spatial")).unwrap();

        for cell in map.cells().unwrap() {
            assert_eq!(map.find_cell_at(cell.center).unwrap(), cell.id);
        }
    }

    #[test]
    fn test_visibility_margin() {
        let map = MapGenerator::generate(small_config("margin")).unwrap();

        // just beyond the right edge: only the default margin brings cells into view
        let display = Rect::new(150.0, 0.0, 10.0, 100.0);
        assert!(!map.get_cells(display).unwrap().is_empty());
        assert!(map.get_cells_with_margin(display, 0.0).unwrap().is_empty());
    }

    struct FailingTessellator;

    impl Tessellator for FailingTessellator {
        fn tessellate(&self, sites: &[Point], _bounds: Rect) -> Result<Vec<Polygon>> {
            Err(MapError::DegenerateInput(format!("refused {} sites", sites.len())))
        }
    }

    #[test]
    fn test_failure_resets_generator() {
        let mut map = MapGenerator::with_tessellator(small_config("fail"), FailingTessellator);
        map.sample().unwrap();
        let sampled = map.points().to_vec();

        assert!(matches!(map.tessellate(), Err(MapError::DegenerateInput(_))));
        assert_eq!(map.phase(), GenerationPhase::Uninitialized);
        assert!(map.points().is_empty());
        assert_eq!(map.cell_count(), 0);

        // the sampler was re-seeded, so the same points come back
        map.sample().unwrap();
        assert_eq!(map.points(), sampled.as_slice());
    }

    struct SegmentTessellator;

    impl Tessellator for SegmentTessellator {
        fn tessellate(&self, sites: &[Point], _bounds: Rect) -> Result<Vec<Polygon>> {
            Ok(sites
                .iter()
                .map(|p| vec![*p, *p + Point::new(1.0, 0.0)])
                .collect())
        }
    }

    #[test]
    fn test_degenerate_cells_abort_relaxation() {
        let result = MapGenerator::generate_with_tessellator(small_config("thin"), SegmentTessellator);
        assert!(matches!(result, Err(MapError::DegenerateCell { vertices: 2, .. })));
    }

    #[test]
    fn test_invalid_config_fails_on_sample() {
        let mut config = small_config("zero");
        config.num_points = 0;
        let mut map = MapGenerator::new(config);
        assert!(matches!(map.sample(), Err(MapError::InvalidParameter(_))));
        assert_eq!(map.phase(), GenerationPhase::Uninitialized);
    }
}
