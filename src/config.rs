//! Map Configuration and Builder
//!
//! This module provides configuration types for deterministic map generation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::generation::{seed_from_str, NeighborStrategy};
use crate::geometry::{Point, Rect};

/// Upper limit on relaxation passes accepted by the builder
pub const MAX_RELAX_ITERATIONS: usize = 64;

/// Default margin added around the display rectangle by visibility queries
pub const DEFAULT_DISPLAY_MARGIN: f64 = 100.0;

/// Configuration for deterministic map generation
///
/// The configuration is the entire persisted surface of a map: the same
/// configuration always regenerates the identical map.
///
/// # Domain
///
/// The domain rectangle spans `[x, width) × [y, height)`: `width` and
/// `height` are the *upper* coordinates of the domain, not its extent.
///
/// # Example
///
/// ```rust
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
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: MapConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Seed text for the deterministic point sequence
    pub seed: String,

    /// Lower x bound of the domain
    pub x: f64,

    /// Lower y bound of the domain
    pub y: f64,

    /// Upper x bound of the domain
    pub width: f64,

    /// Upper y bound of the domain
    pub height: f64,

    /// Number of cells to generate
    pub num_points: usize,

    /// Number of Lloyd relaxation passes
    ///
    /// - 0: raw random cells (irregular)
    /// - 1: default, one smoothing pass
    /// - more: increasingly uniform cells, each pass re-tessellates the map
    pub max_relax: usize,

    /// Early-exit threshold for relaxation (absolute distance)
    ///
    /// Relaxation stops once no point moved farther than this in a pass.
    /// `0.0` (default) disables the check so exactly `max_relax` passes run.
    pub relax_convergence: f64,

    /// Margin added on all sides of the display rectangle in visibility queries
    pub display_margin: f64,

    /// Grid size for merging near-coincident corners
    ///
    /// `None` (default) dedups corners on exact coordinates only.
    pub corner_snap: Option<f64>,

    /// How neighbor relations are discovered
    pub neighbor_strategy: NeighborStrategy,
}

impl MapConfig {
    /// The sampling/domain rectangle
    #[inline]
    pub fn domain(&self) -> Rect {
        Rect::from_corners(Point::new(self.x, self.y), Point::new(self.width, self.height))
    }

    /// 64-bit value derived from the seed text
    #[inline]
    pub fn seed_value(&self) -> u64 {
        seed_from_str(&self.seed)
    }

    /// Check every field, reporting the first problem found
    pub fn validate(&self) -> Result<()> {
        validate_bounds(self.x, self.y, self.width, self.height)?;
        if self.num_points == 0 {
            return Err(MapError::InvalidParameter(
                "num_points must be > 0".to_string(),
            ));
        }
        if self.max_relax > MAX_RELAX_ITERATIONS {
            return Err(MapError::InvalidParameter(format!(
                "max_relax must be <= {} (got {})",
                MAX_RELAX_ITERATIONS, self.max_relax
            )));
        }
        if !(self.relax_convergence >= 0.0) {
            return Err(MapError::InvalidParameter(format!(
                "relax_convergence must be >= 0 (got {})",
                self.relax_convergence
            )));
        }
        if !(self.display_margin >= 0.0) || !self.display_margin.is_finite() {
            return Err(MapError::InvalidParameter(format!(
                "display_margin must be a finite value >= 0 (got {})",
                self.display_margin
            )));
        }
        if let Some(grid) = self.corner_snap {
            if !(grid > 0.0) || !grid.is_finite() {
                return Err(MapError::InvalidParameter(format!(
                    "corner_snap must be a finite value > 0 (got {})",
                    grid
                )));
            }
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfigBuilder::new().into_config()
    }
}

fn validate_bounds(x: f64, y: f64, width: f64, height: f64) -> Result<()> {
    if ![x, y, width, height].iter().all(|v| v.is_finite()) {
        return Err(MapError::InvalidParameter(format!(
            "domain bounds must be finite (got x={}, y={}, width={}, height={})",
            x, y, width, height
        )));
    }
    if width <= x {
        return Err(MapError::InvalidParameter(format!(
            "width must be > x (got x={}, width={})",
            x, width
        )));
    }
    if height <= y {
        return Err(MapError::InvalidParameter(format!(
            "height must be > y (got y={}, height={})",
            y, height
        )));
    }
    Ok(())
}

/// Builder for creating MapConfig with validation
///
/// # Example
///
/// ```rust
/// use voronoi_map::*;
///
/// // Use defaults
/// let config = MapConfigBuilder::new().build().unwrap();
///
/// // Customize
/// let config = MapConfigBuilder::new()
///     .seed("islands")
///     .bounds(-500.0, -500.0, 500.0, 500.0)
///     .unwrap()
///     .num_points(300)
///     .unwrap()
///     .max_relax(3)
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(config.domain().width(), 1000.0);
/// ```
#[derive(Debug, Clone)]
pub struct MapConfigBuilder {
    seed: Option<String>,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    num_points: usize,
    max_relax: usize,
    relax_convergence: f64,
    display_margin: f64,
    corner_snap: Option<f64>,
    neighbor_strategy: NeighborStrategy,
}

impl MapConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random (generated from thread_rng)
    /// - domain: `[0, 1000) × [0, 1000)`
    /// - num_points: 500
    /// - max_relax: 1
    /// - relax_convergence: 0.0 (disabled)
    /// - display_margin: 100
    /// - corner_snap: None (exact corner identity)
    /// - neighbor_strategy: SharedCorners
    pub fn new() -> Self {
        Self {
            seed: None,
            x: 0.0,
            y: 0.0,
            width: 1000.0,
            height: 1000.0,
            num_points: 500,
            max_relax: 1,
            relax_convergence: 0.0,
            display_margin: DEFAULT_DISPLAY_MARGIN,
            corner_snap: None,
            neighbor_strategy: NeighborStrategy::default(),
        }
    }

    /// Set the seed text
    ///
    /// Using the same seed with the same other parameters will produce
    /// an identical map every time.
    pub fn seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Set the domain rectangle `[x, width) × [y, height)`
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `width <= x`, `height <= y`, or any
    /// value is not finite
    pub fn bounds(mut self, x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        validate_bounds(x, y, width, height)?;
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        Ok(self)
    }

    /// Set the number of cells
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `count == 0`
    pub fn num_points(mut self, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(MapError::InvalidParameter(
                "num_points must be > 0".to_string(),
            ));
        }
        self.num_points = count;
        Ok(self)
    }

    /// Set the number of Lloyd relaxation passes
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if iterations > `MAX_RELAX_ITERATIONS`
    pub fn max_relax(mut self, iterations: usize) -> Result<Self> {
        if iterations > MAX_RELAX_ITERATIONS {
            return Err(MapError::InvalidParameter(format!(
                "max_relax must be <= {} (got {})",
                MAX_RELAX_ITERATIONS, iterations
            )));
        }
        self.max_relax = iterations;
        Ok(self)
    }

    /// Set the relaxation early-exit threshold (absolute distance)
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if threshold is negative or NaN
    pub fn relax_convergence(mut self, threshold: f64) -> Result<Self> {
        if !(threshold >= 0.0) {
            return Err(MapError::InvalidParameter(format!(
                "relax_convergence must be >= 0 (got {})",
                threshold
            )));
        }
        self.relax_convergence = threshold;
        Ok(self)
    }

    /// Set the visibility margin
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if margin is negative or not finite
    pub fn display_margin(mut self, margin: f64) -> Result<Self> {
        if !(margin >= 0.0) || !margin.is_finite() {
            return Err(MapError::InvalidParameter(format!(
                "display_margin must be a finite value >= 0 (got {})",
                margin
            )));
        }
        self.display_margin = margin;
        Ok(self)
    }

    /// Merge corners whose coordinates quantize to the same `grid`-sized cell
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if grid is not a finite positive value
    pub fn corner_snap(mut self, grid: f64) -> Result<Self> {
        if !(grid > 0.0) || !grid.is_finite() {
            return Err(MapError::InvalidParameter(format!(
                "corner_snap must be a finite value > 0 (got {})",
                grid
            )));
        }
        self.corner_snap = Some(grid);
        Ok(self)
    }

    /// Choose how neighbor relations are discovered
    pub fn neighbor_strategy(mut self, strategy: NeighborStrategy) -> Self {
        self.neighbor_strategy = strategy;
        self
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random seed using thread_rng.
    pub fn build(self) -> Result<MapConfig> {
        let config = self.into_config();
        config.validate()?;
        Ok(config)
    }

    fn into_config(self) -> MapConfig {
        let seed = self
            .seed
            .unwrap_or_else(|| format!("{:016x}", rand::random::<u64>()));

        MapConfig {
            seed,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            num_points: self.num_points,
            max_relax: self.max_relax,
            relax_convergence: self.relax_convergence,
            display_margin: self.display_margin,
            corner_snap: self.corner_snap,
            neighbor_strategy: self.neighbor_strategy,
        }
    }
}

impl Default for MapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = MapConfigBuilder::new().build().unwrap();
        assert_eq!(config.num_points, 500);
        assert_eq!(config.max_relax, 1);
        assert_eq!(config.relax_convergence, 0.0);
        assert_eq!(config.display_margin, DEFAULT_DISPLAY_MARGIN);
        assert_eq!(config.corner_snap, None);
        assert_eq!(config.neighbor_strategy, NeighborStrategy::SharedCorners);
        // seed is random, so just verify it was set
        assert!(!config.seed.is_empty());
    }

    #[test]
    fn test_builder_custom() {
        let config = MapConfigBuilder::new()
            .seed("abc")
            .bounds(0.0, 0.0, 100.0, 100.0)
            .unwrap()
            .num_points(10)
            .unwrap()
            .max_relax(2)
            .unwrap()
            .neighbor_strategy(NeighborStrategy::Pairwise)
            .build()
            .unwrap();

        assert_eq!(config.seed, "abc");
        assert_eq!(config.num_points, 10);
        assert_eq!(config.max_relax, 2);
        assert_eq!(config.neighbor_strategy, NeighborStrategy::Pairwise);
        assert_eq!(config.domain(), Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_domain_uses_upper_bounds() {
        let config = MapConfigBuilder::new()
            .bounds(10.0, 20.0, 50.0, 80.0)
            .unwrap()
            .build()
            .unwrap();
        let domain = config.domain();
        assert_eq!(domain.width(), 40.0);
        assert_eq!(domain.height(), 60.0);
    }

    #[test]
    fn test_builder_invalid_bounds() {
        assert!(MapConfigBuilder::new().bounds(0.0, 0.0, 0.0, 10.0).is_err());
        assert!(MapConfigBuilder::new().bounds(0.0, 5.0, 10.0, 5.0).is_err());
        assert!(MapConfigBuilder::new().bounds(0.0, 0.0, f64::NAN, 10.0).is_err());
    }

    #[test]
    fn test_builder_zero_points() {
        let result = MapConfigBuilder::new().num_points(0);
        assert!(matches!(result, Err(MapError::InvalidParameter(_))));
    }

    #[test]
    fn test_builder_too_many_iterations() {
        assert!(MapConfigBuilder::new().max_relax(MAX_RELAX_ITERATIONS).is_ok());
        assert!(MapConfigBuilder::new()
            .max_relax(MAX_RELAX_ITERATIONS + 1)
            .is_err());
    }

    #[test]
    fn test_builder_invalid_thresholds() {
        assert!(MapConfigBuilder::new().relax_convergence(-0.1).is_err());
        assert!(MapConfigBuilder::new().display_margin(-1.0).is_err());
        assert!(MapConfigBuilder::new().corner_snap(0.0).is_err());
        assert!(MapConfigBuilder::new().corner_snap(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_direct_struct() {
        let mut config = MapConfig::default();
        assert!(config.validate().is_ok());
        config.num_points = 0;
        assert!(matches!(
            config.validate(),
            Err(MapError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_seed_value_is_stable() {
        let a = MapConfigBuilder::new().seed("abc").build().unwrap();
        let b = MapConfigBuilder::new().seed("abc").build().unwrap();
        let c = MapConfigBuilder::new().seed("abd").build().unwrap();
        assert_eq!(a.seed_value(), b.seed_value());
        assert_ne!(a.seed_value(), c.seed_value());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = MapConfigBuilder::new()
            .seed("12345")
            .corner_snap(1e-6)
            .unwrap()
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: MapConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, restored);
    }
}
