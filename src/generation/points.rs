//! Seeded point sampling
//!
//! Generates the initial cell centers as uniformly random points inside the
//! domain rectangle. The sequence depends only on the seed and the requested
//! domain/count, so regeneration is reproducible.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{MapError, Result};
use crate::geometry::{Point, Rect};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hash seed text into a 64-bit generator seed (FNV-1a)
///
/// Stable across platforms and releases, unlike `std`'s default hasher.
pub fn seed_from_str(seed: &str) -> u64 {
    seed.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

/// Deterministic source of candidate cell centers
#[derive(Debug, Clone)]
pub struct PointSampler {
    rng: ChaCha8Rng,
}

impl PointSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_seed_str(seed: &str) -> Self {
        Self::new(seed_from_str(seed))
    }

    /// Sample `count` points with `x ∈ [min.x, max.x)` and `y ∈ [min.y, max.y)`
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `count == 0` or the domain has no area.
    pub fn sample(&mut self, domain: Rect, count: usize) -> Result<Vec<Point>> {
        if count == 0 {
            return Err(MapError::InvalidParameter(
                "point count must be > 0".to_string(),
            ));
        }
        if !domain.is_finite() || domain.is_empty() {
            return Err(MapError::InvalidParameter(format!(
                "sampling domain must have positive extent (got {:?})",
                domain
            )));
        }

        let points = (0..count)
            .map(|_| {
                let x = self.rng.gen_range(domain.min.x..domain.max.x);
                let y = self.rng.gen_range(domain.min.y..domain.max.y);
                Point::new(x, y)
            })
            .collect();

        Ok(points)
    }
}

/// Sample points with a fresh generator (convenience wrapper)
pub fn sample_points(seed: u64, domain: Rect, count: usize) -> Result<Vec<Point>> {
    PointSampler::new(seed).sample(domain, count)
}
