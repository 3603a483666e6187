//! Position allocator: fresh identifiers strictly between two neighbors
//!
//! Walks the two neighbor Positions level by level until it finds room for
//! a new identifier. Past the end of the left neighbor a level defaults to
//! 0; past the end of the right neighbor it defaults to the level's full
//! capacity, so descending always opens an interval eventually.
//!
//! Each level keeps a cached boundary strategy, chosen by coin flip on
//! first touch and reused for the replica's lifetime. Allocations at a
//! level therefore cluster near one end of the interval, which keeps
//! Positions short when edits run in one direction.

use crate::error::{EditError, Result};
use crate::position::{level_capacity, Position, BOUNDARY};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Which end of a level's interval allocations cluster toward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    BoundaryPlus,
    BoundaryMinus,
}

/// Allocates fresh Positions for one replica
///
/// The allocator is stateful: it owns the random source and the per-level
/// strategy cache, both of which persist across operations.
///
/// # Example
///
/// ```rust
/// use editkit_core::{Position, PositionAllocator};
///
/// let mut alloc = PositionAllocator::with_seed(42);
/// let q = alloc
///     .between(&Position::head(), &Position::tail())
///     .unwrap();
///
/// assert!(Position::head() < q);
/// assert!(q < Position::tail());
/// ```
#[derive(Debug)]
pub struct PositionAllocator {
    strategies: HashMap<usize, Strategy>,
    rng: StdRng,
}

impl PositionAllocator {
    /// Create an allocator seeded from OS entropy
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create an allocator with a fixed seed, for deterministic tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            strategies: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Produce a fresh Position `q` with `left < q < right`
    ///
    /// # Errors
    ///
    /// Returns `EditError::InvalidInterval` when `left >= right`. Callers
    /// pass neighbors read from an ordered document, so this indicates a
    /// broken invariant rather than a recoverable condition.
    pub fn between(&mut self, left: &Position, right: &Position) -> Result<Position> {
        if left >= right {
            return Err(EditError::InvalidInterval {
                min: left.component(0).unwrap_or(0),
                max: right.component(0).unwrap_or(0),
            });
        }

        let mut fresh = Vec::new();
        // Once the neighbors differ by exactly one at some level, everything
        // below the left neighbor's continuation is free: the right neighbor
        // stops constraining deeper levels.
        let mut right_bounds = true;

        for level in 0.. {
            let cap = level_capacity(level);
            let id1 = left.component(level).unwrap_or(0);
            let id2 = if right_bounds {
                right.component(level).unwrap_or(cap)
            } else {
                cap
            };

            if id2 < id1 {
                return Err(EditError::InvalidInterval { min: id1, max: id2 });
            }

            match id2 - id1 {
                0 => fresh.push(id1),
                1 => {
                    fresh.push(id1);
                    right_bounds = false;
                }
                _ => {
                    fresh.push(self.fresh_id(id1, id2, level)?);
                    return Ok(Position::from(fresh));
                }
            }
        }

        unreachable!("descent always reaches a level with room")
    }

    /// Pick an identifier strictly inside `(min, max)` using the level's
    /// cached boundary strategy
    fn fresh_id(&mut self, min: u64, max: u64, level: usize) -> Result<u64> {
        if max <= min + 1 {
            return Err(EditError::InvalidInterval { min, max });
        }

        let (lo, hi) = if max - min < BOUNDARY + 2 {
            (min + 1, max - 1)
        } else {
            match self.strategy(level) {
                Strategy::BoundaryPlus => (min + 1, min + BOUNDARY),
                Strategy::BoundaryMinus => (max - BOUNDARY, max - 1),
            }
        };

        Ok(self.rng.random_range(lo..=hi))
    }

    /// Cached strategy for `level`, flipping a coin on first touch
    fn strategy(&mut self, level: usize) -> Strategy {
        if let Some(s) = self.strategies.get(&level) {
            return *s;
        }
        let s = if self.rng.random::<bool>() {
            Strategy::BoundaryPlus
        } else {
            Strategy::BoundaryMinus
        };
        self.strategies.insert(level, s);
        s
    }
}

impl Default for PositionAllocator {
    fn default() -> Self {
        Self::new()
    }
}
