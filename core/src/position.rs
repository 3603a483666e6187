//! Position: dense fractional identifiers with a total order
//!
//! Each symbol in the document carries a Position: a variable-length
//! sequence of integers ordered lexicographically. Between any two distinct
//! Positions another one always exists (by descending a level), which is
//! what lets concurrent inserts land without coordination.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-level capacity factor. Level `l` holds identifiers in `[0, 2^l * BASE]`.
pub const BASE: u64 = 32;

/// Width of the sub-interval sampled when a level has room to spare.
/// Small values keep consecutive same-strategy allocations clustered, so
/// Positions stay short under common editing patterns.
pub const BOUNDARY: u64 = 10;

/// A fractional position identifier
///
/// Ordering is lexicographic on the component sequence, with a shorter
/// sequence ordering before a longer one sharing its prefix
/// (`[3] < [3, 0]`). Positions are immutable once assigned to a symbol.
///
/// # Example
///
/// ```rust
/// use editkit_core::Position;
///
/// let a = Position::from(vec![3]);
/// let b = Position::from(vec![3, 0]);
/// let c = Position::from(vec![4]);
///
/// assert!(a < b);
/// assert!(b < c);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position(Vec<u64>);

impl Position {
    /// The reserved left sentinel `[0]`, ordered before every real Position
    pub fn head() -> Self {
        Position(vec![0])
    }

    /// The reserved right sentinel `[BASE]`, ordered after every real Position
    pub fn tail() -> Self {
        Position(vec![BASE])
    }

    /// Component at `level`, or None past the end of the sequence
    ///
    /// Callers supply the side-dependent default themselves: a left
    /// neighbor implicitly continues with zeros, a right neighbor with the
    /// level's full capacity.
    pub fn component(&self, level: usize) -> Option<u64> {
        self.0.get(level).copied()
    }

    /// Number of levels in this Position
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Components as a slice
    pub fn components(&self) -> &[u64] {
        &self.0
    }
}

impl From<Vec<u64>> for Position {
    fn from(components: Vec<u64>) -> Self {
        Position(components)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, "]")
    }
}

/// Maximum identifier at `level`: `2^level * BASE`
pub fn level_capacity(level: usize) -> u64 {
    BASE << level
}
