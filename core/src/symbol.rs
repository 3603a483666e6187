//! Symbol: one document character with identity and Position
//!
//! A Symbol couples a character value with the globally unique id of the
//! insertion that created it and the fractional Position that orders it.
//! Identity (the id) is what remote erase matches on; the Position is what
//! remote insert sorts on.

use crate::error::EditError;
use crate::position::Position;
use crate::SiteId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Globally unique identity of a symbol
///
/// Minted by the originating replica as (site id, local counter). The
/// derived ordering is lexicographic on (site, seq), which doubles as the
/// deterministic tiebreak when two sites race to allocate the same
/// Position.
///
/// # Example
///
/// ```rust
/// use editkit_core::SymbolId;
///
/// let a = SymbolId::new(0, 7);
/// let b = SymbolId::new(1, 7);
///
/// assert!(a < b);
/// assert_eq!(a.to_string(), "0_7");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SymbolId {
    /// Replica that minted this id
    pub site: SiteId,

    /// Per-replica insertion counter at mint time
    pub seq: u64,
}

impl SymbolId {
    /// Create a new symbol id
    pub fn new(site: SiteId, seq: u64) -> Self {
        Self { site, seq }
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.site, self.seq)
    }
}

impl FromStr for SymbolId {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (site, seq) = s
            .split_once('_')
            .ok_or_else(|| EditError::Protocol(format!("malformed symbol id: {s:?}")))?;
        let site = site
            .parse()
            .map_err(|_| EditError::Protocol(format!("malformed site id in: {s:?}")))?;
        let seq = seq
            .parse()
            .map_err(|_| EditError::Protocol(format!("malformed counter in: {s:?}")))?;
        Ok(SymbolId { site, seq })
    }
}

/// A single character of the replicated document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Character value, `'\n'` for line terminators
    pub value: char,

    /// Identity of the insertion that created this symbol
    pub id: SymbolId,

    /// Fractional position in the document's total order
    pub position: Position,
}

impl Symbol {
    /// Create a new symbol
    pub fn new(value: char, id: SymbolId, position: Position) -> Self {
        Self {
            value,
            id,
            position,
        }
    }

    /// Whether this symbol terminates a line
    pub fn is_newline(&self) -> bool {
        self.value == '\n'
    }
}

/// Order symbols by Position, then by id
///
/// The id tiebreak makes the order total even when two sites allocated the
/// same Position concurrently: both sides sort the colliding symbols the
/// same way, so replicas converge without mutating either Position.
impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position
            .cmp(&other.position)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(value: char, site: SiteId, seq: u64, position: &[u64]) -> Symbol {
        Symbol::new(
            value,
            SymbolId::new(site, seq),
            Position::from(position.to_vec()),
        )
    }

    #[test]
    fn test_ordering_by_position() {
        let a = sym('a', 0, 0, &[5]);
        let b = sym('b', 0, 1, &[9]);

        assert!(a < b);
    }

    #[test]
    fn test_equal_position_breaks_tie_by_id() {
        let a = sym('a', 0, 3, &[5]);
        let b = sym('b', 1, 0, &[5]);

        // Same Position: site 0 sorts before site 1
        assert!(a < b);
    }

    #[test]
    fn test_id_ordering_is_lexicographic() {
        let early = SymbolId::new(1, 9);
        let late = SymbolId::new(1, 10);
        let other_site = SymbolId::new(2, 0);

        assert!(early < late);
        assert!(late < other_site);
    }

    #[test]
    fn test_id_display_and_parse() {
        let id = SymbolId::new(7, 3);

        assert_eq!(id.to_string(), "7_3");
        assert_eq!("7_3".parse::<SymbolId>().unwrap(), id);
    }

    #[test]
    fn test_id_parse_rejects_garbage() {
        assert!("73".parse::<SymbolId>().is_err());
        assert!("x_3".parse::<SymbolId>().is_err());
        assert!("7_y".parse::<SymbolId>().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let s = sym('\n', 2, 11, &[3, 17]);

        let json = serde_json::to_string(&s).unwrap();
        let back: Symbol = serde_json::from_str(&json).unwrap();

        assert_eq!(s, back);
        assert!(back.is_newline());
    }
}
