//! Message: the operation sum type replicas exchange
//!
//! Every local edit emits one Message per affected symbol. Messages carry
//! value copies of Symbols; nothing is shared between replicas.

use crate::symbol::Symbol;
use crate::SiteId;
use serde::{Deserialize, Serialize};

/// Operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Place the carried symbol by Position order
    Insert,
    /// Remove the symbol with the carried identity
    Delete,
}

/// One replicated operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// What to do with the symbol
    pub op: Op,

    /// The symbol affected, by value
    pub symbol: Symbol,

    /// Site that originated the operation; the relay skips it on dispatch
    pub origin: SiteId,
}

impl Message {
    /// Create an INSERT message
    pub fn insert(symbol: Symbol, origin: SiteId) -> Self {
        Self {
            op: Op::Insert,
            symbol,
            origin,
        }
    }

    /// Create a DELETE message
    pub fn delete(symbol: Symbol, origin: SiteId) -> Self {
        Self {
            op: Op::Delete,
            symbol,
            origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::symbol::SymbolId;

    #[test]
    fn test_serde_round_trip() {
        let msg = Message::insert(
            Symbol::new('a', SymbolId::new(0, 0), Position::from(vec![7])),
            0,
        );

        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();

        assert_eq!(msg, back);
        assert_eq!(back.op, Op::Insert);
    }
}
