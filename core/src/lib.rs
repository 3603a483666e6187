//! EditKit Core - collaborative plain-text editing engine
//!
//! This is the replication core of EditKit. It implements:
//! - Dense fractional position identifiers with a total order
//! - A line-indexed document of uniquely identified symbols
//! - Local edits that emit messages, remote messages applied symmetrically
//! - A Protocol Buffer wire codec for messages
//!
//! Replicas converge without coordination: every local edit broadcasts a
//! message per affected symbol, and delivering those messages in any order
//! (origin excluded) brings every peer to the same text.
//!
//! # Examples
//!
//! ```rust
//! use editkit_core::{Cursor, Editor, Relay};
//!
//! let relay = Relay::new();
//! let mut alice = Editor::new(relay.clone());
//! let mut bob = Editor::new(relay.clone());
//!
//! alice.local_insert(Cursor::new(0, 0), 'h').unwrap();
//! alice.local_insert(Cursor::new(0, 1), 'i').unwrap();
//! relay.dispatch([&mut alice, &mut bob]);
//!
//! assert_eq!(alice.contents(), "hi");
//! assert_eq!(bob.contents(), "hi");
//! ```

pub mod allocator;
pub mod document;
pub mod editor;
pub mod error;
pub mod message;
pub mod position;
pub mod protocol;
pub mod symbol;
pub mod transport;

// Re-exports for convenience
pub use allocator::PositionAllocator;
pub use document::{Cursor, Document};
pub use editor::Editor;
pub use error::{EditError, Result};
pub use message::{Message, Op};
pub use position::{Position, BASE, BOUNDARY};
pub use symbol::{Symbol, SymbolId};
pub use transport::{Relay, Transport};

/// Site identifier type, assigned by the transport at connect
pub type SiteId = u32;
