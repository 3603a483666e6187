//! Error types for EditKit operations
//!
//! A single crate-level error enum covers local edit failures, allocator
//! invariant breaks, and wire-codec rejections. Local operations that fail
//! leave the document untouched and emit nothing.

use thiserror::Error;

/// Errors produced by replica operations and the wire codec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Cursor coordinates outside the document
    #[error("cursor out of range: line {line}, column {col}")]
    OutOfRange { line: usize, col: usize },

    /// Allocator asked for a position inside an empty or inverted interval
    #[error("no position available between {min} and {max}")]
    InvalidInterval { min: u64, max: u64 },

    /// Wire message carried an operation kind other than INSERT/DELETE
    #[error("unknown operation kind: {0}")]
    UnknownOperation(i32),

    /// Wire payload could not be decoded
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Result type alias for EditKit operations
pub type Result<T> = std::result::Result<T, EditError>;
