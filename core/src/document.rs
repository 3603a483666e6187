//! Line-indexed document: ordered lines of ordered symbols
//!
//! The document stores one Vec of Symbols per line. Within a line symbols
//! are sorted by (Position, id); across lines every non-final line ends in
//! a `'\n'` symbol. The flat view (Display) concatenates every line's
//! character values, so flat order and Position order must always agree;
//! the insertion and erase primitives here exist to keep that true while
//! lines split and merge around newlines.

use crate::error::{EditError, Result};
use crate::position::Position;
use crate::symbol::Symbol;
use std::fmt::{self, Write as _};
use tracing::trace;

/// A caller-facing (line, column) coordinate
///
/// For insertion a cursor names a gap (column may equal the line length);
/// for erase endpoints it names a symbol (column must be strictly inside
/// the line).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub col: usize,
}

impl Cursor {
    /// Create a cursor at (line, col)
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// The replicated document body
///
/// Always holds at least one line; the empty document is a single empty
/// line. Tracks its live symbol count so callers never pay a scan for it.
#[derive(Debug, Clone)]
pub struct Document {
    lines: Vec<Vec<Symbol>>,
    len: usize,
}

impl Document {
    /// Create an empty document (a single empty line)
    pub fn new() -> Self {
        Self {
            lines: vec![Vec::new()],
            len: 0,
        }
    }

    /// Number of live symbols, newlines included
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the document holds no symbols
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of lines (at least one)
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Symbols of line `index`, or None out of bounds
    pub fn line(&self, index: usize) -> Option<&[Symbol]> {
        self.lines.get(index).map(Vec::as_slice)
    }

    /// All live symbols in document order
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.lines.iter().flatten()
    }

    /// Position of the symbol logically left of the cursor
    ///
    /// `(0, 0)` yields the left sentinel `[0]`; column 0 of a later line
    /// continues on the previous line's last symbol.
    ///
    /// # Errors
    ///
    /// `EditError::OutOfRange` when the cursor is outside the document.
    pub fn pos_before(&self, at: Cursor) -> Result<Position> {
        self.check_cursor(at)?;

        if at.line == 0 && at.col == 0 {
            return Ok(Position::head());
        }

        let (line, col) = if at.col == 0 {
            (at.line - 1, self.lines[at.line - 1].len())
        } else {
            (at.line, at.col)
        };

        col.checked_sub(1)
            .and_then(|i| self.lines[line].get(i))
            .map(|s| s.position.clone())
            .ok_or(EditError::OutOfRange {
                line: at.line,
                col: at.col,
            })
    }

    /// Position of the symbol logically right of the cursor
    ///
    /// Past the last symbol of the document this yields the right sentinel
    /// `[BASE]`; at end-of-line with a following content line it continues
    /// on that line's first symbol.
    ///
    /// # Errors
    ///
    /// `EditError::OutOfRange` when the cursor is outside the document.
    pub fn pos_after(&self, at: Cursor) -> Result<Position> {
        self.check_cursor(at)?;

        let (line, col) = if at.col == self.lines[at.line].len() {
            if at.line + 1 >= self.lines.len() {
                return Ok(Position::tail());
            }
            (at.line + 1, 0)
        } else {
            (at.line, at.col)
        };

        // A missing symbol here means the next line is the trailing empty
        // one, i.e. the cursor sits past the last symbol of the document.
        Ok(self.lines[line]
            .get(col)
            .map(|s| s.position.clone())
            .unwrap_or_else(Position::tail))
    }

    /// Splice `symbol` in at the cursor
    ///
    /// A `'\n'` splits the line: the left half plus the newline stays put,
    /// the right half becomes the next line (a fresh empty line when the
    /// split falls at end-of-line).
    ///
    /// # Errors
    ///
    /// `EditError::OutOfRange` when the cursor is outside the document.
    pub fn insert_symbol(&mut self, at: Cursor, symbol: Symbol) -> Result<()> {
        self.check_cursor(at)?;

        if symbol.is_newline() {
            let rest = self.lines[at.line].split_off(at.col);
            self.lines[at.line].push(symbol);
            self.lines.insert(at.line + 1, rest);
        } else {
            self.lines[at.line].insert(at.col, symbol);
        }

        self.len += 1;
        Ok(())
    }

    /// Remove the inclusive range `[from, to]` of symbol coordinates
    ///
    /// Returns the removed symbols in document order. Lines broken by a
    /// consumed `'\n'` are rejoined with their successor; an emptied
    /// document collapses back to a single empty line.
    ///
    /// # Errors
    ///
    /// `EditError::OutOfRange` when either endpoint does not name a live
    /// symbol or the range is inverted.
    pub fn erase_range(&mut self, from: Cursor, to: Cursor) -> Result<Vec<Symbol>> {
        if self.len == 0 {
            return Ok(Vec::new());
        }
        self.check_symbol_coord(from)?;
        self.check_symbol_coord(to)?;
        if (to.line, to.col) < (from.line, from.col) {
            return Err(EditError::OutOfRange {
                line: to.line,
                col: to.col,
            });
        }

        let mut removed: Vec<Symbol>;
        let mut rejoin = false;

        if from.line == to.line {
            removed = self.lines[from.line].drain(from.col..=to.col).collect();
            if removed.last().is_some_and(Symbol::is_newline) {
                // The erased newline separated this line from its successor.
                if self.lines[from.line + 1].is_empty() {
                    self.lines.remove(from.line + 1);
                } else {
                    rejoin = true;
                }
            }
        } else {
            removed = self.lines[from.line].drain(from.col..).collect();
            for line in self.lines.drain(from.line + 1..to.line) {
                removed.extend(line);
            }
            // The end line slid up to from.line + 1.
            let tail = self.lines[from.line + 1].drain(..=to.col);
            removed.extend(tail);
            if self.lines[from.line + 1].is_empty() {
                self.lines.remove(from.line + 1);
            }
            rejoin = true;
        }

        if rejoin && from.line + 1 < self.lines.len() {
            let rest = self.lines.remove(from.line + 1);
            self.lines[from.line].extend(rest);
            if self.lines[from.line].is_empty() && self.lines.len() > 1 {
                self.lines.remove(from.line);
            }
        }

        if self.lines.is_empty() {
            self.lines.push(Vec::new());
        }

        self.len -= removed.len();
        Ok(removed)
    }

    /// Remove the symbol matching `target.id`, if present
    ///
    /// Locates the candidate line by Position, scans it for the identity,
    /// and falls back to the adjacent line before giving up. Returns None
    /// when the symbol is unknown (already erased or never delivered).
    pub fn remove_symbol(&mut self, target: &Symbol) -> Option<Symbol> {
        if self.len == 0 {
            return None;
        }

        let candidate = self.candidate_line(target);
        let (line, col) = self
            .find_by_id(candidate, target)
            .or_else(|| self.find_by_id(candidate + 1, target))?;

        let removed = self.lines[line].remove(col);
        self.len -= 1;

        if removed.is_newline() && line + 1 < self.lines.len() {
            let rest = self.lines.remove(line + 1);
            self.lines[line].extend(rest);
        }

        Some(removed)
    }

    /// Cursor where `symbol` belongs in (Position, id) order
    ///
    /// An insertion point past a line-terminating newline is reported as
    /// the start of the next line.
    pub(crate) fn placement(&self, symbol: &Symbol) -> Cursor {
        if self.len == 0 {
            return Cursor::new(0, 0);
        }

        let line = self.candidate_line(symbol);
        let col = self.lines[line].partition_point(|s| s < symbol);

        if col == self.lines[line].len()
            && self.lines[line].last().is_some_and(Symbol::is_newline)
        {
            trace!(line, "placement rolls over past line terminator");
            return Cursor::new(line + 1, 0);
        }

        Cursor::new(line, col)
    }

    /// Last line whose first symbol orders at or before `symbol`
    ///
    /// A trailing empty line carries no Positions and is excluded.
    fn candidate_line(&self, symbol: &Symbol) -> usize {
        let searched = if self.lines.last().is_some_and(|line| line.is_empty()) {
            self.lines.len() - 1
        } else {
            self.lines.len()
        };

        self.lines[..searched]
            .partition_point(|line| line.first().is_some_and(|head| head <= symbol))
            .saturating_sub(1)
    }

    fn find_by_id(&self, line: usize, target: &Symbol) -> Option<(usize, usize)> {
        let symbols = self.lines.get(line)?;
        symbols
            .iter()
            .position(|s| s.id == target.id)
            .map(|col| (line, col))
    }

    fn check_cursor(&self, at: Cursor) -> Result<()> {
        match self.lines.get(at.line) {
            Some(line) if at.col <= line.len() => Ok(()),
            _ => Err(EditError::OutOfRange {
                line: at.line,
                col: at.col,
            }),
        }
    }

    fn check_symbol_coord(&self, at: Cursor) -> Result<()> {
        match self.lines.get(at.line) {
            Some(line) if at.col < line.len() => Ok(()),
            _ => Err(EditError::OutOfRange {
                line: at.line,
                col: at.col,
            }),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in self.symbols() {
            f.write_char(symbol.value)?;
        }
        Ok(())
    }
}
