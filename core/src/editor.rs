//! Editor: the replica state machine
//!
//! One Editor owns one Document and one PositionAllocator, connects to a
//! Transport at construction, and exposes the four entry points of the
//! replication protocol: `local_insert`, `local_erase`, `process`, and the
//! flat `contents` view. Local edits mutate the document and emit one
//! message per affected symbol; remote application is symmetric and emits
//! nothing.
//!
//! All entry points are synchronous and run to completion; a host sharing
//! an Editor across threads must serialize access externally.

use crate::allocator::PositionAllocator;
use crate::document::{Cursor, Document};
use crate::error::Result;
use crate::message::{Message, Op};
use crate::symbol::{Symbol, SymbolId};
use crate::transport::Transport;
use crate::SiteId;
use tracing::{debug, warn};

/// A collaborative editing replica
///
/// # Example
///
/// ```rust
/// use editkit_core::{Cursor, Editor, Relay};
///
/// let relay = Relay::new();
/// let mut editor = Editor::new(relay.clone());
///
/// editor.local_insert(Cursor::new(0, 0), 'h').unwrap();
/// editor.local_insert(Cursor::new(0, 1), 'i').unwrap();
///
/// assert_eq!(editor.contents(), "hi");
/// ```
#[derive(Debug)]
pub struct Editor<T: Transport> {
    site_id: SiteId,
    /// Monotone mint counter for locally originated symbol ids. Remote
    /// application never touches it.
    id_counter: u64,
    document: Document,
    allocator: PositionAllocator,
    transport: T,
}

impl<T: Transport> Editor<T> {
    /// Connect to `transport` and start with an empty document
    pub fn new(transport: T) -> Self {
        Self::build(transport, PositionAllocator::new())
    }

    /// Connect with a fixed allocator seed, for deterministic tests
    pub fn with_seed(transport: T, seed: u64) -> Self {
        Self::build(transport, PositionAllocator::with_seed(seed))
    }

    fn build(mut transport: T, allocator: PositionAllocator) -> Self {
        let site_id = transport.connect();
        Self {
            site_id,
            id_counter: 0,
            document: Document::new(),
            allocator,
            transport,
        }
    }

    /// Site id assigned by the transport
    pub fn site_id(&self) -> SiteId {
        self.site_id
    }

    /// Number of live symbols, newlines included
    pub fn len(&self) -> usize {
        self.document.len()
    }

    /// Whether the document holds no symbols
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// Read-only view of the document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Flat character view, newlines included
    pub fn contents(&self) -> String {
        self.document.to_string()
    }

    /// Release this replica's site id
    pub fn disconnect(mut self) {
        let site = self.site_id;
        self.transport.disconnect(site);
    }

    /// Insert `value` at the cursor and broadcast the insertion
    ///
    /// A cursor past a line-terminating newline is normalized to the start
    /// of the next line, so the newline always stays last on its line.
    ///
    /// # Errors
    ///
    /// `EditError::OutOfRange` for a cursor outside the document and
    /// `EditError::InvalidInterval` for a broken neighbor order. Either
    /// way the document is unchanged and nothing is emitted.
    pub fn local_insert(&mut self, at: Cursor, value: char) -> Result<()> {
        let outcome = self.apply_local_insert(at, value);
        if let Err(err) = &outcome {
            warn!(site = self.site_id, %err, "local insert aborted");
        }
        outcome
    }

    fn apply_local_insert(&mut self, at: Cursor, value: char) -> Result<()> {
        let at = self.normalize(at);

        let before = self.document.pos_before(at)?;
        let after = self.document.pos_after(at)?;
        let position = self.allocator.between(&before, &after)?;

        let id = SymbolId::new(self.site_id, self.id_counter);
        self.id_counter += 1;

        let symbol = Symbol::new(value, id, position);
        self.document.insert_symbol(at, symbol.clone())?;
        self.transport.send(Message::insert(symbol, self.site_id));
        Ok(())
    }

    /// Erase the inclusive symbol range `[from, to]` and broadcast one
    /// DELETE per removed symbol, in document order
    ///
    /// Erasing on an empty document is a no-op.
    ///
    /// # Errors
    ///
    /// `EditError::OutOfRange` when either endpoint does not name a live
    /// symbol or the range is inverted; the document is unchanged and
    /// nothing is emitted.
    pub fn local_erase(&mut self, from: Cursor, to: Cursor) -> Result<()> {
        let outcome = self.apply_local_erase(from, to);
        if let Err(err) = &outcome {
            warn!(site = self.site_id, %err, "local erase aborted");
        }
        outcome
    }

    fn apply_local_erase(&mut self, from: Cursor, to: Cursor) -> Result<()> {
        let removed = self.document.erase_range(from, to)?;
        for symbol in removed {
            self.transport.send(Message::delete(symbol, self.site_id));
        }
        Ok(())
    }

    /// Apply a message received from a peer
    ///
    /// Remote application is defensive: a DELETE whose target is unknown
    /// is ignored (delivery is at-least-once), and nothing is ever emitted
    /// back to the transport.
    pub fn process(&mut self, message: Message) {
        match message.op {
            Op::Insert => self.remote_insert(message.symbol),
            Op::Delete => self.remote_erase(message.symbol),
        }
    }

    fn remote_insert(&mut self, symbol: Symbol) {
        let at = self.document.placement(&symbol);
        if let Err(err) = self.document.insert_symbol(at, symbol) {
            debug!(site = self.site_id, %err, "remote insert dropped");
        }
    }

    fn remote_erase(&mut self, symbol: Symbol) {
        if self.document.remove_symbol(&symbol).is_none() {
            debug!(
                site = self.site_id,
                id = %symbol.id,
                "delete for unknown symbol ignored"
            );
        }
    }

    /// Reinterpret a tail-of-line cursor past a newline as the start of
    /// the next line
    fn normalize(&self, at: Cursor) -> Cursor {
        if let Some(line) = self.document.line(at.line) {
            let past_newline = !line.is_empty()
                && at.col >= line.len()
                && line.last().is_some_and(Symbol::is_newline);
            if past_newline {
                return Cursor::new(at.line + 1, 0);
            }
        }
        at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditError;
    use crate::position::{Position, BASE};
    use crate::transport::Relay;

    /// Transport that keeps everything it is asked to send, for asserting
    /// on emitted messages
    #[derive(Debug, Default)]
    struct Outbox {
        sent: Vec<Message>,
    }

    impl Transport for Outbox {
        fn connect(&mut self) -> SiteId {
            0
        }

        fn disconnect(&mut self, _site: SiteId) {}

        fn send(&mut self, message: Message) {
            self.sent.push(message);
        }
    }

    fn type_string(editor: &mut Editor<impl Transport>, text: &str) {
        let mut line = 0;
        let mut col = 0;
        for ch in text.chars() {
            editor.local_insert(Cursor::new(line, col), ch).unwrap();
            if ch == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
    }

    #[test]
    fn test_first_insert_emits_insert_message() {
        let mut editor = Editor::with_seed(Outbox::default(), 1);

        editor.local_insert(Cursor::new(0, 0), 'a').unwrap();

        assert_eq!(editor.contents(), "a");
        assert_eq!(editor.transport.sent.len(), 1);

        let message = &editor.transport.sent[0];
        assert_eq!(message.op, Op::Insert);
        assert_eq!(message.symbol.value, 'a');
        assert_eq!(message.origin, 0);

        let first = message.symbol.position.component(0).unwrap();
        assert!(first > 0 && first < BASE);
    }

    #[test]
    fn test_typing_builds_document() {
        let mut editor = Editor::with_seed(Outbox::default(), 2);

        type_string(&mut editor, "hello\nworld");

        assert_eq!(editor.contents(), "hello\nworld");
        assert_eq!(editor.len(), 11);
        assert_eq!(editor.document().line_count(), 2);
    }

    #[test]
    fn test_newline_splits_line() {
        let mut editor = Editor::with_seed(Outbox::default(), 3);
        type_string(&mut editor, "abcd");

        editor.local_insert(Cursor::new(0, 2), '\n').unwrap();

        assert_eq!(editor.document().line_count(), 2);
        assert_eq!(editor.contents(), "ab\ncd");
    }

    #[test]
    fn test_insert_past_newline_lands_on_next_line() {
        let mut editor = Editor::with_seed(Outbox::default(), 4);
        type_string(&mut editor, "hi\n");

        // Column 3 of line 0 sits past the newline: same spot as (1, 0).
        editor.local_insert(Cursor::new(0, 3), 'x').unwrap();

        assert_eq!(editor.contents(), "hi\nx");
        assert_eq!(editor.document().line(1).unwrap().len(), 1);
    }

    #[test]
    fn test_out_of_range_insert_leaves_document_unchanged() {
        let mut editor = Editor::with_seed(Outbox::default(), 5);
        type_string(&mut editor, "ab");
        let emitted = editor.transport.sent.len();

        let err = editor.local_insert(Cursor::new(4, 0), 'x').unwrap_err();

        assert!(matches!(err, EditError::OutOfRange { .. }));
        assert_eq!(editor.contents(), "ab");
        assert_eq!(editor.transport.sent.len(), emitted);
    }

    #[test]
    fn test_erase_emits_one_delete_per_symbol_in_order() {
        let mut editor = Editor::with_seed(Outbox::default(), 6);
        type_string(&mut editor, "abcd");
        editor.transport.sent.clear();

        editor
            .local_erase(Cursor::new(0, 1), Cursor::new(0, 2))
            .unwrap();

        assert_eq!(editor.contents(), "ad");
        let values: Vec<char> = editor
            .transport
            .sent
            .iter()
            .map(|m| {
                assert_eq!(m.op, Op::Delete);
                m.symbol.value
            })
            .collect();
        assert_eq!(values, vec!['b', 'c']);
    }

    #[test]
    fn test_erase_across_lines() {
        let mut editor = Editor::with_seed(Outbox::default(), 7);
        type_string(&mut editor, "ab\ncd\nef");

        editor
            .local_erase(Cursor::new(0, 1), Cursor::new(2, 0))
            .unwrap();

        assert_eq!(editor.contents(), "af");
        assert_eq!(editor.document().line_count(), 1);
    }

    #[test]
    fn test_erase_on_empty_document_is_noop() {
        let mut editor = Editor::with_seed(Outbox::default(), 8);

        editor
            .local_erase(Cursor::new(0, 0), Cursor::new(0, 0))
            .unwrap();

        assert_eq!(editor.contents(), "");
        assert!(editor.transport.sent.is_empty());
    }

    #[test]
    fn test_remote_delete_of_unknown_symbol_is_ignored() {
        let relay = Relay::new();
        let mut editor = Editor::new(relay.clone());

        let stranger = Symbol::new('q', SymbolId::new(7, 3), Position::from(vec![5]));
        editor.process(Message::delete(stranger, 7));

        assert_eq!(editor.contents(), "");
        assert_eq!(relay.pending(), 0);
    }

    #[test]
    fn test_remote_insert_places_by_position() {
        let mut editor = Editor::with_seed(Outbox::default(), 9);
        type_string(&mut editor, "ac");

        // A position strictly between the two typed symbols.
        let a_pos = editor.document().line(0).unwrap()[0].position.clone();
        let c_pos = editor.document().line(0).unwrap()[1].position.clone();
        let mut probe = PositionAllocator::with_seed(10);
        let between = probe.between(&a_pos, &c_pos).unwrap();

        let symbol = Symbol::new('b', SymbolId::new(1, 0), between);
        editor.process(Message::insert(symbol, 1));

        assert_eq!(editor.contents(), "abc");
    }

    #[test]
    fn test_remote_insert_does_not_advance_local_id_counter() {
        let mut editor = Editor::with_seed(Outbox::default(), 11);
        type_string(&mut editor, "a");

        let symbol = Symbol::new('z', SymbolId::new(1, 0), Position::from(vec![30]));
        editor.process(Message::insert(symbol, 1));
        editor.local_insert(Cursor::new(0, 0), 'y').unwrap();

        // Two local inserts total: seqs 0 and 1, untouched by the remote.
        let last = editor.transport.sent.last().unwrap();
        assert_eq!(last.symbol.id, SymbolId::new(0, 1));
    }
}
