//! Transport contract and the reference broadcast relay
//!
//! The core only needs three things from a transport: a site id at connect,
//! a goodbye at disconnect, and a mailbox for outgoing messages. `Relay`
//! is the in-process reference implementation used throughout the tests: a
//! cheaply cloneable handle over a shared FIFO buffer that delivers every
//! buffered message to every connected replica except its origin.

use crate::editor::Editor;
use crate::message::Message;
use crate::SiteId;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::debug;

/// What a replica requires from its transport
///
/// Implementations must hand out site ids that never overlap between
/// currently-connected replicas, and must not deliver a message back to
/// its origin.
pub trait Transport {
    /// Register a replica and assign it a site id
    fn connect(&mut self) -> SiteId;

    /// Release a previously assigned site id
    fn disconnect(&mut self, site: SiteId);

    /// Enqueue a message for delivery to every other connected replica
    fn send(&mut self, message: Message);
}

/// In-process broadcast relay
///
/// Clones share one underlying state, so every replica can own a handle.
/// Messages accumulate in FIFO order until `dispatch` drains them into a
/// caller-provided set of replicas.
///
/// # Example
///
/// ```rust
/// use editkit_core::{Cursor, Editor, Relay};
///
/// let relay = Relay::new();
/// let mut a = Editor::new(relay.clone());
/// let mut b = Editor::new(relay.clone());
///
/// a.local_insert(Cursor::new(0, 0), 'x').unwrap();
/// relay.dispatch([&mut a, &mut b]);
///
/// assert_eq!(a.contents(), b.contents());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Relay {
    shared: Rc<RefCell<RelayState>>,
}

#[derive(Debug, Default)]
struct RelayState {
    next_site: SiteId,
    connected: BTreeSet<SiteId>,
    queue: VecDeque<Message>,
}

impl Relay {
    /// Create a relay with no connected replicas
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages waiting for dispatch
    pub fn pending(&self) -> usize {
        self.shared.borrow().queue.len()
    }

    /// Number of currently connected replicas
    pub fn connected(&self) -> usize {
        self.shared.borrow().connected.len()
    }

    /// Deliver every buffered message to every replica whose site id
    /// differs from the message's origin, then clear the buffer
    pub fn dispatch<'a, I>(&self, editors: I)
    where
        I: IntoIterator<Item = &'a mut Editor<Relay>>,
    {
        let drained: Vec<Message> = self.shared.borrow_mut().queue.drain(..).collect();
        let mut editors: Vec<&mut Editor<Relay>> = editors.into_iter().collect();

        debug!(
            messages = drained.len(),
            replicas = editors.len(),
            "dispatching buffered messages"
        );

        for message in drained {
            for editor in editors.iter_mut() {
                if editor.site_id() != message.origin {
                    editor.process(message.clone());
                }
            }
        }
    }
}

impl Transport for Relay {
    fn connect(&mut self) -> SiteId {
        let mut state = self.shared.borrow_mut();
        let site = state.next_site;
        state.next_site += 1;
        state.connected.insert(site);
        site
    }

    fn disconnect(&mut self, site: SiteId) {
        self.shared.borrow_mut().connected.remove(&site);
    }

    fn send(&mut self, message: Message) {
        self.shared.borrow_mut().queue.push_back(message);
    }
}
