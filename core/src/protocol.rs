//! Wire codec: convert messages to/from the network byte format
//!
//! The wire format is Protocol Buffers, with the message structs written
//! out by hand rather than generated. The symbol id travels as the
//! `"{site}_{counter}"` string form and the operation kind as the signed
//! integers +1 (INSERT) and -1 (DELETE); decoding validates both before a
//! message ever reaches a replica.

use crate::error::{EditError, Result};
use crate::message::{Message, Op};
use crate::position::Position;
use crate::symbol::Symbol;
use bytes::{Bytes, BytesMut};
use prost::Message as _;

/// Wire value of `Op::Insert`
pub const INSERT_KIND: i32 = 1;

/// Wire value of `Op::Delete`
pub const DELETE_KIND: i32 = -1;

/// Wire form of a Symbol
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireSymbol {
    /// Single-character string holding the symbol value
    #[prost(string, tag = "1")]
    pub value: String,

    /// Identity in `"{site}_{counter}"` form
    #[prost(string, tag = "2")]
    pub id: String,

    /// Position components, outermost level first
    #[prost(uint64, repeated, tag = "3")]
    pub position: Vec<u64>,
}

/// Wire form of a Message
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireMessage {
    /// +1 for INSERT, -1 for DELETE
    #[prost(int32, tag = "1")]
    pub kind: i32,

    /// The affected symbol
    #[prost(message, optional, tag = "2")]
    pub symbol: Option<WireSymbol>,

    /// Originating site id
    #[prost(uint32, tag = "3")]
    pub origin: u32,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        let kind = match message.op {
            Op::Insert => INSERT_KIND,
            Op::Delete => DELETE_KIND,
        };
        WireMessage {
            kind,
            symbol: Some(WireSymbol {
                value: message.symbol.value.to_string(),
                id: message.symbol.id.to_string(),
                position: message.symbol.position.components().to_vec(),
            }),
            origin: message.origin,
        }
    }
}

impl TryFrom<WireMessage> for Message {
    type Error = EditError;

    fn try_from(wire: WireMessage) -> Result<Self> {
        let op = match wire.kind {
            INSERT_KIND => Op::Insert,
            DELETE_KIND => Op::Delete,
            other => return Err(EditError::UnknownOperation(other)),
        };

        let symbol = wire
            .symbol
            .ok_or_else(|| EditError::Protocol("message without symbol".to_string()))?;

        let mut chars = symbol.value.chars();
        let value = chars
            .next()
            .ok_or_else(|| EditError::Protocol("empty symbol value".to_string()))?;
        if chars.next().is_some() {
            return Err(EditError::Protocol(format!(
                "symbol value is not a single character: {:?}",
                symbol.value
            )));
        }

        let id = symbol.id.parse()?;

        Ok(Message {
            op,
            symbol: Symbol::new(value, id, Position::from(symbol.position)),
            origin: wire.origin,
        })
    }
}

/// Serialize a message to wire bytes
pub fn encode_message(message: &Message) -> Result<Bytes> {
    let wire = WireMessage::from(message);
    let mut buf = BytesMut::with_capacity(wire.encoded_len());
    wire.encode(&mut buf)
        .map_err(|e| EditError::Protocol(format!("failed to encode message: {e}")))?;
    Ok(buf.freeze())
}

/// Deserialize a message from wire bytes
pub fn decode_message(bytes: &[u8]) -> Result<Message> {
    let wire = WireMessage::decode(bytes)
        .map_err(|e| EditError::Protocol(format!("failed to decode message: {e}")))?;
    Message::try_from(wire)
}
