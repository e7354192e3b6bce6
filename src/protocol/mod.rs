//! Wire protocol for netfs client/server communication.
//!
//! # Frame Format
//!
//! ```text
//! +----------------+-----------+---------+
//! | payload_length | operation | payload |
//! |   (4 bytes)    | (1 byte)  | (N bytes)|
//! +----------------+-----------+---------+
//! ```
//!
//! - `payload_length` is a big-endian u32 giving the payload size
//! - `operation` is a single opcode byte identifying the payload schema
//! - every multi-byte integer in a payload is big-endian
//!
//! Decoding is two-phase: the fixed 5-byte header is read first, then exactly
//! `payload_length` further bytes. Requests pair 1:1 with replies and
//! [`Opcode::Error`] may substitute for any reply.

mod request;
mod response;
mod types;
mod wire;

pub use request::{Request, READ_REQUEST_FIXED_SIZE};
pub use response::Response;
pub use types::{decode_entries, encode_entries, FileAttributes, ATTRS_SIZE, MAX_NAME_LEN};
pub use wire::{read_message, write_message, Message, HEADER_SIZE, MAX_MESSAGE_SIZE};

/// Single-byte tag identifying a message's kind and payload schema.
///
/// Values 5 and 6 are reserved and unused; they are skipped to preserve wire
/// compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    GetAttr = 1,
    GetAttrReply = 2,
    ReadDir = 3,
    ReadDirReply = 4,
    Read = 7,
    ReadReply = 8,
    Error = 9,
}

impl Opcode {
    /// Decode an opcode byte. Returns `None` for unknown values.
    pub fn from_u8(op: u8) -> Option<Self> {
        match op {
            1 => Some(Opcode::GetAttr),
            2 => Some(Opcode::GetAttrReply),
            3 => Some(Opcode::ReadDir),
            4 => Some(Opcode::ReadDirReply),
            7 => Some(Opcode::Read),
            8 => Some(Opcode::ReadReply),
            9 => Some(Opcode::Error),
            _ => None,
        }
    }

    /// The raw wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The reply opcode paired with this request opcode, if it is a request.
    pub fn reply(self) -> Option<Self> {
        match self {
            Opcode::GetAttr => Some(Opcode::GetAttrReply),
            Opcode::ReadDir => Some(Opcode::ReadDirReply),
            Opcode::Read => Some(Opcode::ReadReply),
            _ => None,
        }
    }
}

/// Errors produced by the typed encode/decode functions.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),

    #[error("payload truncated: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("directory entry at offset {offset} overruns payload of {len} bytes")]
    TruncatedEntry { offset: usize, len: usize },

    #[error("directory entry name too long: {0} bytes (max 255)")]
    NameTooLong(usize),

    #[error("path too long: {0} bytes")]
    PathTooLong(usize),

    #[error("message too large: {0} bytes")]
    TooLarge(usize),
}
