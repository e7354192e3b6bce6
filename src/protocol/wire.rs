//! Message framing and reliable framed transfer.
//!
//! The header is always sent first and its `payload_length` field tells the
//! receiver exactly how many payload bytes follow. Transfer is all-or-nothing:
//! a short or zero-length read/write surfaces as an `io::Error` (connection
//! lost) and never as partial success. `read_exact` and `write_all` loop over
//! partial transfers internally and report a zero-byte transfer as
//! `UnexpectedEof` / `WriteZero` respectively.

use super::Opcode;
use std::io::{self, Read, Write};

/// Fixed header size: payload_length (4 bytes) + operation (1 byte).
pub const HEADER_SIZE: usize = 5;

/// Maximum accepted payload size (16 MiB).
///
/// A declared length beyond this is treated as a protocol violation rather
/// than attempted as an allocation.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// A decoded message: opcode byte plus opaque payload.
///
/// The opcode is kept raw so that an unknown value survives decoding and the
/// receiver can decide how to treat it (the client logs and continues, the
/// server terminates the connection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub opcode: u8,
    pub payload: Vec<u8>,
}

impl Message {
    /// Create a message with a known opcode.
    pub fn new(opcode: Opcode, payload: Vec<u8>) -> Self {
        Self {
            opcode: opcode.as_u8(),
            payload,
        }
    }

    /// The decoded opcode, if the byte matches a known operation.
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_u8(self.opcode)
    }
}

/// Write one framed message: header first, then the payload verbatim.
pub fn write_message<W: Write>(writer: &mut W, opcode: Opcode, payload: &[u8]) -> io::Result<()> {
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("message too large: {} bytes", payload.len()),
        ));
    }

    let mut header = [0u8; HEADER_SIZE];
    header[..4].copy_from_slice(&(payload.len() as u32).to_be_bytes());
    header[4] = opcode.as_u8();

    writer.write_all(&header)?;
    writer.write_all(payload)?;
    Ok(())
}

/// Read one framed message.
///
/// Two-phase by necessity: the payload length is unknown until the fixed
/// header has been read, so the header is read first and then exactly
/// `payload_length` further bytes.
pub fn read_message<R: Read>(reader: &mut R) -> io::Result<Message> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    let opcode = header[4];

    if len > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("message too large: {} bytes", len),
        ));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(Message { opcode, payload })
}
