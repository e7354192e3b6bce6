//! Reply messages from server to client.

use super::types::{decode_entries, encode_entries, FileAttributes};
use super::{Message, Opcode, ProtocolError};

/// A server reply. [`Response::Error`] may substitute for any success reply;
/// it carries a platform error code (errno semantics) as a u32 on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// File attributes (reply to `GetAttr`).
    Attrs(FileAttributes),

    /// Directory entry names (reply to `ReadDir`).
    Listing(Vec<Vec<u8>>),

    /// File bytes, possibly fewer than requested (reply to `Read`).
    Data(Vec<u8>),

    /// The requested operation failed with this error code.
    Error(i32),
}

impl Response {
    /// Create an error reply.
    pub fn error(errno: i32) -> Self {
        Response::Error(errno)
    }

    /// The opcode this reply is sent under.
    pub fn opcode(&self) -> Opcode {
        match self {
            Response::Attrs(_) => Opcode::GetAttrReply,
            Response::Listing(_) => Opcode::ReadDirReply,
            Response::Data(_) => Opcode::ReadReply,
            Response::Error(_) => Opcode::Error,
        }
    }

    /// The carried error code, if this is an error reply.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Response::Error(errno) => Some(*errno),
            _ => None,
        }
    }

    /// Encode into a wire message.
    pub fn encode(&self) -> Result<Message, ProtocolError> {
        let payload = match self {
            Response::Attrs(attrs) => attrs.encode().to_vec(),
            Response::Listing(names) => encode_entries(names)?,
            Response::Data(data) => data.clone(),
            Response::Error(errno) => (*errno as u32).to_be_bytes().to_vec(),
        };
        Ok(Message::new(self.opcode(), payload))
    }

    /// Decode a received reply, given the success opcode the caller expects.
    ///
    /// An `Error` opcode always decodes as [`Response::Error`]. Any other
    /// opcode, including one that does not match `expected`, is decoded
    /// best-effort as the expected kind; the caller is responsible for
    /// logging the mismatch before calling this.
    pub fn decode(expected: Opcode, msg: &Message) -> Result<Self, ProtocolError> {
        if msg.opcode() == Some(Opcode::Error) {
            return Ok(Response::Error(decode_errno(&msg.payload)?));
        }
        match expected {
            Opcode::GetAttrReply => Ok(Response::Attrs(FileAttributes::decode(&msg.payload)?)),
            Opcode::ReadDirReply => Ok(Response::Listing(decode_entries(&msg.payload)?)),
            Opcode::ReadReply => Ok(Response::Data(msg.payload.clone())),
            other => Err(ProtocolError::UnknownOpcode(other.as_u8())),
        }
    }
}

/// Decode the u32 error code carried in an `Error` payload.
pub(crate) fn decode_errno(payload: &[u8]) -> Result<i32, ProtocolError> {
    if payload.len() < 4 {
        return Err(ProtocolError::Truncated {
            need: 4,
            have: payload.len(),
        });
    }
    Ok(u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attrs_reply_roundtrip() {
        let resp = Response::Attrs(FileAttributes {
            mode: 0o100644,
            nlink: 1,
            uid: 1000,
            gid: 1000,
            size: 10,
            atime: 1,
            mtime: 2,
            ctime: 3,
        });
        let msg = resp.encode().unwrap();
        assert_eq!(msg.opcode(), Some(Opcode::GetAttrReply));
        assert_eq!(Response::decode(Opcode::GetAttrReply, &msg).unwrap(), resp);
    }

    #[test]
    fn test_listing_reply_roundtrip() {
        let resp = Response::Listing(vec![b"x".to_vec(), b"y".to_vec()]);
        let msg = resp.encode().unwrap();
        assert_eq!(msg.opcode(), Some(Opcode::ReadDirReply));
        assert_eq!(Response::decode(Opcode::ReadDirReply, &msg).unwrap(), resp);
    }

    #[test]
    fn test_data_reply_roundtrip() {
        let resp = Response::Data(b"file contents".to_vec());
        let msg = resp.encode().unwrap();
        assert_eq!(msg.opcode(), Some(Opcode::ReadReply));
        assert_eq!(Response::decode(Opcode::ReadReply, &msg).unwrap(), resp);
    }

    #[test]
    fn test_error_substitutes_for_any_reply() {
        let resp = Response::error(libc::ENOENT);
        let msg = resp.encode().unwrap();
        assert_eq!(msg.opcode(), Some(Opcode::Error));
        assert_eq!(&msg.payload, &(libc::ENOENT as u32).to_be_bytes());

        for expected in [Opcode::GetAttrReply, Opcode::ReadDirReply, Opcode::ReadReply] {
            let decoded = Response::decode(expected, &msg).unwrap();
            assert_eq!(decoded.errno(), Some(libc::ENOENT));
        }
    }

    #[test]
    fn test_error_payload_truncated() {
        let msg = Message::new(Opcode::Error, vec![0u8; 3]);
        assert!(matches!(
            Response::decode(Opcode::GetAttrReply, &msg),
            Err(ProtocolError::Truncated { need: 4, have: 3 })
        ));
    }

    #[test]
    fn test_best_effort_decode_on_opcode_mismatch() {
        // Reply tagged ReadDirReply but the caller expected attributes: the
        // payload is still decoded as attributes (best-effort), mirroring the
        // warn-and-continue client policy.
        let attrs = FileAttributes {
            size: 42,
            ..Default::default()
        };
        let msg = Message::new(Opcode::ReadDirReply, attrs.encode().to_vec());
        let decoded = Response::decode(Opcode::GetAttrReply, &msg).unwrap();
        assert_eq!(decoded, Response::Attrs(attrs));
    }

    #[test]
    fn test_truncated_attrs_payload_rejected() {
        let msg = Message::new(Opcode::GetAttrReply, vec![0u8; 16]);
        assert!(Response::decode(Opcode::GetAttrReply, &msg).is_err());
    }
}
