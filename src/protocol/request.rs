//! Request messages from client to server.

use super::{Message, Opcode, ProtocolError};

/// Fixed part of a `Read` request payload: path_len (u32) + file_offset (u64)
/// + count (u64). The path bytes follow immediately after.
pub const READ_REQUEST_FIXED_SIZE: usize = 20;

/// A request the client wants the server to perform against its storage root.
///
/// Paths travel as raw bytes (platform byte strings); for `GetAttr` and
/// `ReadDir` the path is the whole payload and its length is implied by the
/// frame header, while `Read` carries an explicit path length inside its
/// fixed part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Look up file attributes.
    GetAttr { path: Vec<u8> },

    /// List directory entry names.
    ReadDir { path: Vec<u8> },

    /// Read up to `count` bytes starting at `offset`.
    Read {
        path: Vec<u8>,
        offset: u64,
        count: u64,
    },
}

impl Request {
    /// The opcode this request is sent under.
    pub fn opcode(&self) -> Opcode {
        match self {
            Request::GetAttr { .. } => Opcode::GetAttr,
            Request::ReadDir { .. } => Opcode::ReadDir,
            Request::Read { .. } => Opcode::Read,
        }
    }

    /// The reply opcode the client expects for this request.
    pub fn reply_opcode(&self) -> Opcode {
        match self {
            Request::GetAttr { .. } => Opcode::GetAttrReply,
            Request::ReadDir { .. } => Opcode::ReadDirReply,
            Request::Read { .. } => Opcode::ReadReply,
        }
    }

    /// The client-supplied path bytes.
    pub fn path(&self) -> &[u8] {
        match self {
            Request::GetAttr { path } | Request::ReadDir { path } | Request::Read { path, .. } => {
                path
            }
        }
    }

    /// Encode into a wire message.
    pub fn encode(&self) -> Result<Message, ProtocolError> {
        let path = self.path();
        if path.len() > u32::MAX as usize {
            return Err(ProtocolError::PathTooLong(path.len()));
        }
        let payload = match self {
            Request::GetAttr { path } | Request::ReadDir { path } => path.clone(),
            Request::Read {
                path,
                offset,
                count,
            } => {
                let mut buf = Vec::with_capacity(READ_REQUEST_FIXED_SIZE + path.len());
                buf.extend_from_slice(&(path.len() as u32).to_be_bytes());
                buf.extend_from_slice(&offset.to_be_bytes());
                buf.extend_from_slice(&count.to_be_bytes());
                buf.extend_from_slice(path);
                buf
            }
        };
        Ok(Message::new(self.opcode(), payload))
    }

    /// Decode a received wire message into a typed request.
    ///
    /// Used on the server side; a non-request opcode (including the reserved
    /// values) is an [`ProtocolError::UnknownOpcode`].
    pub fn decode(msg: &Message) -> Result<Self, ProtocolError> {
        match msg.opcode() {
            Some(Opcode::GetAttr) => Ok(Request::GetAttr {
                path: msg.payload.clone(),
            }),
            Some(Opcode::ReadDir) => Ok(Request::ReadDir {
                path: msg.payload.clone(),
            }),
            Some(Opcode::Read) => {
                let payload = &msg.payload;
                if payload.len() < READ_REQUEST_FIXED_SIZE {
                    return Err(ProtocolError::Truncated {
                        need: READ_REQUEST_FIXED_SIZE,
                        have: payload.len(),
                    });
                }
                let path_len =
                    u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;
                let offset = u64::from_be_bytes([
                    payload[4], payload[5], payload[6], payload[7], payload[8], payload[9],
                    payload[10], payload[11],
                ]);
                let count = u64::from_be_bytes([
                    payload[12], payload[13], payload[14], payload[15], payload[16], payload[17],
                    payload[18], payload[19],
                ]);
                let path_end = READ_REQUEST_FIXED_SIZE + path_len;
                if payload.len() < path_end {
                    return Err(ProtocolError::Truncated {
                        need: path_end,
                        have: payload.len(),
                    });
                }
                Ok(Request::Read {
                    path: payload[READ_REQUEST_FIXED_SIZE..path_end].to_vec(),
                    offset,
                    count,
                })
            }
            _ => Err(ProtocolError::UnknownOpcode(msg.opcode)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getattr_roundtrip() {
        let req = Request::GetAttr {
            path: b"/a.txt".to_vec(),
        };
        let msg = req.encode().unwrap();
        assert_eq!(msg.opcode(), Some(Opcode::GetAttr));
        assert_eq!(msg.payload, b"/a.txt");
        assert_eq!(Request::decode(&msg).unwrap(), req);
    }

    #[test]
    fn test_readdir_roundtrip() {
        let req = Request::ReadDir {
            path: b"/".to_vec(),
        };
        let msg = req.encode().unwrap();
        assert_eq!(msg.opcode(), Some(Opcode::ReadDir));
        assert_eq!(Request::decode(&msg).unwrap(), req);
    }

    #[test]
    fn test_read_layout() {
        let req = Request::Read {
            path: b"/a.txt".to_vec(),
            offset: 5,
            count: 100,
        };
        let msg = req.encode().unwrap();
        assert_eq!(msg.opcode(), Some(Opcode::Read));

        // path_len:u32 | offset:u64 | count:u64 | path bytes
        assert_eq!(&msg.payload[..4], &6u32.to_be_bytes());
        assert_eq!(&msg.payload[4..12], &5u64.to_be_bytes());
        assert_eq!(&msg.payload[12..20], &100u64.to_be_bytes());
        assert_eq!(&msg.payload[20..], b"/a.txt");

        assert_eq!(Request::decode(&msg).unwrap(), req);
    }

    #[test]
    fn test_read_offsets_beyond_u32() {
        let req = Request::Read {
            path: b"/big".to_vec(),
            offset: u64::MAX - 7,
            count: 1 << 40,
        };
        let decoded = Request::decode(&req.encode().unwrap()).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn test_read_truncated_fixed_part() {
        let msg = Message::new(Opcode::Read, vec![0u8; READ_REQUEST_FIXED_SIZE - 1]);
        assert!(matches!(
            Request::decode(&msg),
            Err(ProtocolError::Truncated { need: 20, have: 19 })
        ));
    }

    #[test]
    fn test_read_truncated_path() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&10u32.to_be_bytes()); // declares 10 path bytes
        payload.extend_from_slice(&0u64.to_be_bytes());
        payload.extend_from_slice(&0u64.to_be_bytes());
        payload.extend_from_slice(b"abc"); // only 3 follow
        let msg = Message {
            opcode: Opcode::Read.as_u8(),
            payload,
        };
        assert!(matches!(
            Request::decode(&msg),
            Err(ProtocolError::Truncated { need: 30, have: 23 })
        ));
    }

    #[test]
    fn test_decode_non_request_opcode() {
        let msg = Message::new(Opcode::GetAttrReply, vec![0u8; 32]);
        assert!(matches!(
            Request::decode(&msg),
            Err(ProtocolError::UnknownOpcode(2))
        ));

        let msg = Message {
            opcode: 5, // reserved
            payload: Vec::new(),
        };
        assert!(matches!(
            Request::decode(&msg),
            Err(ProtocolError::UnknownOpcode(5))
        ));
    }
}
