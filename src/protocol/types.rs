//! Attribute and directory-listing payloads.

use super::ProtocolError;
use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;

/// Encoded size of a [`FileAttributes`] payload: eight u32 fields.
pub const ATTRS_SIZE: usize = 32;

/// Maximum encodable directory entry name: the length prefix is one byte.
pub const MAX_NAME_LEN: usize = u8::MAX as usize;

/// POSIX-style file metadata as carried on the wire.
///
/// Every field is an unsigned 32-bit integer in network byte order. This is a
/// deliberate wire-compatibility limitation: file sizes above 4 GiB and
/// timestamps outside the 32-bit Unix epoch range silently truncate. Widening
/// any field would break the frame layout, so the limitation is documented
/// here instead of fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileAttributes {
    pub mode: u32,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
    pub atime: u32,
    pub mtime: u32,
    pub ctime: u32,
}

impl FileAttributes {
    /// Build attributes from local metadata, truncating to the wire widths.
    pub fn from_metadata(meta: &Metadata) -> Self {
        Self {
            mode: meta.mode(),
            nlink: meta.nlink() as u32,
            uid: meta.uid(),
            gid: meta.gid(),
            size: meta.size() as u32,
            atime: meta.atime() as u32,
            mtime: meta.mtime() as u32,
            ctime: meta.ctime() as u32,
        }
    }

    /// Encode as the fixed 32-byte reply payload, fields big-endian.
    pub fn encode(&self) -> [u8; ATTRS_SIZE] {
        let mut buf = [0u8; ATTRS_SIZE];
        let fields = [
            self.mode, self.nlink, self.uid, self.gid, self.size, self.atime, self.mtime,
            self.ctime,
        ];
        for (i, field) in fields.iter().enumerate() {
            buf[i * 4..i * 4 + 4].copy_from_slice(&field.to_be_bytes());
        }
        buf
    }

    /// Decode from a reply payload.
    ///
    /// Trailing bytes beyond the fixed block are ignored; decoding is
    /// best-effort on the client side.
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        if payload.len() < ATTRS_SIZE {
            return Err(ProtocolError::Truncated {
                need: ATTRS_SIZE,
                have: payload.len(),
            });
        }
        let field = |i: usize| {
            u32::from_be_bytes([
                payload[i * 4],
                payload[i * 4 + 1],
                payload[i * 4 + 2],
                payload[i * 4 + 3],
            ])
        };
        Ok(Self {
            mode: field(0),
            nlink: field(1),
            uid: field(2),
            gid: field(3),
            size: field(4),
            atime: field(5),
            mtime: field(6),
            ctime: field(7),
        })
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        (self.mode & libc::S_IFMT as u32) == libc::S_IFDIR as u32
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        (self.mode & libc::S_IFMT as u32) == libc::S_IFREG as u32
    }

    /// Check if this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        (self.mode & libc::S_IFMT as u32) == libc::S_IFLNK as u32
    }
}

/// Encode directory entry names into the listing payload.
///
/// Each entry is one length byte followed by that many raw name bytes, with
/// no separator and no terminator. Names longer than 255 bytes cannot be
/// represented in this format.
pub fn encode_entries<N: AsRef<[u8]>>(names: &[N]) -> Result<Vec<u8>, ProtocolError> {
    let mut payload = Vec::new();
    for name in names {
        let name = name.as_ref();
        if name.len() > MAX_NAME_LEN {
            return Err(ProtocolError::NameTooLong(name.len()));
        }
        payload.push(name.len() as u8);
        payload.extend_from_slice(name);
    }
    Ok(payload)
}

/// Decode a listing payload into entry names.
///
/// The cursor stops exactly at the payload length; an entry whose declared
/// length would read past the end is malformed.
pub fn decode_entries(payload: &[u8]) -> Result<Vec<Vec<u8>>, ProtocolError> {
    let mut names = Vec::new();
    let mut cursor = 0usize;
    while cursor < payload.len() {
        let name_len = payload[cursor] as usize;
        let start = cursor + 1;
        let end = start + name_len;
        if end > payload.len() {
            return Err(ProtocolError::TruncatedEntry {
                offset: cursor,
                len: payload.len(),
            });
        }
        names.push(payload[start..end].to_vec());
        cursor = end;
    }
    Ok(names)
}
