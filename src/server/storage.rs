//! Local storage access behind the protocol: path resolution with
//! containment, metadata lookup, directory enumeration, offset reads.

use crate::protocol::{FileAttributes, MAX_NAME_LEN};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Component, Path, PathBuf};

/// The server-local base directory all client paths resolve against.
///
/// Shared read-only by every connection handler; the filesystem itself
/// provides whatever synchronization local I/O needs.
#[derive(Debug)]
pub struct StorageRoot {
    root: PathBuf,
}

impl StorageRoot {
    /// Create a storage root at the given directory.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The configured base directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a client-supplied path against the root.
    ///
    /// Leading slashes are stripped (client paths are absolute within the
    /// remote tree, `/` being the root itself) and the remainder is joined
    /// under the root. The combined path is rejected with `EACCES` if any
    /// component is a parent-directory reference.
    ///
    /// This is a textual check, not canonicalization: it blocks `..`
    /// traversal strings but a symlink inside the root can still point
    /// outside it. The error code is deliberately the same shape as any
    /// other operation failure, so the peer cannot distinguish a blocked
    /// traversal from an ordinary permission error.
    pub fn resolve(&self, client_path: &[u8]) -> Result<PathBuf, i32> {
        let mut rel = client_path;
        while let Some(rest) = rel.strip_prefix(b"/") {
            rel = rest;
        }
        let full = self.root.join(Path::new(OsStr::from_bytes(rel)));
        if full
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(libc::EACCES);
        }
        Ok(full)
    }

    /// Look up file attributes, truncated to the wire widths.
    pub fn getattr(&self, path: &Path) -> io::Result<FileAttributes> {
        let meta = std::fs::metadata(path)?;
        Ok(FileAttributes::from_metadata(&meta))
    }

    /// Enumerate directory entry names, in whatever order the OS yields.
    ///
    /// Names longer than the listing format's 255-byte limit fail the whole
    /// enumeration with `ENAMETOOLONG` rather than being silently dropped.
    pub fn read_dir(&self, path: &Path) -> io::Result<Vec<Vec<u8>>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let name = entry.file_name().into_vec();
            if name.len() > MAX_NAME_LEN {
                return Err(io::Error::from_raw_os_error(libc::ENAMETOOLONG));
            }
            names.push(name);
        }
        Ok(names)
    }

    /// Read up to `count` bytes starting at `offset`.
    ///
    /// Reads until `count` bytes are collected or end-of-file, whichever
    /// comes first; a short result near the end of the file is normal.
    pub fn read_at(&self, path: &Path, offset: u64, count: u64) -> io::Result<Vec<u8>> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut data = Vec::new();
        file.take(count).read_to_end(&mut data)?;
        Ok(data)
    }
}

/// Extract the platform error code from an I/O failure.
pub(crate) fn errno_of(err: &io::Error) -> i32 {
    err.raw_os_error().unwrap_or(libc::EIO)
}
