//! Per-connection request handler.

use super::storage::{errno_of, StorageRoot};
use crate::protocol::{read_message, write_message, ProtocolError, Request, Response};
use std::io::{Read, Write};
use std::path::Path;

/// Serve one connection until the peer disconnects.
///
/// Loops reading a request, performing the local operation, and writing the
/// reply. A transport failure on either side ends the loop; that is the
/// normal "client went away" termination, logged at debug and propagated
/// nowhere. A protocol violation (unknown opcode, malformed request payload)
/// terminates the connection after a warning.
pub fn handle_connection<T: Read + Write>(mut conn: T, storage: &StorageRoot, peer: &str) {
    loop {
        let msg = match read_message(&mut conn) {
            Ok(msg) => msg,
            Err(err) => {
                tracing::debug!(target: "netfs::server", peer, error = %err, "client disconnected");
                return;
            }
        };

        let request = match Request::decode(&msg) {
            Ok(request) => request,
            Err(ProtocolError::UnknownOpcode(op)) => {
                tracing::warn!(target: "netfs::server", peer, opcode = op, "unknown opcode, closing connection");
                return;
            }
            Err(err) => {
                tracing::warn!(target: "netfs::server", peer, error = %err, "malformed request, closing connection");
                return;
            }
        };

        let response = dispatch(storage, &request);

        let reply = match response.encode() {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(target: "netfs::server", peer, error = %err, "reply encoding failed, closing connection");
                return;
            }
        };
        let opcode = match reply.opcode() {
            Some(opcode) => opcode,
            // Unreachable for replies we just built; guard instead of panic.
            None => return,
        };
        if let Err(err) = write_message(&mut conn, opcode, &reply.payload).and_then(|_| conn.flush())
        {
            tracing::debug!(target: "netfs::server", peer, error = %err, "reply send failed, closing connection");
            return;
        }
    }
}

/// Perform one request against the storage root.
fn dispatch(storage: &StorageRoot, request: &Request) -> Response {
    let path_str = String::from_utf8_lossy(request.path()).into_owned();
    let full = match storage.resolve(request.path()) {
        Ok(full) => full,
        Err(errno) => {
            tracing::warn!(target: "netfs::server", path = %path_str, errno, "path rejected");
            return Response::error(errno);
        }
    };

    match request {
        Request::GetAttr { .. } => getattr(storage, &full, &path_str),
        Request::ReadDir { .. } => readdir(storage, &full, &path_str),
        Request::Read { offset, count, .. } => read(storage, &full, *offset, *count, &path_str),
    }
}

fn getattr(storage: &StorageRoot, full: &Path, path_str: &str) -> Response {
    match storage.getattr(full) {
        Ok(attrs) => {
            tracing::debug!(target: "netfs::server", path = %path_str, size = attrs.size, "getattr");
            Response::Attrs(attrs)
        }
        Err(err) => {
            tracing::debug!(target: "netfs::server", path = %path_str, error = %err, "getattr failed");
            Response::error(errno_of(&err))
        }
    }
}

fn readdir(storage: &StorageRoot, full: &Path, path_str: &str) -> Response {
    match storage.read_dir(full) {
        Ok(names) => {
            tracing::debug!(target: "netfs::server", path = %path_str, entries = names.len(), "readdir");
            Response::Listing(names)
        }
        Err(err) => {
            tracing::debug!(target: "netfs::server", path = %path_str, error = %err, "readdir failed");
            Response::error(errno_of(&err))
        }
    }
}

fn read(storage: &StorageRoot, full: &Path, offset: u64, count: u64, path_str: &str) -> Response {
    match storage.read_at(full, offset, count) {
        Ok(data) => {
            tracing::debug!(
                target: "netfs::server",
                path = %path_str,
                offset,
                count,
                read = data.len(),
                "read"
            );
            Response::Data(data)
        }
        Err(err) => {
            tracing::debug!(target: "netfs::server", path = %path_str, error = %err, "read failed");
            Response::error(errno_of(&err))
        }
    }
}
