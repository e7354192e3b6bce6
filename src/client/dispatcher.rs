//! Request dispatcher: the adapter-facing client API.

use super::pool::{ConnectionPool, PooledConn};
use super::ClientError;
use crate::protocol::{
    self, decode_entries, read_message, write_message, FileAttributes, Message, Opcode, Request,
};
use crate::transport::{TcpTransport, Transport};
use std::ffi::OsString;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::Path;

/// Client handle to one remote filesystem server.
///
/// All methods are callable from any number of threads; each call checks one
/// connection out of the pool for the duration of its exchange. There is no
/// retry and no automatic reconnect: a lost connection fails the one
/// operation that was using it, and the pool dials a replacement on the next
/// demand.
pub struct RemoteFs {
    pool: ConnectionPool,
}

impl RemoteFs {
    /// Create a client for the server at `addr` with the given connection cap.
    pub fn new(addr: SocketAddr, pool_size: usize) -> Self {
        Self {
            pool: ConnectionPool::new(pool_size, move || {
                TcpTransport::connect(addr).map(|t| Box::new(t) as Box<dyn Transport>)
            }),
        }
    }

    /// Create a client with a custom connector (Unix sockets, test doubles).
    pub fn with_connector<F>(pool_size: usize, connector: F) -> Self
    where
        F: Fn() -> io::Result<Box<dyn Transport>> + Send + Sync + 'static,
    {
        Self {
            pool: ConnectionPool::new(pool_size, connector),
        }
    }

    /// The underlying pool, for observability.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Look up file attributes for a remote path.
    pub fn get_attributes(&self, path: &Path) -> Result<FileAttributes, ClientError> {
        let msg = self.exchange(&Request::GetAttr {
            path: path.as_os_str().as_bytes().to_vec(),
        })?;
        Ok(FileAttributes::decode(&msg.payload)?)
    }

    /// List entry names of a remote directory.
    pub fn list_directory(&self, path: &Path) -> Result<Vec<OsString>, ClientError> {
        let msg = self.exchange(&Request::ReadDir {
            path: path.as_os_str().as_bytes().to_vec(),
        })?;
        let names = decode_entries(&msg.payload)?;
        Ok(names.into_iter().map(OsString::from_vec).collect())
    }

    /// Read up to `count` bytes of a remote file starting at `offset`.
    ///
    /// Returns exactly the bytes the server obtained; fewer than `count`
    /// near end-of-file is normal, not an error.
    pub fn read_bytes(&self, path: &Path, offset: u64, count: u64) -> Result<Vec<u8>, ClientError> {
        let msg = self.exchange(&Request::Read {
            path: path.as_os_str().as_bytes().to_vec(),
            offset,
            count,
        })?;
        Ok(msg.payload)
    }

    /// Run one request/response exchange on a pooled connection.
    ///
    /// Returns the raw non-error reply message for the caller to decode. An
    /// `Error` reply releases the connection (the socket is fine, only the
    /// operation failed) and surfaces as [`ClientError::Remote`]; any
    /// transport failure discards the connection.
    fn exchange(&self, request: &Request) -> Result<Message, ClientError> {
        let expected = request.reply_opcode();
        let msg = request.encode()?;

        let mut conn = self.pool.acquire()?;
        let reply = match Self::exchange_on(&mut conn, request.opcode(), &msg.payload) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::debug!(
                    target: "netfs::client",
                    op = ?request.opcode(),
                    error = %err,
                    "connection lost during exchange"
                );
                conn.discard();
                return Err(ClientError::ConnectionLost(err));
            }
        };

        if reply.opcode() != Some(expected) && reply.opcode() != Some(Opcode::Error) {
            tracing::warn!(
                target: "netfs::client",
                op = ?request.opcode(),
                reply_opcode = reply.opcode,
                expected = expected.as_u8(),
                "unexpected reply opcode, decoding best-effort"
            );
        }

        // Payload fully drained: the stream is still in sync, so the
        // connection goes back to the pool on every non-transport outcome.
        conn.release();

        if reply.opcode() == Some(Opcode::Error) {
            let errno = protocol::Response::decode(expected, &reply)?
                .errno()
                .unwrap_or(libc::EIO);
            return Err(ClientError::Remote { errno });
        }
        Ok(reply)
    }

    /// Send one request and read one reply. Pure transport: any error here
    /// means the connection is unusable.
    fn exchange_on(
        conn: &mut PooledConn<'_>,
        opcode: Opcode,
        payload: &[u8],
    ) -> io::Result<Message> {
        write_message(conn, opcode, payload)?;
        conn.flush()?;
        read_message(conn)
    }
}
