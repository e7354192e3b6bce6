//! Client components: connection pool and request dispatcher.
//!
//! ```text
//! caller thread ─┐
//! caller thread ─┼─> RemoteFs ──> ConnectionPool ──> one socket per
//! caller thread ─┘   (dispatch)    (acquire/release)  in-flight request
//! ```
//!
//! Any number of threads may call into [`RemoteFs`] concurrently; parallelism
//! is bounded by the pool's connection cap. Each request owns its connection
//! for the full exchange: the protocol has no request identifiers, so
//! requests are never multiplexed onto a shared socket.

mod dispatcher;
mod pool;

pub use dispatcher::RemoteFs;
pub use pool::{ConnectionPool, PooledConn, DEFAULT_POOL_SIZE};

use crate::protocol::ProtocolError;
use std::io;

/// Errors surfaced by client-side operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The connection failed mid-exchange (or could not be established).
    /// The connection is discarded; the operation is not retried.
    #[error("connection lost: {0}")]
    ConnectionLost(#[source] io::Error),

    /// The server performed the operation and it failed with this error code.
    /// The connection stays healthy and returns to the pool.
    #[error("remote error (errno {errno})")]
    Remote { errno: i32 },

    /// The reply could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ClientError {
    /// Map this failure to an error code for the filesystem adapter.
    ///
    /// Remote failures carry their own code; everything else collapses to
    /// "no such entry", the adapter's generic unavailable condition.
    pub fn errno(&self) -> i32 {
        match self {
            ClientError::Remote { errno } => *errno,
            _ => libc::ENOENT,
        }
    }
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        ClientError::ConnectionLost(err)
    }
}
