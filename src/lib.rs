//! Network filesystem over a stream socket.
//!
//! `netfs` provides a complete stack for read-only remote filesystem access:
//!
//! - **Protocol**: hand-rolled binary wire format with typed encode/decode
//!   per message kind
//! - **Transport**: TCP and Unix-socket transports with all-or-nothing
//!   framed transfer
//! - **Client**: a bounded connection pool plus a request dispatcher exposing
//!   `get_attributes` / `list_directory` / `read_bytes`
//! - **Server**: thread-per-connection dispatch against a local storage root
//!   with path-containment enforcement
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use netfs::{RemoteFs, Server, ServerConfig};
//!
//! // Server side: serve a directory on a TCP port
//! let server = Server::bind(ServerConfig::new("0.0.0.0:5050".parse()?, "/srv/data"))?;
//! server.serve()?;
//!
//! // Client side: four pooled connections
//! let fs = RemoteFs::new("10.0.0.1:5050".parse()?, 4);
//! let attrs = fs.get_attributes(Path::new("/a.txt"))?;
//! let names = fs.list_directory(Path::new("/"))?;
//! let bytes = fs.read_bytes(Path::new("/a.txt"), 0, attrs.size as u64)?;
//! ```
//!
//! The protocol carries no request identifiers: exactly one request is in
//! flight per connection and its reply is fully consumed before the next
//! request is sent. Client-side concurrency comes from the pool, not from
//! multiplexing.

pub mod client;
pub mod protocol;
pub mod server;
pub mod transport;

// Re-export the main types at crate root for convenience
pub use client::{ClientError, ConnectionPool, PooledConn, RemoteFs};
pub use protocol::{
    read_message, write_message, FileAttributes, Message, Opcode, ProtocolError, Request,
    Response, MAX_MESSAGE_SIZE,
};
pub use server::{Server, ServerConfig, StorageRoot};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::client::{ClientError, RemoteFs};
    pub use crate::protocol::{FileAttributes, Message, Opcode, Request, Response};
    pub use crate::server::{Server, ServerConfig, StorageRoot};
}
