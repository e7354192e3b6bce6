//! Server components: accept loop, per-connection handler, storage access.
//!
//! The server is thread-per-connection: each accepted socket gets its own
//! named thread running [`handle_connection`] until the peer disconnects.
//! Handlers share nothing mutable; the storage root is read-only state passed
//! in an `Arc`. There is no admission cap on simultaneous connections, which
//! is a known scalability bound of this design.

mod config;
mod handler;
mod storage;

pub use config::ServerConfig;
pub use handler::handle_connection;
pub use storage::StorageRoot;

use crate::transport::TcpListener;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

/// A bound netfs server.
pub struct Server {
    listener: TcpListener,
    storage: Arc<StorageRoot>,
}

impl Server {
    /// Bind the listening socket. Fails only on local setup errors
    /// (address in use, permission); those are fatal to startup.
    pub fn bind(config: ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(config.bind)?;
        Ok(Self {
            listener,
            storage: Arc::new(StorageRoot::new(config.root)),
        })
    }

    /// The bound address; useful when binding port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever, spawning a handler thread for each.
    ///
    /// An accept failure is logged and the loop continues; it is never fatal
    /// to the server process. This function does not return.
    pub fn serve(self) -> io::Result<()> {
        let mut next_id = 0u64;
        loop {
            let (conn, peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(err) => {
                    tracing::warn!(target: "netfs::server", error = %err, "accept failed");
                    continue;
                }
            };

            let id = next_id;
            next_id += 1;
            tracing::info!(target: "netfs::server", client = id, peer = %peer, "client connected");

            let storage = Arc::clone(&self.storage);
            let spawned = thread::Builder::new()
                .name(format!("netfs-conn-{id}"))
                .spawn(move || {
                    handle_connection(conn, &storage, &peer.to_string());
                    tracing::info!(target: "netfs::server", client = id, "client disconnected");
                });
            if let Err(err) = spawned {
                // Out of threads: drop the connection and keep accepting
                tracing::warn!(target: "netfs::server", client = id, error = %err, "failed to spawn handler");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_reports_local_addr() {
        let config = ServerConfig::new("127.0.0.1:0".parse().unwrap(), "/tmp");
        let server = Server::bind(config).unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
    }
}
