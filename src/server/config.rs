//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Configuration for a netfs server: where to listen and what to serve.
///
/// Owned by the accept loop and shared read-only with handlers; there is no
/// process-wide mutable configuration state.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address and port to listen on.
    pub bind: SocketAddr,

    /// Base directory all client paths resolve against.
    pub root: PathBuf,
}

impl ServerConfig {
    /// Create a new config.
    pub fn new<P: Into<PathBuf>>(bind: SocketAddr, root: P) -> Self {
        Self {
            bind,
            root: root.into(),
        }
    }

    /// Set the bind address.
    pub fn bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Set the storage root.
    pub fn root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = root.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pattern() {
        let config = ServerConfig::new("127.0.0.1:0".parse().unwrap(), "/srv/a")
            .root("/srv/b")
            .bind("127.0.0.1:9000".parse().unwrap());

        assert_eq!(config.root, PathBuf::from("/srv/b"));
        assert_eq!(config.bind.port(), 9000);
    }
}
