//! Transport layer for netfs client/server communication.
//!
//! Two stream transports are provided:
//!
//! - **TCP**: the primary transport; the client pool dials a fixed
//!   address/port and the server accepts on a bound listener
//! - **Unix sockets**: for same-host deployments and testing
//!
//! Both expose plain blocking `Read`/`Write` streams; framing lives in
//! [`crate::protocol`].

mod tcp;
mod traits;
mod unix;

pub use tcp::{TcpListener, TcpTransport};
pub use traits::Transport;
pub use unix::{UnixListener, UnixTransport};
