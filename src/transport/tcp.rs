//! TCP transport implementation.

use std::io::{self, Read, Write};
use std::net::{self, SocketAddr, ToSocketAddrs};
use std::time::Duration;

/// A TCP transport.
///
/// Wraps a `TcpStream` with Nagle disabled: the protocol is strict
/// request/response, so delaying small frames only adds latency.
#[derive(Debug)]
pub struct TcpTransport {
    stream: net::TcpStream,
}

impl TcpTransport {
    /// Connect to a server address.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let stream = net::TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    /// Create a transport from an accepted stream.
    pub fn from_stream(stream: net::TcpStream) -> io::Result<Self> {
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    /// The remote peer address.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.stream.peer_addr()
    }

    /// Set the read timeout.
    pub fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        self.stream.set_read_timeout(dur)
    }

    /// Set the write timeout.
    pub fn set_write_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        self.stream.set_write_timeout(dur)
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &net::TcpStream {
        &self.stream
    }
}

impl Read for TcpTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for TcpTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// A TCP listener for accepting client connections.
pub struct TcpListener {
    listener: net::TcpListener,
}

impl TcpListener {
    /// Bind to an address. Use port 0 to let the OS pick one.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let listener = net::TcpListener::bind(addr)?;
        Ok(Self { listener })
    }

    /// Accept a new connection.
    pub fn accept(&self) -> io::Result<(TcpTransport, SocketAddr)> {
        let (stream, peer) = self.listener.accept()?;
        Ok((TcpTransport::from_stream(stream)?, peer))
    }

    /// The local address this listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
