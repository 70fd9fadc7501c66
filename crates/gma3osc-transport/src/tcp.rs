use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::StreamSocket;

/// TCP connection to a console that reconnects on demand.
///
/// The connection is established lazily; once open the socket is switched to
/// non-blocking mode so reads never stall the host loop. A failed write or an
/// orderly close from the remote side marks the connection as closed.
pub struct TcpConsoleStream {
    remote: SocketAddr,
    stream: Option<TcpStream>,
    connect_timeout: Duration,
}

impl TcpConsoleStream {
    /// Default bound on a single connect attempt.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

    /// Create an unconnected stream for `remote`.
    pub fn new(remote: SocketAddr) -> Self {
        Self {
            remote,
            stream: None,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Create the stream and attempt one connection, bounded by `timeout`, up front.
    pub fn connect_to(remote: SocketAddr, timeout: Duration) -> Result<Self> {
        let mut stream = Self::new(remote).with_connect_timeout(timeout);
        StreamSocket::connect(&mut stream).map_err(|source| TransportError::Connect {
            addr: remote,
            source,
        })?;
        Ok(stream)
    }

    /// Wrap an already connected stream (e.g. one returned by `TcpListener::accept`).
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let remote = stream.peer_addr()?;
        stream.set_nonblocking(true)?;
        Ok(Self {
            remote,
            stream: Some(stream),
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
        })
    }

    /// Override the bound on a single connect attempt.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// The remote endpoint.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    fn mark_closed(&mut self, reason: &str) {
        if self.stream.take().is_some() {
            debug!(remote = %self.remote, reason, "tcp connection closed");
        }
    }
}

impl StreamSocket for TcpConsoleStream {
    fn connect(&mut self) -> io::Result<()> {
        self.stream = None;
        let stream = TcpStream::connect_timeout(&self.remote, self.connect_timeout)?;
        stream.set_nodelay(true)?;
        stream.set_nonblocking(true)?;
        debug!(remote = %self.remote, "connected to console");
        self.stream = Some(stream);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(io::Error::from(ErrorKind::NotConnected));
        };
        match stream.write(data) {
            Ok(n) => Ok(n),
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                Err(err)
            }
            Err(err) => {
                self.mark_closed("write failed");
                Err(err)
            }
        }
    }

    fn disconnect(&mut self) {
        self.mark_closed("reset by caller");
    }

    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(0);
        };
        match stream.read(buf) {
            Ok(0) if !buf.is_empty() => {
                self.mark_closed("remote closed");
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                Ok(0)
            }
            Err(err) => {
                self.mark_closed("read failed");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for TcpConsoleStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpConsoleStream")
            .field("remote", &self.remote)
            .field("connected", &self.stream.is_some())
            .finish()
    }
}
