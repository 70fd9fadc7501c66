use std::net::SocketAddr;

/// Errors that can occur while setting up console sockets.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind a local socket.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to connect to the console.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// A `host:port` string did not resolve.
    #[error("cannot resolve {input}: {source}")]
    Resolve {
        input: String,
        source: std::io::Error,
    },

    /// An I/O error occurred on an open socket.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
