use std::io;
use std::net::SocketAddr;

use bytes::Bytes;

/// A connectionless packet socket.
///
/// Implementations must never block: the host loop polls every device and
/// the receiver once per iteration.
pub trait DatagramSocket {
    /// Send one datagram to `remote`.
    fn send_to(&mut self, payload: &[u8], remote: SocketAddr) -> io::Result<usize>;

    /// Take the next pending datagram and its sender, or `None` when nothing
    /// is queued.
    ///
    /// The returned packet is complete, so callers can reject packets that
    /// exceed their own size limit.
    fn recv_packet(&mut self) -> io::Result<Option<(Bytes, SocketAddr)>>;
}

/// A persistent byte stream to one remote endpoint.
///
/// The remote endpoint is fixed at construction; `connect` may be called any
/// number of times and replaces a dead connection.
pub trait StreamSocket {
    /// Try to (re)connect to the remote endpoint.
    fn connect(&mut self) -> io::Result<()>;

    /// Whether the last known state of the connection is open.
    fn is_connected(&self) -> bool;

    /// Write bytes, returning how many were accepted.
    ///
    /// Returns `WouldBlock` instead of waiting when the send buffer is full.
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Drop the current connection. The next `connect` starts a fresh one.
    fn disconnect(&mut self);

    /// Read bytes that are already available. `Ok(0)` means nothing pending.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<T: DatagramSocket + ?Sized> DatagramSocket for Box<T> {
    fn send_to(&mut self, payload: &[u8], remote: SocketAddr) -> io::Result<usize> {
        (**self).send_to(payload, remote)
    }

    fn recv_packet(&mut self) -> io::Result<Option<(Bytes, SocketAddr)>> {
        (**self).recv_packet()
    }
}

impl<T: StreamSocket + ?Sized> StreamSocket for Box<T> {
    fn connect(&mut self) -> io::Result<()> {
        (**self).connect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write(data)
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }

    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_available(buf)
    }
}
