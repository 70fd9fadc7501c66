use std::io::{self, ErrorKind};
use std::net::{SocketAddr, UdpSocket};

use bytes::Bytes;
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::DatagramSocket;

/// Non-blocking UDP socket.
///
/// Incoming packets are read into a scratch buffer sized for a full Ethernet
/// frame, so oversized OSC packets arrive whole and can be rejected by length
/// instead of being silently truncated.
pub struct UdpDatagram {
    socket: UdpSocket,
    local: SocketAddr,
    scratch: Vec<u8>,
}

impl UdpDatagram {
    /// Largest datagram read in one piece.
    pub const MAX_DATAGRAM: usize = 1536;

    /// Bind a non-blocking UDP socket on `addr`.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        socket
            .set_nonblocking(true)
            .map_err(|source| TransportError::Bind { addr, source })?;
        let local = socket.local_addr()?;

        info!(%local, "listening on udp socket");

        Ok(Self {
            socket,
            local,
            scratch: vec![0u8; Self::MAX_DATAGRAM],
        })
    }

    /// The bound local address (useful after binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }
}

impl DatagramSocket for UdpDatagram {
    fn send_to(&mut self, payload: &[u8], remote: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(payload, remote)
    }

    fn recv_packet(&mut self) -> io::Result<Option<(Bytes, SocketAddr)>> {
        match self.socket.recv_from(&mut self.scratch) {
            Ok((len, from)) => {
                debug!(%from, len, "received datagram");
                Ok(Some((Bytes::copy_from_slice(&self.scratch[..len]), from)))
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(err) if err.kind() == ErrorKind::Interrupted => Ok(None),
            // ICMP port-unreachable from an earlier send surfaces here on some platforms.
            Err(err) if err.kind() == ErrorKind::ConnectionReset => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl std::fmt::Debug for UdpDatagram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpDatagram").field("local", &self.local).finish()
    }
}
