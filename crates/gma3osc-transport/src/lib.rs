//! Socket abstraction for talking to a lighting console.
//!
//! Two kinds of providers sit behind this seam:
//! - Datagram sockets (UDP), where one packet is one message
//! - Stream sockets (TCP), which may drop and must be reconnected on demand
//!
//! This is the lowest layer of gma3osc. The frame and surface crates only ever
//! talk to the [`DatagramSocket`] and [`StreamSocket`] traits, so hardware
//! network stacks and test fakes plug in the same way as the `std::net`
//! implementations provided here.

pub mod error;
pub mod tcp;
pub mod traits;
pub mod udp;

pub use error::{Result, TransportError};
pub use tcp::TcpConsoleStream;
pub use traits::{DatagramSocket, StreamSocket};
pub use udp::UdpDatagram;

/// Default UDP port a grandMA3 console listens on for OSC.
pub const DEFAULT_UDP_PORT: u16 = 8000;

/// Default TCP port a grandMA3 console listens on for OSC.
pub const DEFAULT_TCP_PORT: u16 = 9000;

/// Resolve `host:port` (or a bare host plus `default_port`) to one socket address.
pub fn resolve(input: &str, default_port: u16) -> Result<std::net::SocketAddr> {
    use std::net::ToSocketAddrs;

    let with_port = if input.rsplit_once(':').is_some_and(|(_, port)| port.parse::<u16>().is_ok()) {
        input.to_string()
    } else {
        format!("{input}:{default_port}")
    };

    with_port
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            input: input.to_string(),
            source,
        })?
        .next()
        .ok_or_else(|| TransportError::Resolve {
            input: input.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no address found"),
        })
}
