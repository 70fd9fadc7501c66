//! Delivery of built messages to one remote receiver.

use std::fmt;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use gma3osc_transport::{DatagramSocket, StreamSocket, TcpConsoleStream, UdpDatagram};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{FrameError, Result};
use crate::message::Message;
use crate::slip::{slip_encode, SlipDecoder};

const STREAM_READ_CHUNK: usize = 1536;

/// How messages travel to a receiver. Fixed when the dispatcher is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    /// One datagram per message.
    #[default]
    Udp,
    /// Raw message bytes on a persistent stream.
    Tcp,
    /// SLIP-framed message bytes on a persistent stream.
    TcpSlip,
}

impl Protocol {
    /// Every transport a dispatcher can be opened with.
    pub const ALL: [Protocol; 3] = [Protocol::Udp, Protocol::Tcp, Protocol::TcpSlip];

    /// Name used in configuration files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Udp => "udp",
            Protocol::Tcp => "tcp",
            Protocol::TcpSlip => "tcp-slip",
        }
    }

    /// Port a console listens on for this protocol by default.
    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Udp => gma3osc_transport::DEFAULT_UDP_PORT,
            Protocol::Tcp | Protocol::TcpSlip => gma3osc_transport::DEFAULT_TCP_PORT,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "udp" => Ok(Protocol::Udp),
            "tcp" => Ok(Protocol::Tcp),
            "tcp-slip" | "slip" => Ok(Protocol::TcpSlip),
            other => Err(format!("unknown transport '{other}' (expected udp, tcp or tcp-slip)")),
        }
    }
}

enum Link {
    Datagram {
        socket: Box<dyn DatagramSocket>,
        remote: SocketAddr,
    },
    Stream {
        socket: Box<dyn StreamSocket>,
        slip: Option<SlipDecoder>,
    },
}

/// Sends messages over the configured transport and polls for inbound packets.
///
/// Streams are reconnected opportunistically: before every write a closed
/// stream gets one connect attempt, and the write is attempted regardless of
/// its outcome. There is no queue and no backoff: a send buffer that is
/// full drops the message.
pub struct Dispatcher {
    link: Link,
    scratch: BytesMut,
    sent: u64,
}

impl Dispatcher {
    /// Deliver one datagram per message to `remote`.
    pub fn datagram(socket: impl DatagramSocket + 'static, remote: SocketAddr) -> Self {
        Self::from_link(Link::Datagram {
            socket: Box::new(socket),
            remote,
        })
    }

    /// Write raw message bytes to a stream.
    pub fn tcp(socket: impl StreamSocket + 'static) -> Self {
        Self::from_link(Link::Stream {
            socket: Box::new(socket),
            slip: None,
        })
    }

    /// Write SLIP-framed message bytes to a stream.
    pub fn tcp_slip(socket: impl StreamSocket + 'static) -> Self {
        Self::from_link(Link::Stream {
            socket: Box::new(socket),
            slip: Some(SlipDecoder::new()),
        })
    }

    /// Open `std::net` sockets for `protocol` towards `remote`.
    ///
    /// UDP binds an ephemeral local port. TCP connects lazily on the first send.
    pub fn open(protocol: Protocol, remote: SocketAddr) -> Result<Self> {
        Self::open_with_timeout(protocol, remote, TcpConsoleStream::DEFAULT_CONNECT_TIMEOUT)
    }

    /// Like [`open`](Self::open), bounding each stream connect attempt by
    /// `connect_timeout`. Every reconnect happens inside a send, so this is
    /// the longest a send can stall on an unreachable console.
    pub fn open_with_timeout(
        protocol: Protocol,
        remote: SocketAddr,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let stream = || TcpConsoleStream::new(remote).with_connect_timeout(connect_timeout);
        let dispatcher = match protocol {
            Protocol::Udp => {
                let local = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0));
                Self::datagram(UdpDatagram::bind(local)?, remote)
            }
            Protocol::Tcp => Self::tcp(stream()),
            Protocol::TcpSlip => Self::tcp_slip(stream()),
        };
        debug!(%protocol, %remote, ?connect_timeout, "dispatcher opened");
        Ok(dispatcher)
    }

    fn from_link(link: Link) -> Self {
        Self {
            link,
            scratch: BytesMut::new(),
            sent: 0,
        }
    }

    /// Transport this dispatcher was created for.
    pub fn protocol(&self) -> Protocol {
        match &self.link {
            Link::Datagram { .. } => Protocol::Udp,
            Link::Stream { slip: None, .. } => Protocol::Tcp,
            Link::Stream { slip: Some(_), .. } => Protocol::TcpSlip,
        }
    }

    /// Datagram links are always usable; streams report their last known state.
    pub fn is_connected(&self) -> bool {
        match &self.link {
            Link::Datagram { .. } => true,
            Link::Stream { socket, .. } => socket.is_connected(),
        }
    }

    /// Number of messages handed to the transport without error.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Fire-and-forget delivery. Failures are logged and dropped.
    pub fn send(&mut self, message: &Message) {
        if let Err(err) = self.try_send(message) {
            warn!(address = message.address(), error = %err, "message dropped");
        }
    }

    /// Deliver `message`, reporting the transport error if the write fails.
    ///
    /// Returns the number of bytes written to the wire.
    pub fn try_send(&mut self, message: &Message) -> Result<usize> {
        let written = match &mut self.link {
            Link::Datagram { socket, remote } => socket.send_to(message.as_bytes(), *remote)?,
            Link::Stream { socket, slip } => {
                if !socket.is_connected() {
                    debug!("stream closed, reconnecting before write");
                    if let Err(err) = socket.connect() {
                        debug!(error = %err, "reconnect failed");
                    }
                }
                let wire = if slip.is_some() {
                    self.scratch.clear();
                    slip_encode(message.as_bytes(), &mut self.scratch);
                    &self.scratch[..]
                } else {
                    message.as_bytes()
                };
                write_all(&mut **socket, wire)?
            }
        };
        self.sent += 1;
        debug!(
            address = message.address(),
            bytes = written,
            protocol = %self.protocol(),
            "message sent"
        );
        Ok(written)
    }

    /// Take the next inbound packet, if any. Never blocks.
    ///
    /// Datagrams are returned whole. Plain streams return whatever bytes are
    /// available; SLIP streams return one decoded frame at a time.
    pub fn poll_inbound(&mut self) -> Option<Bytes> {
        match &mut self.link {
            Link::Datagram { socket, .. } => match socket.recv_packet() {
                Ok(packet) => packet.map(|(packet, _)| packet),
                Err(err) => {
                    debug!(error = %err, "datagram receive failed");
                    None
                }
            },
            Link::Stream { socket, slip } => {
                if let Some(decoder) = slip.as_mut() {
                    if let Some(frame) = next_slip_frame(decoder) {
                        return Some(frame);
                    }
                }
                if !socket.is_connected() {
                    return None;
                }
                let mut chunk = [0u8; STREAM_READ_CHUNK];
                let read = match socket.read_available(&mut chunk) {
                    Ok(0) => return None,
                    Ok(n) => n,
                    Err(err) => {
                        debug!(error = %err, "stream read failed");
                        return None;
                    }
                };
                match slip.as_mut() {
                    Some(decoder) => {
                        decoder.push(&chunk[..read]);
                        next_slip_frame(decoder)
                    }
                    None => Some(Bytes::copy_from_slice(&chunk[..read])),
                }
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("protocol", &self.protocol())
            .field("sent", &self.sent)
            .finish_non_exhaustive()
    }
}

fn next_slip_frame(decoder: &mut SlipDecoder) -> Option<Bytes> {
    match decoder.next_frame() {
        Ok(frame) => frame,
        Err(err) => {
            trace!(error = %err, "discarding malformed SLIP frame");
            None
        }
    }
}

/// Write one whole frame without waiting on a full send buffer.
///
/// `WouldBlock` fails the send instead of spinning. When a frame was cut off
/// part way, the connection is dropped so the next send starts on a clean
/// stream rather than after half a frame.
fn write_all(socket: &mut dyn StreamSocket, wire: &[u8]) -> Result<usize> {
    let mut offset = 0usize;
    while offset < wire.len() {
        let err = match socket.write(&wire[offset..]) {
            Ok(0) => FrameError::ConnectionClosed,
            Ok(n) => {
                offset += n;
                continue;
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => FrameError::Io(err),
        };
        if offset > 0 {
            warn!(
                written = offset,
                len = wire.len(),
                "frame cut short, dropping connection"
            );
            socket.disconnect();
        }
        return Err(err);
    }
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io;
    use std::rc::Rc;

    use super::*;
    use crate::parser::parse_message;
    use crate::slip::{slip_decode, END};

    #[derive(Default)]
    struct Wire {
        sent: Vec<(Vec<u8>, SocketAddr)>,
        inbound: VecDeque<Vec<u8>>,
        connected: bool,
        connect_attempts: usize,
        refuse_connect: bool,
        write_attempts: usize,
        disconnects: usize,
        /// Bytes the send buffer still takes before reporting `WouldBlock`.
        write_budget: Option<usize>,
    }

    #[derive(Clone, Default)]
    struct FakeSocket(Rc<RefCell<Wire>>);

    impl DatagramSocket for FakeSocket {
        fn send_to(&mut self, payload: &[u8], remote: SocketAddr) -> io::Result<usize> {
            self.0.borrow_mut().sent.push((payload.to_vec(), remote));
            Ok(payload.len())
        }

        fn recv_packet(&mut self) -> io::Result<Option<(Bytes, SocketAddr)>> {
            let from = SocketAddr::from((Ipv4Addr::LOCALHOST, 8001));
            Ok(self
                .0
                .borrow_mut()
                .inbound
                .pop_front()
                .map(|packet| (Bytes::from(packet), from)))
        }
    }

    impl StreamSocket for FakeSocket {
        fn connect(&mut self) -> io::Result<()> {
            let mut wire = self.0.borrow_mut();
            wire.connect_attempts += 1;
            if wire.refuse_connect {
                return Err(io::Error::from(ErrorKind::ConnectionRefused));
            }
            wire.connected = true;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.0.borrow().connected
        }

        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            let mut wire = self.0.borrow_mut();
            wire.write_attempts += 1;
            if !wire.connected {
                return Err(io::Error::from(ErrorKind::NotConnected));
            }
            let accepted = match wire.write_budget {
                Some(0) => return Err(io::Error::from(ErrorKind::WouldBlock)),
                Some(budget) => budget.min(data.len()),
                None => data.len(),
            };
            if let Some(budget) = wire.write_budget.as_mut() {
                *budget -= accepted;
            }
            let remote = SocketAddr::from((Ipv4Addr::LOCALHOST, 9000));
            wire.sent.push((data[..accepted].to_vec(), remote));
            Ok(accepted)
        }

        fn disconnect(&mut self) {
            let mut wire = self.0.borrow_mut();
            wire.connected = false;
            wire.disconnects += 1;
        }

        fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let mut wire = self.0.borrow_mut();
            match wire.inbound.pop_front() {
                Some(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                None => Ok(0),
            }
        }
    }

    fn console() -> SocketAddr {
        SocketAddr::from((Ipv4Addr::new(192, 168, 1, 10), 8000))
    }

    fn key_message() -> Message {
        Message::new("/gma3/Page1/Key7", 1).unwrap()
    }

    #[test]
    fn datagram_sends_raw_message() {
        let fake = FakeSocket::default();
        let mut dispatcher = Dispatcher::datagram(fake.clone(), console());
        dispatcher.send(&key_message());

        let wire = fake.0.borrow();
        assert_eq!(wire.sent.len(), 1);
        assert_eq!(wire.sent[0].0, key_message().as_bytes());
        assert_eq!(wire.sent[0].1, console());
        assert_eq!(dispatcher.protocol(), Protocol::Udp);
        assert_eq!(dispatcher.sent(), 1);
    }

    #[test]
    fn stream_connects_before_first_write_only() {
        let fake = FakeSocket::default();
        let mut dispatcher = Dispatcher::tcp(fake.clone());
        dispatcher.send(&key_message());
        dispatcher.send(&key_message());

        let wire = fake.0.borrow();
        assert_eq!(wire.connect_attempts, 1);
        assert_eq!(wire.sent.len(), 2);
        assert_eq!(wire.sent[0].0, key_message().as_bytes());
    }

    #[test]
    fn stream_reconnects_after_drop() {
        let fake = FakeSocket::default();
        let mut dispatcher = Dispatcher::tcp(fake.clone());
        dispatcher.send(&key_message());
        fake.0.borrow_mut().connected = false;
        dispatcher.send(&key_message());

        assert_eq!(fake.0.borrow().connect_attempts, 2);
        assert_eq!(fake.0.borrow().sent.len(), 2);
    }

    #[test]
    fn refused_connect_is_silent_and_retried_every_send() {
        let fake = FakeSocket::default();
        fake.0.borrow_mut().refuse_connect = true;
        let mut dispatcher = Dispatcher::tcp(fake.clone());
        dispatcher.send(&key_message());
        dispatcher.send(&key_message());
        assert!(dispatcher.try_send(&key_message()).is_err());

        let wire = fake.0.borrow();
        assert_eq!(wire.connect_attempts, 3);
        assert!(wire.sent.is_empty());
        assert_eq!(dispatcher.sent(), 0);
    }

    #[test]
    fn write_is_attempted_after_failed_reconnect() {
        let fake = FakeSocket::default();
        fake.0.borrow_mut().refuse_connect = true;
        let mut dispatcher = Dispatcher::tcp(fake.clone());
        dispatcher.send(&key_message());

        let wire = fake.0.borrow();
        assert_eq!(wire.connect_attempts, 1);
        assert_eq!(wire.write_attempts, 1);
    }

    #[test]
    fn full_send_buffer_drops_message_without_waiting() {
        let fake = FakeSocket::default();
        fake.0.borrow_mut().write_budget = Some(0);
        let mut dispatcher = Dispatcher::tcp(fake.clone());

        dispatcher.send(&key_message());
        let err = dispatcher.try_send(&key_message()).unwrap_err();
        assert!(matches!(err, FrameError::Io(ref io) if io.kind() == ErrorKind::WouldBlock));

        let wire = fake.0.borrow();
        assert_eq!(wire.write_attempts, 2);
        assert!(wire.sent.is_empty());
        // Nothing reached the wire, so the stream is still usable.
        assert!(wire.connected);
        assert_eq!(wire.disconnects, 0);
        assert_eq!(dispatcher.sent(), 0);
    }

    #[test]
    fn frame_cut_short_drops_connection() {
        let fake = FakeSocket::default();
        fake.0.borrow_mut().write_budget = Some(5);
        let mut dispatcher = Dispatcher::tcp_slip(fake.clone());
        let msg = key_message();

        assert!(dispatcher.try_send(&msg).is_err());
        {
            let wire = fake.0.borrow();
            assert_eq!(wire.sent.len(), 1);
            assert_eq!(wire.sent[0].0.len(), 5);
            assert_eq!(wire.disconnects, 1);
            assert!(!wire.connected);
        }

        fake.0.borrow_mut().write_budget = None;
        dispatcher.send(&msg);

        let wire = fake.0.borrow();
        assert_eq!(wire.connect_attempts, 2);
        let framed = &wire.sent[1].0;
        assert_eq!(framed.first(), Some(&END));
        assert_eq!(slip_decode(framed).unwrap().as_ref(), msg.as_bytes());
        assert_eq!(dispatcher.sent(), 1);
    }

    #[test]
    fn slip_stream_frames_payload() {
        let fake = FakeSocket::default();
        let mut dispatcher = Dispatcher::tcp_slip(fake.clone());
        let msg = Message::new("/gma3/Page1/Fader1", -64).unwrap();
        dispatcher.send(&msg);

        let wire = fake.0.borrow();
        let framed = &wire.sent[0].0;
        assert_eq!(framed.first(), Some(&END));
        assert_eq!(framed.last(), Some(&END));
        assert_eq!(slip_decode(framed).unwrap().as_ref(), msg.as_bytes());
        assert_eq!(dispatcher.protocol(), Protocol::TcpSlip);
    }

    #[test]
    fn datagram_inbound_is_returned_whole() {
        let fake = FakeSocket::default();
        fake.0
            .borrow_mut()
            .inbound
            .push_back(key_message().as_bytes().to_vec());
        let mut dispatcher = Dispatcher::datagram(fake, console());

        let packet = dispatcher.poll_inbound().unwrap();
        assert_eq!(packet.as_ref(), key_message().as_bytes());
        assert!(dispatcher.poll_inbound().is_none());
    }

    #[test]
    fn slip_inbound_is_reassembled_across_reads() {
        let msg = key_message();
        let mut framed = BytesMut::new();
        slip_encode(msg.as_bytes(), &mut framed);
        let (head, tail) = framed.split_at(7);

        let fake = FakeSocket::default();
        {
            let mut wire = fake.0.borrow_mut();
            wire.connected = true;
            wire.inbound.push_back(head.to_vec());
            wire.inbound.push_back(tail.to_vec());
        }
        let mut dispatcher = Dispatcher::tcp_slip(fake);

        assert!(dispatcher.poll_inbound().is_none());
        let frame = dispatcher.poll_inbound().unwrap();
        let parsed = parse_message(&frame, "/gma3/").unwrap();
        assert_eq!(parsed.address, "/gma3/Page1/Key7");
        assert_eq!(parsed.int_arg_1, 1);
    }

    #[test]
    fn closed_stream_is_not_polled() {
        let fake = FakeSocket::default();
        fake.0.borrow_mut().inbound.push_back(vec![1, 2, 3, 4]);
        let mut dispatcher = Dispatcher::tcp(fake.clone());
        assert!(!dispatcher.is_connected());
        assert!(dispatcher.poll_inbound().is_none());
        assert_eq!(fake.0.borrow().connect_attempts, 0);
    }

    #[test]
    fn protocol_parses_and_serializes() {
        assert_eq!("tcp-slip".parse::<Protocol>().unwrap(), Protocol::TcpSlip);
        assert!("serial".parse::<Protocol>().is_err());
        assert_eq!(serde_json::to_string(&Protocol::TcpSlip).unwrap(), "\"tcp-slip\"");
        let parsed: Protocol = serde_json::from_str("\"udp\"").unwrap();
        assert_eq!(parsed, Protocol::Udp);
        assert_eq!(Protocol::Tcp.default_port(), 9000);
        for protocol in Protocol::ALL {
            assert_eq!(protocol.as_str().parse::<Protocol>().unwrap(), protocol);
        }
    }

    #[test]
    fn opened_tcp_dispatcher_reconnects_within_timeout() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let remote = listener.local_addr().unwrap();
        let mut dispatcher =
            Dispatcher::open_with_timeout(Protocol::TcpSlip, remote, Duration::from_millis(250))
                .unwrap();
        assert_eq!(dispatcher.protocol(), Protocol::TcpSlip);
        assert!(!dispatcher.is_connected());

        let written = dispatcher.try_send(&key_message()).unwrap();
        assert!(dispatcher.is_connected());
        let mut framed = BytesMut::new();
        slip_encode(key_message().as_bytes(), &mut framed);
        assert_eq!(written, framed.len());
    }

    #[test]
    fn open_udp_reaches_loopback_receiver() {
        let mut receiver = UdpDatagram::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).unwrap();
        let mut dispatcher = Dispatcher::open(Protocol::Udp, receiver.local_addr()).unwrap();
        dispatcher.try_send(&key_message()).unwrap();

        let mut packet = None;
        for _ in 0..200 {
            packet = receiver.recv_packet().unwrap().map(|(packet, _)| packet);
            if packet.is_some() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(packet.unwrap().as_ref(), key_message().as_bytes());
    }
}
