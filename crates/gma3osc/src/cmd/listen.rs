use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use gma3osc_frame::{Dispatcher, Protocol};
use gma3osc_surface::{Receiver, Registry, SurfaceConfig};
use gma3osc_transport::{DatagramSocket, TcpConsoleStream, UdpDatagram};
use tracing::{debug, info};

use crate::cmd::ListenArgs;
use crate::exit::{io_error, surface_error, transport_error, CliError, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

const IDLE_SLEEP: Duration = Duration::from_millis(2);

/// Printing side of the monitor loop.
struct Monitor {
    receiver: Receiver,
    prefix_search: String,
    format: OutputFormat,
    printed: usize,
    count: Option<usize>,
}

impl Monitor {
    /// Returns `true` once the requested count has been printed.
    fn handle(&mut self, packet: &Bytes, from: Option<SocketAddr>) -> bool {
        if !self.receiver.handle_packet(packet, &self.prefix_search) {
            debug!(len = packet.len(), "packet ignored");
            return false;
        }
        print_message(self.receiver.message(), packet, from, self.format);
        self.printed = self.printed.saturating_add(1);
        self.count.is_some_and(|count| self.printed >= count)
    }
}

pub fn run(args: ListenArgs, config: &SurfaceConfig, format: OutputFormat) -> CliResult<i32> {
    let protocol = args.transport.unwrap_or(config.console.transport);
    let bind = gma3osc_transport::resolve(&args.bind, protocol.default_port())
        .map_err(|err| transport_error("invalid bind address", err))?;

    let mut registry = Registry::from_naming(config.naming.clone())
        .map_err(|err| surface_error("invalid naming", err))?;
    if let Some(prefix) = &args.prefix {
        registry
            .set_prefix(prefix.trim_matches('/'))
            .map_err(|err| surface_error("invalid prefix", err))?;
    }

    let mut monitor = Monitor {
        receiver: Receiver::new(),
        prefix_search: registry.prefix_search().to_string(),
        format,
        printed: 0,
        count: args.count,
    };
    if monitor.count == Some(0) {
        return Ok(SUCCESS);
    }

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    match protocol {
        Protocol::Udp => listen_udp(bind, &mut monitor, &running),
        Protocol::Tcp | Protocol::TcpSlip => listen_tcp(bind, protocol, &mut monitor, &running),
    }
}

fn listen_udp(bind: SocketAddr, monitor: &mut Monitor, running: &AtomicBool) -> CliResult<i32> {
    let mut socket = UdpDatagram::bind(bind).map_err(|err| transport_error("bind failed", err))?;

    while running.load(Ordering::SeqCst) {
        match socket.recv_packet() {
            Ok(Some((packet, from))) => {
                if monitor.handle(&packet, Some(from)) {
                    return Ok(SUCCESS);
                }
            }
            Ok(None) => thread::sleep(IDLE_SLEEP),
            Err(err) => return Err(io_error("receive failed", err)),
        }
    }

    Ok(SUCCESS)
}

fn listen_tcp(
    bind: SocketAddr,
    protocol: Protocol,
    monitor: &mut Monitor,
    running: &AtomicBool,
) -> CliResult<i32> {
    let listener = TcpListener::bind(bind).map_err(|err| io_error("bind failed", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| io_error("bind failed", err))?;
    let local = listener
        .local_addr()
        .map_err(|err| io_error("bind failed", err))?;
    info!(%local, %protocol, "listening on tcp socket");

    while running.load(Ordering::SeqCst) {
        let (stream, peer) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                thread::sleep(IDLE_SLEEP);
                continue;
            }
            Err(err) => return Err(io_error("accept failed", err)),
        };
        info!(%peer, "console connected");

        let stream =
            TcpConsoleStream::from_stream(stream).map_err(|err| transport_error("accept failed", err))?;
        let mut link = match protocol {
            Protocol::TcpSlip => Dispatcher::tcp_slip(stream),
            _ => Dispatcher::tcp(stream),
        };

        while running.load(Ordering::SeqCst) {
            match link.poll_inbound() {
                Some(packet) => {
                    if monitor.handle(&packet, Some(peer)) {
                        return Ok(SUCCESS);
                    }
                }
                None if !link.is_connected() => break,
                None => thread::sleep(IDLE_SLEEP),
            }
        }
        info!(%peer, "console disconnected");
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
