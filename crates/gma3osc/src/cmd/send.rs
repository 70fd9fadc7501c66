use std::net::SocketAddr;
use std::time::Duration;

use gma3osc_frame::{Dispatcher, Message, Protocol};
use gma3osc_surface::SurfaceConfig;
use gma3osc_transport::TcpConsoleStream;
use serde::Serialize;
use tracing::info;

use crate::cmd::{full_address, SendArgs};
use crate::exit::{frame_error, transport_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct SendOutput<'a> {
    address: &'a str,
    remote: String,
    transport: &'a str,
    bytes: usize,
}

pub fn run(args: SendArgs, config: &SurfaceConfig, format: OutputFormat) -> CliResult<i32> {
    let protocol = args.transport.unwrap_or(config.console.transport);
    let remote = gma3osc_transport::resolve(&args.target, protocol.default_port())
        .map_err(|err| transport_error("invalid target", err))?;

    let address = full_address(&args.address, config);
    let message = Message::new(&address, args.value.argument())
        .map_err(|err| frame_error("message not built", err))?;

    let mut dispatcher = open(protocol, remote, config.console.connect_timeout())?;
    let written = dispatcher
        .try_send(&message)
        .map_err(|err| frame_error("send failed", err))?;
    info!(%remote, %protocol, address = %address, bytes = written, "message sent");

    if matches!(format, OutputFormat::Json) {
        let out = SendOutput {
            address: &address,
            remote: remote.to_string(),
            transport: protocol.as_str(),
            bytes: written,
        };
        println!(
            "{}",
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        );
    }

    Ok(SUCCESS)
}

/// Streams connect up front so an unreachable console fails the command.
fn open(protocol: Protocol, remote: SocketAddr, timeout: Duration) -> CliResult<Dispatcher> {
    let connect = || {
        TcpConsoleStream::connect_to(remote, timeout)
            .map_err(|err| transport_error("connect failed", err))
    };
    match protocol {
        Protocol::Udp => {
            Dispatcher::open(protocol, remote).map_err(|err| frame_error("open failed", err))
        }
        Protocol::Tcp => Ok(Dispatcher::tcp(connect()?)),
        Protocol::TcpSlip => Ok(Dispatcher::tcp_slip(connect()?)),
    }
}
