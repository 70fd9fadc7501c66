use clap::{Args, Subcommand};
use gma3osc_frame::{Argument, Protocol};
use gma3osc_surface::SurfaceConfig;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod encode;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build one message and send it to a console.
    Send(SendArgs),
    /// Build one message and print its wire bytes without sending.
    Encode(EncodeArgs),
    /// Receive messages like a console would and print them.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, config: &SurfaceConfig, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, config, format),
        Command::Encode(args) => encode::run(args, config, format),
        Command::Listen(args) => listen::run(args, config, format),
        Command::Version(args) => version::run(args, format),
    }
}

/// The single message argument. None of the flags means no argument.
#[derive(Args, Debug, Default)]
pub struct ValueArgs {
    /// Integer argument (`,i`).
    #[arg(long, allow_negative_numbers = true, conflicts_with_all = ["float", "string"])]
    pub int: Option<i32>,
    /// Float argument (`,f`).
    #[arg(long, allow_negative_numbers = true, conflicts_with_all = ["int", "string"])]
    pub float: Option<f32>,
    /// String argument (`,s`).
    #[arg(long, conflicts_with_all = ["int", "float"])]
    pub string: Option<String>,
}

impl ValueArgs {
    pub fn argument(&self) -> Argument {
        if let Some(value) = self.int {
            Argument::Int32(value)
        } else if let Some(value) = self.float {
            Argument::Float32(value)
        } else if let Some(value) = &self.string {
            Argument::Text(value.clone())
        } else {
            Argument::NoArg
        }
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Console address (`host` or `host:port`).
    pub target: String,
    /// OSC address. Without a leading `/` it is taken relative to the configured prefix.
    pub address: String,
    #[command(flatten)]
    pub value: ValueArgs,
    /// Transport (udp, tcp, tcp-slip). Default: the configured console transport.
    #[arg(long, value_name = "TRANSPORT")]
    pub transport: Option<Protocol>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// OSC address. Without a leading `/` it is taken relative to the configured prefix.
    pub address: String,
    #[command(flatten)]
    pub value: ValueArgs,
    /// Wrap the message in a SLIP frame.
    #[arg(long)]
    pub slip: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Local address to bind (`host` or `host:port`).
    pub bind: String,
    /// Transport (udp, tcp, tcp-slip). Default: the configured console transport.
    #[arg(long, value_name = "TRANSPORT")]
    pub transport: Option<Protocol>,
    /// Accept only addresses under this prefix. Default: the configured prefix;
    /// an empty value accepts everything.
    #[arg(long)]
    pub prefix: Option<String>,
    /// Exit after printing N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Also list transports, default ports and message limits.
    #[arg(long)]
    pub extended: bool,
}

/// Expand an address relative to the configured prefix.
pub(crate) fn full_address(address: &str, config: &SurfaceConfig) -> String {
    if address.starts_with('/') {
        return address.to_string();
    }
    let prefix = config.naming.prefix.as_str();
    if prefix.is_empty() {
        format!("/{address}")
    } else {
        format!("/{prefix}/{address}")
    }
}
