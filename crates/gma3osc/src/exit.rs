use std::fmt;
use std::io;

use gma3osc_frame::FrameError;
use gma3osc_surface::SurfaceError;
use gma3osc_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::NotConnected
        | io::ErrorKind::AddrInUse
        | io::ErrorKind::AddrNotAvailable => TRANSPORT_ERROR,
        _ => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Resolve { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::Transport(err) => transport_error(context, err),
        FrameError::AddressTooLong { .. }
        | FrameError::InvalidAddress(_)
        | FrameError::StringTooLong { .. }
        | FrameError::InvalidString(_)
        | FrameError::MessageTooLarge { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        FrameError::PayloadTooLarge { .. } | FrameError::InvalidEscape(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn surface_error(context: &str, err: SurfaceError) -> CliError {
    match err {
        SurfaceError::Frame(err) => frame_error(context, err),
        SurfaceError::Transport(err) => transport_error(context, err),
        SurfaceError::Io(source) => io_error(context, source),
        SurfaceError::NameTooLong { .. }
        | SurfaceError::InvalidRange { .. }
        | SurfaceError::Config(_)
        | SurfaceError::Json(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}
