/// Errors that can occur while building or framing messages.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The address does not fit the address buffer.
    #[error("address too long ({len} bytes, max {max})")]
    AddressTooLong { len: usize, max: usize },

    /// The address is empty, lacks the leading `/`, or contains a NUL byte.
    #[error("invalid address {0:?} (must start with '/' and contain no NUL)")]
    InvalidAddress(String),

    /// A string argument does not fit the string buffer.
    #[error("string argument too long ({len} bytes, max {max})")]
    StringTooLong { len: usize, max: usize },

    /// A string argument contains a NUL byte.
    #[error("invalid string argument {0:?} (contains NUL)")]
    InvalidString(String),

    /// The assembled message exceeds the message buffer.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// A SLIP frame carries more payload than allowed.
    #[error("SLIP payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A SLIP escape byte was followed by something other than a substitute code.
    #[error("invalid SLIP escape sequence 0xDB 0x{0:02X}")]
    InvalidEscape(u8),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Opening a console socket failed.
    #[error(transparent)]
    Transport(#[from] gma3osc_transport::TransportError),

    /// The stream was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
