/// Errors that can occur while configuring a control surface.
///
/// Device updates never return these: a failed update produces no event.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// A naming label plus its terminator does not fit the
    /// `NAME_LENGTH_MAX`-byte label buffer; `max` is the longest label accepted.
    #[error("label {label:?} too long ({len} bytes, max {max})")]
    NameTooLong { label: String, len: usize, max: usize },

    /// A navigator range is empty or starts at zero.
    #[error("invalid range {start}..={end} (must satisfy 1 <= start <= end)")]
    InvalidRange { start: u16, end: u16 },

    /// Message building or framing error.
    #[error("frame error: {0}")]
    Frame(#[from] gma3osc_frame::FrameError),

    /// Socket setup error.
    #[error("transport error: {0}")]
    Transport(#[from] gma3osc_transport::TransportError),

    /// Invalid configuration content.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SurfaceError>;
