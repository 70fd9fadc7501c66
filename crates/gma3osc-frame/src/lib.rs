//! OSC message building, parsing and stream framing for grandMA3 control surfaces.
//!
//! Every outbound message is laid out as:
//! - The address, NUL-padded to a multiple of four (always at least one NUL)
//! - The tag string (`,` plus at most one type character), padded the same way
//! - Zero or one argument: a big-endian `i32`/`f32`, or a padded string
//!
//! Inbound messages follow a fixed argument shape (string, int, int-or-float)
//! and are decoded without allocation-heavy generic OSC machinery. On byte
//! streams, messages are optionally delimited with SLIP.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod address;
pub mod buffer;
pub mod codec;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod parser;
pub mod reader;
pub mod slip;

pub use address::AddressBuilder;
#[cfg(feature = "async")]
pub use async_codec::SlipCodec;
pub use buffer::{BoundedBuf, Overflow};
pub use codec::{
    align_past, align_to, get_f32, get_i32, put_f32, put_i32, MAX_ADDRESS_LEN, MAX_STRING_LEN,
    NAME_LENGTH_MAX, OSC_MESSAGE_SIZE, OSC_PATTERN_SIZE, OSC_STRING_SIZE,
};
pub use dispatch::{Dispatcher, Protocol};
pub use error::{FrameError, Result};
pub use message::{build_message, Argument, Message, BUTTON_PRESS, BUTTON_RELEASE};
pub use parser::{parse_message, scan_hierarchy, ParsedMessage, HIERARCHY_DEPTH};
pub use reader::SlipReader;
pub use slip::{slip_decode, slip_decode_frame, slip_encode, SlipDecoder, DEFAULT_MAX_PAYLOAD};
