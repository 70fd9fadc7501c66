use bytes::Bytes;

use crate::buffer::BoundedBuf;
use crate::codec::{align_past, align_to, MAX_ADDRESS_LEN, MAX_STRING_LEN, OSC_MESSAGE_SIZE, WORD};
use crate::error::{FrameError, Result};

/// Button value sent on press.
pub const BUTTON_PRESS: i32 = 1;

/// Button value sent on release.
pub const BUTTON_RELEASE: i32 = 0;

/// The single optional argument an outbound message carries.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Argument {
    #[default]
    NoArg,
    Int32(i32),
    Float32(f32),
    Text(String),
}

impl Argument {
    /// Type tag character, or `None` for a message without arguments.
    pub fn type_char(&self) -> Option<u8> {
        match self {
            Argument::NoArg => None,
            Argument::Int32(_) => Some(b'i'),
            Argument::Float32(_) => Some(b'f'),
            Argument::Text(_) => Some(b's'),
        }
    }
}

impl From<i32> for Argument {
    fn from(value: i32) -> Self {
        Argument::Int32(value)
    }
}

impl From<f32> for Argument {
    fn from(value: f32) -> Self {
        Argument::Float32(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Text(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Text(value)
    }
}

/// A fully assembled outbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    address: String,
    argument: Argument,
    frame: Bytes,
}

impl Message {
    /// Build a message with the default [`OSC_MESSAGE_SIZE`] capacity.
    pub fn new(address: &str, argument: impl Into<Argument>) -> Result<Self> {
        build_message(address, argument.into(), OSC_MESSAGE_SIZE)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn argument(&self) -> &Argument {
        &self.argument
    }

    /// Encoded wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.frame
    }

    pub fn frame(&self) -> Bytes {
        self.frame.clone()
    }

    /// Total encoded size in bytes.
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }
}

/// Encode `address` plus one optional argument into a message of at most `capacity` bytes.
///
/// Layout:
/// ```text
/// ┌──────────────────┬──────────────┬──────────────────────┐
/// │ address + NUL pad│ ",x" NUL pad │ argument             │
/// │ (to next ×4,     │ (4 bytes)    │ i/f: 4 bytes BE      │
/// │  at least 1 NUL) │              │ s: bytes, pad to ×4  │
/// └──────────────────┴──────────────┴──────────────────────┘
/// ```
///
/// The address and tag always gain at least one NUL. A string argument is only
/// padded when its length is not already a multiple of four; receivers on the
/// console side mirror exactly this layout.
pub fn build_message(address: &str, argument: Argument, capacity: usize) -> Result<Message> {
    validate_address(address)?;
    if let Argument::Text(text) = &argument {
        if text.len() > MAX_STRING_LEN {
            return Err(FrameError::StringTooLong {
                len: text.len(),
                max: MAX_STRING_LEN,
            });
        }
        if text.as_bytes().contains(&0) {
            return Err(FrameError::InvalidString(text.clone()));
        }
    }

    let tag_start = align_past(address.len());
    let data_start = tag_start + WORD;
    let size = match &argument {
        Argument::NoArg => data_start,
        Argument::Int32(_) | Argument::Float32(_) => data_start + WORD,
        Argument::Text(text) => data_start + align_to(text.len()),
    };
    if size > capacity {
        return Err(FrameError::MessageTooLarge {
            size,
            max: capacity,
        });
    }

    let mut buf = BoundedBuf::new(capacity);
    let overflow = |_| FrameError::MessageTooLarge {
        size,
        max: capacity,
    };
    buf.put_slice(address.as_bytes()).map_err(overflow)?;
    buf.pad_to(tag_start).map_err(overflow)?;
    buf.put_u8(b',').map_err(overflow)?;
    if let Some(type_char) = argument.type_char() {
        buf.put_u8(type_char).map_err(overflow)?;
    }
    buf.pad_to(data_start).map_err(overflow)?;
    match &argument {
        Argument::NoArg => {}
        Argument::Int32(value) => buf.put_i32(*value).map_err(overflow)?,
        Argument::Float32(value) => buf.put_f32(*value).map_err(overflow)?,
        Argument::Text(text) => {
            buf.put_slice(text.as_bytes()).map_err(overflow)?;
            buf.pad_to(size).map_err(overflow)?;
        }
    }
    debug_assert_eq!(buf.len(), size);

    Ok(Message {
        address: address.to_string(),
        argument,
        frame: buf.freeze(),
    })
}

fn validate_address(address: &str) -> Result<()> {
    if address.len() > MAX_ADDRESS_LEN {
        return Err(FrameError::AddressTooLong {
            len: address.len(),
            max: MAX_ADDRESS_LEN,
        });
    }
    if !address.starts_with('/') || address.as_bytes().contains(&0) {
        return Err(FrameError::InvalidAddress(address.to_string()));
    }
    Ok(())
}
