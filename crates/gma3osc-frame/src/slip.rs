//! SLIP (RFC 1055) framing for OSC over a byte stream.
//!
//! Every frame is written as `END payload END`, with `END` and `ESC` bytes
//! inside the payload replaced by two-byte escape sequences.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::OSC_MESSAGE_SIZE;
use crate::error::{FrameError, Result};

/// Frame boundary.
pub const END: u8 = 0xC0;

/// Escape marker.
pub const ESC: u8 = 0xDB;

/// `ESC ESC_END` stands for an `END` data byte.
pub const ESC_END: u8 = 0xDC;

/// `ESC ESC_ESC` stands for an `ESC` data byte.
pub const ESC_ESC: u8 = 0xDD;

/// Default maximum decoded payload: one full OSC message.
pub const DEFAULT_MAX_PAYLOAD: usize = OSC_MESSAGE_SIZE;

/// Append the SLIP encoding of `payload` to `dst`.
pub fn slip_encode(payload: &[u8], dst: &mut BytesMut) {
    let escapes = payload.iter().filter(|&&b| b == END || b == ESC).count();
    dst.reserve(payload.len() + escapes + 2);
    dst.put_u8(END);
    for &byte in payload {
        match byte {
            END => dst.put_slice(&[ESC, ESC_END]),
            ESC => dst.put_slice(&[ESC, ESC_ESC]),
            other => dst.put_u8(other),
        }
    }
    dst.put_u8(END);
}

/// Decode the next complete frame from a stream buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// Leading `END` bytes (empty frames) are skipped. On success the frame and its
/// trailing `END` are consumed from the buffer.
pub fn slip_decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Bytes>> {
    let leading = src.iter().take_while(|&&b| b == END).count();
    src.advance(leading);

    let Some(end) = src.iter().position(|&b| b == END) else {
        // Worst case every payload byte is escaped.
        if src.len() > max_payload.saturating_mul(2) {
            let size = src.len();
            src.clear();
            return Err(FrameError::PayloadTooLarge {
                size,
                max: max_payload,
            });
        }
        return Ok(None);
    };

    let raw = src.split_to(end);
    src.advance(1);
    unescape(&raw, max_payload).map(Some)
}

/// Decode a single complete frame such as one produced by [`slip_encode`].
///
/// Surrounding `END` bytes are optional.
pub fn slip_decode(frame: &[u8]) -> Result<Bytes> {
    let start = frame.iter().take_while(|&&b| b == END).count();
    let body = &frame[start..];
    let stop = body.iter().position(|&b| b == END).unwrap_or(body.len());
    unescape(&body[..stop], usize::MAX)
}

/// Incremental decoder for bytes arriving in arbitrary chunks.
#[derive(Debug)]
pub struct SlipDecoder {
    buf: BytesMut,
    max_payload: usize,
}

impl SlipDecoder {
    pub fn new() -> Self {
        Self::with_max_payload(DEFAULT_MAX_PAYLOAD)
    }

    pub fn with_max_payload(max_payload: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(max_payload * 2 + 2),
            max_payload,
        }
    }

    /// Queue received bytes.
    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Next complete frame, if one has been received.
    pub fn next_frame(&mut self) -> Result<Option<Bytes>> {
        slip_decode_frame(&mut self.buf, self.max_payload)
    }

    /// Bytes buffered but not yet part of a complete frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub fn max_payload(&self) -> usize {
        self.max_payload
    }
}

impl Default for SlipDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn unescape(raw: &[u8], max_payload: usize) -> Result<Bytes> {
    let mut out = BytesMut::with_capacity(raw.len());
    let mut bytes = raw.iter().copied();
    while let Some(byte) = bytes.next() {
        let decoded = match byte {
            ESC => match bytes.next() {
                Some(ESC_END) => END,
                Some(ESC_ESC) => ESC,
                Some(other) => return Err(FrameError::InvalidEscape(other)),
                None => return Err(FrameError::InvalidEscape(END)),
            },
            other => other,
        };
        out.put_u8(decoded);
    }
    if out.len() > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: out.len(),
            max: max_payload,
        });
    }
    Ok(out.freeze())
}
