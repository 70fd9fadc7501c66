use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::FrameError;
use crate::message::Message;
use crate::slip::{slip_decode_frame, slip_encode, DEFAULT_MAX_PAYLOAD};

/// `tokio_util` codec for SLIP-framed OSC over an async byte stream.
///
/// Encodes [`Message`]s and decodes raw frames, which can be handed to
/// [`parse_message`](crate::parse_message).
#[derive(Debug, Clone)]
pub struct SlipCodec {
    max_payload: usize,
}

impl SlipCodec {
    pub fn new() -> Self {
        Self::with_max_payload(DEFAULT_MAX_PAYLOAD)
    }

    /// Reject decoded frames longer than `max_payload` bytes.
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self { max_payload }
    }
}

impl Default for SlipCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for SlipCodec {
    type Item = Bytes;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        slip_decode_frame(src, self.max_payload)
    }
}

impl Encoder<Message> for SlipCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        slip_encode(item.as_bytes(), dst);
        Ok(())
    }
}

impl Encoder<&Message> for SlipCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        slip_encode(item.as_bytes(), dst);
        Ok(())
    }
}
