use std::io::{ErrorKind, Read};

use bytes::Bytes;

use crate::error::{FrameError, Result};
use crate::slip::SlipDecoder;

const READ_CHUNK_SIZE: usize = 1024;

/// Reads complete SLIP frames from any blocking `Read` stream.
///
/// Partial reads are buffered internally; callers always get whole frames.
pub struct SlipReader<T> {
    inner: T,
    decoder: SlipDecoder,
}

impl<T: Read> SlipReader<T> {
    /// Wrap `inner` with a decoder using the default payload limit.
    pub fn new(inner: T) -> Self {
        Self::with_decoder(inner, SlipDecoder::new())
    }

    /// Use an explicitly configured decoder (e.g. a larger payload limit).
    pub fn with_decoder(inner: T, decoder: SlipDecoder) -> Self {
        Self { inner, decoder }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        loop {
            if let Some(frame) = self.decoder.next_frame()? {
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.decoder.push(&chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    ///
    /// Reading from it directly skips bytes the decoder would otherwise see.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream. Buffered partial
    /// frames are discarded.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
