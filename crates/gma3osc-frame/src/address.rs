use crate::buffer::BoundedBuf;
use crate::codec::MAX_ADDRESS_LEN;
use crate::error::{FrameError, Result};

/// Assembles a slash-separated address inside a bounded buffer.
///
/// Segments with an empty label are skipped, so optional hierarchy levels
/// (prefix, pool, page) disappear when their label is configured empty.
///
/// ```
/// use gma3osc_frame::AddressBuilder;
///
/// let mut address = AddressBuilder::new();
/// address.segment("gma3")?;
/// address.numbered("Page", 1)?;
/// address.numbered("Fader", 3)?;
/// assert_eq!(address.finish(), "/gma3/Page1/Fader3");
/// # Ok::<(), gma3osc_frame::FrameError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AddressBuilder {
    buf: BoundedBuf,
}

impl AddressBuilder {
    /// Empty builder bounded by [`MAX_ADDRESS_LEN`].
    pub fn new() -> Self {
        Self {
            buf: BoundedBuf::new(MAX_ADDRESS_LEN),
        }
    }

    /// Append a plain segment such as `gma3` or `cmd`.
    pub fn segment(&mut self, label: &str) -> Result<&mut Self> {
        if label.is_empty() {
            return Ok(self);
        }
        self.push(label)
    }

    /// Append a label immediately followed by a decimal number, e.g. `Key7`.
    ///
    /// Unlike [`segment`](Self::segment), an empty label still emits the number.
    pub fn numbered(&mut self, label: &str, number: u32) -> Result<&mut Self> {
        self.push(&format!("{label}{number}"))
    }

    /// Append an optional level: skipped entirely when `label` is empty.
    pub fn level(&mut self, label: &str, number: u32) -> Result<&mut Self> {
        if label.is_empty() {
            return Ok(self);
        }
        self.numbered(label, number)
    }

    /// Length of the address so far; `0` until the first segment.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The finished address, or `/` when no segment was added.
    pub fn finish(self) -> String {
        let bytes = self.buf.freeze();
        if bytes.is_empty() {
            return "/".to_string();
        }
        // Only &str input is ever written, so the buffer is valid UTF-8.
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Each segment carries its own leading `/`. A segment that does not fit
    /// leaves the buffer untouched.
    fn push(&mut self, text: &str) -> Result<&mut Self> {
        let needed = self.buf.len() + 1 + text.len();
        let too_long = || FrameError::AddressTooLong {
            len: needed,
            max: MAX_ADDRESS_LEN,
        };
        if needed > self.buf.capacity() {
            return Err(too_long());
        }
        self.buf.put_u8(b'/').map_err(|_| too_long())?;
        self.buf.put_slice(text.as_bytes()).map_err(|_| too_long())?;
        Ok(self)
    }
}

impl Default for AddressBuilder {
    fn default() -> Self {
        Self::new()
    }
}
