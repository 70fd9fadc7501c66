use bytes::{BufMut, Bytes, BytesMut};

/// Write attempted past the buffer capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow {
    /// Length the buffer would have needed.
    pub needed: usize,
    /// Fixed capacity of the buffer.
    pub capacity: usize,
}

/// Byte buffer with a hard capacity and a write cursor.
///
/// Every write is checked before it happens; a rejected write leaves the
/// buffer untouched.
#[derive(Debug, Clone)]
pub struct BoundedBuf {
    buf: BytesMut,
    capacity: usize,
}

impl BoundedBuf {
    /// Empty buffer that never grows past `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `src` at the cursor.
    pub fn put_slice(&mut self, src: &[u8]) -> Result<(), Overflow> {
        self.reserve(src.len())?;
        self.buf.put_slice(src);
        Ok(())
    }

    /// Append a single byte.
    pub fn put_u8(&mut self, byte: u8) -> Result<(), Overflow> {
        self.reserve(1)?;
        self.buf.put_u8(byte);
        Ok(())
    }

    /// Append four big-endian bytes.
    pub fn put_i32(&mut self, value: i32) -> Result<(), Overflow> {
        self.reserve(4)?;
        self.buf.put_i32(value);
        Ok(())
    }

    /// Append four big-endian bytes.
    pub fn put_f32(&mut self, value: f32) -> Result<(), Overflow> {
        self.reserve(4)?;
        self.buf.put_f32(value);
        Ok(())
    }

    /// Fill with NUL bytes until the cursor sits at `len`. No-op if already past it.
    pub fn pad_to(&mut self, len: usize) -> Result<(), Overflow> {
        let fill = len.saturating_sub(self.buf.len());
        self.reserve(fill)?;
        self.buf.put_bytes(0, fill);
        Ok(())
    }

    /// Current cursor position.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hand over the written bytes.
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }

    fn reserve(&self, additional: usize) -> Result<(), Overflow> {
        let needed = self.buf.len() + additional;
        if needed > self.capacity {
            return Err(Overflow {
                needed,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}
