//! Fixed-width big-endian conversions and OSC alignment arithmetic.
//!
//! The conversion functions have no error path: callers guarantee the slice
//! holds at least four bytes at `offset`.

/// Maximum length of an element label (prefix, pool, page, fader, ...).
pub const NAME_LENGTH_MAX: usize = 32;

/// Size of the address buffer. Addresses must be strictly shorter.
pub const OSC_PATTERN_SIZE: usize = 64;

/// Size of the string argument buffer. Strings must be strictly shorter.
pub const OSC_STRING_SIZE: usize = 64;

/// Size of the message buffer; also the largest accepted inbound packet.
pub const OSC_MESSAGE_SIZE: usize = 128;

/// Longest address accepted by the builder.
pub const MAX_ADDRESS_LEN: usize = OSC_PATTERN_SIZE - 1;

/// Longest string argument accepted by the builder.
pub const MAX_STRING_LEN: usize = OSC_STRING_SIZE - 1;

/// Width of every numeric argument on the wire.
pub const WORD: usize = 4;

/// Write `value` big-endian into `dst[offset..offset + 4]`.
pub fn put_i32(dst: &mut [u8], offset: usize, value: i32) {
    dst[offset..offset + WORD].copy_from_slice(&value.to_be_bytes());
}

/// Read a big-endian `i32` from `src[offset..offset + 4]`.
pub fn get_i32(src: &[u8], offset: usize) -> i32 {
    i32::from_be_bytes([src[offset], src[offset + 1], src[offset + 2], src[offset + 3]])
}

/// Write `value` big-endian into `dst[offset..offset + 4]`.
pub fn put_f32(dst: &mut [u8], offset: usize, value: f32) {
    dst[offset..offset + WORD].copy_from_slice(&value.to_be_bytes());
}

/// Read a big-endian `f32` from `src[offset..offset + 4]`.
pub fn get_f32(src: &[u8], offset: usize) -> f32 {
    f32::from_be_bytes([src[offset], src[offset + 1], src[offset + 2], src[offset + 3]])
}

/// Next multiple of four strictly greater than `len`.
///
/// An already aligned length still advances by a full word, so a
/// NUL-terminated section always keeps at least one NUL.
pub const fn align_past(len: usize) -> usize {
    (len / WORD + 1) * WORD
}

/// Smallest multiple of four greater than or equal to `len`.
pub const fn align_to(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}
