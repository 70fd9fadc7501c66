use crate::codec::{align_past, get_f32, get_i32, OSC_PATTERN_SIZE, WORD};

/// Number of dot-separated integers scanned from a data pool path.
pub const HIERARCHY_DEPTH: usize = 5;

/// Longest tag string read (including the leading `,`).
const TAG_SIZE_MAX: usize = 11;

/// Fields decoded from an inbound console message.
///
/// Arguments follow a fixed shape: an optional string, then an optional
/// integer, then an optional integer or float. Fields that were not present
/// keep their default value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMessage {
    /// Full address as received.
    pub address: String,
    /// Tag string including the leading `,`.
    pub tag: String,
    pub string_arg: String,
    pub int_arg_1: i32,
    pub int_arg_2: i32,
    pub float_arg: f32,
    /// Dot-separated integers following the prefix, e.g. `/gma3/13.1.2` -> `[13, 1, 2, 0, 0]`.
    pub hierarchy: [i32; HIERARCHY_DEPTH],
    prefix_len: usize,
}

impl ParsedMessage {
    /// Address with the configured prefix (e.g. `/gma3/`) removed.
    pub fn relative_address(&self) -> &str {
        &self.address[self.prefix_len..]
    }

    /// One level of the scanned hierarchy; `0` for out-of-range levels.
    pub fn hierarchy_level(&self, level: usize) -> i32 {
        self.hierarchy.get(level).copied().unwrap_or(0)
    }
}

/// Argument slot the next type tag may fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Text,
    FirstInt,
    Last,
    Done,
}

/// Decode one inbound packet.
///
/// `prefix` is the search string built from the configured prefix (e.g.
/// `/gma3/`); when non-empty, packets that do not start with it are rejected.
/// Returns `None` for foreign or malformed packets: prefix mismatch, address
/// longer than the address buffer, or a missing tag string.
///
/// Argument decoding stops at the first type tag that does not fit the
/// expected shape, or when the packet ends early; fields already decoded are
/// kept. A float is only accepted in the third slot, so `,f` and `,sf`
/// decode no arguments beyond the string.
///
/// Offsets are computed from the raw bytes, so an address or string that is
/// not valid UTF-8 still parses (with replacement characters).
pub fn parse_message(packet: &[u8], prefix: &str) -> Option<ParsedMessage> {
    if !prefix.is_empty() && !packet.starts_with(prefix.as_bytes()) {
        return None;
    }

    let (address, address_len) = read_cstr(packet, 0, OSC_PATTERN_SIZE)?;
    if !address.starts_with('/') {
        return None;
    }

    let tag_start = align_past(address_len);
    let (tag, tag_len) = read_cstr(packet, tag_start, TAG_SIZE_MAX + 1)?;
    if !tag.starts_with(',') {
        return None;
    }

    let prefix_len = if prefix.is_empty() { 1 } else { prefix.len() };
    let mut parsed = ParsedMessage {
        hierarchy: scan_hierarchy(&address[prefix_len..]),
        address,
        prefix_len,
        ..ParsedMessage::default()
    };

    let mut offset = tag_start + align_past(tag_len);
    let mut slot = Slot::Text;
    for type_char in tag.bytes().skip(1) {
        match (type_char, slot) {
            (b's', Slot::Text) => {
                let Some((text, text_len)) = read_cstr(packet, offset, usize::MAX) else {
                    break;
                };
                offset += align_past(text_len);
                parsed.string_arg = text;
                slot = Slot::FirstInt;
            }
            (b'i', Slot::Text | Slot::FirstInt) => {
                let Some(value) = read_word(packet, offset, get_i32) else {
                    break;
                };
                parsed.int_arg_1 = value;
                offset += WORD;
                slot = Slot::Last;
            }
            (b'i', Slot::Last) => {
                let Some(value) = read_word(packet, offset, get_i32) else {
                    break;
                };
                parsed.int_arg_2 = value;
                offset += WORD;
                slot = Slot::Done;
            }
            (b'f', Slot::Last) => {
                let Some(value) = read_word(packet, offset, get_f32) else {
                    break;
                };
                parsed.float_arg = value;
                offset += WORD;
                slot = Slot::Done;
            }
            _ => break,
        }
    }

    parsed.tag = tag;
    Some(parsed)
}

/// Read a NUL-terminated string starting at `offset`.
///
/// The string may also end at the end of the packet. Strings that would not
/// fit a buffer of `limit` bytes (terminator included) are rejected.
/// Returns the text together with its length on the wire.
fn read_cstr(packet: &[u8], offset: usize, limit: usize) -> Option<(String, usize)> {
    let rest = packet.get(offset..)?;
    if rest.is_empty() {
        return None;
    }
    let len = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
    if len >= limit {
        return None;
    }
    Some((String::from_utf8_lossy(&rest[..len]).into_owned(), len))
}

fn read_word<T>(packet: &[u8], offset: usize, decode: fn(&[u8], usize) -> T) -> Option<T> {
    if offset + WORD > packet.len() {
        return None;
    }
    Some(decode(packet, offset))
}

/// Scan up to [`HIERARCHY_DEPTH`] dot-separated integers from the start of `text`.
///
/// Scanning stops at the first mismatch; unfilled levels stay zero.
pub fn scan_hierarchy(text: &str) -> [i32; HIERARCHY_DEPTH] {
    let mut levels = [0i32; HIERARCHY_DEPTH];
    let mut rest = text;
    for (index, level) in levels.iter_mut().enumerate() {
        if index > 0 {
            match rest.strip_prefix('.') {
                Some(stripped) => rest = stripped,
                None => break,
            }
        }
        let trimmed = rest.trim_start();
        let sign_len = usize::from(trimmed.starts_with(['-', '+']));
        let digits = trimmed[sign_len..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits == 0 {
            break;
        }
        let (number, tail) = trimmed.split_at(sign_len + digits);
        match number.parse::<i32>() {
            Ok(value) => *level = value,
            Err(_) => break,
        }
        rest = tail;
    }
    levels
}
