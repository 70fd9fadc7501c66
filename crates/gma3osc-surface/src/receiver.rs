use gma3osc_frame::{parse_message, ParsedMessage, OSC_MESSAGE_SIZE};
use tracing::trace;

use crate::surface::Surface;

type Callback = Box<dyn FnMut(&ParsedMessage)>;

/// Inbound side of a surface: polls the console link, filters by prefix and
/// keeps the most recent accepted message.
///
/// Foreign, malformed and oversized packets are dropped silently and leave the
/// stored message untouched.
#[derive(Default)]
pub struct Receiver {
    last: ParsedMessage,
    received: u64,
    callback: Option<Callback>,
}

impl Receiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(mut self, callback: impl FnMut(&ParsedMessage) + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Handle at most one pending packet. Returns `true` if it was accepted.
    pub fn poll(&mut self, surface: &mut Surface) -> bool {
        let Some(packet) = surface.poll_inbound() else {
            return false;
        };
        self.handle_packet(&packet, surface.registry().prefix_search())
    }

    /// Parse one packet against `prefix_search` (e.g. `/gma3/`; empty accepts all).
    pub fn handle_packet(&mut self, packet: &[u8], prefix_search: &str) -> bool {
        if packet.len() > OSC_MESSAGE_SIZE {
            trace!(len = packet.len(), "oversized packet discarded");
            return false;
        }
        let Some(parsed) = parse_message(packet, prefix_search) else {
            trace!(len = packet.len(), "packet not recognized");
            return false;
        };
        self.last = parsed;
        self.received += 1;
        if let Some(callback) = self.callback.as_mut() {
            callback(&self.last);
        }
        true
    }

    pub fn message(&self) -> &ParsedMessage {
        &self.last
    }

    /// Accepted packets so far.
    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn address(&self) -> &str {
        &self.last.address
    }

    /// Address with the prefix removed (e.g. `Page1/Fader3`).
    pub fn relative_address(&self) -> &str {
        self.last.relative_address()
    }

    pub fn tag(&self) -> &str {
        &self.last.tag
    }

    pub fn string(&self) -> &str {
        &self.last.string_arg
    }

    pub fn int1(&self) -> i32 {
        self.last.int_arg_1
    }

    pub fn int2(&self) -> i32 {
        self.last.int_arg_2
    }

    pub fn float(&self) -> f32 {
        self.last.float_arg
    }

    /// Data pool path level `0..5`; `0` outside that range.
    pub fn hierarchy_level(&self, level: usize) -> i32 {
        self.last.hierarchy_level(level)
    }
}

impl std::fmt::Debug for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver")
            .field("last", &self.last)
            .field("received", &self.received)
            .finish_non_exhaustive()
    }
}
