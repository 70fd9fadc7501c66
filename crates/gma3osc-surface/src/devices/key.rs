use gma3osc_frame::{Argument, Message, BUTTON_PRESS, BUTTON_RELEASE};

use super::{Edge, Transition};
use crate::config::Polarity;
use crate::input::DigitalInput;
use crate::registry::{Entity, Overrides};
use crate::surface::Surface;

/// Executor key: sends 1 on press and 0 on release to
/// `/<prefix>/<pool><n>/<page><n>/<key><number>`.
pub struct Key<I> {
    input: I,
    key: u16,
    overrides: Overrides,
    edge: Edge,
}

impl<I: DigitalInput> Key<I> {
    /// Active-low key (pull-up wiring).
    pub fn new(input: I, key: u16) -> Self {
        Self::with_polarity(input, key, Polarity::default())
    }

    pub fn with_polarity(input: I, key: u16, polarity: Polarity) -> Self {
        Self {
            input,
            key,
            overrides: Overrides::default(),
            edge: Edge::new(polarity),
        }
    }

    /// Local pool number; `0` follows the registry.
    pub fn set_pool(&mut self, pool: u16) {
        self.overrides.pool = pool;
    }

    /// Local page number; `0` follows the registry.
    pub fn set_page(&mut self, page: u16) {
        self.overrides.page = page;
    }

    pub fn number(&self) -> u16 {
        self.key
    }

    /// Send `1` on press and `0` on release. Returns the message sent, if any.
    pub fn update(&mut self, surface: &mut Surface) -> Option<Message> {
        let value = match self.edge.poll(&mut self.input)? {
            Transition::Press => BUTTON_PRESS,
            Transition::Release => BUTTON_RELEASE,
        };
        surface.send_entity(Entity::Key, self.key, self.overrides, Argument::Int32(value))
    }
}
