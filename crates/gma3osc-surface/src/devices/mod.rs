//! Device adapters: small state machines turning sampled inputs into messages.
//!
//! Every adapter is polled once per host loop iteration through its `update`
//! method and never blocks. An update emits at most one message.

pub mod button;
pub mod cmd_button;
pub mod fader;
pub mod key;
pub mod knob;
pub mod navigator;
pub mod osc_button;

pub use button::Button;
pub use cmd_button::CmdButton;
pub use fader::Fader;
pub use key::Key;
pub use knob::ExecutorKnob;
pub use navigator::{Navigator, NavigatorKind};
pub use osc_button::OscButton;

use crate::config::Polarity;
use crate::input::DigitalInput;

/// Edge detector for one push button.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Edge {
    polarity: Polarity,
    pressed: bool,
}

/// A change in button state between two polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    Press,
    Release,
}

impl Edge {
    /// Starts released.
    pub(crate) fn new(polarity: Polarity) -> Self {
        Self {
            polarity,
            pressed: false,
        }
    }

    pub(crate) fn poll(&mut self, input: &mut impl DigitalInput) -> Option<Transition> {
        let pressed = self.polarity.is_pressed(input.read());
        if pressed == self.pressed {
            return None;
        }
        self.pressed = pressed;
        Some(if pressed {
            Transition::Press
        } else {
            Transition::Release
        })
    }

    pub(crate) fn is_pressed(&self) -> bool {
        self.pressed
    }
}
