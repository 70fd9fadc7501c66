use super::{Edge, Transition};
use crate::config::Polarity;
use crate::input::DigitalInput;

/// Plain push button that runs a callback on press and sends nothing.
pub struct Button<I, F> {
    input: I,
    edge: Edge,
    callback: F,
}

impl<I: DigitalInput, F: FnMut()> Button<I, F> {
    pub fn new(input: I, callback: F) -> Self {
        Self::with_polarity(input, Polarity::default(), callback)
    }

    pub fn with_polarity(input: I, polarity: Polarity, callback: F) -> Self {
        Self {
            input,
            edge: Edge::new(polarity),
            callback,
        }
    }

    /// Returns `true` if the callback ran.
    pub fn update(&mut self) -> bool {
        match self.edge.poll(&mut self.input) {
            Some(Transition::Press) => {
                (self.callback)();
                true
            }
            _ => false,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.edge.is_pressed()
    }
}
