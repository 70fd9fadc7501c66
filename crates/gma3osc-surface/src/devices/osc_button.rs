use gma3osc_frame::{Argument, Message};

use super::{Edge, Transition};
use crate::config::Polarity;
use crate::error::Result;
use crate::input::DigitalInput;
use crate::surface::{Destination, Surface};

/// Button sending an arbitrary OSC address, by default to the external receiver.
///
/// Press sends the configured argument. Release sends `0` / `0.0` for numeric
/// arguments and nothing for string or argument-less buttons.
pub struct OscButton<I> {
    input: I,
    edge: Edge,
    destination: Destination,
    press: Message,
    release: Option<Message>,
}

impl<I: DigitalInput> OscButton<I> {
    /// Both messages are built here, so a bad address fails at construction.
    pub fn new(input: I, address: &str, argument: impl Into<Argument>) -> Result<Self> {
        let argument = argument.into();
        let release = match &argument {
            Argument::Int32(_) => Some(Message::new(address, 0i32)?),
            Argument::Float32(_) => Some(Message::new(address, 0.0f32)?),
            Argument::Text(_) | Argument::NoArg => None,
        };
        let press = Message::new(address, argument)?;
        Ok(Self {
            input,
            edge: Edge::new(Polarity::default()),
            destination: Destination::External,
            press,
            release,
        })
    }

    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.edge = Edge::new(polarity);
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn address(&self) -> &str {
        self.press.address()
    }

    pub fn update(&mut self, surface: &mut Surface) -> Option<Message> {
        let message = match self.edge.poll(&mut self.input)? {
            Transition::Press => &self.press,
            Transition::Release => self.release.as_ref()?,
        };
        surface.dispatch(self.destination, message);
        Some(message.clone())
    }
}
