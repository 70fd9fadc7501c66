use gma3osc_frame::{FrameError, Message, MAX_STRING_LEN};

use super::{Edge, Transition};
use crate::config::Polarity;
use crate::error::Result;
use crate::input::DigitalInput;
use crate::surface::Surface;

/// Sends a fixed command line to `/<prefix>/cmd` when the button is released.
pub struct CmdButton<I> {
    input: I,
    command: String,
    edge: Edge,
}

impl<I: DigitalInput> CmdButton<I> {
    pub fn new(input: I, command: &str) -> Result<Self> {
        Self::with_polarity(input, command, Polarity::default())
    }

    pub fn with_polarity(input: I, command: &str, polarity: Polarity) -> Result<Self> {
        if command.len() > MAX_STRING_LEN {
            return Err(FrameError::StringTooLong {
                len: command.len(),
                max: MAX_STRING_LEN,
            }
            .into());
        }
        Ok(Self {
            input,
            command: command.to_string(),
            edge: Edge::new(polarity),
        })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn update(&mut self, surface: &mut Surface) -> Option<Message> {
        match self.edge.poll(&mut self.input)? {
            Transition::Press => None,
            Transition::Release => surface.command(&self.command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurfaceError;
    use crate::input::ExternalState;
    use crate::testing::recording_surface;

    #[test]
    fn only_release_sends_command() {
        let (mut surface, console) = recording_surface();
        let level = ExternalState::new(true);
        let mut button = CmdButton::new(level.clone(), "Clear").unwrap();

        level.set(false);
        assert!(button.update(&mut surface).is_none());
        assert!(console.sent().is_empty());

        level.set(true);
        let message = button.update(&mut surface).unwrap();
        assert_eq!(message.address(), "/gma3/cmd");

        let sent = console.parsed();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].string_arg, "Clear");
    }

    #[test]
    fn overlong_command_is_rejected_up_front() {
        let err = CmdButton::new(ExternalState::new(true), &"x".repeat(64)).err();
        assert!(matches!(
            err,
            Some(SurfaceError::Frame(FrameError::StringTooLong { len: 64, .. }))
        ));
    }
}
