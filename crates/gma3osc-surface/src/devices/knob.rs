use gma3osc_frame::{Argument, Message};

use crate::config::Direction;
use crate::input::DigitalInput;
use crate::registry::{Entity, Overrides};
use crate::surface::Surface;

/// Quadrature encoder driving an executor knob.
///
/// Each falling edge on phase A sends one step: `+1` when phase B is low,
/// `-1` when it is high, negated for [`Direction::Reverse`].
pub struct ExecutorKnob<A, B> {
    phase_a: A,
    phase_b: B,
    knob: u16,
    overrides: Overrides,
    direction: Direction,
    last_a: bool,
}

impl<A: DigitalInput, B: DigitalInput> ExecutorKnob<A, B> {
    /// Phase A is sampled once here so an encoder resting low does not step.
    pub fn new(mut phase_a: A, phase_b: B, knob: u16, direction: Direction) -> Self {
        let last_a = phase_a.read();
        Self {
            phase_a,
            phase_b,
            knob,
            overrides: Overrides::default(),
            direction,
            last_a,
        }
    }

    pub fn set_pool(&mut self, pool: u16) {
        self.overrides.pool = pool;
    }

    pub fn set_page(&mut self, page: u16) {
        self.overrides.page = page;
    }

    pub fn number(&self) -> u16 {
        self.knob
    }

    /// Send `+1` or `-1` on each falling edge of phase A.
    pub fn update(&mut self, surface: &mut Surface) -> Option<Message> {
        let a = self.phase_a.read();
        let falling = self.last_a && !a;
        self.last_a = a;
        if !falling {
            return None;
        }

        let mut step: i32 = if self.phase_b.read() { -1 } else { 1 };
        if self.direction == Direction::Reverse {
            step = -step;
        }
        surface.send_entity(Entity::Encoder, self.knob, self.overrides, Argument::Int32(step))
    }
}
