use gma3osc_frame::{Argument, Message};
use tracing::trace;

use crate::config::FaderConfig;
use crate::input::AnalogInput;
use crate::registry::{Entity, Overrides};
use crate::surface::Surface;

/// Executor fader reporting 0..=100.
///
/// Samples are rate limited and filtered by a jitter threshold. While locked
/// (see [`fetch`](Fader::fetch)) nothing is sent; the lock is released once
/// the fader reaches the fetch target.
pub struct Fader<A> {
    input: A,
    fader: u16,
    overrides: Overrides,
    config: FaderConfig,
    last_raw: Option<i32>,
    last_sample_ms: Option<u64>,
    value: Option<i32>,
    locked: bool,
    fetch_target: i32,
}

impl<A: AnalogInput> Fader<A> {
    pub fn new(input: A, fader: u16) -> Self {
        Self::with_config(input, fader, FaderConfig::default())
    }

    pub fn with_config(input: A, fader: u16, config: FaderConfig) -> Self {
        Self {
            input,
            fader,
            overrides: Overrides::default(),
            config,
            last_raw: None,
            last_sample_ms: None,
            value: None,
            locked: false,
            fetch_target: 0,
        }
    }

    pub fn set_pool(&mut self, pool: u16) {
        self.overrides.pool = pool;
    }

    pub fn set_page(&mut self, page: u16) {
        self.overrides.page = page;
    }

    pub fn number(&self) -> u16 {
        self.fader
    }

    /// Last mapped value, `0` before the first sample.
    pub fn value(&self) -> i32 {
        self.value.unwrap_or(0)
    }

    /// Stop sending until the fader is moved to within the fetch delta of `target`.
    pub fn fetch(&mut self, target: i32) {
        self.fetch_target = target;
        self.locked = true;
    }

    pub fn set_fetch_delta(&mut self, delta: i32) {
        self.config.fetch_delta = delta;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn config(&self) -> &FaderConfig {
        &self.config
    }

    /// Sample the input at most once per update interval and report the
    /// mapped value when it changed. Nothing is sent while locked.
    pub fn update(&mut self, surface: &mut Surface) -> Option<Message> {
        let now = surface.now_ms();
        if let Some(last) = self.last_sample_ms {
            if now.saturating_sub(last) < self.config.update_interval_ms {
                return None;
            }
        }
        self.last_sample_ms = Some(now);

        let raw = self.input.read();
        if let Some(last_raw) = self.last_raw {
            if distance(raw, last_raw) <= i64::from(self.config.threshold) {
                return None;
            }
        }
        self.last_raw = Some(raw);

        let value = self.map(raw);
        if self.value == Some(value) {
            return None;
        }
        self.value = Some(value);

        if self.locked {
            if distance(value, self.fetch_target) <= i64::from(self.config.fetch_delta) {
                self.locked = false;
            } else {
                trace!(fader = self.fader, value, target = self.fetch_target, "fader locked");
                return None;
            }
        }

        surface.send_entity(Entity::Fader, self.fader, self.overrides, Argument::Int32(value))
    }

    fn map(&self, raw: i32) -> i32 {
        let span = i64::from(self.config.input_max) - i64::from(self.config.input_min);
        if span <= 0 {
            return 0;
        }
        let scaled = (i64::from(raw) - i64::from(self.config.input_min)) * 100 / span;
        // Clamped, so the narrowing below is lossless.
        scaled.clamp(0, 100) as i32
    }
}

fn distance(a: i32, b: i32) -> i64 {
    (i64::from(a) - i64::from(b)).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ExternalLevel;
    use crate::testing::clocked_surface;

    /// Raw readings map one-to-one onto 0..=100.
    fn identity() -> FaderConfig {
        FaderConfig {
            update_interval_ms: 1,
            threshold: 0,
            input_min: 0,
            input_max: 100,
            fetch_delta: 2,
        }
    }

    #[test]
    fn maps_default_range_to_percent() {
        let fader = Fader::new(ExternalLevel::new(0), 1);
        assert_eq!(fader.map(8), 0);
        assert_eq!(fader.map(1015), 100);
        assert_eq!(fader.map(0), 0);
        assert_eq!(fader.map(1023), 100);
        assert_eq!(fader.map(511), 49);
    }

    #[test]
    fn first_sample_is_reported() {
        let (mut surface, console, _clock) = clocked_surface();
        let level = ExternalLevel::new(1015);
        let mut fader = Fader::new(level, 3);

        let message = fader.update(&mut surface).unwrap();
        assert_eq!(message.address(), "/gma3/DataPool1/Page1/Fader3");
        assert_eq!(console.parsed()[0].int_arg_1, 100);
        assert_eq!(fader.value(), 100);
    }

    #[test]
    fn jitter_within_threshold_is_ignored() {
        let (mut surface, console, clock) = clocked_surface();
        let level = ExternalLevel::new(500);
        let mut fader = Fader::new(level.clone(), 1);

        fader.update(&mut surface);
        for raw in [504, 496, 503, 500] {
            clock.advance(5);
            level.set(raw);
            assert!(fader.update(&mut surface).is_none(), "raw {raw}");
        }
        assert_eq!(console.sent().len(), 1);

        clock.advance(5);
        level.set(560);
        assert!(fader.update(&mut surface).is_some());
        assert_eq!(console.sent().len(), 2);
    }

    #[test]
    fn move_past_threshold_without_value_change_sends_nothing() {
        let (mut surface, console, clock) = clocked_surface();
        let config = FaderConfig {
            threshold: 1,
            input_min: 0,
            input_max: 1000,
            ..FaderConfig::default()
        };
        let level = ExternalLevel::new(500);
        let mut fader = Fader::with_config(level.clone(), 1, config);

        fader.update(&mut surface);
        clock.advance(5);
        level.set(503);
        assert!(fader.update(&mut surface).is_none());
        assert_eq!(console.sent().len(), 1);
    }

    #[test]
    fn sampling_is_rate_limited() {
        let (mut surface, console, clock) = clocked_surface();
        let config = FaderConfig {
            update_interval_ms: 10,
            ..identity()
        };
        let level = ExternalLevel::new(10);
        let mut fader = Fader::with_config(level.clone(), 1, config);

        fader.update(&mut surface);
        level.set(50);
        clock.advance(9);
        assert!(fader.update(&mut surface).is_none());
        clock.advance(1);
        assert!(fader.update(&mut surface).is_some());
        assert_eq!(console.parsed()[1].int_arg_1, 50);
    }

    #[test]
    fn fetch_locks_until_target_is_reached() {
        let (mut surface, console, clock) = clocked_surface();
        let level = ExternalLevel::new(20);
        let mut fader = Fader::with_config(level.clone(), 1, identity());
        fader.update(&mut surface);
        console.clear();

        fader.fetch(60);
        assert!(fader.is_locked());

        clock.advance(2);
        level.set(55);
        assert!(fader.update(&mut surface).is_none());
        assert!(fader.is_locked());
        assert_eq!(fader.value(), 55);

        clock.advance(2);
        level.set(58);
        let message = fader.update(&mut surface);
        assert!(!fader.is_locked());
        assert!(message.is_some());

        clock.advance(2);
        level.set(61);
        assert!(fader.update(&mut surface).is_some());

        let values: Vec<i32> = console.parsed().iter().map(|m| m.int_arg_1).collect();
        assert_eq!(values, vec![58, 61]);
    }

    #[test]
    fn fetch_delta_is_adjustable() {
        let (mut surface, console, clock) = clocked_surface();
        let level = ExternalLevel::new(0);
        let mut fader = Fader::with_config(level.clone(), 1, identity());
        fader.update(&mut surface);
        console.clear();

        fader.set_fetch_delta(0);
        fader.fetch(40);
        for raw in [38, 39, 41] {
            clock.advance(2);
            level.set(raw);
            assert!(fader.update(&mut surface).is_none());
        }
        clock.advance(2);
        level.set(40);
        assert!(fader.update(&mut surface).is_some());
        assert_eq!(console.sent().len(), 1);
    }

    #[test]
    fn manual_unlock_resumes_reporting() {
        let (mut surface, console, clock) = clocked_surface();
        let level = ExternalLevel::new(0);
        let mut fader = Fader::with_config(level.clone(), 1, identity());
        fader.update(&mut surface);

        fader.set_locked(true);
        clock.advance(2);
        level.set(90);
        assert!(fader.update(&mut surface).is_none());
        fader.set_locked(false);
        clock.advance(2);
        level.set(80);
        assert!(fader.update(&mut surface).is_some());
        assert_eq!(console.sent().len(), 2);
    }
}
