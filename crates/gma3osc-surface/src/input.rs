//! Input capabilities sampled by device adapters.
//!
//! Hardware pins, simulated inputs and state pushed in by a host all look the
//! same to an adapter: something that yields the current level when asked.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// A sampled boolean level (a button or an encoder phase).
pub trait DigitalInput {
    fn read(&mut self) -> bool;
}

/// A sampled integer level (a fader wiper).
pub trait AnalogInput {
    fn read(&mut self) -> i32;
}

/// Millisecond time source used for rate limiting.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<F: FnMut() -> bool> DigitalInput for F {
    fn read(&mut self) -> bool {
        self()
    }
}

impl<F: FnMut() -> i32> AnalogInput for F {
    fn read(&mut self) -> i32 {
        self()
    }
}

/// Boolean level set from outside the adapter.
///
/// Clones share the same cell: the host keeps one handle and writes the level,
/// the adapter owns another and samples it.
#[derive(Debug, Clone, Default)]
pub struct ExternalState(Rc<Cell<bool>>);

impl ExternalState {
    pub fn new(level: bool) -> Self {
        Self(Rc::new(Cell::new(level)))
    }

    pub fn set(&self, level: bool) {
        self.0.set(level);
    }

    pub fn get(&self) -> bool {
        self.0.get()
    }
}

impl DigitalInput for ExternalState {
    fn read(&mut self) -> bool {
        self.0.get()
    }
}

/// Integer level set from outside the adapter.
#[derive(Debug, Clone, Default)]
pub struct ExternalLevel(Rc<Cell<i32>>);

impl ExternalLevel {
    pub fn new(level: i32) -> Self {
        Self(Rc::new(Cell::new(level)))
    }

    pub fn set(&self, level: i32) {
        self.0.set(level);
    }

    pub fn get(&self) -> i32 {
        self.0.get()
    }
}

impl AnalogInput for ExternalLevel {
    fn read(&mut self) -> i32 {
        self.0.get()
    }
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Hand-driven clock for deterministic tests and simulations.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self(Rc::new(Cell::new(start_ms)))
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get().saturating_add(ms));
    }

    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}
