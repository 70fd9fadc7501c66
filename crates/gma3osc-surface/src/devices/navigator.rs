use tracing::debug;

use super::{Edge, Transition};
use crate::config::{NavigatorConfig, Polarity};
use crate::error::Result;
use crate::input::DigitalInput;
use crate::registry::Registry;
use crate::surface::Surface;

/// Which shared counter a navigator moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorKind {
    /// Data pools, sent as `DataPool <n>`.
    Pool,
    /// Executor pages, sent as `Page <n>`.
    Page,
}

impl NavigatorKind {
    fn command_word(self) -> &'static str {
        match self {
            NavigatorKind::Pool => "DataPool",
            NavigatorKind::Page => "Page",
        }
    }
}

type Callback = Box<dyn FnMut(u16)>;

/// Up/down buttons stepping through a pool or page range with wraparound.
///
/// Every accepted step runs the callback with the new number, whatever the
/// [`NavigatorMode`](crate::NavigatorMode).
pub struct Navigator<U, D> {
    kind: NavigatorKind,
    up: U,
    down: D,
    up_edge: Edge,
    down_edge: Edge,
    config: NavigatorConfig,
    current: u16,
    last: u16,
    callback: Option<Callback>,
}

impl<U: DigitalInput, D: DigitalInput> Navigator<U, D> {
    /// Start at `config.start`. Fails when the range is empty or starts at 0.
    pub fn new(kind: NavigatorKind, up: U, down: D, config: NavigatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            kind,
            up,
            down,
            up_edge: Edge::new(Polarity::default()),
            down_edge: Edge::new(Polarity::default()),
            config,
            current: config.start,
            last: config.start,
            callback: None,
        })
    }

    pub fn pools(up: U, down: D, config: NavigatorConfig) -> Result<Self> {
        Self::new(NavigatorKind::Pool, up, down, config)
    }

    pub fn pages(up: U, down: D, config: NavigatorConfig) -> Result<Self> {
        Self::new(NavigatorKind::Page, up, down, config)
    }

    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.up_edge = Edge::new(polarity);
        self.down_edge = Edge::new(polarity);
        self
    }

    /// Called with the new number on every accepted change, whatever the mode.
    pub fn with_callback(mut self, callback: impl FnMut(u16) + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn kind(&self) -> NavigatorKind {
        self.kind
    }

    /// Current number.
    pub fn current(&self) -> u16 {
        self.current
    }

    /// Number before the most recent step.
    pub fn last(&self) -> u16 {
        self.last
    }

    /// Write the current number into the registry's common counter.
    pub fn sync(&self, registry: &mut Registry) {
        match self.kind {
            NavigatorKind::Pool => registry.set_common_pool(self.current),
            NavigatorKind::Page => registry.set_common_page(self.current),
        }
    }

    /// Poll both buttons. Returns the new number after a step.
    ///
    /// A change on the up button is handled first; the down button is only
    /// looked at when the up button is idle.
    pub fn update(&mut self, surface: &mut Surface) -> Option<u16> {
        if let Some(transition) = self.up_edge.poll(&mut self.up) {
            return (transition == Transition::Press).then(|| self.step(surface, true));
        }
        if let Some(transition) = self.down_edge.poll(&mut self.down) {
            return (transition == Transition::Press).then(|| self.step(surface, false));
        }
        None
    }

    fn step(&mut self, surface: &mut Surface, up: bool) -> u16 {
        let NavigatorConfig { start, end, mode } = self.config;
        self.last = self.current;
        self.current = match (up, self.current) {
            (true, n) if n >= end => start,
            (true, n) => n + 1,
            (false, n) if n <= start => end,
            (false, n) => n - 1,
        };
        debug!(kind = ?self.kind, from = self.last, to = self.current, "navigator step");

        if mode.sends_to_console() {
            surface.command(&format!("{} {}", self.kind.command_word(), self.current));
        }
        if mode.updates_registry() {
            self.sync(surface.registry_mut());
        }
        if let Some(callback) = self.callback.as_mut() {
            callback(self.current);
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::NavigatorMode;
    use crate::input::ExternalState;
    use crate::testing::recording_surface;

    struct Pad {
        up: ExternalState,
        down: ExternalState,
    }

    impl Pad {
        fn new() -> Self {
            Self {
                up: ExternalState::new(true),
                down: ExternalState::new(true),
            }
        }

        fn press(
            &self,
            button: &ExternalState,
            nav: &mut Navigator<ExternalState, ExternalState>,
            surface: &mut Surface,
        ) -> Option<u16> {
            button.set(false);
            let step = nav.update(surface);
            button.set(true);
            nav.update(surface);
            step
        }
    }

    fn navigator(
        pad: &Pad,
        kind: NavigatorKind,
        mode: NavigatorMode,
    ) -> Navigator<ExternalState, ExternalState> {
        Navigator::new(
            kind,
            pad.up.clone(),
            pad.down.clone(),
            NavigatorConfig::new(1, 4, mode),
        )
        .unwrap()
    }

    #[test]
    fn up_wraps_from_end_to_start() {
        let (mut surface, _console) = recording_surface();
        let pad = Pad::new();
        let mut nav = navigator(&pad, NavigatorKind::Pool, NavigatorMode::Local);

        let steps: Vec<Option<u16>> = (0..4)
            .map(|_| pad.press(&pad.up, &mut nav, &mut surface))
            .collect();
        assert_eq!(steps, vec![Some(2), Some(3), Some(4), Some(1)]);
        assert_eq!(nav.last(), 4);
    }

    #[test]
    fn down_wraps_from_start_to_end() {
        let (mut surface, _console) = recording_surface();
        let pad = Pad::new();
        let mut nav = navigator(&pad, NavigatorKind::Page, NavigatorMode::Local);

        assert_eq!(pad.press(&pad.down, &mut nav, &mut surface), Some(4));
        assert_eq!(pad.press(&pad.down, &mut nav, &mut surface), Some(3));
        assert_eq!(nav.current(), 3);
    }

    #[test]
    fn local_mode_updates_registry_only() {
        let (mut surface, console) = recording_surface();
        let pad = Pad::new();
        let mut nav = navigator(&pad, NavigatorKind::Page, NavigatorMode::Local);

        pad.press(&pad.up, &mut nav, &mut surface);
        assert_eq!(surface.registry().common_page(), 2);
        assert!(console.sent().is_empty());
    }

    #[test]
    fn console_mode_sends_command_only() {
        let (mut surface, console) = recording_surface();
        let pad = Pad::new();
        let mut nav = navigator(&pad, NavigatorKind::Pool, NavigatorMode::Console);

        pad.press(&pad.up, &mut nav, &mut surface);
        assert_eq!(surface.registry().common_pool(), 1);
        let sent = console.parsed();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].address, "/gma3/cmd");
        assert_eq!(sent[0].string_arg, "DataPool 2");
    }

    #[test]
    fn global_mode_does_both_and_moves_devices() {
        let (mut surface, console) = recording_surface();
        let pad = Pad::new();
        let mut nav = navigator(&pad, NavigatorKind::Page, NavigatorMode::Global);

        pad.press(&pad.down, &mut nav, &mut surface);
        assert_eq!(surface.registry().common_page(), 4);
        assert_eq!(console.parsed()[0].string_arg, "Page 4");

        let address = surface
            .registry()
            .entity_address(crate::registry::Entity::Key, 1, Default::default())
            .unwrap();
        assert_eq!(address, "/gma3/DataPool1/Page4/Key1");
    }

    #[test]
    fn callback_sees_every_change() {
        let (mut surface, _console) = recording_surface();
        let pad = Pad::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut nav = navigator(&pad, NavigatorKind::Pool, NavigatorMode::Local)
            .with_callback(move |n| sink.borrow_mut().push(n));

        pad.press(&pad.up, &mut nav, &mut surface);
        pad.press(&pad.down, &mut nav, &mut surface);
        pad.press(&pad.down, &mut nav, &mut surface);
        assert_eq!(*seen.borrow(), vec![2, 1, 4]);
    }

    #[test]
    fn releases_and_idle_polls_do_not_step() {
        let (mut surface, _console) = recording_surface();
        let pad = Pad::new();
        let mut nav = navigator(&pad, NavigatorKind::Pool, NavigatorMode::Local);

        assert_eq!(nav.update(&mut surface), None);
        pad.up.set(false);
        assert_eq!(nav.update(&mut surface), Some(2));
        assert_eq!(nav.update(&mut surface), None);
        pad.up.set(true);
        assert_eq!(nav.update(&mut surface), None);
        assert_eq!(nav.current(), 2);
    }

    #[test]
    fn invalid_range_is_rejected() {
        let pad = Pad::new();
        let result = Navigator::pages(
            pad.up.clone(),
            pad.down.clone(),
            NavigatorConfig::new(4, 1, NavigatorMode::Local),
        );
        assert!(result.is_err());
    }

    #[test]
    fn sync_seeds_registry_with_start() {
        let (mut surface, _console) = recording_surface();
        let pad = Pad::new();
        let nav = Navigator::pools(
            pad.up.clone(),
            pad.down.clone(),
            NavigatorConfig::new(3, 6, NavigatorMode::Global),
        )
        .unwrap();
        nav.sync(surface.registry_mut());
        assert_eq!(surface.registry().common_pool(), 3);
    }
}
