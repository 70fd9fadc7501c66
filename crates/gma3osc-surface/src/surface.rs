use bytes::Bytes;
use gma3osc_frame::{Argument, Dispatcher, Message};
use tracing::warn;

use crate::config::SurfaceConfig;
use crate::error::Result;
use crate::input::{Clock, SystemClock};
use crate::registry::{Entity, Overrides, Registry};

/// Which receiver a message goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    /// The lighting console.
    #[default]
    Console,
    /// The optional second receiver (e.g. a show control application).
    /// Falls back to the console when none is configured.
    External,
}

/// Everything a device adapter needs on update: naming, shared counters,
/// outbound links and the time source.
pub struct Surface {
    registry: Registry,
    console: Dispatcher,
    external: Option<Dispatcher>,
    clock: Box<dyn Clock>,
}

impl Surface {
    /// Surface with no external receiver, timed by the system clock.
    pub fn new(registry: Registry, console: Dispatcher) -> Self {
        Self {
            registry,
            console,
            external: None,
            clock: Box::new(SystemClock::new()),
        }
    }

    /// Open the sockets described by `config`.
    pub fn from_config(config: &SurfaceConfig) -> Result<Self> {
        let registry = Registry::from_naming(config.naming.clone())?;
        let console = config.console.open()?;
        let mut surface = Self::new(registry, console);
        if let Some(external) = &config.external {
            surface.external = Some(external.open()?);
        }
        Ok(surface)
    }

    /// Route generic OSC buttons to `external` instead of the console.
    pub fn with_external(mut self, external: Dispatcher) -> Self {
        self.external = Some(external);
        self
    }

    /// Replace the clock used for fader rate limiting.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn console(&mut self) -> &mut Dispatcher {
        &mut self.console
    }

    pub fn external(&mut self) -> Option<&mut Dispatcher> {
        self.external.as_mut()
    }

    /// Milliseconds since the clock's epoch.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Build and send one message to the console.
    ///
    /// Build failures are logged and yield `None`; nothing reaches the wire.
    pub fn send(&mut self, address: &str, argument: Argument) -> Option<Message> {
        self.send_to(Destination::Console, address, argument)
    }

    pub fn send_to(
        &mut self,
        destination: Destination,
        address: &str,
        argument: Argument,
    ) -> Option<Message> {
        let message = match Message::new(address, argument) {
            Ok(message) => message,
            Err(err) => {
                warn!(address, error = %err, "message not built");
                return None;
            }
        };
        self.dispatch(destination, &message);
        Some(message)
    }

    /// Send an already built message.
    pub fn dispatch(&mut self, destination: Destination, message: &Message) {
        match (destination, self.external.as_mut()) {
            (Destination::External, Some(external)) => external.send(message),
            _ => self.console.send(message),
        }
    }

    /// Send an executor element message addressed through the registry.
    pub fn send_entity(
        &mut self,
        entity: Entity,
        number: u16,
        overrides: Overrides,
        argument: Argument,
    ) -> Option<Message> {
        let address = match self.registry.entity_address(entity, number, overrides) {
            Ok(address) => address,
            Err(err) => {
                warn!(?entity, number, error = %err, "address not built");
                return None;
            }
        };
        self.send(&address, argument)
    }

    /// Send `text` to the console command line.
    pub fn command(&mut self, text: &str) -> Option<Message> {
        let address = match self.registry.command_address() {
            Ok(address) => address,
            Err(err) => {
                warn!(error = %err, "command address not built");
                return None;
            }
        };
        self.send(&address, Argument::from(text))
    }

    /// Next inbound packet from the console link.
    pub fn poll_inbound(&mut self) -> Option<Bytes> {
        self.console.poll_inbound()
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("registry", &self.registry)
            .field("console", &self.console)
            .field("external", &self.external)
            .finish_non_exhaustive()
    }
}
