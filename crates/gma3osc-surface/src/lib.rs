//! Control-surface devices for grandMA3 consoles.
//!
//! A [`Surface`] owns the addressing [`Registry`], the outbound links and the
//! clock. Device adapters ([`Key`], [`Fader`], [`ExecutorKnob`], [`CmdButton`],
//! [`OscButton`], [`Button`], [`Navigator`]) hold only their own state and are
//! updated against a surface once per host loop iteration:
//!
//! ```no_run
//! use gma3osc_surface::{Fader, Key, Receiver, Surface, SurfaceConfig, ExternalLevel, ExternalState};
//!
//! let config = SurfaceConfig::default();
//! let mut surface = Surface::from_config(&config)?;
//! let button = ExternalState::new(true);
//! let wiper = ExternalLevel::new(0);
//! let mut key = Key::new(button.clone(), 101);
//! let mut fader = Fader::with_config(wiper.clone(), 201, config.fader);
//! let mut receiver = Receiver::new();
//!
//! loop {
//!     key.update(&mut surface);
//!     fader.update(&mut surface);
//!     if receiver.poll(&mut surface) {
//!         println!("{} -> {}", receiver.address(), receiver.float());
//!     }
//! }
//! # Ok::<(), gma3osc_surface::SurfaceError>(())
//! ```

pub mod config;
pub mod devices;
pub mod error;
pub mod input;
pub mod receiver;
pub mod registry;
pub mod surface;

#[cfg(test)]
mod testing;

pub use config::{
    Direction, Endpoint, FaderConfig, NavigatorConfig, NavigatorMode, Polarity, SurfaceConfig,
};
pub use devices::{Button, CmdButton, ExecutorKnob, Fader, Key, Navigator, NavigatorKind, OscButton};
pub use error::{Result, SurfaceError};
pub use input::{
    AnalogInput, Clock, DigitalInput, ExternalLevel, ExternalState, ManualClock, SystemClock,
};
pub use receiver::Receiver;
pub use registry::{Entity, Naming, Overrides, Registry, MAX_LABEL_LEN};
pub use surface::{Destination, Surface};
