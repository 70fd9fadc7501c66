//! OSC control surfaces for grandMA3 lighting consoles.
//!
//! gma3osc turns buttons, faders and encoders into OSC messages a grandMA3
//! console understands, and decodes what the console sends back.
//!
//! # Crate Structure
//!
//! - [`transport`]: UDP/TCP socket seam and `std::net` implementations
//! - [`frame`]: message building and parsing, SLIP framing, dispatch
//! - [`surface`]: addressing registry, device adapters and the inbound receiver

/// Re-export transport types.
pub mod transport {
    pub use gma3osc_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use gma3osc_frame::*;
}

/// Re-export surface types.
pub mod surface {
    pub use gma3osc_surface::*;
}
