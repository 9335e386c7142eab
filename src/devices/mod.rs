//! Actuator backends for the core memory driver.
//!
//! The sequencer never touches hardware directly. It drives an [`Actuators`]
//! implementation, which owns the output lines exclusively and exposes them
//! as a small capability interface.
//!
//! # Backends
//!
//! - [`GpioActuators`]: real hardware through a [`GpioPort`] with masked writes
//! - [`SimulatedArray`]: a physical model of the 16x16x2 core array
//! - [`Traced`]: wraps any backend (and any [`Delay`](crate::Delay)) and
//!   records every operation
//!
//! # Example
//!
//! ```rust
//! use coremem::{Actuators, Bridge, BridgeState, SimConfig, SimulatedArray, VirtualClock};
//!
//! let clock = VirtualClock::new();
//! let mut array = SimulatedArray::with_clock(clock.clone(), SimConfig::default());
//! array.set_address_bus(0x00);
//! array.set_bridge(Bridge::X, BridgeState::ConductDir1);
//! array.set_bridge(Bridge::X, BridgeState::NoConduct);
//!
//! assert_eq!(array.sample_sense(), 0);
//! ```

use crate::bridge::{Bridge, BridgeState};

pub mod gpio;
pub mod sim;
pub mod trace;

pub use gpio::{GpioActuators, GpioPort, PortImage};
pub use sim::{SimConfig, SimulatedArray};
pub use trace::{Trace, TraceEvent, Traced};

/// Output and sense lines of the core memory board.
///
/// # Contract
///
/// - **Atomic bridge writes**: `set_bridge` changes the enable and direction
///   lines of one driver together. An intermediate state (enable asserted,
///   direction stale) would push current the wrong way.
/// - **Atomic address writes**: all eight address lines change together.
/// - **No failures**: every call succeeds; the hardware has no error path.
pub trait Actuators {
    /// Drive one bridge into `state`.
    fn set_bridge(&mut self, bridge: Bridge, state: BridgeState);

    /// Put an address on the 8-line address bus (X nibble low, Y nibble high).
    fn set_address_bus(&mut self, address: u8);

    /// Set the sense latch reset line. Low clears the latch, high arms it.
    fn set_latch_reset(&mut self, level: bool);

    /// Pulse the debug line high then low for scope or trace correlation.
    fn strobe_debug_event(&mut self);

    /// Read both sense inputs as `(sense1 << 1) | sense0`.
    fn sample_sense(&mut self) -> u8;
}

impl<A: Actuators + ?Sized> Actuators for &mut A {
    fn set_bridge(&mut self, bridge: Bridge, state: BridgeState) {
        (**self).set_bridge(bridge, state);
    }

    fn set_address_bus(&mut self, address: u8) {
        (**self).set_address_bus(address);
    }

    fn set_latch_reset(&mut self, level: bool) {
        (**self).set_latch_reset(level);
    }

    fn strobe_debug_event(&mut self) {
        (**self).strobe_debug_event();
    }

    fn sample_sense(&mut self) -> u8 {
        (**self).sample_sense()
    }
}
