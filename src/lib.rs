//! # Coincident-Current Core Memory Driver
//!
//! Driver for a 16x16 magnetic-core memory array with two bit-planes: 256
//! addressable cells of two bits each, built from current pulses on X, Y and
//! per-plane inhibit lines.
//!
//! The driver generates the timed pulse sequence that selects a single core by
//! coincident current, inhibits planes that must not switch, and senses the
//! switching of a core during a destructive read.
//!
//! ## Quick Start
//!
//! ```rust
//! use coremem::{CoreBus, SimulatedMemory};
//!
//! // 16x16x2 simulated array on simulated time
//! let mut memory = SimulatedMemory::simulated();
//!
//! memory.write(0x11, 0b10);
//! assert_eq!(memory.read(0x11), 0b10);
//!
//! // Reads restore what they destroyed
//! assert_eq!(memory.read(0x11), 0b10);
//!
//! // Every driver is released between pulses
//! assert!(memory.actuators().all_released());
//! ```
//!
//! ## Architecture
//!
//! - **Owned hardware**: the sequencer owns its [`Actuators`] and [`Delay`];
//!   backends are generic parameters, not global state
//! - **Total operations**: reads and writes never fail; only configuration
//!   can be rejected ([`ConfigError`])
//! - **Protocol constants in quanta**: retargeting a clock changes the
//!   [`Calibration`], not the pulse timing
//!
//! ## Modules
//!
//! - `timing` - Quantum delays and clock calibration
//! - `bridge` - H-bridge drive states, bridges and planes
//! - `address` - Address to X/Y decode and core orientation
//! - `sequencer` - The coincident-current pulse
//! - `memory` - `CoreBus` read/write on top of the pulse
//! - `devices` - GPIO, simulated and tracing actuator backends
//! - `config` - Pin layout and calibration
//! - `diagnostics` - Gallop, half-current stress and image tests
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and installs no subscriber. Pulses and
//! reads are logged at `TRACE`, diagnostic mismatches at `WARN`.

pub mod address;
pub mod bridge;
pub mod config;
pub mod devices;
pub mod diagnostics;
pub mod memory;
pub mod sequencer;
pub mod timing;

// WebAssembly bindings (optional)
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export public API
pub use bridge::{Bridge, BridgeState, Plane};
pub use config::{ConfigError, CoreConfig, PinMap};
pub use devices::sim::SimulatedMemory;
pub use devices::{
    Actuators, GpioActuators, GpioPort, PortImage, SimConfig, SimulatedArray, Trace, TraceEvent,
    Traced,
};
pub use diagnostics::{MemoryImage, Mismatch};
pub use memory::{CoreBus, CoreMemory, FlatCore};
pub use sequencer::{PlaneMask, PulseDirection, Sequencer};
pub use timing::{BusyWait, Calibration, CycleCounter, Delay, InstantCounter, VirtualClock};

#[cfg(feature = "wasm")]
pub use wasm::WasmCoreMemory;
