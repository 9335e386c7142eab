//! # Core Memory Operations
//!
//! This module provides the `CoreBus` trait: read and write built from the
//! pulse primitive, with the destructive-read-then-restore protocol written
//! once in the trait's default methods.
//!
//! Implementations:
//!
//! - [`CoreMemory`]: drives real or simulated hardware through the sequencer
//! - [`FlatCore`]: an ideal, logic-only model of the pulse semantics, useful as
//!   a reference when checking a physical backend
//!
//! ## Design Principles
//!
//! Core memory has no bus error mechanism:
//! - reads and writes always complete and always return a value
//! - addresses are 8-bit, so every address is valid
//! - values wider than two bits are truncated
//! - a physical fault shows up only as a wrong value on a later read

use tracing::{event, Level};

use crate::address::CORE_COUNT;
use crate::config::{ConfigError, CoreConfig};
use crate::devices::{Actuators, GpioActuators, GpioPort};
use crate::sequencer::{PlaneMask, PulseDirection, Sequencer};
use crate::timing::{BusyWait, CycleCounter, Delay};

/// Read/write access to a 256 x 2-bit core store.
///
/// Implementors supply the pulse primitive and the sense sample; `write` and
/// `read` are composed from them.
///
/// # Examples
///
/// ```
/// use coremem::{CoreBus, FlatCore};
///
/// let mut mem = FlatCore::new();
/// mem.write(0x10, 0b10);
/// assert_eq!(mem.read(0x10), 0b10);
/// // The read restored the value
/// assert_eq!(mem.read(0x10), 0b10);
/// ```
pub trait CoreBus {
    /// Issue one coincident-current pulse.
    fn pulse(&mut self, address: u8, direction: PulseDirection, enable: PlaneMask, reset_latch: bool);

    /// Sample the sense latch: `(sense1 << 1) | sense0`.
    fn sense(&mut self) -> u8;

    /// Mark a point of interest on the debug line.
    fn strobe_debug_event(&mut self) {}

    /// Store a 2-bit value.
    ///
    /// Always exactly two pulses: an unconditional clear of both planes, then
    /// a set pulse with every plane whose target bit is 0 inhibited.
    fn write(&mut self, address: u8, value: u8) {
        self.pulse(address, PulseDirection::Clear, PlaneMask::BOTH, false);
        self.pulse(address, PulseDirection::Set, PlaneMask::from_bits(value), false);
    }

    /// Fetch a 2-bit value.
    ///
    /// The sensing pulse clears the core; the value it captured is written
    /// straight back before returning.
    fn read(&mut self, address: u8) -> u8 {
        self.pulse(address, PulseDirection::Clear, PlaneMask::BOTH, true);
        let value = self.sense() & 0b11;

        self.pulse(address, PulseDirection::Set, PlaneMask::from_bits(value), false);

        event!(Level::TRACE, address, value, "read");
        value
    }
}

/// Core memory driven through the waveform sequencer.
///
/// # Examples
///
/// ```
/// use coremem::{CoreBus, SimulatedMemory};
///
/// let mut memory = SimulatedMemory::simulated();
/// for value in 0..4 {
///     memory.write(0x7E, value);
///     assert_eq!(memory.read(0x7E), value);
/// }
/// ```
pub struct CoreMemory<A, D> {
    sequencer: Sequencer<A, D>,
}

impl<A: Actuators, D: Delay> CoreMemory<A, D> {
    /// Take ownership of the actuator lines and the delay source.
    pub fn new(actuators: A, delay: D) -> Self {
        Self {
            sequencer: Sequencer::new(actuators, delay),
        }
    }

    /// The actuator backend.
    pub fn actuators(&self) -> &A {
        self.sequencer.actuators()
    }

    /// Mutable access to the actuator backend.
    pub fn actuators_mut(&mut self) -> &mut A {
        self.sequencer.actuators_mut()
    }

    /// Pulses issued so far.
    pub fn pulse_count(&self) -> u64 {
        self.sequencer.pulse_count()
    }
}

impl<P: GpioPort, C: CycleCounter> CoreMemory<GpioActuators<P>, BusyWait<C>> {
    /// Core memory on a GPIO bank, timed by a busy-wait on `counter`.
    ///
    /// Pin directions must already be configured; this only validates the
    /// layout and the clock calibration.
    pub fn from_config(port: P, counter: C, config: &CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let actuators = GpioActuators::new(port, config.pins)?;
        Ok(Self::new(actuators, BusyWait::new(counter, config.calibration)))
    }
}

impl<A: Actuators, D: Delay> CoreBus for CoreMemory<A, D> {
    fn pulse(&mut self, address: u8, direction: PulseDirection, enable: PlaneMask, reset_latch: bool) {
        self.sequencer.pulse(address, direction, enable, reset_latch);
    }

    fn sense(&mut self) -> u8 {
        self.sequencer.sample_sense()
    }

    fn strobe_debug_event(&mut self) {
        self.sequencer.strobe_debug_event();
    }
}

/// Ideal core store with the logical pulse semantics and no physics.
///
/// A set pulse sets every enabled plane, a clear pulse clears every enabled
/// plane, and the sense latch records which planes changed since the last
/// latch reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatCore {
    cells: [u8; CORE_COUNT],
    sensed: u8,
    pulses: u64,
}

impl FlatCore {
    /// All cells zero.
    pub fn new() -> Self {
        Self {
            cells: [0; CORE_COUNT],
            sensed: 0,
            pulses: 0,
        }
    }

    /// Stored value, read without disturbing it.
    pub fn peek(&self, address: u8) -> u8 {
        self.cells[address as usize]
    }

    /// Pulses issued so far.
    pub fn pulse_count(&self) -> u64 {
        self.pulses
    }
}

impl Default for FlatCore {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreBus for FlatCore {
    fn pulse(&mut self, address: u8, direction: PulseDirection, enable: PlaneMask, reset_latch: bool) {
        if reset_latch {
            self.sensed = 0;
        }

        let cell = &mut self.cells[address as usize];
        let before = *cell;
        match direction {
            PulseDirection::Set => *cell |= enable.bits(),
            PulseDirection::Clear => *cell &= !enable.bits(),
        }

        self.sensed |= before ^ *cell;
        self.pulses += 1;
    }

    fn sense(&mut self) -> u8 {
        self.sensed
    }
}
