//! # Waveform Sequencer
//!
//! Generates the single physical primitive every read and write is built
//! from: one coincident-current pulse through one X line and one Y line, with
//! optional per-plane inhibit.
//!
//! ## Pulse Protocol
//!
//! All waits are minimums, in 100 ns quanta.
//!
//! | Step | Action | Wait |
//! |------|--------|------|
//! | 1  | Address bus | [`ADDRESS_SETTLE_QUANTA`] |
//! | 2  | Decode orientation flags | |
//! | 3  | Latch reset low (read pulses only) | |
//! | 4  | X on, direction corrected for core orientation | |
//! | 5  | Latch reset high (re-arm capture) | |
//! | 6  | Derive inhibit polarity | |
//! | 7  | Inhibit on for each plane *not* in the enable mask | [`INHIBIT_LEAD_QUANTA`] |
//! | 8  | Y on | [`SATURATION_QUANTA`] |
//! | 9  | Y off | [`Y_RELEASE_QUANTA`] |
//! | 10 | Both inhibits off | |
//! | 11 | X off | |
//! | 12 | Idle | [`RECOVERY_QUANTA`] then [`THERMAL_QUANTA`] |
//!
//! Only the core at the X/Y intersection sees a full-select field; every
//! other core on either line sees half of it and keeps its state. The two
//! trailing waits are separate margins (recovery before the next address
//! change, and duty-cycle limiting for the current-limiting resistors) and are
//! issued as two waits.
//!
//! These counts are protocol constants. Porting to another clock changes the
//! [`Calibration`](crate::Calibration), not these numbers.

use tracing::{event, Level};

use crate::address::decode;
use crate::bridge::{Bridge, BridgeState, Plane};
use crate::devices::Actuators;
use crate::timing::Delay;

/// Address bus settling time before any driver turns on.
pub const ADDRESS_SETTLE_QUANTA: u32 = 2;

/// Lead time between the inhibit drivers and the Y driver.
pub const INHIBIT_LEAD_QUANTA: u32 = 1;

/// Full-select hold time: long enough for a core to switch completely.
pub const SATURATION_QUANTA: u32 = 10;

/// Gap between releasing Y and releasing the inhibit and X drivers.
pub const Y_RELEASE_QUANTA: u32 = 1;

/// Recovery before the next pulse may change the address.
pub const RECOVERY_QUANTA: u32 = 5;

/// Thermal rest for the current-limiting resistors.
pub const THERMAL_QUANTA: u32 = 5;

/// Logical direction of a pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PulseDirection {
    /// Drive selected cores towards zero.
    Clear,
    /// Drive selected cores towards one.
    Set,
}

impl PulseDirection {
    /// True for [`PulseDirection::Set`].
    #[inline]
    pub fn is_set(self) -> bool {
        matches!(self, PulseDirection::Set)
    }
}

impl From<bool> for PulseDirection {
    fn from(set: bool) -> Self {
        if set {
            PulseDirection::Set
        } else {
            PulseDirection::Clear
        }
    }
}

/// Per-plane enable mask: a set bit lets that plane receive full current.
///
/// Values are truncated to two bits.
///
/// # Examples
///
/// ```
/// use coremem::{Plane, PlaneMask};
///
/// let mask = PlaneMask::from_bits(0b101);
/// assert_eq!(mask.bits(), 0b01);
/// assert!(mask.contains(Plane::Zero));
/// assert!(!mask.contains(Plane::One));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlaneMask(u8);

impl PlaneMask {
    /// Neither plane enabled (both inhibited).
    pub const NONE: PlaneMask = PlaneMask(0b00);
    /// Plane 0 only.
    pub const PLANE0: PlaneMask = PlaneMask(0b01);
    /// Plane 1 only.
    pub const PLANE1: PlaneMask = PlaneMask(0b10);
    /// Both planes enabled (no inhibit).
    pub const BOTH: PlaneMask = PlaneMask(0b11);

    /// Build from the low two bits of `bits`.
    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        PlaneMask(bits & 0b11)
    }

    /// Raw 2-bit value.
    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// True if `plane` is enabled.
    #[inline]
    pub fn contains(self, plane: Plane) -> bool {
        self.0 & plane.bit() != 0
    }
}

impl From<u8> for PlaneMask {
    fn from(bits: u8) -> Self {
        PlaneMask::from_bits(bits)
    }
}

/// Releases every driver if dropped while still armed, so a pulse abandoned
/// part-way (a panicking backend) cannot leave current flowing.
struct ReleaseGuard<'a, A: Actuators> {
    actuators: &'a mut A,
    armed: bool,
}

impl<'a, A: Actuators> ReleaseGuard<'a, A> {
    fn new(actuators: &'a mut A) -> Self {
        Self {
            actuators,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<A: Actuators> Drop for ReleaseGuard<'_, A> {
    fn drop(&mut self) {
        if self.armed {
            for bridge in Bridge::ALL {
                self.actuators.set_bridge(bridge, BridgeState::NoConduct);
            }
        }
    }
}

/// Drives pulses through an owned actuator backend and delay.
///
/// The sequencer holds the only handle to the actuator lines; every pulse
/// takes `&mut self` and runs to completion before returning.
pub struct Sequencer<A, D> {
    actuators: A,
    delay: D,
    pulses: u64,
}

impl<A: Actuators, D: Delay> Sequencer<A, D> {
    /// Take ownership of the actuators and the delay source.
    pub fn new(actuators: A, delay: D) -> Self {
        Self {
            actuators,
            delay,
            pulses: 0,
        }
    }

    /// Issue one pulse.
    ///
    /// - `direction`: [`PulseDirection::Set`] drives a one, `Clear` a zero
    /// - `enable`: planes that receive full current; the others are inhibited
    /// - `reset_latch`: clear the sense latch first so this pulse's switching
    ///   is captured (read pulses)
    ///
    /// Every driver is back at no-conduction when this returns.
    pub fn pulse(
        &mut self,
        address: u8,
        direction: PulseDirection,
        enable: PlaneMask,
        reset_latch: bool,
    ) {
        event!(
            Level::TRACE,
            address,
            ?direction,
            enable = enable.bits(),
            reset_latch,
            "pulse"
        );

        let set = direction.is_set();
        let delay = &mut self.delay;
        let mut lines = ReleaseGuard::new(&mut self.actuators);

        lines.actuators.set_address_bus(address);
        delay.wait_quanta(ADDRESS_SETTLE_QUANTA);

        let decoded = decode(address);

        if reset_latch {
            lines.actuators.set_latch_reset(false);
        }

        // Mirrored cores need the X current reversed
        lines
            .actuators
            .set_bridge(Bridge::X, BridgeState::conduct_dir2_if(set ^ decoded.invert_x));

        lines.actuators.set_latch_reset(true);

        let invert_inhibit = decoded.invert_inhibit_base ^ set;
        for plane in Plane::ALL {
            if !enable.contains(plane) {
                lines.actuators.set_bridge(
                    Bridge::inhibit(plane),
                    BridgeState::conduct_dir2_if(invert_inhibit),
                );
            }
        }
        delay.wait_quanta(INHIBIT_LEAD_QUANTA);

        // Full select: only the addressed core crosses the switching threshold
        lines
            .actuators
            .set_bridge(Bridge::Y, BridgeState::conduct_dir2_if(!set));
        delay.wait_quanta(SATURATION_QUANTA);

        lines.actuators.set_bridge(Bridge::Y, BridgeState::NoConduct);
        delay.wait_quanta(Y_RELEASE_QUANTA);

        lines
            .actuators
            .set_bridge(Bridge::Inhibit0, BridgeState::NoConduct);
        lines
            .actuators
            .set_bridge(Bridge::Inhibit1, BridgeState::NoConduct);

        lines.actuators.set_bridge(Bridge::X, BridgeState::NoConduct);
        lines.disarm();

        delay.wait_quanta(RECOVERY_QUANTA);
        delay.wait_quanta(THERMAL_QUANTA);

        self.pulses += 1;
    }

    /// Read both sense inputs.
    pub fn sample_sense(&mut self) -> u8 {
        self.actuators.sample_sense() & 0b11
    }

    /// Strobe the debug line.
    pub fn strobe_debug_event(&mut self) {
        self.actuators.strobe_debug_event();
    }

    /// Number of pulses issued.
    pub fn pulse_count(&self) -> u64 {
        self.pulses
    }

    /// The actuator backend.
    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    /// Mutable access to the actuator backend.
    pub fn actuators_mut(&mut self) -> &mut A {
        &mut self.actuators
    }
}
