//! # Timing Primitive
//!
//! Every duration in the pulse protocol is expressed in *quanta* of 100 ns.
//! This module turns quanta into real (or simulated) time.
//!
//! - [`Delay`]: blocks for at least `n` quanta, never less
//! - [`Calibration`]: quantum-to-cycle ratio for a given processor clock
//! - [`BusyWait`]: spins on a [`CycleCounter`] until enough cycles have elapsed
//! - [`InstantCounter`]: host cycle counter derived from `std::time::Instant`
//! - [`VirtualClock`]: shared simulated time, advanced only by waits
//!
//! Retargeting to a different clock changes the [`Calibration`], never the
//! quantum counts used by the sequencer.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::config::ConfigError;

/// Length of one quantum in nanoseconds on the reference hardware.
pub const DEFAULT_QUANTUM_NS: u32 = 100;

/// Processor clock the reference firmware was calibrated against (20 cycles per quantum).
pub const DEFAULT_CLOCK_HZ: u32 = 200_000_000;

/// Blocks the calling context for a whole number of quanta.
///
/// Implementations must be monotonic and must never return before `quanta`
/// full quanta have elapsed. Returning late is always allowed.
pub trait Delay {
    /// Wait for at least `quanta` quanta.
    fn wait_quanta(&mut self, quanta: u32);
}

impl<D: Delay + ?Sized> Delay for &mut D {
    fn wait_quanta(&mut self, quanta: u32) {
        (**self).wait_quanta(quanta);
    }
}

/// Quantum-to-cycle calibration for a processor clock.
///
/// # Examples
///
/// ```
/// use coremem::Calibration;
///
/// let cal = Calibration::default();
/// assert_eq!(cal.cycles_for(1), 20);
/// assert_eq!(cal.cycles_for(10), 200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calibration {
    clock_hz: u32,
    quantum_ns: u32,
}

impl Calibration {
    /// Build a calibration for `clock_hz` with the standard 100 ns quantum.
    pub fn new(clock_hz: u32) -> Result<Self, ConfigError> {
        Self::with_quantum(clock_hz, DEFAULT_QUANTUM_NS)
    }

    /// Build a calibration with an explicit quantum length.
    pub fn with_quantum(clock_hz: u32, quantum_ns: u32) -> Result<Self, ConfigError> {
        if clock_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        if quantum_ns == 0 {
            return Err(ConfigError::ZeroQuantum);
        }
        Ok(Self {
            clock_hz,
            quantum_ns,
        })
    }

    /// Processor clock in Hz.
    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Quantum length in nanoseconds.
    pub fn quantum_ns(&self) -> u32 {
        self.quantum_ns
    }

    /// Number of clock cycles covering `quanta` quanta, rounded up so a wait
    /// based on it can never be short.
    pub fn cycles_for(&self, quanta: u32) -> u64 {
        let numerator =
            u128::from(quanta) * u128::from(self.quantum_ns) * u128::from(self.clock_hz);
        u64::try_from(numerator.div_ceil(1_000_000_000)).unwrap_or(u64::MAX)
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            quantum_ns: DEFAULT_QUANTUM_NS,
        }
    }
}

/// A free-running, monotonic cycle counter.
///
/// On a microcontroller this is a hardware timer register unaffected by
/// scheduling; on a host it is derived from a monotonic clock.
pub trait CycleCounter {
    /// Current counter value. Successive calls never decrease (modulo wrap).
    fn cycles(&self) -> u64;
}

/// Cycle counter derived from `std::time::Instant` at a nominal clock rate.
///
/// Elapsed nanoseconds are converted to cycles by rounding down, which can
/// only make a [`BusyWait`] longer.
#[derive(Debug, Clone, Copy)]
pub struct InstantCounter {
    origin: Instant,
    clock_hz: u32,
}

impl InstantCounter {
    /// Start a counter ticking at the calibration's clock rate.
    pub fn new(calibration: &Calibration) -> Self {
        Self {
            origin: Instant::now(),
            clock_hz: calibration.clock_hz(),
        }
    }
}

impl CycleCounter for InstantCounter {
    fn cycles(&self) -> u64 {
        let nanos = self.origin.elapsed().as_nanos();
        (nanos * u128::from(self.clock_hz) / 1_000_000_000) as u64
    }
}

/// Calibrated busy-wait on a cycle counter.
///
/// # Examples
///
/// ```
/// use coremem::{BusyWait, Calibration, Delay, InstantCounter};
/// use std::time::{Duration, Instant};
///
/// let cal = Calibration::default();
/// let mut delay = BusyWait::new(InstantCounter::new(&cal), cal);
///
/// let start = Instant::now();
/// delay.wait_quanta(10);
/// assert!(start.elapsed() >= Duration::from_nanos(1_000));
/// ```
#[derive(Debug, Clone)]
pub struct BusyWait<C> {
    counter: C,
    calibration: Calibration,
}

impl<C: CycleCounter> BusyWait<C> {
    /// Create a busy-wait over `counter`.
    pub fn new(counter: C, calibration: Calibration) -> Self {
        Self {
            counter,
            calibration,
        }
    }
}

impl<C: CycleCounter> Delay for BusyWait<C> {
    fn wait_quanta(&mut self, quanta: u32) {
        let cycles = self.calibration.cycles_for(quanta);
        let start = self.counter.cycles();
        while self.counter.cycles().wrapping_sub(start) < cycles {
            std::hint::spin_loop();
        }
    }
}

/// Simulated time measured in quanta.
///
/// Clones share the same clock, so a simulated backend can observe the time
/// advanced by the sequencer's waits.
///
/// # Examples
///
/// ```
/// use coremem::{Delay, VirtualClock};
///
/// let mut clock = VirtualClock::new();
/// let observer = clock.clone();
///
/// clock.wait_quanta(12);
/// assert_eq!(observer.now(), 12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now: Rc<Cell<u64>>,
}

impl VirtualClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time in quanta.
    pub fn now(&self) -> u64 {
        self.now.get()
    }
}

impl Delay for VirtualClock {
    fn wait_quanta(&mut self, quanta: u32) {
        self.now.set(self.now.get() + u64::from(quanta));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StepCounter {
        value: Cell<u64>,
        step: u64,
    }

    impl CycleCounter for StepCounter {
        fn cycles(&self) -> u64 {
            let v = self.value.get();
            self.value.set(v.wrapping_add(self.step));
            v
        }
    }

    #[test]
    fn test_default_calibration_matches_reference_ratio() {
        let cal = Calibration::default();
        assert_eq!(cal.clock_hz(), 200_000_000);
        assert_eq!(cal.quantum_ns(), 100);
        assert_eq!(cal.cycles_for(0), 0);
        assert_eq!(cal.cycles_for(2), 40);
        assert_eq!(cal.cycles_for(5), 100);
    }

    #[test]
    fn test_cycles_round_up() {
        // 125 MHz: one quantum is 12.5 cycles
        let cal = Calibration::new(125_000_000).unwrap();
        assert_eq!(cal.cycles_for(1), 13);
        assert_eq!(cal.cycles_for(2), 25);

        // Very slow clock still yields at least one cycle
        let slow = Calibration::new(1_000).unwrap();
        assert_eq!(slow.cycles_for(1), 1);
    }

    #[test]
    fn test_cycles_saturate_instead_of_wrapping() {
        let cal = Calibration::with_quantum(u32::MAX, u32::MAX).unwrap();
        assert_eq!(cal.cycles_for(u32::MAX), u64::MAX);
        assert!(cal.cycles_for(1) < u64::MAX);
    }

    #[test]
    fn test_zero_clock_rejected() {
        assert_eq!(Calibration::new(0), Err(ConfigError::ZeroClock));
        assert_eq!(
            Calibration::with_quantum(1_000_000, 0),
            Err(ConfigError::ZeroQuantum)
        );
    }

    #[test]
    fn test_busy_wait_polls_until_elapsed() {
        let counter = StepCounter {
            value: Cell::new(0),
            step: 7,
        };
        let mut delay = BusyWait::new(counter, Calibration::default());

        delay.wait_quanta(1); // 20 cycles

        // start=0, then 7, 14, 21 (>= 20) -> four reads
        assert_eq!(delay.counter.value.get(), 28);
    }

    #[test]
    fn test_busy_wait_handles_counter_wrap() {
        let counter = StepCounter {
            value: Cell::new(u64::MAX - 5),
            step: 4,
        };
        let mut delay = BusyWait::new(counter, Calibration::default());
        delay.wait_quanta(1);
        let elapsed = delay.counter.value.get().wrapping_sub(u64::MAX - 5);
        assert!(elapsed >= 20);
    }

    #[test]
    fn test_virtual_clock_is_shared() {
        let mut a = VirtualClock::new();
        let b = a.clone();
        a.wait_quanta(5);
        a.wait_quanta(5);
        assert_eq!(b.now(), 10);
    }
}
