//! Recording wrapper for actuators and delays.
//!
//! [`Traced`] forwards every call to the wrapped value and appends a
//! [`TraceEvent`] to a shared [`Trace`]. Wrapping both the actuators and the
//! delay with clones of the same trace yields one ordered log of the whole
//! pulse: line changes interleaved with waits.
//!
//! ```rust
//! use coremem::{CoreBus, CoreMemory, PulseDirection, PlaneMask, SimulatedArray, Trace, TraceEvent, Traced, VirtualClock};
//!
//! let trace = Trace::new();
//! let clock = VirtualClock::new();
//! let array = SimulatedArray::with_clock(clock.clone(), Default::default());
//!
//! let mut memory = CoreMemory::new(
//!     Traced::new(array, trace.clone()),
//!     Traced::new(clock, trace.clone()),
//! );
//! memory.pulse(0x00, PulseDirection::Set, PlaneMask::BOTH, false);
//!
//! assert_eq!(trace.events()[0], TraceEvent::Address(0x00));
//! assert_eq!(trace.events()[1], TraceEvent::Wait(2));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use super::Actuators;
use crate::bridge::{Bridge, BridgeState};
use crate::timing::Delay;

/// One recorded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// Address bus written.
    Address(u8),
    /// Bridge driver changed.
    Bridge(Bridge, BridgeState),
    /// Latch reset line changed.
    LatchReset(bool),
    /// Debug line strobed.
    DebugStrobe,
    /// Sense inputs sampled, with the value read.
    Sense(u8),
    /// Wait of the given number of quanta.
    Wait(u32),
}

/// Shared, append-only event log.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Rc<RefCell<Vec<TraceEvent>>>,
}

impl Trace {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all recorded events.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.borrow().clone()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Sum of all recorded waits, in quanta.
    pub fn total_wait(&self) -> u64 {
        self.events
            .borrow()
            .iter()
            .map(|event| match event {
                TraceEvent::Wait(quanta) => u64::from(*quanta),
                _ => 0,
            })
            .sum()
    }

    fn push(&self, event: TraceEvent) {
        self.events.borrow_mut().push(event);
    }
}

/// Recording wrapper around an [`Actuators`] or [`Delay`] implementation.
#[derive(Debug, Clone)]
pub struct Traced<T> {
    inner: T,
    trace: Trace,
}

impl<T> Traced<T> {
    /// Wrap `inner`, recording into `trace`.
    pub fn new(inner: T, trace: Trace) -> Self {
        Self { inner, trace }
    }

    /// The wrapped value.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Mutable access to the wrapped value.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// The log being written.
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Unwrap.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<A: Actuators> Actuators for Traced<A> {
    fn set_bridge(&mut self, bridge: Bridge, state: BridgeState) {
        self.trace.push(TraceEvent::Bridge(bridge, state));
        self.inner.set_bridge(bridge, state);
    }

    fn set_address_bus(&mut self, address: u8) {
        self.trace.push(TraceEvent::Address(address));
        self.inner.set_address_bus(address);
    }

    fn set_latch_reset(&mut self, level: bool) {
        self.trace.push(TraceEvent::LatchReset(level));
        self.inner.set_latch_reset(level);
    }

    fn strobe_debug_event(&mut self) {
        self.trace.push(TraceEvent::DebugStrobe);
        self.inner.strobe_debug_event();
    }

    fn sample_sense(&mut self) -> u8 {
        let value = self.inner.sample_sense();
        self.trace.push(TraceEvent::Sense(value));
        value
    }
}

impl<D: Delay> Delay for Traced<D> {
    fn wait_quanta(&mut self, quanta: u32) {
        self.trace.push(TraceEvent::Wait(quanta));
        self.inner.wait_quanta(quanta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{SimConfig, SimulatedArray};
    use crate::timing::VirtualClock;

    #[test]
    fn test_events_recorded_in_order() {
        let trace = Trace::new();
        let clock = VirtualClock::new();
        let array = SimulatedArray::with_clock(clock.clone(), SimConfig::default());
        let mut actuators = Traced::new(array, trace.clone());
        let mut delay = Traced::new(clock, trace.clone());

        actuators.set_address_bus(0x21);
        delay.wait_quanta(3);
        actuators.set_bridge(Bridge::X, BridgeState::ConductDir1);
        actuators.set_latch_reset(true);
        actuators.strobe_debug_event();
        let sensed = actuators.sample_sense();

        assert_eq!(
            trace.events(),
            vec![
                TraceEvent::Address(0x21),
                TraceEvent::Wait(3),
                TraceEvent::Bridge(Bridge::X, BridgeState::ConductDir1),
                TraceEvent::LatchReset(true),
                TraceEvent::DebugStrobe,
                TraceEvent::Sense(sensed),
            ]
        );
        assert_eq!(trace.total_wait(), 3);
        assert_eq!(delay.inner().now(), 3);
        assert_eq!(actuators.inner().address_bus(), 0x21);
    }

    #[test]
    fn test_clear() {
        let trace = Trace::new();
        let mut delay = Traced::new(VirtualClock::new(), trace.clone());
        delay.wait_quanta(1);
        assert_eq!(trace.len(), 1);
        trace.clear();
        assert!(trace.is_empty());
    }
}
