//! Integration tests for the GPIO backend.
//!
//! A recording port captures every masked write so tests can check which
//! lines each step of a pulse touched, and a stepping counter stands in for
//! the hardware timer.

use std::cell::Cell;

use coremem::{
    Bridge, BusyWait, Calibration, ConfigError, CoreBus, CoreConfig, CoreMemory, CycleCounter,
    GpioActuators, GpioPort, PinMap,
};

/// Port that keeps a log of `(mask, value)` writes and serves fixed inputs.
#[derive(Default)]
struct RecordingPort {
    outputs: u32,
    inputs: u32,
    writes: Vec<(u32, u32)>,
}

impl GpioPort for RecordingPort {
    fn put_masked(&mut self, mask: u32, value: u32) {
        self.outputs = (self.outputs & !mask) | (value & mask);
        self.writes.push((mask, value & mask));
    }

    fn get(&self, pin: u8) -> bool {
        self.inputs & (1 << pin) != 0
    }
}

/// Advances by a fixed step every time it is read.
struct SteppingCounter {
    now: Cell<u64>,
    step: u64,
    reads: Cell<u64>,
}

impl SteppingCounter {
    fn new(step: u64) -> Self {
        Self {
            now: Cell::new(0),
            step,
            reads: Cell::new(0),
        }
    }
}

impl CycleCounter for &SteppingCounter {
    fn cycles(&self) -> u64 {
        self.reads.set(self.reads.get() + 1);
        let now = self.now.get().wrapping_add(self.step);
        self.now.set(now);
        now
    }
}

fn allowed_masks(pins: &PinMap) -> Vec<u32> {
    let mut masks: Vec<u32> = Bridge::ALL.iter().map(|&b| pins.bridge_mask(b)).collect();
    masks.push(pins.address_mask());
    masks.push(1 << pins.sense_reset);
    masks.push(1 << pins.debug_event);
    masks
}

#[test]
fn test_every_write_touches_one_signal() {
    let counter = SteppingCounter::new(1_000);
    let config = CoreConfig::default();
    let mut memory = CoreMemory::from_config(RecordingPort::default(), &counter, &config).unwrap();

    memory.write(0x5A, 0b01);
    memory.read(0x5A);
    memory.strobe_debug_event();

    let allowed = allowed_masks(&config.pins);
    let port = memory.actuators().port();
    assert!(!port.writes.is_empty());
    for (mask, _) in &port.writes {
        assert!(allowed.contains(mask), "unexpected mask {:#010x}", mask);
    }
}

#[test]
fn test_sense_inputs_feed_read() {
    let counter = SteppingCounter::new(1_000);
    let config = CoreConfig::default();
    let port = RecordingPort {
        inputs: 1 << config.pins.sense1,
        ..RecordingPort::default()
    };
    let mut memory = CoreMemory::from_config(port, &counter, &config).unwrap();

    // Sense1 held high reads as plane 1 set
    assert_eq!(memory.read(0x00), 0b10);

    // The restore pulse inhibits plane 0 only
    let pins = config.pins;
    let inhibit0_on = memory
        .actuators()
        .port()
        .writes
        .iter()
        .filter(|(mask, value)| *mask == pins.bridge_mask(Bridge::Inhibit0) && value & (1 << pins.inhibit0_enable) != 0)
        .count();
    let inhibit1_on = memory
        .actuators()
        .port()
        .writes
        .iter()
        .filter(|(mask, value)| *mask == pins.bridge_mask(Bridge::Inhibit1) && value & (1 << pins.inhibit1_enable) != 0)
        .count();
    assert_eq!((inhibit0_on, inhibit1_on), (1, 0));
}

#[test]
fn test_busy_wait_honours_calibration() {
    // 200 MHz, 100 ns: 20 cycles per quantum
    let counter = SteppingCounter::new(1);
    let mut delay = BusyWait::new(&counter, Calibration::default());

    coremem::Delay::wait_quanta(&mut delay, 10);
    // One read for the start, then until 200 cycles have elapsed
    assert_eq!(counter.now.get(), 201);
    assert_eq!(counter.reads.get(), 201);
}

#[test]
fn test_slower_clock_needs_fewer_cycles() {
    let counter = SteppingCounter::new(1);
    let mut delay = BusyWait::new(&counter, Calibration::new(10_000_000).unwrap());

    coremem::Delay::wait_quanta(&mut delay, 10);
    // 1 cycle per quantum
    assert_eq!(counter.now.get(), 11);
}

#[test]
fn test_bad_config_rejected() {
    let counter = SteppingCounter::new(1);
    let pins = PinMap {
        address_base: 26,
        ..PinMap::default()
    };
    let result = GpioActuators::new(RecordingPort::default(), pins);
    assert!(matches!(result, Err(ConfigError::PinOutOfRange { .. })));

    assert!(matches!(Calibration::new(0), Err(ConfigError::ZeroClock)));

    let config = CoreConfig {
        pins,
        ..CoreConfig::default()
    };
    assert!(CoreMemory::from_config(RecordingPort::default(), &counter, &config).is_err());
}
