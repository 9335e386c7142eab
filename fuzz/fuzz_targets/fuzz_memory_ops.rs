//! Fuzz target for core memory operation sequences.
//!
//! Runs arbitrary writes, reads and raw pulses against the simulated array
//! and the logic-only reference model, and checks that they agree.

#![no_main]

use arbitrary::Arbitrary;
use coremem::{CoreBus, FlatCore, PlaneMask, PulseDirection, SimulatedMemory};
use libfuzzer_sys::fuzz_target;

/// One driver operation
#[derive(Debug, Arbitrary)]
enum FuzzOp {
    /// Store a value (truncated to two bits)
    Write { address: u8, value: u8 },
    /// Destructive read with restore
    Read { address: u8 },
    /// Bare pulse
    Pulse {
        address: u8,
        set: bool,
        enable: u8,
        reset_latch: bool,
    },
}

fuzz_target!(|ops: Vec<FuzzOp>| {
    let mut sim = SimulatedMemory::simulated();
    let mut reference = FlatCore::new();

    // Bounded run length
    for op in ops.iter().take(64) {
        match *op {
            FuzzOp::Write { address, value } => {
                sim.write(address, value);
                reference.write(address, value);
            }
            FuzzOp::Read { address } => {
                assert_eq!(sim.read(address), reference.read(address));
            }
            FuzzOp::Pulse {
                address,
                set,
                enable,
                reset_latch,
            } => {
                let direction = PulseDirection::from(set);
                let enable = PlaneMask::from_bits(enable);
                sim.pulse(address, direction, enable, reset_latch);
                reference.pulse(address, direction, enable, reset_latch);
            }
        }

        assert!(sim.actuators().all_released());
    }
});
