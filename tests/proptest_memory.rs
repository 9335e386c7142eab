//! Property-based tests for the core memory driver.
//!
//! The simulated array is checked against the logic-only `FlatCore` model for
//! arbitrary operation sequences, and the address encoder and bridge encoding
//! are checked over their whole input space.

use coremem::address::{decode, from_xy};
use coremem::{BridgeState, CoreBus, FlatCore, PlaneMask, PulseDirection, SimulatedMemory};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Write(u8, u8),
    Read(u8),
    Pulse(u8, bool, u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<u8>(), any::<u8>()).prop_map(|(a, v)| Op::Write(a, v)),
        any::<u8>().prop_map(Op::Read),
        (any::<u8>(), any::<bool>(), 0u8..4).prop_map(|(a, s, m)| Op::Pulse(a, s, m)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the simulated array behaves like the ideal model
    #[test]
    fn prop_simulator_matches_reference(ops in prop::collection::vec(op(), 1..40)) {
        let mut sim = SimulatedMemory::simulated();
        let mut flat = FlatCore::new();

        for op in &ops {
            match *op {
                Op::Write(a, v) => {
                    sim.write(a, v);
                    flat.write(a, v);
                }
                Op::Read(a) => {
                    prop_assert_eq!(sim.read(a), flat.read(a), "read 0x{:02X}", a);
                }
                Op::Pulse(a, set, mask) => {
                    let direction = PulseDirection::from(set);
                    sim.pulse(a, direction, PlaneMask::from_bits(mask), false);
                    flat.pulse(a, direction, PlaneMask::from_bits(mask), false);
                }
            }
            prop_assert!(sim.actuators().all_released());
        }

        for (a, _) in ops.iter().filter_map(|op| match *op {
            Op::Write(a, v) => Some((a, v)),
            _ => None,
        }) {
            prop_assert_eq!(sim.actuators().value(a), flat.peek(a));
        }
    }

    /// Property: write then two reads return the written value
    #[test]
    fn prop_restore_idempotence(address in any::<u8>(), value in any::<u8>()) {
        let mut memory = SimulatedMemory::simulated();
        memory.write(address, value);
        prop_assert_eq!(memory.read(address), value & 0b11);
        prop_assert_eq!(memory.read(address), value & 0b11);
    }

    /// Property: writing one address never changes another
    #[test]
    fn prop_isolation(a in any::<u8>(), b in any::<u8>(), va in 0u8..4, vb in 0u8..4) {
        prop_assume!(a != b);
        let mut memory = SimulatedMemory::simulated();

        memory.write(a, va);
        memory.write(b, vb);

        prop_assert_eq!(memory.read(a), va);
        prop_assert_eq!(memory.read(b), vb);
    }

    /// Property: decode and from_xy are inverse
    #[test]
    fn prop_decode_round_trip(address in any::<u8>()) {
        let d = decode(address);
        prop_assert!(d.x < 16 && d.y < 16);
        prop_assert_eq!(from_xy(d.x, d.y), address);
        prop_assert_eq!(d.invert_x, (d.x + d.y) % 2 == 1);
        prop_assert_eq!(d.invert_inhibit_base, d.y % 2 == 0);
    }

    /// Property: bridge encoding survives the 2-bit field
    #[test]
    fn prop_bridge_bits(bits in any::<u8>()) {
        let state = BridgeState::from_bits(bits);
        prop_assert_eq!(state.bits(), bits & 0b11);
        prop_assert_eq!(state.is_conducting(), bits & 0b01 != 0);
    }
}
