//! Simulated memory example
//!
//! Stores and reads back values on the simulated 16x16x2 core array.
//!
//! This example shows:
//! - Creating a simulated memory
//! - Writing and reading 2-bit cells
//! - Observing that reads restore what they destroy
//! - Inspecting simulated time and pulse counts

use coremem::{CoreBus, Plane, SimulatedMemory};

fn main() {
    println!("Core Memory - Simulated Array Example");
    println!("=====================================\n");

    let mut memory = SimulatedMemory::simulated();

    let cells = [(0x00, 0b01), (0x11, 0b10), (0x7E, 0b11), (0xFF, 0b01)];
    for (address, value) in cells {
        memory.write(address, value);
        println!("Wrote {:02b} to 0x{:02X}", value, address);
    }
    println!();

    for (address, _) in cells {
        let first = memory.read(address);
        let second = memory.read(address);
        let array = memory.actuators();
        println!(
            "0x{:02X}: read {:02b}, again {:02b} (plane 0 = {}, plane 1 = {})",
            address,
            first,
            second,
            array.core(address, Plane::Zero),
            array.core(address, Plane::One)
        );
    }

    println!();
    println!("Pulses issued:   {}", memory.pulse_count());
    println!("Cores switched:  {}", memory.actuators().switch_count());
    println!(
        "Simulated time:  {} quanta ({} us)",
        memory.actuators().clock().now(),
        memory.actuators().clock().now() / 10
    );
}
