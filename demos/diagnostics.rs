//! Diagnostics example
//!
//! Runs the bring-up routines on the simulated array and dumps the result.

use coremem::diagnostics::{self, BLOCKY, SMILEY};
use coremem::{Plane, SimulatedMemory};

fn main() {
    println!("Core Memory - Diagnostics Example");
    println!("=================================\n");

    let mut memory = SimulatedMemory::simulated();

    for address in [0x00, 0x55, 0xAA, 0xFF] {
        let failures = diagnostics::gallop_at(&mut memory, address, 0b00, 0b11);
        println!("Gallop at 0x{:02X}: {} failures", address, failures);
    }

    let failures =
        diagnostics::half_current_stress_at(&mut memory, 0x77, diagnostics::HALF_CURRENT_REPETITIONS);
    println!(
        "Half-current stress at 0x77 ({} pulses): {} failures\n",
        diagnostics::HALF_CURRENT_REPETITIONS,
        failures
    );

    let failures = diagnostics::image_test_with(&mut memory, 1, 4);
    println!("Image test (1 pass, 4 redraws): {} failures", failures);
    print!("{}", diagnostics::snapshot(&mut memory));
    println!();

    diagnostics::write_image(&mut memory, &SMILEY, Plane::Zero);
    diagnostics::write_image(&mut memory, &BLOCKY, Plane::One);

    let smiley = diagnostics::compare_image(&mut memory, &SMILEY, Plane::Zero);
    let blocky = diagnostics::compare_image(&mut memory, &BLOCKY, Plane::One);
    for mismatch in smiley.iter().chain(&blocky) {
        println!("Mismatch: {}", mismatch);
    }

    println!("Memory contents:");
    print!("{}", diagnostics::snapshot(&mut memory));
    println!("End of memory contents");
}
