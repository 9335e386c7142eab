//! Protocol trace example
//!
//! Records the exact line and timing sequence of a write and a read.

use coremem::{
    CoreBus, CoreMemory, SimConfig, SimulatedArray, Trace, TraceEvent, Traced, VirtualClock,
};

fn print_trace(title: &str, trace: &Trace) {
    println!("{}", title);
    let mut elapsed = 0u64;
    for event in trace.events() {
        match event {
            TraceEvent::Wait(quanta) => {
                elapsed += u64::from(quanta);
                println!("  {:>4} q   wait {}", elapsed, quanta);
            }
            TraceEvent::Address(address) => println!("  {:>4} q   address 0x{:02X}", elapsed, address),
            TraceEvent::Bridge(bridge, state) => {
                println!("  {:>4} q   {:<4} -> {:?}", elapsed, bridge, state)
            }
            TraceEvent::LatchReset(level) => {
                println!("  {:>4} q   latch reset {}", elapsed, if level { "high" } else { "low" })
            }
            TraceEvent::DebugStrobe => println!("  {:>4} q   debug strobe", elapsed),
            TraceEvent::Sense(value) => println!("  {:>4} q   sense {:02b}", elapsed, value),
        }
    }
    println!();
}

fn main() {
    println!("Core Memory - Protocol Trace Example");
    println!("====================================\n");

    let trace = Trace::new();
    let clock = VirtualClock::new();
    let array = SimulatedArray::with_clock(clock.clone(), SimConfig::default());
    let mut memory = CoreMemory::new(
        Traced::new(array, trace.clone()),
        Traced::new(clock, trace.clone()),
    );

    memory.write(0x12, 0b10);
    print_trace("write(0x12, 0b10):", &trace);

    trace.clear();
    let value = memory.read(0x12);
    print_trace(&format!("read(0x12) = {:02b}:", value), &trace);
}
