//! WASM API for the simulated core memory.
//!
//! Provides JavaScript-callable read, write, dump and diagnostics over a
//! [`SimulatedMemory`].

use wasm_bindgen::prelude::*;

use crate::bridge::Plane;
use crate::diagnostics::{self, BLOCKY, SMILEY};
use crate::{CoreBus, SimulatedMemory};

/// Simulated 16x16x2 core memory for JavaScript
#[wasm_bindgen]
pub struct WasmCoreMemory {
    memory: SimulatedMemory,
}

#[wasm_bindgen]
impl WasmCoreMemory {
    /// Create a cleared simulated array
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        WasmCoreMemory {
            memory: SimulatedMemory::simulated(),
        }
    }

    /// Call `on_strobe` each time the debug line is strobed
    pub fn set_strobe_callback(&mut self, on_strobe: js_sys::Function) {
        self.memory.actuators_mut().set_strobe_callback(move || {
            let _ = on_strobe.call0(&JsValue::NULL);
        });
    }

    /// Store the low two bits of `value`
    pub fn write(&mut self, address: u8, value: u8) {
        self.memory.write(address, value);
    }

    /// Read (and restore) a cell
    pub fn read(&mut self, address: u8) -> u8 {
        self.memory.read(address)
    }

    /// All 256 cells in address order
    pub fn cells(&mut self) -> Vec<u8> {
        diagnostics::snapshot(&mut self.memory).cells().to_vec()
    }

    /// Text rendering of both planes
    pub fn dump(&mut self) -> String {
        diagnostics::snapshot(&mut self.memory).to_string()
    }

    /// Galloping test at one address; returns the failure count
    pub fn gallop_at(&mut self, address: u8, background: u8, pattern: u8) -> usize {
        diagnostics::gallop_at(&mut self.memory, address, background, pattern)
    }

    /// Galloping test over the whole array; returns the failure count
    pub fn gallop(&mut self, background: u8, pattern: u8) -> usize {
        diagnostics::gallop(&mut self.memory, background, pattern)
    }

    /// Draw the smiley into plane 0 and the blocks into plane 1
    pub fn draw_test_images(&mut self) {
        diagnostics::write_image(&mut self.memory, &SMILEY, Plane::Zero);
        diagnostics::write_image(&mut self.memory, &BLOCKY, Plane::One);
    }

    /// Number of pulses issued since creation
    #[wasm_bindgen(getter)]
    pub fn pulse_count(&self) -> u64 {
        self.memory.pulse_count()
    }

    /// Elapsed simulated time in quanta
    #[wasm_bindgen(getter)]
    pub fn elapsed_quanta(&self) -> u64 {
        self.memory.actuators().clock().now()
    }
}

impl Default for WasmCoreMemory {
    fn default() -> Self {
        Self::new()
    }
}
