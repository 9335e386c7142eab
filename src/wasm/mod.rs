//! WebAssembly bindings for the core memory driver.
//!
//! Exposes a simulated array to JavaScript so the read/write protocol and the
//! diagnostics can be demonstrated in a browser.

pub mod api;

pub use api::WasmCoreMemory;
