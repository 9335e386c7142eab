//! GPIO backend.
//!
//! Maps the actuator interface onto a single 32-bit GPIO bank using the pin
//! layout in [`PinMap`]. Multi-line fields are written with one masked
//! operation so the lines change together.

use super::Actuators;
use crate::bridge::{Bridge, BridgeState};
use crate::config::{ConfigError, PinMap};

/// A 32-bit bank of GPIO lines.
///
/// On a microcontroller this wraps the SIO set/clear/xor registers; for tests
/// [`PortImage`] keeps the output value in memory.
pub trait GpioPort {
    /// Drive the pins selected by `mask` to the matching bits of `value` in
    /// one operation. Pins outside `mask` keep their level.
    fn put_masked(&mut self, mask: u32, value: u32);

    /// Level of an input pin.
    fn get(&self, pin: u8) -> bool;

    /// Drive a single pin.
    fn put(&mut self, pin: u8, level: bool) {
        self.put_masked(1 << pin, u32::from(level) << pin);
    }
}

/// In-memory GPIO bank.
///
/// Output writes update `outputs`; `get` reads from `inputs`, which tests set
/// directly. Every masked write is counted so tests can check that a bridge
/// change really was a single bus operation.
///
/// # Examples
///
/// ```
/// use coremem::{GpioPort, PortImage};
///
/// let mut port = PortImage::new();
/// port.put_masked(0b0110, 0b1111);
/// assert_eq!(port.outputs(), 0b0110);
/// assert_eq!(port.write_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortImage {
    outputs: u32,
    inputs: u32,
    writes: usize,
}

impl PortImage {
    /// All outputs low, all inputs low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current output levels.
    pub fn outputs(&self) -> u32 {
        self.outputs
    }

    /// Set the level of an input pin.
    pub fn set_input(&mut self, pin: u8, level: bool) {
        if level {
            self.inputs |= 1 << pin;
        } else {
            self.inputs &= !(1 << pin);
        }
    }

    /// Number of masked writes issued so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl GpioPort for PortImage {
    fn put_masked(&mut self, mask: u32, value: u32) {
        self.outputs = (self.outputs & !mask) | (value & mask);
        self.writes += 1;
    }

    fn get(&self, pin: u8) -> bool {
        self.inputs & (1 << pin) != 0
    }
}

/// Actuators driven through a GPIO bank.
///
/// # Examples
///
/// ```
/// use coremem::{Actuators, Bridge, BridgeState, GpioActuators, PinMap, PortImage};
///
/// let mut gpio = GpioActuators::new(PortImage::new(), PinMap::default()).unwrap();
/// gpio.set_bridge(Bridge::X, BridgeState::ConductDir1);
///
/// // X enable (13) and direction (14) both high
/// assert_eq!(gpio.port().outputs(), 0b11 << 13);
/// ```
#[derive(Debug, Clone)]
pub struct GpioActuators<P> {
    port: P,
    pins: PinMap,
}

impl<P: GpioPort> GpioActuators<P> {
    /// Wrap `port` after validating the pin layout.
    pub fn new(port: P, pins: PinMap) -> Result<Self, ConfigError> {
        pins.validate()?;
        Ok(Self { port, pins })
    }

    /// The pin layout in use.
    pub fn pins(&self) -> &PinMap {
        &self.pins
    }

    /// The underlying port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Mutable access to the underlying port.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}

impl<P: GpioPort> Actuators for GpioActuators<P> {
    fn set_bridge(&mut self, bridge: Bridge, state: BridgeState) {
        let shift = self.pins.bridge_enable(bridge);
        self.port
            .put_masked(self.pins.bridge_mask(bridge), u32::from(state.bits()) << shift);
    }

    fn set_address_bus(&mut self, address: u8) {
        self.port.put_masked(
            self.pins.address_mask(),
            u32::from(address) << self.pins.address_base,
        );
    }

    fn set_latch_reset(&mut self, level: bool) {
        self.port.put(self.pins.sense_reset, level);
    }

    fn strobe_debug_event(&mut self) {
        self.port.put(self.pins.debug_event, true);
        self.port.put(self.pins.debug_event, false);
    }

    fn sample_sense(&mut self) -> u8 {
        (u8::from(self.port.get(self.pins.sense1)) << 1) | u8::from(self.port.get(self.pins.sense0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actuators() -> GpioActuators<PortImage> {
        GpioActuators::new(PortImage::new(), PinMap::default()).unwrap()
    }

    #[test]
    fn test_bridge_write_is_single_masked_operation() {
        let mut gpio = actuators();
        gpio.set_bridge(Bridge::Y, BridgeState::ConductDir2);

        assert_eq!(gpio.port().write_count(), 1);
        // Enable (15) high, direction (16) low
        assert_eq!(gpio.port().outputs(), 1 << 15);

        gpio.set_bridge(Bridge::Y, BridgeState::NoConduct);
        assert_eq!(gpio.port().write_count(), 2);
        assert_eq!(gpio.port().outputs(), 1 << 16);
    }

    #[test]
    fn test_bridges_do_not_disturb_each_other() {
        let mut gpio = actuators();
        gpio.set_bridge(Bridge::Inhibit0, BridgeState::ConductDir1);
        gpio.set_bridge(Bridge::Inhibit1, BridgeState::ConductDir2);
        gpio.set_bridge(Bridge::X, BridgeState::NoConduct);

        assert_eq!(gpio.port().outputs(), 0b11 | 0b0100 | (0b10 << 13));

        gpio.set_bridge(Bridge::Inhibit0, BridgeState::NoConductAlt);
        assert_eq!(gpio.port().outputs(), 0b0100 | (0b10 << 13));
    }

    #[test]
    fn test_address_bus() {
        let mut gpio = actuators();
        gpio.set_bridge(Bridge::X, BridgeState::ConductDir1);
        gpio.set_address_bus(0xA5);

        assert_eq!(gpio.port().outputs() & gpio.pins().address_mask(), 0xA5 << 5);
        // X driver untouched
        assert_eq!(gpio.port().outputs() & (0b11 << 13), 0b11 << 13);

        gpio.set_address_bus(0x00);
        assert_eq!(gpio.port().outputs(), 0b11 << 13);
    }

    #[test]
    fn test_latch_and_debug_lines() {
        let mut gpio = actuators();
        gpio.set_latch_reset(true);
        assert_eq!(gpio.port().outputs(), 1 << 4);

        gpio.strobe_debug_event();
        // Strobe returns low, latch unaffected
        assert_eq!(gpio.port().outputs(), 1 << 4);
        assert_eq!(gpio.port().write_count(), 3);

        gpio.set_latch_reset(false);
        assert_eq!(gpio.port().outputs(), 0);
    }

    #[test]
    fn test_sample_sense() {
        let mut gpio = actuators();
        assert_eq!(gpio.sample_sense(), 0b00);

        gpio.port_mut().set_input(18, true);
        assert_eq!(gpio.sample_sense(), 0b01);

        gpio.port_mut().set_input(19, true);
        assert_eq!(gpio.sample_sense(), 0b11);

        gpio.port_mut().set_input(18, false);
        assert_eq!(gpio.sample_sense(), 0b10);
    }

    #[test]
    fn test_invalid_pin_map_rejected() {
        let pins = PinMap {
            sense1: 18,
            ..PinMap::default()
        };
        assert!(GpioActuators::new(PortImage::new(), pins).is_err());
    }
}
