//! Pin assignment and clock configuration.
//!
//! The driver assumes an upstream setup step has already configured every
//! actuator line as an output (low) and both sense lines as inputs. This
//! module only describes *which* lines those are and validates the layout
//! the driver depends on:
//!
//! - each bridge uses two adjacent pins, enable first, direction second
//! - the address bus is eight consecutive pins, X nibble first
//! - every pin fits in a 32-bit GPIO bank and no pin is used twice

use thiserror::Error;
use tracing::{event, Level};

use crate::bridge::Bridge;
use crate::timing::Calibration;

/// Number of pins in one GPIO bank.
pub const BANK_WIDTH: u8 = 32;

/// Errors produced while validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A pin number does not fit in the GPIO bank.
    #[error("{signal} uses pin {pin}, outside the 32-pin bank")]
    PinOutOfRange {
        /// Signal name
        signal: &'static str,
        /// Highest pin the signal occupies
        pin: u8,
    },

    /// Two signals claim the same pin.
    #[error("pin {pin} is assigned to both {first} and {second}")]
    PinConflict {
        /// Conflicting pin
        pin: u8,
        /// Signal registered first
        first: &'static str,
        /// Signal registered second
        second: &'static str,
    },

    /// Clock rate of zero cannot be calibrated.
    #[error("processor clock rate must be non-zero")]
    ZeroClock,

    /// Quantum of zero length.
    #[error("timing quantum must be non-zero")]
    ZeroQuantum,
}

/// GPIO pin assignment.
///
/// Bridge entries name the *enable* pin; the direction pin is always the
/// next one up. `address_base` is the pin carrying address bit 0 (X0); the
/// bus occupies `address_base..address_base + 8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinMap {
    pub inhibit0_enable: u8,
    pub inhibit1_enable: u8,
    pub sense_reset: u8,
    pub address_base: u8,
    pub x_enable: u8,
    pub y_enable: u8,
    pub debug_event: u8,
    pub sense0: u8,
    pub sense1: u8,
}

impl Default for PinMap {
    /// Layout of the reference board.
    fn default() -> Self {
        Self {
            inhibit0_enable: 0,
            inhibit1_enable: 2,
            sense_reset: 4,
            address_base: 5,
            x_enable: 13,
            y_enable: 15,
            debug_event: 17,
            sense0: 18,
            sense1: 19,
        }
    }
}

impl PinMap {
    /// Enable pin of a bridge driver.
    pub fn bridge_enable(&self, bridge: Bridge) -> u8 {
        match bridge {
            Bridge::X => self.x_enable,
            Bridge::Y => self.y_enable,
            Bridge::Inhibit0 => self.inhibit0_enable,
            Bridge::Inhibit1 => self.inhibit1_enable,
        }
    }

    /// Mask covering a bridge's enable and direction pins.
    pub fn bridge_mask(&self, bridge: Bridge) -> u32 {
        0b11 << self.bridge_enable(bridge)
    }

    /// Mask covering the eight address bus pins.
    pub fn address_mask(&self) -> u32 {
        0xFF << self.address_base
    }

    /// Check range and overlap of every assignment.
    ///
    /// # Examples
    ///
    /// ```
    /// use coremem::{ConfigError, PinMap};
    ///
    /// assert!(PinMap::default().validate().is_ok());
    ///
    /// let clash = PinMap { debug_event: 4, ..PinMap::default() };
    /// assert!(matches!(clash.validate(), Err(ConfigError::PinConflict { pin: 4, .. })));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let signals: [(&'static str, u8, u8); 9] = [
            ("IHB0", self.inhibit0_enable, 2),
            ("IHB1", self.inhibit1_enable, 2),
            ("SENSE_RST", self.sense_reset, 1),
            ("ADDR", self.address_base, 8),
            ("X", self.x_enable, 2),
            ("Y", self.y_enable, 2),
            ("DEBUG_EVENT", self.debug_event, 1),
            ("SENSE0", self.sense0, 1),
            ("SENSE1", self.sense1, 1),
        ];

        let mut owners: [Option<&'static str>; BANK_WIDTH as usize] = [None; BANK_WIDTH as usize];

        for (signal, first, width) in signals {
            let last = u16::from(first) + u16::from(width) - 1;
            if last >= u16::from(BANK_WIDTH) {
                return Err(ConfigError::PinOutOfRange {
                    signal,
                    pin: last.min(u16::from(u8::MAX)) as u8,
                });
            }
            for pin in first..first + width {
                match owners[pin as usize] {
                    Some(existing) => {
                        return Err(ConfigError::PinConflict {
                            pin,
                            first: existing,
                            second: signal,
                        })
                    }
                    None => owners[pin as usize] = Some(signal),
                }
            }
        }

        event!(Level::DEBUG, pins = ?self, "pin map validated");
        Ok(())
    }
}

/// Complete driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoreConfig {
    pub pins: PinMap,
    pub calibration: Calibration,
}

impl CoreConfig {
    /// Reference pin layout with a custom processor clock.
    pub fn with_clock(clock_hz: u32) -> Result<Self, ConfigError> {
        Ok(Self {
            pins: PinMap::default(),
            calibration: Calibration::new(clock_hz)?,
        })
    }

    /// Validate the whole configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pins.validate()?;
        // Deserialized calibrations bypass the constructor checks
        Calibration::with_quantum(self.calibration.clock_hz(), self.calibration.quantum_ns())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let pins = PinMap::default();
        assert!(pins.validate().is_ok());
        assert_eq!(pins.bridge_mask(Bridge::X), (1 << 13) | (1 << 14));
        assert_eq!(pins.bridge_mask(Bridge::Y), (1 << 15) | (1 << 16));
        assert_eq!(pins.bridge_mask(Bridge::Inhibit0), 0b11);
        assert_eq!(pins.bridge_mask(Bridge::Inhibit1), 0b1100);
        assert_eq!(pins.address_mask(), 0xFF << 5);
    }

    #[test]
    fn test_direction_pin_overlap_detected() {
        // IHB1 enable on IHB0's direction pin
        let pins = PinMap {
            inhibit1_enable: 1,
            ..PinMap::default()
        };
        assert_eq!(
            pins.validate(),
            Err(ConfigError::PinConflict {
                pin: 1,
                first: "IHB0",
                second: "IHB1",
            })
        );
    }

    #[test]
    fn test_address_bus_overlap_detected() {
        let pins = PinMap {
            sense0: 9,
            ..PinMap::default()
        };
        assert!(matches!(
            pins.validate(),
            Err(ConfigError::PinConflict { pin: 9, .. })
        ));
    }

    #[test]
    fn test_out_of_range() {
        let pins = PinMap {
            address_base: 25,
            x_enable: 20,
            y_enable: 22,
            ..PinMap::default()
        };
        assert_eq!(
            pins.validate(),
            Err(ConfigError::PinOutOfRange {
                signal: "ADDR",
                pin: 32
            })
        );

        let pins = PinMap {
            sense1: 31,
            y_enable: 31,
            ..PinMap::default()
        };
        assert!(matches!(
            pins.validate(),
            Err(ConfigError::PinOutOfRange { signal: "Y", .. })
        ));
    }

    #[test]
    fn test_core_config() {
        let config = CoreConfig::with_clock(125_000_000).unwrap();
        assert_eq!(config.calibration.clock_hz(), 125_000_000);
        assert!(config.validate().is_ok());
        assert_eq!(CoreConfig::with_clock(0), Err(ConfigError::ZeroClock));
    }

    #[test]
    fn test_error_messages() {
        let err = ConfigError::PinConflict {
            pin: 3,
            first: "IHB1",
            second: "SENSE0",
        };
        assert_eq!(err.to_string(), "pin 3 is assigned to both IHB1 and SENSE0");
        assert_eq!(
            ConfigError::ZeroClock.to_string(),
            "processor clock rate must be non-zero"
        );
    }
}
