//! # Bridge Drivers
//!
//! Each of the four drivers (X select, Y select, two inhibits) is a MOSFET
//! H-bridge controlled by two lines: an enable line and a direction line.
//! The pair forms a 2-bit field, written together in one bus operation.
//!
//! ## Encoding
//!
//! | Bits | Variant | Effect |
//! |------|---------|--------|
//! | `00` | [`BridgeState::NoConductAlt`] | Off (all pins low, power-on state) |
//! | `01` | [`BridgeState::ConductDir2`] | Current flows in direction 2 |
//! | `10` | [`BridgeState::NoConduct`] | Off (used to release a driver) |
//! | `11` | [`BridgeState::ConductDir1`] | Current flows in direction 1 |
//!
//! Bit 0 is the enable line, bit 1 the direction line.

use std::fmt;

/// Conduction state of one bridge driver.
///
/// Two encodings are physically inert; both are kept so the 2-bit field can
/// be round-tripped exactly.
///
/// # Examples
///
/// ```
/// use coremem::BridgeState;
///
/// assert_eq!(BridgeState::ConductDir1.bits(), 0b11);
/// assert_eq!(BridgeState::from_bits(0b00), BridgeState::NoConductAlt);
/// assert!(!BridgeState::NoConductAlt.is_conducting());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BridgeState {
    /// Off, both lines low.
    NoConductAlt = 0b00,
    /// Conducting in direction 2.
    ConductDir2 = 0b01,
    /// Off, direction line high.
    NoConduct = 0b10,
    /// Conducting in direction 1.
    ConductDir1 = 0b11,
}

impl BridgeState {
    /// Decode a 2-bit field. Bits above bit 1 are ignored.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => BridgeState::NoConductAlt,
            0b01 => BridgeState::ConductDir2,
            0b10 => BridgeState::NoConduct,
            _ => BridgeState::ConductDir1,
        }
    }

    /// The raw 2-bit field.
    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// True when the enable line is asserted.
    #[inline]
    pub fn is_conducting(self) -> bool {
        self.bits() & 0b01 != 0
    }

    /// Signed current through the bridge: +1 for direction 1, -1 for
    /// direction 2, 0 when off.
    #[inline]
    pub fn current(self) -> i8 {
        match self {
            BridgeState::ConductDir1 => 1,
            BridgeState::ConductDir2 => -1,
            BridgeState::NoConduct | BridgeState::NoConductAlt => 0,
        }
    }

    /// Pick direction 2 when `flag` is set, direction 1 otherwise.
    #[inline]
    pub(crate) fn conduct_dir2_if(flag: bool) -> Self {
        if flag {
            BridgeState::ConductDir2
        } else {
            BridgeState::ConductDir1
        }
    }
}

impl Default for BridgeState {
    fn default() -> Self {
        BridgeState::NoConductAlt
    }
}

/// One of the four bridge drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bridge {
    /// X select driver.
    X,
    /// Y select driver.
    Y,
    /// Inhibit driver for bit-plane 0.
    Inhibit0,
    /// Inhibit driver for bit-plane 1.
    Inhibit1,
}

impl Bridge {
    /// All drivers, in a fixed order usable as an index.
    pub const ALL: [Bridge; 4] = [Bridge::X, Bridge::Y, Bridge::Inhibit0, Bridge::Inhibit1];

    /// Index into [`Bridge::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Bridge::X => 0,
            Bridge::Y => 1,
            Bridge::Inhibit0 => 2,
            Bridge::Inhibit1 => 3,
        }
    }

    /// The inhibit driver for a bit-plane.
    #[inline]
    pub fn inhibit(plane: Plane) -> Self {
        match plane {
            Plane::Zero => Bridge::Inhibit0,
            Plane::One => Bridge::Inhibit1,
        }
    }
}

impl fmt::Display for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Bridge::X => "X",
            Bridge::Y => "Y",
            Bridge::Inhibit0 => "IHB0",
            Bridge::Inhibit1 => "IHB1",
        };
        f.pad(name)
    }
}

/// One of the two bit-planes threaded through every core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    /// Bit 0 of a stored value.
    Zero,
    /// Bit 1 of a stored value.
    One,
}

impl Plane {
    /// Both planes, bit 0 first.
    pub const ALL: [Plane; 2] = [Plane::Zero, Plane::One];

    /// Bit position of this plane within a 2-bit value.
    #[inline]
    pub fn bit(self) -> u8 {
        match self {
            Plane::Zero => 0b01,
            Plane::One => 0b10,
        }
    }

    /// Index (0 or 1).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Plane::Zero => 0,
            Plane::One => 1,
        }
    }
}
