//! Address encoder.
//!
//! A linear 8-bit core address carries the X coordinate in its low nibble and
//! the Y coordinate in its high nibble. Adjacent cores are wound in mirror
//! image (a checkerboard), so the encoder also derives which drive directions
//! must be inverted for the addressed core.

/// Number of cores along each axis.
pub const GRID_SIZE: u8 = 16;

/// Number of individually addressable cores.
pub const CORE_COUNT: usize = 256;

/// Result of decoding a core address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// X coordinate (0-15).
    pub x: u8,
    /// Y coordinate (0-15).
    pub y: u8,
    /// Set when `x + y` is odd: the X drive direction must be flipped.
    pub invert_x: bool,
    /// Set when `y` is even: base polarity of the inhibit drive before the
    /// pulse direction is applied.
    pub invert_inhibit_base: bool,
}

/// Split an address into coordinates and orientation flags.
///
/// # Examples
///
/// ```
/// use coremem::address::decode;
///
/// let d = decode(0x10);
/// assert_eq!((d.x, d.y), (0, 1));
/// assert!(d.invert_x);
/// assert!(!d.invert_inhibit_base);
/// ```
#[inline]
pub fn decode(address: u8) -> Decoded {
    let x = address & 0x0F;
    let y = (address >> 4) & 0x0F;

    Decoded {
        x,
        y,
        invert_x: (x + y) % 2 != 0,
        invert_inhibit_base: y % 2 == 0,
    }
}

/// Build an address from coordinates. Coordinates are masked to 4 bits.
#[inline]
pub fn from_xy(x: u8, y: u8) -> u8 {
    ((y & 0x0F) << 4) | (x & 0x0F)
}

/// All addresses in row order: Y outer, X inner.
pub fn all_addresses() -> impl Iterator<Item = u8> {
    (0..GRID_SIZE).flat_map(|y| (0..GRID_SIZE).map(move |x| from_xy(x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_checkerboard() {
        let d = decode(0x00);
        assert_eq!((d.x, d.y, d.invert_x, d.invert_inhibit_base), (0, 0, false, true));

        let d = decode(0x10);
        assert_eq!((d.x, d.y, d.invert_x, d.invert_inhibit_base), (0, 1, true, false));

        let d = decode(0x11);
        assert_eq!((d.x, d.y, d.invert_x, d.invert_inhibit_base), (1, 1, false, false));

        let d = decode(0x01);
        assert_eq!((d.x, d.y, d.invert_x, d.invert_inhibit_base), (1, 0, true, true));
    }

    #[test]
    fn test_decode_extremes() {
        let d = decode(0xFF);
        assert_eq!((d.x, d.y), (15, 15));
        assert!(!d.invert_x);
        assert!(!d.invert_inhibit_base);

        let d = decode(0xF0);
        assert_eq!((d.x, d.y), (0, 15));
        assert!(d.invert_x);
    }

    #[test]
    fn test_neighbours_alternate_orientation() {
        for addr in all_addresses() {
            let d = decode(addr);
            if d.x < 15 {
                assert_ne!(d.invert_x, decode(from_xy(d.x + 1, d.y)).invert_x);
            }
            if d.y < 15 {
                assert_ne!(d.invert_x, decode(from_xy(d.x, d.y + 1)).invert_x);
            }
        }
    }

    #[test]
    fn test_from_xy_roundtrip() {
        for addr in all_addresses() {
            let d = decode(addr);
            assert_eq!(from_xy(d.x, d.y), addr);
        }
        assert_eq!(from_xy(0x1F, 0x12), 0x2F);
    }

    #[test]
    fn test_all_addresses_row_order() {
        let addrs: Vec<u8> = all_addresses().collect();
        assert_eq!(addrs.len(), CORE_COUNT);
        assert_eq!(addrs[0], 0x00);
        assert_eq!(addrs[1], 0x01);
        assert_eq!(addrs[16], 0x10);
        assert_eq!(addrs[255], 0xFF);
    }
}
