//! Captured memory contents.

use std::fmt;

use super::patterns::Bitmap;
use crate::address::{decode, from_xy, CORE_COUNT, GRID_SIZE};
use crate::bridge::Plane;

/// Contents of all 256 cells, indexed by address.
///
/// `Display` draws the grid one Y row per line: plane 0 on the left, plane 1
/// on the right, `#` for a one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryImage {
    cells: [u8; CORE_COUNT],
}

impl MemoryImage {
    /// Wrap raw cell values; each is masked to two bits.
    pub fn from_cells(mut cells: [u8; CORE_COUNT]) -> Self {
        for cell in cells.iter_mut() {
            *cell &= 0b11;
        }
        Self { cells }
    }

    /// Value at `address`.
    pub fn get(&self, address: u8) -> u8 {
        self.cells[address as usize]
    }

    /// Value at column `x`, row `y`.
    pub fn get_xy(&self, x: u8, y: u8) -> u8 {
        self.get(from_xy(x, y))
    }

    /// All cell values in address order.
    pub fn cells(&self) -> &[u8; CORE_COUNT] {
        &self.cells
    }

    /// One plane as a bitmap.
    pub fn plane(&self, plane: Plane) -> Bitmap {
        let mut bitmap = [0u16; GRID_SIZE as usize];
        for (address, cell) in self.cells.iter().enumerate() {
            if cell & plane.bit() != 0 {
                let decoded = decode(address as u8);
                bitmap[decoded.y as usize] |= 0x8000 >> decoded.x;
            }
        }
        bitmap
    }

    /// Number of cores holding a one, over both planes.
    pub fn ones(&self) -> u32 {
        self.cells.iter().map(|c| c.count_ones()).sum()
    }
}

impl fmt::Display for MemoryImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..GRID_SIZE {
            for plane in Plane::ALL {
                for x in 0..GRID_SIZE {
                    let mark = if self.get_xy(x, y) & plane.bit() != 0 { '#' } else { ' ' };
                    write!(f, "{} ", mark)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_layout() {
        let mut cells = [0u8; CORE_COUNT];
        cells[0x00] = 0b01;
        cells[0x0F] = 0b10;
        let image = MemoryImage::from_cells(cells);

        let text = image.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 16);
        assert_eq!(lines[0].len(), 64);
        // Plane 0, column 0
        assert_eq!(&lines[0][0..2], "# ");
        // Plane 1, column 15 is the last pair
        assert_eq!(&lines[0][62..64], "# ");
        assert_eq!(lines[0].matches('#').count(), 2);
        assert!(lines[1..].iter().all(|l| !l.contains('#')));
    }

    #[test]
    fn test_plane_bitmap() {
        let mut cells = [0u8; CORE_COUNT];
        cells[from_xy(3, 7) as usize] = 0b11;
        cells[from_xy(0, 0) as usize] = 0xFE;
        let image = MemoryImage::from_cells(cells);

        let plane0 = image.plane(Plane::Zero);
        let plane1 = image.plane(Plane::One);
        assert_eq!(plane0[7], 0x8000 >> 3);
        assert_eq!(plane0[0], 0);
        assert_eq!(plane1[0], 0x8000);
        assert_eq!(image.get(0x00), 0b10);
        assert_eq!(image.ones(), 3);
    }
}
