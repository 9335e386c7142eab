//! Built-in test bitmaps.
//!
//! A [`Bitmap`] is one `u16` per row (row = Y line), most significant bit
//! first: bit 15 is column 0. A [`Bitmap8`] covers one quadrant the same way
//! with a `u8` per row.

use crate::address::GRID_SIZE;

/// 16 rows of 16 pixels, MSB = column 0.
pub type Bitmap = [u16; GRID_SIZE as usize];

/// Pixel at column `x`, row `y`.
#[inline]
pub fn pixel(bitmap: &Bitmap, x: u8, y: u8) -> bool {
    bitmap[(y & 0x0F) as usize] & (0x8000 >> (x & 0x0F)) != 0
}

/// 8 rows of 8 pixels, MSB = column 0.
pub type Bitmap8 = [u8; 8];

/// Pixel at column `x`, row `y` of a quadrant image.
#[inline]
pub fn pixel8(image: &Bitmap8, x: u8, y: u8) -> bool {
    image[(y & 0x07) as usize] & (0x80 >> (x & 0x07)) != 0
}

pub const SMILEY_8X8: Bitmap8 = [0x7E, 0x81, 0xA5, 0x81, 0xA5, 0x99, 0x42, 0x3C];

pub const STRIPEY_8X8: Bitmap8 = [0xCC, 0x33, 0xCC, 0x33, 0xCC, 0x33, 0xCC, 0x33];

pub const TRIANGULAR_8X8: Bitmap8 = [0xFF, 0xFE, 0xFC, 0xF8, 0xF0, 0xE0, 0xC0, 0x80];

pub const CROSS_8X8: Bitmap8 = [0x18, 0x18, 0x18, 0xFF, 0xFF, 0x18, 0x18, 0x18];

/// A smiley face.
pub const SMILEY: Bitmap = [
    0b0000_0000_0000_0000,
    0b0000_0011_1100_0000,
    0b0000_1100_0011_0000,
    0b0001_0000_0000_1000,
    0b0010_0000_0000_0100,
    0b0010_0110_0110_0100,
    0b0100_0110_0110_0010,
    0b0100_0000_0000_0010,
    0b0100_0000_0000_0010,
    0b0100_0110_0110_0010,
    0b0010_0111_1110_0100,
    0b0010_0001_1000_0100,
    0b0001_0000_0000_1000,
    0b0000_1100_0011_0000,
    0b0000_0011_1100_0000,
    0b0000_0000_0000_0000,
];

/// 4x4 checkerboard blocks.
pub const BLOCKY: Bitmap = [
    0b1111_0000_1111_0000,
    0b1111_0000_1111_0000,
    0b1111_0000_1111_0000,
    0b1111_0000_1111_0000,
    0b0000_1111_0000_1111,
    0b0000_1111_0000_1111,
    0b0000_1111_0000_1111,
    0b0000_1111_0000_1111,
    0b1111_0000_1111_0000,
    0b1111_0000_1111_0000,
    0b1111_0000_1111_0000,
    0b1111_0000_1111_0000,
    0b0000_1111_0000_1111,
    0b0000_1111_0000_1111,
    0b0000_1111_0000_1111,
    0b0000_1111_0000_1111,
];
