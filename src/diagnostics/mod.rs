//! Array diagnostics.
//!
//! Bring-up and stress routines that run on any [`CoreBus`]. Failures are
//! counted or listed and logged at `WARN`; they are data, not errors, since
//! the point of running them is to find out which cores misbehave.
//!
//! ```rust
//! use coremem::diagnostics::{self, BLOCKY};
//! use coremem::{FlatCore, Plane};
//!
//! let mut mem = FlatCore::new();
//! assert_eq!(diagnostics::gallop(&mut mem, 0b00, 0b11), 0);
//!
//! diagnostics::write_image(&mut mem, &BLOCKY, Plane::One);
//! assert!(diagnostics::compare_image(&mut mem, &BLOCKY, Plane::One).is_empty());
//! ```

use std::fmt;

use tracing::{event, Level};

use crate::address::{all_addresses, decode, from_xy, CORE_COUNT};
use crate::bridge::Plane;
use crate::memory::CoreBus;
use crate::sequencer::{PlaneMask, PulseDirection};

mod image;
mod patterns;

pub use image::MemoryImage;
pub use patterns::{
    pixel, pixel8, Bitmap, Bitmap8, BLOCKY, CROSS_8X8, SMILEY, SMILEY_8X8, STRIPEY_8X8,
    TRIANGULAR_8X8,
};

/// Set pulses issued per address by [`half_current_stress`].
pub const HALF_CURRENT_REPETITIONS: u32 = 2048;

/// Planes pulsed by the half-current stress test.
pub const HALF_CURRENT_PATTERN: u8 = 0b01;

/// Verification passes run by [`image_test`].
pub const IMAGE_TEST_PASSES: u32 = 128;

/// Quadrant redraws before each [`image_test`] verification.
pub const IMAGE_TEST_REDRAWS: u32 = 32;

/// A cell that did not hold what was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub address: u8,
    pub expected: u8,
    pub actual: u8,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = decode(self.address);
        write!(
            f,
            "core ({}, {}) at 0x{:02X}: expected {:02b}, read {:02b}",
            d.x, d.y, self.address, self.expected, self.actual
        )
    }
}

/// Write `value` to every address, in row order.
pub fn write_all<M: CoreBus + ?Sized>(mem: &mut M, value: u8) {
    for address in all_addresses() {
        mem.write(address, value);
    }
}

/// Read every address and return the cells that differ from `expected`.
pub fn verify<M, F>(mem: &mut M, mut expect: F) -> Vec<Mismatch>
where
    M: CoreBus + ?Sized,
    F: FnMut(u8) -> u8,
{
    let mut mismatches = Vec::new();
    for address in all_addresses() {
        let actual = mem.read(address);
        let expected = expect(address) & 0b11;
        if actual != expected {
            event!(Level::WARN, address, expected, actual, "core mismatch");
            mismatches.push(Mismatch {
                address,
                expected,
                actual,
            });
        }
    }
    mismatches
}

/// Galloping test for one address.
///
/// Fills the array with `background`, writes `pattern` to `test_address`,
/// and reads back all 256 cells. The test address is left at zero afterwards.
/// Returns the number of cells that read wrong.
pub fn gallop_at<M: CoreBus + ?Sized>(
    mem: &mut M,
    test_address: u8,
    background: u8,
    pattern: u8,
) -> usize {
    write_all(mem, background);
    mem.write(test_address, pattern);

    let failures = verify(mem, |address| {
        if address == test_address {
            pattern
        } else {
            background
        }
    })
    .len();

    mem.write(test_address, 0);
    failures
}

/// [`gallop_at`] over every address. Returns the total failure count.
pub fn gallop<M: CoreBus + ?Sized>(mem: &mut M, background: u8, pattern: u8) -> usize {
    let failures: usize = all_addresses()
        .map(|address| gallop_at(mem, address, background, pattern))
        .sum();

    event!(Level::INFO, background, pattern, failures, "gallop complete");
    failures
}

/// Half-select stress for one address.
///
/// Clears the array, then issues `repetitions` bare set pulses enabling plane 0
/// at `address`. Every other core on the same X and Y lines sees
/// `repetitions` half-select pulses; none of them may switch. Returns the
/// number of cells that read wrong.
pub fn half_current_stress_at<M: CoreBus + ?Sized>(
    mem: &mut M,
    address: u8,
    repetitions: u32,
) -> usize {
    write_all(mem, 0b00);

    let enable = PlaneMask::from_bits(HALF_CURRENT_PATTERN);
    for _ in 0..repetitions {
        mem.pulse(address, PulseDirection::Set, enable, false);
    }

    verify(mem, |a| if a == address { HALF_CURRENT_PATTERN } else { 0b00 }).len()
}

/// [`half_current_stress_at`] over every address with
/// [`HALF_CURRENT_REPETITIONS`] pulses each.
pub fn half_current_stress<M: CoreBus + ?Sized>(mem: &mut M) -> usize {
    let failures: usize = all_addresses()
        .map(|address| half_current_stress_at(mem, address, HALF_CURRENT_REPETITIONS))
        .sum();

    event!(Level::INFO, failures, "half-current stress complete");
    failures
}

/// Draw `bitmap` into one plane, leaving the other plane untouched.
pub fn write_image<M: CoreBus + ?Sized>(mem: &mut M, bitmap: &Bitmap, plane: Plane) {
    let bit = plane.bit();
    for address in all_addresses() {
        let d = decode(address);
        let kept = mem.read(address) & !bit;
        let value = if pixel(bitmap, d.x, d.y) { kept | bit } else { kept };
        mem.write(address, value);
    }
}

/// Compare one plane against `bitmap`.
///
/// Each mismatch strobes the debug line so the failing read can be found on a
/// scope. Mismatch values are the single plane bit, not the full cell.
pub fn compare_image<M: CoreBus + ?Sized>(
    mem: &mut M,
    bitmap: &Bitmap,
    plane: Plane,
) -> Vec<Mismatch> {
    let bit = plane.bit();
    let mut mismatches = Vec::new();

    for address in all_addresses() {
        let d = decode(address);
        let actual = mem.read(address) & bit;
        let expected = if pixel(bitmap, d.x, d.y) { bit } else { 0 };
        if actual != expected {
            mem.strobe_debug_event();
            event!(Level::WARN, address, expected, actual, ?plane, "image mismatch");
            mismatches.push(Mismatch {
                address,
                expected,
                actual,
            });
        }
    }
    mismatches
}

/// Draw an 8x8 image into plane 0 with its top-left corner at
/// (`start_x`, `start_y`). Plane 1 of every touched cell is kept.
pub fn draw_image_8x8<M: CoreBus + ?Sized>(mem: &mut M, start_x: u8, start_y: u8, image: &Bitmap8) {
    for y in 0..8 {
        for x in 0..8 {
            let address = from_xy(start_x.wrapping_add(x), start_y.wrapping_add(y));
            let kept = mem.read(address) & Plane::One.bit();
            mem.write(address, kept | u8::from(pixel8(image, x, y)));
        }
    }
}

/// Expected cell in the image test layout: the four quadrant images in
/// plane 0 and [`SMILEY`] in plane 1.
fn image_test_cell(address: u8) -> u8 {
    let d = decode(address);
    let quadrant = match (d.x < 8, d.y < 8) {
        (true, true) => &SMILEY_8X8,
        (false, true) => &STRIPEY_8X8,
        (true, false) => &TRIANGULAR_8X8,
        (false, false) => &CROSS_8X8,
    };

    let mut value = u8::from(pixel8(quadrant, d.x, d.y));
    if pixel(&SMILEY, d.x, d.y) {
        value |= Plane::One.bit();
    }
    value
}

/// Image disturbance test.
///
/// Clears the array, draws [`SMILEY_8X8`], [`STRIPEY_8X8`],
/// [`TRIANGULAR_8X8`] and [`CROSS_8X8`] into the four quadrants of plane 0
/// and [`SMILEY`] into plane 1. Each of `passes` passes redraws the top-left
/// quadrant `redraws` times, then verifies all 256 cells. Returns the total
/// number of cells that read wrong.
pub fn image_test_with<M: CoreBus + ?Sized>(mem: &mut M, passes: u32, redraws: u32) -> usize {
    write_all(mem, 0);
    draw_image_8x8(mem, 0, 0, &SMILEY_8X8);
    draw_image_8x8(mem, 8, 0, &STRIPEY_8X8);
    draw_image_8x8(mem, 0, 8, &TRIANGULAR_8X8);
    draw_image_8x8(mem, 8, 8, &CROSS_8X8);
    write_image(mem, &SMILEY, Plane::One);

    let mut failures = 0;
    for _ in 0..passes {
        for _ in 0..redraws {
            draw_image_8x8(mem, 0, 0, &SMILEY_8X8);
        }
        failures += verify(mem, image_test_cell).len();
    }

    event!(Level::INFO, passes, redraws, failures, "image test complete");
    failures
}

/// [`image_test_with`] using [`IMAGE_TEST_PASSES`] and [`IMAGE_TEST_REDRAWS`].
pub fn image_test<M: CoreBus + ?Sized>(mem: &mut M) -> usize {
    image_test_with(mem, IMAGE_TEST_PASSES, IMAGE_TEST_REDRAWS)
}

/// Read every cell.
pub fn snapshot<M: CoreBus + ?Sized>(mem: &mut M) -> MemoryImage {
    let mut cells = [0u8; CORE_COUNT];
    for address in all_addresses() {
        cells[address as usize] = mem.read(address);
    }
    MemoryImage::from_cells(cells)
}
