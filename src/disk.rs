//! Circular alpha-channel layout of a bitstream.
//!
//! An image of side `2r` carries one bit in every pixel `(row, col)` with
//! `(col - r)^2 + (row - r)^2 <= r^2`. Pixels are visited row by row, left to
//! right, and this order is part of the format: alpha 255 is a zero bit,
//! 254 a one bit, and 0 marks pixels outside the disk.

use crate::{image::AlphaMap, Error};
use std::ops::Range;

/// Alpha value of a disk pixel carrying a zero bit
pub const ALPHA_ZERO: u8 = 255;
/// Alpha value of a disk pixel carrying a one bit
pub const ALPHA_ONE: u8 = 254;
/// Alpha value of every pixel outside the disk
pub const ALPHA_UNUSED: u8 = 0;

/// Extra radius added to the analytic lower bound
const RADIUS_MARGIN: u32 = 5;

fn isqrt(n: u64) -> u64 {
    let mut x = (n as f64).sqrt() as u64;
    while x * x > n {
        x -= 1;
    }
    while (x + 1) * (x + 1) <= n {
        x += 1;
    }
    x
}

/// The set of bit-carrying pixels of a `2r` square image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disk {
    radius: u32,
}

impl Disk {
    pub fn new(radius: u32) -> Self {
        Self { radius }
    }

    /// Smallest disk, starting from `ceil(sqrt(bits / pi)) + 5`, holding `bits` pixels
    ///
    /// # Examples
    /// ```rust
    /// # use ntrs::disk::Disk;
    /// let disk = Disk::for_bits(1000);
    /// assert_eq!(disk.radius(), 23);
    /// assert!(disk.capacity() >= 1000);
    /// ```
    pub fn for_bits(bits: usize) -> Self {
        let lower = (bits as f64 / std::f64::consts::PI).sqrt().ceil() as u32;
        let mut disk = Self::new(lower + RADIUS_MARGIN);
        while disk.capacity() < bits {
            disk.radius += 1;
        }
        disk
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Side length of the enclosing image
    pub fn side(&self) -> u32 {
        self.radius * 2
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        let r = self.radius as i64;
        let (y, x) = (row as i64 - r, col as i64 - r);
        row < self.side() && col < self.side() && x * x + y * y <= r * r
    }

    /// Columns of `row` that lie inside the disk
    fn row_span(&self, row: u32) -> Range<u32> {
        let r = self.radius as u64;
        let y = (row as i64 - r as i64).unsigned_abs();
        let half = isqrt(r * r - y * y) as u32;
        // The box stops one short of the right edge of the circle
        (self.radius - half)..(self.radius + half + 1).min(self.side())
    }

    /// Number of pixels inside the disk
    pub fn capacity(&self) -> usize {
        (0..self.side())
            .map(|row| self.row_span(row).len())
            .sum()
    }

    /// Disk pixels as `(row, col)` in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.side()).flat_map(move |row| self.row_span(row).map(move |col| (row, col)))
    }
}

/// Paints `bits` onto a fresh transparent image sized for them
pub fn render(bits: &[bool]) -> AlphaMap {
    let disk = Disk::for_bits(bits.len());
    log::debug!(
        "rendering {} bits on a disk of radius {} ({} pixels)",
        bits.len(),
        disk.radius(),
        disk.capacity()
    );
    let mut map = AlphaMap::transparent(disk.side());
    for (i, (row, col)) in disk.pixels().enumerate() {
        let alpha = match bits.get(i) {
            Some(true) => ALPHA_ONE,
            _ => ALPHA_ZERO,
        };
        map.set(row, col, alpha);
    }
    map
}

/// Reads back every bit carried by the disk of `map`
///
/// Disk pixels with an alpha other than 254 or 255 are skipped, and scanning
/// stops at the first row missing from `map`.
pub fn scan(map: &AlphaMap) -> Result<Vec<bool>, Error> {
    if map.width() != map.height() {
        return Err(Error::NotSquare {
            width: map.width(),
            height: map.height(),
        });
    }
    let disk = Disk::new(map.width() / 2);
    let rows = map.rows();
    let mut bits = Vec::new();
    let mut skipped = 0usize;
    for (row, col) in disk.pixels().take_while(|&(row, _)| row < rows) {
        match map.get(row, col) {
            ALPHA_ONE => bits.push(true),
            ALPHA_ZERO => bits.push(false),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        log::warn!("skipped {skipped} disk pixels with unexpected alpha");
    }
    Ok(bits)
}
