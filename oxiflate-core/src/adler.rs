//! Adler-32 checksum (RFC 1950 §8.2).
//!
//! Adler-32 is the integrity check carried in the zlib trailer. It keeps two
//! 16-bit sums modulo 65521: `a` is one plus the sum of all bytes, `b` is the
//! sum of every intermediate `a`. The checksum is `b << 16 | a`.
//!
//! ## Performance
//!
//! The modulo is deferred: `NMAX` is the largest number of bytes that can be
//! summed before `b` may overflow a `u32`, so the reduction happens once per
//! 5552-byte chunk instead of once per byte.

/// Largest prime smaller than 65536.
const ADLER_MOD: u32 = 65521;

/// Number of bytes to process before reducing.
const NMAX: usize = 5552;

/// Adler-32 checksum calculator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    /// Create a new Adler-32 calculator.
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Reset to the initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Update the checksum with more data.
    pub fn update(&mut self, data: &[u8]) {
        let mut a = self.a;
        let mut b = self.b;

        for chunk in data.chunks(NMAX) {
            for &byte in chunk {
                a += byte as u32;
                b += a;
            }
            a %= ADLER_MOD;
            b %= ADLER_MOD;
        }

        self.a = a;
        self.b = b;
    }

    /// Get the checksum of the data seen so far.
    pub fn value(&self) -> u32 {
        (self.b << 16) | self.a
    }

    /// Finalize and return the checksum.
    pub fn finalize(self) -> u32 {
        self.value()
    }

    /// Compute the Adler-32 checksum of data in one shot.
    pub fn compute(data: &[u8]) -> u32 {
        let mut adler = Self::new();
        adler.update(data);
        adler.finalize()
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}
