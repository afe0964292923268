//! Sliding window for LZ77 back-reference resolution.
//!
//! DEFLATE decoders resolve `(distance, length)` pairs against the most
//! recent `2^window_bits` bytes of output. Because the codec works
//! buffer-in/buffer-out, the whole output is retained anyway, so the window
//! is the tail of the output buffer and only the distance bound needs to be
//! enforced.

use crate::error::{FlateError, Result};

/// Smallest window supported by the zlib header (CINFO=0).
pub const MIN_WINDOW_BITS: u8 = 8;

/// Largest DEFLATE window (32 KiB).
pub const MAX_WINDOW_BITS: u8 = 15;

/// Output buffer doubling as the decoder's sliding window.
#[derive(Debug, Clone)]
pub struct OutputWindow {
    /// Accumulated output; the last `window_size` bytes are the history.
    output: Vec<u8>,
    /// Maximum back-reference distance.
    window_size: usize,
}

impl OutputWindow {
    /// Create a window of `2^window_bits` bytes.
    pub fn new(window_bits: u8) -> Self {
        Self::with_capacity(window_bits, 0)
    }

    /// Create a window with an output capacity hint.
    pub fn with_capacity(window_bits: u8, output_capacity: usize) -> Self {
        debug_assert!(
            (MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window_bits),
            "window bits out of range: {}",
            window_bits
        );
        Self {
            output: Vec::with_capacity(output_capacity),
            window_size: 1usize << window_bits,
        }
    }

    /// Maximum distance a back-reference may use.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Write a literal byte.
    #[inline]
    pub fn write_literal(&mut self, byte: u8) {
        self.output.push(byte);
    }

    /// Write multiple literal bytes.
    pub fn write_literals(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }

    /// Copy `length` bytes starting `distance` bytes back.
    ///
    /// Overlapping copies (`length > distance`) repeat the pattern, as
    /// LZ77 requires.
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        if distance > self.window_size {
            return Err(FlateError::window_exceeded(distance, self.window_size));
        }
        if distance == 0 || distance > self.output.len() {
            return Err(FlateError::invalid_distance(distance, self.output.len()));
        }

        let start = self.output.len() - distance;
        if length <= distance {
            self.output.extend_from_within(start..start + length);
        } else {
            self.output.reserve(length);
            for i in 0..length {
                let byte = self.output[start + i];
                self.output.push(byte);
            }
        }

        Ok(())
    }

    /// Get the total output length.
    pub fn output_len(&self) -> usize {
        self.output.len()
    }

    /// Get the output data.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Consume and return the output data.
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }
}
