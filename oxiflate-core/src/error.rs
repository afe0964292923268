//! Error types for OxiFlate operations.
//!
//! Every failure the codec can report is a variant of [`FlateError`]. All of
//! them are local and deterministic: decoding the same bytes again yields the
//! same error, so callers should never retry.

use thiserror::Error;

/// The main error type for OxiFlate operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlateError {
    /// Configuration value out of range (level, window bits, strategy name).
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the rejected value.
        message: String,
    },

    /// The input ended before the stream was complete.
    #[error("Truncated input: stream ends at bit position {bit_position}")]
    TruncatedInput {
        /// Bit position at which more input was required.
        bit_position: u64,
    },

    /// Reserved block type (BTYPE=11) encountered.
    #[error("Invalid block type {block_type} at bit position {bit_position}")]
    InvalidBlockType {
        /// The 2-bit block type value.
        block_type: u8,
        /// Bit position of the block header.
        bit_position: u64,
    },

    /// Stored block LEN and NLEN fields disagree.
    #[error("Invalid stored block length: LEN={len:#06x}, NLEN={nlen:#06x}")]
    InvalidStoredLength {
        /// Declared length.
        len: u16,
        /// Declared one's complement of the length.
        nlen: u16,
    },

    /// Invalid Huffman code table or undecodable symbol.
    #[error("Invalid Huffman code at bit position {bit_position}: {message}")]
    InvalidHuffmanCode {
        /// Bit position where the problem was detected.
        bit_position: u64,
        /// Description of the problem.
        message: String,
    },

    /// Back-reference distance larger than the configured window.
    #[error("Back-reference distance {distance} exceeds window size {window_size}")]
    WindowSizeExceeded {
        /// The distance found in the stream.
        distance: usize,
        /// The configured window size in bytes.
        window_size: usize,
    },

    /// Back-reference distance reaching before the start of the output.
    #[error("Invalid back-reference distance: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Number of bytes produced so far.
        history_size: usize,
    },

    /// Invalid zlib header.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Adler-32 trailer does not match the decompressed data.
    #[error("Checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Checksum stored in the stream.
        expected: u32,
        /// Checksum computed over the decompressed data.
        computed: u32,
    },
}

/// Result type alias for OxiFlate operations.
pub type Result<T> = std::result::Result<T, FlateError>;

impl FlateError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a truncated input error.
    pub fn truncated(bit_position: u64) -> Self {
        Self::TruncatedInput { bit_position }
    }

    /// Create an invalid block type error.
    pub fn invalid_block_type(block_type: u8, bit_position: u64) -> Self {
        Self::InvalidBlockType {
            block_type,
            bit_position,
        }
    }

    /// Create an invalid stored length error.
    pub fn invalid_stored_length(len: u16, nlen: u16) -> Self {
        Self::InvalidStoredLength { len, nlen }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64, message: impl Into<String>) -> Self {
        Self::InvalidHuffmanCode {
            bit_position,
            message: message.into(),
        }
    }

    /// Create a window size exceeded error.
    pub fn window_exceeded(distance: usize, window_size: usize) -> Self {
        Self::WindowSizeExceeded {
            distance,
            window_size,
        }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(expected: u32, computed: u32) -> Self {
        Self::ChecksumMismatch { expected, computed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FlateError::invalid_block_type(3, 17);
        assert!(err.to_string().contains("block type 3"));

        let err = FlateError::checksum_mismatch(0x1234_5678, 0xDEAD_BEEF);
        assert!(err.to_string().contains("0x12345678"));
        assert!(err.to_string().contains("0xdeadbeef"));

        let err = FlateError::invalid_stored_length(5, 5);
        assert!(err.to_string().contains("LEN=0x0005"));
    }

    #[test]
    fn test_window_error_carries_sizes() {
        let err = FlateError::window_exceeded(1024, 512);
        assert_eq!(
            err,
            FlateError::WindowSizeExceeded {
                distance: 1024,
                window_size: 512
            }
        );
        assert!(err.to_string().contains("1024"));
    }
}
