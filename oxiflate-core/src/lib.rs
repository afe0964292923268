//! # OxiFlate Core
//!
//! Core components for the OxiFlate codec.
//!
//! This crate provides the building blocks the DEFLATE codec is assembled
//! from:
//!
//! - [`bitstream`]: LSB-first bit-level reader and writer
//! - [`window`]: Sliding window for back-reference resolution
//! - [`adler`]: Adler-32 checksum for zlib framing
//! - [`config`]: Compression configuration and validation
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Collaborator                                        │
//! │     oxiflate CLI (stdin/stdout plumbing)                │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     LZ77 + Huffman blocks, stream controller, zlib      │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitReader/BitWriter, OutputWindow, Adler-32, config │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxiflate_core::adler::Adler32;
//! use oxiflate_core::bitstream::BitReader;
//!
//! // Read bits from data
//! let data = [0xAB, 0xCD];
//! let mut reader = BitReader::new(&data);
//! let bits = reader.read_bits(12).unwrap();
//! assert_eq!(bits, 0xDAB);
//!
//! // Compute Adler-32
//! assert_eq!(Adler32::compute(b"Wikipedia"), 0x11E60398);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod adler;
pub mod bitstream;
pub mod config;
pub mod error;
pub mod window;

// Re-exports for convenience
pub use adler::Adler32;
pub use bitstream::{BitReader, BitWriter};
pub use config::{CompressionConfig, Framing, Strategy};
pub use error::{FlateError, Result};
pub use window::OutputWindow;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::adler::Adler32;
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::config::{CompressionConfig, Framing, Strategy};
    pub use crate::error::{FlateError, Result};
    pub use crate::window::OutputWindow;
}
