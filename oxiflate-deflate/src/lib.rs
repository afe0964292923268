//! # OxiFlate Deflate
//!
//! Pure Rust implementation of DEFLATE (RFC 1951) with optional zlib
//! framing (RFC 1950).
//!
//! ## Features
//!
//! - **Decompression**: all DEFLATE block types
//!   - Stored (uncompressed) blocks
//!   - Fixed Huffman codes
//!   - Dynamic Huffman codes
//! - **Compression**: LZ77 + length-limited Huffman coding
//!   - Levels 0-9 with zlib-style lazy matching
//!   - Strategies: default, filtered, huffman_only, rle, fixed
//!   - Per-chunk choice of the cheapest block type
//! - **Framing**: raw streams or zlib header + Adler-32 trailer
//! - **Inspection**: per-block statistics of a decoded stream
//!
//! ## Example
//!
//! ```rust
//! use oxiflate_deflate::{deflate, inflate};
//!
//! // Compress data
//! let original = b"Hello, World! Hello, World!";
//! let compressed = deflate(original, 6).unwrap();
//!
//! // Decompress data
//! let decompressed = inflate(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//! ```
//!
//! Configured compression with zlib framing:
//!
//! ```rust
//! use oxiflate_core::{CompressionConfig, Framing, Strategy};
//! use oxiflate_deflate::{compress, decompress_framed};
//!
//! let config = CompressionConfig::new()
//!     .with_level(9)
//!     .with_window_bits(12)
//!     .with_strategy(Strategy::Filtered)
//!     .with_framing(Framing::Zlib);
//! let compressed = compress(b"abcabcabcabc", &config).unwrap();
//! let decompressed = decompress_framed(&compressed, Framing::Zlib, 15).unwrap();
//! assert_eq!(decompressed, b"abcabcabcabc");
//! ```
//!
//! ## Compression Levels
//!
//! - Level 0: No compression (stored blocks)
//! - Level 1-3: Greedy matching, shallow hash chains
//! - Level 4-6: Lazy matching (default is 6)
//! - Level 7-9: Lazy matching with deep chains (slower)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod block;
pub mod deflate;
pub mod huffman;
pub mod inflate;
pub mod lz77;
pub mod tables;
pub mod zlib;

// Re-exports
pub use block::BlockKind;
pub use deflate::{Deflater, compress, deflate};
pub use huffman::{CodeTable, HuffmanBuilder, HuffmanTree};
pub use inflate::{BlockInfo, Inflater, decompress, inflate, inspect};
pub use lz77::{Lz77Encoder, Lz77Token};
pub use zlib::{decompress_framed, zlib_compress, zlib_decompress};
