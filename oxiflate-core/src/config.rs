//! Compression configuration.
//!
//! A [`CompressionConfig`] is fixed for the lifetime of a stream. It is
//! validated once at entry; an out-of-range value is rejected with
//! [`FlateError::InvalidConfig`] before any input is touched.
//!
//! ```
//! use oxiflate_core::config::{CompressionConfig, Framing, Strategy};
//!
//! let config = CompressionConfig::new()
//!     .with_level(9)
//!     .with_window_bits(12)
//!     .with_strategy(Strategy::Filtered)
//!     .with_framing(Framing::Zlib);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.effective_level(), 9);
//! ```

use crate::error::{FlateError, Result};
use std::fmt;
use std::str::FromStr;

/// Level value selecting the default level.
pub const DEFAULT_LEVEL_SENTINEL: i8 = -1;

/// Numeric level used when the default is requested.
pub const DEFAULT_LEVEL: u8 = 6;

/// Highest compression level.
pub const MAX_LEVEL: u8 = 9;

/// Smallest window accepted for compression (512 bytes).
pub const MIN_COMPRESS_WINDOW_BITS: u8 = 9;

/// Largest window (32 KiB).
pub const MAX_COMPRESS_WINDOW_BITS: u8 = 15;

/// Match-finding strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Strategy {
    /// Lazy LZ77 matching with the cheapest block type.
    #[default]
    Default,
    /// Short matches are discarded; suited to small-valued noisy data.
    Filtered,
    /// No matching at all; Huffman coding of literals only.
    HuffmanOnly,
    /// Run-length matching only (distance 1).
    Rle,
    /// Normal matching, but dynamic Huffman blocks are never emitted.
    Fixed,
}

impl Strategy {
    /// All strategies, in declaration order.
    pub const ALL: [Strategy; 5] = [
        Strategy::Default,
        Strategy::Filtered,
        Strategy::HuffmanOnly,
        Strategy::Rle,
        Strategy::Fixed,
    ];

    /// The name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Default => "default",
            Strategy::Filtered => "filtered",
            Strategy::HuffmanOnly => "huffman_only",
            Strategy::Rle => "rle",
            Strategy::Fixed => "fixed",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = FlateError;

    fn from_str(s: &str) -> Result<Self> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| FlateError::invalid_config(format!("unknown strategy '{}'", s)))
    }
}

/// Outer framing of the compressed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Framing {
    /// Bare RFC 1951 stream.
    #[default]
    Raw,
    /// RFC 1950 header and Adler-32 trailer around the stream.
    Zlib,
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framing::Raw => f.write_str("raw"),
            Framing::Zlib => f.write_str("zlib"),
        }
    }
}

impl FromStr for Framing {
    type Err = FlateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "raw" => Ok(Framing::Raw),
            "zlib" => Ok(Framing::Zlib),
            _ => Err(FlateError::invalid_config(format!(
                "unknown framing '{}'",
                s
            ))),
        }
    }
}

/// Configuration for one compression stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompressionConfig {
    /// Compression level 0-9, or -1 for the default level.
    pub level: i8,
    /// Base-two logarithm of the window size (9-15).
    pub window_bits: u8,
    /// Match-finding strategy.
    pub strategy: Strategy,
    /// Raw or zlib-wrapped output.
    pub framing: Framing,
}

impl CompressionConfig {
    /// Default configuration: default level, 32 KiB window, raw output.
    pub fn new() -> Self {
        Self {
            level: DEFAULT_LEVEL_SENTINEL,
            window_bits: MAX_COMPRESS_WINDOW_BITS,
            strategy: Strategy::Default,
            framing: Framing::Raw,
        }
    }

    /// Set the compression level.
    pub fn with_level(mut self, level: i8) -> Self {
        self.level = level;
        self
    }

    /// Set the window size exponent.
    pub fn with_window_bits(mut self, window_bits: u8) -> Self {
        self.window_bits = window_bits;
        self
    }

    /// Set the strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the framing.
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.level < DEFAULT_LEVEL_SENTINEL || self.level > MAX_LEVEL as i8 {
            return Err(FlateError::invalid_config(format!(
                "level {} out of range -1..=9",
                self.level
            )));
        }
        if !(MIN_COMPRESS_WINDOW_BITS..=MAX_COMPRESS_WINDOW_BITS).contains(&self.window_bits) {
            return Err(FlateError::invalid_config(format!(
                "window bits {} out of range 9..=15",
                self.window_bits
            )));
        }
        Ok(())
    }

    /// Numeric level with the default resolved (0-9).
    ///
    /// Only meaningful for a configuration that passed [`validate`](Self::validate).
    pub fn effective_level(&self) -> u8 {
        if self.level == DEFAULT_LEVEL_SENTINEL {
            DEFAULT_LEVEL
        } else {
            self.level.clamp(0, MAX_LEVEL as i8) as u8
        }
    }

    /// Window size in bytes.
    pub fn window_size(&self) -> usize {
        1usize << self.window_bits
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self::new()
    }
}
