//! DEFLATE compression.
//!
//! This module implements DEFLATE compression as specified in RFC 1951.
//! The input is cut into chunks whose size depends on the level; each chunk
//! is parsed into LZ77 tokens and written as whichever of the stored, fixed
//! Huffman or dynamic Huffman block types is smallest.

use crate::block::{Block, BlockKind};
use crate::lz77::Lz77Encoder;
use oxiflate_core::error::{FlateError, Result};
use oxiflate_core::{BitWriter, CompressionConfig, Framing, Strategy};

/// Largest chunk size, used by the fast levels.
const CHUNK_FAST: usize = 256 * 1024;

/// Chunk size of the middle levels.
const CHUNK_DEFAULT: usize = 128 * 1024;

/// Chunk size of the best-compression levels.
const CHUNK_BEST: usize = 64 * 1024;

/// Upper bound for the `filtered` strategy.
const CHUNK_FILTERED: usize = 32 * 1024;

/// Number of input bytes per block for a level and strategy.
///
/// Higher levels use smaller chunks so block tables adapt to the data more
/// often.
pub fn chunk_size(level: u8, strategy: Strategy) -> usize {
    let size = match level {
        0..=3 => CHUNK_FAST,
        4..=6 => CHUNK_DEFAULT,
        _ => CHUNK_BEST,
    };
    if strategy == Strategy::Filtered {
        size.min(CHUNK_FILTERED)
    } else {
        size
    }
}

/// DEFLATE compressor.
///
/// Holds a validated configuration; each call to
/// [`compress_to_vec`](Self::compress_to_vec) produces one complete raw
/// DEFLATE stream.
#[derive(Debug, Clone)]
pub struct Deflater {
    /// Validated configuration.
    config: CompressionConfig,
    /// Compression level with the default resolved.
    level: u8,
    /// Block types written by the last call, in stream order.
    blocks: Vec<BlockKind>,
}

impl Deflater {
    /// Create a new DEFLATE compressor.
    ///
    /// Fails with `InvalidConfig` if a configuration value is out of range.
    pub fn new(config: CompressionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            level: config.effective_level(),
            config,
            blocks: Vec::new(),
        })
    }

    /// Create a compressor with the specified level (0-9) and defaults
    /// for everything else.
    pub fn with_level(level: u8) -> Result<Self> {
        let level = i8::try_from(level)
            .map_err(|_| FlateError::invalid_config(format!("level {} out of range 0-9", level)))?;
        Self::new(CompressionConfig::new().with_level(level))
    }

    /// The configuration in use.
    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// The effective compression level (0-9).
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Block types written by the last compression, in stream order.
    pub fn blocks(&self) -> &[BlockKind] {
        &self.blocks
    }

    /// Compress data to a raw DEFLATE stream.
    ///
    /// The `framing` field of the configuration is not applied here; see
    /// [`compress`] for framed output.
    pub fn compress_to_vec(&mut self, data: &[u8]) -> Vec<u8> {
        let strategy = self.config.strategy;
        let chunk = chunk_size(self.level, strategy);

        let mut lz77 = Lz77Encoder::with_config(self.level, strategy, self.config.window_bits);
        let mut writer = BitWriter::with_capacity(data.len() / 2 + 16);
        let mut tokens = Vec::new();
        self.blocks.clear();

        let mut start = 0;
        loop {
            let end = (start + chunk).min(data.len());
            let is_final = end == data.len();

            tokens.clear();
            if self.level > 0 {
                lz77.tokenize(data, start..end, &mut tokens);
            }

            let block = Block::choose(
                &data[start..end],
                &tokens,
                self.level,
                strategy,
                writer.bits_written(),
            );
            let written = block.write(&mut writer, is_final);
            self.blocks
                .extend(std::iter::repeat_n(block.kind(), written));

            if is_final {
                break;
            }
            start = end;
        }

        writer.finish()
    }
}

impl Default for Deflater {
    fn default() -> Self {
        Self {
            config: CompressionConfig::default(),
            level: CompressionConfig::default().effective_level(),
            blocks: Vec::new(),
        }
    }
}

/// Compress data with the given configuration, applying its framing.
///
/// Fails only with `InvalidConfig`.
pub fn compress(input: &[u8], config: &CompressionConfig) -> Result<Vec<u8>> {
    match config.framing {
        Framing::Raw => Ok(Deflater::new(*config)?.compress_to_vec(input)),
        Framing::Zlib => crate::zlib::zlib_compress(input, config),
    }
}

/// Compress data to a raw DEFLATE stream at the given level.
pub fn deflate(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let mut deflater = Deflater::with_level(level)?;
    Ok(deflater.compress_to_vec(data))
}
