//! Zlib framing (RFC 1950).
//!
//! A zlib stream wraps a raw DEFLATE stream with a two-byte header and a
//! big-endian Adler-32 trailer computed over the uncompressed data:
//!
//! ```text
//! +---+---+=====================+---+---+---+---+
//! |CMF|FLG| compressed data ... |    ADLER32    |
//! +---+---+=====================+---+---+---+---+
//!
//! CMF: bits 0-3 CM (8 = DEFLATE), bits 4-7 CINFO (log2(window) - 8)
//! FLG: bits 0-4 FCHECK, bit 5 FDICT, bits 6-7 FLEVEL
//! ```
//!
//! FCHECK is chosen so that `CMF * 256 + FLG` is a multiple of 31. Preset
//! dictionaries are not supported; a header with FDICT set is rejected.

use crate::deflate::Deflater;
use crate::inflate::{Inflater, decompress};
use oxiflate_core::error::{FlateError, Result};
use oxiflate_core::window::{MAX_WINDOW_BITS, MIN_WINDOW_BITS};
use oxiflate_core::{Adler32, CompressionConfig, Framing, Strategy};

/// Compression method field value for DEFLATE.
const CM_DEFLATE: u8 = 8;

/// Size of the Adler-32 trailer.
const TRAILER_LEN: usize = 4;

/// Compression level hint stored in the FLEVEL field.
///
/// The value is informational only; decoders ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ZlibLevel {
    /// Fastest algorithm, or a strategy that bypasses normal matching.
    Fastest = 0,
    /// Fast algorithm.
    Fast = 1,
    /// Default algorithm.
    Default = 2,
    /// Maximum compression.
    Maximum = 3,
}

impl ZlibLevel {
    /// The hint a compressor running with `level` and `strategy` records.
    pub fn from_config(level: u8, strategy: Strategy) -> Self {
        match (level, strategy) {
            (_, Strategy::HuffmanOnly | Strategy::Rle | Strategy::Fixed) => Self::Fastest,
            (0..=1, _) => Self::Fastest,
            (2..=5, _) => Self::Fast,
            (6, _) => Self::Default,
            _ => Self::Maximum,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::Fastest,
            1 => Self::Fast,
            2 => Self::Default,
            _ => Self::Maximum,
        }
    }
}

/// Decoded zlib header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZlibHeader {
    /// Window size as a power of two (8-15).
    pub window_bits: u8,
    /// Level hint.
    pub level: ZlibLevel,
}

impl ZlibHeader {
    /// Encode as the CMF and FLG bytes.
    pub fn to_bytes(&self) -> [u8; 2] {
        let cmf = ((self.window_bits - 8) << 4) | CM_DEFLATE;
        let flg = (self.level as u8) << 6;
        let rem = (u16::from(cmf) * 256 + u16::from(flg)) % 31;
        let fcheck = if rem == 0 { 0 } else { (31 - rem) as u8 };
        [cmf, flg | fcheck]
    }

    /// Parse and validate a header.
    ///
    /// Fails with `TruncatedInput` if fewer than two bytes are given and with
    /// `InvalidHeader` for a bad check value, a method other than DEFLATE, a
    /// window field above 7 or a preset dictionary request.
    pub fn parse(input: &[u8]) -> Result<Self> {
        let (cmf, flg) = match input {
            [cmf, flg, ..] => (*cmf, *flg),
            _ => return Err(FlateError::truncated(input.len() as u64 * 8)),
        };

        if (u16::from(cmf) * 256 + u16::from(flg)) % 31 != 0 {
            return Err(FlateError::invalid_header("header check failed"));
        }
        let cm = cmf & 0x0F;
        if cm != CM_DEFLATE {
            return Err(FlateError::invalid_header(format!(
                "unsupported compression method {}",
                cm
            )));
        }
        let cinfo = cmf >> 4;
        if cinfo > MAX_WINDOW_BITS - MIN_WINDOW_BITS {
            return Err(FlateError::invalid_header(format!(
                "invalid window size field {}",
                cinfo
            )));
        }
        if flg & 0x20 != 0 {
            return Err(FlateError::invalid_header(
                "preset dictionary is not supported",
            ));
        }

        Ok(Self {
            window_bits: cinfo + MIN_WINDOW_BITS,
            level: ZlibLevel::from_bits(flg >> 6),
        })
    }
}

/// Compress data into a zlib stream.
///
/// The header records `config.window_bits` and the level hint; the
/// `framing` field of the configuration is ignored. Fails only with
/// `InvalidConfig`.
///
/// # Example
///
/// ```
/// use oxiflate_core::CompressionConfig;
/// use oxiflate_deflate::zlib::{zlib_compress, zlib_decompress};
///
/// let data = b"Hello, World! Hello, World!";
/// let compressed = zlib_compress(data, &CompressionConfig::default()).unwrap();
/// assert_eq!(&compressed[..2], &[0x78, 0x9C]);
/// assert_eq!(zlib_decompress(&compressed, 15).unwrap(), data);
/// ```
pub fn zlib_compress(input: &[u8], config: &CompressionConfig) -> Result<Vec<u8>> {
    let mut deflater = Deflater::new(*config)?;
    let header = ZlibHeader {
        window_bits: config.window_bits,
        level: ZlibLevel::from_config(deflater.level(), config.strategy),
    };

    let body = deflater.compress_to_vec(input);
    let mut output = Vec::with_capacity(2 + body.len() + TRAILER_LEN);
    output.extend_from_slice(&header.to_bytes());
    output.extend_from_slice(&body);
    output.extend_from_slice(&Adler32::compute(input).to_be_bytes());
    Ok(output)
}

/// Decompress a zlib stream.
///
/// `window_bits` (8-15) is the largest window the caller accepts; a header
/// announcing a larger one is rejected with `InvalidHeader`. The embedded
/// stream is decoded with the header's window. Bytes after the trailer are
/// ignored.
pub fn zlib_decompress(input: &[u8], window_bits: u8) -> Result<Vec<u8>> {
    if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window_bits) {
        return Err(FlateError::invalid_config(format!(
            "window bits {} out of range {}-{}",
            window_bits, MIN_WINDOW_BITS, MAX_WINDOW_BITS
        )));
    }

    let header = ZlibHeader::parse(input)?;
    if header.window_bits > window_bits {
        return Err(FlateError::invalid_header(format!(
            "stream window 2^{} exceeds allowed 2^{}",
            header.window_bits, window_bits
        )));
    }

    let mut inflater = Inflater::new(header.window_bits)?;
    let output = inflater.inflate(&input[2..])?;

    let trailer_start = 2 + inflater.bytes_consumed();
    let trailer = input
        .get(trailer_start..trailer_start + TRAILER_LEN)
        .ok_or_else(|| FlateError::truncated(input.len() as u64 * 8))?;
    let expected = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let computed = Adler32::compute(&output);
    if expected != computed {
        return Err(FlateError::checksum_mismatch(expected, computed));
    }

    Ok(output)
}

/// Decompress a raw or zlib-framed stream.
pub fn decompress_framed(input: &[u8], framing: Framing, window_bits: u8) -> Result<Vec<u8>> {
    match framing {
        Framing::Raw => decompress(input, window_bits),
        Framing::Zlib => zlib_decompress(input, window_bits),
    }
}
