//! DEFLATE decompression (inflate).
//!
//! This module implements the DEFLATE decompression algorithm as specified
//! in RFC 1951. It supports all three block types:
//! - Type 0: Stored (uncompressed)
//! - Type 1: Fixed Huffman codes
//! - Type 2: Dynamic Huffman codes
//!
//! Back-references are checked against the configured window: a distance
//! larger than `2^window_bits` is a [`WindowSizeExceeded`] error even if the
//! referenced bytes are available.
//!
//! [`WindowSizeExceeded`]: oxiflate_core::FlateError::WindowSizeExceeded

use crate::block::BlockKind;
use crate::huffman::{
    CODELEN_ALPHABET_SIZE, CodeKind, DISTANCE_ALPHABET_SIZE, END_OF_BLOCK, HuffmanTree,
    LITLEN_ALPHABET_SIZE,
};
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS, decode_distance, decode_length,
    fixed_distance_decoder, fixed_litlen_decoder,
};
use oxiflate_core::error::{FlateError, Result};
use oxiflate_core::window::{MAX_WINDOW_BITS, MIN_WINDOW_BITS};
use oxiflate_core::{BitReader, OutputWindow};

/// Description of one decoded block.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockInfo {
    /// Block type.
    pub kind: BlockKind,
    /// Whether BFINAL was set.
    pub is_final: bool,
    /// Bit offset of the block header in the stream.
    pub start_bit: u64,
    /// Bit offset just past the block.
    pub end_bit: u64,
    /// Offset of the block's first output byte.
    pub output_start: usize,
    /// Number of bytes the block produced.
    pub output_len: usize,
    /// Number of literal symbols (stored bytes count as literals).
    pub literals: usize,
    /// Number of back-references.
    pub matches: usize,
}

impl BlockInfo {
    /// Size of the block in the compressed stream, in bits.
    pub fn compressed_bits(&self) -> u64 {
        self.end_bit - self.start_bit
    }
}

/// DEFLATE decompressor.
#[derive(Debug, Clone)]
pub struct Inflater {
    /// Maximum back-reference distance as a power of two.
    window_bits: u8,
    /// Blocks decoded by the last call.
    blocks: Vec<BlockInfo>,
    /// Input bytes used by the last call.
    bytes_consumed: usize,
}

impl Inflater {
    /// Create a new DEFLATE decompressor accepting distances up to
    /// `2^window_bits` (8-15).
    pub fn new(window_bits: u8) -> Result<Self> {
        if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window_bits) {
            return Err(FlateError::invalid_config(format!(
                "window bits {} out of range {}..={}",
                window_bits, MIN_WINDOW_BITS, MAX_WINDOW_BITS
            )));
        }
        Ok(Self {
            window_bits,
            blocks: Vec::new(),
            bytes_consumed: 0,
        })
    }

    /// Window size exponent.
    pub fn window_bits(&self) -> u8 {
        self.window_bits
    }

    /// Blocks decoded by the last call, in stream order.
    pub fn blocks(&self) -> &[BlockInfo] {
        &self.blocks
    }

    /// Number of input bytes the last complete stream occupied.
    ///
    /// Bytes after this offset were not read.
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }

    /// Decompress one complete raw DEFLATE stream.
    ///
    /// Data after the final block is ignored.
    pub fn inflate(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        self.blocks.clear();
        self.bytes_consumed = 0;

        let mut reader = BitReader::new(input);
        let mut window = OutputWindow::with_capacity(self.window_bits, input.len() * 3);

        loop {
            let info = Self::inflate_block(&mut reader, &mut window)?;
            let is_final = info.is_final;
            self.blocks.push(info);
            if is_final {
                break;
            }
        }

        self.bytes_consumed = reader.bytes_consumed();
        Ok(window.into_output())
    }

    /// Decompress a single block.
    fn inflate_block(reader: &mut BitReader<'_>, window: &mut OutputWindow) -> Result<BlockInfo> {
        let start_bit = reader.bit_position();
        let output_start = window.output_len();

        let is_final = reader.read_bit()?;
        let btype = reader.read_bits(2)? as u8;
        let kind = BlockKind::from_btype(btype)
            .ok_or_else(|| FlateError::invalid_block_type(btype, start_bit))?;

        let (literals, matches) = match kind {
            BlockKind::Stored => (Self::inflate_stored(reader, window)?, 0),
            BlockKind::Fixed => Self::inflate_huffman(
                reader,
                window,
                fixed_litlen_decoder(),
                fixed_distance_decoder(),
            )?,
            BlockKind::Dynamic => {
                let (litlen_tree, dist_tree) = Self::read_dynamic_trees(reader)?;
                Self::inflate_huffman(reader, window, &litlen_tree, &dist_tree)?
            }
        };

        Ok(BlockInfo {
            kind,
            is_final,
            start_bit,
            end_bit: reader.bit_position(),
            output_start,
            output_len: window.output_len() - output_start,
            literals,
            matches,
        })
    }

    /// Decompress a stored (uncompressed) block; returns its length.
    fn inflate_stored(reader: &mut BitReader<'_>, window: &mut OutputWindow) -> Result<usize> {
        reader.align_to_byte();

        let len = reader.read_bits(16)? as u16;
        let nlen = reader.read_bits(16)? as u16;
        if len != !nlen {
            return Err(FlateError::invalid_stored_length(len, nlen));
        }

        let mut buf = vec![0u8; len as usize];
        reader.read_bytes(&mut buf)?;
        window.write_literals(&buf);

        Ok(len as usize)
    }

    /// Read the code tables of a dynamic block header.
    fn read_dynamic_trees(reader: &mut BitReader<'_>) -> Result<(HuffmanTree, HuffmanTree)> {
        let header_bit = reader.bit_position();
        let hlit = reader.read_bits(5)? as usize + 257;
        let hdist = reader.read_bits(5)? as usize + 1;
        let hclen = reader.read_bits(4)? as usize + 4;

        if hlit > LITLEN_ALPHABET_SIZE || hdist > DISTANCE_ALPHABET_SIZE {
            return Err(FlateError::invalid_huffman(
                header_bit,
                format!("too many length or distance symbols ({}, {})", hlit, hdist),
            ));
        }

        let mut code_length_lengths = [0u8; CODELEN_ALPHABET_SIZE];
        for &symbol in &CODE_LENGTH_ORDER[..hclen] {
            code_length_lengths[symbol] = reader.read_bits(3)? as u8;
        }
        let code_length_tree = HuffmanTree::checked(
            &code_length_lengths,
            CodeKind::CodeLength,
            reader.bit_position(),
        )?;

        // Literal/length and distance lengths form one run-length coded
        // sequence; repeats may cross from one table into the other.
        let mut all_lengths = vec![0u8; hlit + hdist];
        let mut i = 0;

        while i < all_lengths.len() {
            let symbol_bit = reader.bit_position();
            let symbol = code_length_tree.decode(reader)?;

            let (value, repeat) = match symbol {
                0..=15 => (symbol as u8, 1),
                16 => {
                    if i == 0 {
                        return Err(FlateError::invalid_huffman(
                            symbol_bit,
                            "repeat code 16 with no previous length",
                        ));
                    }
                    (all_lengths[i - 1], reader.read_bits(2)? as usize + 3)
                }
                17 => (0, reader.read_bits(3)? as usize + 3),
                _ => (0, reader.read_bits(7)? as usize + 11),
            };

            if i + repeat > all_lengths.len() {
                return Err(FlateError::invalid_huffman(
                    symbol_bit,
                    "code length repeat overflows the tables",
                ));
            }
            all_lengths[i..i + repeat].fill(value);
            i += repeat;
        }

        let tables_bit = reader.bit_position();
        let litlen_tree = HuffmanTree::checked(&all_lengths[..hlit], CodeKind::LitLen, tables_bit)?;
        let dist_tree =
            HuffmanTree::checked(&all_lengths[hlit..], CodeKind::Distance, tables_bit)?;

        Ok((litlen_tree, dist_tree))
    }

    /// Decompress Huffman-coded data up to end-of-block; returns the
    /// literal and match counts.
    fn inflate_huffman(
        reader: &mut BitReader<'_>,
        window: &mut OutputWindow,
        litlen_tree: &HuffmanTree,
        dist_tree: &HuffmanTree,
    ) -> Result<(usize, usize)> {
        let mut literals = 0;
        let mut matches = 0;

        loop {
            let symbol_bit = reader.bit_position();
            let symbol = litlen_tree.decode(reader)?;

            if symbol < END_OF_BLOCK {
                window.write_literal(symbol as u8);
                literals += 1;
                continue;
            }
            if symbol == END_OF_BLOCK {
                break;
            }
            if symbol as usize >= LITLEN_ALPHABET_SIZE {
                return Err(FlateError::invalid_huffman(
                    symbol_bit,
                    format!("invalid literal/length symbol {}", symbol),
                ));
            }

            let extra_bits = LENGTH_EXTRA_BITS[(symbol - 257) as usize];
            let extra = reader.read_bits(extra_bits)? as u16;
            let length = decode_length(symbol, extra);

            let dist_bit = reader.bit_position();
            let dist_code = dist_tree.decode(reader)?;
            if dist_code as usize >= DISTANCE_ALPHABET_SIZE {
                return Err(FlateError::invalid_huffman(
                    dist_bit,
                    format!("invalid distance symbol {}", dist_code),
                ));
            }
            let extra_bits = DISTANCE_EXTRA_BITS[dist_code as usize];
            let extra = reader.read_bits(extra_bits)? as u16;
            let distance = decode_distance(dist_code, extra);

            window.copy_match(distance as usize, length as usize)?;
            matches += 1;
        }

        Ok((literals, matches))
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self {
            window_bits: MAX_WINDOW_BITS,
            blocks: Vec::new(),
            bytes_consumed: 0,
        }
    }
}

/// Decompress a raw DEFLATE stream with the given window size (8-15).
pub fn decompress(input: &[u8], window_bits: u8) -> Result<Vec<u8>> {
    Inflater::new(window_bits)?.inflate(input)
}

/// Decompress a raw DEFLATE stream with a 32 KiB window.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    Inflater::default().inflate(data)
}

/// Decode a raw DEFLATE stream and describe its blocks.
pub fn inspect(input: &[u8], window_bits: u8) -> Result<Vec<BlockInfo>> {
    let mut inflater = Inflater::new(window_bits)?;
    inflater.inflate(input)?;
    Ok(inflater.blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxiflate_core::BitWriter;

    #[test]
    fn test_inflate_stored() {
        // Stored block: BFINAL=1, BTYPE=00, LEN=5, NLEN=~5, "Hello"
        let data = [
            0x01, // BFINAL=1, BTYPE=00
            0x05, 0x00, // LEN=5
            0xFA, 0xFF, // NLEN=~5
            b'H', b'e', b'l', b'l', b'o',
        ];

        assert_eq!(inflate(&data).unwrap(), b"Hello");
    }

    #[test]
    fn test_inflate_fixed_literal() {
        // zlib's raw output for "a": fixed block, 'a', EOB
        let data = [0x4B, 0x04, 0x00];
        assert_eq!(inflate(&data).unwrap(), b"a");

        let blocks = inspect(&data, 15).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Fixed);
        assert!(blocks[0].is_final);
        assert_eq!(blocks[0].literals, 1);
        assert_eq!(blocks[0].matches, 0);
    }

    #[test]
    fn test_inflate_known_zlib_output() {
        // Raw DEFLATE from zlib for "hello hello hello hello"
        let data = [0xCB, 0x48, 0xCD, 0xC9, 0xC9, 0x57, 0xC8, 0x40, 0x27, 0x01];
        let out = inflate(&data).unwrap();
        assert_eq!(out, b"hello hello hello hello");

        let blocks = inspect(&data, 15).unwrap();
        // "hello h" then one match of length 16 at distance 6
        assert_eq!(blocks[0].literals, 7);
        assert_eq!(blocks[0].matches, 1);
        assert_eq!(blocks[0].output_len - blocks[0].literals, 16);
        assert_eq!(&out[7..], &out[1..17]);
    }

    #[test]
    fn test_reserved_block_type() {
        // BFINAL=1, BTYPE=11
        let data = [0x07];
        assert_eq!(
            inflate(&data),
            Err(FlateError::invalid_block_type(3, 0))
        );
    }

    #[test]
    fn test_stored_length_mismatch() {
        let data = [0x01, 0x05, 0x00, 0x00, 0x00, b'H', b'e', b'l', b'l', b'o'];
        assert_eq!(
            inflate(&data),
            Err(FlateError::invalid_stored_length(5, 0))
        );
    }

    #[test]
    fn test_truncated_stored() {
        let data = [0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e'];
        assert!(matches!(
            inflate(&data),
            Err(FlateError::TruncatedInput { .. })
        ));
        assert!(matches!(inflate(&[]), Err(FlateError::TruncatedInput { .. })));
    }

    #[test]
    fn test_missing_final_block() {
        // Non-final empty stored block and nothing after it
        let data = [0x00, 0x00, 0x00, 0xFF, 0xFF];
        assert!(matches!(
            inflate(&data),
            Err(FlateError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_distance_before_output_start() {
        // Fixed block whose first symbol is a match (length 3, distance 1)
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(1, 2);
        let litlen = crate::tables::fixed_litlen_codes();
        let dist = crate::tables::fixed_distance_codes();
        litlen.write(&mut writer, 257);
        dist.write(&mut writer, 0);
        litlen.write(&mut writer, END_OF_BLOCK);
        let data = writer.finish();

        assert_eq!(
            inflate(&data),
            Err(FlateError::invalid_distance(1, 0))
        );
    }

    #[test]
    fn test_invalid_fixed_symbols() {
        let litlen = crate::tables::fixed_litlen_codes();
        let dist = crate::tables::fixed_distance_codes();

        // Literal/length symbol 286
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(1, 2);
        litlen.write(&mut writer, 286);
        let data = writer.finish();
        assert!(matches!(
            inflate(&data),
            Err(FlateError::InvalidHuffmanCode { .. })
        ));

        // Distance symbol 30
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(1, 2);
        litlen.write(&mut writer, b'x' as u16);
        litlen.write(&mut writer, 257);
        dist.write(&mut writer, 30);
        litlen.write(&mut writer, END_OF_BLOCK);
        let data = writer.finish();
        assert!(matches!(
            inflate(&data),
            Err(FlateError::InvalidHuffmanCode { .. })
        ));
    }

    #[test]
    fn test_bytes_consumed_ignores_trailing_data() {
        let mut data = vec![0x01, 0x02, 0x00, 0xFD, 0xFF, b'o', b'k'];
        data.extend_from_slice(b"trailing");
        let mut inflater = Inflater::new(15).unwrap();
        assert_eq!(inflater.inflate(&data).unwrap(), b"ok");
        assert_eq!(inflater.bytes_consumed(), 7);
    }

    #[test]
    fn test_window_bits_range() {
        assert!(Inflater::new(7).is_err());
        assert!(Inflater::new(16).is_err());
        assert!(Inflater::new(8).is_ok());
        assert_eq!(Inflater::default().window_bits(), 15);
    }

    #[test]
    fn test_roundtrip_with_deflater() {
        let input = b"Hello, World! Hello, World! Hello, World!";
        for level in 0..=9 {
            let compressed = crate::deflate::deflate(input, level).unwrap();
            assert_eq!(inflate(&compressed).unwrap(), input);
        }
    }
}
