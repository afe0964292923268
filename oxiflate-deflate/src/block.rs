//! DEFLATE block encoding.
//!
//! A chunk of input becomes one of three block types (RFC 1951 3.2.3):
//!
//! - **Stored**: raw bytes after a byte-aligned LEN/NLEN pair. Payloads over
//!   65535 bytes are split over several consecutive stored blocks.
//! - **Fixed**: LZ77 tokens coded with the fixed Huffman tables.
//! - **Dynamic**: LZ77 tokens coded with tables built for the chunk, which
//!   are transmitted in the block header.
//!
//! The encoder computes the exact size of every allowed type and picks the
//! smallest.

use crate::huffman::{
    CODELEN_ALPHABET_SIZE, CodeTable, DISTANCE_ALPHABET_SIZE, END_OF_BLOCK, HuffmanBuilder,
    LITLEN_ALPHABET_SIZE, MAX_CODE_LENGTH, MAX_CODELEN_CODE_LENGTH,
};
use crate::lz77::Lz77Token;
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS, distance_to_code,
    fixed_distance_codes, fixed_distance_lengths, fixed_litlen_codes, fixed_litlen_lengths,
    length_to_code,
};
use oxiflate_core::{BitWriter, Strategy};
use std::fmt;

/// Largest payload of a single stored block.
pub const MAX_STORED_BLOCK: usize = 65535;

/// Block header bits (BFINAL + BTYPE).
const HEADER_BITS: u64 = 3;

/// Block type as carried in the BTYPE field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BlockKind {
    /// BTYPE=00, uncompressed.
    Stored,
    /// BTYPE=01, fixed Huffman codes.
    Fixed,
    /// BTYPE=10, dynamic Huffman codes.
    Dynamic,
}

impl BlockKind {
    /// The 2-bit BTYPE value.
    pub fn btype(&self) -> u8 {
        match self {
            BlockKind::Stored => 0,
            BlockKind::Fixed => 1,
            BlockKind::Dynamic => 2,
        }
    }

    /// Block kind for a BTYPE value; `None` for the reserved value 3.
    pub fn from_btype(btype: u8) -> Option<Self> {
        match btype {
            0 => Some(BlockKind::Stored),
            1 => Some(BlockKind::Fixed),
            2 => Some(BlockKind::Dynamic),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Stored => "stored",
            BlockKind::Fixed => "fixed",
            BlockKind::Dynamic => "dynamic",
        };
        f.pad(name)
    }
}

/// Symbol frequencies of a token sequence, end-of-block included.
#[derive(Debug, Clone)]
pub struct SymbolStats {
    /// Literal/length symbol counts.
    pub litlen: [u32; LITLEN_ALPHABET_SIZE],
    /// Distance code counts.
    pub distance: [u32; DISTANCE_ALPHABET_SIZE],
}

impl SymbolStats {
    /// Count the symbols of `tokens` plus one end-of-block.
    pub fn from_tokens(tokens: &[Lz77Token]) -> Self {
        let mut stats = Self {
            litlen: [0; LITLEN_ALPHABET_SIZE],
            distance: [0; DISTANCE_ALPHABET_SIZE],
        };

        for token in tokens {
            match *token {
                Lz77Token::Literal(byte) => stats.litlen[byte as usize] += 1,
                Lz77Token::Match { length, distance } => {
                    stats.litlen[length_to_code(length).0 as usize] += 1;
                    stats.distance[distance_to_code(distance).0 as usize] += 1;
                }
            }
        }
        stats.litlen[END_OF_BLOCK as usize] += 1;

        stats
    }

    /// Bits spent on length and distance extra bits.
    pub fn extra_bits(&self) -> u64 {
        let length_extra: u64 = self.litlen[257..]
            .iter()
            .zip(LENGTH_EXTRA_BITS)
            .map(|(&count, bits)| count as u64 * bits as u64)
            .sum();
        let distance_extra: u64 = self
            .distance
            .iter()
            .zip(DISTANCE_EXTRA_BITS)
            .map(|(&count, bits)| count as u64 * bits as u64)
            .sum();
        length_extra + distance_extra
    }

    /// Bits spent on Huffman codes for the given code lengths.
    pub fn coded_bits(&self, litlen_lengths: &[u8], distance_lengths: &[u8]) -> u64 {
        let litlen: u64 = self
            .litlen
            .iter()
            .zip(litlen_lengths)
            .map(|(&count, &len)| count as u64 * len as u64)
            .sum();
        let distance: u64 = self
            .distance
            .iter()
            .zip(distance_lengths)
            .map(|(&count, &len)| count as u64 * len as u64)
            .sum();
        litlen + distance
    }
}

/// One run-length coded entry of a dynamic header's code lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeLengthSymbol {
    /// Code length alphabet symbol (0-18).
    pub symbol: u8,
    /// Value of the symbol's extra bits (repeat count minus base).
    pub extra: u8,
}

impl CodeLengthSymbol {
    fn new(symbol: u8, extra: u8) -> Self {
        Self { symbol, extra }
    }

    /// Number of extra bits following the symbol.
    pub fn extra_bits(&self) -> u8 {
        match self.symbol {
            16 => 2,
            17 => 3,
            18 => 7,
            _ => 0,
        }
    }
}

/// Run-length code a sequence of code lengths (RFC 1951 3.2.7).
///
/// Zero runs use symbol 18 (11-138) and 17 (3-10); other runs send the
/// length once and repeat it with symbol 16 (3-6).
pub fn run_length_encode(lengths: &[u8]) -> Vec<CodeLengthSymbol> {
    let mut symbols = Vec::new();
    let mut i = 0;

    while i < lengths.len() {
        let len = lengths[i];
        let run = lengths[i..].iter().take_while(|&&l| l == len).count();
        let mut left = run;

        if len == 0 {
            while left >= 11 {
                let n = left.min(138);
                symbols.push(CodeLengthSymbol::new(18, (n - 11) as u8));
                left -= n;
            }
            if left >= 3 {
                symbols.push(CodeLengthSymbol::new(17, (left - 3) as u8));
                left = 0;
            }
        } else {
            symbols.push(CodeLengthSymbol::new(len, 0));
            left -= 1;
            while left >= 3 {
                let n = left.min(6);
                symbols.push(CodeLengthSymbol::new(16, (n - 3) as u8));
                left -= n;
            }
        }
        symbols.extend(std::iter::repeat_n(CodeLengthSymbol::new(len, 0), left));

        i += run;
    }

    symbols
}

/// Huffman tables of a dynamic block and their header encoding.
#[derive(Debug, Clone)]
pub struct DynamicCodes {
    /// Literal/length codes (HLIT entries).
    pub litlen: CodeTable,
    /// Distance codes (HDIST entries).
    pub distance: CodeTable,
    /// Code length alphabet code lengths, by symbol.
    pub codelen_lengths: [u8; CODELEN_ALPHABET_SIZE],
    /// Number of code length code lengths transmitted (4-19).
    pub hclen: usize,
    /// Run-length coded literal/length and distance code lengths.
    pub rle: Vec<CodeLengthSymbol>,
}

impl DynamicCodes {
    /// Build optimal tables for the given symbol statistics.
    pub fn build(stats: &SymbolStats) -> Self {
        let mut litlen_builder = HuffmanBuilder::new(LITLEN_ALPHABET_SIZE, MAX_CODE_LENGTH as u8);
        for (symbol, &count) in stats.litlen.iter().enumerate() {
            litlen_builder.add_count(symbol as u16, count);
        }
        let mut litlen_lengths = litlen_builder.build_lengths();

        let mut distance_builder =
            HuffmanBuilder::new(DISTANCE_ALPHABET_SIZE, MAX_CODE_LENGTH as u8);
        for (symbol, &count) in stats.distance.iter().enumerate() {
            distance_builder.add_count(symbol as u16, count);
        }
        let mut distance_lengths = distance_builder.build_lengths();

        let hlit = last_used(&litlen_lengths).max(257);
        let hdist = last_used(&distance_lengths).max(1);
        litlen_lengths.truncate(hlit);
        distance_lengths.truncate(hdist);

        let mut all_lengths = litlen_lengths.clone();
        all_lengths.extend_from_slice(&distance_lengths);
        let rle = run_length_encode(&all_lengths);

        let mut codelen_builder = HuffmanBuilder::new(CODELEN_ALPHABET_SIZE, MAX_CODELEN_CODE_LENGTH);
        for entry in &rle {
            codelen_builder.add(entry.symbol as u16);
        }
        let mut codelen_lengths = [0u8; CODELEN_ALPHABET_SIZE];
        codelen_lengths.copy_from_slice(&codelen_builder.build_lengths());

        let hclen = CODE_LENGTH_ORDER
            .iter()
            .rposition(|&symbol| codelen_lengths[symbol] != 0)
            .map_or(0, |i| i + 1)
            .max(4);

        Self {
            litlen: CodeTable::from_lengths(&litlen_lengths),
            distance: CodeTable::from_lengths(&distance_lengths),
            codelen_lengths,
            hclen,
            rle,
        }
    }

    /// Number of literal/length codes transmitted (257-286).
    pub fn hlit(&self) -> usize {
        self.litlen.len()
    }

    /// Number of distance codes transmitted (1-30).
    pub fn hdist(&self) -> usize {
        self.distance.len()
    }

    /// Size of the header after BFINAL/BTYPE, in bits.
    pub fn header_bits(&self) -> u64 {
        let rle_bits: u64 = self
            .rle
            .iter()
            .map(|entry| {
                self.codelen_lengths[entry.symbol as usize] as u64 + entry.extra_bits() as u64
            })
            .sum();
        5 + 5 + 4 + 3 * self.hclen as u64 + rle_bits
    }

    /// Write HLIT, HDIST, HCLEN and the code length tables.
    pub fn write_header(&self, writer: &mut BitWriter) {
        writer.write_bits((self.hlit() - 257) as u32, 5);
        writer.write_bits((self.hdist() - 1) as u32, 5);
        writer.write_bits((self.hclen - 4) as u32, 4);

        for &symbol in &CODE_LENGTH_ORDER[..self.hclen] {
            writer.write_bits(self.codelen_lengths[symbol] as u32, 3);
        }

        let codelen_codes = CodeTable::from_lengths(&self.codelen_lengths);
        for entry in &self.rle {
            codelen_codes.write(writer, entry.symbol as u16);
            writer.write_bits(entry.extra as u32, entry.extra_bits());
        }
    }
}

/// Index one past the last non-zero length.
fn last_used(lengths: &[u8]) -> usize {
    lengths.iter().rposition(|&l| l != 0).map_or(0, |i| i + 1)
}

/// Size in bits of `len` bytes written as stored blocks starting at
/// `bit_position`.
pub fn stored_cost(len: usize, bit_position: u64) -> u64 {
    let mut position = bit_position;
    let mut remaining = len;
    loop {
        let n = remaining.min(MAX_STORED_BLOCK);
        position += HEADER_BITS;
        position = position.div_ceil(8) * 8;
        position += 32 + 8 * n as u64;
        remaining -= n;
        if remaining == 0 {
            break;
        }
    }
    position - bit_position
}

/// Size in bits of a fixed Huffman block.
pub fn fixed_cost(stats: &SymbolStats) -> u64 {
    HEADER_BITS
        + stats.coded_bits(&fixed_litlen_lengths(), &fixed_distance_lengths())
        + stats.extra_bits()
}

/// Size in bits of a dynamic Huffman block with the given tables.
pub fn dynamic_cost(stats: &SymbolStats, codes: &DynamicCodes) -> u64 {
    HEADER_BITS
        + codes.header_bits()
        + stats.coded_bits(&codes.litlen.lengths(), &codes.distance.lengths())
        + stats.extra_bits()
}

/// A block ready to be written.
#[derive(Debug, Clone)]
pub enum Block<'a> {
    /// Raw bytes.
    Stored(&'a [u8]),
    /// Tokens coded with the fixed tables.
    Fixed(&'a [Lz77Token]),
    /// Tokens coded with per-block tables.
    Dynamic {
        /// The block's Huffman tables.
        codes: Box<DynamicCodes>,
        /// The block's tokens.
        tokens: &'a [Lz77Token],
    },
}

impl<'a> Block<'a> {
    /// Choose the smallest block type for a chunk.
    ///
    /// `data` is the chunk's input and `tokens` its LZ77 parse. Level 0 only
    /// allows stored blocks and the `fixed` strategy rules out dynamic ones.
    /// On equal size stored wins over fixed and fixed over dynamic.
    pub fn choose(
        data: &'a [u8],
        tokens: &'a [Lz77Token],
        level: u8,
        strategy: Strategy,
        bit_position: u64,
    ) -> Self {
        if level == 0 {
            return Block::Stored(data);
        }

        let stats = SymbolStats::from_tokens(tokens);
        let mut best = Block::Stored(data);
        let mut best_cost = stored_cost(data.len(), bit_position);

        let cost = fixed_cost(&stats);
        if cost < best_cost {
            best = Block::Fixed(tokens);
            best_cost = cost;
        }

        if strategy != Strategy::Fixed {
            let codes = DynamicCodes::build(&stats);
            if dynamic_cost(&stats, &codes) < best_cost {
                best = Block::Dynamic {
                    codes: Box::new(codes),
                    tokens,
                };
            }
        }

        best
    }

    /// The block's type.
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Stored(_) => BlockKind::Stored,
            Block::Fixed(_) => BlockKind::Fixed,
            Block::Dynamic { .. } => BlockKind::Dynamic,
        }
    }

    /// Write the block; returns how many blocks were emitted (a stored
    /// payload may need several).
    pub fn write(&self, writer: &mut BitWriter, is_final: bool) -> usize {
        match self {
            Block::Stored(data) => write_stored(writer, data, is_final),
            Block::Fixed(tokens) => {
                write_header(writer, is_final, BlockKind::Fixed);
                write_tokens(writer, tokens, fixed_litlen_codes(), fixed_distance_codes());
                1
            }
            Block::Dynamic { codes, tokens } => {
                write_header(writer, is_final, BlockKind::Dynamic);
                codes.write_header(writer);
                write_tokens(writer, tokens, &codes.litlen, &codes.distance);
                1
            }
        }
    }
}

fn write_header(writer: &mut BitWriter, is_final: bool, kind: BlockKind) {
    writer.write_bit(is_final);
    writer.write_bits(kind.btype() as u32, 2);
}

/// Write `data` as one or more stored blocks; returns the block count.
pub fn write_stored(writer: &mut BitWriter, data: &[u8], is_final: bool) -> usize {
    let mut pieces = data.chunks(MAX_STORED_BLOCK).peekable();
    if pieces.peek().is_none() {
        write_stored_piece(writer, &[], is_final);
        return 1;
    }

    let mut count = 0;
    while let Some(piece) = pieces.next() {
        let last = pieces.peek().is_none();
        write_stored_piece(writer, piece, is_final && last);
        count += 1;
    }
    count
}

fn write_stored_piece(writer: &mut BitWriter, piece: &[u8], is_final: bool) {
    write_header(writer, is_final, BlockKind::Stored);
    writer.align_to_byte();
    let len = piece.len() as u16;
    writer.write_bits(len as u32, 16);
    writer.write_bits(!len as u32, 16);
    writer.write_bytes(piece);
}

/// Write tokens followed by end-of-block.
fn write_tokens(
    writer: &mut BitWriter,
    tokens: &[Lz77Token],
    litlen: &CodeTable,
    distance: &CodeTable,
) {
    for token in tokens {
        match *token {
            Lz77Token::Literal(byte) => litlen.write(writer, byte as u16),
            Lz77Token::Match {
                length,
                distance: dist,
            } => {
                let (code, extra_bits, extra_value) = length_to_code(length);
                litlen.write(writer, code);
                writer.write_bits(extra_value as u32, extra_bits);

                let (code, extra_bits, extra_value) = distance_to_code(dist);
                distance.write(writer, code);
                writer.write_bits(extra_value as u32, extra_bits);
            }
        }
    }
    litlen.write(writer, END_OF_BLOCK);
}
