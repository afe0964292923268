//! Huffman coding for DEFLATE compression.
//!
//! This module implements Huffman code construction and decoding as specified
//! in RFC 1951. DEFLATE uses canonical Huffman codes, where codes of the same
//! length are assigned consecutive values in symbol order, so a code is fully
//! described by its per-symbol bit lengths.
//!
//! # Alphabets
//!
//! DEFLATE uses three Huffman alphabets:
//! - **Literal/Length**: 0-285 (0-255 literals, 256 EOB, 257-285 lengths)
//! - **Distance**: 0-29 (back-reference distances)
//! - **Code Length**: 0-18 (for encoding dynamic Huffman trees)
//!
//! # Encoding
//!
//! [`HuffmanBuilder`] turns symbol frequencies into optimal length-limited
//! code lengths with the package-merge algorithm, and [`CodeTable`] assigns
//! the canonical codes. Codes are stored bit-reversed so they can be handed
//! straight to the LSB-first [`BitWriter`].
//!
//! # Decoding
//!
//! [`HuffmanTree`] resolves codes of up to 9 bits with a single table lookup
//! and walks the canonical code one length at a time for longer codes.

use oxiflate_core::error::{FlateError, Result};
use oxiflate_core::{BitReader, BitWriter};

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LENGTH: usize = 15;

/// Maximum code length for the code length alphabet (7 bits).
pub const MAX_CODELEN_CODE_LENGTH: u8 = 7;

/// Size of the literal/length alphabet (0-285).
pub const LITLEN_ALPHABET_SIZE: usize = 286;

/// Size of the distance alphabet (0-29).
pub const DISTANCE_ALPHABET_SIZE: usize = 30;

/// Size of the code length alphabet (0-18).
pub const CODELEN_ALPHABET_SIZE: usize = 19;

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// Which alphabet a decoding table is built for.
///
/// The alphabets differ in which incomplete codes a stream may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    /// Literal/length alphabet; must contain the end-of-block symbol.
    LitLen,
    /// Distance alphabet; may be empty for literal-only blocks.
    Distance,
    /// Code length alphabet of a dynamic block header; must be complete.
    CodeLength,
}

/// Check whether code lengths fill the code space exactly (Kraft equality).
pub fn is_complete(code_lengths: &[u8]) -> bool {
    let mut space = 0u64;
    for &len in code_lengths {
        if len > 0 {
            space += 1u64 << (MAX_CODE_LENGTH - len as usize);
        }
    }
    space == 1u64 << MAX_CODE_LENGTH
}

/// Reverse the low `length` bits of a code.
pub fn reverse_bits(code: u16, length: u8) -> u16 {
    if length == 0 {
        return 0;
    }
    code.reverse_bits() >> (16 - length as u32)
}

/// A Huffman tree for decoding.
///
/// Codes up to `FAST_BITS` long are resolved through a direct lookup table
/// indexed by the next (bit-reversed) input bits. Longer codes fall back to
/// a canonical walk over `counts` and `symbols`.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    /// Direct lookup table. Entry format: `symbol << 4 | code_length`,
    /// zero when the prefix is not a complete short code.
    fast_table: Vec<u16>,
    /// Maximum code length in this tree (0 for an empty tree).
    max_code_length: u8,
    /// Number of codes of each length.
    counts: [u16; MAX_CODE_LENGTH + 1],
    /// Symbols ordered by (code length, symbol).
    symbols: Vec<u16>,
}

impl HuffmanTree {
    /// Number of bits for fast lookup table.
    const FAST_BITS: u8 = 9;

    /// Build a Huffman tree from code lengths.
    ///
    /// `code_lengths[i]` is the bit length for symbol `i`; a length of 0 means
    /// the symbol is not used. Over-subscribed codes are rejected, incomplete
    /// codes are accepted (see [`checked`](Self::checked) for stream rules).
    pub fn from_code_lengths(code_lengths: &[u8]) -> Result<Self> {
        Self::build(code_lengths, 0)
    }

    /// Build a tree for a code read from a stream, applying the rules for
    /// its alphabet.
    ///
    /// - over-subscribed codes are always invalid;
    /// - an incomplete code is only accepted when it is a single one-bit code
    ///   of the literal/length or distance alphabet;
    /// - an empty code is accepted, and fails if a symbol is ever decoded;
    /// - a literal/length code without an end-of-block code is invalid.
    pub fn checked(code_lengths: &[u8], kind: CodeKind, bit_position: u64) -> Result<Self> {
        let tree = Self::build(code_lengths, bit_position)?;

        if tree.max_code_length > 0 && !is_complete(code_lengths) {
            let single_bit = tree.max_code_length == 1 && kind != CodeKind::CodeLength;
            if !single_bit {
                return Err(FlateError::invalid_huffman(
                    bit_position,
                    format!("incomplete {} code", kind.name()),
                ));
            }
        }

        if kind == CodeKind::LitLen
            && code_lengths
                .get(END_OF_BLOCK as usize)
                .is_none_or(|&len| len == 0)
        {
            return Err(FlateError::invalid_huffman(
                bit_position,
                "missing end-of-block code",
            ));
        }

        Ok(tree)
    }

    fn build(code_lengths: &[u8], bit_position: u64) -> Result<Self> {
        let mut counts = [0u16; MAX_CODE_LENGTH + 1];
        let mut max_length = 0u8;

        for &len in code_lengths {
            if len as usize > MAX_CODE_LENGTH {
                return Err(FlateError::invalid_huffman(
                    bit_position,
                    format!("code length {} exceeds maximum {}", len, MAX_CODE_LENGTH),
                ));
            }
            if len > 0 {
                counts[len as usize] += 1;
                max_length = max_length.max(len);
            }
        }

        // Walk the code space to detect over-subscription
        let mut left = 1i32;
        for &count in &counts[1..] {
            left <<= 1;
            left -= count as i32;
            if left < 0 {
                return Err(FlateError::invalid_huffman(
                    bit_position,
                    "over-subscribed code lengths",
                ));
            }
        }

        // Offsets of the first symbol of each length in `symbols`
        let mut offsets = [0u16; MAX_CODE_LENGTH + 2];
        for len in 1..=MAX_CODE_LENGTH {
            offsets[len + 1] = offsets[len] + counts[len];
        }

        let mut symbols = vec![0u16; offsets[MAX_CODE_LENGTH + 1] as usize];
        for (symbol, &len) in code_lengths.iter().enumerate() {
            if len > 0 {
                let slot = &mut offsets[len as usize];
                symbols[*slot as usize] = symbol as u16;
                *slot += 1;
            }
        }

        // Fill the fast table from the canonical codes
        let mut fast_table = vec![0u16; 1 << Self::FAST_BITS];
        let mut code = 0u16;
        let mut index = 0usize;
        for len in 1..=Self::FAST_BITS.min(max_length) {
            for _ in 0..counts[len as usize] {
                let symbol = symbols[index];
                let reversed = reverse_bits(code, len) as usize;
                let entry = (symbol << 4) | len as u16;
                let mut slot = reversed;
                while slot < fast_table.len() {
                    fast_table[slot] = entry;
                    slot += 1 << len;
                }
                code += 1;
                index += 1;
            }
            code <<= 1;
        }

        Ok(Self {
            fast_table,
            max_code_length: max_length,
            counts,
            symbols,
        })
    }

    /// Maximum code length in this tree.
    pub fn max_code_length(&self) -> u8 {
        self.max_code_length
    }

    /// Number of symbols that have a code.
    pub fn num_codes(&self) -> usize {
        self.symbols.len()
    }

    /// Decode a symbol from the bit stream.
    ///
    /// Consumes exactly the bits of the matched code.
    #[inline]
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        if self.max_code_length == 0 {
            return Err(FlateError::invalid_huffman(
                reader.bit_position(),
                "symbol decoded from an empty code",
            ));
        }

        let bits = reader.peek_bits(Self::FAST_BITS);
        let entry = self.fast_table[bits as usize];
        if entry != 0 {
            reader.skip_bits((entry & 0xF) as u8)?;
            return Ok(entry >> 4);
        }

        self.decode_slow(reader)
    }

    /// Canonical decode, one code length at a time.
    fn decode_slow(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        let bits = reader.peek_bits(MAX_CODE_LENGTH as u8);

        let mut code = 0i32; // bits of the code so far, MSB-first
        let mut first = 0i32; // first code of the current length
        let mut index = 0i32; // index of that code's symbol in `symbols`

        for len in 1..=self.max_code_length as usize {
            code |= ((bits >> (len - 1)) & 1) as i32;
            let count = self.counts[len] as i32;
            if code - first < count {
                reader.skip_bits(len as u8)?;
                return Ok(self.symbols[(index + code - first) as usize]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }

        if reader.bits_remaining() < self.max_code_length as u64 {
            return Err(FlateError::truncated(
                reader.bit_position() + reader.bits_remaining(),
            ));
        }

        Err(FlateError::invalid_huffman(
            reader.bit_position(),
            "no code matches the input bits",
        ))
    }
}

impl CodeKind {
    fn name(&self) -> &'static str {
        match self {
            CodeKind::LitLen => "literal/length",
            CodeKind::Distance => "distance",
            CodeKind::CodeLength => "code length",
        }
    }
}

/// A single encoder code, bit-reversed for LSB-first output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanCode {
    /// The code bits, reversed.
    pub code: u16,
    /// Number of bits in the code (0 for an unused symbol).
    pub length: u8,
}

/// Canonical encoder codes for one alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<HuffmanCode>,
}

impl CodeTable {
    /// Assign canonical codes to the given code lengths (RFC 1951 3.2.2).
    pub fn from_lengths(code_lengths: &[u8]) -> Self {
        let mut bl_count = [0u16; MAX_CODE_LENGTH + 1];
        for &len in code_lengths {
            if len > 0 {
                bl_count[len as usize] += 1;
            }
        }

        let mut next_code = [0u16; MAX_CODE_LENGTH + 1];
        let mut code = 0u16;
        for bits in 1..=MAX_CODE_LENGTH {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
        }

        let codes = code_lengths
            .iter()
            .map(|&len| {
                if len == 0 {
                    HuffmanCode::default()
                } else {
                    let code = next_code[len as usize];
                    next_code[len as usize] += 1;
                    HuffmanCode {
                        code: reverse_bits(code, len),
                        length: len,
                    }
                }
            })
            .collect();

        Self { codes }
    }

    /// Get the code for a symbol.
    #[inline]
    pub fn get(&self, symbol: u16) -> HuffmanCode {
        self.codes[symbol as usize]
    }

    /// Code length of a symbol (0 if unused).
    #[inline]
    pub fn length(&self, symbol: u16) -> u8 {
        self.codes[symbol as usize].length
    }

    /// Code lengths of the whole alphabet.
    pub fn lengths(&self) -> Vec<u8> {
        self.codes.iter().map(|c| c.length).collect()
    }

    /// Number of symbols in the alphabet.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the alphabet is empty.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Write the code for a symbol.
    #[inline]
    pub fn write(&self, writer: &mut BitWriter, symbol: u16) {
        let code = self.codes[symbol as usize];
        debug_assert!(code.length > 0, "symbol {} has no code", symbol);
        writer.write_bits(code.code as u32, code.length);
    }
}

/// Builder for creating Huffman code lengths from frequencies.
#[derive(Debug, Clone)]
pub struct HuffmanBuilder {
    frequencies: Vec<u32>,
    max_length: u8,
}

impl HuffmanBuilder {
    /// Create a new Huffman builder.
    pub fn new(alphabet_size: usize, max_length: u8) -> Self {
        debug_assert!(alphabet_size >= 2, "alphabet needs at least two symbols");
        debug_assert!(
            alphabet_size <= 1 << max_length,
            "alphabet does not fit in {} bits",
            max_length
        );
        Self {
            frequencies: vec![0; alphabet_size],
            max_length,
        }
    }

    /// Add a symbol occurrence.
    pub fn add(&mut self, symbol: u16) {
        self.add_count(symbol, 1);
    }

    /// Add multiple occurrences of a symbol.
    pub fn add_count(&mut self, symbol: u16, count: u32) {
        if let Some(freq) = self.frequencies.get_mut(symbol as usize) {
            *freq += count;
        }
    }

    /// Frequencies collected so far.
    pub fn frequencies(&self) -> &[u32] {
        &self.frequencies
    }

    /// Build code lengths from frequencies.
    ///
    /// Returns an array where `result[i]` is the code length for symbol `i`.
    /// The lengths always describe a complete code: when fewer than two
    /// symbols occur, a second symbol is given a code as well so that both
    /// get one bit.
    pub fn build_lengths(&self) -> Vec<u8> {
        let n = self.frequencies.len();
        let mut lengths = vec![0u8; n];

        let mut used: Vec<usize> = (0..n).filter(|&i| self.frequencies[i] > 0).collect();

        match used.len() {
            0 => {
                lengths[0] = 1;
                lengths[1] = 1;
                return lengths;
            }
            1 => {
                let other = if used[0] == 0 { 1 } else { 0 };
                lengths[used[0]] = 1;
                lengths[other] = 1;
                return lengths;
            }
            _ => {}
        }

        // Lighter items end up deeper. On equal frequency the higher symbol
        // goes first so the lower symbol never gets the longer code.
        used.sort_by(|&a, &b| {
            self.frequencies[a]
                .cmp(&self.frequencies[b])
                .then(b.cmp(&a))
        });

        let weights: Vec<u64> = used.iter().map(|&i| self.frequencies[i] as u64).collect();
        for (len, &symbol) in package_merge(&weights, self.max_length).iter().zip(&used) {
            lengths[symbol] = *len;
        }

        lengths
    }
}

/// A node of one package-merge level: either a leaf or a package of two
/// nodes from the level below.
#[derive(Debug, Clone, Copy)]
struct Node {
    weight: u64,
    leaf: Option<usize>,
}

/// Package-merge algorithm for length-limited Huffman codes.
///
/// `weights` must be sorted ascending and hold at least two entries. The
/// returned lengths are aligned with `weights` and never exceed `max_length`.
fn package_merge(weights: &[u64], max_length: u8) -> Vec<u8> {
    let n = weights.len();
    let leaves: Vec<Node> = weights
        .iter()
        .enumerate()
        .map(|(i, &weight)| Node {
            weight,
            leaf: Some(i),
        })
        .collect();

    // levels[0] is the deepest level (leaves only); the last is the top.
    let mut levels: Vec<Vec<Node>> = Vec::with_capacity(max_length as usize);
    levels.push(leaves.clone());

    for _ in 1..max_length {
        let merged = {
            let below = &levels[levels.len() - 1];
            let mut packages = below
                .chunks_exact(2)
                .map(|pair| Node {
                    weight: pair[0].weight + pair[1].weight,
                    leaf: None,
                })
                .peekable();
            let mut singles = leaves.iter().copied().peekable();

            let mut merged = Vec::with_capacity(n + below.len() / 2);
            loop {
                let take_leaf = match (singles.peek(), packages.peek()) {
                    (Some(leaf), Some(package)) => leaf.weight <= package.weight,
                    (Some(_), None) => true,
                    (None, Some(_)) => false,
                    (None, None) => break,
                };
                let node = if take_leaf {
                    singles.next()
                } else {
                    packages.next()
                };
                merged.extend(node);
            }
            merged
        };
        levels.push(merged);
    }

    // Select the 2n-2 cheapest items of the top level and follow the
    // packages down; each selection of a leaf adds one bit to its code.
    let mut lengths = vec![0u8; n];
    let mut take = 2 * n - 2;
    for level in levels.iter().rev() {
        let mut packages = 0;
        for node in level.iter().take(take) {
            match node.leaf {
                Some(i) => lengths[i] += 1,
                None => packages += 1,
            }
        }
        take = 2 * packages;
    }

    lengths
}
