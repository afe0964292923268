//! LZ77 compression for DEFLATE.
//!
//! This module implements the LZ77 algorithm as used in DEFLATE compression.
//! LZ77 finds repeated sequences in the input and replaces them with
//! back-references (length, distance pairs).
//!
//! # Algorithm
//!
//! Candidate positions are found through hash chains keyed on the next three
//! bytes. Chains are walked from the most recent position backwards, so of
//! two equally long matches the closer one wins. How far a chain is followed
//! and when a match is good enough depend on the compression level:
//!
//! - levels 1-3 take the first acceptable match (greedy);
//! - levels 4-9 defer each match by one byte and keep it only if the match
//!   starting at the next byte is not longer (lazy evaluation).
//!
//! The strategy can restrict matching further: `huffman_only` emits literals
//! only, `rle` only looks one byte back, `filtered` drops matches of five
//! bytes or less.

use oxiflate_core::Strategy;
use std::ops::Range;

/// Maximum window size for DEFLATE (32KB).
pub const WINDOW_SIZE: usize = 32768;

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

/// Length-3 matches farther back than this cost more than three literals.
const TOO_FAR: usize = 4096;

/// Longest match the `filtered` strategy still discards.
const FILTERED_MAX_DISCARD: usize = 5;

/// Number of hash bits.
const HASH_BITS: usize = 15;

/// Size of the hash table (power of 2).
const HASH_SIZE: usize = 1 << HASH_BITS;

/// Hash mask.
const HASH_MASK: usize = HASH_SIZE - 1;

/// Empty hash slot / end of chain.
const NIL: usize = usize::MAX;

/// A token produced by LZ77 compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lz77Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to previously seen data.
    Match {
        /// Number of bytes to copy (3-258).
        length: u16,
        /// Distance back into the window (1-32768).
        distance: u16,
    },
}

impl Lz77Token {
    /// Number of input bytes this token stands for.
    pub fn len(&self) -> usize {
        match self {
            Lz77Token::Literal(_) => 1,
            Lz77Token::Match { length, .. } => *length as usize,
        }
    }

    /// Always false: every token covers at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Search parameters for one compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelParams {
    /// Once the deferred match is this long, search chains a quarter as deep.
    pub good_length: usize,
    /// Do not look for a better match once the deferred match is this long.
    pub max_lazy: usize,
    /// Stop searching as soon as a match is this long.
    pub nice_length: usize,
    /// Maximum number of chain entries to examine.
    pub max_chain: usize,
    /// Whether matches are deferred by one byte.
    pub lazy: bool,
}

impl LevelParams {
    /// Parameters for a level (0-9).
    pub fn for_level(level: u8) -> Self {
        let (good_length, max_lazy, nice_length, max_chain, lazy) = match level {
            0 => (0, 0, 0, 0, false),
            1 => (4, 4, 8, 4, false),
            2 => (4, 5, 16, 8, false),
            3 => (4, 6, 32, 32, false),
            4 => (4, 4, 16, 16, true),
            5 => (8, 16, 32, 32, true),
            6 => (8, 16, 128, 128, true),
            7 => (8, 32, 128, 256, true),
            8 => (32, 128, 258, 1024, true),
            _ => (32, 258, 258, 4096, true),
        };

        Self {
            good_length,
            max_lazy,
            nice_length,
            max_chain,
            lazy,
        }
    }
}

/// LZ77 encoder for DEFLATE compression.
///
/// The encoder works on a complete input buffer. [`tokenize`](Self::tokenize)
/// is called for consecutive ranges of that buffer; matches never cross the
/// end of a range but may reach back into earlier ranges.
#[derive(Debug)]
pub struct Lz77Encoder {
    /// Search parameters.
    params: LevelParams,
    /// Compression level (0-9).
    level: u8,
    /// Match-finding strategy.
    strategy: Strategy,
    /// Maximum back-reference distance.
    window_size: usize,
    /// Hash table: most recent position per hash.
    head: Vec<usize>,
    /// Hash chain: previous position with the same hash, by `pos % window_size`.
    prev: Vec<usize>,
    /// End of the last range tokenized.
    next_pos: usize,
}

impl Lz77Encoder {
    /// Create a new LZ77 encoder with default settings.
    pub fn new() -> Self {
        Self::with_level(6)
    }

    /// Create an encoder with the specified compression level (0-9), the
    /// default strategy and a 32 KiB window.
    pub fn with_level(level: u8) -> Self {
        Self::with_config(level, Strategy::Default, 15)
    }

    /// Create an encoder for a level, strategy and window size.
    pub fn with_config(level: u8, strategy: Strategy, window_bits: u8) -> Self {
        let level = level.min(9);
        let window_size = 1usize << window_bits;
        let chained = level > 0
            && matches!(
                strategy,
                Strategy::Default | Strategy::Filtered | Strategy::Fixed
            );

        Self {
            params: LevelParams::for_level(level),
            level,
            strategy,
            window_size,
            head: if chained { vec![NIL; HASH_SIZE] } else { Vec::new() },
            prev: if chained { vec![NIL; window_size] } else { Vec::new() },
            next_pos: 0,
        }
    }

    /// Search parameters in use.
    pub fn params(&self) -> LevelParams {
        self.params
    }

    /// Compress all data at once (convenience method).
    pub fn compress_all(input: &[u8], level: u8) -> Vec<Lz77Token> {
        let mut encoder = Self::with_level(level);
        let mut tokens = Vec::with_capacity(input.len());
        encoder.tokenize(input, 0..input.len(), &mut tokens);
        tokens
    }

    /// Tokenize `data[range]`, appending to `tokens`.
    ///
    /// Ranges must be passed in order without gaps, starting at 0.
    pub fn tokenize(&mut self, data: &[u8], range: Range<usize>, tokens: &mut Vec<Lz77Token>) {
        debug_assert_eq!(range.start, self.next_pos, "ranges must be consecutive");
        debug_assert!(range.end <= data.len());
        self.next_pos = range.end;

        if self.level == 0 {
            tokens.extend(data[range].iter().map(|&b| Lz77Token::Literal(b)));
            return;
        }

        match self.strategy {
            Strategy::HuffmanOnly => {
                tokens.extend(data[range].iter().map(|&b| Lz77Token::Literal(b)));
            }
            Strategy::Rle => Self::tokenize_rle(data, range, tokens),
            Strategy::Default | Strategy::Filtered | Strategy::Fixed => {
                if self.params.lazy {
                    self.tokenize_lazy(data, range, tokens);
                } else {
                    self.tokenize_greedy(data, range, tokens);
                }
            }
        }
    }

    /// Compute hash for 3 bytes.
    #[inline(always)]
    fn hash(b0: u8, b1: u8, b2: u8) -> usize {
        let h = ((b0 as usize).wrapping_mul(506832829))
            ^ ((b1 as usize).wrapping_mul(2654435761) << 8)
            ^ ((b2 as usize).wrapping_mul(374761393) << 16);
        (h ^ (h >> 15)) & HASH_MASK
    }

    #[inline]
    fn hash_at(data: &[u8], pos: usize) -> usize {
        Self::hash(data[pos], data[pos + 1], data[pos + 2])
    }

    /// Insert a position into its hash chain.
    #[inline]
    fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + MIN_MATCH > data.len() {
            return;
        }
        let h = Self::hash_at(data, pos);
        self.prev[pos & (self.window_size - 1)] = self.head[h];
        self.head[h] = pos;
    }

    /// Whether a found match is not worth emitting.
    #[inline]
    fn reject(&self, length: usize, distance: usize) -> bool {
        length <= FILTERED_MAX_DISCARD
            && (self.strategy == Strategy::Filtered || (length == MIN_MATCH && distance > TOO_FAR))
    }

    /// Find the longest match at `pos` that is longer than `prev_len` and
    /// does not extend past `end`.
    ///
    /// Must be called before `pos` itself is inserted.
    fn longest_match(
        &self,
        data: &[u8],
        pos: usize,
        end: usize,
        prev_len: usize,
    ) -> Option<(usize, usize)> {
        let max_len = (end - pos).min(MAX_MATCH);
        if max_len < MIN_MATCH || prev_len >= max_len {
            return None;
        }

        let limit = pos.saturating_sub(self.window_size);
        let nice_length = self.params.nice_length.min(max_len);
        let mut chain = self.params.max_chain;
        if prev_len >= self.params.good_length {
            chain >>= 2;
        }

        let current = &data[pos..pos + max_len];
        let mut best_len = prev_len;
        let mut best_dist = 0;
        let mut candidate = self.head[Self::hash_at(data, pos)];

        while candidate != NIL && candidate >= limit && chain > 0 {
            let start = candidate;
            let earlier = &data[start..start + max_len];

            // Cheap rejection: a longer match must agree at best_len
            if earlier[best_len] == current[best_len] {
                let len = earlier
                    .iter()
                    .zip(current)
                    .take_while(|(a, b)| a == b)
                    .count();
                if len > best_len {
                    best_len = len;
                    best_dist = pos - start;
                    if len >= nice_length {
                        break;
                    }
                }
            }

            let next = self.prev[start & (self.window_size - 1)];
            if next == NIL || next >= candidate {
                break;
            }
            candidate = next;
            chain -= 1;
        }

        if best_dist > 0 && best_len >= MIN_MATCH {
            Some((best_len, best_dist))
        } else {
            None
        }
    }

    /// Longest acceptable match at `pos`, if any.
    #[inline]
    fn find_match(
        &self,
        data: &[u8],
        pos: usize,
        end: usize,
        prev_len: usize,
    ) -> Option<(usize, usize)> {
        self.longest_match(data, pos, end, prev_len)
            .filter(|&(length, distance)| !self.reject(length, distance))
    }

    fn tokenize_greedy(&mut self, data: &[u8], range: Range<usize>, tokens: &mut Vec<Lz77Token>) {
        let end = range.end;
        let mut pos = range.start;

        while pos < end {
            let found = self.find_match(data, pos, end, MIN_MATCH - 1);
            self.insert(data, pos);

            match found {
                Some((length, distance)) => {
                    tokens.push(Lz77Token::Match {
                        length: length as u16,
                        distance: distance as u16,
                    });
                    for p in pos + 1..pos + length {
                        self.insert(data, p);
                    }
                    pos += length;
                }
                None => {
                    tokens.push(Lz77Token::Literal(data[pos]));
                    pos += 1;
                }
            }
        }
    }

    fn tokenize_lazy(&mut self, data: &[u8], range: Range<usize>, tokens: &mut Vec<Lz77Token>) {
        let end = range.end;
        let mut pos = range.start;
        // Match found at pos - 1 and not yet emitted
        let mut deferred: Option<(usize, usize)> = None;
        // Whether the byte at pos - 1 still needs a token
        let mut pending = false;

        while pos < end {
            let prev_len = deferred.map_or(MIN_MATCH - 1, |(length, _)| length);
            let found = if prev_len < self.params.max_lazy {
                self.find_match(data, pos, end, prev_len)
            } else {
                None
            };
            self.insert(data, pos);

            match (deferred, found) {
                (Some((length, distance)), None) => {
                    tokens.push(Lz77Token::Match {
                        length: length as u16,
                        distance: distance as u16,
                    });
                    // pos - 1 and pos are already inserted
                    let match_end = pos - 1 + length;
                    for p in pos + 1..match_end {
                        self.insert(data, p);
                    }
                    pos = match_end;
                    deferred = None;
                    pending = false;
                }
                (_, found) => {
                    if pending {
                        tokens.push(Lz77Token::Literal(data[pos - 1]));
                    }
                    deferred = found;
                    pending = true;
                    pos += 1;
                }
            }
        }

        // A deferred match always ends at or before `end`, so it has been
        // emitted by now; only a literal can be left.
        debug_assert!(deferred.is_none());
        if pending {
            tokens.push(Lz77Token::Literal(data[pos - 1]));
        }
    }

    fn tokenize_rle(data: &[u8], range: Range<usize>, tokens: &mut Vec<Lz77Token>) {
        let end = range.end;
        let mut pos = range.start;

        while pos < end {
            let max_len = (end - pos).min(MAX_MATCH);
            let run = if pos > 0 && max_len >= MIN_MATCH {
                let byte = data[pos - 1];
                data[pos..pos + max_len]
                    .iter()
                    .take_while(|&&b| b == byte)
                    .count()
            } else {
                0
            };

            if run >= MIN_MATCH {
                tokens.push(Lz77Token::Match {
                    length: run as u16,
                    distance: 1,
                });
                pos += run;
            } else {
                tokens.push(Lz77Token::Literal(data[pos]));
                pos += 1;
            }
        }
    }
}

impl Default for Lz77Encoder {
    fn default() -> Self {
        Self::new()
    }
}
