//! Property tests over the whole configuration surface.

use oxiflate_core::{CompressionConfig, Framing, Strategy as FlateStrategy};
use oxiflate_deflate::block::{DynamicCodes, SymbolStats};
use oxiflate_deflate::huffman::{HuffmanBuilder, MAX_CODE_LENGTH, is_complete};
use oxiflate_deflate::lz77::{Lz77Encoder, Lz77Token};
use oxiflate_deflate::{compress, decompress_framed};
use proptest::prelude::*;

fn any_strategy() -> impl Strategy<Value = FlateStrategy> {
    prop::sample::select(FlateStrategy::ALL.to_vec())
}

fn any_framing() -> impl Strategy<Value = Framing> {
    prop::sample::select(vec![Framing::Raw, Framing::Zlib])
}

/// Byte strings with plenty of repeats so every block type shows up.
fn compressible() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec((0u8..4, 1usize..40), 0..200).prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(byte, len)| std::iter::repeat_n(b'a' + byte, len))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_roundtrip_any_config(
        data in prop::collection::vec(any::<u8>(), 0..4000),
        level in -1i8..=9,
        window_bits in 9u8..=15,
        strategy in any_strategy(),
        framing in any_framing(),
    ) {
        let config = CompressionConfig::new()
            .with_level(level)
            .with_window_bits(window_bits)
            .with_strategy(strategy)
            .with_framing(framing);
        let compressed = compress(&data, &config).unwrap();
        let decompressed = decompress_framed(&compressed, framing, window_bits).unwrap();
        prop_assert_eq!(decompressed, data);
    }

    #[test]
    fn prop_roundtrip_compressible(
        data in compressible(),
        level in 0i8..=9,
        window_bits in 9u8..=15,
        strategy in any_strategy(),
    ) {
        let config = CompressionConfig::new()
            .with_level(level)
            .with_window_bits(window_bits)
            .with_strategy(strategy);
        let compressed = compress(&data, &config).unwrap();
        let decompressed = decompress_framed(&compressed, Framing::Raw, window_bits).unwrap();
        prop_assert_eq!(decompressed, data);
    }

    #[test]
    fn prop_deterministic(data in compressible(), level in 0i8..=9, strategy in any_strategy()) {
        let config = CompressionConfig::new().with_level(level).with_strategy(strategy);
        prop_assert_eq!(compress(&data, &config).unwrap(), compress(&data, &config).unwrap());
    }

    #[test]
    fn prop_built_codes_are_complete(freqs in prop::collection::vec(0u32..10_000, 2..286)) {
        let mut builder = HuffmanBuilder::new(freqs.len(), MAX_CODE_LENGTH as u8);
        for (symbol, &count) in freqs.iter().enumerate() {
            builder.add_count(symbol as u16, count);
        }
        let lengths = builder.build_lengths();
        prop_assert!(lengths.iter().all(|&l| usize::from(l) <= MAX_CODE_LENGTH));
        prop_assert!(is_complete(&lengths));
        for (i, &count) in freqs.iter().enumerate() {
            if count > 0 {
                prop_assert!(lengths[i] > 0);
            }
        }
    }

    #[test]
    fn prop_dynamic_tables_are_complete(data in compressible(), level in 1u8..=9) {
        let tokens = Lz77Encoder::compress_all(&data, level);
        let codes = DynamicCodes::build(&SymbolStats::from_tokens(&tokens));
        prop_assert!(is_complete(&codes.litlen.lengths()));
        prop_assert!(is_complete(&codes.distance.lengths()));
        prop_assert!(is_complete(&codes.codelen_lengths));
        prop_assert!(codes.codelen_lengths.iter().all(|&l| l <= 7));
    }

    #[test]
    fn prop_matches_respect_window(data in compressible(), window_bits in 9u8..=15) {
        let mut encoder = Lz77Encoder::with_config(9, FlateStrategy::Default, window_bits);
        let mut tokens = Vec::new();
        encoder.tokenize(&data, 0..data.len(), &mut tokens);

        let mut pos = 0usize;
        for token in &tokens {
            if let Lz77Token::Match { length, distance } = *token {
                prop_assert!((3..=258).contains(&length));
                prop_assert!(distance as usize <= 1 << window_bits);
                prop_assert!(distance as usize <= pos);
            }
            pos += token.len();
        }
        prop_assert_eq!(pos, data.len());
    }
}
