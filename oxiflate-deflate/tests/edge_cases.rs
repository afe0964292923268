//! Edge case tests for DEFLATE compression.

use oxiflate_core::{BitWriter, CompressionConfig, FlateError, Framing, Strategy};
use oxiflate_deflate::tables::{
    distance_to_code, fixed_distance_codes, fixed_litlen_codes, length_to_code,
};
use oxiflate_deflate::{
    BlockKind, Deflater, compress, decompress, decompress_framed, deflate, inflate,
};

/// Reproducible pseudo-random bytes.
fn lcg_bytes(size: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..size)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as u8
        })
        .collect()
}

/// Final fixed block with one literal followed by a back-reference.
fn fixed_block_with_match(literal: u8, length: u16, distance: u16) -> Vec<u8> {
    let litlen = fixed_litlen_codes();
    let dist = fixed_distance_codes();
    let mut writer = BitWriter::new();
    writer.write_bits(1, 1);
    writer.write_bits(1, 2);
    litlen.write(&mut writer, u16::from(literal));

    let (code, extra_bits, extra) = length_to_code(length);
    litlen.write(&mut writer, code);
    writer.write_bits(u32::from(extra), extra_bits);
    let (code, extra_bits, extra) = distance_to_code(distance);
    dist.write(&mut writer, code);
    writer.write_bits(u32::from(extra), extra_bits);

    litlen.write(&mut writer, 256);
    writer.finish()
}

#[test]
fn test_empty_input() {
    for level in 0..=9 {
        let compressed = deflate(b"", level).unwrap();
        assert!(inflate(&compressed).unwrap().is_empty());
    }
}

#[test]
fn test_single_byte() {
    for level in 0..=9 {
        let compressed = deflate(b"A", level).unwrap();
        assert_eq!(inflate(&compressed).unwrap(), b"A");
    }
}

#[test]
fn test_all_zeros() {
    let input = vec![0u8; 1000];
    let compressed = deflate(&input, 6).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
    assert!(compressed.len() < input.len() / 10);
}

#[test]
fn test_all_same_byte() {
    let input = vec![255u8; 5000];
    let compressed = deflate(&input, 6).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
    assert!(compressed.len() < input.len() / 20);
}

#[test]
fn test_max_match_length() {
    let input = vec![42u8; 258 * 10];
    let compressed = deflate(&input, 9).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
}

#[test]
fn test_incompressible_data() {
    let input = lcg_bytes(20_000, 7);
    for level in [1, 6, 9] {
        let mut deflater = Deflater::with_level(level).unwrap();
        let compressed = deflater.compress_to_vec(&input);
        assert_eq!(inflate(&compressed).unwrap(), input);
        // Never worse than stored framing
        assert!(compressed.len() <= input.len() + 5);
        assert!(deflater.blocks().contains(&BlockKind::Stored));
    }
}

#[test]
fn test_binary_data() {
    let input: Vec<u8> = (0..=255).cycle().take(5000).collect();
    let compressed = deflate(&input, 6).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
}

#[test]
fn test_long_distance_match() {
    let mut input = vec![0u8; 32768];
    let pattern = b"PATTERN_TO_MATCH";
    input[..pattern.len()].copy_from_slice(pattern);
    input[32768 - pattern.len()..].copy_from_slice(pattern);

    for level in [1, 9] {
        let compressed = deflate(&input, level).unwrap();
        assert_eq!(inflate(&compressed).unwrap(), input);
    }
}

#[test]
fn test_utf8_text() {
    let input = "Grüße aus Köln. 日本語のテキスト。 Ελληνικά. ".repeat(64);
    let compressed = deflate(input.as_bytes(), 6).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input.as_bytes());
}

#[test]
fn test_small_window_roundtrip() {
    let mut input = lcg_bytes(600, 3);
    let copy = input.clone();
    input.extend_from_slice(&copy);

    let config = CompressionConfig::new().with_level(9).with_window_bits(9);
    let compressed = compress(&input, &config).unwrap();
    assert_eq!(decompress(&compressed, 9).unwrap(), input);
}

#[test]
fn test_distance_beyond_window() {
    // A 600-byte repeat is only reachable with a window above 512 bytes
    let mut input = lcg_bytes(600, 11);
    let copy = input.clone();
    input.extend_from_slice(&copy);

    let compressed = deflate(&input, 6).unwrap();
    assert_eq!(decompress(&compressed, 15).unwrap(), input);
    assert!(matches!(
        decompress(&compressed, 9),
        Err(FlateError::WindowSizeExceeded { window_size: 512, .. })
    ));
}

#[test]
fn test_handcrafted_window_violation() {
    let stream = fixed_block_with_match(b'a', 3, 513);
    assert_eq!(
        decompress(&stream, 9),
        Err(FlateError::WindowSizeExceeded {
            distance: 513,
            window_size: 512
        })
    );
    // Within the window the distance still reaches before the output
    assert_eq!(
        decompress(&stream, 15),
        Err(FlateError::InvalidDistance {
            distance: 513,
            history_size: 1
        })
    );

    let stream = fixed_block_with_match(b'a', 10, 1);
    assert_eq!(decompress(&stream, 9).unwrap(), vec![b'a'; 11]);
}

#[test]
fn test_large_repetitive_input() {
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    let input: Vec<u8> = pattern.iter().copied().cycle().take(1024 * 1024).collect();

    for strategy in [Strategy::Default, Strategy::Rle] {
        let config = CompressionConfig::new().with_level(5).with_strategy(strategy);
        let compressed = compress(&input, &config).unwrap();
        let decompressed = inflate(&compressed).unwrap();
        assert_eq!(decompressed.len(), 1024 * 1024);
        assert_eq!(decompressed, input);
    }
}

#[test]
fn test_large_random_input() {
    let input = lcg_bytes(1 << 20, 42);

    for framing in [Framing::Raw, Framing::Zlib] {
        for level in [0, 1, 6, 9] {
            let config = CompressionConfig::new()
                .with_level(level)
                .with_framing(framing);
            let compressed = compress(&input, &config).unwrap();
            assert_eq!(
                decompress_framed(&compressed, framing, 15).unwrap(),
                input,
                "level {} {}",
                level,
                framing
            );
        }
        for strategy in Strategy::ALL {
            let config = CompressionConfig::new()
                .with_window_bits(11)
                .with_strategy(strategy)
                .with_framing(framing);
            let compressed = compress(&input, &config).unwrap();
            assert_eq!(
                decompress_framed(&compressed, framing, 11).unwrap(),
                input,
                "{} {}",
                strategy,
                framing
            );
        }
    }
}

#[test]
fn test_stored_block_boundaries() {
    for size in [65_534, 65_535, 65_536, 131_070, 131_071] {
        let input = lcg_bytes(size, size as u64);
        let compressed = deflate(&input, 0).unwrap();
        let blocks = size.div_ceil(65_535);
        assert_eq!(compressed.len(), size + 5 * blocks);
        assert_eq!(inflate(&compressed).unwrap(), input);
    }
}
