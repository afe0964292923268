//! End-to-end scenarios through the public API.

use oxiflate_core::{CompressionConfig, FlateError, Framing, Strategy};
use oxiflate_deflate::{BlockKind, Deflater, compress, decompress, decompress_framed, inspect};

fn lcg_bytes(size: usize) -> Vec<u8> {
    let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
    (0..size)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            (seed >> 32) as u8
        })
        .collect()
}

#[test]
fn empty_input_is_one_final_block() {
    let config = CompressionConfig::new().with_level(6);
    let compressed = compress(b"", &config).unwrap();
    assert_eq!(compressed, [0x03, 0x00]);

    let blocks = inspect(&compressed, 15).unwrap();
    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].is_final);
    assert_eq!(blocks[0].kind, BlockKind::Fixed);
    assert_eq!(blocks[0].output_len, 0);
    assert!(decompress(&compressed, 15).unwrap().is_empty());
}

#[test]
fn repeated_byte_uses_matches() {
    let input = vec![0x41u8; 1000];
    let mut deflater = Deflater::with_level(9).unwrap();
    let compressed = deflater.compress_to_vec(&input);

    assert_ne!(deflater.blocks(), &[BlockKind::Stored]);
    // Stored framing would need 5 bytes on top of the payload
    assert!(compressed.len() < input.len() + 5);
    assert!(compressed.len() < 20);

    let blocks = inspect(&compressed, 15).unwrap();
    assert!(blocks.iter().map(|b| b.matches).sum::<usize>() > 0);
    assert_eq!(decompress(&compressed, 15).unwrap(), input);
}

#[test]
fn random_64k_roundtrips() {
    let input = lcg_bytes(64 * 1024);
    for strategy in Strategy::ALL {
        let config = CompressionConfig::new().with_strategy(strategy);
        let compressed = compress(&input, &config).unwrap();
        assert_eq!(decompress(&compressed, 15).unwrap(), input, "{}", strategy);
    }
}

#[test]
fn huffman_only_emits_no_matches() {
    let input = b"the quick brown fox".repeat(50);
    let config = CompressionConfig::new().with_strategy(Strategy::HuffmanOnly);
    let compressed = compress(&input, &config).unwrap();

    let blocks = inspect(&compressed, 15).unwrap();
    assert!(blocks.iter().all(|b| b.matches == 0));
    assert_eq!(blocks.iter().map(|b| b.literals).sum::<usize>(), input.len());
    assert_eq!(decompress(&compressed, 15).unwrap(), input);

    let default = compress(&input, &CompressionConfig::new()).unwrap();
    let blocks = inspect(&default, 15).unwrap();
    assert!(blocks.iter().map(|b| b.matches).sum::<usize>() > 0);
}

#[test]
fn zlib_trailer_bit_flip_is_detected() {
    let config = CompressionConfig::new().with_framing(Framing::Zlib);
    let mut compressed = compress(b"hello world", &config).unwrap();
    assert_eq!(&compressed[..2], &[0x78, 0x9C]);

    let last = compressed.len() - 1;
    compressed[last] ^= 0x80;
    assert_eq!(
        decompress_framed(&compressed, Framing::Zlib, 15),
        Err(FlateError::ChecksumMismatch {
            expected: 0x1A0B_04DD,
            computed: 0x1A0B_045D
        })
    );
}

#[test]
fn inspect_reports_contiguous_blocks() {
    let mut input = b"block inspection ".repeat(8000);
    input.extend_from_slice(&lcg_bytes(70_000));
    let config = CompressionConfig::new().with_level(8);
    let compressed = compress(&input, &config).unwrap();

    let blocks = inspect(&compressed, 15).unwrap();
    assert!(blocks.len() >= 3);
    assert!(blocks.last().unwrap().is_final);
    assert!(blocks[..blocks.len() - 1].iter().all(|b| !b.is_final));

    let mut output_pos = 0;
    let mut bit_pos = 0;
    for block in &blocks {
        assert_eq!(block.output_start, output_pos);
        assert_eq!(block.start_bit, bit_pos);
        output_pos += block.output_len;
        bit_pos = block.end_bit;
    }
    assert_eq!(output_pos, input.len());
}
