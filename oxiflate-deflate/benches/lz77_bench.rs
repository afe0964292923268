//! Benchmarks for LZ77 match finding.
//!
//! Measures tokenization throughput per level and strategy on data with
//! different amounts of redundancy.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxiflate_core::Strategy;
use oxiflate_deflate::lz77::Lz77Encoder;
use std::hint::black_box;

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

mod test_data {
    /// Random data - no matches to find
    pub fn random(size: usize) -> Vec<u8> {
        let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
        (0..size)
            .map(|_| {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                (seed >> 32) as u8
            })
            .collect()
    }

    /// Short repeating pattern - long matches everywhere
    pub fn repeated(size: usize) -> Vec<u8> {
        b"TOBEORNOTTOBEORTOBEORNOT".iter().copied().cycle().take(size).collect()
    }

    /// Text-like data with word-level repeats
    pub fn text_like(size: usize) -> Vec<u8> {
        let words: [&[u8]; 8] = [
            b"deflate ", b"window ", b"huffman ", b"the ", b"match ", b"of ", b"block ",
            b"length ",
        ];
        let mut seed: u32 = 17;
        let mut data = Vec::with_capacity(size + 8);
        while data.len() < size {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
            data.extend_from_slice(words[(seed >> 16) as usize % words.len()]);
        }
        data.truncate(size);
        data
    }
}

fn bench_lz77_levels(c: &mut Criterion) {
    let patterns: [(&str, PatternGenerator); 3] = [
        ("random", test_data::random),
        ("repeated", test_data::repeated),
        ("text", test_data::text_like),
    ];
    let size = 256 * 1024;

    for (name, generator) in patterns {
        let data = generator(size);
        let mut group = c.benchmark_group(format!("lz77_{}", name));
        group.throughput(Throughput::Bytes(size as u64));

        for level in [1u8, 4, 6, 9] {
            group.bench_with_input(BenchmarkId::new("level", level), &data, |b, data| {
                b.iter(|| black_box(Lz77Encoder::compress_all(black_box(data), level)));
            });
        }
        group.finish();
    }
}

fn bench_lz77_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("lz77_strategies");
    let data = test_data::text_like(128 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for strategy in [Strategy::Default, Strategy::Filtered, Strategy::Rle] {
        group.bench_with_input(
            BenchmarkId::from_parameter(strategy),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut encoder = Lz77Encoder::with_config(6, strategy, 15);
                    let mut tokens = Vec::new();
                    encoder.tokenize(black_box(data), 0..data.len(), &mut tokens);
                    black_box(tokens)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_lz77_levels, bench_lz77_strategies);
criterion_main!(benches);
