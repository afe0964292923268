//! Inspect command implementation.

use crate::utils::read_input;
use oxiflate_core::FlateError;
use oxiflate_deflate::zlib::ZlibHeader;
use oxiflate_deflate::{BlockInfo, inspect};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for the inspect command.
#[derive(Debug, Clone, Copy)]
pub struct InspectOptions {
    pub window_bits: u8,
    pub zlib: bool,
    pub json: bool,
}

/// JSON report for a compressed stream.
#[derive(Debug, Serialize, Deserialize)]
pub struct StreamReport {
    pub framing: String,
    pub window_bits: u8,
    pub compressed_size: usize,
    pub uncompressed_size: usize,
    pub blocks: Vec<BlockInfo>,
}

/// Decode the stream and describe its blocks.
pub fn build_report(data: &[u8], options: &InspectOptions) -> Result<StreamReport, FlateError> {
    let (framing, window_bits, body) = if options.zlib {
        let header = ZlibHeader::parse(data)?;
        if header.window_bits > options.window_bits {
            return Err(FlateError::invalid_header(format!(
                "stream window 2^{} exceeds allowed 2^{}",
                header.window_bits, options.window_bits
            )));
        }
        ("zlib", header.window_bits, &data[2..])
    } else {
        ("raw", options.window_bits, data)
    };

    let blocks = inspect(body, window_bits)?;
    Ok(StreamReport {
        framing: framing.to_string(),
        window_bits,
        compressed_size: data.len(),
        uncompressed_size: blocks.iter().map(|b| b.output_len).sum(),
        blocks,
    })
}

pub fn cmd_inspect(
    input: Option<&Path>,
    options: &InspectOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_input(input)?;
    let report = build_report(&data, options)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Stream: {} ({} bytes, window 2^{})",
        report.framing, report.compressed_size, report.window_bits
    );
    println!();
    println!(
        "{:>5}  {:<8} {:>5}  {:>12}  {:>10}  {:>10}  {:>9}",
        "Block", "Type", "Final", "Bits", "Output", "Literals", "Matches"
    );
    println!("{}", "-".repeat(72));

    for (index, block) in report.blocks.iter().enumerate() {
        println!(
            "{:>5}  {:<8} {:>5}  {:>12}  {:>10}  {:>10}  {:>9}",
            index,
            block.kind,
            if block.is_final { "yes" } else { "no" },
            block.compressed_bits(),
            block.output_len,
            block.literals,
            block.matches
        );
    }

    println!("{}", "-".repeat(72));
    println!(
        "{} block(s), {} bytes uncompressed",
        report.blocks.len(),
        report.uncompressed_size
    );

    Ok(())
}
