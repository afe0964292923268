//! Inflate command implementation.

use crate::utils::{format_size, read_input, write_output};
use oxiflate_deflate::Inflater;
use oxiflate_deflate::zlib::{ZlibHeader, zlib_decompress};
use std::path::Path;

/// Options for the inflate command.
#[derive(Debug, Clone, Copy)]
pub struct InflateOptions {
    pub window_bits: u8,
    pub zlib: bool,
    pub verbose: bool,
}

pub fn cmd_inflate(
    input: Option<&Path>,
    output: Option<&Path>,
    options: &InflateOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_input(input)?;

    let (decompressed, detail) = if options.zlib {
        let decompressed = zlib_decompress(&data, options.window_bits)?;
        let header = ZlibHeader::parse(&data)?;
        let detail = format!(
            "zlib, window 2^{}, level hint {:?}, checksum ok",
            header.window_bits, header.level
        );
        (decompressed, detail)
    } else {
        let mut inflater = Inflater::new(options.window_bits)?;
        let decompressed = inflater.inflate(&data)?;
        let detail = format!(
            "raw, window 2^{}, {} block(s), {} trailing byte(s)",
            options.window_bits,
            inflater.blocks().len(),
            data.len() - inflater.bytes_consumed()
        );
        (decompressed, detail)
    };

    write_output(output, &decompressed)?;

    if options.verbose {
        eprintln!(
            "inflate: {} -> {}, {}",
            format_size(data.len()),
            format_size(decompressed.len()),
            detail
        );
    }

    Ok(())
}
