//! Deflate command implementation.

use crate::utils::{format_size, ratio_percent, read_input, write_output};
use clap::ValueEnum;
use oxiflate_core::{CompressionConfig, Framing, Strategy};
use oxiflate_deflate::{compress, inspect};
use std::path::Path;

/// Match-finding strategy as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum StrategyArg {
    /// Lazy matching with the cheapest block type
    #[default]
    Default,
    /// Discard short matches
    Filtered,
    /// Literals only
    #[value(name = "huffman_only")]
    HuffmanOnly,
    /// Distance-1 matches only
    Rle,
    /// Never emit dynamic Huffman blocks
    Fixed,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Default => Strategy::Default,
            StrategyArg::Filtered => Strategy::Filtered,
            StrategyArg::HuffmanOnly => Strategy::HuffmanOnly,
            StrategyArg::Rle => Strategy::Rle,
            StrategyArg::Fixed => Strategy::Fixed,
        }
    }
}

/// Options for the deflate command.
#[derive(Debug, Clone, Copy)]
pub struct DeflateOptions {
    pub level: i8,
    pub window_bits: u8,
    pub strategy: StrategyArg,
    pub zlib: bool,
    pub verbose: bool,
}

impl DeflateOptions {
    /// Codec configuration for these options.
    pub fn config(&self) -> CompressionConfig {
        CompressionConfig::new()
            .with_level(self.level)
            .with_window_bits(self.window_bits)
            .with_strategy(self.strategy.into())
            .with_framing(if self.zlib { Framing::Zlib } else { Framing::Raw })
    }
}

pub fn cmd_deflate(
    input: Option<&Path>,
    output: Option<&Path>,
    options: &DeflateOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = options.config();
    config.validate()?;

    let data = read_input(input)?;
    let compressed = compress(&data, &config)?;
    write_output(output, &compressed)?;

    if options.verbose {
        let body = match config.framing {
            Framing::Raw => &compressed[..],
            Framing::Zlib => &compressed[2..compressed.len() - 4],
        };
        let blocks = inspect(body, config.window_bits)?;
        eprintln!(
            "deflate: {} -> {} ({:.1}%), {} block(s), level {}, window 2^{}, strategy {}, {}",
            format_size(data.len()),
            format_size(compressed.len()),
            ratio_percent(data.len(), compressed.len()),
            blocks.len(),
            config.effective_level(),
            config.window_bits,
            config.strategy,
            config.framing
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_mapping() {
        assert_eq!(Strategy::from(StrategyArg::HuffmanOnly), Strategy::HuffmanOnly);
        assert_eq!(Strategy::from(StrategyArg::default()), Strategy::Default);
        for arg in StrategyArg::value_variants() {
            let name = arg.to_possible_value().map(|v| v.get_name().to_string());
            assert_eq!(name.as_deref(), Some(Strategy::from(*arg).name()));
        }
    }

    #[test]
    fn test_options_config() {
        let options = DeflateOptions {
            level: -1,
            window_bits: 12,
            strategy: StrategyArg::Rle,
            zlib: true,
            verbose: false,
        };
        let config = options.config();
        assert_eq!(config.effective_level(), 6);
        assert_eq!(config.window_bits, 12);
        assert_eq!(config.strategy, Strategy::Rle);
        assert_eq!(config.framing, Framing::Zlib);
    }
}
