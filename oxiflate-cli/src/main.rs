//! OxiFlate CLI - raw DEFLATE and zlib streams from the command line
//!
//! Reads from stdin (or `--input`) and writes to stdout (or `--output`).

mod commands;
mod utils;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::{
    DeflateOptions, InflateOptions, InspectOptions, StrategyArg, cmd_completions, cmd_deflate,
    cmd_inflate, cmd_inspect,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oxiflate")]
#[command(author, version, about = "Pure Rust DEFLATE and zlib codec")]
#[command(long_about = "
OxiFlate compresses and decompresses raw DEFLATE (RFC 1951) streams,
optionally wrapped in zlib framing (RFC 1950).

Examples:
  oxiflate deflate < plain.txt > plain.deflate
  oxiflate deflate -l 9 -w 12 -s filtered -i plain.txt -o plain.deflate
  oxiflate deflate -z < plain.txt > plain.zlib
  oxiflate inflate < plain.deflate > plain.txt
  oxiflate inflate -z -i plain.zlib
  oxiflate inspect -i plain.deflate
  oxiflate inspect -z --json < plain.zlib
  oxiflate completions bash
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input and output paths shared by the codec commands.
#[derive(Args, Debug)]
struct IoArgs {
    /// Input file (stdin if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress input to a raw DEFLATE (or zlib) stream
    #[command(alias = "d")]
    Deflate {
        #[command(flatten)]
        io: IoArgs,

        /// Compression level (0..9 or -1 for default)
        #[arg(
            short,
            long,
            default_value_t = -1,
            allow_negative_numbers = true,
            value_parser = clap::value_parser!(i8).range(-1..=9)
        )]
        level: i8,

        /// Base-two logarithm of the window size (9..15)
        #[arg(
            short = 'w',
            long = "wsize",
            default_value_t = 15,
            value_parser = clap::value_parser!(u8).range(9..=15)
        )]
        window_bits: u8,

        /// Strategy to tune the compression algorithm
        #[arg(short, long, value_enum, default_value_t = StrategyArg::Default)]
        strategy: StrategyArg,

        /// Add zlib header and trailer to the output
        #[arg(short, long)]
        zlib: bool,

        /// Print a summary to stderr
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decompress a raw DEFLATE (or zlib) stream
    #[command(alias = "x")]
    Inflate {
        #[command(flatten)]
        io: IoArgs,

        /// Largest window accepted, as a base-two logarithm (8..15)
        #[arg(
            short = 'w',
            long = "wsize",
            default_value_t = 15,
            value_parser = clap::value_parser!(u8).range(8..=15)
        )]
        window_bits: u8,

        /// Expect a zlib header and trailer
        #[arg(short, long)]
        zlib: bool,

        /// Print a summary to stderr
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the blocks of a compressed stream
    #[command(alias = "i")]
    Inspect {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Largest window accepted, as a base-two logarithm (8..15)
        #[arg(
            short = 'w',
            long = "wsize",
            default_value_t = 15,
            value_parser = clap::value_parser!(u8).range(8..=15)
        )]
        window_bits: u8,

        /// Expect a zlib header and trailer
        #[arg(short, long)]
        zlib: bool,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Generate a shell completion script
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Deflate {
            io,
            level,
            window_bits,
            strategy,
            zlib,
            verbose,
        } => cmd_deflate(
            io.input.as_deref(),
            io.output.as_deref(),
            &DeflateOptions {
                level,
                window_bits,
                strategy,
                zlib,
                verbose,
            },
        ),
        Commands::Inflate {
            io,
            window_bits,
            zlib,
            verbose,
        } => cmd_inflate(
            io.input.as_deref(),
            io.output.as_deref(),
            &InflateOptions {
                window_bits,
                zlib,
                verbose,
            },
        ),
        Commands::Inspect {
            input,
            window_bits,
            zlib,
            json,
        } => cmd_inspect(
            input.as_deref(),
            &InspectOptions {
                window_bits,
                zlib,
                json,
            },
        ),
        Commands::Completions { shell } => cmd_completions(shell, &mut Cli::command()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
