//! Utility functions for the CLI.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// Read all input from a file, or from stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> io::Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path),
        None => {
            let mut data = Vec::new();
            io::stdin().lock().read_to_end(&mut data)?;
            Ok(data)
        }
    }
}

/// Write output to a file, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, data: &[u8]) -> io::Result<()> {
    match path {
        Some(path) => fs::write(path, data),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()
        }
    }
}

/// Output size as a percentage of input size.
pub fn ratio_percent(input_len: usize, output_len: usize) -> f64 {
    if input_len == 0 {
        0.0
    } else {
        output_len as f64 / input_len as f64 * 100.0
    }
}

/// Format bytes in human-readable form.
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MiB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KiB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
