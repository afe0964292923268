//! Command implementations for OxiFlate CLI.

pub mod completions;
pub mod deflate;
pub mod inflate;
pub mod inspect;

pub use completions::cmd_completions;
pub use deflate::{DeflateOptions, StrategyArg, cmd_deflate};
pub use inflate::{InflateOptions, cmd_inflate};
pub use inspect::{InspectOptions, cmd_inspect};
