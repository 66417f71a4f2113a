//! Subcommand implementations.

mod checksum;
mod completions;
mod get;
mod resolve;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use get::{run_get, GetArgs};
pub use resolve::run_resolve;
