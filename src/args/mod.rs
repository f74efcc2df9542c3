//! CLI argument types and parsing helpers.
mod cli;
mod parsers;
mod types;

pub use cli::{Cli, Command, RunArgs};
pub use types::PatternKind;
