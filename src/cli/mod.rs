//! CLI module for the keyset tool.
//!
//! This module provides the command-line interface for planning,
//! diffing and sorting keyed list attributes.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
