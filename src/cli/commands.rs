//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Keyset - Order-insensitive planning for keyed list attributes.
#[derive(Parser, Debug)]
#[command(name = "keyset")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "KEYSET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the planned list from a prior and a desired list.
    Plan {
        /// Prior state collection (JSON). A missing file means no prior.
        #[arg(long)]
        prior: PathBuf,

        /// Desired collection (JSON).
        #[arg(long)]
        desired: PathBuf,

        /// Attribute profile to use.
        #[arg(short, long)]
        profile: Option<String>,

        /// Show the keyed diff against the prior list.
        #[arg(short, long)]
        detailed: bool,
    },

    /// Show the keyed diff between the prior and the planned list.
    Diff {
        /// Prior state collection (JSON). A missing file means no prior.
        #[arg(long)]
        prior: PathBuf,

        /// Desired collection (JSON).
        #[arg(long)]
        desired: PathBuf,

        /// Attribute profile to use.
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Print a collection in canonical order.
    Sort {
        /// Collection to sort (JSON).
        #[arg(long)]
        input: PathBuf,

        /// Attribute profile to use.
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Validate the configuration.
    Validate {
        /// Show all warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },

    /// List the available attribute profiles.
    Profiles,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plan() {
        let cli = Cli::try_parse_from([
            "keyset",
            "plan",
            "--prior",
            "state.json",
            "--desired",
            "config.json",
            "--profile",
            "node_groups",
            "-d",
        ])
        .unwrap();

        match cli.command {
            Commands::Plan {
                prior,
                desired,
                profile,
                detailed,
            } => {
                assert_eq!(prior, PathBuf::from("state.json"));
                assert_eq!(desired, PathBuf::from("config.json"));
                assert_eq!(profile.as_deref(), Some("node_groups"));
                assert!(detailed);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["keyset", "profiles", "--output", "json", "-v", "--log-json"])
            .unwrap();

        assert!(matches!(cli.output, OutputFormat::Json));
        assert!(cli.verbose);
        assert!(cli.log_json);
    }

    #[test]
    fn test_sort_requires_input() {
        assert!(Cli::try_parse_from(["keyset", "sort"]).is_err());
    }
}
