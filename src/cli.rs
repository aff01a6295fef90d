//! Command-line interface definition.
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Top-level CLI entry point for the dotlink bootstrapper.
#[derive(Parser, Debug)]
#[command(
    name = "dotlink",
    about = "Declarative dotfiles bootstrapper",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (repeat to also show shell command output)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only show stage headers, warnings, and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Only show warnings and errors
    #[arg(short = 'Q', long, global = true, conflicts_with_all = ["verbose", "quiet"])]
    pub super_quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply configuration files
    Apply(ApplyOpts),
    /// Print version information
    Version,
}

/// Options for the `apply` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ApplyOpts {
    /// Configuration file (repeat to concatenate several)
    #[arg(short = 'c', long = "config-file", required = true)]
    pub config_file: Vec<PathBuf>,

    /// Base directory; defaults to the directory of the first config file
    #[arg(short = 'd', long)]
    pub base_directory: Option<PathBuf>,

    /// Preview changes without applying
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Run only these directives
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip these directives
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub except: Vec<String>,

    /// Stop at the first failed directive
    #[arg(short = 'x', long)]
    pub exit_on_failure: bool,

    /// Do not register the built-in directives
    #[arg(long)]
    pub disable_built_in_plugins: bool,

    /// Disable colored output
    #[arg(long, conflicts_with = "force_color")]
    pub no_color: bool,

    /// Color output even when not writing to a terminal
    #[arg(long)]
    pub force_color: bool,
}
