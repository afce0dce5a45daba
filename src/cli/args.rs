//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Organizational hierarchy builder: place employees under managers, render tables and charts
#[derive(Parser, Debug)]
#[command(name = "orgtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory searched for a local .orgtree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Roster and edit inputs shared by the rendering commands.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Roster file (.json or .csv); falls back to the configured roster
    #[arg(short, long, value_hint = ValueHint::FilePath, env = "ORGTREE_ROSTER")]
    pub roster: Option<PathBuf>,

    /// Edit script applied before rendering (shell command syntax)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub script: Option<PathBuf>,

    /// Seed the hierarchy from the roster's declared managers first
    #[arg(long)]
    pub seed: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the flattened hierarchy table
    Table {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the hierarchy as a collapsible chart
    Chart {
        #[command(flatten)]
        source: SourceArgs,
        /// Expand every node before drawing
        #[arg(short, long)]
        expand_all: bool,
    },

    /// List roster employees not placed in the hierarchy
    Unplaced {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Interactive edit session reading commands from stdin
    Shell {
        /// Roster file (.json or .csv); falls back to the configured roster
        #[arg(short, long, value_hint = ValueHint::FilePath, env = "ORGTREE_ROSTER")]
        roster: Option<PathBuf>,
        /// Seed the hierarchy from the roster's declared managers first
        #[arg(long)]
        seed: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config instead of local
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
