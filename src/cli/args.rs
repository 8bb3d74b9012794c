//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Referral network explorer: validate, browse and summarize matrix trees
#[derive(Parser, Debug)]
#[command(name = "matrixnet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Raise log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding the local .matrixnet.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Tree file (default: configured tree_file)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the tree, optionally zoomed to a member
    Show {
        /// Member to use as view root
        #[arg(short, long)]
        root: Option<String>,
    },

    /// List the (optionally zoomed) tree in pre-order
    Flat {
        /// Member to use as view root
        #[arg(short, long)]
        root: Option<String>,
    },

    /// Describe one member and its upline path
    Find {
        /// Member id
        id: String,
    },

    /// Network and CPV summary for the tree owner
    Summary {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List downline members
    Downline {
        /// Case-insensitive filter on name or id
        #[arg(short, long)]
        query: Option<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check a tree file against the matrix rules
    Validate {
        /// Tree file to check
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },

    /// Interactive navigation session (reads commands from stdin)
    Browse,

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
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
