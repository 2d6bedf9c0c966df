//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Parse doc comments into hierarchical tag trees
#[derive(Parser, Debug)]
#[command(name = "hierardoc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding `.hierardoc.toml` (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse one doc comment and print its tags
    Parse {
        /// File holding the doc comment (stdin if omitted or `-`)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Output format (default: from config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print the value of a fully-qualified tag key
    Get {
        /// Hyphen-delimited key, e.g. `phpstan-var`
        key: String,
        /// File holding the doc comment (stdin if omitted or `-`)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Find and parse every doc comment in a file or directory
    Scan {
        /// Source file or directory
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
        /// Output format (default: from config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// File extension to include when scanning a directory (repeatable)
        #[arg(short, long = "ext")]
        extensions: Vec<String>,
        /// Also report doc comments without tags
        #[arg(long)]
        include_empty: bool,
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
    /// Show effective settings
    Show,
    /// Print a commented config template
    Template,
    /// Show config file locations
    Path,
}
