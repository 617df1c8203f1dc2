//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::sync::ConflictPolicy;

pub mod commands;

/// Qiita Sync - keep a git repository of Markdown articles in sync with Qiita
#[derive(Parser, Debug)]
#[command(name = "qsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no log output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Overwrite local articles with their Qiita versions
    Download(TargetArgs),

    /// Publish local articles to Qiita (update, or create and record the id)
    Upload(TargetArgs),

    /// Show how local articles differ from Qiita
    Check(TargetArgs),

    /// Delete the Qiita items of local articles
    Delete(TargetArgs),

    /// Bring local articles and Qiita up to date with each other
    Sync(SyncArgs),

    /// Sync, then remove one-sided and private articles
    Purge(SyncArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Article file or directory
    #[arg(default_value = ".")]
    pub target: PathBuf,

    /// Access token file (relative to the repository root)
    #[arg(short, long, value_name = "FILE")]
    pub token: Option<PathBuf>,

    /// Glob patterns of article files
    #[arg(short, long, num_args = 1.., value_name = "GLOB")]
    pub include: Vec<String>,

    /// Glob patterns of files to skip
    #[arg(short, long, num_args = 1.., value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Compare commit times instead of file modification times
    #[arg(long)]
    pub vcs_timestamp: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// What to do when both sides changed
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_conflict: Option<ConflictPolicy>,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}
