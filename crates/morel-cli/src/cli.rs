//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "morel")]
#[command(about = "Offline-first field journal for mushroom observations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, value_name = "PATH", global = true)]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture a new observation from a photo
    #[command(alias = "new")]
    Add {
        /// Path to the primary photo
        photo: PathBuf,
        /// Additional photo paths
        #[arg(long = "extra", value_name = "PATH")]
        extra: Vec<PathBuf>,
        /// Optional display label
        #[arg(long)]
        view: Option<String>,
        /// Observation metadata as a JSON object
        #[arg(long, value_name = "JSON")]
        meta: Option<String>,
    },
    /// List observations in the local catalog
    List {
        /// Number of observations to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one observation in detail
    Show {
        /// Observation ID
        id: String,
    },
    /// Force a sync cycle now
    Sync,
    /// Report sync configuration and state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Turn cloud sync on
    Enable,
    /// Turn cloud sync off
    Disable,
    /// Run the sync scheduler in the foreground until interrupted
    Watch,
    /// Manage the cloud profile
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Update stored profile fields
    Set {
        /// Remote API base URL
        #[arg(long, value_name = "URL")]
        remote_url: Option<String>,
        /// Remote API key
        #[arg(long, value_name = "KEY")]
        remote_key: Option<String>,
        /// Cloud account identifier
        #[arg(long, value_name = "ID")]
        user_id: Option<String>,
        /// Subscription tier (free, plus, plusPlus)
        #[arg(long, value_name = "TIER")]
        tier: Option<String>,
    },
    /// Print the stored profile (API key redacted)
    Show,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
