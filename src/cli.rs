use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "graphsync")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Reconcile JSON objects and reference collections against Graph-style APIs", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// API host (overrides config)
    #[arg(long, global = true, env = "GRAPHSYNC_HOST")]
    pub host: Option<String>,

    /// API version: v1.0 or beta (overrides config)
    #[arg(long, global = true, env = "GRAPHSYNC_API_VERSION")]
    pub api_version: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the canonical form of a JSON document
    Normalize {
        /// JSON file, or - for stdin
        file: PathBuf,
    },

    /// Deep-merge NEW over OLD, keeping every key of OLD
    Merge(PairArgs),

    /// Compute the desired final state of OLD updated with NEW
    Update {
        #[command(flatten)]
        pair: PairArgs,

        #[command(flatten)]
        options: ReconcileArgs,
    },

    /// Show the minimal patch that turns OLD into NEW
    Diff {
        #[command(flatten)]
        pair: PairArgs,

        #[command(flatten)]
        options: ReconcileArgs,

        /// Print changed field paths instead of the patch
        #[arg(long, conflicts_with = "text")]
        paths: bool,

        /// Print a line diff of both documents
        #[arg(long)]
        text: bool,
    },

    /// Read one object
    Read(RemoteArgs),

    /// List every page of a collection
    List {
        #[command(flatten)]
        remote: RemoteArgs,

        /// Print only the ids of the items
        #[arg(long)]
        ids: bool,
    },

    /// Manage reference collections (URLs ending in /$ref)
    #[command(subcommand)]
    Refs(RefsCommand),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct PairArgs {
    /// Previous state (JSON file, or - for stdin)
    pub old: PathBuf,

    /// New state (JSON file, or - for stdin)
    pub new: PathBuf,
}

#[derive(Args)]
pub struct ReconcileArgs {
    /// Keep keys that only exist in OLD
    #[arg(long)]
    pub ignore_missing: bool,

    /// Treat strings that differ only by case as equal
    #[arg(long)]
    pub ignore_casing: bool,
}

#[derive(Args)]
pub struct RemoteArgs {
    /// URL relative to {host}/{api_version}, e.g. groups/{id}
    pub url: String,

    /// Query parameter as key=value (repeatable)
    #[arg(short = 'Q', long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,
}

// ============================================================================
// Refs Commands
// ============================================================================

#[derive(Subcommand)]
pub enum RefsCommand {
    /// Show the current member ids
    List {
        /// Collection URL, e.g. groups/{id}/members/$ref
        url: String,
    },

    /// Show what a sync would add and remove
    Plan(RefsArgs),

    /// Add and remove members until the collection matches
    Sync {
        #[command(flatten)]
        args: RefsArgs,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct RefsArgs {
    /// Collection URL, e.g. groups/{id}/members/$ref
    pub url: String,

    /// Desired member id (repeatable)
    #[arg(long = "id", value_name = "ID")]
    pub ids: Vec<String>,

    /// File with one desired member id per line
    #[arg(long, value_name = "FILE")]
    pub ids_file: Option<PathBuf>,
}

// ============================================================================
// Config Commands
// ============================================================================

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
