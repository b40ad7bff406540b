//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "feedmap",
    version,
    about = "Map product feed fields onto advertising channel schemas",
    long_about = "Parse XML product feeds, apply field mappings and export \
                  channel feeds for Facebook, Google, Snapchat, TikTok and \
                  custom channels."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (default: platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow feed values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the known target channels.
    Channels,

    /// Show the records and inferred schema of a feed.
    Inspect(InspectArgs),

    /// Apply a mapping file to a feed and write the result.
    Map(MapArgs),

    /// Compare original and mapped values of one field.
    Preview(PreviewArgs),

    /// Manage stored shops.
    #[command(subcommand)]
    Shop(ShopCommand),
}

#[derive(Args)]
pub struct InspectArgs {
    #[arg(value_name = "FEED")]
    pub feed: PathBuf,
}

#[derive(Args)]
pub struct MapArgs {
    #[arg(value_name = "FEED")]
    pub feed: PathBuf,

    /// Mapping set (.json array or .toml with [[mapping]] tables).
    #[arg(long = "mappings", short = 'm', value_name = "FILE")]
    pub mappings: PathBuf,

    /// Channel whose schema constrains the output.
    #[arg(long = "channel", short = 'c', value_name = "ID")]
    pub channel: Option<String>,

    /// Shop name used in the output file name (default: feed file stem).
    #[arg(long = "shop", value_name = "NAME")]
    pub shop: Option<String>,

    /// Output file (default: <output_dir>/<shop>-<channel>.xml).
    #[arg(long = "output", short = 'o', value_name = "PATH", conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Print the XML instead of writing a file.
    #[arg(long = "stdout")]
    pub stdout: bool,
}

#[derive(Args)]
pub struct PreviewArgs {
    #[arg(value_name = "FEED")]
    pub feed: PathBuf,

    #[arg(long = "mappings", short = 'm', value_name = "FILE")]
    pub mappings: PathBuf,

    /// Target field to preview.
    #[arg(long = "field", short = 'f', value_name = "NAME")]
    pub field: String,

    /// Page to show (1-based).
    #[arg(long = "page", default_value_t = 1)]
    pub page: usize,

    /// Print all rows as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ShopCommand {
    /// List shops.
    List {
        /// Only shops whose name or id contains this text.
        #[arg(long = "search", value_name = "TEXT")]
        search: Option<String>,
    },

    /// Create a shop.
    Add {
        name: String,
        /// Initial feed file.
        #[arg(long = "feed", value_name = "FILE")]
        feed: Option<PathBuf>,
    },

    /// Delete a shop.
    Delete { shop: String },

    /// Rename a shop.
    Rename { shop: String, name: String },

    /// Replace a shop's feed.
    Upload { shop: String, feed: PathBuf },

    /// Attach a channel to a shop.
    AddChannel {
        shop: String,
        /// Channel id from `feedmap channels`.
        channel: String,
        /// Display name (default: the channel's name).
        #[arg(long = "name")]
        name: Option<String>,
    },

    /// Detach a channel and drop its saved mapping.
    RemoveChannel { shop: String, channel: String },

    /// Save a mapping file as the shop's internal or channel mapping.
    SaveMappings {
        shop: String,
        #[arg(long = "mappings", short = 'm', value_name = "FILE")]
        mappings: PathBuf,
        #[arg(long = "channel", short = 'c', value_name = "ID")]
        channel: Option<String>,
    },

    /// Add a comment, optionally about one field.
    Comment {
        shop: String,
        text: String,
        #[arg(long = "field")]
        field: Option<String>,
    },

    /// List a shop's comments.
    Comments {
        shop: String,
        #[arg(long = "field")]
        field: Option<String>,
    },

    /// Delete a comment.
    DeleteComment { shop: String, comment: String },

    /// Record an A/B test label.
    AbTest { shop: String, label: String },

    /// Toggle the edit lock.
    Lock { shop: String },

    /// Export a shop's feed with its saved mappings.
    Export {
        shop: String,
        #[arg(long = "channel", short = 'c', value_name = "ID")]
        channel: Option<String>,
        #[arg(long = "output", short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Delete every shop.
    Clear {
        /// Required confirmation.
        #[arg(long = "yes")]
        yes: bool,
    },
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
