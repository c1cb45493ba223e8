//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// recym-cache - offline resource cache manager
///
/// Serves page resources from versioned cache partitions using cache-first,
/// network-first or stale-while-revalidate, and manages partition lifecycle
/// across deployments.
#[derive(Parser, Debug)]
#[command(name = "recym-cache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "RECYM_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and store the static set for the configured version
    Install,

    /// Delete partitions of other versions and claim clients
    Activate,

    /// Intercept one request and print the response
    Fetch(FetchArgs),

    /// Show which strategy a request would use
    Route(RouteArgs),

    /// Post a control message to the worker
    Message(MessageArgs),

    /// Deliver a push message and show its notification
    Push(PushArgs),

    /// Click a notification action
    Click(ClickArgs),

    /// List cache partitions
    Status(StatusArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// URL or path relative to the configured origin
    pub url: String,

    /// Request method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Request headers (NAME:VALUE)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Print the response body
    #[arg(short, long)]
    pub body: bool,

    /// Don't wait for background refreshes before exiting
    #[arg(long)]
    pub no_settle: bool,
}

/// Arguments for the route command
#[derive(Parser, Debug)]
pub struct RouteArgs {
    /// URLs or paths to classify
    #[arg(required = true)]
    pub urls: Vec<String>,
}

/// Arguments for the message command
#[derive(Parser, Debug)]
pub struct MessageArgs {
    /// Message to post
    #[command(subcommand)]
    pub kind: MessageKind,
}

/// Control messages
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum MessageKind {
    /// Request immediate activation
    SkipWaiting,
    /// Ask for the active version
    GetVersion,
}

/// Arguments for the push command
#[derive(Parser, Debug)]
pub struct PushArgs {
    /// JSON payload: {"title": ..., "body": ...}
    pub payload: Option<String>,
}

/// Arguments for the click command
#[derive(Parser, Debug)]
pub struct ClickArgs {
    /// Action id (explore, close)
    #[arg(short, long)]
    pub action: Option<String>,

    /// Title of the clicked notification
    #[arg(short, long, default_value = "recym")]
    pub title: String,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.version)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for list-style commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Parse a header in NAME:VALUE format
fn parse_header(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find(':')
        .ok_or_else(|| format!("invalid NAME:VALUE format: no ':' found in '{s}'"))?;
    let name = s[..pos].trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{s}'"));
    }
    Ok((name.to_string(), s[pos + 1..].trim().to_string()))
}
