//! CLI command definitions and handlers.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use sharepad_core::client::SyncClient;
use sharepad_core::config::Config;

pub mod clear;
pub mod clipboard;
pub mod completions;
pub mod config;
pub mod get;
pub mod put;
pub mod serve;
pub mod upload;
pub mod watch;

/// Load configuration with graceful fallback to defaults.
///
/// A missing or unreadable config file never stops a command.
pub fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        tracing::warn!("Ignoring config file: {}", e);
        Config::default()
    })
}

/// Options shared by every command.
#[derive(Debug)]
pub struct Globals {
    /// Loaded configuration
    pub config: Config,
    /// Server URL from `--server` or `SHAREPAD_SERVER`
    pub server: Option<String>,
    /// Minimal output
    pub quiet: bool,
    /// Output in JSON format
    pub json: bool,
}

impl Globals {
    /// Collect global flags and load the config file.
    pub fn new(cli: &Cli) -> Self {
        Self {
            config: load_config(),
            server: cli.server.clone(),
            quiet: cli.quiet,
            json: cli.json,
        }
    }

    /// Server URL, flag or env first, then config.
    pub fn server_url(&self) -> &str {
        self.server
            .as_deref()
            .unwrap_or(&self.config.client.server_url)
    }

    /// Build a client for the selected server.
    pub fn client(&self) -> Result<SyncClient> {
        Ok(SyncClient::new(
            self.server_url(),
            self.config.client.request_timeout,
        )?)
    }

    /// Whether human-readable progress should be printed.
    pub const fn chatty(&self) -> bool {
        !self.quiet && !self.json
    }
}

/// Print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse a CLI duration like `500ms`, `5s` or `1m`.
fn parse_interval(s: &str) -> std::result::Result<Duration, String> {
    sharepad_core::config::parse_nonzero_duration(s)
        .ok_or_else(|| format!("invalid duration '{s}' (try 500ms, 5s or 1m)"))
}

/// Sharepad - one shared text/image pad for your local network
#[derive(Parser)]
#[command(name = "sharepad")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Server to talk to (e.g. 192.168.1.20:8080)
    #[arg(long, global = true, env = "SHAREPAD_SERVER")]
    pub server: Option<String>,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Detailed logging (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand)]
pub enum Command {
    /// Start the shared pad server
    Serve(ServeArgs),

    /// Print the shared text (and optionally save the image)
    Get(GetArgs),

    /// Replace the shared text
    Put(PutArgs),

    /// Share the local clipboard
    Paste,

    /// Copy the shared text or image to the local clipboard
    Copy(CopyArgs),

    /// Share an image file
    Upload(UploadArgs),

    /// Clear the shared text and/or image
    Clear(ClearArgs),

    /// Follow the shared pad as it changes
    Watch(WatchArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the serve command
#[derive(Parser)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "SHAREPAD_PORT")]
    pub port: Option<u16>,

    /// Bind to localhost only
    #[arg(long)]
    pub localhost_only: bool,

    /// Reject oversized or malformed images on the server
    #[arg(long)]
    pub enforce_image_limit: bool,

    /// Don't print a QR code
    #[arg(long)]
    pub no_qr: bool,
}

/// Arguments for the get command
#[derive(Parser)]
pub struct GetArgs {
    /// Save the shared image to this file or directory
    #[arg(long, value_name = "PATH")]
    pub image_out: Option<PathBuf>,
}

/// Arguments for the put command
#[derive(Parser)]
pub struct PutArgs {
    /// Text to share
    #[arg(required_unless_present = "stdin", conflicts_with = "stdin")]
    pub text: Option<String>,

    /// Read the text from stdin
    #[arg(long)]
    pub stdin: bool,
}

/// Arguments for the copy command
#[derive(Parser)]
pub struct CopyArgs {
    /// Copy the image instead of the text
    #[arg(long)]
    pub image: bool,
}

/// Arguments for the upload command
#[derive(Parser)]
pub struct UploadArgs {
    /// Image file to share
    pub path: PathBuf,
}

/// Arguments for the clear command
#[derive(Parser)]
pub struct ClearArgs {
    /// Clear the text
    #[arg(long)]
    pub text: bool,

    /// Clear the image
    #[arg(long)]
    pub image: bool,
}

/// Display mode for the watch command
#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum ModeArg {
    /// Show the shared text
    Text,
    /// Show the shared image
    Image,
}

/// Arguments for the watch command
#[derive(Parser)]
pub struct WatchArgs {
    /// Poll interval (e.g. 1s, 500ms); defaults to the config value
    #[arg(short, long, value_parser = parse_interval)]
    pub interval: Option<Duration>,

    /// What to show
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,
}

/// Arguments for the config command
#[derive(Parser)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Value to set
        value: String,
    },

    /// Show all configuration
    Show,

    /// List all available configuration keys
    List,

    /// Show the configuration file path
    Path,

    /// Reset to defaults
    Reset,
}

/// Arguments for the completions command
#[derive(Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,
}

/// Supported shell types for completions
#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell
    Elvish,
}
