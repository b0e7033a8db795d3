//! CLI command definitions and dispatch for the `backstage` binary.
//!
//! Uses clap derive macros for argument parsing. Commands follow a
//! noun-verb pattern (e.g., `backstage bots list`, `backstage tokens create`).

pub mod bot;
pub mod login;
pub mod token;

use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};

/// Manage bot accounts of a team.
#[derive(Parser)]
#[command(name = "backstage", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Server URL (overrides config.toml).
    #[arg(long, global = true, env = "BACKSTAGE_URL")]
    pub server: Option<String>,

    /// Team name used for routing (overrides config.toml).
    #[arg(long, global = true, env = "BACKSTAGE_TEAM")]
    pub team: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage bot accounts (list, show, add, edit, enable, disable).
    Bots {
        #[command(subcommand)]
        action: BotCommand,
    },

    /// Manage bot access tokens (list, create, revoke, enable, disable).
    Tokens {
        #[command(subcommand)]
        action: TokenCommand,
    },

    /// Store the server URL, team and an access token.
    Login {
        /// Personal access token (prompted securely if omitted).
        #[arg(long)]
        token: Option<String>,
    },

    /// Forget the stored access token for the configured server.
    Logout,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum BotCommand {
    /// List bot accounts, enabled first.
    #[command(alias = "ls")]
    List {
        /// Only show bots whose username, display name or description
        /// contains this text.
        #[arg(long, short)]
        filter: Option<String>,
    },

    /// Show a bot with its owner and tokens.
    Show {
        /// Bot username or user id.
        bot: String,
    },

    /// Create a new bot account (interactive when flags are omitted).
    #[command(alias = "create")]
    Add {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Path to an icon image (png, jpeg, bmp, gif or svg).
        #[arg(long)]
        icon: Option<std::path::PathBuf>,
    },

    /// Edit an existing bot account.
    Edit {
        /// Bot username or user id.
        bot: String,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Path to a new icon image.
        #[arg(long)]
        icon: Option<std::path::PathBuf>,
    },

    /// Re-enable a disabled bot.
    Enable {
        /// Bot username or user id.
        bot: String,
    },

    /// Disable a bot.
    Disable {
        /// Bot username or user id.
        bot: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum TokenCommand {
    /// List a bot's access tokens.
    List {
        /// Bot username or user id.
        bot: String,
    },

    /// Create an access token for a bot. The secret is shown once.
    Create {
        /// Bot username or user id.
        bot: String,

        /// What the token is for.
        #[arg(long)]
        description: Option<String>,
    },

    /// Revoke (delete) a token.
    Revoke {
        /// Token id.
        token_id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Re-activate a token.
    Enable {
        /// Token id.
        token_id: String,
    },

    /// Deactivate a token without deleting it.
    Disable {
        /// Token id.
        token_id: String,
    },
}

/// Steady-ticking spinner on stderr. Callers clear it when done.
pub(crate) fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
