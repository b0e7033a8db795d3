//! Bot backstage CLI entry point.
//!
//! Binary name: `backstage`
//!
//! Parses CLI arguments, initializes tracing, resolves configuration and
//! credentials, then dispatches to the command handlers.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{BotCommand, Cli, Commands, TokenCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,backstage=debug",
        _ => "trace",
    };
    backstage_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!(e))?;

    let result = run(cli).await;
    backstage_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Commands that don't need server credentials
    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(*shell, &mut cmd, "backstage", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Login { token } => {
            return cli::login::login(cli.server, cli.team, token.clone(), cli.json).await;
        }
        Commands::Logout => {
            return cli::login::logout(cli.server, cli.json).await;
        }
        _ => {}
    }

    let state = AppState::init(cli.server, cli.team).await?;

    match cli.command {
        Commands::Bots { action } => match action {
            BotCommand::List { filter } => {
                cli::bot::list_bots(&state, filter.as_deref().unwrap_or(""), cli.json).await?;
            }
            BotCommand::Show { bot } => {
                cli::bot::show_bot(&state, &bot, cli.json).await?;
            }
            BotCommand::Add {
                username,
                display_name,
                description,
                icon,
            } => {
                let fields = cli::bot::BotFields {
                    username,
                    display_name,
                    description,
                    icon,
                };
                cli::bot::add_bot(&state, fields, cli.json).await?;
            }
            BotCommand::Edit {
                bot,
                username,
                display_name,
                description,
                icon,
            } => {
                let fields = cli::bot::BotFields {
                    username,
                    display_name,
                    description,
                    icon,
                };
                cli::bot::edit_bot(&state, &bot, fields, cli.json).await?;
            }
            BotCommand::Enable { bot } => {
                cli::bot::enable_bot(&state, &bot, cli.json).await?;
            }
            BotCommand::Disable { bot, force } => {
                cli::bot::disable_bot(&state, &bot, force, cli.json).await?;
            }
        },

        Commands::Tokens { action } => match action {
            TokenCommand::List { bot } => {
                cli::token::list_tokens(&state, &bot, cli.json).await?;
            }
            TokenCommand::Create { bot, description } => {
                cli::token::create_token(&state, &bot, description, cli.json).await?;
            }
            TokenCommand::Revoke { token_id, force } => {
                cli::token::revoke_token(&state, &token_id, force, cli.json).await?;
            }
            TokenCommand::Enable { token_id } => {
                cli::token::set_token_active(&state, &token_id, true, cli.json).await?;
            }
            TokenCommand::Disable { token_id } => {
                cli::token::set_token_active(&state, &token_id, false, cli.json).await?;
            }
        },

        Commands::Completions { .. } | Commands::Login { .. } | Commands::Logout => {
            unreachable!("handled above")
        }
    }

    Ok(())
}
