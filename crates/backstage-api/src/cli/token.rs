//! Bot access token CLI commands.

use anyhow::{Result, anyhow};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Input};

use backstage_core::row::BotRow;
use backstage_types::token::TokenId;

use super::spinner;
use crate::state::AppState;

/// List a bot's tokens.
pub async fn list_tokens(state: &AppState, key: &str, json: bool) -> Result<()> {
    let bot = state.resolve_bot(key).await?;
    let row = state.row_for(&bot);

    if json {
        let tokens: Vec<_> = row.tokens().collect();
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(());
    }

    if row.access_tokens.is_empty() {
        println!();
        println!(
            "  {} No tokens for @{}. Create one with: {}",
            style("i").blue().bold(),
            bot.username,
            style(format!("backstage tokens create {}", bot.username)).yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", token_table(&row));
    println!();
    println!(
        "  {} active of {}",
        style(row.active_token_count()).bold(),
        row.access_tokens.len()
    );
    println!();

    Ok(())
}

/// Create a token. The secret is printed once and cannot be retrieved later.
pub async fn create_token(
    state: &AppState,
    key: &str,
    description: Option<String>,
    json: bool,
) -> Result<()> {
    let bot = state.resolve_bot(key).await?;

    let description = match description {
        Some(d) => d,
        None if !json => Input::<String>::new()
            .with_prompt("Token description")
            .interact_text()?,
        None => anyhow::bail!("--description is required with --json"),
    };
    if description.trim().is_empty() {
        anyhow::bail!("Token description cannot be empty");
    }

    let spinner = spinner(format!("Creating token for {}...", bot.username));
    let result = state
        .controller
        .create_token(&bot.user_id, description.trim())
        .await;
    spinner.finish_and_clear();
    let created = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Token created for @{}",
        style("✓").green().bold(),
        bot.username
    );
    println!("  {}     {}", style("ID:").bold(), style(created.id.as_str()).dim());
    println!("  {}  {}", style("Token:").bold(), style(&created.token).yellow());
    println!();
    println!(
        "  {}",
        style("Copy the token now. It will not be shown again.").dim()
    );
    println!();

    Ok(())
}

/// Delete a token, with confirmation unless `force`.
pub async fn revoke_token(state: &AppState, token_id: &str, force: bool, json: bool) -> Result<()> {
    let token_id = parse_token_id(token_id)?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Revoke token '{}'? This cannot be undone.",
                style(token_id.as_str()).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let spinner = spinner("Revoking token...");
    let result = state.controller.revoke_token(&token_id).await;
    spinner.finish_and_clear();
    result?;

    if json {
        println!(
            "{}",
            serde_json::json!({"revoked": true, "token_id": token_id})
        );
    } else {
        println!(
            "  {} Token '{}' revoked.",
            style("✓").red().bold(),
            token_id
        );
    }

    Ok(())
}

/// Activate or deactivate a token.
pub async fn set_token_active(
    state: &AppState,
    token_id: &str,
    active: bool,
    json: bool,
) -> Result<()> {
    let token_id = parse_token_id(token_id)?;

    let spinner = spinner(if active {
        "Enabling token..."
    } else {
        "Disabling token..."
    });
    let result = if active {
        state.controller.enable_token(&token_id).await
    } else {
        state.controller.disable_token(&token_id).await
    };
    spinner.finish_and_clear();
    result?;

    if json {
        println!(
            "{}",
            serde_json::json!({"token_id": token_id, "is_active": active})
        );
    } else {
        println!(
            "  {} Token '{}' {}.",
            style("✓").green().bold(),
            token_id,
            if active { "enabled" } else { "disabled" }
        );
    }

    Ok(())
}

/// Tokens of one bot as a table.
pub(crate) fn token_table(row: &BotRow) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Description").fg(Color::White),
        Cell::new("Status").fg(Color::White),
    ]);

    for token in row.tokens() {
        let status = if token.is_active {
            Cell::new("● active").fg(Color::Green)
        } else {
            Cell::new("○ inactive").fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(token.id.as_str()).fg(Color::DarkGrey),
            Cell::new(&token.description),
            status,
        ]);
    }

    table
}

fn parse_token_id(raw: &str) -> Result<TokenId> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(anyhow!("Invalid token id '{raw}'"));
    }
    Ok(TokenId::new(raw))
}
