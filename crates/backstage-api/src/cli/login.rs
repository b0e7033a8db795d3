//! Login/logout: persist the server and team to config.toml and the access
//! token to the OS keychain.

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Password};
use secrecy::SecretString;

use backstage_infra::config::save_config;
use backstage_infra::credentials::KeychainTokenStore;

use crate::state::effective_config;

/// Store credentials for a server.
///
/// # Examples
///
/// ```bash
/// # Interactive
/// backstage login
///
/// # One-shot
/// backstage login --server https://chat.example.com --team eng --token xxxx
/// ```
pub async fn login(
    server: Option<String>,
    team: Option<String>,
    token: Option<String>,
    json: bool,
) -> Result<()> {
    let prompt_team = team.is_none();
    let (data_dir, mut config) = effective_config(server, team).await;

    if prompt_team && config.team.is_none() {
        let team: String = Input::new().with_prompt("Team name").interact_text()?;
        config.team = Some(team.trim().to_string());
    }

    let token = match token {
        Some(t) => t,
        None => Password::new()
            .with_prompt(format!("Access token for {}", config.server_url))
            .interact()?,
    };
    let token = token.trim().to_string();
    if token.is_empty() {
        anyhow::bail!("Access token cannot be empty");
    }

    KeychainTokenStore::new()
        .set(&config.server_url, &SecretString::from(token))
        .context("Failed to store access token in keychain")?;
    save_config(&data_dir, &config)
        .await
        .with_context(|| format!("Failed to write {}", data_dir.join("config.toml").display()))?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "server_url": config.server_url,
                "team": config.team,
            })
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} Logged in to {}",
        style("✓").green().bold(),
        style(&config.server_url).cyan()
    );
    if let Some(team) = &config.team {
        println!("  {}  {}", style("Team:").bold(), team);
    }
    println!();

    Ok(())
}

/// Remove the stored access token for the configured server.
pub async fn logout(server: Option<String>, json: bool) -> Result<()> {
    let (_, config) = effective_config(server, None).await;

    KeychainTokenStore::new()
        .delete(&config.server_url)
        .context("Failed to remove access token from keychain")?;

    if json {
        println!(
            "{}",
            serde_json::json!({"logged_out": true, "server_url": config.server_url})
        );
    } else {
        println!(
            "  {} Removed access token for {}",
            style("✓").green().bold(),
            config.server_url
        );
    }

    Ok(())
}
