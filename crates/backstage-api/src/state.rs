//! Application state wiring the controller to the concrete infra client.
//!
//! `AppState` pins the generic [`BotListController`] to [`HttpBotActions`]
//! and carries the effective configuration (config.toml plus CLI overrides).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio_util::sync::CancellationToken;

use backstage_core::list::BotListController;
use backstage_core::row::BotRow;
use backstage_core::store::BotStore;
use backstage_infra::client::HttpBotActions;
use backstage_infra::config::{load_config, resolve_data_dir};
use backstage_infra::credentials::{KeychainTokenStore, resolve_token};
use backstage_types::bot::{Bot, UserId};
use backstage_types::config::BackstageConfig;
use backstage_types::error::LoadError;
use backstage_types::team::Team;

/// Controller type pinned to the REST client.
pub type ConcreteController = BotListController<HttpBotActions>;

/// Shared application state used by every command that talks to the server.
pub struct AppState {
    pub config: BackstageConfig,
    pub data_dir: PathBuf,
    pub team: Team,
    pub actions: Arc<HttpBotActions>,
    pub controller: ConcreteController,
}

/// Read config.toml and apply `--server` / `--team` overrides.
pub async fn effective_config(
    server: Option<String>,
    team: Option<String>,
) -> (PathBuf, BackstageConfig) {
    let data_dir = resolve_data_dir();
    let mut config = load_config(&data_dir).await;
    if let Some(server) = server {
        config.server_url = server;
    }
    if let Some(team) = team {
        config.team = Some(team);
    }
    (data_dir, config)
}

impl AppState {
    /// Resolve configuration and credentials, then build the client.
    pub async fn init(server: Option<String>, team: Option<String>) -> Result<Self> {
        let (data_dir, config) = effective_config(server, team).await;

        let team_name = config
            .team
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow!("No team configured. Run `backstage login` or pass --team"))?;

        let token = resolve_token(&KeychainTokenStore::new(), &config.server_url)
            .with_context(|| format!("No credentials for {}", config.server_url))?;

        let actions = Arc::new(HttpBotActions::from_config(&config, token)?);
        let team = Team::named(team_name);
        let controller =
            BotListController::new(actions.clone(), Arc::new(BotStore::new()), team.clone());

        tracing::debug!(
            server = %config.server_url,
            team = %team.name,
            data_dir = %data_dir.display(),
            "Application state initialized"
        );

        Ok(Self {
            config,
            data_dir,
            team,
            actions,
            controller,
        })
    }

    /// Run the bot list load. Ctrl+C cancels outstanding requests.
    pub async fn load_bots(&self) -> Result<usize, LoadError> {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                trigger.cancel();
            }
        });

        let result = self.controller.load_with_cancel(&cancel).await;
        watcher.abort();
        result
    }

    /// Load the list and find a bot by username (`@` optional) or user id.
    ///
    /// Per-bot token or owner failures are only logged here; the bot itself
    /// was enumerated and can still be acted on.
    pub async fn resolve_bot(&self, key: &str) -> Result<Bot> {
        match self.load_bots().await {
            Ok(_) => {}
            Err(err @ (LoadError::Bots(_) | LoadError::Cancelled)) => return Err(err.into()),
            Err(err) => tracing::warn!(error = %err, "Bot list loaded partially"),
        }

        let store = self.controller.store();
        let username = key.trim().trim_start_matches('@');
        store
            .bot_by_username(username)
            .or_else(|| store.bot(&UserId::new(key.trim())))
            .ok_or_else(|| anyhow!("Bot '{key}' not found"))
    }

    /// Row view model for a bot already in the store.
    pub fn row_for(&self, bot: &Bot) -> BotRow {
        let store = self.controller.store();
        BotRow {
            bot: bot.clone(),
            owner: store.owner(&bot.user_id),
            access_tokens: store.access_tokens(&bot.user_id),
            team: self.team.clone(),
            filter: String::new(),
        }
    }
}
