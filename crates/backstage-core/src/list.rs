//! Bot list controller.
//!
//! Drives the load sequence for the bot backstage page and turns the shared
//! [`BotStore`] into a [`BotListView`]:
//!
//! 1. `load_bots` enumerates every bot account
//! 2. for each bot, its access tokens and its owner are fetched concurrently
//! 3. once the whole batch has settled the controller leaves `Loading`
//!
//! A failed enumeration or per-bot fetch ends in [`LoadState::Failed`]
//! instead of leaving the page loading forever. Whatever did load stays in
//! the store.

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::{join, join_all};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use backstage_types::bot::{Bot, UserId};
use backstage_types::error::{ApiError, LoadError};
use backstage_types::team::Team;
use backstage_types::token::{CreatedAccessToken, TokenId};

use crate::actions::BotActions;
use crate::row::BotRow;
use crate::store::BotStore;

pub const HEADER_TEXT: &str = "Bot Accounts";
pub const ADD_TEXT: &str = "Add Bot Account";
pub const EMPTY_TEXT: &str = "No Bot Accounts found";
pub const HELP_TEXT: &str =
    "Create Bot Accounts to conversationally interact with your app through the API.";
pub const SEARCH_PLACEHOLDER: &str = "Search Bot Accounts";
pub const DISABLED_HEADING: &str = "Disabled";

/// Load progress of the list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
    Cancelled,
}

/// Split bots into (enabled, disabled), preserving relative order.
pub fn partition_bots(bots: &[Bot]) -> (Vec<&Bot>, Vec<&Bot>) {
    bots.iter().partition(|bot| bot.is_enabled())
}

/// The disabled section, only produced when at least one bot is disabled.
#[derive(Debug, Clone, Serialize)]
pub struct DisabledSection {
    pub heading: &'static str,
    pub rows: Vec<BotRow>,
}

/// Snapshot of the list page.
#[derive(Debug, Clone, Serialize)]
pub struct BotListView {
    pub header: &'static str,
    pub add_text: &'static str,
    pub add_link: String,
    pub empty_text: &'static str,
    pub help_text: &'static str,
    pub search_placeholder: &'static str,
    pub loading: bool,
    pub enabled: Vec<BotRow>,
    pub disabled: Option<DisabledSection>,
}

impl BotListView {
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty() && self.disabled.is_none()
    }

    /// Keep only rows that pass the search filter. The disabled section
    /// disappears when none of its rows match.
    pub fn filtered(mut self) -> Self {
        self.enabled.retain(BotRow::matches_filter);
        if let Some(section) = &mut self.disabled {
            section.rows.retain(BotRow::matches_filter);
        }
        if self.disabled.as_ref().is_some_and(|s| s.rows.is_empty()) {
            self.disabled = None;
        }
        self
    }
}

/// Controller for the bot list page.
///
/// Starts in [`LoadState::Loading`], like the page does when it is first
/// shown.
pub struct BotListController<A: BotActions> {
    actions: Arc<A>,
    store: Arc<BotStore>,
    team: Team,
    state: Mutex<LoadState>,
}

impl<A: BotActions> BotListController<A> {
    pub fn new(actions: Arc<A>, store: Arc<BotStore>, team: Team) -> Self {
        Self {
            actions,
            store,
            team,
            state: Mutex::new(LoadState::Loading),
        }
    }

    pub fn store(&self) -> &Arc<BotStore> {
        &self.store
    }

    pub fn team(&self) -> &Team {
        &self.team
    }

    pub fn state(&self) -> LoadState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state() == LoadState::Loading
    }

    fn set_state(&self, state: LoadState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Run the full load sequence. Returns the number of bots enumerated.
    pub async fn load(&self) -> Result<usize, LoadError> {
        self.load_with_cancel(&CancellationToken::new()).await
    }

    /// Like [`load`](Self::load), abandoning outstanding requests when
    /// `cancel` fires.
    pub async fn load_with_cancel(&self, cancel: &CancellationToken) -> Result<usize, LoadError> {
        self.set_state(LoadState::Loading);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LoadError::Cancelled),
            result = self.fetch_all() => result,
        };

        match &result {
            Ok(count) => {
                info!(bots = count, "Bot list loaded");
                self.set_state(LoadState::Ready);
            }
            Err(LoadError::Cancelled) => {
                debug!("Bot list load cancelled");
                self.set_state(LoadState::Cancelled);
            }
            Err(err) => {
                warn!(error = %err, "Bot list load failed");
                self.set_state(LoadState::Failed(err.to_string()));
            }
        }

        result
    }

    async fn fetch_all(&self) -> Result<usize, LoadError> {
        let bots = self.actions.load_bots().await.map_err(LoadError::Bots)?;
        debug!(bots = bots.len(), "Enumerated bots, fetching tokens and owners");
        self.store.replace_bots(bots.clone());

        let token_fetches = bots.iter().map(|bot| async move {
            let result = self
                .actions
                .get_user_access_tokens_for_user(&bot.user_id)
                .await;
            (bot.user_id.clone(), result)
        });

        let owner_fetches = bots.iter().map(|bot| async move {
            let result = self.actions.get_user(&bot.user_id).await;
            (bot.user_id.clone(), result)
        });

        let (tokens, owners) = join(join_all(token_fetches), join_all(owner_fetches)).await;

        let mut first_error = None;

        for (bot_id, result) in tokens {
            match result {
                Ok(list) => self.store.receive_access_tokens(bot_id, list),
                Err(source) => {
                    warn!(bot_id = %bot_id, error = %source, "Failed to load access tokens");
                    first_error.get_or_insert(LoadError::AccessTokens {
                        user_id: bot_id.to_string(),
                        source,
                    });
                }
            }
        }

        for (bot_id, result) in owners {
            match result {
                Ok(owner) => self.store.receive_owner(bot_id, owner),
                Err(ApiError::NotFound(_)) => {
                    debug!(bot_id = %bot_id, "No user record for bot");
                }
                Err(source) => {
                    warn!(bot_id = %bot_id, error = %source, "Failed to load bot owner");
                    first_error.get_or_insert(LoadError::Owner {
                        user_id: bot_id.to_string(),
                        source,
                    });
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(bots.len()),
        }
    }

    /// Build the page view for the current store contents.
    pub fn view(&self, filter: &str) -> BotListView {
        let bots = self.store.bots();
        let (enabled, disabled) = partition_bots(&bots);

        let enabled: Vec<BotRow> = enabled.into_iter().map(|b| self.row(b, filter)).collect();
        let disabled: Vec<BotRow> = disabled.into_iter().map(|b| self.row(b, filter)).collect();

        BotListView {
            header: HEADER_TEXT,
            add_text: ADD_TEXT,
            add_link: self.team.add_bot_path(),
            empty_text: EMPTY_TEXT,
            help_text: HELP_TEXT,
            search_placeholder: SEARCH_PLACEHOLDER,
            loading: self.is_loading(),
            enabled,
            disabled: if disabled.is_empty() {
                None
            } else {
                Some(DisabledSection {
                    heading: DISABLED_HEADING,
                    rows: disabled,
                })
            },
        }
    }

    fn row(&self, bot: &Bot, filter: &str) -> BotRow {
        BotRow {
            bot: bot.clone(),
            owner: self.store.owner(&bot.user_id),
            access_tokens: self.store.access_tokens(&bot.user_id),
            team: self.team.clone(),
            filter: filter.to_string(),
        }
    }

    // --- Row actions ---

    pub async fn enable_bot(&self, user_id: &UserId) -> Result<Bot, ApiError> {
        let bot = self.actions.enable_bot(user_id).await?;
        info!(bot_id = %user_id, "Bot enabled");
        self.store.upsert_bot(bot.clone());
        Ok(bot)
    }

    pub async fn disable_bot(&self, user_id: &UserId) -> Result<Bot, ApiError> {
        let bot = self.actions.disable_bot(user_id).await?;
        info!(bot_id = %user_id, "Bot disabled");
        self.store.upsert_bot(bot.clone());
        Ok(bot)
    }

    pub async fn create_token(
        &self,
        user_id: &UserId,
        description: &str,
    ) -> Result<CreatedAccessToken, ApiError> {
        let created = self
            .actions
            .create_user_access_token(user_id, description)
            .await?;
        info!(bot_id = %user_id, token_id = %created.id, "Access token created");
        self.store.insert_token(created.metadata());
        Ok(created)
    }

    pub async fn revoke_token(&self, token_id: &TokenId) -> Result<(), ApiError> {
        self.actions.revoke_user_access_token(token_id).await?;
        info!(token_id = %token_id, "Access token revoked");
        self.store.remove_token(token_id);
        Ok(())
    }

    pub async fn enable_token(&self, token_id: &TokenId) -> Result<(), ApiError> {
        self.actions.enable_user_access_token(token_id).await?;
        self.store.set_token_active(token_id, true);
        Ok(())
    }

    pub async fn disable_token(&self, token_id: &TokenId) -> Result<(), ApiError> {
        self.actions.disable_user_access_token(token_id).await?;
        self.store.set_token_active(token_id, false);
        Ok(())
    }
}
