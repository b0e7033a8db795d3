//! Shared client-side cache of bots, owners and access tokens.
//!
//! Owners and token sets are keyed by the *bot's* user id. A missing entry
//! means "not loaded yet": readers get `None` or an empty token set.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use dashmap::DashMap;

use backstage_types::bot::{Bot, UserId};
use backstage_types::token::{AccessToken, TokenId, TokenMap, token_map};
use backstage_types::user::User;

#[derive(Debug, Default)]
pub struct BotStore {
    /// Bots in the order the server listed them.
    bots: RwLock<Vec<Bot>>,
    owners: DashMap<UserId, User>,
    access_tokens: DashMap<UserId, TokenMap>,
}

impl BotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the bot listing with a fresh enumeration.
    ///
    /// Owners and token sets of bots missing from the new listing are dropped.
    pub fn replace_bots(&self, bots: Vec<Bot>) {
        let mut guard = self.bots.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Vec::with_capacity(bots.len());
        for bot in bots {
            upsert(&mut guard, bot);
        }
        let listed: HashSet<&UserId> = guard.iter().map(|b| &b.user_id).collect();
        self.owners.retain(|bot_id, _| listed.contains(bot_id));
        self.access_tokens.retain(|bot_id, _| listed.contains(bot_id));
    }

    /// Insert or update a single bot, keeping its position if already known.
    pub fn upsert_bot(&self, bot: Bot) {
        let mut guard = self.bots.write().unwrap_or_else(PoisonError::into_inner);
        upsert(&mut guard, bot);
    }

    pub fn bots(&self) -> Vec<Bot> {
        self.bots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn bot(&self, user_id: &UserId) -> Option<Bot> {
        self.bots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|b| &b.user_id == user_id)
            .cloned()
    }

    /// Find a bot by username (exact, case-insensitive).
    pub fn bot_by_username(&self, username: &str) -> Option<Bot> {
        self.bots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|b| b.username.eq_ignore_ascii_case(username))
            .cloned()
    }

    pub fn receive_owner(&self, bot_id: UserId, owner: User) {
        self.owners.insert(bot_id, owner);
    }

    pub fn owner(&self, bot_id: &UserId) -> Option<User> {
        self.owners.get(bot_id).map(|o| o.value().clone())
    }

    pub fn receive_access_tokens(&self, bot_id: UserId, tokens: Vec<AccessToken>) {
        self.access_tokens.insert(bot_id, token_map(tokens));
    }

    /// Token set of a bot; empty when not loaded.
    pub fn access_tokens(&self, bot_id: &UserId) -> TokenMap {
        self.access_tokens
            .get(bot_id)
            .map(|t| t.value().clone())
            .unwrap_or_default()
    }

    pub fn insert_token(&self, token: AccessToken) {
        self.access_tokens
            .entry(token.user_id.clone())
            .or_default()
            .insert(token.id.clone(), token);
    }

    /// Drop a revoked token. Returns whether it was known.
    pub fn remove_token(&self, token_id: &TokenId) -> bool {
        self.access_tokens
            .iter_mut()
            .any(|mut tokens| tokens.value_mut().remove(token_id).is_some())
    }

    /// Flip a token's active flag. Returns whether it was known.
    pub fn set_token_active(&self, token_id: &TokenId, active: bool) -> bool {
        for mut tokens in self.access_tokens.iter_mut() {
            if let Some(token) = tokens.value_mut().get_mut(token_id) {
                token.is_active = active;
                return true;
            }
        }
        false
    }
}

fn upsert(bots: &mut Vec<Bot>, bot: Bot) {
    match bots.iter_mut().find(|b| b.user_id == bot.user_id) {
        Some(existing) => *existing = bot,
        None => bots.push(bot),
    }
}
