//! In-memory `BotActions` used by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use backstage_types::bot::{Bot, CreateBotRequest, PatchBotRequest, UserId};
use backstage_types::error::ApiError;
use backstage_types::token::{AccessToken, CreatedAccessToken, TokenId};
use backstage_types::user::User;

use crate::actions::{BotActions, IconUpload};

pub fn bot(id: &str, delete_at: i64) -> Bot {
    Bot {
        user_id: UserId::new(id),
        username: format!("{id}-bot"),
        display_name: format!("Bot {}", id.to_uppercase()),
        description: String::new(),
        owner_id: format!("owner-{id}"),
        create_at: 1_550_000_000_000,
        update_at: 1_550_000_000_000,
        delete_at,
    }
}

pub fn user(id: &str) -> User {
    User {
        id: UserId::new(id),
        username: id.to_string(),
        first_name: String::new(),
        last_name: String::new(),
        nickname: String::new(),
        email: format!("{id}@example.com"),
        delete_at: 0,
    }
}

pub fn token(id: &str, bot_id: &str) -> AccessToken {
    AccessToken {
        id: TokenId::new(id),
        user_id: UserId::new(bot_id),
        description: format!("token {id}"),
        is_active: true,
    }
}

#[derive(Default)]
struct MockState {
    bots: Vec<Bot>,
    tokens: HashMap<UserId, Vec<AccessToken>>,
    users: HashMap<UserId, User>,
    calls: HashMap<&'static str, usize>,
    uploads: Vec<(UserId, IconUpload)>,
    next_id: usize,
}

/// Records every call; answers from in-memory fixtures.
///
/// When gated, each call waits for one permit on [`MockActions::gate`]
/// before answering, so tests can observe intermediate states.
pub struct MockActions {
    state: Mutex<MockState>,
    failing: Vec<&'static str>,
    gate: Option<Arc<Semaphore>>,
}

impl MockActions {
    pub fn new(bots: Vec<Bot>) -> Self {
        Self {
            state: Mutex::new(MockState {
                bots,
                ..Default::default()
            }),
            failing: Vec::new(),
            gate: None,
        }
    }

    pub fn with_tokens(self, bot_id: &str, tokens: Vec<AccessToken>) -> Self {
        self.state
            .lock()
            .unwrap()
            .tokens
            .insert(UserId::new(bot_id), tokens);
        self
    }

    pub fn with_user(self, user: User) -> Self {
        self.state.lock().unwrap().users.insert(user.id.clone(), user);
        self
    }

    /// Make the named operation fail with a server error.
    pub fn failing(mut self, op: &'static str) -> Self {
        self.failing.push(op);
        self
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub fn gate(&self) -> Arc<Semaphore> {
        Arc::clone(self.gate.as_ref().expect("mock is not gated"))
    }

    pub fn calls(&self, op: &str) -> usize {
        self.state.lock().unwrap().calls.get(op).copied().unwrap_or(0)
    }

    pub fn uploads(&self) -> Vec<(UserId, IconUpload)> {
        self.state.lock().unwrap().uploads.clone()
    }

    async fn enter(&self, op: &'static str) -> Result<(), ApiError> {
        *self.state.lock().unwrap().calls.entry(op).or_default() += 1;
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        if self.failing.contains(&op) {
            return Err(ApiError::Status {
                status: 500,
                id: "mock.failure".to_string(),
                message: format!("{op} failed"),
            });
        }
        Ok(())
    }

    fn set_delete_at(&self, user_id: &UserId, delete_at: i64) -> Result<Bot, ApiError> {
        let mut state = self.state.lock().unwrap();
        let bot = state
            .bots
            .iter_mut()
            .find(|b| &b.user_id == user_id)
            .ok_or_else(|| ApiError::NotFound(format!("bot {user_id}")))?;
        bot.delete_at = delete_at;
        Ok(bot.clone())
    }

    fn with_token<T>(
        &self,
        token_id: &TokenId,
        f: impl FnOnce(&mut Vec<AccessToken>, usize) -> T,
    ) -> Result<T, ApiError> {
        let mut state = self.state.lock().unwrap();
        for tokens in state.tokens.values_mut() {
            if let Some(pos) = tokens.iter().position(|t| &t.id == token_id) {
                return Ok(f(tokens, pos));
            }
        }
        Err(ApiError::NotFound(format!("token {token_id}")))
    }
}

impl BotActions for MockActions {
    async fn load_bots(&self) -> Result<Vec<Bot>, ApiError> {
        self.enter("load_bots").await?;
        Ok(self.state.lock().unwrap().bots.clone())
    }

    async fn get_user_access_tokens_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AccessToken>, ApiError> {
        self.enter("get_user_access_tokens_for_user").await?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .tokens
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_user(&self, user_id: &UserId) -> Result<User, ApiError> {
        self.enter("get_user").await?;
        self.state
            .lock()
            .unwrap()
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("user {user_id}")))
    }

    async fn create_user_access_token(
        &self,
        user_id: &UserId,
        description: &str,
    ) -> Result<CreatedAccessToken, ApiError> {
        self.enter("create_user_access_token").await?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = CreatedAccessToken {
            id: TokenId::new(format!("new-token-{}", state.next_id)),
            user_id: user_id.clone(),
            description: description.to_string(),
            is_active: true,
            token: "secret".to_string(),
        };
        state
            .tokens
            .entry(user_id.clone())
            .or_default()
            .push(created.metadata());
        Ok(created)
    }

    async fn revoke_user_access_token(&self, token_id: &TokenId) -> Result<(), ApiError> {
        self.enter("revoke_user_access_token").await?;
        self.with_token(token_id, |tokens, pos| {
            tokens.remove(pos);
        })
    }

    async fn enable_user_access_token(&self, token_id: &TokenId) -> Result<(), ApiError> {
        self.enter("enable_user_access_token").await?;
        self.with_token(token_id, |tokens, pos| tokens[pos].is_active = true)
    }

    async fn disable_user_access_token(&self, token_id: &TokenId) -> Result<(), ApiError> {
        self.enter("disable_user_access_token").await?;
        self.with_token(token_id, |tokens, pos| tokens[pos].is_active = false)
    }

    async fn enable_bot(&self, user_id: &UserId) -> Result<Bot, ApiError> {
        self.enter("enable_bot").await?;
        self.set_delete_at(user_id, 0)
    }

    async fn disable_bot(&self, user_id: &UserId) -> Result<Bot, ApiError> {
        self.enter("disable_bot").await?;
        self.set_delete_at(user_id, 1_560_000_000_000)
    }

    async fn create_bot(&self, request: &CreateBotRequest) -> Result<Bot, ApiError> {
        self.enter("create_bot").await?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let bot = Bot {
            user_id: UserId::new(format!("created{}", state.next_id)),
            username: request.username.clone(),
            display_name: request.display_name.clone(),
            description: request.description.clone(),
            owner_id: "me".to_string(),
            create_at: 1_560_000_000_000,
            update_at: 1_560_000_000_000,
            delete_at: 0,
        };
        state.bots.push(bot.clone());
        Ok(bot)
    }

    async fn patch_bot(&self, user_id: &UserId, patch: &PatchBotRequest) -> Result<Bot, ApiError> {
        self.enter("patch_bot").await?;
        let mut state = self.state.lock().unwrap();
        let bot = state
            .bots
            .iter_mut()
            .find(|b| &b.user_id == user_id)
            .ok_or_else(|| ApiError::NotFound(format!("bot {user_id}")))?;
        if let Some(username) = &patch.username {
            bot.username = username.clone();
        }
        if let Some(display_name) = &patch.display_name {
            bot.display_name = display_name.clone();
        }
        if let Some(description) = &patch.description {
            bot.description = description.clone();
        }
        Ok(bot.clone())
    }

    async fn upload_profile_image(
        &self,
        user_id: &UserId,
        icon: &IconUpload,
    ) -> Result<(), ApiError> {
        self.enter("upload_profile_image").await?;
        self.state
            .lock()
            .unwrap()
            .uploads
            .push((user_id.clone(), icon.clone()));
        Ok(())
    }
}
