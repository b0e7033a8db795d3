//! HttpBotActions -- concrete [`BotActions`] implementation over the
//! server's REST API (`/api/v4`).
//!
//! Every request carries `Authorization: Bearer <token>`. The token is
//! wrapped in [`secrecy::SecretString`] and is never logged or included in
//! `Debug` output.

mod error;

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use backstage_core::actions::{BotActions, IconUpload};
use backstage_types::bot::{Bot, CreateBotRequest, PatchBotRequest, UserId};
use backstage_types::config::BackstageConfig;
use backstage_types::error::ApiError;
use backstage_types::token::{AccessToken, CreatedAccessToken, TokenId};
use backstage_types::user::User;

const USER_AGENT: &str = concat!("backstage/", env!("CARGO_PKG_VERSION"));

/// Largest page the server returns, whatever `per_page` asks for.
pub const MAX_PER_PAGE: u32 = 200;

/// REST client for bot account management.
pub struct HttpBotActions {
    client: reqwest::Client,
    token: SecretString,
    /// `<server>/api/v4`, without a trailing slash.
    api_url: String,
    per_page: u32,
}

// HttpBotActions does not derive Debug; the token must not end up in logs.

impl HttpBotActions {
    pub fn new(
        server_url: &str,
        token: SecretString,
        timeout: Duration,
        per_page: u32,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(error::from_reqwest)?;

        Ok(Self {
            client,
            token,
            api_url: format!("{}/api/v4", server_url.trim_end_matches('/')),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        })
    }

    pub fn from_config(config: &BackstageConfig, token: SecretString) -> Result<Self, ApiError> {
        Self::new(
            &config.server_url,
            token,
            Duration::from_secs(config.request_timeout_secs),
            config.per_page,
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(method = %method, path, "API request");
        self.client
            .request(method, format!("{}{}", self.api_url, path))
            .bearer_auth(self.token.expose_secret())
    }

    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await.map_err(error::from_reqwest)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = error::from_status(status, &body);
        debug!(status = status.as_u16(), error = %err, "API request failed");
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.execute(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// For endpoints that answer with a `{"status":"OK"}` body.
    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.execute(request).await.map(|_| ())
    }

    /// Fetch every page of a listing endpoint, stopping at the first empty page.
    ///
    /// A short page is not treated as the end since the server may cap the
    /// page size below the requested `per_page`.
    async fn paginate<T: DeserializeOwned>(
        &self,
        path: &str,
        extra: &[(&str, &str)],
    ) -> Result<Vec<T>, ApiError> {
        let mut all = Vec::new();
        let mut page: u32 = 0;
        loop {
            let request = self
                .request(Method::GET, path)
                .query(extra)
                .query(&[("page", page), ("per_page", self.per_page)]);
            let batch: Vec<T> = self.send_json(request).await?;
            if batch.is_empty() {
                return Ok(all);
            }
            all.extend(batch);
            page += 1;
        }
    }
}

impl BotActions for HttpBotActions {
    async fn load_bots(&self) -> Result<Vec<Bot>, ApiError> {
        self.paginate("/bots", &[("include_deleted", "true")]).await
    }

    async fn get_user_access_tokens_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AccessToken>, ApiError> {
        self.paginate(&format!("/users/{user_id}/tokens"), &[]).await
    }

    async fn get_user(&self, user_id: &UserId) -> Result<User, ApiError> {
        self.send_json(self.request(Method::GET, &format!("/users/{user_id}")))
            .await
    }

    async fn create_user_access_token(
        &self,
        user_id: &UserId,
        description: &str,
    ) -> Result<CreatedAccessToken, ApiError> {
        let request = self
            .request(Method::POST, &format!("/users/{user_id}/tokens"))
            .json(&json!({ "description": description }));
        self.send_json(request).await
    }

    async fn revoke_user_access_token(&self, token_id: &TokenId) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/users/tokens/revoke")
            .json(&json!({ "token_id": token_id }));
        self.send_empty(request).await
    }

    async fn enable_user_access_token(&self, token_id: &TokenId) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/users/tokens/enable")
            .json(&json!({ "token_id": token_id }));
        self.send_empty(request).await
    }

    async fn disable_user_access_token(&self, token_id: &TokenId) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/users/tokens/disable")
            .json(&json!({ "token_id": token_id }));
        self.send_empty(request).await
    }

    async fn enable_bot(&self, user_id: &UserId) -> Result<Bot, ApiError> {
        self.send_json(self.request(Method::POST, &format!("/bots/{user_id}/enable")))
            .await
    }

    async fn disable_bot(&self, user_id: &UserId) -> Result<Bot, ApiError> {
        self.send_json(self.request(Method::POST, &format!("/bots/{user_id}/disable")))
            .await
    }

    async fn create_bot(&self, request: &CreateBotRequest) -> Result<Bot, ApiError> {
        self.send_json(self.request(Method::POST, "/bots").json(request))
            .await
    }

    async fn patch_bot(&self, user_id: &UserId, patch: &PatchBotRequest) -> Result<Bot, ApiError> {
        self.send_json(
            self.request(Method::PUT, &format!("/bots/{user_id}"))
                .json(patch),
        )
        .await
    }

    async fn upload_profile_image(
        &self,
        user_id: &UserId,
        icon: &IconUpload,
    ) -> Result<(), ApiError> {
        let part = reqwest::multipart::Part::bytes(icon.bytes.clone())
            .file_name(icon.file_name.clone())
            .mime_str(&icon.content_type)
            .map_err(error::from_reqwest)?;
        let form = reqwest::multipart::Form::new().part("image", part);

        self.send_empty(
            self.request(Method::POST, &format!("/users/{user_id}/image"))
                .multipart(form),
        )
        .await
    }
}
