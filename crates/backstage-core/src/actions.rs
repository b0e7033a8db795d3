//! The `BotActions` port.
//!
//! Every server call the backstage needs goes through this trait. The list
//! controller and the editor form receive an implementation at construction
//! time; `backstage-infra` provides the HTTP one.

use std::future::Future;

use serde::Serialize;

use backstage_types::bot::{Bot, CreateBotRequest, PatchBotRequest, UserId};
use backstage_types::error::ApiError;
use backstage_types::token::{AccessToken, CreatedAccessToken, TokenId};
use backstage_types::user::User;

/// An image selected for upload as a bot's icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IconUpload {
    pub file_name: String,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl IconUpload {
    /// Build an upload, guessing the content type from the file extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Server operations used by the bot backstage.
///
/// Implementations live in backstage-infra (e.g., `HttpBotActions`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait BotActions: Send + Sync {
    /// Enumerate every bot account, disabled ones included.
    fn load_bots(&self) -> impl Future<Output = Result<Vec<Bot>, ApiError>> + Send;

    /// List the access tokens of a bot.
    fn get_user_access_tokens_for_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<AccessToken>, ApiError>> + Send;

    /// Fetch a user record.
    fn get_user(&self, user_id: &UserId) -> impl Future<Output = Result<User, ApiError>> + Send;

    fn create_user_access_token(
        &self,
        user_id: &UserId,
        description: &str,
    ) -> impl Future<Output = Result<CreatedAccessToken, ApiError>> + Send;

    fn revoke_user_access_token(
        &self,
        token_id: &TokenId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn enable_user_access_token(
        &self,
        token_id: &TokenId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn disable_user_access_token(
        &self,
        token_id: &TokenId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Re-enable a disabled bot. Returns the updated record.
    fn enable_bot(&self, user_id: &UserId) -> impl Future<Output = Result<Bot, ApiError>> + Send;

    /// Disable a bot. Returns the updated record with a non-zero delete marker.
    fn disable_bot(&self, user_id: &UserId)
    -> impl Future<Output = Result<Bot, ApiError>> + Send;

    fn create_bot(
        &self,
        request: &CreateBotRequest,
    ) -> impl Future<Output = Result<Bot, ApiError>> + Send;

    fn patch_bot(
        &self,
        user_id: &UserId,
        patch: &PatchBotRequest,
    ) -> impl Future<Output = Result<Bot, ApiError>> + Send;

    /// Replace the profile image of a (bot) user.
    fn upload_profile_image(
        &self,
        user_id: &UserId,
        icon: &IconUpload,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_content_type_from_extension() {
        assert_eq!(IconUpload::new("a.PNG", vec![]).content_type, "image/png");
        assert_eq!(IconUpload::new("a.jpeg", vec![]).content_type, "image/jpeg");
        assert_eq!(IconUpload::new("icon.svg", vec![]).content_type, "image/svg+xml");
        assert_eq!(
            IconUpload::new("notes.txt", vec![]).content_type,
            "application/octet-stream"
        );
        assert_eq!(
            IconUpload::new("noext", vec![]).content_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn test_icon_size() {
        assert_eq!(IconUpload::new("a.png", vec![0; 42]).size(), 42);
    }
}
