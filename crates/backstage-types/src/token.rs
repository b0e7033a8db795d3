use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bot::UserId;

/// Identifier of a personal access token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Access token metadata. The secret itself is never returned after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: TokenId,
    pub user_id: UserId,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Tokens of a single user, keyed by token id.
pub type TokenMap = BTreeMap<TokenId, AccessToken>;

/// Build a [`TokenMap`] from a server token listing.
pub fn token_map(tokens: impl IntoIterator<Item = AccessToken>) -> TokenMap {
    tokens.into_iter().map(|t| (t.id.clone(), t)).collect()
}

/// A freshly created token, carrying the one-time secret value.
#[derive(Clone, Serialize, Deserialize)]
pub struct CreatedAccessToken {
    pub id: TokenId,
    pub user_id: UserId,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// The secret. Only available in the creation response.
    pub token: String,
}

impl CreatedAccessToken {
    /// Metadata without the secret, as stored alongside the other tokens.
    pub fn metadata(&self) -> AccessToken {
        AccessToken {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            description: self.description.clone(),
            is_active: self.is_active,
        }
    }
}

impl fmt::Debug for CreatedAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatedAccessToken")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("description", &self.description)
            .field("is_active", &self.is_active)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(id: &str, active: bool) -> AccessToken {
        AccessToken {
            id: TokenId::new(id),
            user_id: UserId::new("bot1"),
            description: format!("token {id}"),
            is_active: active,
        }
    }

    #[test]
    fn test_token_map_keys_by_id() {
        let map = token_map(vec![token("b", true), token("a", false)]);
        let ids: Vec<_> = map.keys().map(|k| k.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(!map[&TokenId::new("a")].is_active);
    }

    #[test]
    fn test_is_active_defaults_to_true() {
        let t: AccessToken =
            serde_json::from_str(r#"{"id":"t1","user_id":"bot1","description":"ci"}"#).unwrap();
        assert!(t.is_active);
    }

    #[test]
    fn test_created_token_debug_redacts_secret() {
        let created = CreatedAccessToken {
            id: TokenId::new("t1"),
            user_id: UserId::new("bot1"),
            description: "ci".to_string(),
            is_active: true,
            token: "s3cr3t-value".to_string(),
        };
        let debug = format!("{created:?}");
        assert!(!debug.contains("s3cr3t-value"));
        assert_eq!(created.metadata().id, TokenId::new("t1"));
    }
}
