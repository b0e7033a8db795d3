use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Server-assigned user identifier.
///
/// Bots are users on the server, so a bot is addressed by the id of its
/// backing user account. Owners and tokens are looked up by the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("user id cannot be empty".to_string());
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!("invalid user id: '{trimmed}'"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// A bot account as returned by the server.
///
/// Timestamps are milliseconds since the Unix epoch, matching the wire
/// format. A non-zero `delete_at` marks the bot as disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bot {
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// User id of the account that created the bot (or a plugin id).
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub create_at: i64,
    #[serde(default)]
    pub update_at: i64,
    /// Delete marker. Zero while the bot is enabled.
    #[serde(default)]
    pub delete_at: i64,
}

impl Bot {
    /// Lifecycle state derived from the delete marker.
    pub fn state(&self) -> BotState {
        BotState::from_delete_at(self.delete_at)
    }

    pub fn is_enabled(&self) -> bool {
        self.state() == BotState::Enabled
    }

    /// Display name when set, username otherwise.
    pub fn label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        millis_to_datetime(self.create_at)
    }

    pub fn disabled_at(&self) -> Option<DateTime<Utc>> {
        if self.delete_at > 0 {
            millis_to_datetime(self.delete_at)
        } else {
            None
        }
    }
}

/// Enabled/disabled partition of a bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotState {
    Enabled,
    Disabled,
}

impl BotState {
    /// Positive markers are disabled; zero (and the never-issued negative
    /// values) count as enabled.
    pub fn from_delete_at(delete_at: i64) -> Self {
        if delete_at > 0 {
            BotState::Disabled
        } else {
            BotState::Enabled
        }
    }
}

impl fmt::Display for BotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotState::Enabled => write!(f, "enabled"),
            BotState::Disabled => write!(f, "disabled"),
        }
    }
}

/// Body of a bot creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBotRequest {
    pub username: String,
    pub display_name: String,
    pub description: String,
}

/// Partial update of an existing bot. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchBotRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PatchBotRequest {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.display_name.is_none() && self.description.is_none()
    }
}

pub(crate) fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    if millis <= 0 {
        return None;
    }
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot(delete_at: i64) -> Bot {
        Bot {
            user_id: UserId::new("abc123"),
            username: "deploybot".to_string(),
            display_name: String::new(),
            description: String::new(),
            owner_id: "owner1".to_string(),
            create_at: 1_560_000_000_000,
            update_at: 1_560_000_000_000,
            delete_at,
        }
    }

    #[test]
    fn test_zero_delete_at_is_enabled() {
        assert_eq!(bot(0).state(), BotState::Enabled);
        assert!(bot(0).disabled_at().is_none());
    }

    #[test]
    fn test_positive_delete_at_is_disabled() {
        let b = bot(1_560_000_500_000);
        assert_eq!(b.state(), BotState::Disabled);
        assert!(!b.is_enabled());
        assert!(b.disabled_at().is_some());
    }

    #[test]
    fn test_label_falls_back_to_username() {
        let mut b = bot(0);
        assert_eq!(b.label(), "deploybot");
        b.display_name = "Deploy Bot".to_string();
        assert_eq!(b.label(), "Deploy Bot");
    }

    #[test]
    fn test_deserialize_missing_optional_fields() {
        let json = r#"{"user_id":"u1","username":"ci"}"#;
        let b: Bot = serde_json::from_str(json).unwrap();
        assert_eq!(b.user_id, UserId::new("u1"));
        assert_eq!(b.display_name, "");
        assert_eq!(b.delete_at, 0);
    }

    #[test]
    fn test_user_id_parse_rejects_garbage() {
        assert!("".parse::<UserId>().is_err());
        assert!("a/b".parse::<UserId>().is_err());
        assert_eq!("  abc  ".parse::<UserId>().unwrap(), UserId::new("abc"));
    }

    #[test]
    fn test_patch_skips_unset_fields() {
        let patch = PatchBotRequest {
            description: Some("new".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"description": "new"}));
        assert!(!patch.is_empty());
        assert!(PatchBotRequest::default().is_empty());
    }
}
