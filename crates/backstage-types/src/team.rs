//! Team routing context.
//!
//! Backstage pages are team scoped, so every link is built from the team's
//! URL name.

use serde::{Deserialize, Serialize};

use crate::bot::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub id: String,
    /// URL-safe team name used in routes.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

impl Team {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            display_name: String::new(),
        }
    }

    /// `/<team>/integrations/bots`
    pub fn bots_path(&self) -> String {
        format!("/{}/integrations/bots", self.name)
    }

    /// `/<team>/integrations/bots/add`
    pub fn add_bot_path(&self) -> String {
        format!("{}/add", self.bots_path())
    }

    /// `/<team>/integrations/bots/edit?id=<user_id>`
    pub fn edit_bot_path(&self, user_id: &UserId) -> String {
        format!("{}/edit?id={}", self.bots_path(), user_id)
    }

    /// Confirmation page shown after a bot is created.
    pub fn confirm_bot_path(&self, user_id: &UserId) -> String {
        format!(
            "/{}/integrations/confirm?type=bots&id={}",
            self.name, user_id
        )
    }
}
