//! Per-bot row view model.

use serde::Serialize;

use backstage_types::bot::{Bot, BotState};
use backstage_types::team::Team;
use backstage_types::token::{AccessToken, TokenMap};
use backstage_types::user::User;

/// Everything a list row needs to draw one bot.
///
/// `owner` is the user record fetched for this bot, keyed by the bot's user
/// id. It is `None` until that fetch completes or when the server has no
/// such user.
#[derive(Debug, Clone, Serialize)]
pub struct BotRow {
    pub bot: Bot,
    pub owner: Option<User>,
    pub access_tokens: TokenMap,
    pub team: Team,
    /// Live search text from the list's search box.
    pub filter: String,
}

impl BotRow {
    pub fn state(&self) -> BotState {
        self.bot.state()
    }

    /// Case-insensitive substring match on username, display name and
    /// description. An empty filter matches every row.
    pub fn matches_filter(&self) -> bool {
        let filter = self.filter.trim().to_lowercase();
        if filter.is_empty() {
            return true;
        }
        [
            &self.bot.username,
            &self.bot.display_name,
            &self.bot.description,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&filter))
    }

    /// Owner username when the loaded record is the owning user, otherwise
    /// the raw owner id (plugin ids included).
    ///
    /// The list loader fetches the record by the bot's own user id, so the
    /// loaded record is the bot account and this normally yields the raw
    /// `owner_id`, not an owner username.
    pub fn owner_label(&self) -> String {
        match &self.owner {
            Some(owner) if owner.id.as_str() == self.bot.owner_id => owner.username.clone(),
            _ if self.bot.owner_id.is_empty() => "unknown".to_string(),
            _ => self.bot.owner_id.clone(),
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &AccessToken> {
        self.access_tokens.values()
    }

    pub fn active_token_count(&self) -> usize {
        self.tokens().filter(|t| t.is_active).count()
    }

    pub fn edit_link(&self) -> String {
        self.team.edit_bot_path(&self.bot.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backstage_types::bot::UserId;
    use backstage_types::token::{TokenId, token_map};

    fn row(filter: &str) -> BotRow {
        BotRow {
            bot: Bot {
                user_id: UserId::new("b1"),
                username: "release-bot".to_string(),
                display_name: "Release Manager".to_string(),
                description: "Posts changelogs".to_string(),
                owner_id: "owner1".to_string(),
                create_at: 1,
                update_at: 1,
                delete_at: 0,
            },
            owner: None,
            access_tokens: TokenMap::new(),
            team: Team::named("eng"),
            filter: filter.to_string(),
        }
    }

    #[test]
    fn test_empty_filter_matches() {
        assert!(row("").matches_filter());
        assert!(row("   ").matches_filter());
    }

    #[test]
    fn test_filter_matches_any_field_case_insensitive() {
        assert!(row("RELEASE-").matches_filter());
        assert!(row("manager").matches_filter());
        assert!(row("changelog").matches_filter());
        assert!(!row("deploy").matches_filter());
    }

    #[test]
    fn test_owner_label_falls_back_to_owner_id() {
        let mut r = row("");
        assert_eq!(r.owner_label(), "owner1");
        r.owner = Some(User {
            id: UserId::new("owner1"),
            username: "alice".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            nickname: String::new(),
            email: String::new(),
            delete_at: 0,
        });
        assert_eq!(r.owner_label(), "alice");
    }

    #[test]
    fn test_bot_account_record_shows_owner_id() {
        let mut r = row("");
        r.owner = Some(User {
            id: r.bot.user_id.clone(),
            username: r.bot.username.clone(),
            first_name: String::new(),
            last_name: String::new(),
            nickname: String::new(),
            email: String::new(),
            delete_at: 0,
        });
        assert_eq!(r.owner_label(), "owner1");
    }

    #[test]
    fn test_active_token_count() {
        let mut r = row("");
        r.access_tokens = token_map(vec![
            AccessToken {
                id: TokenId::new("t1"),
                user_id: UserId::new("b1"),
                description: String::new(),
                is_active: true,
            },
            AccessToken {
                id: TokenId::new("t2"),
                user_id: UserId::new("b1"),
                description: String::new(),
                is_active: false,
            },
        ]);
        assert_eq!(r.active_token_count(), 1);
        assert_eq!(r.tokens().count(), 2);
        assert_eq!(r.edit_link(), "/eng/integrations/bots/edit?id=b1");
    }
}
