//! Bot create/edit form.
//!
//! Holds the local state behind the username, display name and description
//! inputs plus the optional icon image, validates it, and submits it through
//! [`BotActions`]. Input values always mirror local state and default to the
//! empty string.

use thiserror::Error;
use tracing::{debug, info};

use backstage_types::bot::{Bot, CreateBotRequest, PatchBotRequest, UserId};
use backstage_types::error::{ApiError, FormError, FormField};
use backstage_types::team::Team;

use crate::actions::{BotActions, IconUpload};

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 22;
pub const MAX_DISPLAY_NAME_LENGTH: usize = 64;
pub const MAX_DESCRIPTION_LENGTH: usize = 1024;

/// Image types accepted as bot icons.
pub const ACCEPTED_ICON_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/bmp",
    "image/gif",
    "image/svg+xml",
];

/// Whether the form creates a new bot or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(UserId),
}

/// Validated payload ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotSubmission {
    Create {
        request: CreateBotRequest,
        icon: Option<IconUpload>,
    },
    Patch {
        user_id: UserId,
        patch: PatchBotRequest,
        icon: Option<IconUpload>,
    },
}

/// Result of a successful submit.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub bot: Bot,
    /// Where the page navigates next.
    pub redirect: String,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FormError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone)]
pub struct BotEditorForm {
    team: Team,
    max_file_size: u64,
    original: Option<Bot>,
    username: String,
    display_name: String,
    description: String,
    icon: Option<IconUpload>,
    /// User-visible error from validation or the server.
    error: Option<String>,
}

impl BotEditorForm {
    /// Blank form for creating a bot.
    pub fn new(team: Team, max_file_size: u64) -> Self {
        Self {
            team,
            max_file_size,
            original: None,
            username: String::new(),
            display_name: String::new(),
            description: String::new(),
            icon: None,
            error: None,
        }
    }

    /// Form seeded from an existing bot.
    pub fn for_bot(bot: &Bot, team: Team, max_file_size: u64) -> Self {
        Self {
            original: Some(bot.clone()),
            username: bot.username.clone(),
            display_name: bot.display_name.clone(),
            description: bot.description.clone(),
            ..Self::new(team, max_file_size)
        }
    }

    pub fn mode(&self) -> EditorMode {
        match &self.original {
            Some(bot) => EditorMode::Edit(bot.user_id.clone()),
            None => EditorMode::Create,
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Current value of a text input. The icon input has no text value.
    pub fn input_value(&self, field: FormField) -> &str {
        match field {
            FormField::Username => &self.username,
            FormField::DisplayName => &self.display_name,
            FormField::Description => &self.description,
            FormField::Icon => "",
        }
    }

    /// Look an input up by its element id.
    pub fn input_by_id(&self, id: &str) -> Option<&str> {
        [
            FormField::Username,
            FormField::DisplayName,
            FormField::Description,
        ]
        .into_iter()
        .find(|f| f.input_id() == id)
        .map(|f| self.input_value(f))
    }

    /// Update a text input. Usernames are lower-cased as typed.
    pub fn set_input(&mut self, field: FormField, value: &str) {
        match field {
            FormField::Username => self.username = value.to_lowercase(),
            FormField::DisplayName => self.display_name = value.to_string(),
            FormField::Description => self.description = value.to_string(),
            FormField::Icon => {}
        }
    }

    pub fn icon(&self) -> Option<&IconUpload> {
        self.icon.as_ref()
    }

    /// Attach an icon. Oversized or non-image files are rejected, reported
    /// on the form, and leave no icon attached.
    pub fn select_icon(&mut self, icon: IconUpload) -> Result<(), FormError> {
        match check_icon(&icon, self.max_file_size) {
            Ok(()) => {
                self.icon = Some(icon);
                self.error = None;
                Ok(())
            }
            Err(err) => {
                debug!(file = %icon.file_name, error = %err, "Rejected bot icon");
                self.icon = None;
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// All validation problems, in input order.
    pub fn validate(&self) -> Vec<FormError> {
        let mut errors = Vec::new();

        if self.username.trim().is_empty() {
            errors.push(FormError::Required(FormField::Username));
        } else if !is_valid_username(self.username.trim()) {
            errors.push(FormError::InvalidUsername);
        }

        check_text(
            &mut errors,
            FormField::DisplayName,
            &self.display_name,
            MAX_DISPLAY_NAME_LENGTH,
        );
        check_text(
            &mut errors,
            FormField::Description,
            &self.description,
            MAX_DESCRIPTION_LENGTH,
        );

        if let Some(icon) = &self.icon {
            if let Err(err) = check_icon(icon, self.max_file_size) {
                errors.push(err);
            }
        }

        errors
    }

    /// Build the payload, or the first validation error.
    ///
    /// When editing, only fields that differ from the original bot are sent.
    pub fn submission(&self) -> Result<BotSubmission, FormError> {
        if let Some(err) = self.validate().into_iter().next() {
            return Err(err);
        }

        let username = self.username.trim().to_string();
        let display_name = self.display_name.trim().to_string();
        let description = self.description.trim().to_string();
        let icon = self.icon.clone();

        Ok(match &self.original {
            None => BotSubmission::Create {
                request: CreateBotRequest {
                    username,
                    display_name,
                    description,
                },
                icon,
            },
            Some(original) => BotSubmission::Patch {
                user_id: original.user_id.clone(),
                patch: PatchBotRequest {
                    username: changed(&original.username, username),
                    display_name: changed(&original.display_name, display_name),
                    description: changed(&original.description, description),
                },
                icon,
            },
        })
    }

    /// Validate and send the form.
    ///
    /// Errors are also recorded on the form for display. The form stays
    /// usable after a failure. A created bot is kept even when its icon
    /// upload fails, so a retry edits that bot instead of creating another.
    pub async fn submit<A: BotActions>(
        &mut self,
        actions: &A,
    ) -> Result<SubmitOutcome, SubmitError> {
        let submission = match self.submission() {
            Ok(s) => s,
            Err(err) => {
                self.error = Some(err.to_string());
                return Err(err.into());
            }
        };

        self.error = None;
        match self.send(actions, submission).await {
            Ok(outcome) => {
                self.original = Some(outcome.bot.clone());
                self.icon = None;
                Ok(outcome)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    async fn send<A: BotActions>(
        &mut self,
        actions: &A,
        submission: BotSubmission,
    ) -> Result<SubmitOutcome, ApiError> {
        match submission {
            BotSubmission::Create { request, icon } => {
                let bot = actions.create_bot(&request).await?;
                info!(bot_id = %bot.user_id, username = %bot.username, "Bot created");
                self.original = Some(bot.clone());
                if let Some(icon) = icon {
                    actions.upload_profile_image(&bot.user_id, &icon).await?;
                }
                let redirect = self.team.confirm_bot_path(&bot.user_id);
                Ok(SubmitOutcome { bot, redirect })
            }
            BotSubmission::Patch {
                user_id,
                patch,
                icon,
            } => {
                let bot = if patch.is_empty() {
                    debug!(bot_id = %user_id, "No field changes, skipping patch");
                    self.original.clone().ok_or_else(|| {
                        ApiError::NotFound(format!("bot {user_id}"))
                    })?
                } else {
                    let bot = actions.patch_bot(&user_id, &patch).await?;
                    info!(bot_id = %user_id, "Bot updated");
                    self.original = Some(bot.clone());
                    bot
                };
                if let Some(icon) = icon {
                    actions.upload_profile_image(&user_id, &icon).await?;
                }
                Ok(SubmitOutcome {
                    bot,
                    redirect: self.team.bots_path(),
                })
            }
        }
    }
}

/// Server username rules: 3-22 characters, starting with a lowercase letter,
/// drawn from `a-z 0-9 . - _`.
pub fn is_valid_username(username: &str) -> bool {
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return false;
    }
    let mut chars = username.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_lowercase()) {
        return false;
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '_'))
}

fn check_text(errors: &mut Vec<FormError>, field: FormField, value: &str, max: usize) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(FormError::Required(field));
    } else if value.chars().count() > max {
        errors.push(FormError::TooLong { field, max });
    }
}

fn check_icon(icon: &IconUpload, max_file_size: u64) -> Result<(), FormError> {
    if icon.bytes.is_empty() {
        return Err(FormError::EmptyIcon);
    }
    if !ACCEPTED_ICON_TYPES.contains(&icon.content_type.as_str()) {
        return Err(FormError::UnsupportedIconType(icon.content_type.clone()));
    }
    if icon.size() > max_file_size {
        return Err(FormError::IconTooLarge {
            size: icon.size(),
            max: max_file_size,
        });
    }
    Ok(())
}

fn changed(original: &str, value: String) -> Option<String> {
    if original == value { None } else { Some(value) }
}
