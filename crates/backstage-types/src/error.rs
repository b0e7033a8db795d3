use std::fmt;

use thiserror::Error;

/// Errors returned by the server API (used by the `BotActions` port in backstage-core).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server returned {status}: {message}")]
    Status {
        status: u16,
        /// Server error id, e.g. `api.context.permissions.app_error`.
        id: String,
        message: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Errors from the bot list load sequence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("failed to load bots: {0}")]
    Bots(#[source] ApiError),

    #[error("failed to load access tokens for {user_id}: {source}")]
    AccessTokens { user_id: String, source: ApiError },

    #[error("failed to load owner of {user_id}: {source}")]
    Owner { user_id: String, source: ApiError },

    #[error("load cancelled")]
    Cancelled,
}

/// Inputs of the bot editor form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Username,
    DisplayName,
    Description,
    Icon,
}

impl FormField {
    /// Element id of the corresponding input.
    pub fn input_id(&self) -> &'static str {
        match self {
            FormField::Username => "username",
            FormField::DisplayName => "displayName",
            FormField::Description => "description",
            FormField::Icon => "image",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormField::Username => write!(f, "username"),
            FormField::DisplayName => write!(f, "display name"),
            FormField::Description => write!(f, "description"),
            FormField::Icon => write!(f, "icon"),
        }
    }
}

/// Validation errors shown next to the editor form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Required(FormField),

    #[error(
        "usernames must begin with a lowercase letter and be 3-22 characters long, \
         using only lowercase letters, numbers and the symbols '.', '-' and '_'"
    )]
    InvalidUsername,

    #[error("{field} must be at most {max} characters")]
    TooLong { field: FormField, max: usize },

    #[error("image size too large: {size} bytes exceeds the {max} byte limit")]
    IconTooLarge { size: u64, max: u64 },

    #[error("unsupported image type '{0}'")]
    UnsupportedIconType(String),

    #[error("image file is empty")]
    EmptyIcon,
}

impl FormError {
    /// The input this error belongs to.
    pub fn field(&self) -> FormField {
        match self {
            FormError::Required(field) | FormError::TooLong { field, .. } => *field,
            FormError::InvalidUsername => FormField::Username,
            FormError::IconTooLarge { .. }
            | FormError::UnsupportedIconType(_)
            | FormError::EmptyIcon => FormField::Icon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 403,
            id: "api.context.permissions.app_error".to_string(),
            message: "You do not have the appropriate permissions.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "server returned 403: You do not have the appropriate permissions."
        );
    }

    #[test]
    fn test_form_error_field() {
        assert_eq!(
            FormError::Required(FormField::Description).field(),
            FormField::Description
        );
        assert_eq!(FormError::InvalidUsername.field(), FormField::Username);
        assert_eq!(
            FormError::IconTooLarge { size: 2, max: 1 }.field(),
            FormField::Icon
        );
    }

    #[test]
    fn test_form_error_display() {
        let err = FormError::Required(FormField::DisplayName);
        assert_eq!(err.to_string(), "display name is required");
    }

    #[test]
    fn test_load_error_display() {
        let err = LoadError::Owner {
            user_id: "bot1".to_string(),
            source: ApiError::NotFound("user".to_string()),
        };
        assert!(err.to_string().contains("bot1"));
        assert!(err.to_string().contains("not found"));
    }
}
