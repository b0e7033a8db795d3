//! Mapping of transport failures and server error bodies to [`ApiError`].

use reqwest::StatusCode;
use serde::Deserialize;

use backstage_types::error::ApiError;

/// Error body returned by the server on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ServerErrorBody {
    #[serde(default)]
    id: String,
    #[serde(default)]
    message: String,
}

pub(crate) fn from_reqwest(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Transport(err.to_string())
    }
}

/// Build an [`ApiError`] from a failed response's status and body.
///
/// Bodies that are not the server's JSON error shape fall back to the raw
/// text (or the canonical status reason when empty).
pub(crate) fn from_status(status: StatusCode, body: &str) -> ApiError {
    let (id, message) = match serde_json::from_str::<ServerErrorBody>(body) {
        Ok(parsed) if !parsed.message.is_empty() => (parsed.id, parsed.message),
        _ if !body.trim().is_empty() => (String::new(), body.trim().to_string()),
        _ => (
            String::new(),
            status.canonical_reason().unwrap_or("unknown error").to_string(),
        ),
    };

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            id,
            message,
        },
    }
}
