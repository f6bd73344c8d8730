//! Library error type.

use thiserror::Error;

/// Errors raised while authorizing an event or talking to LINE / Sheets.
///
/// The webhook handler never lets one of these escape: it renders the
/// `Display` text into a `{success:false, message}` response.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API returned {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("event has no source")]
    MissingSource,

    #[error("event has no reply token")]
    MissingReplyToken,

    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    #[error("named range not found: {0}")]
    NamedRangeNotFound(String),

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),
}

pub type GateResult<T> = Result<T, GateError>;
