//! Configuration module for environment variable parsing.
//!
//! Both binaries read their configuration from environment variables. Library
//! code never reads the environment itself: a [`Config`] is built once and
//! passed into the clients and the gate at construction.

use std::env;
use std::time::Duration;

/// Default LINE Messaging API origin.
pub const DEFAULT_LINE_API_BASE: &str = "https://api.line.me";

/// Default Google Sheets API origin.
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    // =========================================================================
    // LINE Messaging API
    // =========================================================================
    /// Channel access token sent as `Authorization: Bearer <token>`
    pub line_channel_access_token: String,

    /// Channel secret for `X-Line-Signature` verification
    pub line_channel_secret: Option<String>,

    /// Origin of the LINE API (overridden in tests)
    pub line_api_base: String,

    /// Text sent back to permitted users
    pub welcome_message: String,

    // =========================================================================
    // Google Sheets
    // =========================================================================
    /// Spreadsheet holding the permission sheet
    pub spreadsheet_id: String,

    /// Name of the permission sheet
    pub sheet_name: String,

    /// Name of the derived range over the non-header identity cells
    pub named_range: String,

    /// OAuth access token for the Sheets API
    pub sheets_access_token: String,

    /// Origin of the Sheets API (overridden in tests)
    pub sheets_api_base: String,

    /// Editors allowed on admin-only protected columns
    pub admin_emails: Vec<String>,

    /// HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            line_channel_access_token: String::new(),
            line_channel_secret: None,
            line_api_base: DEFAULT_LINE_API_BASE.to_string(),
            welcome_message: "Welcome! You are a permitted user.".to_string(),
            spreadsheet_id: String::new(),
            sheet_name: "PermittedUsers".to_string(),
            named_range: "PermittedUsers".to_string(),
            sheets_access_token: String::new(),
            sheets_api_base: DEFAULT_SHEETS_API_BASE.to_string(),
            admin_emails: Vec::new(),
            request_timeout_ms: 10_000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),

            line_channel_access_token: env::var("LINE_CHANNEL_ACCESS_TOKEN")
                .unwrap_or_default(),

            line_channel_secret: env::var("LINE_CHANNEL_SECRET")
                .ok()
                .filter(|s| !s.trim().is_empty()),

            line_api_base: env::var("LINE_API_BASE").unwrap_or(defaults.line_api_base),

            welcome_message: env::var("WELCOME_MESSAGE").unwrap_or(defaults.welcome_message),

            spreadsheet_id: env::var("SPREADSHEET_ID").unwrap_or_default(),

            sheet_name: env::var("SHEET_NAME").unwrap_or(defaults.sheet_name),

            named_range: env::var("NAMED_RANGE").unwrap_or(defaults.named_range),

            sheets_access_token: env::var("GOOGLE_SHEETS_ACCESS_TOKEN").unwrap_or_default(),

            sheets_api_base: env::var("SHEETS_API_BASE").unwrap_or(defaults.sheets_api_base),

            admin_emails: parse_csv("ADMIN_EMAILS").unwrap_or_default(),

            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),
        }
    }

    /// Outbound HTTP timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Parse a comma-separated list of strings.
fn parse_csv(name: &str) -> Option<Vec<String>> {
    env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}
