//! Web server module for the LINE webhook.
//!
//! This module provides the HTTP surface of the gate:
//! - Verifies the LINE request signature (when a channel secret is set)
//! - Parses the webhook body and hands the first event to the [`Gate`](crate::gate::Gate)
//! - Answers `{success, message?}` with HTTP 200

pub mod handlers;
pub mod signature;

pub use handlers::{
    health, line_webhook, process_webhook, AppState, HealthResponse, WebhookResponse,
};
pub use signature::{is_signature_verification_enabled, verify_line_signature};
