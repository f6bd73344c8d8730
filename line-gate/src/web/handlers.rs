//! Webhook endpoint handlers.
//!
//! Every documented outcome is answered with HTTP 200 and a
//! `{success, message?}` body; errors from the gate are rendered into
//! `message` instead of escaping. Only a failed signature check (when a
//! channel secret is configured) uses a different status.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::gate::{Decision, Gate};
use crate::line::WebhookBody;
use crate::web::signature::{
    is_signature_verification_enabled, verify_line_signature, SIGNATURE_HEADER,
};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gate: Arc<Gate>,
}

impl AppState {
    pub fn new(config: Config, gate: Gate) -> Self {
        Self {
            config: Arc::new(config),
            gate: Arc::new(gate),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// LINE Webhook
// =============================================================================

/// Webhook response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WebhookResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Parse a raw webhook body and run the first event through the gate.
///
/// Later events in a batch are not processed; their count is logged.
pub async fn process_webhook(gate: &Gate, body: &[u8]) -> WebhookResponse {
    if body.is_empty() {
        error!("webhook_invalid_request");
        return WebhookResponse::failure("Invalid request");
    }

    let webhook: WebhookBody = match serde_json::from_slice(body) {
        Ok(w) => w,
        Err(e) => {
            error!(error = %e, body_length = body.len(), "webhook_parse_failed");
            return WebhookResponse::failure(e.to_string());
        }
    };

    let event = match webhook.first_event() {
        None => {
            error!("webhook_no_events");
            return WebhookResponse::failure("No events");
        }
        Some(Err(e)) => {
            error!(error = %e, "webhook_event_invalid");
            return WebhookResponse::failure(e.to_string());
        }
        Some(Ok(event)) => event,
    };

    if webhook.events.len() > 1 {
        warn!(ignored = webhook.events.len() - 1, "webhook_events_ignored");
    }

    info!(
        event_type = event.kind().unwrap_or("unknown"),
        destination = webhook.destination.as_deref().unwrap_or(""),
        "webhook_event_processing"
    );

    match gate.handle_event(&event).await {
        Ok(Decision::Permitted) => {
            info!("webhook_event_permitted");
            WebhookResponse::ok()
        }
        Ok(Decision::NotPermitted) => WebhookResponse::ok(),
        Err(e) => {
            error!(error = %e, "webhook_processing_failed");
            WebhookResponse::failure(e.to_string())
        }
    }
}

/// LINE webhook endpoint.
///
/// This endpoint:
/// 1. Verifies the X-Line-Signature header (if a channel secret is configured)
/// 2. Runs the first event through the gate
/// 3. Returns 200 OK with `{success, message?}`
pub async fn line_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    info!(body_length = body.len(), "webhook_received");

    if is_signature_verification_enabled(&state.config.line_channel_secret) {
        let secret = state.config.line_channel_secret.as_deref().unwrap_or_default();
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if !verify_line_signature(secret, &body, signature) {
            warn!(has_signature = !signature.is_empty(), "line_signature_invalid");
            return (
                StatusCode::UNAUTHORIZED,
                Json(WebhookResponse::failure("Invalid signature")),
            );
        }
    } else {
        warn!("line_signature_not_configured");
    }

    let response = process_webhook(&state.gate, &body).await;
    (StatusCode::OK, Json(response))
}
