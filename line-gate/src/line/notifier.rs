//! Reply delivery through the LINE Messaging API.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

use crate::error::{GateError, GateResult};
use crate::line::types::{OutboundMessage, ReplyRequest};
use crate::Config;

/// Path of the reply endpoint relative to the API origin.
pub const REPLY_PATH: &str = "/v2/bot/message/reply";

/// Sends a reply back to the chat the event came from.
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn reply(&self, reply_token: &str, message: OutboundMessage) -> GateResult<()>;
}

/// [`ChatNotifier`] backed by the LINE reply endpoint.
#[derive(Clone)]
pub struct LineNotifier {
    client: Client,
    api_base: String,
    access_token: String,
}

impl LineNotifier {
    pub fn new(client: Client, api_base: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            access_token: access_token.into(),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(
            client,
            config.line_api_base.clone(),
            config.line_channel_access_token.clone(),
        )
    }

    fn reply_url(&self) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), REPLY_PATH)
    }
}

#[async_trait]
impl ChatNotifier for LineNotifier {
    async fn reply(&self, reply_token: &str, message: OutboundMessage) -> GateResult<()> {
        let body = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages: vec![message],
        };

        let response = self
            .client
            .post(self.reply_url())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status_code = status.as_u16(), body = %body, "line_reply_rejected");
            return Err(GateError::Api {
                service: "LINE",
                status: status.as_u16(),
                body,
            });
        }

        info!(status_code = status.as_u16(), "line_reply_sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockServer;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_reply_posts_bearer_and_body() {
        let server = MockServer::start(|_| (StatusCode::OK, json!({}))).await;
        let notifier = LineNotifier::new(Client::new(), server.base_url(), "channel-token");

        notifier
            .reply("reply-1", OutboundMessage::text("Welcome!"))
            .await
            .unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, REPLY_PATH);
        assert_eq!(
            requests[0].authorization.as_deref(),
            Some("Bearer channel-token")
        );
        assert_eq!(
            requests[0].body,
            json!({
                "replyToken": "reply-1",
                "messages": [{"type": "text", "text": "Welcome!"}]
            })
        );
    }

    #[tokio::test]
    async fn test_reply_error_status_is_reported() {
        let server = MockServer::start(|_| {
            (
                StatusCode::BAD_REQUEST,
                json!({"message": "Invalid reply token"}),
            )
        })
        .await;
        let notifier = LineNotifier::new(Client::new(), server.base_url(), "channel-token");

        let err = notifier
            .reply("expired", OutboundMessage::text("hi"))
            .await
            .unwrap_err();

        match err {
            GateError::Api { service, status, body } => {
                assert_eq!(service, "LINE");
                assert_eq!(status, 400);
                assert!(body.contains("Invalid reply token"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
