//! LINE Messaging API payload types.
//!
//! Only the fields the gate reads are typed; everything else on an event is
//! kept as an opaque JSON payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GateError, GateResult};

// =============================================================================
// Inbound webhook
// =============================================================================

/// Body LINE posts to the webhook URL.
///
/// Events stay untyped until one is picked: only the first event is ever
/// processed, so the shape of the others must not fail the request.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBody {
    /// Bot user id the events were sent to
    #[serde(default)]
    pub destination: Option<String>,
    /// Batched events; a missing array is treated as empty
    #[serde(default)]
    pub events: Vec<Value>,
}

impl WebhookBody {
    /// Decode the first event, or `None` when the batch is empty.
    pub fn first_event(&self) -> Option<GateResult<InboundEvent>> {
        self.events
            .first()
            .map(|event| serde_json::from_value::<InboundEvent>(event.clone()).map_err(GateError::from))
    }
}

/// A single webhook event.
///
/// `source` and `replyToken` are kept as raw JSON so an unexpected shape
/// surfaces as "not permitted" or a missing field rather than a decode error.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEvent {
    #[serde(default)]
    pub source: Option<Value>,
    #[serde(default, rename = "replyToken")]
    pub reply_token: Option<Value>,
    /// Remaining event fields, untouched
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl InboundEvent {
    /// Event type (`message`, `follow`, ...).
    pub fn kind(&self) -> Option<&str> {
        self.payload.get("type").and_then(Value::as_str)
    }

    /// Sender user id.
    ///
    /// An event without a `source` is an error. A source without a string
    /// `userId` (group events, or any other shape) yields `None`.
    pub fn sender_identity(&self) -> GateResult<Option<&str>> {
        match &self.source {
            None | Some(Value::Null) => Err(GateError::MissingSource),
            Some(source) => Ok(source.get("userId").and_then(Value::as_str)),
        }
    }

    pub fn reply_token(&self) -> GateResult<&str> {
        self.reply_token
            .as_ref()
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or(GateError::MissingReplyToken)
    }
}

// =============================================================================
// Outbound reply
// =============================================================================

/// Message object sent back through the reply endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text { text: String },
}

impl OutboundMessage {
    pub fn text(body: impl Into<String>) -> Self {
        OutboundMessage::Text { text: body.into() }
    }
}

/// Body of `POST /v2/bot/message/reply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyRequest {
    #[serde(rename = "replyToken")]
    pub reply_token: String,
    pub messages: Vec<OutboundMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_webhook_body_parses_line_event() {
        let body: WebhookBody = serde_json::from_value(json!({
            "destination": "Ubot",
            "events": [{
                "type": "message",
                "replyToken": "token-1",
                "source": {"type": "user", "userId": "Uabc"},
                "message": {"type": "text", "text": "hi"},
                "timestamp": 1700000000000u64
            }]
        }))
        .unwrap();

        let event = body.first_event().unwrap().unwrap();
        assert_eq!(event.kind(), Some("message"));
        assert_eq!(event.sender_identity().unwrap(), Some("Uabc"));
        assert_eq!(event.reply_token().unwrap(), "token-1");
        assert!(event.payload.contains_key("message"));
        assert!(event.payload.contains_key("timestamp"));
    }

    #[test]
    fn test_missing_events_is_empty() {
        let body: WebhookBody = serde_json::from_str("{}").unwrap();
        assert!(body.events.is_empty());
    }

    #[test]
    fn test_event_without_source_is_error() {
        let event: InboundEvent = serde_json::from_value(json!({"replyToken": "t"})).unwrap();
        assert!(matches!(event.sender_identity(), Err(GateError::MissingSource)));
    }

    #[test]
    fn test_event_without_reply_token_is_error() {
        let event: InboundEvent =
            serde_json::from_value(json!({"source": {"userId": "U1"}, "replyToken": ""})).unwrap();
        assert!(matches!(event.reply_token(), Err(GateError::MissingReplyToken)));
    }

    #[test]
    fn test_non_string_user_id_is_no_sender() {
        let event: InboundEvent = serde_json::from_value(json!({
            "replyToken": "t",
            "source": {"type": "user", "userId": 123}
        }))
        .unwrap();
        assert_eq!(event.sender_identity().unwrap(), None);

        let event: InboundEvent =
            serde_json::from_value(json!({"replyToken": 7, "source": "bogus"})).unwrap();
        assert_eq!(event.sender_identity().unwrap(), None);
        assert!(matches!(event.reply_token(), Err(GateError::MissingReplyToken)));
    }

    #[test]
    fn test_first_event_ignores_later_shapes() {
        let body: WebhookBody = serde_json::from_value(json!({
            "events": [
                {"replyToken": "r0", "source": {"userId": "Uabc"}},
                {"source": "bogus"},
                42
            ]
        }))
        .unwrap();

        let event = body.first_event().unwrap().unwrap();
        assert_eq!(event.sender_identity().unwrap(), Some("Uabc"));
    }

    #[test]
    fn test_first_event_not_an_object_is_error() {
        let body: WebhookBody = serde_json::from_value(json!({"events": [5]})).unwrap();
        assert!(matches!(body.first_event(), Some(Err(GateError::Json(_)))));

        let empty: WebhookBody = serde_json::from_value(json!({"events": []})).unwrap();
        assert!(empty.first_event().is_none());
    }

    #[test]
    fn test_reply_request_wire_shape() {
        let request = ReplyRequest {
            reply_token: "token-1".to_string(),
            messages: vec![OutboundMessage::text("hello")],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "replyToken": "token-1",
                "messages": [{"type": "text", "text": "hello"}]
            })
        );
    }
}
