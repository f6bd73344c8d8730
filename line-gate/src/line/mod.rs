//! LINE Messaging API: webhook payloads and the reply notifier.

pub mod notifier;
pub mod types;

pub use notifier::{ChatNotifier, LineNotifier, REPLY_PATH};
pub use types::{InboundEvent, OutboundMessage, ReplyRequest, WebhookBody};
