//! Permission check for a single webhook event.
//!
//! ## Flow
//!
//! ```text
//! InboundEvent → load allowlist → contains(sender)? → reply → append audit row
//! ```
//!
//! The allowlist is read on every call. A sender that is not on the list
//! gets no reply and leaves no audit row.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use tracing::{info, warn};

use crate::error::GateResult;
use crate::line::{ChatNotifier, InboundEvent, LineNotifier, OutboundMessage};
use crate::model::{is_valid_identity, AuditRow};
use crate::sheets::{AllowlistStore, SheetsAllowlistStore, SheetsClient};
use crate::Config;

/// Outcome of [`Gate::handle_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Sender was on the allowlist; reply sent and audit row appended
    Permitted,
    /// Sender absent from the allowlist; nothing was sent or written
    NotPermitted,
}

pub struct Gate {
    store: Arc<dyn AllowlistStore>,
    notifier: Arc<dyn ChatNotifier>,
    welcome_message: String,
}

impl Gate {
    pub fn new(
        store: Arc<dyn AllowlistStore>,
        notifier: Arc<dyn ChatNotifier>,
        welcome_message: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            welcome_message: welcome_message.into(),
        }
    }

    /// Wire the Sheets store and the LINE notifier from configuration,
    /// sharing one HTTP client.
    pub fn from_config(config: &Config, client: Client) -> Self {
        let sheets = SheetsClient::from_config(client.clone(), config);
        let store = SheetsAllowlistStore::new(sheets, config.sheet_name.clone());
        let notifier = LineNotifier::from_config(client, config);

        Self::new(
            Arc::new(store),
            Arc::new(notifier),
            config.welcome_message.clone(),
        )
    }

    pub async fn handle_event(&self, event: &InboundEvent) -> GateResult<Decision> {
        let sender = event.sender_identity()?;

        let identities = self.store.list_identities().await?;
        let permitted: HashSet<String> = identities.into_iter().collect();

        let sender = match sender {
            Some(id) if permitted.contains(id) => id,
            other => {
                info!(
                    sender = other.unwrap_or(""),
                    allowlist_size = permitted.len(),
                    "user_not_permitted"
                );
                return Ok(Decision::NotPermitted);
            }
        };

        if !is_valid_identity(sender) {
            warn!(sender = %sender, "sender_identity_malformed");
        }

        info!(sender = %sender, "user_permitted");

        let reply_token = event.reply_token()?;
        self.notifier
            .reply(reply_token, OutboundMessage::text(&self.welcome_message))
            .await?;

        self.store
            .append_audit_row(&AuditRow::accessed(sender, Utc::now()))
            .await?;

        Ok(Decision::Permitted)
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::{GateError, GateResult};
    use crate::line::{ChatNotifier, OutboundMessage};
    use crate::model::AuditRow;
    use crate::sheets::AllowlistStore;

    #[derive(Default)]
    pub struct FakeStore {
        pub rows: Vec<String>,
        pub fail_list: bool,
        pub list_calls: Mutex<usize>,
        pub appended: Mutex<Vec<AuditRow>>,
    }

    impl FakeStore {
        pub fn with_rows(rows: &[&str]) -> Self {
            Self {
                rows: rows.iter().map(|r| r.to_string()).collect(),
                ..Default::default()
            }
        }

        pub fn list_calls(&self) -> usize {
            *self.list_calls.lock().unwrap()
        }

        pub fn appended(&self) -> Vec<AuditRow> {
            self.appended.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AllowlistStore for FakeStore {
        async fn list_identities(&self) -> GateResult<Vec<String>> {
            *self.list_calls.lock().unwrap() += 1;
            if self.fail_list {
                return Err(GateError::Api {
                    service: "Sheets",
                    status: 503,
                    body: "backend unavailable".to_string(),
                });
            }
            Ok(self.rows.clone())
        }

        async fn append_audit_row(&self, row: &AuditRow) -> GateResult<()> {
            self.appended.lock().unwrap().push(row.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct FakeNotifier {
        pub fail: bool,
        pub sent: Mutex<Vec<(String, OutboundMessage)>>,
    }

    impl FakeNotifier {
        pub fn sent(&self) -> Vec<(String, OutboundMessage)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatNotifier for FakeNotifier {
        async fn reply(&self, reply_token: &str, message: OutboundMessage) -> GateResult<()> {
            if self.fail {
                return Err(GateError::Api {
                    service: "LINE",
                    status: 400,
                    body: "Invalid reply token".to_string(),
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push((reply_token.to_string(), message));
            Ok(())
        }
    }
}
