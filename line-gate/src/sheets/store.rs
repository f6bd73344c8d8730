//! Allowlist access on top of the permission sheet.

use async_trait::async_trait;
use tracing::info;

use crate::error::GateResult;
use crate::model::AuditRow;
use crate::sheets::client::SheetsClient;
use crate::sheets::types::{cell_to_string, quote_sheet};

/// Where allowed identities come from and where audit rows go.
#[async_trait]
pub trait AllowlistStore: Send + Sync {
    /// First cell of every row, header included, in sheet order.
    async fn list_identities(&self) -> GateResult<Vec<String>>;

    /// Append one audit row. Never deduplicated.
    async fn append_audit_row(&self, row: &AuditRow) -> GateResult<()>;
}

/// [`AllowlistStore`] reading and appending to one sheet of a spreadsheet.
#[derive(Clone)]
pub struct SheetsAllowlistStore {
    client: SheetsClient,
    sheet_name: String,
}

impl SheetsAllowlistStore {
    pub fn new(client: SheetsClient, sheet_name: impl Into<String>) -> Self {
        Self {
            client,
            sheet_name: sheet_name.into(),
        }
    }

    fn sheet_range(&self) -> String {
        quote_sheet(&self.sheet_name)
    }
}

#[async_trait]
impl AllowlistStore for SheetsAllowlistStore {
    async fn list_identities(&self) -> GateResult<Vec<String>> {
        let values = self.client.get_values(&self.sheet_range()).await?;

        let identities: Vec<String> = values
            .values
            .iter()
            .map(|row| row.first().map(cell_to_string).unwrap_or_default())
            .collect();

        info!(
            sheet = %self.sheet_name,
            rows = identities.len(),
            "allowlist_loaded"
        );

        Ok(identities)
    }

    async fn append_audit_row(&self, row: &AuditRow) -> GateResult<()> {
        self.client
            .append_values(&self.sheet_range(), vec![row.cells()])
            .await?;

        info!(
            sheet = %self.sheet_name,
            identity = %row.identity,
            action = row.action,
            "audit_row_appended"
        );

        Ok(())
    }
}
