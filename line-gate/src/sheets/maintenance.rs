//! Upkeep of the permission sheet: validation rules, protections and the
//! derived named range over the identity column.
//!
//! Each helper resolves the sheet's numeric id first and then submits a
//! single `batchUpdate`. The request builders are plain functions so the
//! JSON sent to Sheets can be checked without a server.

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{GateError, GateResult};
use crate::model::{PermissionRecord, PermissionStatus, AUDIT_ACTION, IDENTITY_PATTERN};
use crate::sheets::client::SheetsClient;
use crate::sheets::types::{cell_to_string, column_letter, quote_sheet, GridRange, Spreadsheet};
use crate::Config;

/// Zero-based column indices of the permission sheet.
pub const IDENTITY_COLUMN: u32 = 0;
pub const STATUS_COLUMN: u32 = 2;
pub const NOTE_COLUMN: u32 = 3;

/// First row index below the header.
const FIRST_DATA_ROW: u32 = 1;

/// Text Sheets puts in a 400 body when a range name does not resolve.
const UNKNOWN_RANGE_MESSAGE: &str = "Unable to parse range";

pub const STATUS_HELP_TEXT: &str = "Must be: Active, Pending, or Suspended";
pub const IDENTITY_HELP_TEXT: &str =
    "ERROR: LINE UserID format is invalid! Correct example: U4d3f1... (32 hex characters after 'U')";
pub const SHEET_PROTECTION_DESCRIPTION: &str =
    "Only Notes column is editable without admin permission";
pub const ADMIN_PROTECTION_DESCRIPTION: &str = "Admin-only columns";

/// Result of [`Maintenance::upsert_named_range`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRangeOutcome {
    pub a1_notation: String,
    pub created: bool,
}

pub struct Maintenance {
    client: SheetsClient,
    sheet_name: String,
    named_range: String,
}

impl Maintenance {
    pub fn new(
        client: SheetsClient,
        sheet_name: impl Into<String>,
        named_range: impl Into<String>,
    ) -> Self {
        Self {
            client,
            sheet_name: sheet_name.into(),
            named_range: named_range.into(),
        }
    }

    pub fn from_config(client: SheetsClient, config: &Config) -> Self {
        Self::new(client, config.sheet_name.clone(), config.named_range.clone())
    }

    async fn resolve(&self) -> GateResult<(Spreadsheet, i64)> {
        let spreadsheet = self.client.get_spreadsheet().await?;
        let sheet_id = spreadsheet
            .sheet_id(&self.sheet_name)
            .ok_or_else(|| GateError::SheetNotFound(self.sheet_name.clone()))?;
        Ok((spreadsheet, sheet_id))
    }

    /// Restrict the status column to [`PermissionStatus`] values.
    pub async fn set_status_validation(&self) -> GateResult<()> {
        let (_, sheet_id) = self.resolve().await?;
        self.client
            .batch_update(vec![status_validation_request(sheet_id)])
            .await?;

        info!(sheet = %self.sheet_name, "status_validation_applied");
        Ok(())
    }

    /// Reject identity cells that are not well-formed LINE user ids.
    pub async fn set_identity_validation(&self) -> GateResult<()> {
        let (_, sheet_id) = self.resolve().await?;
        self.client
            .batch_update(vec![identity_validation_request(sheet_id)])
            .await?;

        info!(sheet = %self.sheet_name, "identity_validation_applied");
        Ok(())
    }

    /// Point the named range at the identity cells below the header,
    /// creating it if it does not exist yet.
    pub async fn upsert_named_range(&self) -> GateResult<NamedRangeOutcome> {
        let (spreadsheet, sheet_id) = self.resolve().await?;

        let column = column_letter(IDENTITY_COLUMN);
        let used = self
            .client
            .get_values(&format!("{}!{}:{}", quote_sheet(&self.sheet_name), column, column))
            .await?;
        // One-based number of the last row with data; never above the
        // first data row so the range is never inverted.
        let last_row = (used.values.len() as u32).max(FIRST_DATA_ROW + 1);

        let range =
            GridRange::column_from_row(sheet_id, IDENTITY_COLUMN, FIRST_DATA_ROW).with_end_row(last_row);
        let existing = spreadsheet.named_range(&self.named_range);
        let request = named_range_request(
            &self.named_range,
            existing.map(|nr| nr.named_range_id.as_str()),
            range,
        );
        self.client.batch_update(vec![request]).await?;

        let outcome = NamedRangeOutcome {
            a1_notation: format!(
                "{}!{}{}:{}{}",
                quote_sheet(&self.sheet_name),
                column,
                FIRST_DATA_ROW + 1,
                column,
                last_row
            ),
            created: existing.is_none(),
        };

        info!(
            named_range = %self.named_range,
            range = %outcome.a1_notation,
            created = outcome.created,
            "named_range_set"
        );

        Ok(outcome)
    }

    /// Membership test against the named range (header excluded).
    pub async fn check_user_permission(&self, identity: &str) -> GateResult<bool> {
        let values = self.client.get_values(&self.named_range).await.map_err(|e| match e {
            GateError::Api { status: 400, ref body, .. } if body.contains(UNKNOWN_RANGE_MESSAGE) => {
                GateError::NamedRangeNotFound(self.named_range.clone())
            }
            other => other,
        })?;

        let permitted = values
            .values
            .iter()
            .flatten()
            .any(|cell| cell_to_string(cell) == identity);

        info!(identity = %identity, permitted = permitted, "named_range_permission_checked");
        Ok(permitted)
    }

    /// Warning-only protection on the whole sheet with the note column left
    /// open, identity validation, and admin-only protection on the columns
    /// between identity and note.
    pub async fn full_protection_setup(&self, admin_emails: &[String]) -> GateResult<()> {
        let (_, sheet_id) = self.resolve().await?;
        self.client
            .batch_update(protection_requests(sheet_id, admin_emails))
            .await?;

        info!(
            sheet = %self.sheet_name,
            admin_editors = admin_emails.len(),
            "protection_applied"
        );
        Ok(())
    }

    /// Administrator rows below the header. Audit rows are skipped.
    pub async fn list_records(&self) -> GateResult<Vec<PermissionRecord>> {
        let values = self.client.get_values(&quote_sheet(&self.sheet_name)).await?;

        let mut records = Vec::new();
        for (index, row) in values.values.iter().enumerate().skip(FIRST_DATA_ROW as usize) {
            let cells: Vec<String> = row.iter().map(cell_to_string).collect();
            if cells.get(STATUS_COLUMN as usize).map(String::as_str) == Some(AUDIT_ACTION) {
                continue;
            }
            match PermissionRecord::from_cells(&cells) {
                Ok(record) => records.push(record),
                Err(e) => warn!(row = index + 1, error = %e, "permission_row_invalid"),
            }
        }

        Ok(records)
    }
}

// =============================================================================
// Request builders
// =============================================================================

pub fn status_validation_request(sheet_id: i64) -> Value {
    let values: Vec<Value> = PermissionStatus::ALL
        .iter()
        .map(|s| json!({ "userEnteredValue": s.as_str() }))
        .collect();

    json!({
        "setDataValidation": {
            "range": GridRange::column_from_row(sheet_id, STATUS_COLUMN, FIRST_DATA_ROW),
            "rule": {
                "condition": { "type": "ONE_OF_LIST", "values": values },
                "inputMessage": STATUS_HELP_TEXT,
                "strict": true,
                "showCustomUi": true
            }
        }
    })
}

pub fn identity_validation_request(sheet_id: i64) -> Value {
    let first_cell = format!("{}{}", column_letter(IDENTITY_COLUMN), FIRST_DATA_ROW + 1);
    let formula = format!("=REGEXMATCH({}, \"{}\")", first_cell, IDENTITY_PATTERN);

    json!({
        "setDataValidation": {
            "range": GridRange::column_from_row(sheet_id, IDENTITY_COLUMN, FIRST_DATA_ROW),
            "rule": {
                "condition": {
                    "type": "CUSTOM_FORMULA",
                    "values": [{ "userEnteredValue": formula }]
                },
                "inputMessage": IDENTITY_HELP_TEXT,
                "strict": true
            }
        }
    })
}

pub fn named_range_request(name: &str, existing_id: Option<&str>, range: GridRange) -> Value {
    match existing_id {
        Some(id) => json!({
            "updateNamedRange": {
                "namedRange": { "namedRangeId": id, "name": name, "range": range },
                "fields": "range"
            }
        }),
        None => json!({
            "addNamedRange": {
                "namedRange": { "name": name, "range": range }
            }
        }),
    }
}

pub fn protection_requests(sheet_id: i64, admin_emails: &[String]) -> Vec<Value> {
    vec![
        json!({
            "addProtectedRange": {
                "protectedRange": {
                    "range": GridRange::whole_sheet(sheet_id),
                    "description": SHEET_PROTECTION_DESCRIPTION,
                    "warningOnly": true,
                    "unprotectedRanges": [
                        GridRange::columns(sheet_id, NOTE_COLUMN, NOTE_COLUMN + 1)
                    ]
                }
            }
        }),
        identity_validation_request(sheet_id),
        json!({
            "addProtectedRange": {
                "protectedRange": {
                    "range": GridRange::columns(sheet_id, IDENTITY_COLUMN + 1, NOTE_COLUMN),
                    "description": ADMIN_PROTECTION_DESCRIPTION,
                    "editors": { "users": admin_emails }
                }
            }
        }),
    ]
}
