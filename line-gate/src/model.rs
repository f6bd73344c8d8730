//! Permission sheet records.
//!
//! The permission sheet has a header row followed by one row per user:
//!
//! ```text
//! identity | timestamp | status | note
//! ```
//!
//! The gate only ever appends [`AuditRow`]s; administrators edit the other
//! rows through the spreadsheet UI.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Pattern every LINE user id must match.
pub const IDENTITY_PATTERN: &str = "^U[a-f0-9]{32}$";

/// Action tag written on every audit row.
pub const AUDIT_ACTION: &str = "Accessed";

/// Timestamp layout written into the sheet (parsed as a date by Sheets).
pub const SHEET_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static IDENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(IDENTITY_PATTERN).expect("identity pattern compiles"));

/// Whether `value` is a well-formed LINE user id.
pub fn is_valid_identity(value: &str) -> bool {
    IDENTITY_RE.is_match(value)
}

/// A validated LINE user id: `U` followed by 32 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    pub fn parse(value: impl Into<String>) -> Result<Self, GateError> {
        let value = value.into();
        if is_valid_identity(&value) {
            Ok(Self(value))
        } else {
            Err(GateError::InvalidIdentity(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identity {
    type Error = GateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        value.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status column values accepted by the sheet's data validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Active,
    Pending,
    Suspended,
}

impl PermissionStatus {
    pub const ALL: [PermissionStatus; 3] = [
        PermissionStatus::Active,
        PermissionStatus::Pending,
        PermissionStatus::Suspended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionStatus::Active => "Active",
            PermissionStatus::Pending => "Pending",
            PermissionStatus::Suspended => "Suspended",
        }
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionStatus {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(PermissionStatus::Active),
            "Pending" => Ok(PermissionStatus::Pending),
            "Suspended" => Ok(PermissionStatus::Suspended),
            other => Err(GateError::InvalidStatus(other.to_string())),
        }
    }
}

/// One administrator-maintained row of the permission sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRecord {
    pub identity: Identity,
    pub timestamp: DateTime<Utc>,
    pub status: PermissionStatus,
    pub note: String,
}

impl PermissionRecord {
    /// Build a record from the leading cells of a sheet row.
    ///
    /// Missing trailing cells are treated as empty. The timestamp must use
    /// [`SHEET_TIMESTAMP_FORMAT`].
    pub fn from_cells(cells: &[String]) -> Result<Self, GateError> {
        let cell = |i: usize| cells.get(i).map(String::as_str).unwrap_or("");

        let identity = Identity::parse(cell(0))?;
        let timestamp = NaiveDateTime::parse_from_str(cell(1), SHEET_TIMESTAMP_FORMAT)
            .map_err(|_| GateError::InvalidTimestamp(cell(1).to_string()))?
            .and_utc();
        let status = cell(2).parse()?;

        Ok(Self {
            identity,
            timestamp,
            status,
            note: cell(3).to_string(),
        })
    }
}

/// Row appended to the permission sheet after a successful authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
    pub identity: String,
    pub timestamp: DateTime<Utc>,
    pub action: &'static str,
}

impl AuditRow {
    pub fn accessed(identity: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            identity: identity.into(),
            timestamp,
            action: AUDIT_ACTION,
        }
    }

    /// Cell values in sheet column order.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.identity.clone(),
            self.timestamp.format(SHEET_TIMESTAMP_FORMAT).to_string(),
            self.action.to_string(),
        ]
    }
}
