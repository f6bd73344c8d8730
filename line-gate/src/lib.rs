//! LineGate - LINE bot gatekeeper backed by a Google Sheets allowlist.
//!
//! This library provides shared modules for the two binaries:
//! - `line-gate`: web server receiving LINE webhooks
//! - `line-gate-admin`: maintenance of the permission sheet
//!
//! ## Architecture
//!
//! ```text
//! LINE → Web Server → Gate → Sheets (allowlist read)
//!                          → LINE reply + Sheets (audit append)
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod line;
pub mod model;
pub mod sheets;
pub mod web;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use error::{GateError, GateResult};
pub use gate::{Decision, Gate};
pub use line::{ChatNotifier, InboundEvent, LineNotifier, OutboundMessage};
pub use model::{AuditRow, Identity, PermissionRecord, PermissionStatus};
pub use sheets::{AllowlistStore, Maintenance, SheetsAllowlistStore, SheetsClient};
pub use web::AppState;
