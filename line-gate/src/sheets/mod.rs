//! Google Sheets access.
//!
//! - [`client`]: REST calls against the Sheets API v4
//! - [`store`]: the allowlist read and the audit append used by the gate
//! - [`maintenance`]: validation, protection and named-range upkeep

pub mod client;
pub mod maintenance;
pub mod store;
pub mod types;

pub use client::SheetsClient;
pub use maintenance::{Maintenance, NamedRangeOutcome};
pub use store::{AllowlistStore, SheetsAllowlistStore};
