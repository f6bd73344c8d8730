//! LineGate Admin - permission sheet maintenance.
//!
//! Spreadsheet and credentials come from the same environment variables as
//! the web server.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use linegate::{Config, Maintenance, SheetsClient};

/// line-gate-admin - maintain the permission sheet
#[derive(Parser, Debug)]
#[command(name = "line-gate-admin")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Restrict the status column to Active/Pending/Suspended
    StatusValidation,
    /// Reject malformed LINE user ids in the identity column
    IdentityValidation,
    /// Create or update the named range over the identity cells
    NamedRange,
    /// Test a user id against the named range
    Check {
        /// LINE user id to look up
        user_id: String,
    },
    /// Apply the sheet protections (editors from ADMIN_EMAILS)
    Protect,
    /// Print the administrator rows of the sheet
    List,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::StatusValidation => "status-validation",
            Command::IdentityValidation => "identity-validation",
            Command::NamedRange => "named-range",
            Command::Check { .. } => "check",
            Command::Protect => "protect",
            Command::List => "list",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    let config = Config::from_env();
    let command = cli.command.name();
    info!(
        command,
        sheet_name = %config.sheet_name,
        named_range = %config.named_range,
        "admin_starting"
    );

    let client = Client::builder()
        .timeout(config.request_timeout())
        .build()
        .context("Failed to create HTTP client")?;
    let maintenance = Maintenance::from_config(SheetsClient::from_config(client, &config), &config);

    match cli.command {
        Command::StatusValidation => maintenance
            .set_status_validation()
            .await
            .context("Failed to apply status validation")?,
        Command::IdentityValidation => maintenance
            .set_identity_validation()
            .await
            .context("Failed to apply identity validation")?,
        Command::NamedRange => {
            let outcome = maintenance
                .upsert_named_range()
                .await
                .context("Failed to set named range")?;
            println!(
                "Named range \"{}\" set to: {}",
                config.named_range, outcome.a1_notation
            );
        }
        Command::Check { user_id } => {
            let permitted = maintenance
                .check_user_permission(&user_id)
                .await
                .context("Failed to check permission")?;
            println!("{}", permitted);
        }
        Command::Protect => {
            if config.admin_emails.is_empty() {
                bail!("ADMIN_EMAILS must list at least one editor");
            }
            maintenance
                .full_protection_setup(&config.admin_emails)
                .await
                .context("Failed to apply protections")?
        }
        Command::List => {
            let records = maintenance
                .list_records()
                .await
                .context("Failed to list records")?;
            for record in records {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.identity, record.timestamp, record.status, record.note
                );
            }
        }
    }

    info!(command, "admin_complete");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_takes_user_id() {
        let cli = Cli::try_parse_from(["line-gate-admin", "check", "U0123456789abcdef0123456789abcdef"])
            .unwrap();
        assert_eq!(
            cli.command,
            Command::Check {
                user_id: "U0123456789abcdef0123456789abcdef".to_string()
            }
        );
        assert_eq!(cli.command.name(), "check");
    }

    #[test]
    fn test_subcommands_are_kebab_case() {
        let cli = Cli::try_parse_from(["line-gate-admin", "status-validation"]).unwrap();
        assert_eq!(cli.command, Command::StatusValidation);

        let cli = Cli::try_parse_from(["line-gate-admin", "named-range"]).unwrap();
        assert_eq!(cli.command.name(), "named-range");
    }

    #[test]
    fn test_bad_invocations_are_rejected() {
        assert!(Cli::try_parse_from(["line-gate-admin"]).is_err());
        assert!(Cli::try_parse_from(["line-gate-admin", "check"]).is_err());
        assert!(Cli::try_parse_from(["line-gate-admin", "drop-table"]).is_err());
    }
}
