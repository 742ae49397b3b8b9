//! # Billdesk CLI
//!
//! Operator command line for the shop billing system.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        billdesk <COMMAND>                               │
//! │                                                                         │
//! │  1. Parse Command ──────── clap derive (usage errors exit 2)           │
//! │  2. Initialize Logging ─── tracing-subscriber, EnvFilter, stderr       │
//! │  3. Load AppConfig ─────── BILLDESK_* environment variables            │
//! │  4. Open Database ──────── SQLite file, migrations applied             │
//! │  5. Run on BillingService                                              │
//! │                                                                         │
//! │  Ok  ──► pretty JSON on stdout, exit 0                                 │
//! │  Err ──► ApiError JSON on stderr, exit 1                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod command;
mod config;
mod error;

use std::io::Read;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use billdesk_core::{DocumentKind, ItemInput, NewDocument};
use billdesk_db::{BackupSnapshot, BillingService, Database};

use crate::command::{policy_override, Cli, Command};
use crate::config::AppConfig;
use crate::error::ApiError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli.command).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err.to_json());
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages (every query)
/// - `RUST_LOG=billdesk=warn` - Only warnings from billdesk crates
/// - Default: INFO for billdesk crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,billdesk=info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one command against a freshly opened database.
async fn run(command: Command) -> Result<String, ApiError> {
    let config = AppConfig::from_env()?;
    debug!(?config, ?command, "Starting command");

    let db = Database::new(config.db_config()).await?;
    let service = BillingService::new(db.clone(), config.service_config());

    let output = execute(&service, &config, command).await;
    db.close().await;

    output
}

async fn execute(
    service: &BillingService,
    config: &AppConfig,
    command: Command,
) -> Result<String, ApiError> {
    let value = match command {
        // Catalog
        Command::Items { query } => to_value(service.search_items(&query.join(" ")).await?)?,
        Command::ItemAdd { input } => {
            let item: ItemInput = read_json(&input)?;
            to_value(service.create_item(&item).await?)?
        }
        Command::ItemUpdate { id, input } => {
            let item: ItemInput = read_json(&input)?;
            to_value(service.update_item(id, &item).await?)?
        }
        Command::ItemDelete { id } => {
            service.delete_item(id).await?;
            json!({ "deleted": id })
        }

        // Documents
        Command::Create { input } => {
            let submission: NewDocument = read_json(&input)?;
            to_value(service.create_document(&submission).await?)?
        }
        Command::Invoices => to_value(service.list_documents(DocumentKind::Invoice).await?)?,
        Command::Quotations => to_value(service.list_documents(DocumentKind::Quotation).await?)?,
        Command::Show { kind, id } => to_value(service.get_document(kind.into(), id).await?)?,
        Command::Convert { id, delete, keep } => {
            let invoice = match policy_override(delete, keep) {
                Some(policy) => service.convert_quotation_with(id, policy).await?,
                None => service.convert_quotation(id).await?,
            };
            to_value(invoice)?
        }
        Command::DeleteQuotation { id } => {
            service.delete_quotation(id).await?;
            json!({ "deleted": id })
        }

        // Customers
        Command::Customers => to_value(service.customer_directory().await?)?,
        Command::Lookup { mobile } => {
            to_value(service.search_customer_by_mobile(&mobile.join(" ")).await?)?
        }

        // Reports and backup
        Command::Report => {
            let now = Utc::now();
            let dashboard = service.dashboard(now).await?;
            json!({
                "shop": config.shop_name,
                "generatedAt": now,
                "dashboard": to_value(dashboard)?,
            })
        }
        Command::Backup { path } => {
            let snapshot = service.export_backup().await?;
            let body = serde_json::to_string_pretty(&snapshot)
                .map_err(|e| ApiError::internal(e.to_string()))?;
            std::fs::write(&path, body)
                .map_err(|e| ApiError::internal(format!("Cannot write {}: {}", path, e)))?;

            info!(path = %path, "Backup written");
            json!({
                "backupId": snapshot.backup_id,
                "path": path,
                "items": snapshot.items.len(),
                "invoices": snapshot.invoices.len(),
                "quotations": snapshot.quotations.len(),
            })
        }
        Command::Restore { path } => {
            let snapshot: BackupSnapshot = read_json(&path)?;
            to_value(service.restore_backup(&snapshot).await?)?
        }
    };

    serde_json::to_string_pretty(&value).map_err(|e| ApiError::internal(e.to_string()))
}

fn to_value<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

/// Reads and parses JSON from a file, or stdin for `-`.
fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, ApiError> {
    let raw = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| ApiError::validation(format!("Cannot read stdin: {}", e)))?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| ApiError::validation(format!("Cannot read {}: {}", path, e)))?
    };

    serde_json::from_str(&raw)
        .map_err(|e| ApiError::validation(format!("Invalid JSON in {}: {}", path, e)))
}
