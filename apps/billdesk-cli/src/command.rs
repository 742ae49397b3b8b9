//! Command line definition.
//!
//! `-` as a file argument means stdin.

use clap::{Parser, Subcommand, ValueEnum};

use billdesk_core::DocumentKind;
use billdesk_db::ConversionPolicy;

const ENV_HELP: &str = "\
Environment:
  BILLDESK_DB_PATH, BILLDESK_SHOP_NAME, BILLDESK_DELETE_QUOTATION_ON_CONVERT,
  BILLDESK_TOTALS_TOLERANCE_PAISE, BILLDESK_MAX_CONNECTIONS, RUST_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "billdesk",
    version,
    about = "Billdesk - shop billing",
    arg_required_else_help = true,
    after_help = ENV_HELP
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Search items (no query lists all)
    Items { query: Vec<String> },
    /// Create an item from ItemInput JSON
    ItemAdd {
        #[arg(value_name = "FILE|-")]
        input: String,
    },
    /// Replace an item from ItemInput JSON
    ItemUpdate {
        id: i64,
        #[arg(value_name = "FILE|-")]
        input: String,
    },
    /// Delete an item
    ItemDelete { id: i64 },

    /// Create an invoice or quotation from JSON
    Create {
        #[arg(value_name = "FILE|-")]
        input: String,
    },
    /// List invoices, newest first
    Invoices,
    /// List quotations, newest first
    Quotations,
    /// Show one document
    Show { kind: KindArg, id: i64 },
    /// Convert a quotation into an invoice
    Convert {
        id: i64,
        /// Remove the quotation after converting
        #[arg(long, conflicts_with = "keep")]
        delete: bool,
        /// Keep the quotation after converting
        #[arg(long)]
        keep: bool,
    },
    /// Delete a quotation
    DeleteQuotation { id: i64 },

    /// Customer directory from document history
    Customers,
    /// Profile of the latest matching customer
    Lookup {
        #[arg(required = true)]
        mobile: Vec<String>,
    },

    /// Dashboard summary
    Report,
    /// Write a JSON snapshot
    Backup {
        #[arg(value_name = "FILE")]
        path: String,
    },
    /// Replace all data from a JSON snapshot
    Restore {
        #[arg(value_name = "FILE|-")]
        path: String,
    },
}

/// Document table named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    #[value(alias = "invoices")]
    Invoice,
    #[value(alias = "quotations")]
    Quotation,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Invoice => DocumentKind::Invoice,
            KindArg::Quotation => DocumentKind::Quotation,
        }
    }
}

/// Policy forced by `convert --delete` or `--keep`; `None` uses the
/// configured one.
pub fn policy_override(delete: bool, keep: bool) -> Option<ConversionPolicy> {
    match (delete, keep) {
        (true, _) => Some(ConversionPolicy::DeleteQuotation),
        (_, true) => Some(ConversionPolicy::KeepQuotation),
        _ => None,
    }
}
