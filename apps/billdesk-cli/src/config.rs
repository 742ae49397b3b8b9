//! CLI configuration module.
//!
//! Configuration is loaded from `BILLDESK_*` environment variables with
//! fallback to defaults.
//!
//! | Variable | Default |
//! |---|---|
//! | `BILLDESK_DB_PATH` | `./billdesk.db` |
//! | `BILLDESK_SHOP_NAME` | `Billdesk` |
//! | `BILLDESK_DELETE_QUOTATION_ON_CONVERT` | `false` |
//! | `BILLDESK_TOTALS_TOLERANCE_PAISE` | `1` |
//! | `BILLDESK_MAX_CONNECTIONS` | `5` |

use std::env;
use std::path::PathBuf;

use billdesk_core::DEFAULT_TOTALS_TOLERANCE_PAISE;
use billdesk_db::{ConversionPolicy, DbConfig, ServiceConfig};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Shop name shown in reports
    pub shop_name: String,

    /// Whether `convert` removes the quotation
    pub conversion_policy: ConversionPolicy,

    /// Accepted drift between submitted and recomputed totals
    pub totals_tolerance_paise: i64,

    /// Pool size for the file database
    pub max_connections: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` (environment access in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let delete_on_convert = match lookup("BILLDESK_DELETE_QUOTATION_ON_CONVERT") {
            Some(raw) => parse_bool("BILLDESK_DELETE_QUOTATION_ON_CONVERT", &raw)?,
            None => false,
        };

        let totals_tolerance_paise: i64 = lookup("BILLDESK_TOTALS_TOLERANCE_PAISE")
            .unwrap_or_else(|| DEFAULT_TOTALS_TOLERANCE_PAISE.to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BILLDESK_TOTALS_TOLERANCE_PAISE".to_string()))?;
        if totals_tolerance_paise < 0 {
            return Err(ConfigError::InvalidValue(
                "BILLDESK_TOTALS_TOLERANCE_PAISE".to_string(),
            ));
        }

        let max_connections: u32 = lookup("BILLDESK_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BILLDESK_MAX_CONNECTIONS".to_string()))?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue("BILLDESK_MAX_CONNECTIONS".to_string()));
        }

        let db_path = lookup("BILLDESK_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| "./billdesk.db".to_string());

        let shop_name = lookup("BILLDESK_SHOP_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Billdesk".to_string());

        Ok(AppConfig {
            db_path: PathBuf::from(db_path),
            shop_name,
            conversion_policy: if delete_on_convert {
                ConversionPolicy::DeleteQuotation
            } else {
                ConversionPolicy::KeepQuotation
            },
            totals_tolerance_paise,
            max_connections,
        })
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path).max_connections(self.max_connections)
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::default()
            .conversion_policy(self.conversion_policy)
            .totals_tolerance_paise(self.totals_tolerance_paise)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
