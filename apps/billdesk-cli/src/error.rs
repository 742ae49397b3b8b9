//! # API Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Billdesk                               │
//! │                                                                         │
//! │  billdesk create bill.json                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  BillingService::create_document → Result<Document, ServiceError>      │
//! │         │                                                               │
//! │         ├── Core(CustomerConflict) ──► CONFLICT                        │
//! │         ├── Core(Validation)       ──► VALIDATION_ERROR                │
//! │         ├── Core(*NotFound)        ──► NOT_FOUND                       │
//! │         └── Db(..)                 ──► DATABASE_ERROR                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  stderr: {"code":"CONFLICT","message":"Mobile 9876543210 is ..."}      │
//! │  exit status 1                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use billdesk_core::CoreError;
use billdesk_db::{DbError, ServiceError};

use crate::config::ConfigError;

/// Error printed when a command fails.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Quotation not found: 12"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for scripts
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for CLI failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Document or item not found
    NotFound,

    /// Input validation failed (includes unreadable or malformed input files)
    ValidationError,

    /// Mobile already registered to another customer name
    Conflict,

    /// Database operation failed
    DatabaseError,

    /// Environment configuration is invalid
    ConfigError,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// JSON form written to stderr.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":"INTERNAL","message":"{}"}}"#, self.message.replace('"', "'"))
        })
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::IncompatibleBackup { .. } => ApiError::validation(err.to_string()),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::CorruptRecord { .. } => {
                tracing::error!("{}", err);
                ApiError::new(ErrorCode::DatabaseError, err.to_string())
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::DocumentNotFound { .. } | CoreError::ItemNotFound(_) => ErrorCode::NotFound,
            CoreError::CustomerConflict { .. } => ErrorCode::Conflict,
            CoreError::Validation(_)
            | CoreError::LineNotFound(_)
            | CoreError::DraftTooLarge { .. }
            | CoreError::QuantityTooLarge { .. } => ErrorCode::ValidationError,
        };

        let message = match err {
            CoreError::Validation(e) => e.to_string(),
            other => other.to_string(),
        };
        ApiError::new(code, message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(e) => e.into(),
            ServiceError::Db(e) => e.into(),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use billdesk_core::{DocumentKind, ValidationError};

    #[test]
    fn test_codes_serialize_screaming_snake_case() {
        let err = ApiError::new(ErrorCode::ValidationError, "customer_mobile is required");
        assert_eq!(
            err.to_json(),
            r#"{"code":"VALIDATION_ERROR","message":"customer_mobile is required"}"#
        );
    }

    #[test]
    fn test_service_errors_map_to_codes() {
        let conflict: ApiError = ServiceError::Core(CoreError::CustomerConflict {
            existing_name: "Alice".to_string(),
            mobile: "9876543210".to_string(),
        })
        .into();
        assert_eq!(conflict.code, ErrorCode::Conflict);
        assert!(conflict.message.contains("Alice"));

        let missing: ApiError = ServiceError::Core(CoreError::DocumentNotFound {
            kind: DocumentKind::Quotation,
            id: 3,
        })
        .into();
        assert_eq!(missing.code, ErrorCode::NotFound);
        assert_eq!(missing.message, "Quotation not found: 3");

        let invalid: ApiError = ServiceError::from(ValidationError::EmptyLines).into();
        assert_eq!(invalid.code, ErrorCode::ValidationError);
        assert_eq!(invalid.message, "At least one line item is required");

        let db: ApiError = ServiceError::Db(DbError::PoolExhausted).into();
        assert_eq!(db.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn test_config_error_code() {
        let err: ApiError = ConfigError::InvalidValue("BILLDESK_MAX_CONNECTIONS".to_string()).into();
        assert_eq!(err.code, ErrorCode::ConfigError);
        assert_eq!(err.message, "Invalid value for BILLDESK_MAX_CONNECTIONS");
    }
}
