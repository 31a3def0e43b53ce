//! # Console Error Type
//!
//! Unified error type for console commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Console                            │
//! │                                                                         │
//! │  lanhouse checkout PC-03                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, CliError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Rule Error? ──── CoreError::InvalidTransition ── CliError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: error[BUSINESS_LOGIC]: Station PC-03 is Available, ...         │
//! │  exit status: 4                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! With `--json` the same error is printed as `{"code": ..., "message": ...}`.

use serde::Serialize;

use crate::state::ConfigError;
use lanhouse_core::{CoreError, ValidationError};
use lanhouse_db::DbError;

/// Error returned from console commands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliError {
    /// Machine-readable error code for scripts
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes, each with its own exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Station, client or product not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Station state or drawer state forbids the action
    BusinessLogic,

    /// Not enough loyalty points
    InsufficientPoints,

    /// Database operation failed
    DatabaseError,

    /// Bad environment configuration
    ConfigError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Process exit status for this code.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::Internal => 1,
            ErrorCode::ValidationError => 2,
            ErrorCode::NotFound => 3,
            ErrorCode::BusinessLogic | ErrorCode::InsufficientPoints => 4,
            ErrorCode::DatabaseError => 5,
            ErrorCode::ConfigError => 78,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        CliError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Internal, message)
    }

    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }
}

/// Converts database errors to console errors.
impl From<DbError> for CliError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CliError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => CliError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                CliError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::Corrupt { entity, id, reason } => {
                tracing::error!(%entity, %id, %reason, "Corrupt row");
                CliError::new(
                    ErrorCode::DatabaseError,
                    format!("Stored {} {} is unreadable", entity, id),
                )
            }
            other => {
                tracing::error!("Database operation failed: {}", other);
                CliError::new(ErrorCode::DatabaseError, other.to_string())
            }
        }
    }
}

/// Converts core errors to console errors.
impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::StationNotFound(id) => CliError::not_found("Station", &id),
            CoreError::ClientNotFound(id) => CliError::not_found("Client", &id),
            CoreError::ProductNotFound(id) => CliError::not_found("Product", &id),
            err @ CoreError::InsufficientPoints { .. } => {
                CliError::new(ErrorCode::InsufficientPoints, err.to_string())
            }
            err @ (CoreError::InvalidTransition { .. }
            | CoreError::DrawerAlreadyOpen
            | CoreError::DrawerNotOpen
            | CoreError::NoPendingClose) => CliError::new(ErrorCode::BusinessLogic, err.to_string()),
            err @ (CoreError::AccountTooLarge { .. } | CoreError::QuantityTooLarge { .. }) => {
                CliError::validation(err.to_string())
            }
            CoreError::Validation(e) => CliError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::validation(err.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::internal(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(format!("JSON output failed: {}", err))
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for CliError {}
