//! # Error Types
//!
//! Domain-specific error types for lanhouse-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lanhouse-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  lanhouse-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Console errors (in app)                                               │
//! │  └── CliError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → exit status            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors are enum variants, never String. A missing tier is NOT an error:
//! pricing degrades to zero cost.

use thiserror::Error;

use crate::types::StationStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Station id is not part of the venue.
    #[error("Station not found: {0}")]
    StationNotFound(String),

    /// Client id is not in the registry.
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Product id is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The station is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Starting a session on an Occupied station
    /// - Adding items to, ticking or finalizing an Available station
    ///
    /// ## User Workflow
    /// ```text
    /// checkout PC-03
    ///      │
    ///      ▼
    /// PC-03 status: Available
    ///      │
    ///      ▼
    /// InvalidTransition { station_id: "PC-03", status: Available, action: "finalize" }
    /// ```
    #[error("Station {station_id} is {status:?}, cannot {action}")]
    InvalidTransition {
        station_id: String,
        status: StationStatus,
        action: String,
    },

    /// A points debit would leave the client with a negative balance.
    #[error("Client {client_id} has {available} points, cannot debit {requested}")]
    InsufficientPoints {
        client_id: String,
        available: i64,
        requested: i64,
    },

    /// Account has exceeded maximum allowed lines.
    #[error("Account cannot have more than {max} items")]
    AccountTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// An Opening was attempted while today's drawer is already open.
    #[error("Cash drawer is already open")]
    DrawerAlreadyOpen,

    /// Movement or closing attempted without an open drawer.
    #[error("Cash drawer is not open")]
    DrawerNotOpen,

    /// Closing attempted without first computing the expected balance.
    #[error("Cash drawer close requires a computed expected balance")]
    NoPendingClose,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidTransition error.
    pub fn invalid_transition(
        station_id: impl Into<String>,
        status: StationStatus,
        action: impl Into<String>,
    ) -> Self {
        CoreError::InvalidTransition {
            station_id: station_id.into(),
            status,
            action: action.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., unparseable amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate station id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
