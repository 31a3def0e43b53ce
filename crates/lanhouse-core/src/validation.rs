//! # Validation Module
//!
//! Input validation for operator-entered values.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console arguments (clap)                                     │
//! │  └── Types and required flags                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business ranges: quantities, prepaid minutes, amounts             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / CHECK / FOREIGN KEY constraints                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::RateTier;
use crate::{MAX_ITEM_QUANTITY, MAX_PREPAID_MINUTES, MAX_REDEEM_HOURS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (station, client, custom item).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates the free-text description of a manual drawer movement.
///
/// ## Returns
/// The trimmed description.
pub fn validate_description(description: &str) -> ValidationResult<String> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 500,
        });
    }

    Ok(description.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an account line quantity (1..=MAX_ITEM_QUANTITY).
///
/// ## Example
/// ```rust
/// use lanhouse_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(0).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates the length of a prepaid (Fixed) block.
pub fn validate_prepaid_minutes(minutes: i64) -> ValidationResult<()> {
    if !(1..=MAX_PREPAID_MINUTES).contains(&minutes) {
        return Err(ValidationError::OutOfRange {
            field: "minutes".to_string(),
            min: 1,
            max: MAX_PREPAID_MINUTES,
        });
    }
    Ok(())
}

/// Validates the number of hours to redeem with points.
pub fn validate_redeem_hours(hours: i64) -> ValidationResult<()> {
    if !(1..=MAX_REDEEM_HOURS).contains(&hours) {
        return Err(ValidationError::OutOfRange {
            field: "hours".to_string(),
            min: 1,
            max: MAX_REDEEM_HOURS,
        });
    }
    Ok(())
}

/// Validates a price (zero allowed, e.g. complimentary items).
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an amount that must be strictly positive (manual movements).
pub fn validate_positive_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a points amount for a debit or credit.
pub fn validate_points(points: i64) -> ValidationResult<()> {
    if points < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "points".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Rate Validators
// =============================================================================

/// Validates a tier set before it is stored in the rate catalog.
///
/// ## Rules
/// - At least one tier
/// - `from_minutes >= 0` and `to_minutes >= from_minutes`
/// - Non-negative price
/// - No two tiers share a `from_minutes` (the scan would be ambiguous)
pub fn validate_rate_tiers(tiers: &[RateTier]) -> ValidationResult<()> {
    if tiers.is_empty() {
        return Err(ValidationError::Required {
            field: "tiers".to_string(),
        });
    }

    for tier in tiers {
        if tier.from_minutes < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "from_minutes".to_string(),
            });
        }
        if tier.to_minutes < tier.from_minutes {
            return Err(ValidationError::InvalidFormat {
                field: "to_minutes".to_string(),
                reason: format!(
                    "tier ends ({}) before it starts ({})",
                    tier.to_minutes, tier.from_minutes
                ),
            });
        }
        validate_price("price", tier.price())?;
    }

    let mut froms: Vec<i64> = tiers.iter().map(|t| t.from_minutes).collect();
    froms.sort_unstable();
    if let Some(pair) = froms.windows(2).find(|w| w[0] == w[1]) {
        return Err(ValidationError::Duplicate {
            field: "from_minutes".to_string(),
            value: pair[0].to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
