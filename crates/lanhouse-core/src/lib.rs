//! # lanhouse-core: Pure Business Logic for the Rental Venue
//!
//! This crate is the **heart** of lanhouse. It holds the rules for renting
//! PCs and consoles by the minute as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lanhouse Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Operator Console (apps/console)                │   │
//! │  │   start ──► add-item ──► watch (1s ticks) ──► checkout         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ lanhouse-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │ pricing  │ │ session  │ │ account  │ │ finalize         │  │   │
//! │  │   │ tiers    │ │ Free     │ │ merge    │ │ commission       │  │   │
//! │  │   │ anchor   │ │ Fixed    │ │ subtotal │ │ stock, points    │  │   │
//! │  │   │          │ │ Redeem   │ │          │ │ sale + ledger    │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │ loyalty  │ │inventory │ │  venue   │ │ cash_drawer      │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO SYSTEM CLOCK • PURE FUNCTIONS      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 lanhouse-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Station, RateType, Client, SaleRecord, ...)
//! - [`money`] - Cents, commission rounding, operator amount parsing
//! - [`pricing`] - Tier pricing calculator
//! - [`session`] - Station session state machine
//! - [`account`] - Account accumulator (items billed with the rental)
//! - [`loyalty`] - Loyalty points ledger
//! - [`inventory`] - Stock decrements emitted at checkout
//! - [`finalize`] - Checkout: sale record, ledger entry and side effects
//! - [`cash_drawer`] - Append-only cash drawer ledger
//! - [`venue`] - Arena of stations keyed by id
//! - [`clock`] - Time source abstraction
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use lanhouse_core::pricing::cost_for_minutes;
//! use lanhouse_core::types::{RateTier, RateType};
//!
//! let rate = RateType::new(
//!     "pc",
//!     "PC",
//!     vec![
//!         RateTier::new(1, 15, 500),
//!         RateTier::new(16, 30, 1000),
//!         RateTier::new(31, 60, 1500),
//!     ],
//! );
//!
//! assert_eq!(cost_for_minutes(10, Some(&rate)).cents(), 500);
//! assert_eq!(cost_for_minutes(90, Some(&rate)).cents(), 2500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod account;
pub mod cash_drawer;
pub mod clock;
pub mod error;
pub mod finalize;
pub mod inventory;
pub mod loyalty;
pub mod money;
pub mod pricing;
pub mod session;
pub mod types;
pub mod validation;
pub mod venue;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cash_drawer::{CashDrawer, CashLedger, DrawerSummary};
pub use clock::{Clock, ManualClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use finalize::{Checkout, Collaborators, PaymentDecision, Settlement};
pub use inventory::{Inventory, StockBook, StockMove};
pub use loyalty::{ClientBook, LoyaltyLedger};
pub use money::Money;
pub use session::{ExpiryAlert, ExpiryNotifier, SessionRequest, SessionSnapshot, TickOutcome};
pub use types::*;
pub use venue::Venue;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines on one station's account.
pub const MAX_ACCOUNT_ITEMS: usize = 100;

/// Maximum quantity of a single account line.
///
/// ## Business Reason
/// Catches typing 100 instead of 1 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Longest prepaid block that can be sold in one go (24 hours).
pub const MAX_PREPAID_MINUTES: i64 = 24 * 60;

/// Most hours that can be redeemed for one session.
pub const MAX_REDEEM_HOURS: i64 = 24;

/// Client label printed on sales without an attached client.
pub const WALK_IN_CLIENT_LABEL: &str = "Walk-in customer";
