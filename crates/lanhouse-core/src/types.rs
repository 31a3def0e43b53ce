//! # Domain Types
//!
//! Core domain types used throughout lanhouse.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    RateType     │   │     Station     │   │   AccountItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, name       │◄──│  rate_id        │──►│  id + price     │       │
//! │  │  tiers[]        │   │  status, mode   │   │  quantity       │       │
//! │  │   from/to/price │   │  start/end      │   │  is_service     │       │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │ checkout                              │
//! │                                 ▼                                       │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Client      │   │   SaleRecord    │   │  CashFlowEntry  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  points ≥ 0     │   │  folio, items   │   │  Opening/Income │       │
//! │  │                 │   │  commission     │   │  Outcome/Closing│       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Money fields are stored as `*_cents: i64` with `Money` accessors, so the
//! structs map one-to-one onto database rows and JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Commission Rate
// =============================================================================

/// Commission rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 418 bps = 4.18%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionRate(u32);

impl CommissionRate {
    /// Processor fee on card and wallet payments (4.18%).
    pub const CARD: CommissionRate = CommissionRate(418);

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        CommissionRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        CommissionRate::CARD
    }
}

// =============================================================================
// Rates
// =============================================================================

/// One priced band of a rate: sessions of `from..=to` minutes cost `price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RateTier {
    /// Lower bound in minutes (inclusive).
    pub from_minutes: i64,
    /// Upper bound in minutes. A tier with `to_minutes == 60` is the hourly anchor.
    pub to_minutes: i64,
    pub price_cents: i64,
}

impl RateTier {
    pub fn new(from_minutes: i64, to_minutes: i64, price_cents: i64) -> Self {
        RateTier {
            from_minutes,
            to_minutes,
            price_cents,
        }
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether this tier prices whole hours for long sessions.
    #[inline]
    pub fn is_hourly_anchor(&self) -> bool {
        self.to_minutes == 60
    }
}

/// A named set of tiers, e.g. "PC" or "Console".
///
/// Edited from outside the core; stations reference it by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RateType {
    pub id: String,
    pub name: String,
    pub tiers: Vec<RateTier>,
}

impl RateType {
    pub fn new(id: impl Into<String>, name: impl Into<String>, tiers: Vec<RateTier>) -> Self {
        RateType {
            id: id.into(),
            name: name.into(),
            tiers,
        }
    }

    /// Tiers ordered by ascending `from_minutes` (stable).
    pub fn sorted_tiers(&self) -> Vec<RateTier> {
        let mut tiers = self.tiers.clone();
        tiers.sort_by_key(|t| t.from_minutes);
        tiers
    }

    /// The tier ending at exactly 60 minutes, if configured.
    pub fn hourly_anchor(&self) -> Option<&RateTier> {
        let mut anchors: Vec<&RateTier> = self.tiers.iter().filter(|t| t.is_hourly_anchor()).collect();
        anchors.sort_by_key(|t| t.from_minutes);
        anchors.into_iter().next()
    }
}

// =============================================================================
// Station
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StationKind {
    Pc,
    Console,
}

/// Occupancy of a station.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StationStatus {
    /// Free to start a session.
    Available,
    /// A session is running.
    Occupied,
}

impl Default for StationStatus {
    fn default() -> Self {
        StationStatus::Available
    }
}

/// How the running session is billed.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Open-ended; cost follows elapsed time.
    Free,
    /// Prepaid block; cost fixed at start, counts down.
    Fixed,
    /// Block paid with loyalty points; costs nothing, counts down.
    Redeem,
}

impl SessionMode {
    /// Whether the session has an end time and counts down.
    #[inline]
    pub fn is_countdown(&self) -> bool {
        matches!(self, SessionMode::Fixed | SessionMode::Redeem)
    }
}

/// A rentable PC or console.
///
/// Session fields (`start_time` through `expiry_signaled`) only carry
/// meaning while `status == Occupied` and are cleared together when the
/// session is finalized. Mutate through [`crate::session`] or
/// [`crate::venue::Venue`], never by writing fields directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub kind: StationKind,
    pub status: StationStatus,
    pub rate_id: String,
    #[ts(as = "Option<String>")]
    pub start_time: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub end_time: Option<DateTime<Utc>>,
    pub session_mode: Option<SessionMode>,
    pub fixed_cost_cents: Option<i64>,
    pub client_id: Option<String>,
    pub account_items: Vec<AccountItem>,
    /// Latched once the countdown expiry alert has fired.
    pub expiry_signaled: bool,
}

impl Station {
    /// Creates an idle station.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: StationKind,
        rate_id: impl Into<String>,
    ) -> Self {
        Station {
            id: id.into(),
            name: name.into(),
            kind,
            status: StationStatus::Available,
            rate_id: rate_id.into(),
            start_time: None,
            end_time: None,
            session_mode: None,
            fixed_cost_cents: None,
            client_id: None,
            account_items: Vec::new(),
            expiry_signaled: false,
        }
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.status == StationStatus::Occupied
    }

    /// Prepaid cost of a Fixed/Redeem session.
    pub fn fixed_cost(&self) -> Option<Money> {
        self.fixed_cost_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Account Item
// =============================================================================

/// A product or service charged to an open session.
///
/// Lines with the same `id` and `unit_price_cents` merge; see
/// [`crate::account::add_item`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AccountItem {
    pub id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// Purchase cost per unit, kept for margin reports.
    pub unit_cost_cents: i64,
    /// Services never move stock.
    pub is_service: bool,
}

impl AccountItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price() * self.quantity
    }
}

// =============================================================================
// Client
// =============================================================================

/// A registered customer with a loyalty balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Client {
    pub id: String,
    pub name: String,
    /// Never negative.
    pub points: i64,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Client {
    pub fn new(id: impl Into<String>, name: impl Into<String>, points: i64) -> Self {
        Client {
            id: id.into(),
            name: name.into(),
            points,
            phone: None,
            email: None,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog entry that can be added to a station's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub barcode: Option<String>,
    pub sale_price_cents: i64,
    pub purchase_price_cents: i64,
    /// Whether checkout decrements `stock`.
    pub manages_inventory: bool,
    /// Current stock level; may go negative when oversold.
    pub stock: i64,
    /// Services (printing, scanning, ...) have no stock.
    pub is_service: bool,
}

impl Product {
    /// Whether a sale of this product should move stock.
    #[inline]
    pub fn tracks_stock(&self) -> bool {
        self.manages_inventory && !self.is_service
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How the customer pays at checkout.
///
/// Wire names match the labels the venue front end already stores.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    #[serde(rename = "Efectivo")]
    Cash,
    #[serde(rename = "Tarjeta")]
    Card,
    #[serde(rename = "Mercado Pago")]
    MercadoPago,
    #[serde(rename = "Transferencia")]
    Transfer,
}

impl PaymentMethod {
    /// Card-type methods pay a processor fee.
    #[inline]
    pub fn carries_commission(&self) -> bool {
        matches!(self, PaymentMethod::Card | PaymentMethod::MercadoPago)
    }
}

/// Who pays the processor fee on card-type methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CommissionPolicy {
    /// Customer pays the fee on top; the venue nets the subtotal.
    Charge,
    /// Customer pays the subtotal; the fee comes out of the venue's net.
    Absorb,
}

impl Default for CommissionPolicy {
    fn default() -> Self {
        CommissionPolicy::Charge
    }
}

/// Method recorded on a cash-flow entry: a payment method, or `Manual` for
/// drawer control entries and hand-entered movements.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum EntryMethod {
    #[serde(rename = "Efectivo")]
    Cash,
    #[serde(rename = "Tarjeta")]
    Card,
    #[serde(rename = "Mercado Pago")]
    MercadoPago,
    #[serde(rename = "Transferencia")]
    Transfer,
    #[serde(rename = "Manual")]
    Manual,
}

impl From<PaymentMethod> for EntryMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => EntryMethod::Cash,
            PaymentMethod::Card => EntryMethod::Card,
            PaymentMethod::MercadoPago => EntryMethod::MercadoPago,
            PaymentMethod::Transfer => EntryMethod::Transfer,
        }
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// Immutable snapshot of one checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRecord {
    /// Human-facing sale number, `F-<unix millis>`.
    pub folio: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub station_id: String,
    /// Client name, or the walk-in label.
    pub client_label: String,
    pub payment_method: PaymentMethod,
    /// Account lines followed by the rental line.
    pub items: Vec<AccountItem>,
    pub subtotal_cents: i64,
    pub commission_cents: i64,
    /// What the customer paid.
    pub total_cents: i64,
    /// What the venue keeps after the processor fee.
    pub net_received_cents: i64,
}

impl SaleRecord {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn net_received(&self) -> Money {
        Money::from_cents(self.net_received_cents)
    }
}

// =============================================================================
// Cash Flow
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowKind {
    /// Start-of-day cash baseline.
    Opening,
    Income,
    Outcome,
    /// Counted-vs-system reconciliation.
    Closing,
}

impl CashFlowKind {
    /// Opening and Closing drive the drawer state; the rest are movements.
    #[inline]
    pub fn is_control(&self) -> bool {
        matches!(self, CashFlowKind::Opening | CashFlowKind::Closing)
    }
}

/// Figures recorded with a Closing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reconciliation {
    pub counted_cents: i64,
    pub expected_cents: i64,
    /// `counted - expected`; negative means cash is missing.
    pub difference_cents: i64,
}

impl Reconciliation {
    pub fn new(counted: Money, expected: Money) -> Self {
        Reconciliation {
            counted_cents: counted.cents(),
            expected_cents: expected.cents(),
            difference_cents: (counted - expected).cents(),
        }
    }

    #[inline]
    pub fn counted(&self) -> Money {
        Money::from_cents(self.counted_cents)
    }

    #[inline]
    pub fn difference(&self) -> Money {
        Money::from_cents(self.difference_cents)
    }
}

/// One line of the append-only cash drawer ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashFlowEntry {
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub kind: CashFlowKind,
    pub amount_cents: i64,
    pub description: String,
    pub method: EntryMethod,
    /// Client label for sale income.
    pub client: Option<String>,
    /// Present on Closing entries only.
    pub reconciliation: Option<Reconciliation>,
}

impl CashFlowEntry {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_rate() {
        assert_eq!(CommissionRate::CARD.bps(), 418);
        assert!((CommissionRate::CARD.percentage() - 4.18).abs() < 0.001);
        assert_eq!(CommissionRate::default(), CommissionRate::CARD);
    }

    #[test]
    fn test_hourly_anchor() {
        let rate = RateType::new(
            "pc",
            "PC",
            vec![RateTier::new(31, 60, 1500), RateTier::new(1, 30, 1000)],
        );
        assert_eq!(rate.hourly_anchor().map(|t| t.price_cents), Some(1500));

        let no_anchor = RateType::new("x", "X", vec![RateTier::new(1, 45, 700)]);
        assert!(no_anchor.hourly_anchor().is_none());
    }

    #[test]
    fn test_sorted_tiers() {
        let rate = RateType::new(
            "pc",
            "PC",
            vec![
                RateTier::new(31, 60, 1500),
                RateTier::new(1, 15, 500),
                RateTier::new(16, 30, 1000),
            ],
        );
        let froms: Vec<i64> = rate.sorted_tiers().iter().map(|t| t.from_minutes).collect();
        assert_eq!(froms, vec![1, 16, 31]);
    }

    #[test]
    fn test_new_station_is_available() {
        let station = Station::new("PC-01", "PC 01", StationKind::Pc, "pc");
        assert_eq!(station.status, StationStatus::Available);
        assert!(!station.is_occupied());
        assert!(station.account_items.is_empty());
    }

    #[test]
    fn test_commission_methods() {
        assert!(!PaymentMethod::Cash.carries_commission());
        assert!(PaymentMethod::Card.carries_commission());
        assert!(PaymentMethod::MercadoPago.carries_commission());
        assert!(!PaymentMethod::Transfer.carries_commission());
    }

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Card).unwrap(),
            "\"Tarjeta\""
        );
        let parsed: PaymentMethod = serde_json::from_str("\"Mercado Pago\"").unwrap();
        assert_eq!(parsed, PaymentMethod::MercadoPago);
        assert_eq!(EntryMethod::from(PaymentMethod::Cash), EntryMethod::Cash);
    }

    #[test]
    fn test_reconciliation_difference() {
        let rec = Reconciliation::new(Money::from_cents(64000), Money::from_cents(65000));
        assert_eq!(rec.difference_cents, -1000);
        assert_eq!(rec.counted().cents(), 64000);
    }

    #[test]
    fn test_product_tracks_stock() {
        let mut product = Product {
            id: "p1".to_string(),
            name: "Soda".to_string(),
            category: None,
            barcode: None,
            sale_price_cents: 1800,
            purchase_price_cents: 1200,
            manages_inventory: true,
            stock: 10,
            is_service: false,
        };
        assert!(product.tracks_stock());
        product.is_service = true;
        assert!(!product.tracks_stock());
    }
}
