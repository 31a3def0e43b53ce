//! # Checkout
//!
//! Turns a finished session plus a payment decision into a sale record and
//! a cash-flow entry, applying every side effect in one place.
//!
//! ## Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  finalize(station, decision)                                            │
//! │                                                                         │
//! │  0. station must be Occupied ─────────────── else InvalidTransition     │
//! │  1. subtotal = time cost + account subtotal   (recomputed now)          │
//! │  2. settle: commission by method and policy                             │
//! │  3. Inventory.decrement_stock  for each non-service line                │
//! │  4. rental line "Rental <station>" appended to the sale items           │
//! │  5. LoyaltyLedger.credit       console + client + ≥ 1 full hour         │
//! │  6. SaleRecord + Income entry  ──► CashLedger.append                    │
//! │  7. session::release           station back to Available                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All checks run before step 3, so an error means nothing was touched.
//!
//! ## Commission
//! | method        | policy | customer pays      | venue nets         |
//! |---------------|--------|--------------------|--------------------|
//! | Cash/Transfer | any    | subtotal           | subtotal           |
//! | Card/MP       | Charge | subtotal + fee     | subtotal           |
//! | Card/MP       | Absorb | subtotal           | subtotal − fee     |
//!
//! An absorbed fee is not written as an Outcome; it only lowers the Income
//! amount.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::account;
use crate::cash_drawer::CashLedger;
use crate::error::{CoreError, CoreResult};
use crate::inventory::{Inventory, StockMove};
use crate::loyalty::{LoyaltyLedger, POINTS_PER_PLAYED_HOUR};
use crate::money::Money;
use crate::session;
use crate::types::{
    AccountItem, CashFlowEntry, CashFlowKind, CommissionPolicy, CommissionRate, PaymentMethod,
    RateType, SaleRecord, Station, StationKind,
};
use crate::WALK_IN_CLIENT_LABEL;

/// How the customer is paying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentDecision {
    pub method: PaymentMethod,
    pub policy: CommissionPolicy,
}

impl PaymentDecision {
    pub fn new(method: PaymentMethod, policy: CommissionPolicy) -> Self {
        PaymentDecision { method, policy }
    }

    pub fn cash() -> Self {
        PaymentDecision::new(PaymentMethod::Cash, CommissionPolicy::Charge)
    }
}

/// Money split of one checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Settlement {
    pub subtotal: Money,
    pub commission: Money,
    /// Paid by the customer.
    pub total: Money,
    /// Kept by the venue.
    pub net_received: Money,
}

/// Applies the processor fee for `method` under `policy`.
///
/// ## Example
/// ```rust
/// use lanhouse_core::finalize::settle;
/// use lanhouse_core::money::Money;
/// use lanhouse_core::types::{CommissionPolicy, CommissionRate, PaymentMethod};
///
/// let s = settle(
///     Money::from_cents(10000),
///     PaymentMethod::Card,
///     CommissionPolicy::Absorb,
///     CommissionRate::CARD,
/// );
/// assert_eq!(s.total.cents(), 10000);
/// assert_eq!(s.net_received.cents(), 9582);
/// ```
pub fn settle(
    subtotal: Money,
    method: PaymentMethod,
    policy: CommissionPolicy,
    rate: CommissionRate,
) -> Settlement {
    if !method.carries_commission() {
        return Settlement {
            subtotal,
            commission: Money::zero(),
            total: subtotal,
            net_received: subtotal,
        };
    }

    let commission = subtotal.apply_rate(rate);
    match policy {
        CommissionPolicy::Charge => Settlement {
            subtotal,
            commission,
            total: subtotal + commission,
            net_received: subtotal,
        },
        CommissionPolicy::Absorb => Settlement {
            subtotal,
            commission,
            total: subtotal,
            net_received: subtotal - commission,
        },
    }
}

/// Points a session earns: one per full elapsed hour, consoles only.
pub fn earned_points(kind: StationKind, elapsed_secs: i64) -> i64 {
    if kind != StationKind::Console {
        return 0;
    }
    (elapsed_secs.max(0) / 3600) * POINTS_PER_PLAYED_HOUR
}

/// The external systems checkout writes through.
pub struct Collaborators<'a> {
    pub loyalty: &'a mut dyn LoyaltyLedger,
    pub inventory: &'a mut dyn Inventory,
    pub ledger: &'a mut dyn CashLedger,
}

/// Points added to a client by checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PointsCredit {
    pub client_id: String,
    pub points: i64,
    pub new_balance: i64,
}

/// Everything one checkout produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Checkout {
    pub sale: SaleRecord,
    pub entry: CashFlowEntry,
    pub settlement: Settlement,
    pub stock_moves: Vec<StockMove>,
    pub points_credit: Option<PointsCredit>,
}

/// Checks out an occupied station and returns it to Available.
///
/// Any total shown to the operator earlier is ignored; the bill is
/// recomputed from the station at `now`.
pub fn finalize(
    station: &mut Station,
    rate: Option<&RateType>,
    decision: PaymentDecision,
    commission_rate: CommissionRate,
    effects: Collaborators<'_>,
    now: DateTime<Utc>,
) -> CoreResult<Checkout> {
    if !station.is_occupied() || station.start_time.is_none() || station.session_mode.is_none() {
        return Err(CoreError::invalid_transition(
            &station.id,
            station.status,
            "finalize",
        ));
    }

    let Collaborators {
        loyalty,
        inventory,
        ledger,
    } = effects;

    // 1. Freeze the bill
    let time_cost = session::time_cost(station, rate, now);
    let items_subtotal = account::subtotal(&station.account_items);
    let subtotal = time_cost + items_subtotal;

    // 2. Commission
    let settlement = settle(subtotal, decision.method, decision.policy, commission_rate);

    let client = station
        .client_id
        .as_deref()
        .and_then(|id| loyalty.client(id))
        .map(|c| (c.id.clone(), c.name.clone()));
    let client_label = client
        .as_ref()
        .map(|(_, name)| name.clone())
        .unwrap_or_else(|| WALK_IN_CLIENT_LABEL.to_string());

    // 3. Stock
    let stock_moves: Vec<StockMove> = station
        .account_items
        .iter()
        .filter(|item| !item.is_service)
        .map(|item| StockMove {
            product_id: item.id.clone(),
            quantity: item.quantity,
        })
        .collect();
    for mv in &stock_moves {
        inventory.decrement_stock(&mv.product_id, mv.quantity);
    }

    // 4. Rental line
    let mut items = station.account_items.clone();
    items.push(AccountItem {
        id: format!("time-{}", station.id),
        name: format!("Rental {}", station.name),
        unit_price_cents: time_cost.cents(),
        quantity: 1,
        unit_cost_cents: 0,
        is_service: true,
    });

    // 5. Loyalty credit
    let elapsed_secs = session::elapsed(station, now).num_seconds();
    let points = earned_points(station.kind, elapsed_secs);
    let points_credit = match (&client, points > 0) {
        (Some((client_id, _)), true) => {
            let new_balance = loyalty.credit(client_id, points)?;
            Some(PointsCredit {
                client_id: client_id.clone(),
                points,
                new_balance,
            })
        }
        _ => None,
    };

    // 6. Sale + ledger
    let sale = SaleRecord {
        folio: format!("F-{}", now.timestamp_millis()),
        date: now,
        station_id: station.id.clone(),
        client_label: client_label.clone(),
        payment_method: decision.method,
        items,
        subtotal_cents: settlement.subtotal.cents(),
        commission_cents: settlement.commission.cents(),
        total_cents: settlement.total.cents(),
        net_received_cents: settlement.net_received.cents(),
    };

    let entry = CashFlowEntry {
        id: Uuid::new_v4().to_string(),
        date: now,
        kind: CashFlowKind::Income,
        amount_cents: settlement.net_received.cents(),
        description: format!("Checkout {}", station.name),
        method: decision.method.into(),
        client: Some(client_label),
        reconciliation: None,
    };
    ledger.append(entry.clone());

    // 7. Free the station
    session::release(station)?;

    Ok(Checkout {
        sale,
        entry,
        settlement,
        stock_moves,
        points_credit,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
