//! # Station Session State Machine
//!
//! Owns one station's lifecycle.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌───────────┐   start_session(Free | Fixed | Redeem)  ┌───────────┐   │
//! │   │ Available │ ──────────────────────────────────────► │ Occupied  │   │
//! │   │           │ ◄────────────────────────────────────── │           │   │
//! │   └───────────┘            release (finalize)           └─────┬─────┘   │
//! │                                                               │         │
//! │                                   add_account_item, tick ─────┘         │
//! │                                                                         │
//! │   Free:    no end time, time cost = pricing::cost(elapsed)              │
//! │   Fixed:   end = start + minutes, time cost fixed at start              │
//! │   Redeem:  end = start + hours, time cost 0, points debited at start    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition checks the state first and only then mutates, so a
//! failed call leaves the station exactly as it was.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::account;
use crate::error::{CoreError, CoreResult};
use crate::loyalty::{redemption_cost, LoyaltyLedger};
use crate::money::Money;
use crate::pricing;
use crate::types::{AccountItem, RateType, SessionMode, Station, StationStatus};
use crate::validation::{validate_prepaid_minutes, validate_redeem_hours};

// =============================================================================
// Requests and Snapshots
// =============================================================================

/// What the operator asked for when opening a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SessionRequest {
    Free,
    Fixed { minutes: i64 },
    Redeem { hours: i64 },
}

impl SessionRequest {
    pub fn mode(&self) -> SessionMode {
        match self {
            SessionRequest::Free => SessionMode::Free,
            SessionRequest::Fixed { .. } => SessionMode::Fixed,
            SessionRequest::Redeem { .. } => SessionMode::Redeem,
        }
    }
}

/// Display values for an occupied station at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionSnapshot {
    pub station_id: String,
    pub mode: SessionMode,
    pub elapsed_secs: i64,
    /// Countdown sessions only; never below zero.
    pub remaining_secs: Option<i64>,
    pub time_cost_cents: i64,
    pub items_subtotal_cents: i64,
    pub total_cents: i64,
    pub expired: bool,
}

impl SessionSnapshot {
    /// Seconds to show on the station tile: countdown for Fixed/Redeem,
    /// elapsed for Free.
    pub fn display_secs(&self) -> i64 {
        self.remaining_secs.unwrap_or(self.elapsed_secs)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Raised once when a countdown session reaches zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpiryAlert {
    pub station_id: String,
    pub station_name: String,
    #[ts(as = "String")]
    pub at: DateTime<Utc>,
}

/// Receives expiry alerts (sound, banner, log line).
pub trait ExpiryNotifier {
    fn notify(&mut self, alert: &ExpiryAlert);
}

/// Result of a tick: fresh display values plus, at most once per
/// session, the expiry alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub snapshot: SessionSnapshot,
    pub alert: Option<ExpiryAlert>,
}

/// Session fields handed over by [`release`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasedSession {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub mode: SessionMode,
    pub fixed_cost: Option<Money>,
    pub client_id: Option<String>,
    pub account_items: Vec<AccountItem>,
}

// =============================================================================
// Transitions
// =============================================================================

/// Available → Occupied.
///
/// For Redeem sessions with a client the points are debited before the
/// station changes state; a rejected debit leaves the station Available
/// and the balance untouched.
pub fn start_session(
    station: &mut Station,
    client_id: Option<String>,
    request: SessionRequest,
    rate: Option<&RateType>,
    loyalty: &mut dyn LoyaltyLedger,
    now: DateTime<Utc>,
) -> CoreResult<()> {
    if station.is_occupied() {
        return Err(CoreError::invalid_transition(
            &station.id,
            station.status,
            "start a session",
        ));
    }

    let (end_time, fixed_cost) = match request {
        SessionRequest::Free => (None, None),
        SessionRequest::Fixed { minutes } => {
            validate_prepaid_minutes(minutes)?;
            (
                Some(now + TimeDelta::minutes(minutes)),
                Some(pricing::cost_for_minutes(minutes, rate)),
            )
        }
        SessionRequest::Redeem { hours } => {
            validate_redeem_hours(hours)?;
            (Some(now + TimeDelta::hours(hours)), Some(Money::zero()))
        }
    };

    if let Some(client) = client_id.as_deref() {
        if loyalty.client(client).is_none() {
            return Err(CoreError::ClientNotFound(client.to_string()));
        }
    }

    if let (SessionRequest::Redeem { hours }, Some(client)) = (request, client_id.as_deref()) {
        loyalty.debit(client, redemption_cost(hours))?;
    }

    station.status = StationStatus::Occupied;
    station.start_time = Some(now);
    station.end_time = end_time;
    station.session_mode = Some(request.mode());
    station.fixed_cost_cents = fixed_cost.map(|c| c.cents());
    station.client_id = client_id;
    station.account_items.clear();
    station.expiry_signaled = false;

    Ok(())
}

/// Charges `quantity` of `item` to the open session.
pub fn add_account_item(station: &mut Station, item: AccountItem, quantity: i64) -> CoreResult<()> {
    if !station.is_occupied() {
        return Err(CoreError::invalid_transition(
            &station.id,
            station.status,
            "add items",
        ));
    }
    account::add_item(&mut station.account_items, item, quantity)
}

/// Recomputes display values and fires the expiry alert on the first tick
/// that sees a countdown at zero.
///
/// Safe to call at any rate: apart from latching `expiry_signaled` it
/// changes nothing.
pub fn tick(station: &mut Station, rate: Option<&RateType>, now: DateTime<Utc>) -> CoreResult<TickOutcome> {
    let snapshot = snapshot(station, rate, now).ok_or_else(|| {
        CoreError::invalid_transition(&station.id, station.status, "tick")
    })?;

    let alert = if snapshot.expired && !station.expiry_signaled {
        station.expiry_signaled = true;
        Some(ExpiryAlert {
            station_id: station.id.clone(),
            station_name: station.name.clone(),
            at: now,
        })
    } else {
        None
    };

    Ok(TickOutcome { snapshot, alert })
}

/// Occupied → Available, handing the session fields to the caller.
pub fn release(station: &mut Station) -> CoreResult<ReleasedSession> {
    let (Some(start_time), Some(mode), true) =
        (station.start_time, station.session_mode, station.is_occupied())
    else {
        return Err(CoreError::invalid_transition(
            &station.id,
            station.status,
            "finalize",
        ));
    };

    let released = ReleasedSession {
        start_time,
        end_time: station.end_time.take(),
        mode,
        fixed_cost: station.fixed_cost_cents.take().map(Money::from_cents),
        client_id: station.client_id.take(),
        account_items: std::mem::take(&mut station.account_items),
    };

    station.status = StationStatus::Available;
    station.start_time = None;
    station.session_mode = None;
    station.expiry_signaled = false;

    Ok(released)
}

// =============================================================================
// Derived Values
// =============================================================================

/// Whole seconds since the session started (zero if the clock went back).
pub fn elapsed(station: &Station, now: DateTime<Utc>) -> TimeDelta {
    match station.start_time {
        Some(start) => TimeDelta::seconds((now - start).num_seconds().max(0)),
        None => TimeDelta::zero(),
    }
}

/// Whole seconds left on a countdown session, floored at zero.
pub fn remaining(station: &Station, now: DateTime<Utc>) -> Option<TimeDelta> {
    station
        .end_time
        .map(|end| TimeDelta::seconds((end - now).num_seconds().max(0)))
}

/// Rental part of the bill: the fixed cost for countdown sessions, the
/// live tier price for Free sessions.
pub fn time_cost(station: &Station, rate: Option<&RateType>, now: DateTime<Utc>) -> Money {
    match station.session_mode {
        Some(SessionMode::Free) => pricing::cost(elapsed(station, now), rate),
        Some(SessionMode::Fixed) | Some(SessionMode::Redeem) => {
            station.fixed_cost().unwrap_or_default()
        }
        None => Money::zero(),
    }
}

/// Pure read of the display values; `None` when the station is idle.
pub fn snapshot(station: &Station, rate: Option<&RateType>, now: DateTime<Utc>) -> Option<SessionSnapshot> {
    let mode = station.session_mode.filter(|_| station.is_occupied())?;

    let remaining = remaining(station, now);
    let time_cost = time_cost(station, rate, now);
    let items_subtotal = account::subtotal(&station.account_items);

    Some(SessionSnapshot {
        station_id: station.id.clone(),
        mode,
        elapsed_secs: elapsed(station, now).num_seconds(),
        remaining_secs: remaining.map(|r| r.num_seconds()),
        time_cost_cents: time_cost.cents(),
        items_subtotal_cents: items_subtotal.cents(),
        total_cents: (time_cost + items_subtotal).cents(),
        expired: mode.is_countdown() && remaining.is_some_and(|r| r.is_zero()),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
