//! # Cash Drawer Ledger
//!
//! Append-only log of money in and out of the drawer, with an
//! opening/closing protocol.
//!
//! ## Daily Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  open(500)            Opening  $500     ◄── baseline for today          │
//! │  checkout ...         Income   $200                                     │
//! │  record_movement      Outcome   $50     (ice for the fridge)            │
//! │                                                                         │
//! │  begin_close()        expected = 500 + 200 − 50 = $650                  │
//! │  close(640)           Closing  $650                                     │
//! │                       "System: $650.00, Counted: $640.00,               │
//! │                        Difference: -$10.00"                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The balance is never stored. It is derived from the entries at or after
//! the most recent Opening of the current calendar day; an Opening from a
//! previous day contributes nothing. Calendar days are evaluated in the
//! venue's UTC offset.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CashFlowEntry, CashFlowKind, EntryMethod, Reconciliation};
use crate::validation::{validate_description, validate_positive_amount, validate_price};

/// Where checkout writes its income entry.
pub trait CashLedger {
    fn append(&mut self, entry: CashFlowEntry);
}

/// Figures for the current drawer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DrawerSummary {
    pub is_open: bool,
    pub opening_cents: i64,
    pub income_cents: i64,
    pub outcome_cents: i64,
    pub balance_cents: i64,
}

impl DrawerSummary {
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingClose {
    expected: Money,
}

/// The drawer ledger for one venue.
#[derive(Debug, Clone)]
pub struct CashDrawer {
    entries: Vec<CashFlowEntry>,
    offset: FixedOffset,
    pending_close: Option<PendingClose>,
}

impl CashDrawer {
    /// Empty ledger whose calendar days follow `offset`.
    pub fn new(offset: FixedOffset) -> Self {
        CashDrawer {
            entries: Vec::new(),
            offset,
            pending_close: None,
        }
    }

    /// Rebuilds the ledger from persisted entries (any order).
    pub fn from_entries(mut entries: Vec<CashFlowEntry>, offset: FixedOffset) -> Self {
        entries.sort_by_key(|e| e.date);
        CashDrawer {
            entries,
            offset,
            pending_close: None,
        }
    }

    pub fn entries(&self) -> &[CashFlowEntry] {
        &self.entries
    }

    fn local_day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Entries of the current drawer session: today's, from the most
    /// recent Opening on. Empty when the drawer was not opened today.
    pub fn session_entries(&self, now: DateTime<Utc>) -> &[CashFlowEntry] {
        let today = self.local_day(now);
        let opening = self
            .entries
            .iter()
            .rposition(|e| e.kind == CashFlowKind::Opening && self.local_day(e.date) == today);

        match opening {
            Some(index) => &self.entries[index..],
            None => &[],
        }
    }

    /// Open iff the latest control entry of today is an Opening.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.session_entries(now)
            .iter()
            .rev()
            .find(|e| e.kind.is_control())
            .is_some_and(|e| e.kind == CashFlowKind::Opening)
    }

    /// Opening, income, outcome and balance of the current session.
    pub fn summary(&self, now: DateTime<Utc>) -> DrawerSummary {
        let mut opening = Money::zero();
        let mut income = Money::zero();
        let mut outcome = Money::zero();

        for entry in self.session_entries(now) {
            match entry.kind {
                CashFlowKind::Opening => opening = entry.amount(),
                CashFlowKind::Income => income += entry.amount(),
                CashFlowKind::Outcome => outcome += entry.amount(),
                CashFlowKind::Closing => {}
            }
        }

        DrawerSummary {
            is_open: self.is_open(now),
            opening_cents: opening.cents(),
            income_cents: income.cents(),
            outcome_cents: outcome.cents(),
            balance_cents: (opening + income - outcome).cents(),
        }
    }

    /// `opening + Σ income − Σ outcome` for the current session.
    pub fn balance(&self, now: DateTime<Utc>) -> Money {
        self.summary(now).balance()
    }

    /// Income since today's opening.
    pub fn daily_income(&self, now: DateTime<Utc>) -> Money {
        Money::from_cents(self.summary(now).income_cents)
    }

    /// Counted amount of the most recent Closing, offered as the next
    /// day's opening amount.
    pub fn last_counted_balance(&self) -> Option<Money> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.kind == CashFlowKind::Closing)
            .and_then(|e| e.reconciliation)
            .map(|r| r.counted())
    }

    /// Starts today's drawer session with `amount` in cash.
    pub fn open(&mut self, amount: Money, now: DateTime<Utc>) -> CoreResult<&CashFlowEntry> {
        if self.is_open(now) {
            return Err(CoreError::DrawerAlreadyOpen);
        }
        validate_price("amount", amount)?;

        self.pending_close = None;
        Ok(self.push(CashFlowKind::Opening, amount, "Cash drawer opened".to_string(), None, now))
    }

    /// Hand-entered Income or Outcome (supplies, petty cash, ...).
    pub fn record_movement(
        &mut self,
        kind: CashFlowKind,
        amount: Money,
        description: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<&CashFlowEntry> {
        if kind.is_control() {
            return Err(ValidationError::NotAllowed {
                field: "kind".to_string(),
                allowed: vec!["income".to_string(), "outcome".to_string()],
            }
            .into());
        }
        if !self.is_open(now) {
            return Err(CoreError::DrawerNotOpen);
        }
        validate_positive_amount(amount)?;
        let description = validate_description(description)?;

        Ok(self.push(kind, amount, description, None, now))
    }

    /// Computes and holds the expected balance for the next [`close`].
    ///
    /// [`close`]: CashDrawer::close
    pub fn begin_close(&mut self, now: DateTime<Utc>) -> CoreResult<Money> {
        if !self.is_open(now) {
            return Err(CoreError::DrawerNotOpen);
        }
        let expected = self.balance(now);
        self.pending_close = Some(PendingClose { expected });
        Ok(expected)
    }

    /// Drops a pending close without writing anything.
    pub fn cancel_close(&mut self) {
        self.pending_close = None;
    }

    /// The expected balance held by [`begin_close`], if any.
    ///
    /// [`begin_close`]: CashDrawer::begin_close
    pub fn pending_expected(&self) -> Option<Money> {
        self.pending_close.map(|p| p.expected)
    }

    /// Writes the Closing entry for the counted cash.
    ///
    /// The entry's amount is the expected (system) balance; the counted
    /// figure and the difference go into its description and
    /// reconciliation.
    pub fn close(&mut self, counted: Money, now: DateTime<Utc>) -> CoreResult<&CashFlowEntry> {
        let pending = self.pending_close.ok_or(CoreError::NoPendingClose)?;
        validate_price("counted", counted)?;

        self.pending_close = None;
        let reconciliation = Reconciliation::new(counted, pending.expected);
        let description = format!(
            "Cash drawer closed. System: {}, Counted: {}, Difference: {}",
            pending.expected,
            counted,
            reconciliation.difference()
        );

        Ok(self.push(
            CashFlowKind::Closing,
            pending.expected,
            description,
            Some(reconciliation),
            now,
        ))
    }

    fn push(
        &mut self,
        kind: CashFlowKind,
        amount: Money,
        description: String,
        reconciliation: Option<Reconciliation>,
        now: DateTime<Utc>,
    ) -> &CashFlowEntry {
        self.entries.push(CashFlowEntry {
            id: Uuid::new_v4().to_string(),
            date: now,
            kind,
            amount_cents: amount.cents(),
            description,
            method: EntryMethod::Manual,
            client: None,
            reconciliation,
        });
        &self.entries[self.entries.len() - 1]
    }
}

impl CashLedger for CashDrawer {
    fn append(&mut self, entry: CashFlowEntry) {
        self.entries.push(entry);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn dollars(n: i64) -> Money {
        Money::from_cents(n * 100)
    }

    fn sale_income(amount: Money, at: DateTime<Utc>) -> CashFlowEntry {
        CashFlowEntry {
            id: "sale-1".to_string(),
            date: at,
            kind: CashFlowKind::Income,
            amount_cents: amount.cents(),
            description: "Checkout PC 01".to_string(),
            method: EntryMethod::Cash,
            client: Some("Walk-in customer".to_string()),
            reconciliation: None,
        }
    }

    #[test]
    fn test_balance_and_closing_difference() {
        let mut drawer = CashDrawer::new(utc());
        drawer.open(dollars(500), t0()).unwrap();
        drawer.append(sale_income(dollars(200), t0() + TimeDelta::hours(1)));
        drawer
            .record_movement(CashFlowKind::Outcome, dollars(50), "Ice", t0() + TimeDelta::hours(2))
            .unwrap();

        let now = t0() + TimeDelta::hours(3);
        assert_eq!(drawer.balance(now), dollars(650));
        assert_eq!(drawer.daily_income(now), dollars(200));

        assert_eq!(drawer.begin_close(now).unwrap(), dollars(650));
        let closing = drawer.close(dollars(640), now).unwrap().clone();

        assert_eq!(closing.kind, CashFlowKind::Closing);
        assert_eq!(closing.amount(), dollars(650));
        assert_eq!(
            closing.description,
            "Cash drawer closed. System: $650.00, Counted: $640.00, Difference: -$10.00"
        );
        assert_eq!(closing.reconciliation.unwrap().difference_cents, -1000);
        assert!(!drawer.is_open(now));
        assert_eq!(drawer.last_counted_balance(), Some(dollars(640)));
    }

    #[test]
    fn test_close_requires_expected_balance() {
        let mut drawer = CashDrawer::new(utc());
        drawer.open(dollars(100), t0()).unwrap();
        let err = drawer.close(dollars(100), t0()).unwrap_err();
        assert!(matches!(err, CoreError::NoPendingClose));
        assert!(drawer.is_open(t0()));
    }

    #[test]
    fn test_cancel_close() {
        let mut drawer = CashDrawer::new(utc());
        drawer.open(dollars(100), t0()).unwrap();
        drawer.begin_close(t0()).unwrap();
        assert_eq!(drawer.pending_expected(), Some(dollars(100)));
        drawer.cancel_close();
        assert!(matches!(
            drawer.close(dollars(100), t0()),
            Err(CoreError::NoPendingClose)
        ));
    }

    #[test]
    fn test_cannot_open_twice() {
        let mut drawer = CashDrawer::new(utc());
        drawer.open(dollars(100), t0()).unwrap();
        assert!(matches!(
            drawer.open(dollars(100), t0()),
            Err(CoreError::DrawerAlreadyOpen)
        ));
    }

    #[test]
    fn test_reopen_after_close_starts_new_session() {
        let mut drawer = CashDrawer::new(utc());
        drawer.open(dollars(100), t0()).unwrap();
        drawer.append(sale_income(dollars(30), t0()));
        drawer.begin_close(t0()).unwrap();
        drawer.close(dollars(130), t0()).unwrap();

        let later = t0() + TimeDelta::hours(1);
        drawer.open(dollars(130), later).unwrap();
        assert_eq!(drawer.balance(later), dollars(130));
        assert_eq!(drawer.daily_income(later), Money::zero());
    }

    #[test]
    fn test_previous_day_opening_does_not_count() {
        let mut drawer = CashDrawer::new(utc());
        drawer.open(dollars(500), t0()).unwrap();

        let tomorrow = t0() + TimeDelta::days(1);
        assert!(!drawer.is_open(tomorrow));
        assert_eq!(drawer.balance(tomorrow), Money::zero());
        assert!(drawer.session_entries(tomorrow).is_empty());
        assert!(drawer.open(dollars(300), tomorrow).is_ok());
    }

    #[test]
    fn test_calendar_day_uses_venue_offset() {
        // 2024-05-02 03:00 UTC is still 2024-05-01 in UTC-6
        let offset = FixedOffset::west_opt(6 * 3600).unwrap();
        let mut drawer = CashDrawer::new(offset);
        drawer.open(dollars(500), t0()).unwrap();

        let late_night = Utc.with_ymd_and_hms(2024, 5, 2, 3, 0, 0).unwrap();
        assert!(drawer.is_open(late_night));
        assert_eq!(drawer.balance(late_night), dollars(500));
    }

    #[test]
    fn test_movements_need_open_drawer() {
        let mut drawer = CashDrawer::new(utc());
        assert!(matches!(
            drawer.record_movement(CashFlowKind::Income, dollars(10), "Tip", t0()),
            Err(CoreError::DrawerNotOpen)
        ));
        assert!(matches!(drawer.begin_close(t0()), Err(CoreError::DrawerNotOpen)));
    }

    #[test]
    fn test_movement_validation() {
        let mut drawer = CashDrawer::new(utc());
        drawer.open(dollars(100), t0()).unwrap();

        assert!(drawer
            .record_movement(CashFlowKind::Outcome, Money::zero(), "Ice", t0())
            .is_err());
        assert!(drawer
            .record_movement(CashFlowKind::Outcome, dollars(5), "  ", t0())
            .is_err());
        assert!(drawer
            .record_movement(CashFlowKind::Closing, dollars(5), "Sneaky", t0())
            .is_err());
        assert_eq!(drawer.entries().len(), 1);
    }

    #[test]
    fn test_from_entries_sorts_by_date() {
        let opening = CashFlowEntry {
            id: "o".to_string(),
            date: t0(),
            kind: CashFlowKind::Opening,
            amount_cents: 10000,
            description: "Cash drawer opened".to_string(),
            method: EntryMethod::Manual,
            client: None,
            reconciliation: None,
        };
        let income = sale_income(dollars(20), t0() + TimeDelta::minutes(5));

        let drawer = CashDrawer::from_entries(vec![income, opening], utc());
        assert_eq!(drawer.entries()[0].kind, CashFlowKind::Opening);
        assert_eq!(drawer.balance(t0() + TimeDelta::minutes(10)), dollars(120));
    }
}
