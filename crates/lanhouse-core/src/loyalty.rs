//! # Loyalty Ledger
//!
//! Client points: earned on console time, spent on free hours.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  earn:   console session, ≥ 1 full hour  ──►  +1 point per full hour    │
//! │  spend:  Redeem session of N hours       ──►  −10 × N points            │
//! │                                                                         │
//! │  balance ≥ 0 always: a debit that would go below zero is REJECTED,      │
//! │  never clamped.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The registry itself lives outside the core; [`LoyaltyLedger`] is the
//! contract the session and checkout code needs from it. [`ClientBook`] is
//! the in-memory implementation used by the console and the tests.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CoreError, CoreResult};
use crate::types::Client;
use crate::validation::validate_points;

/// Points spent per redeemed hour.
pub const POINTS_PER_FREE_HOUR: i64 = 10;

/// Points earned per full hour played on a console.
pub const POINTS_PER_PLAYED_HOUR: i64 = 1;

/// Points needed to redeem `hours`.
#[inline]
pub fn redemption_cost(hours: i64) -> i64 {
    hours * POINTS_PER_FREE_HOUR
}

/// Most hours a balance can pay for. Callers check this before offering a
/// Redeem session.
///
/// ## Example
/// ```rust
/// use lanhouse_core::loyalty::redeemable_hours;
///
/// assert_eq!(redeemable_hours(25), 2);
/// assert_eq!(redeemable_hours(9), 0);
/// ```
#[inline]
pub fn redeemable_hours(points: i64) -> i64 {
    points.max(0) / POINTS_PER_FREE_HOUR
}

/// Read/write access to client point balances.
pub trait LoyaltyLedger {
    /// Looks up a client.
    fn client(&self, client_id: &str) -> Option<&Client>;

    /// Removes points. Fails without changing anything when the balance
    /// would go negative. Returns the new balance.
    fn debit(&mut self, client_id: &str, points: i64) -> CoreResult<i64>;

    /// Adds points. Returns the new balance.
    fn credit(&mut self, client_id: &str, points: i64) -> CoreResult<i64>;
}

/// In-memory client registry that remembers which clients changed.
#[derive(Debug, Clone, Default)]
pub struct ClientBook {
    clients: BTreeMap<String, Client>,
    touched: BTreeSet<String>,
}

impl ClientBook {
    pub fn new() -> Self {
        ClientBook::default()
    }

    /// Builds a book from loaded clients.
    pub fn from_clients(clients: impl IntoIterator<Item = Client>) -> Self {
        ClientBook {
            clients: clients.into_iter().map(|c| (c.id.clone(), c)).collect(),
            touched: BTreeSet::new(),
        }
    }

    pub fn insert(&mut self, client: Client) {
        self.clients.insert(client.id.clone(), client);
    }

    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    /// Drains the clients whose balance changed since the last call.
    pub fn take_touched(&mut self) -> Vec<Client> {
        let touched = std::mem::take(&mut self.touched);
        touched
            .into_iter()
            .filter_map(|id| self.clients.get(&id).cloned())
            .collect()
    }
}

impl LoyaltyLedger for ClientBook {
    fn client(&self, client_id: &str) -> Option<&Client> {
        self.clients.get(client_id)
    }

    fn debit(&mut self, client_id: &str, points: i64) -> CoreResult<i64> {
        validate_points(points)?;
        let client = self
            .clients
            .get_mut(client_id)
            .ok_or_else(|| CoreError::ClientNotFound(client_id.to_string()))?;

        if client.points < points {
            return Err(CoreError::InsufficientPoints {
                client_id: client_id.to_string(),
                available: client.points,
                requested: points,
            });
        }

        client.points -= points;
        self.touched.insert(client_id.to_string());
        Ok(client.points)
    }

    fn credit(&mut self, client_id: &str, points: i64) -> CoreResult<i64> {
        validate_points(points)?;
        let client = self
            .clients
            .get_mut(client_id)
            .ok_or_else(|| CoreError::ClientNotFound(client_id.to_string()))?;

        client.points += points;
        self.touched.insert(client_id.to_string());
        Ok(client.points)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> ClientBook {
        ClientBook::from_clients([Client::new("c1", "Ana", 25), Client::new("c2", "Luis", 0)])
    }

    #[test]
    fn test_redemption_math() {
        assert_eq!(redemption_cost(2), 20);
        assert_eq!(redeemable_hours(25), 2);
        assert_eq!(redeemable_hours(-3), 0);
    }

    #[test]
    fn test_debit_and_credit() {
        let mut book = book();
        assert_eq!(book.debit("c1", 20).unwrap(), 5);
        assert_eq!(book.credit("c1", 3).unwrap(), 8);
        assert_eq!(book.client("c1").unwrap().points, 8);
    }

    #[test]
    fn test_debit_rejects_overdraft_without_clamping() {
        let mut book = book();
        let err = book.debit("c1", 30).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientPoints {
                available: 25,
                requested: 30,
                ..
            }
        ));
        assert_eq!(book.client("c1").unwrap().points, 25);
        assert!(book.take_touched().is_empty());
    }

    #[test]
    fn test_unknown_client() {
        let mut book = book();
        assert!(matches!(
            book.credit("nobody", 1),
            Err(CoreError::ClientNotFound(_))
        ));
    }

    #[test]
    fn test_negative_points_rejected() {
        let mut book = book();
        assert!(book.debit("c1", -5).is_err());
        assert!(book.credit("c1", -5).is_err());
        assert_eq!(book.client("c1").unwrap().points, 25);
    }

    #[test]
    fn test_take_touched() {
        let mut book = book();
        book.credit("c2", 1).unwrap();
        let touched = book.take_touched();
        assert_eq!(touched.len(), 1);
        assert_eq!(touched[0].id, "c2");
        assert!(book.take_touched().is_empty());
    }
}
