//! # Venue
//!
//! The floor: every station keyed by id, plus the rate catalog they price
//! against. All station mutation goes through here (or through
//! [`crate::session`] directly in tests); nothing outside writes station
//! fields.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Venue                                                                  │
//! │  ├── stations: BTreeMap<id, Station>   PC-01, PC-02, XB-01, ...         │
//! │  ├── rates:    HashMap<id, RateType>   read-only during a session       │
//! │  └── commission_rate                   card fee for checkout            │
//! │                                                                         │
//! │  start_session ─┐                                                       │
//! │  add_item ──────┼──► session::*  ──► pricing                            │
//! │  tick / tick_all┘                                                       │
//! │  finalize ──────────► finalize::finalize ──► collaborators              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::finalize::{self, Checkout, Collaborators, PaymentDecision};
use crate::loyalty::LoyaltyLedger;
use crate::session::{self, ExpiryNotifier, SessionRequest, SessionSnapshot, TickOutcome};
use crate::types::{AccountItem, CommissionRate, RateType, Station};

#[derive(Debug, Clone, Default)]
pub struct Venue {
    stations: BTreeMap<String, Station>,
    rates: HashMap<String, RateType>,
    commission_rate: CommissionRate,
}

impl Venue {
    /// Creates a venue with the given rate catalog and no stations.
    pub fn new(rates: impl IntoIterator<Item = RateType>) -> Self {
        Venue {
            stations: BTreeMap::new(),
            rates: rates.into_iter().map(|r| (r.id.clone(), r)).collect(),
            commission_rate: CommissionRate::CARD,
        }
    }

    /// Overrides the card commission used at checkout.
    pub fn with_commission_rate(mut self, rate: CommissionRate) -> Self {
        self.commission_rate = rate;
        self
    }

    pub fn commission_rate(&self) -> CommissionRate {
        self.commission_rate
    }

    /// Registers a station. Loaded stations keep their session state.
    pub fn add_station(&mut self, station: Station) -> CoreResult<()> {
        if self.stations.contains_key(&station.id) {
            return Err(ValidationError::Duplicate {
                field: "station id".to_string(),
                value: station.id,
            }
            .into());
        }
        self.stations.insert(station.id.clone(), station);
        Ok(())
    }

    /// Swaps in a fresh read of every station, e.g. when another process
    /// owns starts and checkouts and this one only ticks.
    pub fn replace_stations(&mut self, stations: impl IntoIterator<Item = Station>) {
        self.stations = stations.into_iter().map(|s| (s.id.clone(), s)).collect();
    }

    pub fn station(&self, station_id: &str) -> CoreResult<&Station> {
        self.stations
            .get(station_id)
            .ok_or_else(|| CoreError::StationNotFound(station_id.to_string()))
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn rate(&self, rate_id: &str) -> Option<&RateType> {
        self.rates.get(rate_id)
    }

    pub fn rates(&self) -> impl Iterator<Item = &RateType> {
        self.rates.values()
    }

    /// Display values for one station; `None` while it is idle.
    pub fn snapshot(&self, station_id: &str, now: DateTime<Utc>) -> CoreResult<Option<SessionSnapshot>> {
        let station = self.station(station_id)?;
        Ok(session::snapshot(station, self.rates.get(&station.rate_id), now))
    }

    pub fn start_session(
        &mut self,
        station_id: &str,
        client_id: Option<String>,
        request: SessionRequest,
        loyalty: &mut dyn LoyaltyLedger,
        now: DateTime<Utc>,
    ) -> CoreResult<&Station> {
        let station = self
            .stations
            .get_mut(station_id)
            .ok_or_else(|| CoreError::StationNotFound(station_id.to_string()))?;
        let rate = self.rates.get(&station.rate_id);

        session::start_session(station, client_id, request, rate, loyalty, now)?;
        Ok(&*station)
    }

    pub fn add_account_item(
        &mut self,
        station_id: &str,
        item: AccountItem,
        quantity: i64,
    ) -> CoreResult<&Station> {
        let station = self
            .stations
            .get_mut(station_id)
            .ok_or_else(|| CoreError::StationNotFound(station_id.to_string()))?;

        session::add_account_item(station, item, quantity)?;
        Ok(&*station)
    }

    pub fn tick(&mut self, station_id: &str, now: DateTime<Utc>) -> CoreResult<TickOutcome> {
        let station = self
            .stations
            .get_mut(station_id)
            .ok_or_else(|| CoreError::StationNotFound(station_id.to_string()))?;
        let rate = self.rates.get(&station.rate_id);

        session::tick(station, rate, now)
    }

    /// Ticks every occupied station, forwarding expiry alerts to `notifier`.
    ///
    /// Returns the snapshots in station id order.
    pub fn tick_all(
        &mut self,
        now: DateTime<Utc>,
        notifier: &mut dyn ExpiryNotifier,
    ) -> Vec<SessionSnapshot> {
        let mut snapshots = Vec::new();

        for station in self.stations.values_mut().filter(|s| s.is_occupied()) {
            let rate = self.rates.get(&station.rate_id);
            if let Ok(outcome) = session::tick(station, rate, now) {
                if let Some(alert) = &outcome.alert {
                    notifier.notify(alert);
                }
                snapshots.push(outcome.snapshot);
            }
        }

        snapshots
    }

    pub fn finalize(
        &mut self,
        station_id: &str,
        decision: PaymentDecision,
        effects: Collaborators<'_>,
        now: DateTime<Utc>,
    ) -> CoreResult<Checkout> {
        let station = self
            .stations
            .get_mut(station_id)
            .ok_or_else(|| CoreError::StationNotFound(station_id.to_string()))?;
        let rate = self.rates.get(&station.rate_id);

        finalize::finalize(station, rate, decision, self.commission_rate, effects, now)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
