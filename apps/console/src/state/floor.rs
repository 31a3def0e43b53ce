//! # Floor State
//!
//! The whole venue loaded into the core's in-memory types, plus the
//! database it came from.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FloorState::load                                                       │
//! │    rates + stations ──► Venue                                           │
//! │    clients          ──► ClientBook     (LoyaltyLedger)                  │
//! │    products         ──► StockBook      (Inventory)                      │
//! │    cash_flow        ──► CashDrawer     (CashLedger)                     │
//! │                                                                         │
//! │  operation ──► core mutates in memory ──► db persists the result       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating method runs the core rule first and only then writes,
//! so a rejected action never reaches the database. Methods take
//! `&mut self` and run one at a time; a long-running `watch` shares the
//! file with short-lived command processes and re-reads stations on
//! every tick.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::CliResult;
use crate::state::ConfigState;
use lanhouse_core::{
    AccountItem, CashDrawer, CashFlowEntry, CashFlowKind, Checkout, ClientBook, Collaborators,
    ExpiryNotifier, Money, PaymentDecision, SessionRequest, SessionSnapshot, Station, StockBook,
    Venue,
};
use lanhouse_db::Database;

pub struct FloorState {
    db: Database,
    venue: Venue,
    clients: ClientBook,
    stock: StockBook,
    drawer: CashDrawer,
}

impl FloorState {
    /// Reads every table the floor needs.
    pub async fn load(db: Database, config: &ConfigState) -> CliResult<Self> {
        let rates = db.rates().list().await?;
        let mut venue = Venue::new(rates).with_commission_rate(config.commission_rate());

        for station in db.stations().list().await? {
            if venue.rate(&station.rate_id).is_none() {
                warn!(station = %station.id, rate = %station.rate_id, "Station rate is missing, time bills at zero");
            }
            venue.add_station(station)?;
        }

        let clients = ClientBook::from_clients(db.clients().list().await?);
        let stock = StockBook::from_products(db.products().list().await?);
        let drawer = CashDrawer::from_entries(db.cash_flow().list().await?, config.utc_offset());

        debug!(
            stations = venue.stations().count(),
            entries = drawer.entries().len(),
            "Floor loaded"
        );

        Ok(FloorState {
            db,
            venue,
            clients,
            stock,
            drawer,
        })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn venue(&self) -> &Venue {
        &self.venue
    }

    pub fn clients(&self) -> &ClientBook {
        &self.clients
    }

    pub fn stock(&self) -> &StockBook {
        &self.stock
    }

    pub fn drawer(&self) -> &CashDrawer {
        &self.drawer
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    pub async fn start_session(
        &mut self,
        station_id: &str,
        client_id: Option<String>,
        request: SessionRequest,
        now: DateTime<Utc>,
    ) -> CliResult<Station> {
        let station = self
            .venue
            .start_session(station_id, client_id, request, &mut self.clients, now)?
            .clone();

        let debited = self.clients.take_touched();
        self.db.floor().record_session_start(&station, &debited).await?;

        Ok(station)
    }

    pub async fn add_account_item(
        &mut self,
        station_id: &str,
        item: AccountItem,
        quantity: i64,
    ) -> CliResult<Station> {
        let station = self
            .venue
            .add_account_item(station_id, item, quantity)?
            .clone();

        self.db.stations().save(&station).await?;
        debug!(station = %station.id, lines = station.account_items.len(), "Account item added");

        Ok(station)
    }

    /// Ticks every occupied station and persists newly latched expiries so
    /// a restarted watch does not ring again.
    ///
    /// Starts and checkouts come from other console processes while a
    /// watch runs, so stations are re-read before every tick and the
    /// latch is the only thing written back.
    pub async fn tick_all(
        &mut self,
        now: DateTime<Utc>,
        notifier: &mut dyn ExpiryNotifier,
    ) -> CliResult<Vec<SessionSnapshot>> {
        self.venue.replace_stations(self.db.stations().list().await?);

        let pending: Vec<String> = self
            .venue
            .stations()
            .filter(|s| s.is_occupied() && !s.expiry_signaled)
            .map(|s| s.id.clone())
            .collect();

        let snapshots = self.venue.tick_all(now, notifier);

        for id in pending {
            let station = self.venue.station(&id)?;
            if let (true, Some(start)) = (station.expiry_signaled, station.start_time) {
                if !self.db.stations().mark_expiry_signaled(&id, start).await? {
                    debug!(station = %id, "Session ended before its expiry was saved");
                }
            }
        }

        Ok(snapshots)
    }

    pub async fn checkout(
        &mut self,
        station_id: &str,
        decision: PaymentDecision,
        now: DateTime<Utc>,
    ) -> CliResult<Checkout> {
        let checkout = self.venue.finalize(
            station_id,
            decision,
            Collaborators {
                loyalty: &mut self.clients,
                inventory: &mut self.stock,
                ledger: &mut self.drawer,
            },
            now,
        )?;

        // The checkout itself carries the stock moves and points credit
        self.clients.take_touched();
        self.stock.take_touched();

        let station = self.venue.station(station_id)?;
        self.db.floor().record_checkout(station, &checkout).await?;

        Ok(checkout)
    }

    // =========================================================================
    // Cash Drawer
    // =========================================================================

    pub async fn open_drawer(&mut self, amount: Money, now: DateTime<Utc>) -> CliResult<CashFlowEntry> {
        let entry = self.drawer.open(amount, now)?.clone();
        self.db.cash_flow().append(&entry).await?;

        info!(amount = %amount, "Drawer opened");
        Ok(entry)
    }

    pub async fn record_movement(
        &mut self,
        kind: CashFlowKind,
        amount: Money,
        description: &str,
        now: DateTime<Utc>,
    ) -> CliResult<CashFlowEntry> {
        let entry = self
            .drawer
            .record_movement(kind, amount, description, now)?
            .clone();
        self.db.cash_flow().append(&entry).await?;

        info!(kind = ?kind, amount = %amount, "Drawer movement recorded");
        Ok(entry)
    }

    /// The balance a close would expect right now, without closing.
    pub fn expected_close(&mut self, now: DateTime<Utc>) -> CliResult<Money> {
        let expected = self.drawer.begin_close(now)?;
        self.drawer.cancel_close();
        Ok(expected)
    }

    /// Computes the expected balance and closes against `counted`.
    pub async fn close_drawer(&mut self, counted: Money, now: DateTime<Utc>) -> CliResult<CashFlowEntry> {
        let expected = self.drawer.begin_close(now)?;
        let entry = self.drawer.close(counted, now)?.clone();
        self.db.cash_flow().append(&entry).await?;

        let difference = counted - expected;
        if difference.is_zero() {
            info!(counted = %counted, "Drawer closed, balanced");
        } else {
            warn!(counted = %counted, expected = %expected, difference = %difference, "Drawer closed with a difference");
        }
        Ok(entry)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
