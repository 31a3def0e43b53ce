//! # Floor Repository
//!
//! Writes that touch more than one table for a single operator action.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_session_start      BEGIN                                        │
//! │                              stations  ← status, times, mode, client    │
//! │                              clients   ← points (Redeem debit)          │
//! │                            COMMIT                                       │
//! │                                                                         │
//! │  record_checkout           BEGIN                                        │
//! │                              sales     ← sale record                    │
//! │                              cash_flow ← income entry                   │
//! │                              products  ← stock −= quantity              │
//! │                              clients   ← points (earned)                │
//! │                              stations  ← back to Available              │
//! │                            COMMIT                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failure anywhere rolls the whole action back; the database never
//! holds a sale without its ledger entry or a freed station without its
//! sale.

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::DbResult;
use crate::repository::cash_flow::append_entry;
use crate::repository::client::set_points;
use crate::repository::product::adjust_stock;
use crate::repository::sale::insert_sale;
use crate::repository::station::write_station;
use lanhouse_core::{Checkout, Client, Station};

#[derive(Debug, Clone)]
pub struct FloorRepository {
    pool: SqlitePool,
}

impl FloorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        FloorRepository { pool }
    }

    /// Persists a freshly started session and any client balances it
    /// changed.
    pub async fn record_session_start(&self, station: &Station, clients: &[Client]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        write_station(&mut *tx, station, false).await?;
        for client in clients {
            set_points(&mut *tx, &client.id, client.points).await?;
        }

        tx.commit().await?;

        info!(
            station = %station.id,
            mode = ?station.session_mode,
            client = ?station.client_id,
            "Session started"
        );
        Ok(())
    }

    /// Persists everything a checkout produced. `station` is the station
    /// after release.
    pub async fn record_checkout(&self, station: &Station, checkout: &Checkout) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        insert_sale(&mut *tx, &checkout.sale).await?;
        append_entry(&mut *tx, &checkout.entry).await?;

        for mv in &checkout.stock_moves {
            if !adjust_stock(&mut *tx, &mv.product_id, -mv.quantity).await? {
                warn!(product = %mv.product_id, quantity = mv.quantity, "Sold product is no longer in the catalog, stock not moved");
            }
        }

        if let Some(credit) = &checkout.points_credit {
            set_points(&mut *tx, &credit.client_id, credit.new_balance).await?;
        }

        write_station(&mut *tx, station, false).await?;

        tx.commit().await?;

        info!(
            folio = %checkout.sale.folio,
            station = %station.id,
            total_cents = checkout.sale.total_cents,
            net_cents = checkout.sale.net_received_cents,
            "Checkout recorded"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
