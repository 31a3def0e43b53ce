//! # Sale Repository
//!
//! Sale records are written once, by checkout, and never updated. Items
//! (account lines plus the rental line) are stored as a JSON snapshot so
//! later catalog edits don't rewrite history.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use lanhouse_core::{AccountItem, PaymentMethod, SaleRecord};

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    folio: String,
    date: DateTime<Utc>,
    station_id: String,
    client_label: String,
    payment_method: PaymentMethod,
    items: String,
    subtotal_cents: i64,
    commission_cents: i64,
    total_cents: i64,
    net_received_cents: i64,
}

impl SaleRow {
    fn into_record(self) -> DbResult<SaleRecord> {
        let items: Vec<AccountItem> = serde_json::from_str(&self.items)?;
        Ok(SaleRecord {
            folio: self.folio,
            date: self.date,
            station_id: self.station_id,
            client_label: self.client_label,
            payment_method: self.payment_method,
            items,
            subtotal_cents: self.subtotal_cents,
            commission_cents: self.commission_cents,
            total_cents: self.total_cents,
            net_received_cents: self.net_received_cents,
        })
    }
}

const SELECT_SALES: &str = r#"
    SELECT
        folio, date, station_id, client_label, payment_method, items,
        subtotal_cents, commission_cents, total_cents, net_received_cents
    FROM sales
"#;

/// Repository for sale records.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by folio.
    pub async fn get(&self, folio: &str) -> DbResult<Option<SaleRecord>> {
        let row: Option<SaleRow> = sqlx::query_as(&format!("{SELECT_SALES} WHERE folio = ?1"))
            .bind(folio)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SaleRow::into_record).transpose()
    }
}

/// Appends a sale record.
pub(crate) async fn insert_sale<'e, E>(exec: E, sale: &SaleRecord) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(folio = %sale.folio, station = %sale.station_id, "Inserting sale");

    let items = serde_json::to_string(&sale.items)?;

    sqlx::query(
        r#"
        INSERT INTO sales (
            folio, date, station_id, client_label, payment_method, items,
            subtotal_cents, commission_cents, total_cents, net_received_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&sale.folio)
    .bind(sale.date)
    .bind(&sale.station_id)
    .bind(&sale.client_label)
    .bind(sale.payment_method)
    .bind(items)
    .bind(sale.subtotal_cents)
    .bind(sale.commission_cents)
    .bind(sale.total_cents)
    .bind(sale.net_received_cents)
    .execute(exec)
    .await?;

    Ok(())
}
