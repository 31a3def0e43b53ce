//! # Cash Flow Repository
//!
//! Append-only storage for the drawer ledger. Entries are never updated or
//! deleted; `seq` keeps insertion order for entries with the same
//! timestamp.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use lanhouse_core::{CashFlowEntry, CashFlowKind, EntryMethod, Reconciliation};

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: String,
    date: DateTime<Utc>,
    kind: CashFlowKind,
    amount_cents: i64,
    description: String,
    method: EntryMethod,
    client: Option<String>,
    counted_cents: Option<i64>,
    expected_cents: Option<i64>,
    difference_cents: Option<i64>,
}

impl EntryRow {
    fn into_entry(self) -> DbResult<CashFlowEntry> {
        let reconciliation = match (self.counted_cents, self.expected_cents, self.difference_cents) {
            (Some(counted_cents), Some(expected_cents), Some(difference_cents)) => {
                Some(Reconciliation {
                    counted_cents,
                    expected_cents,
                    difference_cents,
                })
            }
            (None, None, None) => None,
            _ => {
                return Err(DbError::corrupt(
                    "cash_flow",
                    &self.id,
                    "partial reconciliation figures",
                ))
            }
        };

        Ok(CashFlowEntry {
            id: self.id,
            date: self.date,
            kind: self.kind,
            amount_cents: self.amount_cents,
            description: self.description,
            method: self.method,
            client: self.client,
            reconciliation,
        })
    }
}

/// Repository for the drawer ledger.
#[derive(Debug, Clone)]
pub struct CashFlowRepository {
    pool: SqlitePool,
}

impl CashFlowRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CashFlowRepository { pool }
    }

    /// The whole ledger in insertion order.
    pub async fn list(&self) -> DbResult<Vec<CashFlowEntry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            r#"
            SELECT
                id, date, kind, amount_cents, description, method, client,
                counted_cents, expected_cents, difference_cents
            FROM cash_flow
            ORDER BY seq
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EntryRow::into_entry).collect()
    }

    pub async fn append(&self, entry: &CashFlowEntry) -> DbResult<()> {
        append_entry(&self.pool, entry).await
    }
}

/// Appends one entry after every existing one.
pub(crate) async fn append_entry<'e, E>(exec: E, entry: &CashFlowEntry) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %entry.id, kind = ?entry.kind, amount = entry.amount_cents, "Appending cash flow entry");

    let rec = entry.reconciliation;

    sqlx::query(
        r#"
        INSERT INTO cash_flow (
            id, seq, date, kind, amount_cents, description, method, client,
            counted_cents, expected_cents, difference_cents
        ) VALUES (
            ?1, (SELECT COALESCE(MAX(seq), 0) + 1 FROM cash_flow),
            ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10
        )
        "#,
    )
    .bind(&entry.id)
    .bind(entry.date)
    .bind(entry.kind)
    .bind(entry.amount_cents)
    .bind(&entry.description)
    .bind(entry.method)
    .bind(&entry.client)
    .bind(rec.map(|r| r.counted_cents))
    .bind(rec.map(|r| r.expected_cents))
    .bind(rec.map(|r| r.difference_cents))
    .execute(exec)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
