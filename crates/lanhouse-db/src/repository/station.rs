//! # Station Repository
//!
//! Stations are stored with their full session state so a restarted
//! console picks up running sessions where they were. Account items live
//! in a JSON text column.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use lanhouse_core::{AccountItem, SessionMode, Station, StationKind, StationStatus};

#[derive(Debug, sqlx::FromRow)]
struct StationRow {
    id: String,
    name: String,
    kind: StationKind,
    status: StationStatus,
    rate_id: String,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    session_mode: Option<SessionMode>,
    fixed_cost_cents: Option<i64>,
    client_id: Option<String>,
    account_items: String,
    expiry_signaled: bool,
}

impl StationRow {
    fn into_station(self) -> DbResult<Station> {
        let account_items: Vec<AccountItem> = serde_json::from_str(&self.account_items)?;

        if self.status == StationStatus::Occupied
            && (self.start_time.is_none() || self.session_mode.is_none())
        {
            return Err(DbError::corrupt(
                "station",
                &self.id,
                "occupied without start time or mode",
            ));
        }

        Ok(Station {
            id: self.id,
            name: self.name,
            kind: self.kind,
            status: self.status,
            rate_id: self.rate_id,
            start_time: self.start_time,
            end_time: self.end_time,
            session_mode: self.session_mode,
            fixed_cost_cents: self.fixed_cost_cents,
            client_id: self.client_id,
            account_items,
            expiry_signaled: self.expiry_signaled,
        })
    }
}

const SELECT_STATIONS: &str = r#"
    SELECT
        id, name, kind, status, rate_id,
        start_time, end_time, session_mode, fixed_cost_cents,
        client_id, account_items, expiry_signaled
    FROM stations
"#;

/// Repository for station rows.
#[derive(Debug, Clone)]
pub struct StationRepository {
    pool: SqlitePool,
}

impl StationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StationRepository { pool }
    }

    /// All stations, ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Station>> {
        let rows: Vec<StationRow> = sqlx::query_as(&format!("{SELECT_STATIONS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(StationRow::into_station).collect()
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Station>> {
        let row: Option<StationRow> = sqlx::query_as(&format!("{SELECT_STATIONS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(StationRow::into_station).transpose()
    }

    /// Registers a new station.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - ID already taken
    pub async fn insert(&self, station: &Station) -> DbResult<()> {
        debug!(id = %station.id, "Inserting station");
        write_station(&self.pool, station, true).await
    }

    /// Writes the station's current status and session fields.
    pub async fn save(&self, station: &Station) -> DbResult<()> {
        write_station(&self.pool, station, false).await
    }

    /// Latches the expiry flag on the session that started at
    /// `start_time`, touching nothing else.
    ///
    /// Returns `false` when that session is no longer on the station
    /// (checked out or replaced by another console since it was read).
    pub async fn mark_expiry_signaled(&self, id: &str, start_time: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE stations SET expiry_signaled = 1, updated_at = ?4
            WHERE id = ?1 AND status = ?2 AND start_time = ?3
            "#,
        )
        .bind(id)
        .bind(StationStatus::Occupied)
        .bind(start_time)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(id = %id, latched = result.rows_affected() > 0, "Expiry latch");
        Ok(result.rows_affected() > 0)
    }
}

/// Shared by [`StationRepository`] and the floor transactions.
pub(crate) async fn write_station<'e, E>(exec: E, station: &Station, insert: bool) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    let account_items = serde_json::to_string(&station.account_items)?;

    let sql = if insert {
        r#"
        INSERT INTO stations (
            id, name, kind, status, rate_id,
            start_time, end_time, session_mode, fixed_cost_cents,
            client_id, account_items, expiry_signaled, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#
    } else {
        r#"
        UPDATE stations SET
            name = ?2,
            kind = ?3,
            status = ?4,
            rate_id = ?5,
            start_time = ?6,
            end_time = ?7,
            session_mode = ?8,
            fixed_cost_cents = ?9,
            client_id = ?10,
            account_items = ?11,
            expiry_signaled = ?12,
            updated_at = ?13
        WHERE id = ?1
        "#
    };

    let result = sqlx::query(sql)
        .bind(&station.id)
        .bind(&station.name)
        .bind(station.kind)
        .bind(station.status)
        .bind(&station.rate_id)
        .bind(station.start_time)
        .bind(station.end_time)
        .bind(station.session_mode)
        .bind(station.fixed_cost_cents)
        .bind(&station.client_id)
        .bind(account_items)
        .bind(station.expiry_signaled)
        .bind(Utc::now())
        .execute(exec)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Station", &station.id));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::{TimeDelta, TimeZone};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = db().await;
        db.stations()
            .insert(&Station::new("PC-02", "PC 02", StationKind::Pc, "pc"))
            .await
            .unwrap();
        db.stations()
            .insert(&Station::new("PC-01", "PC 01", StationKind::Pc, "pc"))
            .await
            .unwrap();

        let all = db.stations().list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "PC-01");
        assert_eq!(all[0].status, StationStatus::Available);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let db = db().await;
        let station = Station::new("PC-01", "PC 01", StationKind::Pc, "pc");
        db.stations().insert(&station).await.unwrap();

        let err = db.stations().insert(&station).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_session_state_round_trips() {
        let db = db().await;
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap();
        let mut station = Station::new("XB-01", "Xbox 1", StationKind::Console, "console");
        db.stations().insert(&station).await.unwrap();

        station.status = StationStatus::Occupied;
        station.start_time = Some(start);
        station.end_time = Some(start + TimeDelta::minutes(30));
        station.session_mode = Some(SessionMode::Fixed);
        station.fixed_cost_cents = Some(1000);
        station.client_id = Some("c1".to_string());
        station.account_items.push(AccountItem {
            id: "soda".to_string(),
            name: "Soda".to_string(),
            unit_price_cents: 1800,
            quantity: 2,
            unit_cost_cents: 1200,
            is_service: false,
        });
        db.stations().save(&station).await.unwrap();

        let loaded = db.stations().get("XB-01").await.unwrap().unwrap();
        assert_eq!(loaded, station);
    }

    #[tokio::test]
    async fn test_expiry_latch_only_hits_the_same_session() {
        let db = db().await;
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap();
        let mut station = Station::new("PC-01", "PC 01", StationKind::Pc, "pc");
        db.stations().insert(&station).await.unwrap();

        // Idle station: nothing to latch
        assert!(!db.stations().mark_expiry_signaled("PC-01", start).await.unwrap());

        station.status = StationStatus::Occupied;
        station.start_time = Some(start);
        station.end_time = Some(start + TimeDelta::minutes(30));
        station.session_mode = Some(SessionMode::Fixed);
        station.fixed_cost_cents = Some(1000);
        db.stations().save(&station).await.unwrap();

        let other_start = start + TimeDelta::minutes(1);
        assert!(!db.stations().mark_expiry_signaled("PC-01", other_start).await.unwrap());
        assert!(!db.stations().get("PC-01").await.unwrap().unwrap().expiry_signaled);

        assert!(db.stations().mark_expiry_signaled("PC-01", start).await.unwrap());
        let loaded = db.stations().get("PC-01").await.unwrap().unwrap();
        assert!(loaded.expiry_signaled);
        assert_eq!(loaded.fixed_cost_cents, Some(1000));
    }

    #[tokio::test]
    async fn test_save_unknown_station() {
        let db = db().await;
        let err = db
            .stations()
            .save(&Station::new("ghost", "Ghost", StationKind::Pc, "pc"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
