//! # Rate Repository
//!
//! Rate types and their tiers. A rate is always written whole: saving
//! replaces every tier, so a table never mixes old and new prices.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use lanhouse_core::{RateTier, RateType};

#[derive(Debug, sqlx::FromRow)]
struct TierRow {
    rate_id: String,
    from_minutes: i64,
    to_minutes: i64,
    price_cents: i64,
}

/// Repository for rate tables.
#[derive(Debug, Clone)]
pub struct RateRepository {
    pool: SqlitePool,
}

impl RateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RateRepository { pool }
    }

    /// Every rate type with its tiers in ascending order.
    pub async fn list(&self) -> DbResult<Vec<RateType>> {
        let types: Vec<(String, String)> =
            sqlx::query_as("SELECT id, name FROM rate_types ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        let tiers: Vec<TierRow> = sqlx::query_as(
            r#"
            SELECT rate_id, from_minutes, to_minutes, price_cents
            FROM rate_tiers
            ORDER BY rate_id, from_minutes
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let rates = types
            .into_iter()
            .map(|(id, name)| {
                let own = tiers
                    .iter()
                    .filter(|t| t.rate_id == id)
                    .map(|t| RateTier::new(t.from_minutes, t.to_minutes, t.price_cents))
                    .collect();
                RateType::new(id, name, own)
            })
            .collect();

        Ok(rates)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<RateType>> {
        Ok(self.list().await?.into_iter().find(|r| r.id == id))
    }

    /// Creates or replaces a rate type and all of its tiers.
    ///
    /// Callers validate the table (`validation::validate_rate_tiers`)
    /// before saving.
    pub async fn save(&self, rate: &RateType) -> DbResult<()> {
        debug!(id = %rate.id, tiers = rate.tiers.len(), "Saving rate");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rate_types (id, name) VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(&rate.id)
        .bind(&rate.name)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM rate_tiers WHERE rate_id = ?1")
            .bind(&rate.id)
            .execute(&mut *tx)
            .await?;

        for tier in &rate.tiers {
            sqlx::query(
                r#"
                INSERT INTO rate_tiers (rate_id, from_minutes, to_minutes, price_cents)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&rate.id)
            .bind(tier.from_minutes)
            .bind(tier.to_minutes)
            .bind(tier.price_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rate_types")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn pc_rate() -> RateType {
        RateType::new(
            "pc",
            "PC",
            vec![
                RateTier::new(31, 60, 1500),
                RateTier::new(1, 15, 500),
                RateTier::new(16, 30, 1000),
            ],
        )
    }

    #[tokio::test]
    async fn test_save_and_list_orders_tiers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.rates().save(&pc_rate()).await.unwrap();

        let rates = db.rates().list().await.unwrap();
        assert_eq!(rates.len(), 1);
        let froms: Vec<i64> = rates[0].tiers.iter().map(|t| t.from_minutes).collect();
        assert_eq!(froms, vec![1, 16, 31]);
    }

    #[tokio::test]
    async fn test_save_replaces_tiers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.rates().save(&pc_rate()).await.unwrap();

        let flat = RateType::new("pc", "PC flat", vec![RateTier::new(1, 60, 1200)]);
        db.rates().save(&flat).await.unwrap();

        let loaded = db.rates().get("pc").await.unwrap().unwrap();
        assert_eq!(loaded.name, "PC flat");
        assert_eq!(loaded.tiers, vec![RateTier::new(1, 60, 1200)]);
        assert_eq!(db.rates().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_check_constraint_rejects_inverted_tier() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let bad = RateType::new("pc", "PC", vec![RateTier::new(30, 10, 500)]);

        assert!(db.rates().save(&bad).await.is_err());
        // Rolled back with the transaction
        assert!(db.rates().get("pc").await.unwrap().is_none());
    }
}
