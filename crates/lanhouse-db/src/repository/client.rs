//! # Client Repository
//!
//! Registered clients and their loyalty balances. Points are only changed
//! through [`set_points`], which the floor transactions call with balances
//! already checked by the core ledger; the `points >= 0` CHECK is the last
//! line.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lanhouse_core::Client;

#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: String,
    name: String,
    points: i64,
    phone: Option<String>,
    email: Option<String>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            name: row.name,
            points: row.points,
            phone: row.phone,
            email: row.email,
        }
    }
}

/// Repository for client rows.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// All clients, by name.
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let rows: Vec<ClientRow> = sqlx::query_as(
            "SELECT id, name, points, phone, email FROM clients ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Client::from).collect())
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Client>> {
        let row: Option<ClientRow> =
            sqlx::query_as("SELECT id, name, points, phone, email FROM clients WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Client::from))
    }

    /// Case-insensitive substring match on name or phone.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Client>> {
        let pattern = format!("%{}%", query.trim());

        let rows: Vec<ClientRow> = sqlx::query_as(
            r#"
            SELECT id, name, points, phone, email
            FROM clients
            WHERE name LIKE ?1 OR phone LIKE ?1
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Client::from).collect())
    }

    pub async fn insert(&self, client: &Client) -> DbResult<()> {
        debug!(id = %client.id, "Inserting client");

        sqlx::query(
            r#"
            INSERT INTO clients (id, name, points, phone, email)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(client.points)
        .bind(&client.phone)
        .bind(&client.email)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Writes an absolute balance.
pub(crate) async fn set_points<'e, E>(exec: E, client_id: &str, points: i64) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE clients SET points = ?2, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?1",
    )
    .bind(client_id)
    .bind(points)
    .execute(exec)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Client", client_id));
    }
    Ok(())
}

/// Helper to generate a new client ID.
pub fn generate_client_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_get_search() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut ana = Client::new("c1", "Ana Torres", 25);
        ana.phone = Some("555-0101".to_string());
        db.clients().insert(&ana).await.unwrap();
        db.clients()
            .insert(&Client::new("c2", "Bruno", 0))
            .await
            .unwrap();

        assert_eq!(db.clients().get("c1").await.unwrap(), Some(ana));
        assert_eq!(db.clients().search("torr", 10).await.unwrap().len(), 1);
        assert_eq!(db.clients().search("0101", 10).await.unwrap()[0].id, "c1");
        assert_eq!(db.clients().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_negative_points_rejected_by_schema() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.clients()
            .insert(&Client::new("c1", "Ana", 5))
            .await
            .unwrap();

        assert!(set_points(db.pool(), "c1", -1).await.is_err());
        assert_eq!(db.clients().get("c1").await.unwrap().unwrap().points, 5);
    }

    #[tokio::test]
    async fn test_set_points_unknown_client() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = set_points(db.pool(), "ghost", 3).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
