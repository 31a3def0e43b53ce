//! # Product Repository
//!
//! Database operations for the catalog of products and services that can
//! be charged to a station's account.
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ Absolute update                                                 │
//! │     UPDATE products SET stock = 7 WHERE id = ?                     │
//! │                                                                     │
//! │  ✅ Delta update                                                    │
//! │     UPDATE products SET stock = stock - 3                          │
//! │                                                                     │
//! │  A checkout only knows how much it sold, not what other writers    │
//! │  did since the catalog was loaded. Stock may go negative.          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use lanhouse_core::Product;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    category: Option<String>,
    barcode: Option<String>,
    sale_price_cents: i64,
    purchase_price_cents: i64,
    manages_inventory: bool,
    stock: i64,
    is_service: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            category: row.category,
            barcode: row.barcode,
            sale_price_cents: row.sale_price_cents,
            purchase_price_cents: row.purchase_price_cents,
            manages_inventory: row.manages_inventory,
            stock: row.stock,
            is_service: row.is_service,
        }
    }
}

const SELECT_PRODUCTS: &str = r#"
    SELECT
        id, name, category, barcode,
        sale_price_cents, purchase_price_cents,
        manages_inventory, stock, is_service
    FROM products
"#;

/// Repository for product database operations.
///
/// The console loads the whole catalog once per command and looks items
/// up by id or barcode in memory.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Full catalog, by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!("{SELECT_PRODUCTS} ORDER BY name"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!("{SELECT_PRODUCTS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - ID or barcode already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category, barcode,
                sale_price_cents, purchase_price_cents,
                manages_inventory, stock, is_service
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.barcode)
        .bind(product.sale_price_cents)
        .bind(product.purchase_price_cents)
        .bind(product.manages_inventory)
        .bind(product.stock)
        .bind(product.is_service)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts catalog entries (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Applies a stock delta. Products that do not manage inventory are left
/// alone but still count as found.
///
/// Returns `false` when no product has this id; the catalog is edited
/// outside the console, so a sold item may be gone by checkout.
pub(crate) async fn adjust_stock<'e, E>(exec: E, id: &str, delta: i64) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, delta = %delta, "Updating stock");

    let result = sqlx::query(
        r#"
        UPDATE products
        SET
            stock = CASE
                WHEN manages_inventory = 1 AND is_service = 0 THEN stock + ?2
                ELSE stock
            END,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(delta)
    .execute(exec)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
