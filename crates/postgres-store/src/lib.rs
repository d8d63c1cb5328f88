//! PostgreSQL implementation of the module-store persistence ports.
//!
//! Aggregates are stored as JSONB documents with a handful of indexed
//! columns pulled out for querying. The invoice counter is a single-row
//! table bumped in one atomic statement, and order updates go through an
//! optimistic version check so concurrent writers surface as conflicts
//! instead of lost updates.

use async_trait::async_trait;
use common::{CategoryId, OrderId, ProductId, UserId};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use domain::cart::Cart;
use domain::catalog::{Category, Product};
use domain::order::{Order, OrderStatus};
use domain::store::{CartStore, CatalogStore, OrderStore, Result, StoreError};

/// PostgreSQL-backed document store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the given database URL.
    pub async fn connect(url: &str) -> std::result::Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        tracing::info!("running database migrations");
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let doc: serde_json::Value = row.try_get("doc").map_err(StoreError::backend)?;
        Ok(serde_json::from_value(doc)?)
    }

    fn row_to_cart(row: PgRow) -> Result<Cart> {
        let doc: serde_json::Value = row.try_get("doc").map_err(StoreError::backend)?;
        Ok(serde_json::from_value(doc)?)
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let doc: serde_json::Value = row.try_get("doc").map_err(StoreError::backend)?;
        Ok(serde_json::from_value(doc)?)
    }

    fn row_to_category(row: PgRow) -> Result<Category> {
        let doc: serde_json::Value = row.try_get("doc").map_err(StoreError::backend)?;
        Ok(serde_json::from_value(doc)?)
    }

    /// Replaces the license-key rows for an order with its current set.
    ///
    /// The primary key on `order_license_keys` is what enforces global
    /// key uniqueness; a collision aborts the surrounding transaction.
    async fn sync_license_keys(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order: &Order,
    ) -> Result<()> {
        sqlx::query("DELETE FROM order_license_keys WHERE order_id = $1")
            .bind(order.id.as_uuid())
            .execute(&mut **tx)
            .await
            .map_err(StoreError::backend)?;

        for license in &order.licenses {
            sqlx::query("INSERT INTO order_license_keys (key, order_id) VALUES ($1, $2)")
                .bind(&license.key)
                .bind(order.id.as_uuid())
                .execute(&mut **tx)
                .await
                .map_err(|e| {
                    if is_constraint(&e, "order_license_keys_pkey") {
                        StoreError::Duplicate {
                            entity: "license key",
                            id: license.key.clone(),
                        }
                    } else {
                        StoreError::backend(e)
                    }
                })?;
        }
        Ok(())
    }
}

fn is_constraint(err: &sqlx::Error, name: &str) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.constraint() == Some(name))
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn next_invoice_number(&self) -> Result<u64> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO invoice_sequence (id, value) VALUES (1, 1)
            ON CONFLICT (id) DO UPDATE SET value = invoice_sequence.value + 1
            RETURNING value
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(value as u64)
    }

    async fn insert_order(&self, order: Order) -> Result<Order> {
        let doc = serde_json::to_value(&order)?;
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, invoice_number, version, created_at, doc)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(order.invoice_number.value() as i64)
        .bind(order.version as i64)
        .bind(order.created_at)
        .bind(&doc)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_constraint(&e, "orders_pkey") {
                StoreError::Duplicate {
                    entity: "order",
                    id: order.id.to_string(),
                }
            } else if is_constraint(&e, "orders_invoice_number_key") {
                StoreError::Duplicate {
                    entity: "invoice number",
                    id: order.invoice_number.to_string(),
                }
            } else {
                StoreError::backend(e)
            }
        })?;

        Self::sync_license_keys(&mut tx, &order).await?;
        tx.commit().await.map_err(StoreError::backend)?;
        Ok(order)
    }

    async fn update_order(&self, order: Order) -> Result<Order> {
        let mut next = order;
        let expected = next.version;
        next.version += 1;
        let doc = serde_json::to_value(&next)?;

        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        let updated = sqlx::query(
            r#"
            UPDATE orders SET doc = $2, version = $3
            WHERE id = $1 AND version = $4
            "#,
        )
        .bind(next.id.as_uuid())
        .bind(&doc)
        .bind(next.version as i64)
        .bind(expected as i64)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::backend)?;

        if updated.rows_affected() == 0 {
            let actual: Option<i64> =
                sqlx::query_scalar("SELECT version FROM orders WHERE id = $1")
                    .bind(next.id.as_uuid())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(StoreError::backend)?;

            return match actual {
                None => Err(StoreError::NotFound {
                    entity: "order",
                    id: next.id.to_string(),
                }),
                Some(actual) => {
                    tracing::debug!(
                        order_id = %next.id,
                        expected,
                        actual,
                        "order update lost a version race"
                    );
                    Err(StoreError::VersionConflict {
                        entity: "order",
                        id: next.id.to_string(),
                        expected,
                        actual: actual as u64,
                    })
                }
            };
        }

        Self::sync_license_keys(&mut tx, &next).await?;
        tx.commit().await.map_err(StoreError::backend)?;
        Ok(next)
    }

    async fn find_order(&self, id: OrderId, owner: UserId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT doc FROM orders WHERE id = $1 AND user_id = $2")
            .bind(id.as_uuid())
            .bind(owner.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        row.map(Self::row_to_order).transpose()
    }

    async fn list_orders_for_user(&self, owner: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT doc FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn list_all_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT doc FROM orders WHERE doc->>'status' = $1 ORDER BY created_at DESC",
                )
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query("SELECT doc FROM orders ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(StoreError::backend)?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn order_count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(count as usize)
    }
}

#[async_trait]
impl CartStore for PostgresStore {
    async fn load_cart(&self, owner: UserId) -> Result<Option<Cart>> {
        let row = sqlx::query("SELECT doc FROM carts WHERE user_id = $1")
            .bind(owner.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        row.map(Self::row_to_cart).transpose()
    }

    async fn save_cart(&self, cart: Cart) -> Result<()> {
        let doc = serde_json::to_value(&cart)?;

        sqlx::query(
            r#"
            INSERT INTO carts (user_id, doc) VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET doc = EXCLUDED.doc
            "#,
        )
        .bind(cart.user_id.as_uuid())
        .bind(&doc)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn insert_product(&self, product: Product) -> Result<()> {
        let doc = serde_json::to_value(&product)?;

        sqlx::query(
            r#"
            INSERT INTO products (id, is_active, doc) VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET is_active = EXCLUDED.is_active, doc = EXCLUDED.doc
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(product.is_active)
        .bind(&doc)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT doc FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        row.map(Self::row_to_product).transpose()
    }

    async fn list_products(&self, active_only: bool) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT doc FROM products
            WHERE is_active OR NOT $1
            ORDER BY doc->>'name'
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn insert_category(&self, category: Category) -> Result<()> {
        let doc = serde_json::to_value(&category)?;

        sqlx::query(
            r#"
            INSERT INTO categories (id, doc) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc
            "#,
        )
        .bind(category.id.as_uuid())
        .bind(&doc)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }

    async fn category(&self, id: CategoryId) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT doc FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        row.map(Self::row_to_category).transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT doc FROM categories ORDER BY doc->>'name'")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        rows.into_iter().map(Self::row_to_category).collect()
    }
}
