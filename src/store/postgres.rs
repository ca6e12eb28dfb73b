use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{encode_items, record_from_row, OrderRow, OrderStore};
use crate::domain::order::{Order, OrderError, OrderRecord};

// ============================================================================
// PostgreSQL Order Store
// ============================================================================
//
// Table:
//   orders (order_id TEXT PRIMARY KEY, value, creation_date, items, created_at, updated_at)
//
// The primary key is the unique index. A concurrent insert that loses the
// race surfaces as a unique violation (SQLSTATE 23505) → Duplicate.
//
// ============================================================================

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS orders (
    order_id      TEXT PRIMARY KEY,
    value         DOUBLE PRECISION NOT NULL CHECK (value >= 0),
    creation_date TIMESTAMPTZ NOT NULL,
    items         TEXT NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL,
    updated_at    TIMESTAMPTZ NOT NULL
)";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS orders_creation_date_idx ON orders (creation_date DESC)";

const SELECT_COLUMNS: &str =
    "SELECT order_id, value, creation_date, items, created_at, updated_at FROM orders";

pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        tracing::info!(max_connections, "Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .context("Failed to create orders table")?;
        sqlx::query(CREATE_INDEX)
            .execute(&self.pool)
            .await
            .context("Failed to create orders index")?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn fetch(&self, order_id: &str) -> Result<Option<OrderRecord>, OrderError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE order_id = $1"))
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to load order {order_id}"))?;

        Ok(row.map(record_from_row).transpose()?)
    }

    async fn insert(&self, order: Order) -> Result<OrderRecord, OrderError> {
        let record = OrderRecord::new(order, Utc::now());
        let items = encode_items(&record.order.items)?;

        let result = sqlx::query(
            "INSERT INTO orders (order_id, value, creation_date, items, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&record.order.order_id)
        .bind(record.order.value)
        .bind(record.order.creation_date)
        .bind(items)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(record),
            Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
                tracing::warn!(
                    order_id = %record.order.order_id,
                    "Primary key rejected concurrent duplicate insert"
                );
                Err(OrderError::Duplicate(record.order.order_id))
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to insert order {}", record.order.order_id))
                .into()),
        }
    }

    async fn list_all(&self) -> Result<Vec<OrderRecord>, OrderError> {
        let rows: Vec<OrderRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY creation_date DESC, order_id ASC"))
                .fetch_all(&self.pool)
                .await
                .context("Failed to list orders")?;

        let records = rows
            .into_iter()
            .map(record_from_row)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(records)
    }

    async fn health(&self) -> Result<(), OrderError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("PostgreSQL health check failed")?;
        Ok(())
    }
}
