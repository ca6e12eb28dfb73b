use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::value::{CqlValue, Row};

use super::{encode_items, record_from_row, sort_newest_first, OrderRow, OrderStore};
use crate::domain::order::{Order, OrderError, OrderRecord};

// ============================================================================
// ScyllaDB Order Store
// ============================================================================
//
// Orders are partitioned by order_id. Inserts use a lightweight transaction
// (INSERT ... IF NOT EXISTS): the `[applied]` column is false when another
// writer already owns the key, which maps to Duplicate.
//
// Scylla cannot sort across partitions, so list_all sorts client-side.
//
// ============================================================================

const SELECT_COLUMNS: &str =
    "SELECT order_id, value, creation_date, items, created_at, updated_at FROM orders";

pub struct ScyllaOrderStore {
    session: Arc<Session>,
}

impl ScyllaOrderStore {
    pub async fn connect(nodes: &[String], keyspace: &str) -> anyhow::Result<Self> {
        tracing::info!(nodes = ?nodes, keyspace = %keyspace, "Connecting to ScyllaDB...");

        let session: Session = SessionBuilder::new()
            .known_nodes(nodes)
            .build()
            .await
            .context("Failed to connect to ScyllaDB")?;

        session
            .query_unpaged(
                format!(
                    "CREATE KEYSPACE IF NOT EXISTS {keyspace} WITH REPLICATION = \
                     {{'class': 'SimpleStrategy', 'replication_factor': 1}}"
                ),
                &[],
            )
            .await?;

        session.use_keyspace(keyspace, false).await?;

        Ok(Self {
            session: Arc::new(session),
        })
    }

    pub async fn init_schema(&self) -> anyhow::Result<()> {
        self.session
            .query_unpaged(
                "CREATE TABLE IF NOT EXISTS orders (
                    order_id text PRIMARY KEY,
                    value double,
                    creation_date timestamp,
                    items text,
                    created_at timestamp,
                    updated_at timestamp
                )",
                &[],
            )
            .await
            .context("Failed to create orders table")?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for ScyllaOrderStore {
    fn backend(&self) -> &'static str {
        "scylla"
    }

    async fn fetch(&self, order_id: &str) -> Result<Option<OrderRecord>, OrderError> {
        let result = self
            .session
            .query_unpaged(format!("{SELECT_COLUMNS} WHERE order_id = ?"), (order_id,))
            .await
            .with_context(|| format!("Failed to load order {order_id}"))?;

        let rows_result = result
            .into_rows_result()
            .with_context(|| format!("Lookup of order {order_id} returned no rows result"))?;

        let row = rows_result
            .maybe_first_row::<OrderRow>()
            .with_context(|| format!("Unexpected row shape for order {order_id}"))?;

        Ok(row.map(record_from_row).transpose()?)
    }

    async fn insert(&self, order: Order) -> Result<OrderRecord, OrderError> {
        let record = OrderRecord::new(order, Utc::now());
        let items = encode_items(&record.order.items)?;

        tracing::debug!(
            order_id = %record.order.order_id,
            item_count = record.order.items.len(),
            "Inserting order with lightweight transaction"
        );

        let result = self
            .session
            .query_unpaged(
                "INSERT INTO orders (order_id, value, creation_date, items, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?) IF NOT EXISTS",
                (
                    &record.order.order_id,
                    record.order.value,
                    record.order.creation_date,
                    items,
                    record.created_at,
                    record.updated_at,
                ),
            )
            .await
            .with_context(|| format!("Failed to insert order {}", record.order.order_id))?;

        let applied = result
            .into_rows_result()
            .context("Lightweight transaction returned no result")?
            .maybe_first_row::<Row>()
            .context("Unexpected lightweight transaction result")?
            .map(|row| lwt_applied(&row))
            .unwrap_or(false);

        if !applied {
            tracing::warn!(
                order_id = %record.order.order_id,
                "Lightweight transaction rejected duplicate insert"
            );
            return Err(OrderError::Duplicate(record.order.order_id));
        }

        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<OrderRecord>, OrderError> {
        let rows: Vec<OrderRow> = self
            .session
            .query_iter(SELECT_COLUMNS, &[])
            .await
            .context("Failed to list orders")?
            .rows_stream::<OrderRow>()
            .context("Unexpected row shape in orders table")?
            .try_collect()
            .await
            .context("Failed to page through orders")?;

        let mut records = rows
            .into_iter()
            .map(record_from_row)
            .collect::<anyhow::Result<Vec<_>>>()?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn health(&self) -> Result<(), OrderError> {
        self.session
            .query_unpaged("SELECT now() FROM system.local", &[])
            .await
            .context("ScyllaDB health check failed")?;
        Ok(())
    }
}

/// The first column of a lightweight transaction result is `[applied]`
fn lwt_applied(row: &Row) -> bool {
    matches!(row.columns.first(), Some(Some(CqlValue::Boolean(true))))
}
