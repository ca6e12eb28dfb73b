// ============================================================================
// Order Store - uniquely keyed persistence for orders
// ============================================================================
//
// Backends:
// - memory/   - single-owner map behind an async RwLock
// - postgres/ - sqlx pool, PRIMARY KEY on order_id
// - scylla/   - lightweight transaction (INSERT ... IF NOT EXISTS)
//
// `create_if_absent` is a check-then-act sequence. The pre-check can race
// with a concurrent create for the same id, so every backend's `insert`
// must also reject a duplicate key and report it as `OrderError::Duplicate`.
//
// ============================================================================

mod memory;
mod postgres;
mod scylla;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::{StoreBackend, StoreSettings};
use crate::domain::order::{validate, Order, OrderDraft, OrderError, OrderItem, OrderRecord};
use crate::utils::{retry_with_backoff, RetryConfig};

pub use memory::MemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use scylla::ScyllaOrderStore;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Backend name for logs and the health endpoint
    fn backend(&self) -> &'static str;

    /// Exact-match lookup on the unique key
    async fn fetch(&self, order_id: &str) -> Result<Option<OrderRecord>, OrderError>;

    /// Persist a validated order. A key collision is `OrderError::Duplicate`.
    async fn insert(&self, order: Order) -> Result<OrderRecord, OrderError>;

    /// All orders, newest `creation_date` first
    async fn list_all(&self) -> Result<Vec<OrderRecord>, OrderError>;

    /// Cheap reachability probe
    async fn health(&self) -> Result<(), OrderError>;

    async fn find_by_id(&self, order_id: &str) -> Result<OrderRecord, OrderError> {
        self.fetch(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))
    }

    async fn create_if_absent(&self, draft: OrderDraft) -> Result<OrderRecord, OrderError> {
        if self.fetch(&draft.order_id).await?.is_some() {
            return Err(OrderError::Duplicate(draft.order_id));
        }

        let order = validate(&draft)?;
        self.insert(order).await
    }
}

/// Connect the configured backend, retrying transient connection failures.
pub async fn connect(
    settings: &StoreSettings,
    retry: &RetryConfig,
) -> anyhow::Result<Arc<dyn OrderStore>> {
    let store: Arc<dyn OrderStore> = match settings.backend {
        StoreBackend::Memory => Arc::new(MemoryOrderStore::new()),
        StoreBackend::Postgres => {
            let url = settings
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            let store = retry_with_backoff("postgres_connect", retry, |_| {
                PostgresOrderStore::connect(url, settings.max_connections)
            })
            .await?;
            store.init_schema().await?;
            Arc::new(store)
        }
        StoreBackend::Scylla => {
            let store = retry_with_backoff("scylla_connect", retry, |_| {
                ScyllaOrderStore::connect(&settings.scylla_nodes, &settings.scylla_keyspace)
            })
            .await?;
            store.init_schema().await?;
            Arc::new(store)
        }
    };

    tracing::info!(backend = store.backend(), "Order store ready");
    Ok(store)
}

// ============================================================================
// Row helpers shared by the database backends
// ============================================================================

/// (order_id, value, creation_date, items_json, created_at, updated_at)
pub(crate) type OrderRow = (String, f64, DateTime<Utc>, String, DateTime<Utc>, DateTime<Utc>);

pub(crate) fn encode_items(items: &[OrderItem]) -> anyhow::Result<String> {
    serde_json::to_string(items).context("Failed to encode order items")
}

pub(crate) fn record_from_row(row: OrderRow) -> anyhow::Result<OrderRecord> {
    let (order_id, value, creation_date, items_json, created_at, updated_at) = row;
    let items: Vec<OrderItem> = serde_json::from_str(&items_json)
        .with_context(|| format!("Corrupt items column for order {order_id}"))?;

    Ok(OrderRecord {
        order: Order {
            order_id,
            value,
            creation_date,
            items,
        },
        created_at,
        updated_at,
    })
}

/// Newest first; ties ordered by id so listings are stable
pub(crate) fn sort_newest_first(records: &mut [OrderRecord]) {
    records.sort_by(|a, b| {
        b.order
            .creation_date
            .cmp(&a.order.creation_date)
            .then_with(|| a.order.order_id.cmp(&b.order.order_id))
    });
}

// ============================================================================
// Unit Tests
// ============================================================================
