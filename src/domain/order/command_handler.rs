use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use uuid::Uuid;

use crate::metrics::Metrics;
use crate::store::OrderStore;

use super::commands::CreateOrderCommand;
use super::errors::OrderError;
use super::transformer::transform;
use super::value_objects::OrderRecord;

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Payload → Command → Transformer → Order Store
//
// ============================================================================

pub struct OrderCommandHandler {
    store: Arc<dyn OrderStore>,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(store: Arc<dyn OrderStore>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Ingest an upstream payload. Missing fields are rejected before the
    /// store is touched.
    pub async fn create_order(&self, payload: &Value) -> Result<OrderRecord, OrderError> {
        let correlation_id = Uuid::new_v4();
        self.metrics.orders_received.inc();

        let command = CreateOrderCommand::from_payload(payload)
            .inspect_err(|e| self.record_rejection(correlation_id, None, e))?;
        let draft = transform(&command);
        let order_id = draft.order_id.clone();

        tracing::debug!(
            correlation_id = %correlation_id,
            order_id = %order_id,
            item_count = draft.items.len(),
            "Transformed upstream order"
        );

        let started = Instant::now();
        let result = self.store.create_if_absent(draft).await;
        self.metrics
            .observe_store("create", started.elapsed().as_secs_f64());

        match &result {
            Ok(record) => {
                self.metrics.orders_created.inc();
                tracing::info!(
                    correlation_id = %correlation_id,
                    order_id = %record.order_id(),
                    value = record.order.value,
                    item_count = record.order.items.len(),
                    backend = self.store.backend(),
                    "✅ Order created"
                );
            }
            Err(e) => self.record_rejection(correlation_id, Some(&order_id), e),
        }

        result
    }

    pub async fn get_order(&self, order_id: &str) -> Result<OrderRecord, OrderError> {
        let started = Instant::now();
        let result = self.store.find_by_id(order_id).await;
        self.metrics
            .observe_store("find_by_id", started.elapsed().as_secs_f64());

        match &result {
            Ok(_) => self.metrics.record_lookup("found"),
            Err(OrderError::NotFound(_)) => {
                self.metrics.record_lookup("not_found");
                tracing::debug!(order_id = %order_id, "Order not found");
            }
            Err(e) => {
                self.metrics.record_lookup("error");
                tracing::error!(order_id = %order_id, error = ?e, "Order lookup failed");
            }
        }

        result
    }

    pub async fn list_orders(&self) -> Result<Vec<OrderRecord>, OrderError> {
        let started = Instant::now();
        let result = self.store.list_all().await;
        self.metrics
            .observe_store("list_all", started.elapsed().as_secs_f64());

        match &result {
            Ok(orders) => tracing::debug!(count = orders.len(), "Listed orders"),
            Err(e) => tracing::error!(error = ?e, "Listing orders failed"),
        }

        result
    }

    pub async fn check_store(&self) -> Result<(), OrderError> {
        self.store.health().await
    }

    fn record_rejection(&self, correlation_id: Uuid, order_id: Option<&str>, error: &OrderError) {
        self.metrics.record_rejection(error.kind());

        match error {
            OrderError::Unexpected(cause) => tracing::error!(
                correlation_id = %correlation_id,
                order_id = ?order_id,
                error = ?cause,
                "Order creation failed unexpectedly"
            ),
            _ => tracing::warn!(
                correlation_id = %correlation_id,
                order_id = ?order_id,
                reason = error.kind(),
                error = %error,
                "Order rejected"
            ),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
