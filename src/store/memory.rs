use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{sort_newest_first, OrderStore};
use crate::domain::order::{Order, OrderError, OrderRecord};

// ============================================================================
// In-Memory Order Store
// ============================================================================
//
// Non-persistent variant. The map is the single owner of all orders and
// doubles as the unique index: `insert` re-checks the key under the write
// lock, so two racing creates for one id cannot both land.
//
// ============================================================================

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<String, OrderRecord>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn fetch(&self, order_id: &str) -> Result<Option<OrderRecord>, OrderError> {
        Ok(self.orders.read().await.get(order_id).cloned())
    }

    async fn insert(&self, order: Order) -> Result<OrderRecord, OrderError> {
        let mut orders = self.orders.write().await;

        match orders.entry(order.order_id.clone()) {
            Entry::Occupied(existing) => {
                tracing::debug!(order_id = %existing.key(), "Unique index rejected insert");
                Err(OrderError::Duplicate(existing.key().clone()))
            }
            Entry::Vacant(slot) => {
                let record = OrderRecord::new(order, Utc::now());
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn list_all(&self) -> Result<Vec<OrderRecord>, OrderError> {
        let mut records: Vec<OrderRecord> = self.orders.read().await.values().cloned().collect();
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn health(&self) -> Result<(), OrderError> {
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
