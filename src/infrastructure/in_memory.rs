use crate::domain::order::RenewalOrder;
use crate::domain::ports::OrderStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for renewal orders.
///
/// Uses `Arc<RwLock<HashMap<u32, RenewalOrder>>>` to allow shared concurrent
/// access; `Clone` shares the underlying map, so a CLI or test can keep a
/// handle on the same orders an engine writes through its boxed port.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<u32, RenewalOrder>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn store(&self, order: RenewalOrder) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.order, order);
        Ok(())
    }

    async fn get(&self, order_id: u32) -> Result<Option<RenewalOrder>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&order_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<RenewalOrder>> {
        let orders = self.orders.read().await;
        let mut all: Vec<RenewalOrder> = orders.values().cloned().collect();
        all.sort_by_key(|order| order.order);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderStatus, SourceToken};

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let store = InMemoryOrderStore::new();
        let order = RenewalOrder::new(1).with_payment_source(SourceToken("src_1".into()));

        store.store(order.clone()).await.unwrap();
        let retrieved = store.get(1).await.unwrap().unwrap();
        assert_eq!(retrieved, order);

        assert!(store.get(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_overwrites_same_order() {
        let store = InMemoryOrderStore::new();
        store.store(RenewalOrder::new(1)).await.unwrap();

        let mut updated = RenewalOrder::new(1);
        updated.mark_failed("Gateway transaction failed (card_declined)".to_string());
        store.store(updated).await.unwrap();

        let retrieved = store.get(1).await.unwrap().unwrap();
        assert_eq!(retrieved.status, OrderStatus::Failed);
    }

    #[tokio::test]
    async fn test_get_all_sorted_by_order_id() {
        let store = InMemoryOrderStore::new();
        store.store(RenewalOrder::new(3)).await.unwrap();
        store.store(RenewalOrder::new(1)).await.unwrap();
        store.store(RenewalOrder::new(2)).await.unwrap();

        let all = store.get_all().await.unwrap();
        let ids: Vec<u32> = all.iter().map(|o| o.order).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryOrderStore::new();
        let handle = store.clone();

        store.store(RenewalOrder::new(7)).await.unwrap();
        assert!(handle.get(7).await.unwrap().is_some());
    }
}
