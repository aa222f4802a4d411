use crate::domain::model::{Order, OrderId};
use crate::domain::ports::OrderStore;
use crate::utils::error::{GiftEmailError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Order store backed by a map, optionally loaded from a JSON array of orders.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    orders: HashMap<OrderId, Order>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.insert(order);
        self
    }

    pub fn insert(&mut self, order: Order) {
        self.orders.insert(order.id.clone(), order);
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Parses a JSON array of orders. Two entries with the same id are
    /// rejected rather than silently merged.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let orders: Vec<Order> = serde_json::from_str(content)?;
        let mut store = Self::new();
        for order in orders {
            if store.orders.contains_key(&order.id) {
                return Err(GiftEmailError::OrderStoreError {
                    message: format!("duplicate order id {}", order.id),
                });
            }
            store.insert(order);
        }
        Ok(store)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let store = Self::from_json_str(&content)?;
        tracing::debug!(
            "Loaded {} orders from {}",
            store.len(),
            path.as_ref().display()
        );
        Ok(store)
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>> {
        Ok(self.orders.get(id).cloned())
    }
}
