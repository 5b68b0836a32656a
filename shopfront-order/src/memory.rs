use async_trait::async_trait;
use chrono::Utc;
use shopfront_core::{Customer, CustomerId, OrderId, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::{Order, OrderLineItem};
use crate::repository::OrderRepository;

/// Order store backed by a process-local map
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.read().map(|orders| orders.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, customer: &Customer, line_items: Vec<OrderLineItem>) -> StoreResult<Order> {
        let order = Order {
            id: OrderId::new(),
            customer_id: customer.id,
            line_items,
            created_at: Utc::now(),
        };

        let mut orders = self
            .orders
            .write()
            .map_err(|_| StoreError::backend("order store lock poisoned"))?;
        orders.insert(order.id, order.clone());

        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> StoreResult<Option<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|_| StoreError::backend("order store lock poisoned"))?;
        Ok(orders.get(&id).cloned())
    }

    async fn list_by_customer(&self, customer_id: CustomerId) -> StoreResult<Vec<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|_| StoreError::backend("order store lock poisoned"))?;

        let mut found: Vec<Order> = orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}
