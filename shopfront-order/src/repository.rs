use async_trait::async_trait;
use shopfront_core::{Customer, CustomerId, OrderId, StoreResult};

use crate::models::{Order, OrderLineItem};

/// Repository trait for order persistence
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order for `customer`. The store assigns the id and timestamp.
    async fn create(&self, customer: &Customer, line_items: Vec<OrderLineItem>) -> StoreResult<Order>;

    async fn find_by_id(&self, id: OrderId) -> StoreResult<Option<Order>>;

    /// Orders of one customer, newest first
    async fn list_by_customer(&self, customer_id: CustomerId) -> StoreResult<Vec<Order>>;
}
