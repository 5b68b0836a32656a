use async_trait::async_trait;

use crate::{Customer, CustomerId, StoreResult};

/// Repository trait for customer lookups
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: CustomerId) -> StoreResult<Option<Customer>>;

    async fn create(&self, customer: &Customer) -> StoreResult<()>;
}
