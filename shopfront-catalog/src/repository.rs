use async_trait::async_trait;
use shopfront_core::{ProductId, StoreResult};

use crate::inventory::{InventoryError, StockRequest};
use crate::product::Product;

/// Repository trait for product catalog and stock access
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Batch lookup. Only the products that exist are returned; callers diff
    /// against the ids they asked for.
    async fn find_by_ids(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>>;

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Product>>;

    async fn create(&self, product: &Product) -> StoreResult<()>;

    /// Batch upsert.
    async fn save(&self, products: &[Product]) -> StoreResult<()>;

    /// Atomically take stock for every request or for none of them.
    /// Implementations must make the read-check-write a single critical
    /// section per product so concurrent orders cannot oversell.
    async fn decrement_quantities(&self, requests: &[StockRequest]) -> Result<Vec<Product>, InventoryError>;

    /// Atomically hand stock back (compensation for an order that was not recorded).
    async fn restock(&self, requests: &[StockRequest]) -> Result<Vec<Product>, InventoryError>;
}
