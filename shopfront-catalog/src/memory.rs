use async_trait::async_trait;
use shopfront_core::{ProductId, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::inventory::{self, InventoryError, StockRequest};
use crate::product::Product;
use crate::repository::ProductRepository;

/// In-memory inventory. The whole read-check-write of a stock adjustment runs
/// under one guard with no await inside it, so concurrent callers serialise and
/// a cancelled caller never leaves a half-applied batch.
pub struct InMemoryProductRepository {
    products: Mutex<HashMap<ProductId, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: Mutex::new(products.into_iter().map(|p| (p.id, p)).collect()),
        }
    }

    /// Current on-hand quantity, if the product exists
    pub fn quantity_of(&self, product_id: &ProductId) -> Option<i32> {
        self.lock().ok()?.get(product_id).map(|p| p.quantity_on_hand)
    }

    /// Total units on hand across the catalog
    pub fn total_on_hand(&self) -> i64 {
        self.lock()
            .map(|products| products.values().map(|p| p.quantity_on_hand as i64).sum())
            .unwrap_or(0)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<ProductId, Product>>> {
        self.products
            .lock()
            .map_err(|_| StoreError::backend("inventory lock poisoned"))
    }

    fn apply<F>(&self, requests: &[StockRequest], plan: F) -> Result<Vec<Product>, InventoryError>
    where
        F: FnOnce(&[Product], &[StockRequest]) -> Result<Vec<Product>, InventoryError>,
    {
        let mut products = self.lock()?;

        let current: Vec<Product> = requests
            .iter()
            .filter_map(|r| products.get(&r.product_id).cloned())
            .fold(Vec::new(), |mut acc, p| {
                if !acc.iter().any(|seen: &Product| seen.id == p.id) {
                    acc.push(p);
                }
                acc
            });

        let updated = plan(&current, requests)?;
        for product in &updated {
            products.insert(product.id, product.clone());
        }

        Ok(updated)
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_ids(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>> {
        let products = self.lock()?;
        let mut found: Vec<Product> = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(product) = products.get(id) {
                if !found.iter().any(|p| p.id == *id) {
                    found.push(product.clone());
                }
            }
        }
        Ok(found)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
        let products = self.lock()?;
        Ok(products.values().find(|p| p.name == name).cloned())
    }

    async fn create(&self, product: &Product) -> StoreResult<()> {
        let mut products = self.lock()?;
        if products.values().any(|p| p.name == product.name) {
            return Err(StoreError::Conflict(format!("product name {} already in use", product.name)));
        }
        if products.contains_key(&product.id) {
            return Err(StoreError::Conflict(format!("product {} already exists", product.id)));
        }
        products.insert(product.id, product.clone());
        Ok(())
    }

    async fn save(&self, batch: &[Product]) -> StoreResult<()> {
        if let Some(bad) = batch.iter().find(|p| p.quantity_on_hand < 0) {
            return Err(StoreError::Corrupt(format!(
                "product {} would have negative stock {}",
                bad.id, bad.quantity_on_hand
            )));
        }

        let mut products = self.lock()?;
        for product in batch {
            products.insert(product.id, product.clone());
        }
        Ok(())
    }

    async fn decrement_quantities(&self, requests: &[StockRequest]) -> Result<Vec<Product>, InventoryError> {
        self.apply(requests, inventory::plan_decrement)
    }

    async fn restock(&self, requests: &[StockRequest]) -> Result<Vec<Product>, InventoryError> {
        self.apply(requests, inventory::plan_restock)
    }
}
