use rust_decimal::Decimal;
use shopfront_core::{CoreError, ProductId, StoreError};
use std::sync::Arc;
use tracing::info;

use crate::product::Product;
use crate::repository::ProductRepository;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Product name already in use: {0}")]
    ProductNameTaken(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CoreError> for CatalogError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => CatalogError::Validation(msg),
            CoreError::InternalError(msg) => CatalogError::Store(StoreError::backend(msg)),
        }
    }
}

/// Product registration and lookup on top of a product store
pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Register a new product with its opening stock. Names are unique.
    pub async fn register_product(
        &self,
        name: &str,
        unit_price: Decimal,
        quantity: i32,
    ) -> Result<Product, CatalogError> {
        let product = Product::new(name, unit_price, quantity)?;

        if self.products.find_by_name(&product.name).await?.is_some() {
            return Err(CatalogError::ProductNameTaken(product.name));
        }

        // The store re-checks the name, a concurrent registration surfaces as a conflict
        match self.products.create(&product).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(CatalogError::ProductNameTaken(product.name)),
            Err(e) => return Err(e.into()),
        }

        info!(product_id = %product.id, name = %product.name, quantity, "Product registered");
        Ok(product)
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        let mut found = self.products.find_by_ids(&[id]).await?;
        Ok(found.pop())
    }
}
