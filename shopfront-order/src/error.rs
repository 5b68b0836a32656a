use shopfront_catalog::InventoryError;
use shopfront_core::{CustomerId, OrderId, ProductId, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Cannot create order with invalid products: {}", join_ids(.0))]
    InvalidProduct(Vec<ProductId>),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i32,
        available: i32,
    },

    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join_ids(ids: &[ProductId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

impl From<InventoryError> for OrderError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::InvalidProduct(ids) => OrderError::InvalidProduct(ids),
            InventoryError::InsufficientStock {
                product_id,
                requested,
                available,
            } => OrderError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            InventoryError::InvalidQuantity { product_id, quantity } => {
                OrderError::Validation(format!("invalid quantity {} for product {}", quantity, product_id))
            }
            InventoryError::Store(e) => OrderError::Store(e),
        }
    }
}
