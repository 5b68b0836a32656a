use serde::{Deserialize, Serialize};
use shopfront_core::{ProductId, StoreError};
use std::collections::HashMap;

use crate::product::Product;

/// One product/quantity pair of a stock adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

impl StockRequest {
    pub fn new(product_id: ProductId, quantity: i32) -> Self {
        Self { product_id, quantity }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Invalid products: {}", join_ids(.0))]
    InvalidProduct(Vec<ProductId>),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i32,
        available: i32,
    },

    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity {
        product_id: ProductId,
        quantity: i32,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join_ids(ids: &[ProductId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

/// Collapse repeated product ids into one request each, summing quantities.
/// First-occurrence order is kept.
pub fn merge_requests(requests: &[StockRequest]) -> Result<Vec<StockRequest>, InventoryError> {
    let mut merged: Vec<StockRequest> = Vec::with_capacity(requests.len());
    let mut index: HashMap<ProductId, usize> = HashMap::with_capacity(requests.len());

    for request in requests {
        if request.quantity <= 0 {
            return Err(InventoryError::InvalidQuantity {
                product_id: request.product_id,
                quantity: request.quantity,
            });
        }

        match index.get(&request.product_id) {
            Some(&i) => {
                let entry = &mut merged[i];
                entry.quantity = entry.quantity.checked_add(request.quantity).ok_or(
                    InventoryError::InvalidQuantity {
                        product_id: request.product_id,
                        quantity: request.quantity,
                    },
                )?;
            }
            None => {
                index.insert(request.product_id, merged.len());
                merged.push(*request);
            }
        }
    }

    Ok(merged)
}

/// Requested ids with no matching product, in request order.
pub fn missing_products(products: &[Product], requests: &[StockRequest]) -> Vec<ProductId> {
    let mut missing: Vec<ProductId> = Vec::new();
    for request in requests {
        let found = products.iter().any(|p| p.id == request.product_id);
        if !found && !missing.contains(&request.product_id) {
            missing.push(request.product_id);
        }
    }
    missing
}

/// Validate a whole decrement batch against the current product records and
/// return the products with their new quantities. Nothing is returned unless
/// every product passes, so callers write all or nothing.
pub fn plan_decrement(products: &[Product], requests: &[StockRequest]) -> Result<Vec<Product>, InventoryError> {
    let requests = merge_requests(requests)?;
    let by_id = pair_with_requests(products, &requests)?;

    // Sufficiency is checked for the full batch before any quantity is computed
    for (product, request) in &by_id {
        if product.quantity_on_hand < request.quantity {
            return Err(InventoryError::InsufficientStock {
                product_id: product.id,
                requested: request.quantity,
                available: product.quantity_on_hand,
            });
        }
    }

    Ok(by_id
        .into_iter()
        .map(|(product, request)| product.with_quantity(product.quantity_on_hand - request.quantity))
        .collect())
}

/// Inverse of `plan_decrement`, used to hand back stock taken by an order that
/// could not be recorded.
pub fn plan_restock(products: &[Product], requests: &[StockRequest]) -> Result<Vec<Product>, InventoryError> {
    let requests = merge_requests(requests)?;
    let by_id = pair_with_requests(products, &requests)?;

    by_id
        .into_iter()
        .map(|(product, request)| {
            product
                .quantity_on_hand
                .checked_add(request.quantity)
                .map(|quantity| product.with_quantity(quantity))
                .ok_or(InventoryError::InvalidQuantity {
                    product_id: product.id,
                    quantity: request.quantity,
                })
        })
        .collect()
}

/// Match every request to its product (request order), failing on ids present
/// on only one side.
fn pair_with_requests<'a>(
    products: &'a [Product],
    requests: &'a [StockRequest],
) -> Result<Vec<(&'a Product, &'a StockRequest)>, InventoryError> {
    let missing = missing_products(products, requests);
    if !missing.is_empty() {
        return Err(InventoryError::InvalidProduct(missing));
    }

    // A fetched product nobody asked for means the store answered a different question
    if let Some(stray) = products.iter().find(|p| !requests.iter().any(|r| r.product_id == p.id)) {
        return Err(InventoryError::InvalidProduct(vec![stray.id]));
    }

    Ok(requests
        .iter()
        .filter_map(|request| {
            products
                .iter()
                .find(|p| p.id == request.product_id)
                .map(|product| (product, request))
        })
        .collect())
}
