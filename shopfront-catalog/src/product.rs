use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::money::normalize_price;
use shopfront_core::{CoreError, ProductId};

/// A sellable product and its on-hand stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity_on_hand: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: impl Into<String>, unit_price: Decimal, quantity_on_hand: i32) -> Result<Self, CoreError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(CoreError::ValidationError("product name is required".to_string()));
        }
        if quantity_on_hand < 0 {
            return Err(CoreError::ValidationError(format!(
                "quantity must not be negative, got {}",
                quantity_on_hand
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id: ProductId::new(),
            name,
            unit_price: normalize_price(unit_price)?,
            quantity_on_hand,
            created_at: now,
            updated_at: now,
        })
    }

    /// Copy of this product carrying a new on-hand quantity.
    pub(crate) fn with_quantity(&self, quantity_on_hand: i32) -> Self {
        Self {
            quantity_on_hand,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}
