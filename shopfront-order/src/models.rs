use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::money::{line_total, sum_totals};
use shopfront_core::{CustomerId, OrderId, ProductId};

/// A customer's purchase. Created once by the order service, immutable after.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub line_items: Vec<OrderLineItem>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Sum of all line totals, `None` if it does not fit a decimal
    pub fn total(&self) -> Option<Decimal> {
        total_of(&self.line_items)
    }

    pub fn total_quantity(&self) -> i64 {
        self.line_items.iter().map(|item| item.quantity as i64).sum()
    }
}

/// One product within an order, priced as it was when the order was placed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLineItem {
    pub product_id: ProductId,
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl OrderLineItem {
    pub fn line_total(&self) -> Option<Decimal> {
        line_total(self.unit_price, self.quantity)
    }
}

pub fn total_of(line_items: &[OrderLineItem]) -> Option<Decimal> {
    sum_totals(line_items.iter().map(OrderLineItem::line_total))
}

/// A single requested product/quantity pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaceOrderRequest {
    pub customer_id: CustomerId,
    pub items: Vec<OrderItemRequest>,
}

impl PlaceOrderRequest {
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            items: Vec::new(),
        }
    }

    pub fn item(mut self, product_id: ProductId, quantity: i32) -> Self {
        self.items.push(OrderItemRequest { product_id, quantity });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_order_totals() {
        let order = Order {
            id: OrderId::new(),
            customer_id: CustomerId::new(),
            line_items: vec![
                OrderLineItem {
                    product_id: ProductId::new(),
                    unit_price: Decimal::from_str("9.99").unwrap(),
                    quantity: 2,
                },
                OrderLineItem {
                    product_id: ProductId::new(),
                    unit_price: Decimal::from_str("4.50").unwrap(),
                    quantity: 3,
                },
            ],
            created_at: Utc::now(),
        };

        assert_eq!(order.total().unwrap().to_string(), "33.48");
        assert_eq!(order.total_quantity(), 5);
    }

    #[test]
    fn test_order_total_overflow_is_none() {
        let item = |unit_price| OrderLineItem {
            product_id: ProductId::new(),
            unit_price,
            quantity: 1,
        };

        assert_eq!(total_of(&[item(Decimal::MAX), item(Decimal::ONE)]), None);
        assert_eq!(total_of(&[OrderLineItem { quantity: 2, ..item(Decimal::MAX) }]), None);
        assert_eq!(total_of(&[]), Some(Decimal::new(0, 2)));
    }

    #[test]
    fn test_request_deserializes_from_wire_shape() {
        let product_id = ProductId::new();
        let customer_id = CustomerId::new();
        let body = serde_json::json!({
            "customer_id": customer_id.to_string(),
            "items": [{ "product_id": product_id.to_string(), "quantity": 2 }]
        });

        let request: PlaceOrderRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request, PlaceOrderRequest::new(customer_id).item(product_id, 2));
    }
}
