use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct OrderPlacedEvent {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub line_count: usize,
    pub total_quantity: i64,
    pub total: Decimal,
    pub timestamp: i64,
}

/// Emitted for every product touched by an order, carrying the post-decrement level.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct StockLevelEvent {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity_on_hand: i32,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEvent {
    OrderPlaced(OrderPlacedEvent),
    StockLevel(StockLevelEvent),
}

impl OrderEvent {
    /// Routing key, mirrors the topic naming used by downstream consumers
    pub fn topic(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "order.placed",
            OrderEvent::StockLevel(_) => "inventory.stock_level",
        }
    }

    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
