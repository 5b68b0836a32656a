use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::{CustomerId, OrderId, ProductId};
use shopfront_order::{Order, OrderItemRequest, PlaceOrderRequest};
use std::str::FromStr;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Wire shape of a place-order call. Ids arrive as strings and a missing
/// quantity reads as 0, both are checked before reaching the order service.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderBody {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub items: Vec<OrderItemBody>,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemBody {
    pub product_id: String,
    #[serde(default)]
    pub quantity: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub items: Vec<OrderItemResponse>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub product_id: ProductId,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

impl TryFrom<Order> for OrderResponse {
    type Error = AppError;

    fn try_from(order: Order) -> Result<Self, Self::Error> {
        let out_of_range = || AppError::Internal(format!("order {} total is out of range", order.id));
        let total = order.total().ok_or_else(out_of_range)?;
        let items = order
            .line_items
            .iter()
            .map(|item| -> Result<OrderItemResponse, AppError> {
                Ok(OrderItemResponse {
                    product_id: item.product_id,
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    line_total: item.line_total().ok_or_else(out_of_range)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: order.id,
            customer_id: order.customer_id,
            items,
            total,
            created_at: order.created_at,
        })
    }
}

impl TryFrom<PlaceOrderBody> for PlaceOrderRequest {
    type Error = AppError;

    fn try_from(body: PlaceOrderBody) -> Result<Self, Self::Error> {
        if body.customer_id.trim().is_empty() {
            return Err(AppError::Validation("customer_id is required".to_string()));
        }
        let customer_id = parse_id::<CustomerId>("customer_id", &body.customer_id)?;

        let items = body
            .items
            .into_iter()
            .map(|item| -> Result<OrderItemRequest, AppError> {
                let product_id = parse_id::<ProductId>("product_id", &item.product_id)?;
                let quantity = i32::try_from(item.quantity).map_err(|_| {
                    AppError::Validation(format!("quantity for product {} is out of range", product_id))
                })?;
                Ok(OrderItemRequest { product_id, quantity })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PlaceOrderRequest { customer_id, items })
    }
}

pub(crate) fn parse_id<T: FromStr>(field: &str, raw: &str) -> Result<T, AppError> {
    raw.parse::<T>()
        .map_err(|_| AppError::Validation(format!("{} is not a valid id: {}", field, raw)))
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", post(place_order))
        .route("/v1/orders/{id}", get(get_order))
}

/// POST /v1/orders
/// Place an order for a customer
pub async fn place_order(
    State(state): State<AppState>,
    Json(body): Json<PlaceOrderBody>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let request = PlaceOrderRequest::try_from(body)?;
    let order = state.orders.place_order(request).await?;
    Ok((StatusCode::CREATED, Json(order.try_into()?)))
}

/// GET /v1/orders/{id}
/// Retrieve order details
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let order_id = parse_id::<OrderId>("order id", &order_id)?;
    let order = state.orders.find_order(order_id).await?;
    Ok(Json(order.try_into()?))
}
