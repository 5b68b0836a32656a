use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use shopfront_core::{Customer, CustomerId};
use tracing::info;

use crate::error::AppError;
use crate::orders::{parse_id, OrderResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/customers", post(create_customer))
        .route("/v1/customers/{id}", get(get_customer))
        .route("/v1/customers/{id}/orders", get(list_customer_orders))
}

/// POST /v1/customers
pub async fn create_customer(
    State(state): State<AppState>,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let customer = Customer::new(req.name, req.email)?;
    state.customers.create(&customer).await?;

    info!(customer_id = %customer.id, email = %customer.email, "Customer registered");
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /v1/customers/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<Customer>, AppError> {
    let customer_id = parse_id::<CustomerId>("customer id", &customer_id)?;
    state
        .customers
        .find_by_id(customer_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Customer not found: {}", customer_id)))
}

/// GET /v1/customers/{id}/orders
/// Newest first
pub async fn list_customer_orders(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let customer_id = parse_id::<CustomerId>("customer id", &customer_id)?;
    let orders = state.orders.list_customer_orders(customer_id).await?;
    let orders = orders
        .into_iter()
        .map(OrderResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(orders))
}
