use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shopfront_catalog::Product;
use shopfront_core::ProductId;

use crate::error::AppError;
use crate::orders::parse_id;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products", post(create_product))
        .route("/v1/products/{id}", get(get_product))
}

/// POST /v1/products
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = state
        .catalog
        .register_product(&req.name, req.unit_price, req.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /v1/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let product_id = parse_id::<ProductId>("product id", &product_id)?;
    state
        .catalog
        .get_product(product_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Product not found: {}", product_id)))
}
