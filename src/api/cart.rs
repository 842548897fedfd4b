use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::auth::Claims;
use crate::services::cart_service;

use super::error_response;

/// GET /api/cart
pub async fn list_cart(State(db): State<DatabaseConnection>, claims: Claims) -> impl IntoResponse {
    match cart_service::list_cart(&db, claims.uid).await {
        Ok(lines) => {
            let total: i64 = lines.iter().map(|l| l.line_total).sum();
            (
                StatusCode::OK,
                Json(json!({ "items": lines, "total": total })),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: i32,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// POST /api/cart
pub async fn add_to_cart(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<AddToCartRequest>,
) -> impl IntoResponse {
    match cart_service::add_to_cart(&db, claims.uid, payload.product_id, payload.quantity).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Added to cart" })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub quantity: i32,
}

/// PUT /api/cart/:product_id
pub async fn update_cart_item(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(product_id): Path<i32>,
    Json(payload): Json<UpdateCartRequest>,
) -> impl IntoResponse {
    match cart_service::set_quantity(&db, claims.uid, product_id, payload.quantity).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Cart updated" }))).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/cart/:product_id
pub async fn remove_cart_item(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(product_id): Path<i32>,
) -> impl IntoResponse {
    match cart_service::remove_from_cart(&db, claims.uid, product_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Removed from cart" })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
