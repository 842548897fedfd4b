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
use crate::services::{notify, order_service};

use super::error_response;

/// POST /api/orders - checkout the caller's cart
pub async fn checkout(State(db): State<DatabaseConnection>, claims: Claims) -> impl IntoResponse {
    match order_service::checkout(&db, claims.uid).await {
        Ok(order) => {
            notify::notify_staff(
                &db,
                "order.created",
                json!({ "order_id": order.id, "user": claims.sub, "total": order.total }),
            );
            (StatusCode::CREATED, Json(json!({ "order": order }))).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET /api/orders - own orders for customers, all orders for staff
pub async fn list_orders(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> impl IntoResponse {
    let user_filter = if claims.is_staff() {
        None
    } else {
        Some(claims.uid)
    };

    match order_service::list_orders(&db, user_filter).await {
        Ok(orders) => (
            StatusCode::OK,
            Json(json!({ "orders": orders, "count": orders.len() })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/orders/:id
pub async fn get_order(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let user_filter = if claims.is_staff() {
        None
    } else {
        Some(claims.uid)
    };

    match order_service::get_order(&db, id, user_filter).await {
        Ok(order) => (StatusCode::OK, Json(json!({ "order": order }))).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// PUT /api/admin/orders/:id/status
pub async fn update_status(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStatusRequest>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_staff() {
        return e.into_response();
    }

    match order_service::update_status(&db, id, &payload.status).await {
        Ok(order) => (StatusCode::OK, Json(json!({ "order": order }))).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/admin/orders/:id/items - clear line items of a dead order
pub async fn clear_items(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_staff() {
        return e.into_response();
    }

    match order_service::clear_items(&db, id).await {
        Ok(removed) => (StatusCode::OK, Json(json!({ "removed": removed }))).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/admin/orders/:id - only orders with zero line items
pub async fn delete_order(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_staff() {
        return e.into_response();
    }

    match order_service::delete_order(&db, id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Order deleted" }))).into_response(),
        Err(e) => error_response(e),
    }
}
