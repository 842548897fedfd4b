//! Admin IMEI inventory endpoints. All mutations go through the stock
//! service so the derived stock count stays consistent.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

use crate::auth::Claims;
use crate::models::imei::{self, Entity as Imei};
use crate::services::stock_service;

use super::error_response;

/// Query parameters for listing inventory
#[derive(Debug, Deserialize)]
pub struct ListInventoryQuery {
    pub product_id: Option<i32>,
    pub status: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// GET /api/admin/inventory
pub async fn list_inventory(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Query(params): Query<ListInventoryQuery>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_staff() {
        return e.into_response();
    }

    let mut condition = Condition::all();
    if let Some(product_id) = params.product_id {
        condition = condition.add(imei::Column::ProductId.eq(product_id));
    }
    if let Some(status) = params.status {
        condition = condition.add(imei::Column::Status.eq(status));
    }

    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(50).clamp(1, 200);

    let paginator = Imei::find()
        .filter(condition)
        .order_by_desc(imei::Column::CreatedAt)
        .paginate(&db, per_page);

    let total = match paginator.num_items().await {
        Ok(n) => n,
        Err(e) => return error_response(e.into()),
    };
    match paginator.fetch_page(page - 1).await {
        Ok(units) => (
            StatusCode::OK,
            Json(json!({
                "units": units,
                "total": total,
                "page": page,
                "per_page": per_page
            })),
        )
            .into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// Request body for registering a unit
#[derive(Debug, Deserialize)]
pub struct AddUnitRequest {
    pub product_id: i32,
    pub imei: String,
    #[serde(default)]
    pub registered: bool,
}

/// POST /api/admin/inventory - register one unit
pub async fn add_unit(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<AddUnitRequest>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_staff() {
        return e.into_response();
    }

    match stock_service::add_unit(&db, payload.product_id, &payload.imei, payload.registered).await
    {
        Ok(unit) => (StatusCode::CREATED, Json(json!({ "unit": unit }))).into_response(),
        Err(e) => error_response(e),
    }
}

/// DTO for direct IMEI edits
#[derive(Debug, Deserialize)]
pub struct UpdateUnitRequest {
    pub status: Option<String>,
    pub registered: Option<bool>,
}

/// PUT /api/admin/inventory/:id - direct status/registration edit.
/// Recomputes the product's stock count afterwards since the edit bypasses
/// the normal lifecycle transitions.
pub async fn update_unit(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUnitRequest>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_staff() {
        return e.into_response();
    }

    let existing = match Imei::find_by_id(id).one(&db).await {
        Ok(Some(row)) => row,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Unit not found" })),
            )
                .into_response()
        }
        Err(e) => return error_response(e.into()),
    };

    if let Some(status) = &payload.status {
        if status != imei::STATUS_AVAILABLE && status != imei::STATUS_SOLD {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Status must be 'available' or 'sold'" })),
            )
                .into_response();
        }
    }

    let product_id = existing.product_id;
    let mut active: imei::ActiveModel = existing.into();
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(registered) = payload.registered {
        active.registered = Set(registered);
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    let updated = match active.update(&db).await {
        Ok(u) => u,
        Err(e) => return error_response(e.into()),
    };

    // The edit may have changed availability, so the cached count must be
    // recomputed from the IMEI rows.
    match stock_service::recompute(&db, product_id).await {
        Ok(stock_count) => (
            StatusCode::OK,
            Json(json!({ "unit": updated, "stock_count": stock_count })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/admin/inventory/:id - sold units are rejected
pub async fn remove_unit(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_staff() {
        return e.into_response();
    }

    match stock_service::remove_unit(&db, id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Unit removed" }))).into_response(),
        Err(e) => error_response(e),
    }
}
