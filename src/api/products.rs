use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::auth::Claims;
use crate::models::product::Product;
use crate::services::product_service::{self, ProductFilter};

use super::error_response;

/// Query parameters for listing products
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub brand: Option<String>,
    pub category: Option<String>,
    pub approved: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// GET /api/products - Public catalog listing
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "Paginated product list")
    )
)]
pub async fn list_products(
    State(db): State<DatabaseConnection>,
    Query(params): Query<ListProductsQuery>,
) -> impl IntoResponse {
    let filter = ProductFilter {
        brand: params.brand,
        category: params.category,
        approved: params.approved,
        page: params.page,
        per_page: params.per_page,
    };

    match product_service::list_products(&db, filter).await {
        Ok(page) => (StatusCode::OK, Json(json!(page))).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/products/:id
pub async fn get_product(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match product_service::get_product(&db, id).await {
        Ok(product) => (StatusCode::OK, Json(json!({ "product": product }))).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/admin/products
pub async fn create_product(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<Product>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_staff() {
        return e.into_response();
    }

    match product_service::create_product(&db, payload).await {
        Ok(product) => (StatusCode::CREATED, Json(json!({ "product": product }))).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/admin/products/:id
pub async fn update_product(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<Product>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_staff() {
        return e.into_response();
    }

    match product_service::update_product(&db, id, payload).await {
        Ok(product) => (StatusCode::OK, Json(json!({ "product": product }))).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/admin/products/:id - refused while IMEIs or sold history exist
pub async fn delete_product(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_staff() {
        return e.into_response();
    }

    match product_service::delete_product(&db, id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Product deleted" })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/admin/products/import - bulk upsert keyed by SKU
pub async fn import_products(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<Vec<product_service::ImportEntry>>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_staff() {
        return e.into_response();
    }

    match product_service::import_products(&db, payload).await {
        Ok(processed) => (
            StatusCode::OK,
            Json(json!({ "success": true, "processed": processed })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
