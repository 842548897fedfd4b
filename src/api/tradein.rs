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
use crate::services::tradein_service;

use super::error_response;

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub condition: String,
}

/// GET /api/tradeins/quote?condition=good - public estimate
pub async fn get_quote(
    State(db): State<DatabaseConnection>,
    Query(params): Query<QuoteQuery>,
) -> impl IntoResponse {
    match tradein_service::quote(&db, &params.condition).await {
        Ok(price) => (
            StatusCode::OK,
            Json(json!({ "condition": params.condition, "quoted_price": price })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTradeInRequest {
    pub brand: String,
    pub model_name: String,
    pub condition: String,
    pub contact: Option<String>,
}

/// POST /api/tradeins - public quote request
pub async fn create_request(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateTradeInRequest>,
) -> impl IntoResponse {
    match tradein_service::create_request(
        &db,
        &payload.brand,
        &payload.model_name,
        &payload.condition,
        payload.contact,
    )
    .await
    {
        Ok(request) => (StatusCode::CREATED, Json(json!({ "tradein": request }))).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListTradeInsQuery {
    pub status: Option<String>,
}

/// GET /api/admin/tradeins
pub async fn list_requests(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Query(params): Query<ListTradeInsQuery>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_staff() {
        return e.into_response();
    }

    match tradein_service::list_requests(&db, params.status).await {
        Ok(requests) => (
            StatusCode::OK,
            Json(json!({ "tradeins": requests, "count": requests.len() })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// PUT /api/admin/tradeins/:id
pub async fn set_status(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<SetStatusRequest>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_staff() {
        return e.into_response();
    }

    match tradein_service::set_status(&db, id, &payload.status).await {
        Ok(request) => (StatusCode::OK, Json(json!({ "tradein": request }))).into_response(),
        Err(e) => error_response(e),
    }
}
