use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::auth::Claims;
use crate::services::settings_service;

use super::error_response;

/// GET /api/admin/settings
pub async fn get_settings(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> impl IntoResponse {
    if let Err(e) = claims.require_admin() {
        return e.into_response();
    }

    match settings_service::load(&db).await {
        Ok(settings) => (StatusCode::OK, Json(json!({ "settings": settings }))).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/admin/settings - upsert and return the refreshed mapping
pub async fn update_settings(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<HashMap<String, String>>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_admin() {
        return e.into_response();
    }

    match settings_service::set_many(&db, payload).await {
        Ok(settings) => (StatusCode::OK, Json(json!({ "settings": settings }))).into_response(),
        Err(e) => error_response(e),
    }
}
