use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::integrations::feed;
use crate::services::settings_service;

/// GET /api/feed - mirrored social posts, static fallback on upstream failure
pub async fn get_feed(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    let feed_url = match settings_service::get(&db, "feed_url").await {
        Ok(Some(url)) => Some(url),
        _ => std::env::var("FEED_URL").ok(),
    };

    let (posts, fallback) = feed::fetch_posts(feed_url.as_deref()).await;

    (
        StatusCode::OK,
        Json(json!({ "posts": posts, "fallback": fallback })),
    )
        .into_response()
}
