pub mod auth;
pub mod cart;
pub mod feed;
pub mod health;
pub mod imei_check;
pub mod inventory;
pub mod orders;
pub mod pos;
pub mod products;
pub mod settings;
pub mod tickets;
pub mod tradein;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::services::ServiceError;

/// Uniform mapping from service errors to HTTP responses. Storage failures
/// are logged with their cause, which is never echoed to the caller.
pub fn error_response(e: ServiceError) -> Response {
    match e {
        ServiceError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": "Not found" })),
        )
            .into_response(),
        ServiceError::Validation(msg)
        | ServiceError::InvalidState(msg)
        | ServiceError::Conflict(msg) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": msg })),
        )
            .into_response(),
        ServiceError::Database(msg) => {
            tracing::error!("storage failure: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Internal error" })),
            )
                .into_response()
        }
    }
}

pub fn api_router(db: DatabaseConnection) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::get_me))
        // Catalog (public)
        .route("/products", get(products::list_products))
        .route("/products/:id", get(products::get_product))
        // TRCSL IMEI verification (public)
        .route("/imei-check/:imei", get(imei_check::check_imei))
        // Social feed mirror (public)
        .route("/feed", get(feed::get_feed))
        // Trade-ins (public entry, admin review)
        .route("/tradeins/quote", get(tradein::get_quote))
        .route("/tradeins", post(tradein::create_request))
        // Cart
        .route("/cart", get(cart::list_cart).post(cart::add_to_cart))
        .route(
            "/cart/:product_id",
            put(cart::update_cart_item).delete(cart::remove_cart_item),
        )
        // Orders
        .route("/orders", get(orders::list_orders).post(orders::checkout))
        .route("/orders/:id", get(orders::get_order))
        // Tickets
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        // POS webhook
        .route("/pos/webhook", post(pos::webhook))
        // Admin: catalog
        .route("/admin/products", post(products::create_product))
        .route(
            "/admin/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/admin/products/import", post(products::import_products))
        // Admin: IMEI inventory
        .route(
            "/admin/inventory",
            get(inventory::list_inventory).post(inventory::add_unit),
        )
        .route(
            "/admin/inventory/:id",
            put(inventory::update_unit).delete(inventory::remove_unit),
        )
        // Admin: orders
        .route("/admin/orders/:id/status", put(orders::update_status))
        .route("/admin/orders/:id/items", delete(orders::clear_items))
        .route("/admin/orders/:id", delete(orders::delete_order))
        // Admin: tickets
        .route("/admin/tickets/:id/close", put(tickets::close_ticket))
        // Admin: trade-ins
        .route("/admin/tradeins", get(tradein::list_requests))
        .route("/admin/tradeins/:id", put(tradein::set_status))
        // Admin: settings
        .route(
            "/admin/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .with_state(db)
}
