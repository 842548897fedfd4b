//! Inbound POS webhook. The POS is the source of truth for sale and restock
//! events; payloads cross an explicit schema-validation boundary before they
//! reach the stock service.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use crate::services::{settings_service, stock_service, ServiceError};

/// Typed POS event produced by the validation boundary
#[derive(Debug, PartialEq)]
pub enum PosEvent {
    Sold {
        imei: String,
        model_name: Option<String>,
    },
    Restock {
        model_name: String,
        brand: Option<String>,
        price: i64,
        imei: Option<String>,
    },
}

/// Validate the loosely-typed webhook payload into a `PosEvent`, or collect
/// every problem found so the POS operator sees them all at once.
pub fn parse_pos_event(payload: &Value) -> Result<PosEvent, Vec<String>> {
    let mut errors = Vec::new();

    let action = match payload.get("action").and_then(Value::as_str) {
        Some(a) => a.to_ascii_uppercase(),
        None => {
            errors.push("missing field 'action'".to_string());
            return Err(errors);
        }
    };

    let str_field = |key: &str| {
        payload
            .get(key)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    match action.as_str() {
        "SOLD" => {
            let imei = str_field("imei");
            if imei.is_none() {
                errors.push("SOLD requires field 'imei'".to_string());
            }
            if let Some(i) = &imei {
                if i.len() != 15 || !i.bytes().all(|b| b.is_ascii_digit()) {
                    errors.push("'imei' must be exactly 15 digits".to_string());
                }
            }
            if !errors.is_empty() {
                return Err(errors);
            }
            Ok(PosEvent::Sold {
                imei: imei.unwrap(),
                model_name: str_field("modelName"),
            })
        }
        "RESTOCK" => {
            let model_name = str_field("modelName");
            if model_name.is_none() {
                errors.push("RESTOCK requires field 'modelName'".to_string());
            }
            let price = payload.get("price").and_then(Value::as_i64);
            match price {
                None => errors.push("RESTOCK requires integer field 'price'".to_string()),
                Some(p) if p < 0 => errors.push("'price' must not be negative".to_string()),
                _ => {}
            }
            if let Some(i) = str_field("imei") {
                if i.len() != 15 || !i.bytes().all(|b| b.is_ascii_digit()) {
                    errors.push("'imei' must be exactly 15 digits".to_string());
                }
            }
            if !errors.is_empty() {
                return Err(errors);
            }
            Ok(PosEvent::Restock {
                model_name: model_name.unwrap(),
                brand: str_field("brand"),
                price: price.unwrap(),
                imei: str_field("imei"),
            })
        }
        other => {
            errors.push(format!("unknown action '{}'", other));
            Err(errors)
        }
    }
}

async fn webhook_token(db: &DatabaseConnection) -> Option<String> {
    match settings_service::get(db, "pos_webhook_token").await {
        Ok(Some(token)) if !token.is_empty() => Some(token),
        _ => std::env::var("POS_WEBHOOK_TOKEN").ok(),
    }
}

/// POST /api/pos/webhook - bearer-token authenticated sync from the POS
pub async fn webhook(
    State(db): State<DatabaseConnection>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let Some(expected) = webhook_token(&db).await else {
        tracing::error!("POS webhook called but no token is configured");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Webhook not configured" })),
        )
            .into_response();
    };

    let presented = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    if presented != Some(expected.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Invalid webhook token" })),
        )
            .into_response();
    }

    let event = match parse_pos_event(&payload) {
        Ok(event) => event,
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": "Invalid payload", "errors": errors })),
            )
                .into_response()
        }
    };

    let result = match event {
        PosEvent::Sold { imei, model_name } => {
            stock_service::mark_sold(&db, &imei, model_name.as_deref())
                .await
                .map(|record| format!("Sale recorded for IMEI {}", record.imei))
        }
        PosEvent::Restock {
            model_name,
            brand,
            price,
            imei,
        } => stock_service::restock(&db, &model_name, brand.as_deref(), price, imei.as_deref())
            .await
            .map(|product| {
                format!(
                    "Restocked {} (stock {})",
                    product.model_name, product.stock_count
                )
            }),
    };

    match result {
        Ok(message) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": message })),
        )
            .into_response(),
        Err(ServiceError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Product not found" })),
        )
            .into_response(),
        Err(ServiceError::Validation(msg))
        | Err(ServiceError::InvalidState(msg))
        | Err(ServiceError::Conflict(msg)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": msg })),
        )
            .into_response(),
        Err(ServiceError::Database(msg)) => {
            tracing::error!("POS webhook storage failure: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Internal error" })),
            )
                .into_response()
        }
    }
}
