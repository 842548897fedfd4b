//! Trade-in quoting. Quotes are deterministic: a condition tier applied to
//! the configurable base price from settings.

use chrono::Utc;
use sea_orm::*;

use crate::models::trade_in::{self, Entity as TradeIn};

use super::{settings_service, ServiceError};

const DEFAULT_BASE_PRICE: i64 = 100_000;

fn condition_rate(condition: &str) -> Option<f64> {
    match condition {
        "mint" => Some(0.70),
        "good" => Some(0.55),
        "fair" => Some(0.40),
        "poor" => Some(0.20),
        _ => None,
    }
}

/// Estimate a quote for a device in the given condition
pub async fn quote(db: &DatabaseConnection, condition: &str) -> Result<i64, ServiceError> {
    let rate = condition_rate(condition).ok_or_else(|| {
        ServiceError::Validation(format!(
            "condition must be one of {:?}",
            trade_in::CONDITIONS
        ))
    })?;

    let base = settings_service::get(db, "tradein_base_price")
        .await?
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(DEFAULT_BASE_PRICE);

    Ok((base as f64 * rate) as i64)
}

pub async fn create_request(
    db: &DatabaseConnection,
    brand: &str,
    model_name: &str,
    condition: &str,
    contact: Option<String>,
) -> Result<trade_in::Model, ServiceError> {
    if brand.trim().is_empty() || model_name.trim().is_empty() {
        return Err(ServiceError::Validation(
            "brand and model name are required".to_string(),
        ));
    }

    let quoted_price = quote(db, condition).await?;

    let saved = trade_in::ActiveModel {
        brand: Set(brand.to_owned()),
        model_name: Set(model_name.to_owned()),
        condition: Set(condition.to_owned()),
        quoted_price: Set(quoted_price),
        contact: Set(contact),
        status: Set(trade_in::STATUS_QUOTED.to_owned()),
        created_at: Set(Utc::now().to_rfc3339()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(saved)
}

pub async fn list_requests(
    db: &DatabaseConnection,
    status: Option<String>,
) -> Result<Vec<trade_in::Model>, ServiceError> {
    let mut query = TradeIn::find().order_by_desc(trade_in::Column::CreatedAt);

    if let Some(status) = status {
        query = query.filter(trade_in::Column::Status.eq(status));
    }

    Ok(query.all(db).await?)
}

/// Accept or reject a quoted trade-in
pub async fn set_status(
    db: &DatabaseConnection,
    id: i32,
    status: &str,
) -> Result<trade_in::Model, ServiceError> {
    if status != trade_in::STATUS_ACCEPTED && status != trade_in::STATUS_REJECTED {
        return Err(ServiceError::Validation(format!(
            "status must be '{}' or '{}'",
            trade_in::STATUS_ACCEPTED,
            trade_in::STATUS_REJECTED
        )));
    }

    let existing = TradeIn::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if existing.status != trade_in::STATUS_QUOTED {
        return Err(ServiceError::InvalidState(format!(
            "trade-in is already {}",
            existing.status
        )));
    }

    let mut active: trade_in::ActiveModel = existing.into();
    active.status = Set(status.to_owned());

    Ok(active.update(db).await?)
}
