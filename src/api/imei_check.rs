//! Public TRCSL IMEI verification endpoint

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::*;
use serde_json::json;

use crate::models::imei::{self, Entity as Imei};
use crate::models::sold_device::{self, Entity as SoldDevice};

use super::error_response;

/// GET /api/imei-check/:imei
///
/// Reports 'approved' for devices in the sold history, 'pending' for devices
/// still in active inventory, 'not_found' otherwise and 'invalid' for input
/// that is not a 15-digit number.
#[utoipa::path(
    get,
    path = "/api/imei-check/{imei}",
    responses(
        (status = 200, description = "TRCSL registration status for the IMEI")
    )
)]
pub async fn check_imei(
    State(db): State<DatabaseConnection>,
    Path(imei_number): Path<String>,
) -> impl IntoResponse {
    if imei_number.len() != 15 || !imei_number.bytes().all(|b| b.is_ascii_digit()) {
        return (
            StatusCode::OK,
            Json(json!({
                "imei": imei_number,
                "status": "invalid",
                "message": "An IMEI is exactly 15 digits"
            })),
        )
            .into_response();
    }

    // Sold history first: a device sold by the shop is TRCSL-approved
    match SoldDevice::find()
        .filter(sold_device::Column::Imei.eq(&imei_number))
        .one(&db)
        .await
    {
        Ok(Some(_)) => {
            return (
                StatusCode::OK,
                Json(json!({
                    "imei": imei_number,
                    "status": "approved",
                    "message": "Device sold and registered"
                })),
            )
                .into_response()
        }
        Ok(None) => {}
        Err(e) => return error_response(e.into()),
    }

    match Imei::find()
        .filter(imei::Column::Imei.eq(&imei_number))
        .one(&db)
        .await
    {
        Ok(Some(_)) => (
            StatusCode::OK,
            Json(json!({
                "imei": imei_number,
                "status": "pending",
                "message": "Device in active inventory, registration pending"
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::OK,
            Json(json!({
                "imei": imei_number,
                "status": "not_found",
                "message": "Device unknown to this shop"
            })),
        )
            .into_response(),
        Err(e) => error_response(e.into()),
    }
}
