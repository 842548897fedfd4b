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
use crate::services::{notify, ticket_service};

use super::error_response;

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub subject: String,
    pub body: String,
}

/// POST /api/tickets
pub async fn create_ticket(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<CreateTicketRequest>,
) -> impl IntoResponse {
    match ticket_service::create_ticket(&db, Some(claims.uid), &payload.subject, &payload.body)
        .await
    {
        Ok(ticket) => {
            notify::notify_staff(
                &db,
                "ticket.created",
                json!({ "ticket_id": ticket.id, "subject": ticket.subject }),
            );
            (StatusCode::CREATED, Json(json!({ "ticket": ticket }))).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET /api/tickets - own tickets for customers, all for staff
pub async fn list_tickets(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> impl IntoResponse {
    let user_filter = if claims.is_staff() {
        None
    } else {
        Some(claims.uid)
    };

    match ticket_service::list_tickets(&db, user_filter).await {
        Ok(tickets) => (
            StatusCode::OK,
            Json(json!({ "tickets": tickets, "count": tickets.len() })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/admin/tickets/:id/close
pub async fn close_ticket(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    if let Err(e) = claims.require_staff() {
        return e.into_response();
    }

    match ticket_service::close_ticket(&db, id).await {
        Ok(ticket) => (StatusCode::OK, Json(json!({ "ticket": ticket }))).into_response(),
        Err(e) => error_response(e),
    }
}
