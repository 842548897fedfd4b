//! Support ticket operations

use chrono::Utc;
use sea_orm::*;

use crate::models::ticket::{self, Entity as Ticket};

use super::ServiceError;

pub async fn create_ticket(
    db: &DatabaseConnection,
    user_id: Option<i32>,
    subject: &str,
    body: &str,
) -> Result<ticket::Model, ServiceError> {
    if subject.trim().is_empty() || body.trim().is_empty() {
        return Err(ServiceError::Validation(
            "subject and body are required".to_string(),
        ));
    }

    let now = Utc::now().to_rfc3339();
    let saved = ticket::ActiveModel {
        user_id: Set(user_id),
        subject: Set(subject.to_owned()),
        body: Set(body.to_owned()),
        status: Set(ticket::STATUS_OPEN.to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(saved)
}

/// List tickets, optionally restricted to one user (customer view)
pub async fn list_tickets(
    db: &DatabaseConnection,
    user_id: Option<i32>,
) -> Result<Vec<ticket::Model>, ServiceError> {
    let mut query = Ticket::find().order_by_desc(ticket::Column::CreatedAt);

    if let Some(user_id) = user_id {
        query = query.filter(ticket::Column::UserId.eq(user_id));
    }

    Ok(query.all(db).await?)
}

pub async fn close_ticket(db: &DatabaseConnection, id: i32) -> Result<ticket::Model, ServiceError> {
    let existing = Ticket::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if existing.status == ticket::STATUS_CLOSED {
        return Err(ServiceError::InvalidState(
            "Ticket is already closed".to_string(),
        ));
    }

    let mut active: ticket::ActiveModel = existing.into();
    active.status = Set(ticket::STATUS_CLOSED.to_owned());
    active.updated_at = Set(Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}
