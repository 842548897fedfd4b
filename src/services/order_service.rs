//! Order operations: checkout from cart, listing, status updates, deletion
//! guards that protect sales history.

use chrono::Utc;
use sea_orm::*;

use crate::models::cart_item::{self, Entity as CartItem};
use crate::models::order::{self, Entity as Order};
use crate::models::order_item::{self, Entity as OrderItem};
use crate::models::product::Entity as Product;

use super::{cart_service, ServiceError};

/// Order enriched with its line items
#[derive(Debug, serde::Serialize)]
pub struct OrderWithItems {
    pub id: i32,
    pub user_id: i32,
    pub total: i64,
    pub status: String,
    pub created_at: String,
    pub items: Vec<order_item::Model>,
}

fn with_items(order: order::Model, items: Vec<order_item::Model>) -> OrderWithItems {
    OrderWithItems {
        id: order.id,
        user_id: order.user_id,
        total: order.total,
        status: order.status,
        created_at: order.created_at,
        items,
    }
}

/// Create an order from the user's cart. Each line captures the product's
/// current price so later catalog edits cannot rewrite sales history. The
/// cart is cleared in the same transaction.
pub async fn checkout(db: &DatabaseConnection, user_id: i32) -> Result<OrderWithItems, ServiceError> {
    let cart = CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .find_also_related(Product)
        .all(db)
        .await?;

    if cart.is_empty() {
        return Err(ServiceError::Validation("cart is empty".to_string()));
    }

    let now = Utc::now().to_rfc3339();
    let txn = db.begin().await?;

    let mut total: i64 = 0;
    let mut lines = Vec::with_capacity(cart.len());
    for (item, product) in &cart {
        let product = product.as_ref().ok_or(ServiceError::NotFound)?;
        total += product.price * item.quantity as i64;
        lines.push((product.id, item.quantity, product.price));
    }

    let saved = order::ActiveModel {
        user_id: Set(user_id),
        total: Set(total),
        status: Set(order::STATUS_PENDING.to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (product_id, quantity, unit_price) in lines {
        let saved_item = order_item::ActiveModel {
            order_id: Set(saved.id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            unit_price: Set(unit_price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(saved_item);
    }

    cart_service::clear_cart(&txn, user_id).await?;

    txn.commit().await?;
    Ok(with_items(saved, items))
}

/// List orders, optionally restricted to one user (customer view)
pub async fn list_orders(
    db: &DatabaseConnection,
    user_id: Option<i32>,
) -> Result<Vec<OrderWithItems>, ServiceError> {
    let mut query = Order::find().order_by_desc(order::Column::CreatedAt);

    if let Some(user_id) = user_id {
        query = query.filter(order::Column::UserId.eq(user_id));
    }

    let orders = query.find_with_related(OrderItem).all(db).await?;

    Ok(orders
        .into_iter()
        .map(|(order, items)| with_items(order, items))
        .collect())
}

pub async fn get_order(
    db: &DatabaseConnection,
    id: i32,
    user_id: Option<i32>,
) -> Result<OrderWithItems, ServiceError> {
    let order = Order::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    // Customers can only see their own orders
    if let Some(user_id) = user_id {
        if order.user_id != user_id {
            return Err(ServiceError::NotFound);
        }
    }

    let items = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(id))
        .all(db)
        .await?;

    Ok(with_items(order, items))
}

pub async fn update_status(
    db: &DatabaseConnection,
    id: i32,
    status: &str,
) -> Result<order::Model, ServiceError> {
    if !order::STATUSES.contains(&status) {
        return Err(ServiceError::Validation(format!(
            "unknown order status '{}'",
            status
        )));
    }

    let existing = Order::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let mut active: order::ActiveModel = existing.into();
    active.status = Set(status.to_owned());
    active.updated_at = Set(Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

/// Remove the line items of a cancelled order so it becomes deletable
pub async fn clear_items(db: &DatabaseConnection, id: i32) -> Result<u64, ServiceError> {
    Order::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let res = OrderItem::delete_many()
        .filter(order_item::Column::OrderId.eq(id))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

/// Delete an order. Refused while line items exist, guarding sales history.
pub async fn delete_order(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let order = Order::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let item_count = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(id))
        .count(db)
        .await?;
    if item_count > 0 {
        return Err(ServiceError::Conflict(format!(
            "order still has {} line item(s)",
            item_count
        )));
    }

    order.delete(db).await?;
    Ok(())
}
