//! Shopping cart operations

use sea_orm::*;

use crate::models::cart_item::{self, Entity as CartItem};
use crate::models::product::Entity as Product;

use super::ServiceError;

/// Cart line enriched with catalog data
#[derive(Debug, Clone, serde::Serialize)]
pub struct CartLine {
    pub product_id: i32,
    pub brand: String,
    pub model_name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub line_total: i64,
}

pub async fn list_cart(db: &DatabaseConnection, user_id: i32) -> Result<Vec<CartLine>, ServiceError> {
    let rows = CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .find_also_related(Product)
        .all(db)
        .await?;

    let lines = rows
        .into_iter()
        .filter_map(|(item, product)| {
            product.map(|p| CartLine {
                product_id: p.id,
                brand: p.brand,
                model_name: p.model_name,
                unit_price: p.price,
                quantity: item.quantity,
                line_total: p.price * item.quantity as i64,
            })
        })
        .collect();

    Ok(lines)
}

/// Add a product to the cart, merging with an existing line
pub async fn add_to_cart(
    db: &DatabaseConnection,
    user_id: i32,
    product_id: i32,
    quantity: i32,
) -> Result<(), ServiceError> {
    if quantity < 1 {
        return Err(ServiceError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }

    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let existing = CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(db)
        .await?;

    match existing {
        Some(item) => {
            let merged = item.quantity + quantity;
            let mut active: cart_item::ActiveModel = item.into();
            active.quantity = Set(merged);
            active.update(db).await?;
        }
        None => {
            cart_item::ActiveModel {
                user_id: Set(user_id),
                product_id: Set(product_id),
                quantity: Set(quantity),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    Ok(())
}

pub async fn set_quantity(
    db: &DatabaseConnection,
    user_id: i32,
    product_id: i32,
    quantity: i32,
) -> Result<(), ServiceError> {
    if quantity < 1 {
        return Err(ServiceError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }

    let item = CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let mut active: cart_item::ActiveModel = item.into();
    active.quantity = Set(quantity);
    active.update(db).await?;

    Ok(())
}

pub async fn remove_from_cart(
    db: &DatabaseConnection,
    user_id: i32,
    product_id: i32,
) -> Result<(), ServiceError> {
    let item = CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    item.delete(db).await?;
    Ok(())
}

/// Empty a user's cart; generic over the connection so checkout can run it
/// inside its transaction.
pub async fn clear_cart<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<(), ServiceError> {
    CartItem::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(())
}
