//! Stock Reconciliation Service
//!
//! Keeps three views of inventory truth mutually consistent: the aggregate
//! `stock_count` on a product, the per-device IMEI rows, and the append-only
//! sold-device history. Every multi-entity mutation runs in a single
//! transaction so a partially applied update is never observable.

use chrono::Utc;
use sea_orm::*;

use crate::models::imei::{self, Entity as Imei};
use crate::models::product::{self, Entity as Product};
use crate::models::sold_device;

use super::ServiceError;

/// An IMEI is exactly 15 decimal digits
pub fn validate_imei(imei: &str) -> Result<(), ServiceError> {
    if imei.len() == 15 && imei.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ServiceError::Validation(
            "IMEI must be exactly 15 digits".to_string(),
        ))
    }
}

/// Relative update of the derived stock counter, pushed down to SQL.
/// A read-then-write here would lose updates under concurrent writers.
async fn adjust_stock<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    delta: i32,
) -> Result<(), DbErr> {
    conn.execute(Statement::from_sql_and_values(
        conn.get_database_backend(),
        "UPDATE products SET stock_count = stock_count + ?, updated_at = ? WHERE id = ?",
        [
            delta.into(),
            Utc::now().to_rfc3339().into(),
            product_id.into(),
        ],
    ))
    .await?;
    Ok(())
}

fn duplicate_to_conflict(e: DbErr) -> ServiceError {
    let msg = e.to_string();
    if msg.contains("UNIQUE") {
        ServiceError::Conflict("IMEI already registered".to_string())
    } else {
        ServiceError::Database(msg)
    }
}

/// Register one serialized unit: creates an `available` IMEI row and
/// increments the product's stock count, atomically.
pub async fn add_unit(
    db: &DatabaseConnection,
    product_id: i32,
    imei_number: &str,
    registered: bool,
) -> Result<imei::Model, ServiceError> {
    validate_imei(imei_number)?;

    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if Imei::find()
        .filter(imei::Column::Imei.eq(imei_number))
        .one(db)
        .await?
        .is_some()
    {
        return Err(ServiceError::Conflict(format!(
            "IMEI {} already registered",
            imei_number
        )));
    }

    let now = Utc::now().to_rfc3339();
    let txn = db.begin().await?;

    // The UNIQUE constraint on imeis.imei is the sole concurrency guard:
    // of two racing inserts exactly one commits.
    let row = imei::ActiveModel {
        imei: Set(imei_number.to_owned()),
        product_id: Set(product_id),
        status: Set(imei::STATUS_AVAILABLE.to_owned()),
        registered: Set(registered),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(duplicate_to_conflict)?;

    adjust_stock(&txn, product_id, 1).await?;

    txn.commit().await?;
    Ok(row)
}

/// Delete an unsold unit and decrement the product's stock count.
/// Sold units are permanent history and cannot be removed.
pub async fn remove_unit(db: &DatabaseConnection, imei_id: i32) -> Result<(), ServiceError> {
    let row = Imei::find_by_id(imei_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if row.status == imei::STATUS_SOLD {
        return Err(ServiceError::InvalidState(
            "Sold units cannot be deleted".to_string(),
        ));
    }

    let product_id = row.product_id;
    let txn = db.begin().await?;

    row.delete(&txn).await?;
    adjust_stock(&txn, product_id, -1).await?;

    txn.commit().await?;
    Ok(())
}

/// Record a completed sale. The product is resolved by exact IMEI match
/// first, then by model name when the originating system does not know the
/// internal IMEI record (untracked/legacy stock). In that case the sale is
/// still recorded and stock decremented, only the IMEI transition is skipped.
pub async fn mark_sold(
    db: &DatabaseConnection,
    imei_number: &str,
    model_name: Option<&str>,
) -> Result<sold_device::Model, ServiceError> {
    let imei_row = Imei::find()
        .filter(imei::Column::Imei.eq(imei_number))
        .one(db)
        .await?;

    if let Some(row) = &imei_row {
        if row.status == imei::STATUS_SOLD {
            return Err(ServiceError::InvalidState(format!(
                "IMEI {} is already sold",
                imei_number
            )));
        }
    }

    let product = match &imei_row {
        Some(row) => Product::find_by_id(row.product_id).one(db).await?,
        None => match model_name {
            Some(name) => {
                Product::find()
                    .filter(product::Column::ModelName.eq(name))
                    .one(db)
                    .await?
            }
            None => None,
        },
    };
    let product = product.ok_or(ServiceError::NotFound)?;

    // No floor at zero: a sale of untracked stock may drive the counter
    // negative, which recompute() corrects once the units are registered.
    if product.stock_count <= 0 {
        tracing::warn!(
            "oversell on product {} ({}): stock {} before sale of IMEI {}",
            product.id,
            product.model_name,
            product.stock_count,
            imei_number
        );
    }

    let now = Utc::now().to_rfc3339();
    let txn = db.begin().await?;

    adjust_stock(&txn, product.id, -1).await?;

    if let Some(row) = imei_row {
        let mut active: imei::ActiveModel = row.into();
        active.status = Set(imei::STATUS_SOLD.to_owned());
        active.updated_at = Set(now.clone());
        active.update(&txn).await?;
    }

    let record = sold_device::ActiveModel {
        imei: Set(imei_number.to_owned()),
        product_id: Set(product.id),
        sold_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(record)
}

/// Apply a restock event. Finds the product by model name or creates it on
/// the first unit. When an IMEI number accompanies the event the row is
/// created too, without incrementing stock a second time.
pub async fn restock(
    db: &DatabaseConnection,
    model_name: &str,
    brand: Option<&str>,
    price: i64,
    imei_number: Option<&str>,
) -> Result<product::Model, ServiceError> {
    if model_name.trim().is_empty() {
        return Err(ServiceError::Validation(
            "model name is required".to_string(),
        ));
    }
    if price < 0 {
        return Err(ServiceError::Validation(
            "price must not be negative".to_string(),
        ));
    }
    if let Some(n) = imei_number {
        validate_imei(n)?;
        if Imei::find()
            .filter(imei::Column::Imei.eq(n))
            .one(db)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "IMEI {} already registered",
                n
            )));
        }
    }

    let existing = Product::find()
        .filter(product::Column::ModelName.eq(model_name))
        .one(db)
        .await?;

    let now = Utc::now().to_rfc3339();
    let txn = db.begin().await?;

    let product_id = match existing {
        Some(p) => {
            adjust_stock(&txn, p.id, 1).await?;
            // The POS is authoritative for pricing on restock
            let id = p.id;
            let mut active: product::ActiveModel = p.into();
            active.price = Set(price);
            active.updated_at = Set(now.clone());
            active.update(&txn).await?;
            id
        }
        None => {
            let created = product::ActiveModel {
                brand: Set(brand.unwrap_or("Unknown").to_owned()),
                model_name: Set(model_name.to_owned()),
                category: Set("smartphone".to_owned()),
                price: Set(price),
                stock_count: Set(1),
                approved: Set(false),
                sku: Set(None),
                image_url: Set(None),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            created.id
        }
    };

    if let Some(n) = imei_number {
        imei::ActiveModel {
            imei: Set(n.to_owned()),
            product_id: Set(product_id),
            status: Set(imei::STATUS_AVAILABLE.to_owned()),
            registered: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(duplicate_to_conflict)?;
    }

    let product = Product::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    txn.commit().await?;
    Ok(product)
}

/// Authoritative reconciliation: recount available IMEIs and overwrite the
/// cached stock count. Called after any direct edit of an IMEI row.
pub async fn recompute(db: &DatabaseConnection, product_id: i32) -> Result<i32, ServiceError> {
    let product = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let available = Imei::find()
        .filter(imei::Column::ProductId.eq(product_id))
        .filter(imei::Column::Status.eq(imei::STATUS_AVAILABLE))
        .count(db)
        .await? as i32;

    let mut active: product::ActiveModel = product.into();
    active.stock_count = Set(available);
    active.updated_at = Set(Utc::now().to_rfc3339());
    active.update(db).await?;

    Ok(available)
}
