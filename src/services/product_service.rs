//! Product catalog operations

use chrono::Utc;
use sea_orm::*;

use crate::models::imei::{self, Entity as Imei};
use crate::models::product::{self, Entity as ProductEntity, Product};
use crate::models::sold_device::{self, Entity as SoldDevice};

use super::ServiceError;

/// Filter parameters for listing products
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub brand: Option<String>,
    pub category: Option<String>,
    pub approved: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, serde::Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

pub async fn list_products(
    db: &DatabaseConnection,
    filter: ProductFilter,
) -> Result<ProductPage, ServiceError> {
    let mut condition = Condition::all();

    if let Some(brand) = filter.brand {
        condition = condition.add(product::Column::Brand.eq(brand));
    }
    if let Some(category) = filter.category {
        condition = condition.add(product::Column::Category.eq(category));
    }
    if let Some(approved) = filter.approved {
        condition = condition.add(product::Column::Approved.eq(approved));
    }

    let page = filter.page.unwrap_or(1).max(1);
    let per_page = filter.per_page.unwrap_or(50).clamp(1, 200);

    let paginator = ProductEntity::find()
        .filter(condition)
        .order_by_asc(product::Column::ModelName)
        .paginate(db, per_page);

    let total = paginator.num_items().await?;
    let products = paginator
        .fetch_page(page - 1)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ProductPage {
        products,
        total,
        page,
        per_page,
    })
}

pub async fn get_product(db: &DatabaseConnection, id: i32) -> Result<Product, ServiceError> {
    let model = ProductEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;
    Ok(Product::from(model))
}

fn validate(dto: &Product) -> Result<(), ServiceError> {
    if dto.brand.trim().is_empty() || dto.model_name.trim().is_empty() {
        return Err(ServiceError::Validation(
            "brand and model name are required".to_string(),
        ));
    }
    if dto.price < 0 {
        return Err(ServiceError::Validation(
            "price must not be negative".to_string(),
        ));
    }
    if let Some(stock) = dto.stock_count {
        if stock < 0 {
            return Err(ServiceError::Validation(
                "stock must not be negative".to_string(),
            ));
        }
    }
    Ok(())
}

pub async fn create_product(
    db: &DatabaseConnection,
    dto: Product,
) -> Result<Product, ServiceError> {
    validate(&dto)?;

    let now = Utc::now().to_rfc3339();
    let mut active = product::ActiveModel::from(dto);
    active.id = NotSet;
    if active.stock_count.is_not_set() {
        active.stock_count = Set(0);
    }
    if active.category.is_not_set() {
        active.category = Set("smartphone".to_string());
    }
    if active.approved.is_not_set() {
        active.approved = Set(false);
    }
    active.created_at = Set(now.clone());
    active.updated_at = Set(now);

    let model = active.insert(db).await?;
    Ok(Product::from(model))
}

pub async fn update_product(
    db: &DatabaseConnection,
    id: i32,
    dto: Product,
) -> Result<Product, ServiceError> {
    validate(&dto)?;

    let existing = ProductEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let mut active: product::ActiveModel = existing.into();
    active.brand = Set(dto.brand);
    active.model_name = Set(dto.model_name);
    if let Some(category) = dto.category {
        active.category = Set(category);
    }
    active.price = Set(dto.price);
    if let Some(approved) = dto.approved {
        active.approved = Set(approved);
    }
    active.sku = Set(dto.sku);
    active.image_url = Set(dto.image_url);
    active.updated_at = Set(Utc::now().to_rfc3339());

    let model = active.update(db).await?;
    Ok(Product::from(model))
}

/// Delete a product. Refused while IMEI rows or sold history still reference
/// it, so sales records can never be orphaned.
pub async fn delete_product(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let product = ProductEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let imei_count = Imei::find()
        .filter(imei::Column::ProductId.eq(id))
        .count(db)
        .await?;
    if imei_count > 0 {
        return Err(ServiceError::Conflict(format!(
            "{} IMEI record(s) still reference this product",
            imei_count
        )));
    }

    let sold = SoldDevice::find()
        .filter(sold_device::Column::ProductId.eq(id))
        .count(db)
        .await?;
    if sold > 0 {
        return Err(ServiceError::Conflict(format!(
            "{} sold device(s) still reference this product",
            sold
        )));
    }

    product.delete(db).await?;
    Ok(())
}

/// Descriptor consumed by the bulk import endpoint, keyed by SKU
#[derive(Debug, serde::Deserialize)]
pub struct ImportEntry {
    pub sku: Option<String>,
    pub brand: Option<String>,
    pub model_name: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
}

/// Upsert price and stock per SKU. Entries without a SKU are skipped.
/// Returns the number of processed records.
pub async fn import_products(
    db: &DatabaseConnection,
    entries: Vec<ImportEntry>,
) -> Result<usize, ServiceError> {
    let now = Utc::now().to_rfc3339();
    let mut processed = 0;

    for entry in entries {
        let Some(sku) = entry.sku.filter(|s| !s.trim().is_empty()) else {
            continue;
        };

        if entry.price.is_some_and(|p| p < 0) {
            return Err(ServiceError::Validation(format!(
                "SKU {}: price must not be negative",
                sku
            )));
        }
        if entry.stock.is_some_and(|s| s < 0) {
            return Err(ServiceError::Validation(format!(
                "SKU {}: stock must not be negative",
                sku
            )));
        }

        let existing = ProductEntity::find()
            .filter(product::Column::Sku.eq(&sku))
            .one(db)
            .await?;

        match existing {
            Some(p) => {
                let mut active: product::ActiveModel = p.into();
                if let Some(price) = entry.price {
                    active.price = Set(price);
                }
                if let Some(stock) = entry.stock {
                    active.stock_count = Set(stock);
                }
                active.updated_at = Set(now.clone());
                active.update(db).await?;
            }
            None => {
                product::ActiveModel {
                    brand: Set(entry.brand.unwrap_or_else(|| "Unknown".to_string())),
                    model_name: Set(entry.model_name.unwrap_or_else(|| sku.clone())),
                    category: Set("smartphone".to_string()),
                    price: Set(entry.price.unwrap_or(0)),
                    stock_count: Set(entry.stock.unwrap_or(0)),
                    approved: Set(false),
                    sku: Set(Some(sku)),
                    image_url: Set(None),
                    created_at: Set(now.clone()),
                    updated_at: Set(now.clone()),
                    ..Default::default()
                }
                .insert(db)
                .await?;
            }
        }
        processed += 1;
    }

    Ok(processed)
}
