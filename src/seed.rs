//! Demo data seeding, enabled with SEED_DEMO=1

use chrono::Utc;
use sea_orm::*;

use crate::auth::hash_password;
use crate::models::{product, user};
use crate::services::stock_service;

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = Utc::now().to_rfc3339();

    // Admin account, skipped if one already exists
    let has_admin = user::Entity::find()
        .filter(user::Column::Role.eq(user::ROLE_ADMIN))
        .one(db)
        .await?
        .is_some();

    if !has_admin {
        let hash = hash_password("admin12345")
            .map_err(|e| DbErr::Custom(format!("password hashing failed: {}", e)))?;
        user::ActiveModel {
            username: Set("admin".to_string()),
            password_hash: Set(hash),
            role: Set(user::ROLE_ADMIN.to_string()),
            email: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        tracing::info!("Seeded default admin account");
    }

    if product::Entity::find().one(db).await?.is_some() {
        return Ok(());
    }

    let demo_products = [
        ("Samsung", "Galaxy A15", 5_490_000_i64, Some("SKU-A15")),
        ("Apple", "iPhone 13", 21_990_000, Some("SKU-IP13")),
        ("Xiaomi", "Redmi Note 13", 6_490_000, None),
    ];

    let mut product_ids = Vec::new();
    for (brand, model_name, price, sku) in demo_products {
        let saved = product::ActiveModel {
            brand: Set(brand.to_string()),
            model_name: Set(model_name.to_string()),
            category: Set("smartphone".to_string()),
            price: Set(price),
            stock_count: Set(0),
            approved: Set(true),
            sku: Set(sku.map(str::to_string)),
            image_url: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        product_ids.push(saved.id);
    }

    // A few serialized units through the stock service so counts line up
    let demo_imeis = [
        (product_ids[0], "356938035643809"),
        (product_ids[0], "356938035643810"),
        (product_ids[1], "490154203237518"),
    ];
    for (product_id, imei_number) in demo_imeis {
        if let Err(e) = stock_service::add_unit(db, product_id, imei_number, false).await {
            tracing::warn!("demo IMEI {} skipped: {:?}", imei_number, e);
        }
    }

    tracing::info!("Demo catalog seeded");
    Ok(())
}
