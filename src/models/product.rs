use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub brand: String,
    pub model_name: String,
    pub category: String,
    /// Unit price in the smallest currency denomination
    pub price: i64,
    /// Derived cache of available IMEIs, reconciled by the stock service
    pub stock_count: i32,
    pub approved: bool,
    /// External identifier assigned by the POS
    pub sku: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::imei::Entity")]
    Imeis,
    #[sea_orm(has_many = "super::sold_device::Entity")]
    SoldDevices,
}

impl Related<super::imei::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Imeis.def()
    }
}

impl Related<super::sold_device::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SoldDevices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API requests/responses
#[derive(Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<i32>,
    pub brand: String,
    pub model_name: String,
    pub category: Option<String>,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_count: Option<i32>,
    pub approved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            brand: model.brand,
            model_name: model.model_name,
            category: Some(model.category),
            price: model.price,
            stock_count: Some(model.stock_count),
            approved: Some(model.approved),
            sku: model.sku,
            image_url: model.image_url,
        }
    }
}

impl From<Product> for ActiveModel {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.map_or(NotSet, Set),
            brand: Set(product.brand),
            model_name: Set(product.model_name),
            category: product.category.map_or(NotSet, Set),
            price: Set(product.price),
            stock_count: product.stock_count.map_or(NotSet, Set),
            approved: product.approved.map_or(NotSet, Set),
            sku: Set(product.sku),
            image_url: Set(product.image_url),
            created_at: NotSet,
            updated_at: NotSet,
        }
    }
}
