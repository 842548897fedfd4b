use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_AVAILABLE: &str = "available";
pub const STATUS_SOLD: &str = "sold";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "imeis")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// 15-digit device identifier, globally unique
    pub imei: String,
    pub product_id: i32,
    /// 'available' or 'sold'; the only transition is available -> sold
    pub status: String,
    pub registered: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
