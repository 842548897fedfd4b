use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only record of a completed sale. The IMEI value is captured at
/// sale time so the row outlives the IMEI record itself.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sold_devices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub imei: String,
    pub product_id: i32,
    pub sold_at: String,
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
