use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_QUOTED: &str = "quoted";
pub const STATUS_ACCEPTED: &str = "accepted";
pub const STATUS_REJECTED: &str = "rejected";

pub const CONDITIONS: [&str; 4] = ["mint", "good", "fair", "poor"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trade_ins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub brand: String,
    pub model_name: String,
    pub condition: String,
    pub quoted_price: i64,
    pub contact: Option<String>,
    pub status: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
