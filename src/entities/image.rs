use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Closed set of aggregates that may own attachment images. Replaces
/// the source system's `imageable_type` string discriminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ImageOwner {
    #[sea_orm(string_value = "purchase")]
    Purchase,
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "product")]
    Product,
    #[sea_orm(string_value = "pre_order")]
    PreOrder,
    #[sea_orm(string_value = "pre_order_item")]
    PreOrderItem,
    #[sea_orm(string_value = "receipt")]
    Receipt,
    #[sea_orm(string_value = "receipt_item")]
    ReceiptItem,
}

/// Attachment metadata. The bytes live in object storage; this row
/// only records the storage key.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_kind: ImageOwner,
    pub owner_id: i64,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
