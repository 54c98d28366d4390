use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Requested line of a pre-order. `subtotal` is computed at write time
/// as (cost − parsed discount) × quantity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pre_order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub pre_order_id: i64,
    pub product_id: i64,
    pub cost: Decimal,
    pub quantity: i32,
    /// Raw discount as entered; flat amount or percentage string.
    pub discount: Option<String>,
    pub category_id: Option<i64>,
    pub subtotal: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pre_order::Entity",
        from = "Column::PreOrderId",
        to = "super::pre_order::Column::Id"
    )]
    PreOrder,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(has_many = "super::receipt_item::Entity")]
    ReceiptItems,
}

impl Related<super::pre_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PreOrder.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::receipt_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReceiptItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
