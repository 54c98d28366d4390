use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Received line of a receipt, pointing back at the pre-order item it
/// fulfills. `amount` = (cost − parsed discount) × quantity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receipt_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub receipt_id: i64,
    pub pre_order_item_id: i64,
    pub product_id: i64,
    pub cost: Decimal,
    pub quantity: i32,
    pub amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::receipt::Entity",
        from = "Column::ReceiptId",
        to = "super::receipt::Column::Id"
    )]
    Receipt,
    #[sea_orm(
        belongs_to = "super::pre_order_item::Entity",
        from = "Column::PreOrderItemId",
        to = "super::pre_order_item::Column::Id"
    )]
    PreOrderItem,
}

impl Related<super::receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipt.def()
    }
}

impl Related<super::pre_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PreOrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
