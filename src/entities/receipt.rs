use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase receipt: one (possibly partial) receiving event against a
/// pre-order. A pre-order may accumulate any number of receipts; the
/// displayed received amount is the running sum of their totals.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receipts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub pre_order_id: i64,
    pub store_id: i64,
    pub company_id: i64,
    pub supplier_id: i64,
    /// Unique per supplier among receipts, independent of the
    /// pre-order's own reference.
    pub reference_no: String,
    pub shipping_carrier: Option<String>,
    pub received_at: DateTime<Utc>,
    pub total_amount: Decimal,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pre_order::Entity",
        from = "Column::PreOrderId",
        to = "super::pre_order::Column::Id"
    )]
    PreOrder,
    #[sea_orm(has_many = "super::receipt_item::Entity")]
    Items,
}

impl Related<super::pre_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PreOrder.def()
    }
}

impl Related<super::receipt_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
