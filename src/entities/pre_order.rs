use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pre-order header: what was requested from a supplier. Immutable
/// reference for later receipts; cannot be deleted once any receipt
/// points at it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pre_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub ordered_at: DateTime<Utc>,
    /// Unique per supplier, independent of receipt references.
    pub reference_no: String,
    pub company_id: i64,
    pub supplier_id: i64,
    /// Raw header-level discount as entered ("5" or "10%").
    pub discount: Option<String>,
    pub note: Option<String>,
    pub grand_total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pre_order_item::Entity")]
    Items,
    #[sea_orm(has_many = "super::receipt::Entity")]
    Receipts,
}

impl Related<super::pre_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
