use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which aggregate a ledger line belongs to. Replaces the source
/// system's string-typed `orderable_type` discriminator with a closed
/// set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    #[sea_orm(string_value = "purchase")]
    Purchase,
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "receipt")]
    Receipt,
}

impl OwnerKind {
    /// Sign this owner contributes to stock: purchases and receipts add
    /// inventory, sales remove it.
    pub fn direction(self) -> i32 {
        match self {
            OwnerKind::Purchase | OwnerKind::Receipt => 1,
            OwnerKind::Sale => -1,
        }
    }
}

/// Inventory ledger line: one product quantity attributed to a purchase
/// or a sale. Append-only except during an explicit edit-and-reconcile
/// of the owning document.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_kind: OwnerKind,
    pub owner_id: i64,
    pub product_id: i64,
    /// Unit cost for purchase lines, unit price for sale lines.
    pub unit_amount: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
    /// Purchase-side only.
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
