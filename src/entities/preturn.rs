use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::DocumentStatus;

/// Purchase return ledger record. Only approved rows count toward the
/// owning purchase's `returned_amount`. Carries at most one attachment
/// inline rather than an image collection (kept asymmetric with
/// payments on purpose).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "preturns")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub returned_at: DateTime<Utc>,
    pub reference_no: String,
    pub amount: Decimal,
    pub purchase_id: i64,
    pub note: Option<String>,
    pub status: DocumentStatus,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase::Entity",
        from = "Column::PurchaseId",
        to = "super::purchase::Column::Id"
    )]
    Purchase,
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchase.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
