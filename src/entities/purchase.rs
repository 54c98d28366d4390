use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::DocumentStatus;

/// Purchase header. `status` is approval state only; `credit_days` is
/// the independent payment-terms field (None means terms have not been
/// agreed yet).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique per supplier, not globally.
    pub reference_no: String,
    pub purchased_at: DateTime<Utc>,
    pub store_id: i64,
    pub company_id: i64,
    pub supplier_id: i64,
    pub user_id: i64,
    pub credit_days: Option<i32>,
    /// purchased_at + credit_days, derived at write time.
    pub payment_due_at: Option<DateTime<Utc>>,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub grand_total: Decimal,
    pub status: DocumentStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::preturn::Entity")]
    Preturns,
}

impl Related<super::preturn::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Preturns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
