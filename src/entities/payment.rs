use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::DocumentStatus;

/// Which aggregate a payment settles against. Closed-set replacement
/// for the source system's `paymentable_type` string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PayableKind {
    #[sea_orm(string_value = "purchase")]
    Purchase,
    #[sea_orm(string_value = "sale")]
    Sale,
}

/// Partial-payment ledger record. Append-only: corrections are made by
/// recording an offsetting payment, never by editing this row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub paid_at: DateTime<Utc>,
    /// Unique per payable, not globally.
    pub reference_no: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub payable_kind: PayableKind,
    pub payable_id: i64,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
