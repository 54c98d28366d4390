use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[sea_orm(string_value = "purchase_approved")]
    PurchaseApproved,
    #[sea_orm(string_value = "purchase_rejected")]
    PurchaseRejected,
    #[sea_orm(string_value = "sale_approved")]
    SaleApproved,
    #[sea_orm(string_value = "sale_rejected")]
    SaleRejected,
}

/// Write-only notification sink row. This core only inserts; the
/// surrounding system reads and delivers.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub kind: NotificationKind,
    pub reference_no: String,
    pub amount: Decimal,
    pub company_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
