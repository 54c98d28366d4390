use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::DocumentStatus;

/// Sale header, the customer-side mirror of a purchase.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique per customer, not globally.
    pub reference_no: String,
    pub sold_at: DateTime<Utc>,
    pub store_id: i64,
    pub company_id: i64,
    pub customer_id: i64,
    pub user_id: i64,
    pub biller_id: i64,
    pub grand_total: Decimal,
    pub status: DocumentStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
