pub mod image;
pub mod notification;
pub mod order_line;
pub mod payment;
pub mod pre_order;
pub mod pre_order_item;
pub mod preturn;
pub mod product;
pub mod purchase;
pub mod receipt;
pub mod receipt_item;
pub mod sale;
pub mod stock_level;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Approval status shared by purchases, sales, payments, and returns.
/// Documents created by a secretary start out pending and must be
/// approved separately; everyone else's are approved on creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
}

impl DocumentStatus {
    pub fn is_approved(self) -> bool {
        matches!(self, DocumentStatus::Approved)
    }
}
