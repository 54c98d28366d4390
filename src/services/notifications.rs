//! Notification sink collaborator.
//!
//! Fire-and-forget: this core only inserts rows for the surrounding
//! system to deliver, and a failed insert is logged rather than failing
//! the operation that triggered it.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue::Set};
use std::sync::Arc;
use tracing::warn;

use crate::db::DbPool;
use crate::entities::notification::{self, NotificationKind};

#[derive(Clone)]
pub struct NotificationSink {
    db: Arc<DbPool>,
}

impl NotificationSink {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn notify(
        &self,
        kind: NotificationKind,
        reference_no: &str,
        amount: Decimal,
        company_id: i64,
    ) {
        let result = notification::ActiveModel {
            kind: Set(kind),
            reference_no: Set(reference_no.to_string()),
            amount: Set(amount),
            company_id: Set(company_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await;

        if let Err(err) = result {
            warn!(?kind, reference_no, error = %err, "failed to record notification");
        }
    }
}
