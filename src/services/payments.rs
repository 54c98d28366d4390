//! Payment ledger: append-only partial payments against a purchase or
//! a sale. There is deliberately no update or delete surface —
//! corrections are recorded as offsetting payments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tracing::{info, instrument};

use crate::auth::AuthenticatedUser;
use crate::entities::{
    image::ImageOwner,
    payment::{self, PayableKind},
    purchase, sale, DocumentStatus,
};
use crate::errors::ServiceError;

use super::{insert_image_rows, upload_attachments, AttachmentUpload, ServiceContext};

#[derive(Debug)]
pub struct RecordPaymentInput {
    pub paid_at: DateTime<Utc>,
    pub reference_no: String,
    pub payable_kind: PayableKind,
    pub payable_id: i64,
    pub amount: Decimal,
    pub note: Option<String>,
    pub attachments: Vec<AttachmentUpload>,
}

#[derive(Clone)]
pub struct PaymentService {
    ctx: ServiceContext,
}

impl PaymentService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Records a partial payment. Secretary-created payments start
    /// pending; everyone else's are approved immediately.
    #[instrument(skip(self, input), fields(reference_no = %input.reference_no))]
    pub async fn record(
        &self,
        actor: &AuthenticatedUser,
        input: RecordPaymentInput,
    ) -> Result<i64, ServiceError> {
        if input.reference_no.trim().is_empty() {
            return Err(ServiceError::Validation(
                "reference_no is required".to_string(),
            ));
        }

        let db = self.ctx.db.as_ref();
        payable_company(db, input.payable_kind, input.payable_id).await?;

        // Best-effort uploads happen outside the transaction; a failed
        // upload is logged and skipped, never rolled into the outcome.
        let keys = upload_attachments(&self.ctx.storage, &input.attachments).await;

        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let duplicate = payment::Entity::find()
            .filter(payment::Column::ReferenceNo.eq(input.reference_no.clone()))
            .filter(payment::Column::PayableKind.eq(input.payable_kind))
            .filter(payment::Column::PayableId.eq(input.payable_id))
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        if duplicate.is_some() {
            return Err(ServiceError::DuplicateReference(format!(
                "payment {} already exists for this {:?}",
                input.reference_no, input.payable_kind
            )));
        }

        let status = if actor.is_secretary() {
            DocumentStatus::Pending
        } else {
            DocumentStatus::Approved
        };

        let created = payment::ActiveModel {
            paid_at: Set(input.paid_at),
            reference_no: Set(input.reference_no.clone()),
            amount: Set(input.amount),
            note: Set(input.note),
            payable_kind: Set(input.payable_kind),
            payable_id: Set(input.payable_id),
            status: Set(status),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::db_error)?;

        insert_image_rows(&txn, ImageOwner::Payment, created.id, &keys).await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(payment_id = created.id, "payment recorded");
        Ok(created.id)
    }

    /// Approves a pending payment, letting it count into the payable's
    /// paid amount.
    #[instrument(skip(self))]
    pub async fn approve(&self, actor: &AuthenticatedUser, id: i64) -> Result<(), ServiceError> {
        if actor.is_secretary() {
            return Err(ServiceError::Permission(
                "secretaries cannot approve payments".to_string(),
            ));
        }

        let db = self.ctx.db.as_ref();
        let existing = payment::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("payment {id} not found")))?;

        let mut active: payment::ActiveModel = existing.into();
        active.status = Set(DocumentStatus::Approved);
        active.update(db).await.map_err(ServiceError::db_error)?;

        info!(payment_id = id, "payment approved");
        Ok(())
    }

    /// Payment history for one payable, newest first.
    pub async fn list_for(
        &self,
        actor: &AuthenticatedUser,
        payable_kind: PayableKind,
        payable_id: i64,
    ) -> Result<Vec<payment::Model>, ServiceError> {
        let company_id =
            payable_company(self.ctx.db.as_ref(), payable_kind, payable_id).await?;
        if !actor.can_access_company(company_id) {
            return Err(ServiceError::Permission(
                "payable belongs to another company".to_string(),
            ));
        }

        payment::Entity::find()
            .filter(payment::Column::PayableKind.eq(payable_kind))
            .filter(payment::Column::PayableId.eq(payable_id))
            .order_by_desc(payment::Column::PaidAt)
            .all(self.ctx.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }
}

/// Resolves the payable's owning company, or `NotFound` when no such
/// purchase or sale exists.
async fn payable_company<C: ConnectionTrait>(
    conn: &C,
    kind: PayableKind,
    id: i64,
) -> Result<i64, ServiceError> {
    let company_id = match kind {
        PayableKind::Purchase => purchase::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .map(|model| model.company_id),
        PayableKind::Sale => sale::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .map(|model| model.company_id),
    };

    company_id.ok_or_else(|| ServiceError::NotFound(format!("{kind:?} {id} not found")))
}

/// Sum of approved payments against one payable. Every read path that
/// reports `paid_amount` goes through here so all endpoints agree.
pub async fn approved_paid_amount<C: ConnectionTrait>(
    conn: &C,
    kind: PayableKind,
    payable_id: i64,
) -> Result<Decimal, ServiceError> {
    let rows = payment::Entity::find()
        .filter(payment::Column::PayableKind.eq(kind))
        .filter(payment::Column::PayableId.eq(payable_id))
        .filter(payment::Column::Status.eq(DocumentStatus::Approved))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(rows.iter().map(|row| row.amount).sum())
}
