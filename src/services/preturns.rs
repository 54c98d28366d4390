//! Return ledger: partial returns against a purchase. Approved rows
//! reduce the purchase's effective total. Unlike payments, a return
//! carries at most one attachment inline on the row, and the record is
//! editable; no guard compares the amount against the purchase's
//! outstanding balance (over-returning is legal).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder,
};
use tracing::{info, instrument};

use crate::auth::AuthenticatedUser;
use crate::entities::{preturn, purchase, DocumentStatus};
use crate::errors::ServiceError;
use crate::storage;

use super::{upload_attachments, AttachmentUpload, ServiceContext};

#[derive(Debug)]
pub struct CreatePreturnInput {
    pub returned_at: DateTime<Utc>,
    pub reference_no: String,
    pub purchase_id: i64,
    pub amount: Decimal,
    pub note: Option<String>,
    pub attachment: Option<AttachmentUpload>,
}

#[derive(Debug)]
pub struct UpdatePreturnInput {
    pub returned_at: DateTime<Utc>,
    pub reference_no: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub attachment: Option<AttachmentUpload>,
}

#[derive(Clone)]
pub struct PreturnService {
    ctx: ServiceContext,
}

impl PreturnService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, input), fields(reference_no = %input.reference_no))]
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        input: CreatePreturnInput,
    ) -> Result<i64, ServiceError> {
        if input.reference_no.trim().is_empty() {
            return Err(ServiceError::Validation(
                "reference_no is required".to_string(),
            ));
        }

        let db = self.ctx.db.as_ref();
        purchase::Entity::find_by_id(input.purchase_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("purchase {} not found", input.purchase_id))
            })?;

        let attachment_key = match &input.attachment {
            Some(upload) => upload_attachments(&self.ctx.storage, std::slice::from_ref(upload))
                .await
                .pop(),
            None => None,
        };

        let status = if actor.is_secretary() {
            DocumentStatus::Pending
        } else {
            DocumentStatus::Approved
        };

        let created = preturn::ActiveModel {
            returned_at: Set(input.returned_at),
            reference_no: Set(input.reference_no),
            amount: Set(input.amount),
            purchase_id: Set(input.purchase_id),
            note: Set(input.note),
            status: Set(status),
            attachment: Set(attachment_key),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(preturn_id = created.id, "purchase return recorded");
        Ok(created.id)
    }

    /// Approves a pending return; its amount starts counting into the
    /// purchase's returned total.
    #[instrument(skip(self))]
    pub async fn approve(&self, actor: &AuthenticatedUser, id: i64) -> Result<(), ServiceError> {
        if actor.is_secretary() {
            return Err(ServiceError::Permission(
                "secretaries cannot approve returns".to_string(),
            ));
        }

        let db = self.ctx.db.as_ref();
        let existing = find_preturn(db, id).await?;

        let mut active: preturn::ActiveModel = existing.into();
        active.status = Set(DocumentStatus::Approved);
        active.update(db).await.map_err(ServiceError::db_error)?;

        info!(preturn_id = id, "purchase return approved");
        Ok(())
    }

    /// Replaces the record's fields. A new attachment supersedes the
    /// old one; the replaced object is cleaned up best-effort.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        _actor: &AuthenticatedUser,
        id: i64,
        input: UpdatePreturnInput,
    ) -> Result<(), ServiceError> {
        if input.reference_no.trim().is_empty() {
            return Err(ServiceError::Validation(
                "reference_no is required".to_string(),
            ));
        }

        let db = self.ctx.db.as_ref();
        let existing = find_preturn(db, id).await?;
        let previous_attachment = existing.attachment.clone();

        let new_key = match &input.attachment {
            Some(upload) => upload_attachments(&self.ctx.storage, std::slice::from_ref(upload))
                .await
                .pop(),
            None => None,
        };

        let mut active: preturn::ActiveModel = existing.into();
        active.returned_at = Set(input.returned_at);
        active.reference_no = Set(input.reference_no);
        active.amount = Set(input.amount);
        active.note = Set(input.note);
        if let Some(key) = new_key.clone() {
            active.attachment = Set(Some(key));
        }
        active.update(db).await.map_err(ServiceError::db_error)?;

        if new_key.is_some() {
            if let Some(old) = previous_attachment {
                storage::delete_best_effort(self.ctx.storage.as_ref(), &old).await;
            }
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, _actor: &AuthenticatedUser, id: i64) -> Result<(), ServiceError> {
        let db = self.ctx.db.as_ref();
        let existing = find_preturn(db, id).await?;
        let attachment = existing.attachment.clone();

        preturn::Entity::delete_by_id(id)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        if let Some(key) = attachment {
            storage::delete_best_effort(self.ctx.storage.as_ref(), &key).await;
        }

        info!(preturn_id = id, "purchase return deleted");
        Ok(())
    }

    pub async fn list_for_purchase(
        &self,
        actor: &AuthenticatedUser,
        purchase_id: i64,
    ) -> Result<Vec<preturn::Model>, ServiceError> {
        let db = self.ctx.db.as_ref();
        let parent = purchase::Entity::find_by_id(purchase_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("purchase {purchase_id} not found"))
            })?;
        if !actor.can_access_company(parent.company_id) {
            return Err(ServiceError::Permission(
                "purchase belongs to another company".to_string(),
            ));
        }

        preturn::Entity::find()
            .filter(preturn::Column::PurchaseId.eq(purchase_id))
            .order_by_desc(preturn::Column::ReturnedAt)
            .all(self.ctx.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }
}

async fn find_preturn<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<preturn::Model, ServiceError> {
    preturn::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("return {id} not found")))
}

/// Sum of approved returns against one purchase. The single source for
/// `returned_amount` on every read path.
pub async fn approved_returned_amount<C: ConnectionTrait>(
    conn: &C,
    purchase_id: i64,
) -> Result<Decimal, ServiceError> {
    let rows = preturn::Entity::find()
        .filter(preturn::Column::PurchaseId.eq(purchase_id))
        .filter(preturn::Column::Status.eq(DocumentStatus::Approved))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(rows.iter().map(|row| row.amount).sum())
}
