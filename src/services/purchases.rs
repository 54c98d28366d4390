//! Purchase aggregate: header + order lines + stock projection, edited
//! together in one transaction, plus the computed view that folds in
//! approved payments and returns.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, instrument};

use crate::auth::AuthenticatedUser;
use crate::config::StockPolicy;
use crate::entities::{
    image::ImageOwner,
    notification::NotificationKind,
    order_line::{self, OwnerKind},
    payment::{self, PayableKind},
    preturn, purchase, DocumentStatus,
};
use crate::errors::ServiceError;

use super::notifications::NotificationSink;
use super::payments::approved_paid_amount;
use super::preturns::approved_returned_amount;
use super::{
    delete_image_rows, delete_objects, image_paths, insert_image_rows, inventory,
    upload_attachments, AttachmentUpload, ServiceContext,
};

#[derive(Debug, Clone)]
pub struct LineItemInput {
    pub product_id: i64,
    pub unit_amount: Decimal,
    pub quantity: i32,
    pub expiry_date: Option<NaiveDate>,
}

/// Line item in an update request. `id` present means "edit this
/// existing line in place"; absent means "insert as new".
#[derive(Debug, Clone)]
pub struct LineItemPatch {
    pub id: Option<i64>,
    pub product_id: i64,
    pub unit_amount: Decimal,
    pub quantity: i32,
    pub expiry_date: Option<NaiveDate>,
}

/// How an update treats the document's existing attachments.
#[derive(Debug, Clone, Default)]
pub enum ImageEditMode {
    /// Leave attachments as they are; new uploads are ignored.
    #[default]
    Keep,
    /// Drop every existing attachment and store the new uploads.
    ReplaceAll,
    /// Drop attachments whose stored path is absent from the list, then
    /// store the new uploads.
    Retain(Vec<String>),
}

#[derive(Debug)]
pub struct CreatePurchaseInput {
    pub purchased_at: DateTime<Utc>,
    pub reference_no: String,
    pub store_id: i64,
    pub supplier_id: i64,
    pub credit_days: i32,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub note: Option<String>,
    pub items: Vec<LineItemInput>,
    pub attachments: Vec<AttachmentUpload>,
}

#[derive(Debug)]
pub struct UpdatePurchaseInput {
    pub purchased_at: DateTime<Utc>,
    pub reference_no: String,
    pub supplier_id: i64,
    pub credit_days: i32,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub note: Option<String>,
    pub items: Vec<LineItemPatch>,
    pub image_mode: ImageEditMode,
    pub attachments: Vec<AttachmentUpload>,
}

/// Read model returned by every purchase query path. The three derived
/// amounts are re-aggregated from the payment and return ledgers on
/// each read so all endpoints agree.
#[derive(Debug, Serialize)]
pub struct PurchaseView {
    #[serde(flatten)]
    pub purchase: purchase::Model,
    pub items: Vec<order_line::Model>,
    pub images: Vec<String>,
    pub paid_amount: Decimal,
    pub returned_amount: Decimal,
    /// grand_total minus approved returns.
    pub total_amount: Decimal,
    /// total_amount minus approved payments.
    pub balance: Decimal,
}

#[derive(Debug, Default, Clone)]
pub struct PurchaseFilter {
    pub supplier_id: Option<i64>,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct PurchaseService {
    ctx: ServiceContext,
    notifications: NotificationSink,
}

impl PurchaseService {
    pub fn new(ctx: ServiceContext, notifications: NotificationSink) -> Self {
        Self { ctx, notifications }
    }

    #[instrument(skip(self, input), fields(reference_no = %input.reference_no))]
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        input: CreatePurchaseInput,
    ) -> Result<i64, ServiceError> {
        if input.reference_no.trim().is_empty() {
            return Err(ServiceError::Validation(
                "reference_no is required".to_string(),
            ));
        }
        if input.items.is_empty() {
            return Err(ServiceError::Validation(
                "at least one line item is required".to_string(),
            ));
        }

        let keys = upload_attachments(&self.ctx.storage, &input.attachments).await;

        let txn = self
            .ctx
            .db
            .begin()
            .await
            .map_err(ServiceError::db_error)?;

        ensure_unique_reference(&txn, &input.reference_no, input.supplier_id, None).await?;

        let status = if actor.is_secretary() {
            DocumentStatus::Pending
        } else {
            DocumentStatus::Approved
        };

        let item_total: Decimal = input
            .items
            .iter()
            .map(|item| item.unit_amount * Decimal::from(item.quantity))
            .sum();
        let grand_total = item_total - input.discount + input.shipping;

        let header = purchase::ActiveModel {
            reference_no: Set(input.reference_no.clone()),
            purchased_at: Set(input.purchased_at),
            store_id: Set(input.store_id),
            company_id: Set(actor.company_id),
            supplier_id: Set(input.supplier_id),
            user_id: Set(actor.id),
            credit_days: Set(Some(input.credit_days)),
            payment_due_at: Set(Some(
                input.purchased_at + Duration::days(i64::from(input.credit_days)),
            )),
            discount: Set(input.discount),
            shipping: Set(input.shipping),
            grand_total: Set(grand_total),
            status: Set(status),
            note: Set(input.note),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::db_error)?;

        for item in &input.items {
            let subtotal = item.unit_amount * Decimal::from(item.quantity);
            inventory::insert_line(
                &txn,
                OwnerKind::Purchase,
                header.id,
                item.product_id,
                item.unit_amount,
                item.quantity,
                subtotal,
                item.expiry_date,
            )
            .await?;
            inventory::apply_stock_delta(
                &txn,
                input.store_id,
                item.product_id,
                item.quantity,
                self.ctx.stock_policy,
            )
            .await?;
        }

        insert_image_rows(&txn, ImageOwner::Purchase, header.id, &keys).await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(purchase_id = header.id, "purchase created");
        Ok(header.id)
    }

    /// Edits header and line items together. The line-item set is
    /// diffed by id: dropped lines are removed without reversing their
    /// stock contribution, new lines add their full quantity, and
    /// edited lines adjust stock by the quantity delta. A line
    /// reassigned to another product reverses its old product's
    /// quantity and adds the full new quantity so both projections
    /// keep matching the ledger. That dropped lines keep their stock
    /// is long-standing behavior callers depend on.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
        input: UpdatePurchaseInput,
    ) -> Result<(), ServiceError> {
        if input.reference_no.trim().is_empty() {
            return Err(ServiceError::Validation(
                "reference_no is required".to_string(),
            ));
        }
        if input.items.is_empty() {
            return Err(ServiceError::Validation(
                "at least one line item is required".to_string(),
            ));
        }

        let db = self.ctx.db.as_ref();
        let existing = find_purchase(db, id).await?;
        if !actor.can_access_company(existing.company_id) {
            return Err(ServiceError::Permission(
                "purchase belongs to another company".to_string(),
            ));
        }

        let new_keys = upload_attachments(&self.ctx.storage, &input.attachments).await;

        let txn = self
            .ctx
            .db
            .begin()
            .await
            .map_err(ServiceError::db_error)?;

        ensure_unique_reference(&txn, &input.reference_no, input.supplier_id, Some(id)).await?;

        let store_id = existing.store_id;
        let current_lines = order_line::Entity::find()
            .filter(order_line::Column::OwnerKind.eq(OwnerKind::Purchase))
            .filter(order_line::Column::OwnerId.eq(id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        let mut by_id: HashMap<i64, order_line::Model> =
            current_lines.into_iter().map(|l| (l.id, l)).collect();

        for patch in &input.items {
            let subtotal = patch.unit_amount * Decimal::from(patch.quantity);
            match patch.id.and_then(|line_id| by_id.remove(&line_id)) {
                Some(line) => {
                    let old_product_id = line.product_id;
                    let old_quantity = line.quantity;
                    let mut active: order_line::ActiveModel = line.into();
                    active.product_id = Set(patch.product_id);
                    active.unit_amount = Set(patch.unit_amount);
                    active.quantity = Set(patch.quantity);
                    active.subtotal = Set(subtotal);
                    active.expiry_date = Set(patch.expiry_date);
                    active.update(&txn).await.map_err(ServiceError::db_error)?;
                    if patch.product_id == old_product_id {
                        inventory::apply_stock_delta(
                            &txn,
                            store_id,
                            patch.product_id,
                            patch.quantity - old_quantity,
                            self.ctx.stock_policy,
                        )
                        .await?;
                    } else {
                        // The line moved to another product: the old
                        // product gives back its full contribution and
                        // the new one takes the full new quantity.
                        inventory::apply_stock_delta(
                            &txn,
                            store_id,
                            old_product_id,
                            -old_quantity,
                            StockPolicy::Permissive,
                        )
                        .await?;
                        inventory::apply_stock_delta(
                            &txn,
                            store_id,
                            patch.product_id,
                            patch.quantity,
                            self.ctx.stock_policy,
                        )
                        .await?;
                    }
                }
                None => {
                    inventory::insert_line(
                        &txn,
                        OwnerKind::Purchase,
                        id,
                        patch.product_id,
                        patch.unit_amount,
                        patch.quantity,
                        subtotal,
                        patch.expiry_date,
                    )
                    .await?;
                    inventory::apply_stock_delta(
                        &txn,
                        store_id,
                        patch.product_id,
                        patch.quantity,
                        self.ctx.stock_policy,
                    )
                    .await?;
                }
            }
        }

        // Lines absent from the incoming set are dropped; their stock
        // contribution stays.
        for (line_id, _) in by_id {
            order_line::Entity::delete_by_id(line_id)
                .exec(&txn)
                .await
                .map_err(ServiceError::db_error)?;
        }

        let surviving = order_line::Entity::find()
            .filter(order_line::Column::OwnerKind.eq(OwnerKind::Purchase))
            .filter(order_line::Column::OwnerId.eq(id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        let item_total: Decimal = surviving.iter().map(|l| l.subtotal).sum();
        let grand_total = item_total - input.discount + input.shipping;

        let removed_keys =
            apply_image_mode(&txn, ImageOwner::Purchase, id, &input.image_mode, &new_keys).await?;

        let mut active: purchase::ActiveModel = existing.into();
        active.reference_no = Set(input.reference_no);
        active.purchased_at = Set(input.purchased_at);
        active.supplier_id = Set(input.supplier_id);
        active.credit_days = Set(Some(input.credit_days));
        active.payment_due_at = Set(Some(
            input.purchased_at + Duration::days(i64::from(input.credit_days)),
        ));
        active.discount = Set(input.discount);
        active.shipping = Set(input.shipping);
        active.grand_total = Set(grand_total);
        active.note = Set(input.note);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        delete_objects(&self.ctx.storage, &removed_keys).await;

        info!(purchase_id = id, "purchase updated");
        Ok(())
    }

    /// Deletes the header and everything it owns: order lines (with
    /// their stock contribution reversed), payments and their images,
    /// returns, and the purchase's own images. If the document was
    /// still pending and an admin removed it, a rejection notification
    /// is emitted.
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &AuthenticatedUser, id: i64) -> Result<(), ServiceError> {
        let db = self.ctx.db.as_ref();
        let existing = find_purchase(db, id).await?;

        if actor.is_secretary() && existing.status != DocumentStatus::Pending {
            return Err(ServiceError::Permission(
                "secretaries may only delete pending purchases".to_string(),
            ));
        }
        if !actor.can_access_company(existing.company_id) {
            return Err(ServiceError::Permission(
                "purchase belongs to another company".to_string(),
            ));
        }

        let was_pending = existing.status == DocumentStatus::Pending;
        let store_id = existing.store_id;

        let txn = self
            .ctx
            .db
            .begin()
            .await
            .map_err(ServiceError::db_error)?;

        let removed = inventory::delete_owner_lines(&txn, OwnerKind::Purchase, id).await?;
        for (product_id, quantity) in removed {
            // Reversal never trips the strict policy.
            inventory::apply_stock_delta(
                &txn,
                store_id,
                product_id,
                -quantity,
                StockPolicy::Permissive,
            )
            .await?;
        }

        let mut object_keys = Vec::new();

        let payments = payment::Entity::find()
            .filter(payment::Column::PayableKind.eq(PayableKind::Purchase))
            .filter(payment::Column::PayableId.eq(id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        for p in &payments {
            object_keys.extend(delete_image_rows(&txn, ImageOwner::Payment, p.id).await?);
        }
        payment::Entity::delete_many()
            .filter(payment::Column::PayableKind.eq(PayableKind::Purchase))
            .filter(payment::Column::PayableId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        let preturns = preturn::Entity::find()
            .filter(preturn::Column::PurchaseId.eq(id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        object_keys.extend(preturns.iter().filter_map(|r| r.attachment.clone()));
        preturn::Entity::delete_many()
            .filter(preturn::Column::PurchaseId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        object_keys.extend(delete_image_rows(&txn, ImageOwner::Purchase, id).await?);

        purchase::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        if was_pending && actor.is_admin() {
            self.notifications
                .notify(
                    NotificationKind::PurchaseRejected,
                    &existing.reference_no,
                    existing.grand_total,
                    existing.company_id,
                )
                .await;
        }

        delete_objects(&self.ctx.storage, &object_keys).await;

        info!(purchase_id = id, "purchase deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn approve(&self, actor: &AuthenticatedUser, id: i64) -> Result<(), ServiceError> {
        if actor.is_secretary() {
            return Err(ServiceError::Permission(
                "secretaries cannot approve purchases".to_string(),
            ));
        }

        let db = self.ctx.db.as_ref();
        let existing = find_purchase(db, id).await?;
        let reference_no = existing.reference_no.clone();
        let grand_total = existing.grand_total;
        let company_id = existing.company_id;

        let mut active: purchase::ActiveModel = existing.into();
        active.status = Set(DocumentStatus::Approved);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::db_error)?;

        self.notifications
            .notify(
                NotificationKind::PurchaseApproved,
                &reference_no,
                grand_total,
                company_id,
            )
            .await;

        info!(purchase_id = id, "purchase approved");
        Ok(())
    }

    pub async fn get(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
    ) -> Result<PurchaseView, ServiceError> {
        let db = self.ctx.db.as_ref();
        let model = find_purchase(db, id).await?;
        if !actor.can_access_company(model.company_id) {
            return Err(ServiceError::Permission(
                "purchase belongs to another company".to_string(),
            ));
        }
        compute_view(db, model).await
    }

    /// Paginated search. Non-admins only see their own company's
    /// purchases. Returns the page plus the total match count.
    pub async fn list(
        &self,
        actor: &AuthenticatedUser,
        filter: PurchaseFilter,
    ) -> Result<(Vec<PurchaseView>, u64), ServiceError> {
        let db = self.ctx.db.as_ref();

        let mut query = purchase::Entity::find();
        if !actor.is_admin() {
            query = query.filter(purchase::Column::CompanyId.eq(actor.company_id));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(purchase::Column::SupplierId.eq(supplier_id));
        }
        query = query.order_by_desc(purchase::Column::PurchasedAt);

        let per_page = filter.per_page.max(1);
        let paginator = query.paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let page = filter.page.max(1) - 1;
        let models = paginator
            .fetch_page(page)
            .await
            .map_err(ServiceError::db_error)?;

        let mut views = Vec::with_capacity(models.len());
        for model in models {
            views.push(compute_view(db, model).await?);
        }
        Ok((views, total))
    }
}

async fn find_purchase<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<purchase::Model, ServiceError> {
    purchase::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("purchase {id} not found")))
}

async fn ensure_unique_reference<C: ConnectionTrait>(
    conn: &C,
    reference_no: &str,
    supplier_id: i64,
    exclude_id: Option<i64>,
) -> Result<(), ServiceError> {
    let mut query = purchase::Entity::find()
        .filter(purchase::Column::ReferenceNo.eq(reference_no))
        .filter(purchase::Column::SupplierId.eq(supplier_id));
    if let Some(id) = exclude_id {
        query = query.filter(purchase::Column::Id.ne(id));
    }
    let existing = query.one(conn).await.map_err(ServiceError::db_error)?;
    if existing.is_some() {
        return Err(ServiceError::DuplicateReference(format!(
            "purchase {reference_no} already exists for supplier {supplier_id}"
        )));
    }
    Ok(())
}

/// Applies an update's attachment mode, returning the stored keys whose
/// rows were removed so the caller can delete the objects after commit.
pub(crate) async fn apply_image_mode<C: ConnectionTrait>(
    conn: &C,
    owner_kind: ImageOwner,
    owner_id: i64,
    mode: &ImageEditMode,
    new_keys: &[String],
) -> Result<Vec<String>, ServiceError> {
    match mode {
        ImageEditMode::Keep => Ok(Vec::new()),
        ImageEditMode::ReplaceAll => {
            let removed = delete_image_rows(conn, owner_kind, owner_id).await?;
            insert_image_rows(conn, owner_kind, owner_id, new_keys).await?;
            Ok(removed)
        }
        ImageEditMode::Retain(kept) => {
            let current = image_paths(conn, owner_kind, owner_id).await?;
            let removed: Vec<String> = current
                .into_iter()
                .filter(|path| !kept.contains(path))
                .collect();
            for path in &removed {
                crate::entities::image::Entity::delete_many()
                    .filter(crate::entities::image::Column::OwnerKind.eq(owner_kind))
                    .filter(crate::entities::image::Column::OwnerId.eq(owner_id))
                    .filter(crate::entities::image::Column::Path.eq(path.clone()))
                    .exec(conn)
                    .await
                    .map_err(ServiceError::db_error)?;
            }
            insert_image_rows(conn, owner_kind, owner_id, new_keys).await?;
            Ok(removed)
        }
    }
}

/// Builds the computed view: line items plus the three derived amounts
/// re-aggregated from the payment and return ledgers.
pub(crate) async fn compute_view<C: ConnectionTrait>(
    conn: &C,
    model: purchase::Model,
) -> Result<PurchaseView, ServiceError> {
    let items = order_line::Entity::find()
        .filter(order_line::Column::OwnerKind.eq(OwnerKind::Purchase))
        .filter(order_line::Column::OwnerId.eq(model.id))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;
    let images = image_paths(conn, ImageOwner::Purchase, model.id).await?;

    let paid_amount = approved_paid_amount(conn, PayableKind::Purchase, model.id).await?;
    let returned_amount = approved_returned_amount(conn, model.id).await?;
    let total_amount = model.grand_total - returned_amount;
    let balance = total_amount - paid_amount;

    Ok(PurchaseView {
        purchase: model,
        items,
        images,
        paid_amount,
        returned_amount,
        total_amount,
        balance,
    })
}
