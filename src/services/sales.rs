//! Sale aggregate: the customer-side mirror of the purchase aggregate.
//! Sales have no returns and no payment terms; their computed view
//! folds in payments only.

use chrono::{DateTime, Utc};
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
    sale, DocumentStatus,
};
use crate::errors::ServiceError;

use super::notifications::NotificationSink;
use super::payments::approved_paid_amount;
use super::purchases::{apply_image_mode, ImageEditMode, LineItemInput, LineItemPatch};
use super::{
    delete_image_rows, delete_objects, image_paths, insert_image_rows, inventory,
    upload_attachments, AttachmentUpload, ServiceContext,
};

#[derive(Debug)]
pub struct CreateSaleInput {
    pub sold_at: DateTime<Utc>,
    pub reference_no: String,
    pub store_id: i64,
    pub customer_id: i64,
    pub biller_id: i64,
    pub note: Option<String>,
    pub items: Vec<LineItemInput>,
    pub attachments: Vec<AttachmentUpload>,
}

#[derive(Debug)]
pub struct UpdateSaleInput {
    pub sold_at: DateTime<Utc>,
    pub reference_no: String,
    pub customer_id: i64,
    pub biller_id: i64,
    pub note: Option<String>,
    pub items: Vec<LineItemPatch>,
    pub image_mode: ImageEditMode,
    pub attachments: Vec<AttachmentUpload>,
}

/// Read model for every sale query path. `total_amount` equals
/// `grand_total` (sales have no return ledger) and is reported anyway
/// so purchase and sale views stay shape-compatible.
#[derive(Debug, Serialize)]
pub struct SaleView {
    #[serde(flatten)]
    pub sale: sale::Model,
    pub items: Vec<order_line::Model>,
    pub images: Vec<String>,
    pub paid_amount: Decimal,
    pub total_amount: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Default, Clone)]
pub struct SaleFilter {
    pub customer_id: Option<i64>,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct SaleService {
    ctx: ServiceContext,
    notifications: NotificationSink,
}

impl SaleService {
    pub fn new(ctx: ServiceContext, notifications: NotificationSink) -> Self {
        Self { ctx, notifications }
    }

    /// Creates a sale, decrementing store stock per line. Under the
    /// permissive stock policy a sale may drive a level negative; the
    /// strict policy rejects it with `InsufficientStock` and rolls the
    /// whole document back.
    #[instrument(skip(self, input), fields(reference_no = %input.reference_no))]
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        input: CreateSaleInput,
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

        ensure_unique_reference(&txn, &input.reference_no, input.customer_id, None).await?;

        let status = if actor.is_secretary() {
            DocumentStatus::Pending
        } else {
            DocumentStatus::Approved
        };

        let grand_total: Decimal = input
            .items
            .iter()
            .map(|item| item.unit_amount * Decimal::from(item.quantity))
            .sum();

        let header = sale::ActiveModel {
            reference_no: Set(input.reference_no.clone()),
            sold_at: Set(input.sold_at),
            store_id: Set(input.store_id),
            company_id: Set(actor.company_id),
            customer_id: Set(input.customer_id),
            user_id: Set(actor.id),
            biller_id: Set(input.biller_id),
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
                OwnerKind::Sale,
                header.id,
                item.product_id,
                item.unit_amount,
                item.quantity,
                subtotal,
                None,
            )
            .await?;
            inventory::apply_stock_delta(
                &txn,
                input.store_id,
                item.product_id,
                -item.quantity,
                self.ctx.stock_policy,
            )
            .await?;
        }

        insert_image_rows(&txn, ImageOwner::Sale, header.id, &keys).await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(sale_id = header.id, "sale created");
        Ok(header.id)
    }

    /// Same diff-by-id semantics as the purchase update, with the stock
    /// direction inverted: edited lines adjust stock by
    /// `-(new − old)`, new lines subtract their full quantity, dropped
    /// lines leave stock untouched, and a line reassigned to another
    /// product restores the old product's level before drawing down
    /// the new one.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
        input: UpdateSaleInput,
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
        let existing = find_sale(db, id).await?;
        if !actor.can_access_company(existing.company_id) {
            return Err(ServiceError::Permission(
                "sale belongs to another company".to_string(),
            ));
        }

        let new_keys = upload_attachments(&self.ctx.storage, &input.attachments).await;

        let txn = self
            .ctx
            .db
            .begin()
            .await
            .map_err(ServiceError::db_error)?;

        ensure_unique_reference(&txn, &input.reference_no, input.customer_id, Some(id)).await?;

        let store_id = existing.store_id;
        let current_lines = order_line::Entity::find()
            .filter(order_line::Column::OwnerKind.eq(OwnerKind::Sale))
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
                    active.update(&txn).await.map_err(ServiceError::db_error)?;
                    if patch.product_id == old_product_id {
                        inventory::apply_stock_delta(
                            &txn,
                            store_id,
                            patch.product_id,
                            -(patch.quantity - old_quantity),
                            self.ctx.stock_policy,
                        )
                        .await?;
                    } else {
                        // Reassigned line: the old product gets its
                        // sold quantity back, the new product is
                        // drawn down by the full new quantity.
                        inventory::apply_stock_delta(
                            &txn,
                            store_id,
                            old_product_id,
                            old_quantity,
                            StockPolicy::Permissive,
                        )
                        .await?;
                        inventory::apply_stock_delta(
                            &txn,
                            store_id,
                            patch.product_id,
                            -patch.quantity,
                            self.ctx.stock_policy,
                        )
                        .await?;
                    }
                }
                None => {
                    inventory::insert_line(
                        &txn,
                        OwnerKind::Sale,
                        id,
                        patch.product_id,
                        patch.unit_amount,
                        patch.quantity,
                        subtotal,
                        None,
                    )
                    .await?;
                    inventory::apply_stock_delta(
                        &txn,
                        store_id,
                        patch.product_id,
                        -patch.quantity,
                        self.ctx.stock_policy,
                    )
                    .await?;
                }
            }
        }

        for (line_id, _) in by_id {
            order_line::Entity::delete_by_id(line_id)
                .exec(&txn)
                .await
                .map_err(ServiceError::db_error)?;
        }

        let surviving = order_line::Entity::find()
            .filter(order_line::Column::OwnerKind.eq(OwnerKind::Sale))
            .filter(order_line::Column::OwnerId.eq(id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        let grand_total: Decimal = surviving.iter().map(|l| l.subtotal).sum();

        let removed_keys =
            apply_image_mode(&txn, ImageOwner::Sale, id, &input.image_mode, &new_keys).await?;

        let mut active: sale::ActiveModel = existing.into();
        active.reference_no = Set(input.reference_no);
        active.sold_at = Set(input.sold_at);
        active.customer_id = Set(input.customer_id);
        active.biller_id = Set(input.biller_id);
        active.grand_total = Set(grand_total);
        active.note = Set(input.note);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        delete_objects(&self.ctx.storage, &removed_keys).await;

        info!(sale_id = id, "sale updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &AuthenticatedUser, id: i64) -> Result<(), ServiceError> {
        let db = self.ctx.db.as_ref();
        let existing = find_sale(db, id).await?;

        if actor.is_secretary() && existing.status != DocumentStatus::Pending {
            return Err(ServiceError::Permission(
                "secretaries may only delete pending sales".to_string(),
            ));
        }
        if !actor.can_access_company(existing.company_id) {
            return Err(ServiceError::Permission(
                "sale belongs to another company".to_string(),
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

        let removed = inventory::delete_owner_lines(&txn, OwnerKind::Sale, id).await?;
        for (product_id, quantity) in removed {
            // Returning sold quantity to stock, never blocked.
            inventory::apply_stock_delta(
                &txn,
                store_id,
                product_id,
                quantity,
                StockPolicy::Permissive,
            )
            .await?;
        }

        let mut object_keys = Vec::new();

        let payments = payment::Entity::find()
            .filter(payment::Column::PayableKind.eq(PayableKind::Sale))
            .filter(payment::Column::PayableId.eq(id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        for p in &payments {
            object_keys.extend(delete_image_rows(&txn, ImageOwner::Payment, p.id).await?);
        }
        payment::Entity::delete_many()
            .filter(payment::Column::PayableKind.eq(PayableKind::Sale))
            .filter(payment::Column::PayableId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        object_keys.extend(delete_image_rows(&txn, ImageOwner::Sale, id).await?);

        sale::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        if was_pending && actor.is_admin() {
            self.notifications
                .notify(
                    NotificationKind::SaleRejected,
                    &existing.reference_no,
                    existing.grand_total,
                    existing.company_id,
                )
                .await;
        }

        delete_objects(&self.ctx.storage, &object_keys).await;

        info!(sale_id = id, "sale deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn approve(&self, actor: &AuthenticatedUser, id: i64) -> Result<(), ServiceError> {
        if actor.is_secretary() {
            return Err(ServiceError::Permission(
                "secretaries cannot approve sales".to_string(),
            ));
        }

        let db = self.ctx.db.as_ref();
        let existing = find_sale(db, id).await?;
        let reference_no = existing.reference_no.clone();
        let grand_total = existing.grand_total;
        let company_id = existing.company_id;

        let mut active: sale::ActiveModel = existing.into();
        active.status = Set(DocumentStatus::Approved);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::db_error)?;

        self.notifications
            .notify(
                NotificationKind::SaleApproved,
                &reference_no,
                grand_total,
                company_id,
            )
            .await;

        info!(sale_id = id, "sale approved");
        Ok(())
    }

    pub async fn get(&self, actor: &AuthenticatedUser, id: i64) -> Result<SaleView, ServiceError> {
        let db = self.ctx.db.as_ref();
        let model = find_sale(db, id).await?;
        if !actor.can_access_company(model.company_id) {
            return Err(ServiceError::Permission(
                "sale belongs to another company".to_string(),
            ));
        }
        compute_view(db, model).await
    }

    pub async fn list(
        &self,
        actor: &AuthenticatedUser,
        filter: SaleFilter,
    ) -> Result<(Vec<SaleView>, u64), ServiceError> {
        let db = self.ctx.db.as_ref();

        let mut query = sale::Entity::find();
        if !actor.is_admin() {
            query = query.filter(sale::Column::CompanyId.eq(actor.company_id));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(sale::Column::CustomerId.eq(customer_id));
        }
        query = query.order_by_desc(sale::Column::SoldAt);

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

async fn find_sale<C: ConnectionTrait>(conn: &C, id: i64) -> Result<sale::Model, ServiceError> {
    sale::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("sale {id} not found")))
}

async fn ensure_unique_reference<C: ConnectionTrait>(
    conn: &C,
    reference_no: &str,
    customer_id: i64,
    exclude_id: Option<i64>,
) -> Result<(), ServiceError> {
    let mut query = sale::Entity::find()
        .filter(sale::Column::ReferenceNo.eq(reference_no))
        .filter(sale::Column::CustomerId.eq(customer_id));
    if let Some(id) = exclude_id {
        query = query.filter(sale::Column::Id.ne(id));
    }
    let existing = query.one(conn).await.map_err(ServiceError::db_error)?;
    if existing.is_some() {
        return Err(ServiceError::DuplicateReference(format!(
            "sale {reference_no} already exists for customer {customer_id}"
        )));
    }
    Ok(())
}

async fn compute_view<C: ConnectionTrait>(
    conn: &C,
    model: sale::Model,
) -> Result<SaleView, ServiceError> {
    let items = order_line::Entity::find()
        .filter(order_line::Column::OwnerKind.eq(OwnerKind::Sale))
        .filter(order_line::Column::OwnerId.eq(model.id))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;
    let images = image_paths(conn, ImageOwner::Sale, model.id).await?;

    let paid_amount = approved_paid_amount(conn, PayableKind::Sale, model.id).await?;
    let total_amount = model.grand_total;
    let balance = total_amount - paid_amount;

    Ok(SaleView {
        sale: model,
        items,
        images,
        paid_amount,
        total_amount,
        balance,
    })
}
