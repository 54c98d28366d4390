//! Receiving workflow: pre-orders (what was requested from a supplier)
//! and the receipts that later land against them. A pre-order can be
//! received piecemeal across any number of receipts; each receipt
//! writes purchase-direction ledger lines and bumps store stock inside
//! its own transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::auth::AuthenticatedUser;
use crate::config::StockPolicy;
use crate::entities::{
    image::ImageOwner,
    order_line::OwnerKind,
    pre_order, pre_order_item, receipt, receipt_item,
};
use crate::errors::ServiceError;

use super::{
    delete_image_rows, delete_objects, image_paths, insert_image_rows, inventory,
    upload_attachments, AttachmentUpload, ServiceContext,
};

/// Parses the raw discount field shared by pre-order items and receipt
/// lines. A trimmed value ending in `%` is a percentage of `cost`;
/// anything else is a flat amount. Unparseable input resolves to zero —
/// silently, which downstream data depends on.
pub fn parse_discount(raw: Option<&str>, cost: Decimal) -> Decimal {
    let Some(raw) = raw else {
        return Decimal::ZERO;
    };
    let trimmed = raw.trim();
    if let Some(prefix) = trimmed.strip_suffix('%') {
        match prefix.trim().parse::<Decimal>() {
            Ok(percent) => cost * percent / Decimal::from(100),
            Err(_) => Decimal::ZERO,
        }
    } else {
        trimmed.parse::<Decimal>().unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone)]
pub struct PreOrderItemInput {
    pub product_id: i64,
    pub cost: Decimal,
    pub quantity: i32,
    /// Raw discount: flat amount or percentage string ("10%").
    pub discount: Option<String>,
    pub category_id: Option<i64>,
}

#[derive(Debug)]
pub struct CreatePreOrderInput {
    pub ordered_at: DateTime<Utc>,
    pub reference_no: String,
    pub supplier_id: i64,
    pub discount: Option<String>,
    pub note: Option<String>,
    pub items: Vec<PreOrderItemInput>,
    pub attachments: Vec<AttachmentUpload>,
}

#[derive(Debug)]
pub struct UpdatePreOrderInput {
    pub ordered_at: DateTime<Utc>,
    pub reference_no: String,
    pub supplier_id: i64,
    pub discount: Option<String>,
    pub note: Option<String>,
    pub items: Vec<PreOrderItemInput>,
}

#[derive(Debug, Clone)]
pub struct ReceiveItemInput {
    pub pre_order_item_id: i64,
    pub cost: Decimal,
    pub quantity: i32,
    pub discount: Option<String>,
}

#[derive(Debug)]
pub struct ReceiveInput {
    pub received_at: DateTime<Utc>,
    pub reference_no: String,
    pub store_id: i64,
    pub shipping_carrier: Option<String>,
    pub note: Option<String>,
    pub items: Vec<ReceiveItemInput>,
}

/// Pre-order line with its running received quantity across receipts.
#[derive(Debug, Serialize)]
pub struct PreOrderItemView {
    #[serde(flatten)]
    pub item: pre_order_item::Model,
    pub received_quantity: i64,
}

/// Pre-order detail view; `received_amount` is the sum of the totals of
/// every receipt landed against it so far.
#[derive(Debug, Serialize)]
pub struct PreOrderView {
    #[serde(flatten)]
    pub pre_order: pre_order::Model,
    pub items: Vec<PreOrderItemView>,
    pub images: Vec<String>,
    pub received_amount: Decimal,
}

#[derive(Debug, Default, Clone)]
pub struct PreOrderFilter {
    pub supplier_id: Option<i64>,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct ReceivingService {
    ctx: ServiceContext,
}

impl ReceivingService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Creates a pre-order. Item subtotals apply the per-item discount
    /// against cost; the header discount is applied against the item
    /// sum. No stock moves until a receipt lands.
    #[instrument(skip(self, input), fields(reference_no = %input.reference_no))]
    pub async fn create_pre_order(
        &self,
        actor: &AuthenticatedUser,
        input: CreatePreOrderInput,
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

        ensure_unique_pre_order(&txn, &input.reference_no, input.supplier_id, None).await?;

        let item_total: Decimal = input
            .items
            .iter()
            .map(|item| item_subtotal(item))
            .sum();
        let header_discount = parse_discount(input.discount.as_deref(), item_total);
        let grand_total = item_total - header_discount;

        let header = pre_order::ActiveModel {
            user_id: Set(actor.id),
            ordered_at: Set(input.ordered_at),
            reference_no: Set(input.reference_no.clone()),
            company_id: Set(actor.company_id),
            supplier_id: Set(input.supplier_id),
            discount: Set(input.discount),
            note: Set(input.note),
            grand_total: Set(grand_total),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::db_error)?;

        for item in &input.items {
            insert_pre_order_item(&txn, header.id, item).await?;
        }

        insert_image_rows(&txn, ImageOwner::PreOrder, header.id, &keys).await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(pre_order_id = header.id, "pre-order created");
        Ok(header.id)
    }

    /// Replaces the full item set (delete-all, re-insert). Receipts
    /// already landed keep pointing at the item ids they captured, so
    /// this is only safe before receiving starts; the source system
    /// behaves the same way.
    #[instrument(skip(self, input))]
    pub async fn update_pre_order(
        &self,
        _actor: &AuthenticatedUser,
        id: i64,
        input: UpdatePreOrderInput,
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
        let existing = find_pre_order(db, id).await?;

        let txn = self
            .ctx
            .db
            .begin()
            .await
            .map_err(ServiceError::db_error)?;

        ensure_unique_pre_order(&txn, &input.reference_no, input.supplier_id, Some(id)).await?;

        pre_order_item::Entity::delete_many()
            .filter(pre_order_item::Column::PreOrderId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        for item in &input.items {
            insert_pre_order_item(&txn, id, item).await?;
        }

        let item_total: Decimal = input.items.iter().map(|item| item_subtotal(item)).sum();
        let header_discount = parse_discount(input.discount.as_deref(), item_total);

        let mut active: pre_order::ActiveModel = existing.into();
        active.ordered_at = Set(input.ordered_at);
        active.reference_no = Set(input.reference_no);
        active.supplier_id = Set(input.supplier_id);
        active.discount = Set(input.discount);
        active.note = Set(input.note);
        active.grand_total = Set(item_total - header_discount);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(pre_order_id = id, "pre-order updated");
        Ok(())
    }

    /// A pre-order with receipt history is immutable-by-deletion.
    #[instrument(skip(self))]
    pub async fn delete_pre_order(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
    ) -> Result<(), ServiceError> {
        if actor.is_secretary() {
            return Err(ServiceError::Permission(
                "secretaries cannot delete pre-orders".to_string(),
            ));
        }

        let db = self.ctx.db.as_ref();
        find_pre_order(db, id).await?;

        let receipt_count = receipt::Entity::find()
            .filter(receipt::Column::PreOrderId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if receipt_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "pre-order {id} has {receipt_count} receipt(s) and cannot be deleted"
            )));
        }

        let txn = self
            .ctx
            .db
            .begin()
            .await
            .map_err(ServiceError::db_error)?;

        let mut object_keys = Vec::new();

        let items = pre_order_item::Entity::find()
            .filter(pre_order_item::Column::PreOrderId.eq(id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        for item in &items {
            object_keys
                .extend(delete_image_rows(&txn, ImageOwner::PreOrderItem, item.id).await?);
        }
        pre_order_item::Entity::delete_many()
            .filter(pre_order_item::Column::PreOrderId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        object_keys.extend(delete_image_rows(&txn, ImageOwner::PreOrder, id).await?);

        pre_order::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        delete_objects(&self.ctx.storage, &object_keys).await;

        info!(pre_order_id = id, "pre-order deleted");
        Ok(())
    }

    /// Lands a receipt against a pre-order. Within one transaction:
    /// inserts the receipt and its lines, copies the originating
    /// pre-order item's images onto each receipt line, writes
    /// purchase-direction ledger lines, and bumps store stock.
    /// Over-receiving past the ordered quantity is not rejected.
    #[instrument(skip(self, input), fields(reference_no = %input.reference_no))]
    pub async fn receive(
        &self,
        actor: &AuthenticatedUser,
        pre_order_id: i64,
        input: ReceiveInput,
    ) -> Result<i64, ServiceError> {
        if input.reference_no.trim().is_empty() {
            return Err(ServiceError::Validation(
                "reference_no is required".to_string(),
            ));
        }
        if input.items.is_empty() {
            return Err(ServiceError::Validation(
                "at least one received item is required".to_string(),
            ));
        }

        let db = self.ctx.db.as_ref();
        let pre_order = find_pre_order(db, pre_order_id).await?;

        let txn = self
            .ctx
            .db
            .begin()
            .await
            .map_err(ServiceError::db_error)?;

        ensure_unique_receipt(&txn, &input.reference_no, pre_order.supplier_id, None).await?;

        let header = receipt::ActiveModel {
            pre_order_id: Set(pre_order_id),
            store_id: Set(input.store_id),
            company_id: Set(actor.company_id),
            supplier_id: Set(pre_order.supplier_id),
            reference_no: Set(input.reference_no.clone()),
            shipping_carrier: Set(input.shipping_carrier),
            received_at: Set(input.received_at),
            total_amount: Set(Decimal::ZERO),
            note: Set(input.note),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::db_error)?;

        let mut total_amount = Decimal::ZERO;
        for item in &input.items {
            let ordered = pre_order_item::Entity::find_by_id(item.pre_order_item_id)
                .one(&txn)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "pre-order item {} not found",
                        item.pre_order_item_id
                    ))
                })?;

            let discount = parse_discount(item.discount.as_deref(), item.cost);
            let amount = (item.cost - discount) * Decimal::from(item.quantity);
            total_amount += amount;

            let line = receipt_item::ActiveModel {
                receipt_id: Set(header.id),
                pre_order_item_id: Set(ordered.id),
                product_id: Set(ordered.product_id),
                cost: Set(item.cost),
                quantity: Set(item.quantity),
                amount: Set(amount),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::db_error)?;

            // Carry the requested item's attachments onto the received
            // line.
            let inherited = image_paths(&txn, ImageOwner::PreOrderItem, ordered.id).await?;
            insert_image_rows(&txn, ImageOwner::ReceiptItem, line.id, &inherited).await?;

            inventory::insert_line(
                &txn,
                OwnerKind::Receipt,
                header.id,
                ordered.product_id,
                item.cost,
                item.quantity,
                amount,
                None,
            )
            .await?;
            inventory::apply_stock_delta(
                &txn,
                input.store_id,
                ordered.product_id,
                item.quantity,
                self.ctx.stock_policy,
            )
            .await?;
        }

        let mut active: receipt::ActiveModel = header.clone().into();
        active.total_amount = Set(total_amount);
        active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(receipt_id = header.id, pre_order_id, "receipt landed");
        Ok(header.id)
    }

    /// Replaces a receipt's full item set: reverses the old stock and
    /// ledger contribution, then re-applies the new one.
    #[instrument(skip(self, input))]
    pub async fn update_receipt(
        &self,
        _actor: &AuthenticatedUser,
        id: i64,
        input: ReceiveInput,
    ) -> Result<(), ServiceError> {
        if input.reference_no.trim().is_empty() {
            return Err(ServiceError::Validation(
                "reference_no is required".to_string(),
            ));
        }
        if input.items.is_empty() {
            return Err(ServiceError::Validation(
                "at least one received item is required".to_string(),
            ));
        }

        let db = self.ctx.db.as_ref();
        let existing = find_receipt(db, id).await?;

        let txn = self
            .ctx
            .db
            .begin()
            .await
            .map_err(ServiceError::db_error)?;

        ensure_unique_receipt(&txn, &input.reference_no, existing.supplier_id, Some(id)).await?;

        let removed = inventory::delete_owner_lines(&txn, OwnerKind::Receipt, id).await?;
        for (product_id, quantity) in removed {
            inventory::apply_stock_delta(
                &txn,
                existing.store_id,
                product_id,
                -quantity,
                StockPolicy::Permissive,
            )
            .await?;
        }

        let old_items = receipt_item::Entity::find()
            .filter(receipt_item::Column::ReceiptId.eq(id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        for item in &old_items {
            delete_image_rows(&txn, ImageOwner::ReceiptItem, item.id).await?;
        }
        receipt_item::Entity::delete_many()
            .filter(receipt_item::Column::ReceiptId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        let mut total_amount = Decimal::ZERO;
        for item in &input.items {
            let ordered = pre_order_item::Entity::find_by_id(item.pre_order_item_id)
                .one(&txn)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "pre-order item {} not found",
                        item.pre_order_item_id
                    ))
                })?;

            let discount = parse_discount(item.discount.as_deref(), item.cost);
            let amount = (item.cost - discount) * Decimal::from(item.quantity);
            total_amount += amount;

            let line = receipt_item::ActiveModel {
                receipt_id: Set(id),
                pre_order_item_id: Set(ordered.id),
                product_id: Set(ordered.product_id),
                cost: Set(item.cost),
                quantity: Set(item.quantity),
                amount: Set(amount),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::db_error)?;

            let inherited = image_paths(&txn, ImageOwner::PreOrderItem, ordered.id).await?;
            insert_image_rows(&txn, ImageOwner::ReceiptItem, line.id, &inherited).await?;

            inventory::insert_line(
                &txn,
                OwnerKind::Receipt,
                id,
                ordered.product_id,
                item.cost,
                item.quantity,
                amount,
                None,
            )
            .await?;
            inventory::apply_stock_delta(
                &txn,
                input.store_id,
                ordered.product_id,
                item.quantity,
                self.ctx.stock_policy,
            )
            .await?;
        }

        let mut active: receipt::ActiveModel = existing.into();
        active.reference_no = Set(input.reference_no);
        active.received_at = Set(input.received_at);
        active.store_id = Set(input.store_id);
        active.shipping_carrier = Set(input.shipping_carrier);
        active.note = Set(input.note);
        active.total_amount = Set(total_amount);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(receipt_id = id, "receipt updated");
        Ok(())
    }

    /// Removes a receipt, reversing its stock and ledger contribution
    /// and dropping its items and their images.
    #[instrument(skip(self))]
    pub async fn delete_receipt(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
    ) -> Result<(), ServiceError> {
        if actor.is_secretary() {
            return Err(ServiceError::Permission(
                "secretaries cannot delete receipts".to_string(),
            ));
        }

        let db = self.ctx.db.as_ref();
        let existing = find_receipt(db, id).await?;

        let txn = self
            .ctx
            .db
            .begin()
            .await
            .map_err(ServiceError::db_error)?;

        let removed = inventory::delete_owner_lines(&txn, OwnerKind::Receipt, id).await?;
        for (product_id, quantity) in removed {
            inventory::apply_stock_delta(
                &txn,
                existing.store_id,
                product_id,
                -quantity,
                StockPolicy::Permissive,
            )
            .await?;
        }

        let mut object_keys = Vec::new();
        let items = receipt_item::Entity::find()
            .filter(receipt_item::Column::ReceiptId.eq(id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        for item in &items {
            object_keys.extend(delete_image_rows(&txn, ImageOwner::ReceiptItem, item.id).await?);
        }
        receipt_item::Entity::delete_many()
            .filter(receipt_item::Column::ReceiptId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        object_keys.extend(delete_image_rows(&txn, ImageOwner::Receipt, id).await?);

        receipt::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        delete_objects(&self.ctx.storage, &object_keys).await;

        info!(receipt_id = id, "receipt deleted");
        Ok(())
    }

    /// Pre-order detail with per-item received quantities and the
    /// running received amount.
    pub async fn get_pre_order(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
    ) -> Result<PreOrderView, ServiceError> {
        let db = self.ctx.db.as_ref();
        let model = find_pre_order(db, id).await?;
        if !actor.can_access_company(model.company_id) {
            return Err(ServiceError::Permission(
                "pre-order belongs to another company".to_string(),
            ));
        }
        compute_pre_order_view(db, model).await
    }

    pub async fn list_pre_orders(
        &self,
        actor: &AuthenticatedUser,
        filter: PreOrderFilter,
    ) -> Result<(Vec<PreOrderView>, u64), ServiceError> {
        let db = self.ctx.db.as_ref();

        let mut query = pre_order::Entity::find();
        if !actor.is_admin() {
            query = query.filter(pre_order::Column::CompanyId.eq(actor.company_id));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(pre_order::Column::SupplierId.eq(supplier_id));
        }
        query = query.order_by_desc(pre_order::Column::OrderedAt);

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
            views.push(compute_pre_order_view(db, model).await?);
        }
        Ok((views, total))
    }

    pub async fn list_receipts(
        &self,
        actor: &AuthenticatedUser,
        pre_order_id: i64,
    ) -> Result<Vec<receipt::Model>, ServiceError> {
        let parent = find_pre_order(self.ctx.db.as_ref(), pre_order_id).await?;
        if !actor.can_access_company(parent.company_id) {
            return Err(ServiceError::Permission(
                "pre-order belongs to another company".to_string(),
            ));
        }

        receipt::Entity::find()
            .filter(receipt::Column::PreOrderId.eq(pre_order_id))
            .order_by_desc(receipt::Column::ReceivedAt)
            .all(self.ctx.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }
}

fn item_subtotal(item: &PreOrderItemInput) -> Decimal {
    let discount = parse_discount(item.discount.as_deref(), item.cost);
    (item.cost - discount) * Decimal::from(item.quantity)
}

async fn insert_pre_order_item<C: ConnectionTrait>(
    conn: &C,
    pre_order_id: i64,
    item: &PreOrderItemInput,
) -> Result<pre_order_item::Model, ServiceError> {
    pre_order_item::ActiveModel {
        pre_order_id: Set(pre_order_id),
        product_id: Set(item.product_id),
        cost: Set(item.cost),
        quantity: Set(item.quantity),
        discount: Set(item.discount.clone()),
        category_id: Set(item.category_id),
        subtotal: Set(item_subtotal(item)),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(ServiceError::db_error)
}

async fn find_pre_order<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<pre_order::Model, ServiceError> {
    pre_order::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("pre-order {id} not found")))
}

async fn find_receipt<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<receipt::Model, ServiceError> {
    receipt::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("receipt {id} not found")))
}

async fn ensure_unique_pre_order<C: ConnectionTrait>(
    conn: &C,
    reference_no: &str,
    supplier_id: i64,
    exclude_id: Option<i64>,
) -> Result<(), ServiceError> {
    let mut query = pre_order::Entity::find()
        .filter(pre_order::Column::ReferenceNo.eq(reference_no))
        .filter(pre_order::Column::SupplierId.eq(supplier_id));
    if let Some(id) = exclude_id {
        query = query.filter(pre_order::Column::Id.ne(id));
    }
    if query
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .is_some()
    {
        return Err(ServiceError::DuplicateReference(format!(
            "pre-order {reference_no} already exists for supplier {supplier_id}"
        )));
    }
    Ok(())
}

async fn ensure_unique_receipt<C: ConnectionTrait>(
    conn: &C,
    reference_no: &str,
    supplier_id: i64,
    exclude_id: Option<i64>,
) -> Result<(), ServiceError> {
    let mut query = receipt::Entity::find()
        .filter(receipt::Column::ReferenceNo.eq(reference_no))
        .filter(receipt::Column::SupplierId.eq(supplier_id));
    if let Some(id) = exclude_id {
        query = query.filter(receipt::Column::Id.ne(id));
    }
    if query
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .is_some()
    {
        return Err(ServiceError::DuplicateReference(format!(
            "receipt {reference_no} already exists for supplier {supplier_id}"
        )));
    }
    Ok(())
}

async fn compute_pre_order_view<C: ConnectionTrait>(
    conn: &C,
    model: pre_order::Model,
) -> Result<PreOrderView, ServiceError> {
    let items = pre_order_item::Entity::find()
        .filter(pre_order_item::Column::PreOrderId.eq(model.id))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    let mut item_views = Vec::with_capacity(items.len());
    for item in items {
        let received_lines = receipt_item::Entity::find()
            .filter(receipt_item::Column::PreOrderItemId.eq(item.id))
            .all(conn)
            .await
            .map_err(ServiceError::db_error)?;
        let received_quantity = received_lines
            .iter()
            .map(|line| i64::from(line.quantity))
            .sum();
        item_views.push(PreOrderItemView {
            item,
            received_quantity,
        });
    }

    let receipts = receipt::Entity::find()
        .filter(receipt::Column::PreOrderId.eq(model.id))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;
    let received_amount = receipts.iter().map(|r| r.total_amount).sum();

    let images = image_paths(conn, ImageOwner::PreOrder, model.id).await?;

    Ok(PreOrderView {
        pre_order: model,
        items: item_views,
        images,
        received_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::parse_discount;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(Some("10%"), dec!(100), dec!(10))]
    #[case(Some(" 25 % "), dec!(200), dec!(50))]
    #[case(Some("15"), dec!(100), dec!(15))]
    #[case(Some(" 7.5 "), dec!(100), dec!(7.5))]
    fn discount_parses_percentage_and_flat(
        #[case] raw: Option<&str>,
        #[case] cost: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(parse_discount(raw, cost), expected);
    }

    // Unparseable input silently resolves to zero.
    #[rstest]
    #[case(Some("abc"))]
    #[case(Some("x%"))]
    #[case(Some(""))]
    #[case(None)]
    fn invalid_discount_resolves_to_zero(#[case] raw: Option<&str>) {
        assert_eq!(parse_discount(raw, dec!(100)), Decimal::ZERO);
    }
}
