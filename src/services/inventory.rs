//! Inventory ledger aggregation and the store stock projection.
//!
//! Not independently addressable over HTTP: mutations happen only as a
//! side effect of purchase/sale edits and receipt creation, and always
//! inside the caller's transaction so the projection can never drift
//! from the ledger.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};

use crate::config::StockPolicy;
use crate::entities::{
    order_line::{self, OwnerKind},
    stock_level,
};
use crate::errors::ServiceError;

/// Applies a signed quantity delta to the (store, product) projection
/// row, creating it on first touch.
///
/// Under the strict policy a negative-going delta that would push the
/// level below zero is rejected; the permissive default allows it, as
/// the source system always has.
pub async fn apply_stock_delta<C: ConnectionTrait>(
    conn: &C,
    store_id: i64,
    product_id: i64,
    delta: i32,
    policy: StockPolicy,
) -> Result<(), ServiceError> {
    if delta == 0 {
        return Ok(());
    }

    let existing = stock_level::Entity::find()
        .filter(stock_level::Column::StoreId.eq(store_id))
        .filter(stock_level::Column::ProductId.eq(product_id))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?;

    let current = existing.as_ref().map(|row| row.quantity).unwrap_or(0);
    let next = current + delta;

    if policy == StockPolicy::Strict && delta < 0 && next < 0 {
        return Err(ServiceError::InsufficientStock(format!(
            "store {store_id} has {current} of product {product_id}, requested {}",
            -delta
        )));
    }

    match existing {
        Some(row) => {
            let mut active: stock_level::ActiveModel = row.into();
            active.quantity = Set(next);
            active.updated_at = Set(Some(Utc::now()));
            active.update(conn).await.map_err(ServiceError::db_error)?;
        }
        None => {
            stock_level::ActiveModel {
                store_id: Set(store_id),
                product_id: Set(product_id),
                quantity: Set(next),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(conn)
            .await
            .map_err(ServiceError::db_error)?;
        }
    }

    Ok(())
}

/// Current projection level for a (store, product) pair; zero when the
/// pair has never moved.
pub async fn stock_quantity<C: ConnectionTrait>(
    conn: &C,
    store_id: i64,
    product_id: i64,
) -> Result<i32, ServiceError> {
    let row = stock_level::Entity::find()
        .filter(stock_level::Column::StoreId.eq(store_id))
        .filter(stock_level::Column::ProductId.eq(product_id))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?;
    Ok(row.map(|r| r.quantity).unwrap_or(0))
}

/// Derived product quantity across all stores: signed aggregation of
/// the order-line ledger (purchase and receipt lines add, sale lines
/// subtract). Store-scoped reads go through the projection instead.
pub async fn product_quantity<C: ConnectionTrait>(
    conn: &C,
    product_id: i64,
) -> Result<i64, ServiceError> {
    let lines = order_line::Entity::find()
        .filter(order_line::Column::ProductId.eq(product_id))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(lines
        .iter()
        .map(|line| i64::from(line.quantity) * i64::from(line.owner_kind.direction()))
        .sum())
}

/// Removes every ledger line owned by a document, returning the total
/// quantity removed per product so callers can reverse stock.
pub async fn delete_owner_lines<C: ConnectionTrait>(
    conn: &C,
    owner_kind: OwnerKind,
    owner_id: i64,
) -> Result<Vec<(i64, i32)>, ServiceError> {
    let lines = order_line::Entity::find()
        .filter(order_line::Column::OwnerKind.eq(owner_kind))
        .filter(order_line::Column::OwnerId.eq(owner_id))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    let removed = lines
        .iter()
        .map(|line| (line.product_id, line.quantity))
        .collect();

    order_line::Entity::delete_many()
        .filter(order_line::Column::OwnerKind.eq(owner_kind))
        .filter(order_line::Column::OwnerId.eq(owner_id))
        .exec(conn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(removed)
}

/// Inserts a ledger line for a document.
#[allow(clippy::too_many_arguments)]
pub async fn insert_line<C: ConnectionTrait>(
    conn: &C,
    owner_kind: OwnerKind,
    owner_id: i64,
    product_id: i64,
    unit_amount: Decimal,
    quantity: i32,
    subtotal: Decimal,
    expiry_date: Option<chrono::NaiveDate>,
) -> Result<order_line::Model, ServiceError> {
    order_line::ActiveModel {
        owner_kind: Set(owner_kind),
        owner_id: Set(owner_id),
        product_id: Set(product_id),
        unit_amount: Set(unit_amount),
        quantity: Set(quantity),
        subtotal: Set(subtotal),
        expiry_date: Set(expiry_date),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(ServiceError::db_error)
}
