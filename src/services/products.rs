//! Product master records. On-hand quantity is never stored on the
//! product row; reads derive it from the order-line ledger, or from the
//! store projection when a store is given.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::entities::product;
use crate::errors::ServiceError;

use super::{inventory, ServiceContext};

#[derive(Debug)]
pub struct CreateProductInput {
    pub name: String,
    pub code: String,
    pub unit: String,
    pub cost: Decimal,
    pub price: Decimal,
    pub alert_quantity: i32,
}

/// Product detail with its derived quantity: ledger-wide by default,
/// projection-scoped when a store is requested.
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: product::Model,
    pub quantity: i64,
}

#[derive(Clone)]
pub struct ProductService {
    ctx: ServiceContext,
}

impl ProductService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create(&self, input: CreateProductInput) -> Result<i64, ServiceError> {
        if input.name.trim().is_empty() || input.code.trim().is_empty() {
            return Err(ServiceError::Validation(
                "name and code are required".to_string(),
            ));
        }

        let db = self.ctx.db.as_ref();
        let existing = product::Entity::find()
            .filter(product::Column::Code.eq(input.code.clone()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::DuplicateReference(format!(
                "product code {} already exists",
                input.code
            )));
        }

        let created = product::ActiveModel {
            name: Set(input.name),
            code: Set(input.code),
            unit: Set(input.unit),
            cost: Set(input.cost),
            price: Set(input.price),
            alert_quantity: Set(input.alert_quantity),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(product_id = created.id, "product created");
        Ok(created.id)
    }

    pub async fn get(
        &self,
        id: i64,
        store_id: Option<i64>,
    ) -> Result<ProductView, ServiceError> {
        let db = self.ctx.db.as_ref();
        let model = product::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("product {id} not found")))?;

        let quantity = match store_id {
            Some(store_id) => i64::from(inventory::stock_quantity(db, store_id, id).await?),
            None => inventory::product_quantity(db, id).await?,
        };

        Ok(ProductView {
            product: model,
            quantity,
        })
    }

    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let db = self.ctx.db.as_ref();
        let paginator = product::Entity::find()
            .order_by_asc(product::Column::Name)
            .paginate(db, per_page.max(1));
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let models = paginator
            .fetch_page(page.max(1) - 1)
            .await
            .map_err(ServiceError::db_error)?;
        Ok((models, total))
    }
}
