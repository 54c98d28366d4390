use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::common::{PaginatedResponse, PaginationParams};
use super::purchases::CreatedResponse;
use crate::auth::AuthenticatedUser;
use crate::entities::product;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::products::{CreateProductInput, ProductView};
use crate::ApiResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub unit: String,
    pub cost: Decimal,
    pub price: Decimal,
    #[serde(default)]
    pub alert_quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct ProductDetailQuery {
    /// Scope the derived quantity to one store's projection.
    pub store_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

async fn create_product(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>), ServiceError> {
    request.validate()?;

    let id = state
        .services
        .products
        .create(CreateProductInput {
            name: request.name,
            code: request.code,
            unit: request.unit,
            cost: request.cost,
            price: request.price,
            alert_quantity: request.alert_quantity,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedResponse { id })),
    ))
}

async fn get_product(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
    Query(query): Query<ProductDetailQuery>,
) -> Result<Json<ApiResponse<ProductView>>, ServiceError> {
    let view = state.services.products.get(id, query.store_id).await?;
    Ok(Json(ApiResponse::success(view)))
}

async fn list_products(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<product::Model>>>, ServiceError> {
    let pagination = PaginationParams::from_query(query.page, query.per_page);
    let (models, total) = state
        .services
        .products
        .list(pagination.page, pagination.per_page)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        models,
        pagination.page,
        pagination.per_page,
        total,
    ))))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product))
}
