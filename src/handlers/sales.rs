use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use super::common::{
    decode_attachments, AttachmentPayload, PaginatedResponse, PaginationParams,
};
use super::purchases::{image_mode, CreatedResponse, ImageModeRequest, LineItemRequest};
use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::purchases::{LineItemInput, LineItemPatch};
use crate::services::sales::{CreateSaleInput, SaleFilter, SaleView, UpdateSaleInput};
use crate::ApiResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSaleRequest {
    pub sold_at: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub reference_no: String,
    pub store_id: i64,
    pub customer_id: i64,
    pub biller_id: i64,
    pub note: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<LineItemRequest>,
    #[serde(default)]
    pub attachments: Vec<AttachmentPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSaleRequest {
    pub sold_at: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub reference_no: String,
    pub customer_id: i64,
    pub biller_id: i64,
    pub note: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<LineItemRequest>,
    #[serde(default)]
    pub image_mode: ImageModeRequest,
    #[serde(default)]
    pub retained_paths: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentPayload>,
}

#[derive(Debug, Deserialize)]
pub struct SaleListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub customer_id: Option<i64>,
}

async fn create_sale(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>), ServiceError> {
    request.validate()?;
    let attachments = decode_attachments(&request.attachments)?;

    let id = state
        .services
        .sales
        .create(
            &user,
            CreateSaleInput {
                sold_at: request.sold_at,
                reference_no: request.reference_no,
                store_id: request.store_id,
                customer_id: request.customer_id,
                biller_id: request.biller_id,
                note: request.note,
                items: request
                    .items
                    .into_iter()
                    .map(|item| LineItemInput {
                        product_id: item.product_id,
                        unit_amount: item.unit_amount,
                        quantity: item.quantity,
                        expiry_date: None,
                    })
                    .collect(),
                attachments,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedResponse { id })),
    ))
}

async fn get_sale(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<SaleView>>, ServiceError> {
    let view = state.services.sales.get(&user, id).await?;
    Ok(Json(ApiResponse::success(view)))
}

async fn list_sales(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<SaleListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<SaleView>>>, ServiceError> {
    let pagination = PaginationParams::from_query(query.page, query.per_page);
    let (views, total) = state
        .services
        .sales
        .list(
            &user,
            SaleFilter {
                customer_id: query.customer_id,
                page: pagination.page,
                per_page: pagination.per_page,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        views,
        pagination.page,
        pagination.per_page,
        total,
    ))))
}

async fn update_sale(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateSaleRequest>,
) -> Result<Json<ApiResponse<&'static str>>, ServiceError> {
    request.validate()?;
    let attachments = decode_attachments(&request.attachments)?;

    state
        .services
        .sales
        .update(
            &user,
            id,
            UpdateSaleInput {
                sold_at: request.sold_at,
                reference_no: request.reference_no,
                customer_id: request.customer_id,
                biller_id: request.biller_id,
                note: request.note,
                items: request
                    .items
                    .into_iter()
                    .map(|item| LineItemPatch {
                        id: item.id,
                        product_id: item.product_id,
                        unit_amount: item.unit_amount,
                        quantity: item.quantity,
                        expiry_date: None,
                    })
                    .collect(),
                image_mode: image_mode(request.image_mode, request.retained_paths),
                attachments,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success("updated")))
}

async fn delete_sale(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<&'static str>>, ServiceError> {
    state.services.sales.delete(&user, id).await?;
    Ok(Json(ApiResponse::success("deleted")))
}

async fn approve_sale(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<&'static str>>, ServiceError> {
    state.services.sales.approve(&user, id).await?;
    Ok(Json(ApiResponse::success("approved")))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_sale).get(list_sales))
        .route("/:id", get(get_sale).put(update_sale).delete(delete_sale))
        .route("/:id/approve", post(approve_sale))
}
