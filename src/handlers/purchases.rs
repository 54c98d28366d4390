use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::{
    decode_attachments, AttachmentPayload, PaginatedResponse, PaginationParams,
};
use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::purchases::{
    CreatePurchaseInput, ImageEditMode, LineItemInput, LineItemPatch, PurchaseFilter,
    PurchaseView, UpdatePurchaseInput,
};
use crate::ApiResponse;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct LineItemRequest {
    pub id: Option<i64>,
    pub product_id: i64,
    pub unit_amount: Decimal,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePurchaseRequest {
    pub purchased_at: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub reference_no: String,
    pub store_id: i64,
    pub supplier_id: i64,
    #[validate(range(min = 0))]
    pub credit_days: i32,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub shipping: Decimal,
    pub note: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<LineItemRequest>,
    #[serde(default)]
    pub attachments: Vec<AttachmentPayload>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageModeRequest {
    #[default]
    Keep,
    ReplaceAll,
    Retain,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePurchaseRequest {
    pub purchased_at: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub reference_no: String,
    pub supplier_id: i64,
    #[validate(range(min = 0))]
    pub credit_days: i32,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub shipping: Decimal,
    pub note: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<LineItemRequest>,
    #[serde(default)]
    pub image_mode: ImageModeRequest,
    /// Stored paths to keep when `image_mode` is `retain`.
    #[serde(default)]
    pub retained_paths: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentPayload>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub supplier_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

pub(crate) fn image_mode(mode: ImageModeRequest, retained: Vec<String>) -> ImageEditMode {
    match mode {
        ImageModeRequest::Keep => ImageEditMode::Keep,
        ImageModeRequest::ReplaceAll => ImageEditMode::ReplaceAll,
        ImageModeRequest::Retain => ImageEditMode::Retain(retained),
    }
}

async fn create_purchase(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreatePurchaseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>), ServiceError> {
    request.validate()?;
    let attachments = decode_attachments(&request.attachments)?;

    let id = state
        .services
        .purchases
        .create(
            &user,
            CreatePurchaseInput {
                purchased_at: request.purchased_at,
                reference_no: request.reference_no,
                store_id: request.store_id,
                supplier_id: request.supplier_id,
                credit_days: request.credit_days,
                discount: request.discount,
                shipping: request.shipping,
                note: request.note,
                items: request
                    .items
                    .into_iter()
                    .map(|item| LineItemInput {
                        product_id: item.product_id,
                        unit_amount: item.unit_amount,
                        quantity: item.quantity,
                        expiry_date: item.expiry_date,
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

async fn get_purchase(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PurchaseView>>, ServiceError> {
    let view = state.services.purchases.get(&user, id).await?;
    Ok(Json(ApiResponse::success(view)))
}

async fn list_purchases(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PurchaseListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<PurchaseView>>>, ServiceError> {
    let pagination = PaginationParams::from_query(query.page, query.per_page);
    let (views, total) = state
        .services
        .purchases
        .list(
            &user,
            PurchaseFilter {
                supplier_id: query.supplier_id,
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

async fn update_purchase(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdatePurchaseRequest>,
) -> Result<Json<ApiResponse<&'static str>>, ServiceError> {
    request.validate()?;
    let attachments = decode_attachments(&request.attachments)?;

    state
        .services
        .purchases
        .update(
            &user,
            id,
            UpdatePurchaseInput {
                purchased_at: request.purchased_at,
                reference_no: request.reference_no,
                supplier_id: request.supplier_id,
                credit_days: request.credit_days,
                discount: request.discount,
                shipping: request.shipping,
                note: request.note,
                items: request
                    .items
                    .into_iter()
                    .map(|item| LineItemPatch {
                        id: item.id,
                        product_id: item.product_id,
                        unit_amount: item.unit_amount,
                        quantity: item.quantity,
                        expiry_date: item.expiry_date,
                    })
                    .collect(),
                image_mode: image_mode(request.image_mode, request.retained_paths),
                attachments,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success("updated")))
}

async fn delete_purchase(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<&'static str>>, ServiceError> {
    state.services.purchases.delete(&user, id).await?;
    Ok(Json(ApiResponse::success("deleted")))
}

async fn approve_purchase(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<&'static str>>, ServiceError> {
    state.services.purchases.approve(&user, id).await?;
    Ok(Json(ApiResponse::success("approved")))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_purchase).get(list_purchases))
        .route(
            "/:id",
            get(get_purchase).put(update_purchase).delete(delete_purchase),
        )
        .route("/:id/approve", post(approve_purchase))
}
