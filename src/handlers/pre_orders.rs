use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::{
    decode_attachments, AttachmentPayload, PaginatedResponse, PaginationParams,
};
use super::purchases::CreatedResponse;
use crate::auth::AuthenticatedUser;
use crate::entities::receipt;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::receiving::{
    CreatePreOrderInput, PreOrderFilter, PreOrderItemInput, PreOrderView, ReceiveInput,
    ReceiveItemInput, UpdatePreOrderInput,
};
use crate::ApiResponse;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct PreOrderItemRequest {
    pub product_id: i64,
    pub cost: Decimal,
    #[validate(range(min = 1))]
    pub quantity: i32,
    /// Flat amount or percentage string ("10%").
    pub discount: Option<String>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePreOrderRequest {
    pub ordered_at: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub reference_no: String,
    pub supplier_id: i64,
    pub discount: Option<String>,
    pub note: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<PreOrderItemRequest>,
    #[serde(default)]
    pub attachments: Vec<AttachmentPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePreOrderRequest {
    pub ordered_at: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub reference_no: String,
    pub supplier_id: i64,
    pub discount: Option<String>,
    pub note: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<PreOrderItemRequest>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ReceiveItemRequest {
    pub pre_order_item_id: i64,
    pub cost: Decimal,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub discount: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReceiveRequest {
    pub received_at: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub reference_no: String,
    pub store_id: i64,
    pub shipping_carrier: Option<String>,
    pub note: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<ReceiveItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct PreOrderListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub supplier_id: Option<i64>,
}

fn item_inputs(items: Vec<PreOrderItemRequest>) -> Vec<PreOrderItemInput> {
    items
        .into_iter()
        .map(|item| PreOrderItemInput {
            product_id: item.product_id,
            cost: item.cost,
            quantity: item.quantity,
            discount: item.discount,
            category_id: item.category_id,
        })
        .collect()
}

fn receive_input(request: ReceiveRequest) -> ReceiveInput {
    ReceiveInput {
        received_at: request.received_at,
        reference_no: request.reference_no,
        store_id: request.store_id,
        shipping_carrier: request.shipping_carrier,
        note: request.note,
        items: request
            .items
            .into_iter()
            .map(|item| ReceiveItemInput {
                pre_order_item_id: item.pre_order_item_id,
                cost: item.cost,
                quantity: item.quantity,
                discount: item.discount,
            })
            .collect(),
    }
}

async fn create_pre_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreatePreOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>), ServiceError> {
    request.validate()?;
    let attachments = decode_attachments(&request.attachments)?;

    let id = state
        .services
        .receiving
        .create_pre_order(
            &user,
            CreatePreOrderInput {
                ordered_at: request.ordered_at,
                reference_no: request.reference_no,
                supplier_id: request.supplier_id,
                discount: request.discount,
                note: request.note,
                items: item_inputs(request.items),
                attachments,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedResponse { id })),
    ))
}

async fn get_pre_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PreOrderView>>, ServiceError> {
    let view = state.services.receiving.get_pre_order(&user, id).await?;
    Ok(Json(ApiResponse::success(view)))
}

async fn list_pre_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PreOrderListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<PreOrderView>>>, ServiceError> {
    let pagination = PaginationParams::from_query(query.page, query.per_page);
    let (views, total) = state
        .services
        .receiving
        .list_pre_orders(
            &user,
            PreOrderFilter {
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

async fn update_pre_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdatePreOrderRequest>,
) -> Result<Json<ApiResponse<&'static str>>, ServiceError> {
    request.validate()?;

    state
        .services
        .receiving
        .update_pre_order(
            &user,
            id,
            UpdatePreOrderInput {
                ordered_at: request.ordered_at,
                reference_no: request.reference_no,
                supplier_id: request.supplier_id,
                discount: request.discount,
                note: request.note,
                items: item_inputs(request.items),
            },
        )
        .await?;

    Ok(Json(ApiResponse::success("updated")))
}

async fn delete_pre_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<&'static str>>, ServiceError> {
    state.services.receiving.delete_pre_order(&user, id).await?;
    Ok(Json(ApiResponse::success("deleted")))
}

async fn receive_pre_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<ReceiveRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>), ServiceError> {
    request.validate()?;

    let receipt_id = state
        .services
        .receiving
        .receive(&user, id, receive_input(request))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedResponse { id: receipt_id })),
    ))
}

async fn list_receipts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<receipt::Model>>>, ServiceError> {
    let receipts = state.services.receiving.list_receipts(&user, id).await?;
    Ok(Json(ApiResponse::success(receipts)))
}

async fn update_receipt(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<ReceiveRequest>,
) -> Result<Json<ApiResponse<&'static str>>, ServiceError> {
    request.validate()?;

    state
        .services
        .receiving
        .update_receipt(&user, id, receive_input(request))
        .await?;

    Ok(Json(ApiResponse::success("updated")))
}

async fn delete_receipt(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<&'static str>>, ServiceError> {
    state.services.receiving.delete_receipt(&user, id).await?;
    Ok(Json(ApiResponse::success("deleted")))
}

pub fn pre_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_pre_order).get(list_pre_orders))
        .route(
            "/:id",
            get(get_pre_order)
                .put(update_pre_order)
                .delete(delete_pre_order),
        )
        .route("/:id/receive", post(receive_pre_order))
        .route("/:id/receipts", get(list_receipts))
}

pub fn receipt_routes() -> Router<AppState> {
    Router::new().route("/:id", put(update_receipt).delete(delete_receipt))
}
