use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::post,
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::common::{decode_attachments, AttachmentPayload};
use super::purchases::CreatedResponse;
use crate::auth::AuthenticatedUser;
use crate::entities::preturn;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::preturns::{CreatePreturnInput, UpdatePreturnInput};
use crate::ApiResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePreturnRequest {
    pub returned_at: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub reference_no: String,
    pub purchase_id: i64,
    pub amount: Decimal,
    pub note: Option<String>,
    pub attachment: Option<AttachmentPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePreturnRequest {
    pub returned_at: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub reference_no: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub attachment: Option<AttachmentPayload>,
}

#[derive(Debug, Deserialize)]
pub struct PreturnListQuery {
    pub purchase_id: i64,
}

fn decode_single(
    attachment: &Option<AttachmentPayload>,
) -> Result<Option<crate::services::AttachmentUpload>, ServiceError> {
    match attachment {
        Some(payload) => {
            let mut decoded = decode_attachments(std::slice::from_ref(payload))?;
            Ok(decoded.pop())
        }
        None => Ok(None),
    }
}

async fn create_preturn(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreatePreturnRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>), ServiceError> {
    request.validate()?;
    let attachment = decode_single(&request.attachment)?;

    let id = state
        .services
        .preturns
        .create(
            &user,
            CreatePreturnInput {
                returned_at: request.returned_at,
                reference_no: request.reference_no,
                purchase_id: request.purchase_id,
                amount: request.amount,
                note: request.note,
                attachment,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedResponse { id })),
    ))
}

async fn list_preturns(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PreturnListQuery>,
) -> Result<Json<ApiResponse<Vec<preturn::Model>>>, ServiceError> {
    let preturns = state
        .services
        .preturns
        .list_for_purchase(&user, query.purchase_id)
        .await?;
    Ok(Json(ApiResponse::success(preturns)))
}

async fn update_preturn(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdatePreturnRequest>,
) -> Result<Json<ApiResponse<&'static str>>, ServiceError> {
    request.validate()?;
    let attachment = decode_single(&request.attachment)?;

    state
        .services
        .preturns
        .update(
            &user,
            id,
            UpdatePreturnInput {
                returned_at: request.returned_at,
                reference_no: request.reference_no,
                amount: request.amount,
                note: request.note,
                attachment,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success("updated")))
}

async fn delete_preturn(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<&'static str>>, ServiceError> {
    state.services.preturns.delete(&user, id).await?;
    Ok(Json(ApiResponse::success("deleted")))
}

async fn approve_preturn(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<&'static str>>, ServiceError> {
    state.services.preturns.approve(&user, id).await?;
    Ok(Json(ApiResponse::success("approved")))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_preturn).get(list_preturns))
        .route("/:id", axum::routing::put(update_preturn).delete(delete_preturn))
        .route("/:id/approve", post(approve_preturn))
}
