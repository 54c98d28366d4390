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
use crate::entities::payment::{self, PayableKind};
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::payments::RecordPaymentInput;
use crate::ApiResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub paid_at: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub reference_no: String,
    pub payable_kind: PayableKind,
    pub payable_id: i64,
    pub amount: Decimal,
    pub note: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentPayload>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    pub payable_kind: PayableKind,
    pub payable_id: i64,
}

async fn record_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>), ServiceError> {
    request.validate()?;
    let attachments = decode_attachments(&request.attachments)?;

    let id = state
        .services
        .payments
        .record(
            &user,
            RecordPaymentInput {
                paid_at: request.paid_at,
                reference_no: request.reference_no,
                payable_kind: request.payable_kind,
                payable_id: request.payable_id,
                amount: request.amount,
                note: request.note,
                attachments,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedResponse { id })),
    ))
}

async fn list_payments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PaymentListQuery>,
) -> Result<Json<ApiResponse<Vec<payment::Model>>>, ServiceError> {
    let payments = state
        .services
        .payments
        .list_for(&user, query.payable_kind, query.payable_id)
        .await?;
    Ok(Json(ApiResponse::success(payments)))
}

async fn approve_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<&'static str>>, ServiceError> {
    state.services.payments.approve(&user, id).await?;
    Ok(Json(ApiResponse::success("approved")))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(record_payment).get(list_payments))
        .route("/:id/approve", post(approve_payment))
}
