//! Payment confirmation endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::{PaymentConfirmationRequest, PaymentSubmittedResponse},
    models::{Caller, PaymentConfirmation, Receipt},
    middleware::AdminCaller,
    startup::AppState,
};

/// Submit a payment confirmation. Open to guests.
#[tracing::instrument(skip(state, caller, request))]
pub async fn submit_payment(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<PaymentConfirmationRequest>,
) -> Result<(StatusCode, Json<PaymentSubmittedResponse>), AppError> {
    request.validate()?;

    let payment = state.donations.submit(&caller, request.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentSubmittedResponse { id: payment.id }),
    ))
}

#[tracing::instrument(skip(state, caller, request))]
pub async fn edit_payment(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(id): Path<i64>,
    Json(request): Json<PaymentConfirmationRequest>,
) -> Result<Json<PaymentConfirmation>, AppError> {
    request.validate()?;

    let payment = state.donations.edit(&caller, id, request.into()).await?;
    Ok(Json(payment))
}

pub async fn list_pending(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<PaymentConfirmation>>, AppError> {
    Ok(Json(state.donations.list_pending(&caller).await?))
}

/// Approve and return the freshly minted receipt.
#[tracing::instrument(skip(state, caller))]
pub async fn approve_payment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<Json<Receipt>, AppError> {
    Ok(Json(state.donations.approve(&caller, id).await?))
}

#[tracing::instrument(skip(state, caller))]
pub async fn reject_payment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<Json<PaymentConfirmation>, AppError> {
    Ok(Json(state.donations.reject(&caller, id).await?))
}
