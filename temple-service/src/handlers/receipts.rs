//! Receipt endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

use crate::{
    models::{Caller, Receipt},
    startup::AppState,
};

pub async fn get_receipt(
    State(state): State<AppState>,
    Path(receipt_number): Path<i64>,
) -> Result<Json<Receipt>, AppError> {
    Ok(Json(state.donations.get_receipt(receipt_number).await?))
}

#[tracing::instrument(skip(state, caller))]
pub async fn regenerate_receipt(
    State(state): State<AppState>,
    caller: Caller,
    Path(receipt_number): Path<i64>,
) -> Result<Json<Receipt>, AppError> {
    Ok(Json(state.donations.regenerate(&caller, receipt_number).await?))
}

#[tracing::instrument(skip(state, caller))]
pub async fn cancel_receipt(
    State(state): State<AppState>,
    caller: Caller,
    Path(receipt_number): Path<i64>,
) -> Result<Json<Receipt>, AppError> {
    Ok(Json(state.donations.cancel(&caller, receipt_number).await?))
}
