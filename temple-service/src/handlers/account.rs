//! Temple account endpoints.

use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::{
    dtos::AdjustBalanceRequest,
    models::{Caller, TempleAccount},
    middleware::AdminCaller,
    startup::AppState,
};

pub async fn get_account(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<TempleAccount>, AppError> {
    Ok(Json(state.donations.get_account(&caller).await?))
}

#[tracing::instrument(skip(state, caller, request), fields(new_balance = request.new_balance))]
pub async fn adjust_balance(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Json(request): Json<AdjustBalanceRequest>,
) -> Result<Json<TempleAccount>, AppError> {
    let account = state
        .donations
        .adjust_balance(&caller, request.new_balance)
        .await?;
    Ok(Json(account))
}
