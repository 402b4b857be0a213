//! Donation reporting endpoints.

use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::{
    models::{Caller, DonationReport, DonorDetail},
    startup::AppState,
};

pub async fn donation_report(
    State(state): State<AppState>,
) -> Result<Json<DonationReport>, AppError> {
    Ok(Json(state.donations.donation_report().await?))
}

pub async fn donor_list(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<DonorDetail>>, AppError> {
    Ok(Json(state.donations.donor_list(&caller).await?))
}
