//! Caller role endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{IsAdminResponse, RoleRequest, RoleResponse},
    models::Caller,
    middleware::AdminCaller,
    startup::AppState,
};

pub async fn get_my_role(caller: Caller) -> Json<RoleResponse> {
    Json(RoleResponse { role: caller.role })
}

pub async fn is_admin(caller: Caller) -> Json<IsAdminResponse> {
    Json(IsAdminResponse {
        is_admin: caller.is_admin(),
    })
}

#[tracing::instrument(skip(state, caller, request), fields(role = %request.role))]
pub async fn assign_role(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(principal): Path<String>,
    Json(request): Json<RoleRequest>,
) -> Result<StatusCode, AppError> {
    state
        .access
        .assign_role(&caller, &principal, request.role)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
