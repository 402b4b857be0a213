//! Caller extraction.
//!
//! The upstream gateway authenticates the user and forwards the principal in
//! `X-User-ID`. This service only maps that principal to a role.

use crate::models::Caller;
use crate::services::metrics::ERRORS_TOTAL;
use crate::startup::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;

pub const USER_ID_HEADER: &str = "X-User-ID";

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok());

        let caller = state.access.resolve(principal).await?;

        tracing::debug!(
            principal = caller.principal.as_deref().unwrap_or("-"),
            role = %caller.role,
            "Resolved caller"
        );

        Ok(caller)
    }
}

/// A caller that already holds the admin role.
///
/// Admin handlers that take a JSON body list this ahead of `Json`, so a
/// non-admin gets `401` before the body is parsed or validated.
#[derive(Debug, Clone)]
pub struct AdminCaller(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for AdminCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;

        if let Err(e) = caller.require_admin(&format!("{} {}", parts.method, parts.uri.path())) {
            ERRORS_TOTAL
                .with_label_values(&["admin_route", e.kind()])
                .inc();
            return Err(e.into());
        }

        Ok(Self(caller))
    }
}
