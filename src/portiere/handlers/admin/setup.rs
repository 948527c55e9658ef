//! Bulk escalation endpoint for bootstrapping the allowlist.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::warn;

use super::types::SetupResponse;
use crate::auth::GateState;

pub const SETUP_TOKEN_HEADER: &str = "x-portiere-setup-token";

#[utoipa::path(
    post,
    path = "/admin/setup",
    responses(
        (status = 200, description = "Escalation sweep complete", body = SetupResponse),
        (status = 401, description = "Missing or invalid setup token"),
    ),
    tag = "admin"
)]
pub async fn setup(headers: HeaderMap, state: Extension<Arc<GateState>>) -> impl IntoResponse {
    let presented = headers
        .get(SETUP_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !state.config().setup_secret_matches(presented) {
        warn!("Rejected setup request with missing or invalid token");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let outcome = state.synchronizer().bulk_escalate().await;
    let body = SetupResponse {
        ok: true,
        updated: outcome.updated,
        skipped: outcome.skipped,
    };
    (StatusCode::OK, Json(body)).into_response()
}
