//! Identity introspection endpoint.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::types::WhoamiResponse;
use crate::auth::GateState;

#[utoipa::path(
    get,
    path = "/admin/whoami",
    responses(
        (status = 200, description = "Resolved identity", body = WhoamiResponse),
        (status = 401, description = "No valid bearer credential or session cookie"),
    ),
    tag = "admin"
)]
pub async fn whoami(headers: HeaderMap, state: Extension<Arc<GateState>>) -> impl IntoResponse {
    // Read-only: reports whatever credential resolves, no claim writes.
    match state.verifier().verify(&headers).await {
        Some(verified) => {
            let body = WhoamiResponse {
                uid: verified.identity.uid,
                email: verified.identity.email,
                role: verified.identity.role,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}
