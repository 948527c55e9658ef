//! Session synchronization and logout endpoints.
//!
//! Flow Overview:
//! 1) Resolve the caller's credential (bearer first, cookie fallback).
//! 2) Reconcile the provider's stored role claim with the allowlist.
//! 3) Set the session cookie to reflect the post-sync role.
//!
//! Security boundaries:
//! - A cookie is only minted from a freshly verified bearer credential,
//!   never re-minted from another cookie.
//! - The response that performs an escalation write clears the cookie so the
//!   caller re-authenticates with a credential carrying the new claim.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::error;

use super::types::{LogoutResponse, SyncResponse};
use crate::auth::{CredentialSource, GateState};
use crate::provider::ADMIN_ROLE;

#[utoipa::path(
    post,
    path = "/admin/session",
    responses(
        (status = 200, description = "Synchronized role and session cookie", body = SyncResponse),
        (status = 401, description = "No valid bearer credential or session cookie"),
        (status = 500, description = "Claim synchronization failed; session cookie cleared"),
    ),
    tag = "admin"
)]
pub async fn sync_session(
    headers: HeaderMap,
    state: Extension<Arc<GateState>>,
) -> impl IntoResponse {
    let Some(verified) = state.verifier().verify(&headers).await else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let outcome = match state.synchronizer().sync(&verified.identity).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(
                "Claim synchronization failed for uid {}: {err}",
                verified.identity.uid
            );
            // Never leave stale elevated state client-side.
            return with_cleared_cookie(&state, StatusCode::INTERNAL_SERVER_ERROR.into_response());
        }
    };

    // The only issuing path: post-sync admin, no write this request, and a
    // fresh bearer credential. Escalations clear so the caller re-auths with
    // a credential that reflects the new claim.
    let issue = outcome.role.as_deref() == Some(ADMIN_ROLE)
        && !outcome.claims_updated
        && verified.source == CredentialSource::Bearer;

    let mut response_headers = HeaderMap::new();
    let cookie = if issue {
        state.cookies().issue(
            &verified.identity.uid,
            verified.identity.email.as_deref(),
            outcome.role.as_deref(),
        )
    } else {
        state.cookies().clear()
    };
    match cookie {
        Ok(value) => {
            response_headers.insert(SET_COOKIE, value);
        }
        Err(err) => error!("Failed to build session cookie: {err}"),
    }

    let body = SyncResponse {
        ok: true,
        role: outcome.role,
        claims_updated: outcome.claims_updated,
    };
    (StatusCode::OK, response_headers, Json(body)).into_response()
}

#[utoipa::path(
    delete,
    path = "/admin/session",
    responses(
        (status = 200, description = "Session cleared", body = LogoutResponse)
    ),
    tag = "admin"
)]
pub async fn logout(state: Extension<Arc<GateState>>) -> impl IntoResponse {
    // Unconditional: no credential required, any existing cookie is expired.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = state.cookies().clear() {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (
        StatusCode::OK,
        response_headers,
        Json(LogoutResponse { ok: true }),
    )
        .into_response()
}

fn with_cleared_cookie(
    state: &GateState,
    mut response: axum::response::Response,
) -> axum::response::Response {
    if let Ok(cookie) = state.cookies().clear() {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    response
}
