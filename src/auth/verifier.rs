//! Credential verification: bearer credential first, session cookie fallback.
//!
//! The two acceptable credentials form an ordered strategy list. Each
//! strategy either yields a verified identity or is skipped; the first
//! success short-circuits. A bearer credential costs a provider round-trip;
//! the cookie is validated locally because only this service writes it.

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap,
};
use std::sync::Arc;
use tracing::debug;

use super::cookie::{SessionCookieManager, SESSION_COOKIE_NAME};
use crate::provider::ProviderClient;

/// Canonical caller identity as known to the provider at verification time.
///
/// `role` may be stale relative to a claim write performed in the same
/// request; the synchronizer accounts for that.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Which credential produced the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Bearer,
    Cookie,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    pub identity: Identity,
    pub source: CredentialSource,
}

/// Verification order; bearer wins when both credentials are present.
const STRATEGIES: [CredentialSource; 2] = [CredentialSource::Bearer, CredentialSource::Cookie];

#[derive(Clone)]
pub struct CredentialVerifier {
    provider: Arc<ProviderClient>,
    cookies: SessionCookieManager,
}

impl CredentialVerifier {
    #[must_use]
    pub fn new(provider: Arc<ProviderClient>, cookies: SessionCookieManager) -> Self {
        Self { provider, cookies }
    }

    /// Resolve the request's credential to an identity.
    ///
    /// `None` means unauthenticated: absent, expired, forged, and provider
    /// failures all collapse here. Details are logged, never surfaced.
    pub async fn verify(&self, headers: &HeaderMap) -> Option<VerifiedIdentity> {
        for strategy in STRATEGIES {
            if let Some(verified) = self.attempt(strategy, headers).await {
                return Some(verified);
            }
        }
        None
    }

    async fn attempt(
        &self,
        strategy: CredentialSource,
        headers: &HeaderMap,
    ) -> Option<VerifiedIdentity> {
        match strategy {
            CredentialSource::Bearer => {
                let token = extract_bearer_token(headers)?;
                match self.provider.verify_token(&token).await {
                    Ok(account) => Some(VerifiedIdentity {
                        identity: Identity {
                            uid: account.uid,
                            email: account.email,
                            role: account.claims.role,
                        },
                        source: CredentialSource::Bearer,
                    }),
                    Err(err) => {
                        debug!("Bearer credential rejected: {err}");
                        None
                    }
                }
            }
            CredentialSource::Cookie => {
                let token = extract_session_cookie(headers)?;
                let claims = self.cookies.verify(&token)?;
                Some(VerifiedIdentity {
                    identity: Identity {
                        uid: claims.uid,
                        email: claims.email,
                        role: claims.role,
                    },
                    source: CredentialSource::Cookie,
                })
            }
        }
    }
}

pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

pub(crate) fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}
