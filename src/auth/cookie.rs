//! Signed session cookie issue, verification, and clearing.
//!
//! The cookie is the browser fallback credential: a base64url JSON payload
//! carrying `{uid, email, role, exp}` plus an HMAC-SHA256 tag keyed with the
//! process session secret. Only this service ever writes it, so verification
//! is local and needs no provider round-trip.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

pub const SESSION_COOKIE_NAME: &str = "portiere_session";

type HmacSha256 = Hmac<Sha256>;

/// Identity fields embedded in the session cookie.
///
/// A session is never partially written: either all fields round-trip through
/// the signed payload or the cookie fails verification as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub uid: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub exp: i64,
}

#[derive(Clone)]
pub struct SessionCookieManager {
    secret: SecretString,
    ttl_seconds: i64,
    secure: bool,
}

impl SessionCookieManager {
    #[must_use]
    pub fn new(secret: SecretString, ttl_seconds: i64, secure: bool) -> Self {
        Self {
            secret,
            ttl_seconds,
            secure,
        }
    }

    /// Build a `Set-Cookie` value carrying the given identity fields.
    ///
    /// The expiry is bounded by the configured TTL, which is kept shorter
    /// than the life of the bearer credentials the provider issues.
    ///
    /// # Errors
    /// Returns an error if signing or header encoding fails.
    pub fn issue(
        &self,
        uid: &str,
        email: Option<&str>,
        role: Option<&str>,
    ) -> Result<HeaderValue> {
        let claims = SessionClaims {
            uid: uid.to_string(),
            email: email.map(str::to_string),
            role: role.map(str::to_string),
            exp: unix_now() + self.ttl_seconds,
        };
        let token = self.sign(&claims)?;
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.ttl_seconds
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).context("Failed to encode session cookie header")
    }

    /// Build a `Set-Cookie` value that expires the session immediately.
    ///
    /// Same name and path as `issue`, so it unconditionally overwrites any
    /// existing session.
    ///
    /// # Errors
    /// Returns an error if header encoding fails.
    pub fn clear(&self) -> Result<HeaderValue> {
        let mut cookie =
            format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).context("Failed to encode session cookie header")
    }

    /// Validate a cookie token and extract the embedded identity fields.
    ///
    /// Returns `None` for a bad signature, malformed payload, or expiry.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        let (payload_b64, tag_b64) = token.split_once('.')?;

        let tag = URL_SAFE_NO_PAD.decode(tag_b64).ok()?;
        let mut mac = self.mac().ok()?;
        mac.update(payload_b64.as_bytes());
        if mac.verify_slice(&tag).is_err() {
            debug!("Session cookie signature mismatch");
            return None;
        }

        let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
        let claims: SessionClaims = serde_json::from_slice(&payload).ok()?;
        if claims.exp <= unix_now() {
            debug!("Session cookie expired");
            return None;
        }
        Some(claims)
    }

    fn sign(&self, claims: &SessionClaims) -> Result<String> {
        let payload = serde_json::to_vec(claims).context("Failed to encode session claims")?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
        let mut mac = self.mac()?;
        mac.update(payload_b64.as_bytes());
        let tag_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{payload_b64}.{tag_b64}"))
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .context("Failed to key session MAC")
    }
}

pub(crate) fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|duration| {
            #[allow(clippy::cast_possible_wrap)]
            {
                duration.as_secs() as i64
            }
        })
        .unwrap_or_default()
}
