//! Gate configuration and shared request state.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use super::allowlist::AdminAllowlist;
use super::cookie::SessionCookieManager;
use super::sync::ClaimsSynchronizer;
use super::verifier::CredentialVerifier;
use crate::provider::ProviderClient;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 30 * 60;

#[derive(Clone)]
pub struct GateConfig {
    public_url: String,
    session_ttl_seconds: i64,
    setup_secret: Option<SecretString>,
}

impl GateConfig {
    #[must_use]
    pub fn new(public_url: String) -> Self {
        Self {
            public_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            setup_secret: None,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_setup_secret(mut self, secret: SecretString) -> Self {
        self.setup_secret = Some(secret);
        self
    }

    #[must_use]
    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    // Only mark cookies secure when the frontend is served over HTTPS.
    pub(crate) fn session_cookie_secure(&self) -> bool {
        self.public_url.starts_with("https://")
    }

    /// Exact-match check for the bulk escalation secret.
    ///
    /// Fails closed: an unconfigured or empty secret rejects everything,
    /// including an empty presented value.
    #[must_use]
    pub fn setup_secret_matches(&self, presented: &str) -> bool {
        match &self.setup_secret {
            Some(secret) => {
                let secret = secret.expose_secret();
                !secret.is_empty() && secret == presented
            }
            None => false,
        }
    }
}

/// Immutable per-process state shared by every admin handler.
///
/// Built once at startup; the provider client is the only external handle
/// and is injected explicitly rather than reached through a global.
pub struct GateState {
    config: GateConfig,
    verifier: CredentialVerifier,
    synchronizer: ClaimsSynchronizer,
    cookies: SessionCookieManager,
}

impl GateState {
    #[must_use]
    pub fn new(
        config: GateConfig,
        provider: Arc<ProviderClient>,
        allowlist: AdminAllowlist,
        session_secret: SecretString,
    ) -> Self {
        let cookies = SessionCookieManager::new(
            session_secret,
            config.session_ttl_seconds(),
            config.session_cookie_secure(),
        );
        let verifier = CredentialVerifier::new(provider.clone(), cookies.clone());
        let synchronizer = ClaimsSynchronizer::new(provider, allowlist);
        Self {
            config,
            verifier,
            synchronizer,
            cookies,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    #[must_use]
    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    #[must_use]
    pub fn synchronizer(&self) -> &ClaimsSynchronizer {
        &self.synchronizer
    }

    #[must_use]
    pub fn cookies(&self) -> &SessionCookieManager {
        &self.cookies
    }
}
