//! HTTP client for the external identity provider.
//!
//! The provider is the authority for credential verification and for the
//! stored authorization claims. This client covers the four primitives the
//! service needs: verify a bearer credential, resolve an account by uid or
//! email, and write the claims of an account.

use crate::APP_USER_AGENT;
use anyhow::{Context, Result};
use reqwest::{Client, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// The authorization claim value this service grants.
pub const ADMIN_ROLE: &str = "admin";

/// Stored authorization claims for one account.
///
/// `role` is the only field this service ever writes; everything else the
/// provider stores rides along in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Merge rule: preserve unrelated fields, overwrite only `role`.
    #[must_use]
    pub fn with_role(&self, role: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            extra: self.extra.clone(),
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

/// One account as the provider currently knows it.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderAccount {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub claims: Claims,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Unavailable")]
    Unavailable,
    #[error("Invalid response")]
    InvalidResponse,
}

#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: Client,
    base_url: Url,
    service_token: SecretString,
}

impl ProviderClient {
    /// Build a new client for the provider at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, service_token: SecretString) -> Result<Self> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid provider URL: {base_url}"))?;
        Ok(Self {
            client,
            base_url,
            service_token,
        })
    }

    /// Verify a bearer credential and return the decoded account.
    ///
    /// # Errors
    /// Expired, malformed, or forged credentials surface as `Unauthorized`.
    pub async fn verify_token(&self, token: &str) -> Result<ProviderAccount, ProviderError> {
        let url = self.endpoint("/v1/tokens/verify")?;
        let value = self
            .request_json(Method::POST, url, Some(json!({ "token": token })))
            .await?;
        parse_account(value)
    }

    /// Resolve an account by its provider uid.
    ///
    /// # Errors
    /// Returns `ProviderError` when the account cannot be resolved.
    pub async fn account_by_uid(&self, uid: &str) -> Result<ProviderAccount, ProviderError> {
        let url = self.endpoint(&format!("/v1/accounts/{uid}"))?;
        let value = self.request_json(Method::GET, url, None).await?;
        parse_account(value)
    }

    /// Resolve an account by email address.
    ///
    /// # Errors
    /// Returns `ProviderError` when the account cannot be resolved.
    pub async fn account_by_email(&self, email: &str) -> Result<ProviderAccount, ProviderError> {
        let mut url = self.endpoint("/v1/accounts")?;
        url.query_pairs_mut().append_pair("email", email);
        let value = self.request_json(Method::GET, url, None).await?;
        parse_account(value)
    }

    /// Write the stored claims of an account.
    ///
    /// Set-to-constant semantics: safe to apply twice for the same claims.
    ///
    /// # Errors
    /// Returns `ProviderError` when the write is rejected or the provider is down.
    pub async fn set_claims(&self, uid: &str, claims: &Claims) -> Result<(), ProviderError> {
        let url = self.endpoint(&format!("/v1/accounts/{uid}/claims"))?;
        self.request(Method::PUT, url, Some(json!({ "claims": claims })))
            .await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url.join(path).map_err(|err| {
            debug!("Failed to build provider endpoint {path}: {err}");
            ProviderError::InvalidResponse
        })
    }

    async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ProviderError> {
        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(self.service_token.expose_secret());
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| {
            debug!("Provider request failed: {err}");
            ProviderError::Unavailable
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else if status.is_client_error() {
            Err(ProviderError::Unauthorized)
        } else {
            Err(ProviderError::Unavailable)
        }
    }

    async fn request_json(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<Value, ProviderError> {
        let response = self.request(method, url, body).await?;
        response
            .json()
            .await
            .map_err(|_| ProviderError::InvalidResponse)
    }
}

fn parse_account(value: Value) -> Result<ProviderAccount, ProviderError> {
    let account: ProviderAccount =
        serde_json::from_value(value).map_err(|_| ProviderError::InvalidResponse)?;
    if account.uid.is_empty() {
        return Err(ProviderError::InvalidResponse);
    }
    Ok(account)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{Claims, ProviderClient, ProviderError, ADMIN_ROLE};
    use anyhow::Result;
    use secrecy::SecretString;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn create_client(url: &str) -> ProviderClient {
        ProviderClient::new(url, SecretString::from("service-token")).unwrap()
    }

    #[test]
    fn claims_with_role_preserves_extra_fields() {
        let claims: Claims = serde_json::from_value(json!({
            "role": null,
            "tenant": "acme",
            "beta": true
        }))
        .unwrap();

        let merged = claims.with_role(ADMIN_ROLE);
        assert!(merged.is_admin());
        assert_eq!(merged.extra.get("tenant"), Some(&json!("acme")));
        assert_eq!(merged.extra.get("beta"), Some(&json!(true)));
    }

    #[test]
    fn claims_serializes_without_null_role() {
        let claims = Claims::default();
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn verify_token_parses_account() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/tokens/verify"))
            .and(header("authorization", "Bearer service-token"))
            .and(body_json(json!({ "token": "bearer-token" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uid": "uid-1",
                "email": "alice@example.com",
                "claims": { "role": null, "tenant": "acme" }
            })))
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        let account = client.verify_token("bearer-token").await.unwrap();
        assert_eq!(account.uid, "uid-1");
        assert_eq!(account.email.as_deref(), Some("alice@example.com"));
        assert!(!account.claims.is_admin());
        assert_eq!(account.claims.extra.get("tenant"), Some(&json!("acme")));
        Ok(())
    }

    #[tokio::test]
    async fn verify_token_maps_client_errors_to_unauthorized() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/tokens/verify"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        let err = client.verify_token("expired").await.unwrap_err();
        assert_eq!(err, ProviderError::Unauthorized);
        Ok(())
    }

    #[tokio::test]
    async fn verify_token_maps_server_errors_to_unavailable() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/tokens/verify"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        let err = client.verify_token("token").await.unwrap_err();
        assert_eq!(err, ProviderError::Unavailable);
        Ok(())
    }

    #[tokio::test]
    async fn verify_token_rejects_malformed_body() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/tokens/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        let err = client.verify_token("token").await.unwrap_err();
        assert_eq!(err, ProviderError::InvalidResponse);
        Ok(())
    }

    #[tokio::test]
    async fn account_by_email_sends_query_param() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/accounts"))
            .and(query_param("email", "a@x.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uid": "uid-a",
                "email": "a@x.com",
                "claims": { "role": "admin" }
            })))
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        let account = client.account_by_email("a@x.com").await.unwrap();
        assert_eq!(account.uid, "uid-a");
        assert!(account.claims.is_admin());
        Ok(())
    }

    #[tokio::test]
    async fn set_claims_sends_merged_claims() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v1/accounts/uid-1/claims"))
            .and(body_json(json!({
                "claims": { "role": "admin", "tenant": "acme" }
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        let claims: Claims = serde_json::from_value(json!({ "tenant": "acme" }))?;
        client
            .set_claims("uid-1", &claims.with_role(ADMIN_ROLE))
            .await
            .unwrap();
        Ok(())
    }
}
