//! Claim synchronization between the allowlist and the provider store.

use std::sync::Arc;
use tracing::{error, info};

use super::allowlist::AdminAllowlist;
use super::verifier::Identity;
use crate::provider::{ProviderClient, ProviderError, ADMIN_ROLE};

/// Externally visible result of one synchronization attempt.
///
/// `claims_updated` is true only on the request that performed the
/// escalation write; replays for an already-escalated identity report false.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub role: Option<String>,
    pub claims_updated: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkOutcome {
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Clone)]
pub struct ClaimsSynchronizer {
    provider: Arc<ProviderClient>,
    allowlist: AdminAllowlist,
}

impl ClaimsSynchronizer {
    #[must_use]
    pub fn new(provider: Arc<ProviderClient>, allowlist: AdminAllowlist) -> Self {
        Self {
            provider,
            allowlist,
        }
    }

    #[must_use]
    pub fn allowlist(&self) -> &AdminAllowlist {
        &self.allowlist
    }

    /// Reconcile one identity's stored role claim with the allowlist.
    ///
    /// For an allowlisted identity the decision is made against a fresh
    /// provider read, not the possibly-stale token claim, so a repeat call
    /// never writes twice. The returned role reflects allowlist membership
    /// even while a just-performed write is still propagating.
    ///
    /// # Errors
    /// Returns `ProviderError` when the claim read or write fails.
    pub async fn sync(&self, identity: &Identity) -> Result<SyncOutcome, ProviderError> {
        let privileged = identity
            .email
            .as_deref()
            .is_some_and(|email| self.allowlist.is_privileged(email));

        if !privileged {
            return Ok(SyncOutcome {
                role: identity.role.clone(),
                claims_updated: false,
            });
        }

        let account = self.provider.account_by_uid(&identity.uid).await?;
        if account.claims.is_admin() {
            return Ok(SyncOutcome {
                role: Some(ADMIN_ROLE.to_string()),
                claims_updated: false,
            });
        }

        let merged = account.claims.with_role(ADMIN_ROLE);
        self.provider.set_claims(&identity.uid, &merged).await?;
        info!("Escalated role claim for uid {}", identity.uid);

        // Report the role we set; the claim store is not read-your-writes.
        Ok(SyncOutcome {
            role: Some(ADMIN_ROLE.to_string()),
            claims_updated: true,
        })
    }

    /// Escalate every allowlisted email that is not yet admin.
    ///
    /// Per-identity failures land in `skipped` and never abort the batch.
    pub async fn bulk_escalate(&self) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for email in self.allowlist.emails() {
            match self.escalate_by_email(email).await {
                Ok(true) => outcome.updated.push(email.to_string()),
                Ok(false) => outcome.skipped.push(email.to_string()),
                Err(err) => {
                    error!("Bulk escalation failed for {email}: {err}");
                    outcome.skipped.push(email.to_string());
                }
            }
        }
        outcome
    }

    async fn escalate_by_email(&self, email: &str) -> Result<bool, ProviderError> {
        let account = self.provider.account_by_email(email).await?;
        if account.claims.is_admin() {
            return Ok(false);
        }
        self.provider
            .set_claims(&account.uid, &account.claims.with_role(ADMIN_ROLE))
            .await?;
        Ok(true)
    }
}
