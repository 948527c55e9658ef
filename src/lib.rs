//! # Portiere (Admin Identity & Privilege Synchronization)
//!
//! `portiere` verifies admin callers against an external identity provider
//! and keeps the provider's `role` claim in sync with a process-configured
//! allowlist of privileged email addresses.
//!
//! ## Credential model
//!
//! Callers present either a short-lived bearer credential (verified against
//! the provider on every request) or a signed session cookie minted by this
//! service. The cookie is a fallback for browser callers; it is only ever
//! written by this service, so it is validated locally without a provider
//! round-trip.
//!
//! ## Escalation
//!
//! An allowlisted caller whose stored claim is not yet `admin` gets the
//! claim written once, idempotently. The response that performs the write
//! clears the session cookie so the caller must re-authenticate with a
//! fresh bearer credential that reflects the escalated claim.

pub mod auth;
pub mod cli;
pub mod portiere;
pub mod provider;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
