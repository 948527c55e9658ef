//! Allowlist of privileged email addresses.

use regex::Regex;
use std::collections::HashSet;
use tracing::warn;

/// Normalize an email for membership checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Fixed set of privileged email addresses, loaded once at startup.
///
/// Matching is case-insensitive: both the configured entries and every probe
/// are lower-case normalized.
#[derive(Debug, Clone)]
pub struct AdminAllowlist {
    entries: HashSet<String>,
    ordered: Vec<String>,
}

impl AdminAllowlist {
    #[must_use]
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = HashSet::new();
        let mut ordered = Vec::new();
        for email in emails {
            let normalized = normalize_email(email.as_ref());
            if normalized.is_empty() {
                continue;
            }
            if !valid_email(&normalized) {
                warn!("Ignoring malformed allowlist entry: {normalized}");
                continue;
            }
            if entries.insert(normalized.clone()) {
                ordered.push(normalized);
            }
        }
        Self { entries, ordered }
    }

    /// Membership check; pure and total, no failure mode.
    #[must_use]
    pub fn is_privileged(&self, email: &str) -> bool {
        self.entries.contains(&normalize_email(email))
    }

    /// Entries in configuration order, for the bulk escalation pass.
    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
