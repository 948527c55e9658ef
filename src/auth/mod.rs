//! Core authorization components.
//!
//! Four cooperating pieces, each stateless across requests: the credential
//! verifier (bearer-then-cookie), the admin allowlist, the claims
//! synchronizer, and the session cookie manager. `GateState` wires them
//! together once at startup.

pub mod allowlist;
pub mod cookie;
pub mod state;
pub mod sync;
pub mod verifier;

pub use allowlist::AdminAllowlist;
pub use state::{GateConfig, GateState};
pub use sync::{BulkOutcome, ClaimsSynchronizer, SyncOutcome};
pub use verifier::{CredentialSource, CredentialVerifier, Identity, VerifiedIdentity};
