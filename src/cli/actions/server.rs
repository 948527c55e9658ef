use crate::auth::{AdminAllowlist, GateConfig, GateState};
use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::portiere;
use crate::provider::ProviderClient;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Handle the server action
/// # Errors
/// Return error if the provider client or server cannot be created
pub async fn handle(action: Action, globals: GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port } => {
            let provider = Arc::new(
                ProviderClient::new(&globals.provider_url, globals.provider_token.clone())
                    .context("Failed to create identity provider client")?,
            );

            let allowlist = AdminAllowlist::new(globals.admin_emails.iter().map(String::as_str));
            info!("Loaded {} allowlisted admin emails", allowlist.len());

            let mut config = GateConfig::new(globals.public_url.clone())
                .with_session_ttl_seconds(globals.session_ttl_seconds);
            if let Some(secret) = globals.setup_secret.clone() {
                config = config.with_setup_secret(secret);
            }

            let state = Arc::new(GateState::new(
                config,
                provider,
                allowlist,
                globals.session_secret.clone(),
            ));

            portiere::new(port, state).await?;
        }
    }

    Ok(())
}
