use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{anyhow, Result};
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let provider_url = matches
        .get_one::<String>("provider-url")
        .cloned()
        .ok_or_else(|| anyhow!("missing required argument: --provider-url"))?;

    let mut globals = GlobalArgs::new(provider_url);

    globals.provider_token = matches
        .get_one::<String>("provider-token")
        .map(|token| SecretString::from(token.clone()))
        .ok_or_else(|| anyhow!("missing required argument: --provider-token"))?;

    globals.session_secret = matches
        .get_one::<String>("session-secret")
        .map(|secret| SecretString::from(secret.clone()))
        .ok_or_else(|| anyhow!("missing required argument: --session-secret"))?;

    globals.setup_secret = matches
        .get_one::<String>("setup-secret")
        .map(|secret| SecretString::from(secret.clone()));

    globals.admin_emails = matches
        .get_many::<String>("admin-emails")
        .map(|values| values.cloned().collect())
        .ok_or_else(|| anyhow!("missing required argument: --admin-emails"))?;

    globals.public_url = matches
        .get_one::<String>("public-url")
        .cloned()
        .unwrap_or_else(|| "http://localhost:8080".to_string());

    globals.session_ttl_seconds = matches
        .get_one::<i64>("session-ttl")
        .copied()
        .unwrap_or(1800);

    let action = Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
    };

    Ok((action, globals))
}
