use secrecy::SecretString;

#[derive(Clone)]
pub struct GlobalArgs {
    pub provider_url: String,
    pub provider_token: SecretString,
    pub session_secret: SecretString,
    pub setup_secret: Option<SecretString>,
    pub admin_emails: Vec<String>,
    pub public_url: String,
    pub session_ttl_seconds: i64,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(provider_url: String) -> Self {
        Self {
            provider_url,
            provider_token: SecretString::default(),
            session_secret: SecretString::default(),
            setup_secret: None,
            admin_emails: Vec::new(),
            public_url: String::new(),
            session_ttl_seconds: 0,
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("provider_url", &self.provider_url)
            .field("provider_token", &"***")
            .field("session_secret", &"***")
            .field("setup_secret", &self.setup_secret.as_ref().map(|_| "***"))
            .field("admin_emails", &self.admin_emails)
            .field("public_url", &self.public_url)
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .finish()
    }
}
