use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("portiere")
        .about("Admin identity verification and privilege synchronization")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("PORTIERE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("provider-url")
                .long("provider-url")
                .help("Identity provider base URL, example: https://identity.tld")
                .env("PORTIERE_PROVIDER_URL")
                .required(true),
        )
        .arg(
            Arg::new("provider-token")
                .long("provider-token")
                .help("Service credential for the identity provider API")
                .env("PORTIERE_PROVIDER_TOKEN")
                .required(true),
        )
        .arg(
            Arg::new("admin-emails")
                .long("admin-emails")
                .help("Comma-separated allowlist of privileged email addresses")
                .env("PORTIERE_ADMIN_EMAILS")
                .value_delimiter(',')
                .action(clap::ArgAction::Append)
                .required(true),
        )
        .arg(
            Arg::new("session-secret")
                .long("session-secret")
                .help("Secret key used to sign session cookies")
                .env("PORTIERE_SESSION_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("setup-secret")
                .long("setup-secret")
                .help("Shared secret for the bulk escalation endpoint (rejects all requests when unset)")
                .env("PORTIERE_SETUP_SECRET"),
        )
        .arg(
            Arg::new("public-url")
                .long("public-url")
                .help("Public base URL the browser frontend is served from")
                .default_value("http://localhost:8080")
                .env("PORTIERE_PUBLIC_URL"),
        )
        .arg(
            Arg::new("session-ttl")
                .long("session-ttl")
                .help("Session cookie lifetime in seconds")
                .default_value("1800")
                .env("PORTIERE_SESSION_TTL")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("PORTIERE_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required_args() -> Vec<&'static str> {
        vec![
            "portiere",
            "--provider-url",
            "https://identity.tld",
            "--provider-token",
            "service-token",
            "--admin-emails",
            "root@example.com",
            "--session-secret",
            "cookie-secret",
        ]
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "portiere");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Admin identity verification and privilege synchronization"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_check_port_and_provider() {
        let command = new();
        let mut args = required_args();
        args.extend(["--port", "8081"]);
        let matches = command.get_matches_from(args);

        assert_eq!(matches.get_one::<u16>("port").copied(), Some(8081));
        assert_eq!(
            matches.get_one::<String>("provider-url").cloned(),
            Some("https://identity.tld".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("provider-token").cloned(),
            Some("service-token".to_string())
        );
        assert_eq!(matches.get_one::<i64>("session-ttl").copied(), Some(1800));
        assert_eq!(
            matches.get_one::<String>("public-url").cloned(),
            Some("http://localhost:8080".to_string())
        );
    }

    #[test]
    fn test_admin_emails_are_comma_split() {
        let command = new();
        let mut args = required_args();
        args.extend(["--admin-emails", "a@x.com,b@x.com"]);
        let matches = command.get_matches_from(args);

        let emails: Vec<String> = matches
            .get_many::<String>("admin-emails")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        assert!(emails.contains(&"a@x.com".to_string()));
        assert!(emails.contains(&"b@x.com".to_string()));
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("PORTIERE_PROVIDER_URL", Some("https://identity.tld")),
                ("PORTIERE_PROVIDER_TOKEN", Some("service-token")),
                ("PORTIERE_ADMIN_EMAILS", Some("a@x.com,b@x.com")),
                ("PORTIERE_SESSION_SECRET", Some("cookie-secret")),
                ("PORTIERE_PORT", Some("443")),
                ("PORTIERE_SESSION_TTL", Some("600")),
                ("PORTIERE_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["portiere"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(matches.get_one::<i64>("session-ttl").copied(), Some(600));
                assert_eq!(
                    matches.get_one::<String>("provider-url").cloned(),
                    Some("https://identity.tld".to_string())
                );
                let emails: Vec<String> = matches
                    .get_many::<String>("admin-emails")
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default();
                assert_eq!(emails, vec!["a@x.com", "b@x.com"]);
                assert_eq!(matches.get_one::<u8>("verbosity").copied(), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("PORTIERE_LOG_LEVEL", None::<String>)], || {
                let mut args: Vec<String> =
                    required_args().into_iter().map(String::from).collect();

                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();
                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    Some(index as u8)
                );
            });
        }
    }
}
