pub mod auth;
pub mod logging;
pub mod session;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_SESSION_FILE: &str = "session-file";
pub const ARG_TIMEOUT: &str = "timeout";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(crate::parrain::long_version().into_boxed_str());

    let command = Command::new("parrain")
        .about("Session and access control for the affiliate program")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Identity API base URL, example: https://api.parrain.dev/api")
                .env("PARRAIN_API_BASE_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long("session-file")
                .help("Where the session is stored (default: $XDG_STATE_HOME/parrain/session.json)")
                .env("PARRAIN_SESSION_FILE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long("timeout")
                .help("Request timeout in seconds")
                .env("PARRAIN_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..=300)),
        )
        .subcommand(auth::login())
        .subcommand(auth::register())
        .subcommand(auth::logout())
        .subcommand(auth::change_password())
        .subcommand(auth::refresh())
        .subcommand(session::status())
        .subcommand(session::whoami())
        .subcommand(session::access());

    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "parrain");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Session and access control for the affiliate program".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_login_args() {
        temp_env::with_vars(
            [
                ("PARRAIN_EMAIL", None::<&str>),
                ("PARRAIN_PASSWORD", None::<&str>),
            ],
            || {
                let matches = new().get_matches_from(vec![
                    "parrain",
                    "login",
                    "--as",
                    "partner",
                    "--email",
                    "ines@parrain.dev",
                    "--password",
                    "secret",
                ]);

                let Some((name, sub)) = matches.subcommand() else {
                    panic!("expected a subcommand");
                };
                assert_eq!(name, auth::CMD_LOGIN);
                assert_eq!(
                    sub.get_one::<String>(auth::ARG_AS).map(String::as_str),
                    Some("partner")
                );
                assert_eq!(
                    sub.get_one::<String>(auth::ARG_EMAIL).map(String::as_str),
                    Some("ines@parrain.dev")
                );
            },
        );
    }

    #[test]
    fn test_login_rejects_unknown_flow() {
        let result = new().try_get_matches_from(vec![
            "parrain",
            "login",
            "--as",
            "root",
            "--email",
            "a@b.fr",
            "--password",
            "x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("PARRAIN_API_BASE_URL", Some("https://api.parrain.dev")),
                ("PARRAIN_SESSION_FILE", Some("/tmp/parrain/session.json")),
                ("PARRAIN_TIMEOUT", Some("30")),
                ("PARRAIN_LOG_LEVEL", Some("info")),
                ("PARRAIN_LOG_FORMAT", Some("json")),
            ],
            || {
                let matches = new().get_matches_from(vec!["parrain", "status"]);
                assert_eq!(
                    matches.get_one::<String>(ARG_API_URL).map(String::as_str),
                    Some("https://api.parrain.dev")
                );
                assert_eq!(
                    matches
                        .get_one::<String>(ARG_SESSION_FILE)
                        .map(String::as_str),
                    Some("/tmp/parrain/session.json")
                );
                assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT).copied(), Some(30));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
                assert_eq!(
                    matches
                        .get_one::<String>(logging::ARG_LOG_FORMAT)
                        .map(String::as_str),
                    Some("json")
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("PARRAIN_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["parrain", "status"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_u8 {
            temp_env::with_vars([("PARRAIN_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["parrain".to_string(), "whoami".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(usize::from(index))));
                }

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(index)
                );
            });
        }
    }

    #[test]
    fn test_timeout_range() {
        let result = new().try_get_matches_from(vec!["parrain", "--timeout", "0", "status"]);
        assert!(result.is_err());
    }
}
