//! Logging flags shared by every subcommand: `-v` (or `PARRAIN_LOG_LEVEL`)
//! and `--log-format`.

use crate::cli::telemetry::LogFormat;
use clap::{builder::ValueParser, Arg, ArgAction, ArgMatches, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";
pub const ARG_LOG_FORMAT: &str = "log-format";

/// Indexed by `-v` count; extra `v`s stay at the last entry.
const LEVELS: [(&str, Level); 5] = [
    ("error", Level::ERROR),
    ("warn", Level::WARN),
    ("info", Level::INFO),
    ("debug", Level::DEBUG),
    ("trace", Level::TRACE),
];

/// Reads `PARRAIN_LOG_LEVEL` as a count (`0`-`4`) or a level name.
fn parse_log_level(value: &str) -> Result<u8, String> {
    let value = value.trim();
    let index = match value.parse::<usize>() {
        Ok(count) if count < LEVELS.len() => Some(count),
        Ok(_) => None,
        Err(_) => LEVELS
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(value)),
    };

    index.and_then(|index| u8::try_from(index).ok()).ok_or_else(|| {
        let names: Vec<&str> = LEVELS.iter().map(|(name, _)| *name).collect();
        format!("invalid log level '{value}', use 0-4 or {}", names.join(", "))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Log more: -v warn, -vv info, -vvv debug, -vvvv trace (default: error)")
                .env("PARRAIN_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(ValueParser::new(parse_log_level)),
        )
        .arg(
            Arg::new(ARG_LOG_FORMAT)
                .long("log-format")
                .help("Log output format, written to stderr")
                .env("PARRAIN_LOG_FORMAT")
                .global(true)
                .default_value("text")
                .value_parser(["text", "json"]),
        )
}

/// Tracing level selected on the command line.
#[must_use]
pub fn level(matches: &ArgMatches) -> Level {
    let count = matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0);
    let last = LEVELS.len() - 1;
    LEVELS[usize::from(count).min(last)].1
}

#[must_use]
pub fn format(matches: &ArgMatches) -> LogFormat {
    matches
        .get_one::<String>(ARG_LOG_FORMAT)
        .map_or(LogFormat::Text, |value| LogFormat::from_arg(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> Command {
        with_args(Command::new("parrain"))
    }

    #[test]
    fn parse_log_level_accepts_counts_and_names() {
        assert_eq!(parse_log_level("0"), Ok(0));
        assert_eq!(parse_log_level("4"), Ok(4));
        assert_eq!(parse_log_level("DEBUG"), Ok(3));
        assert_eq!(parse_log_level(" warn "), Ok(1));
        assert!(parse_log_level("5").is_err());
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn level_follows_v_count() {
        temp_env::with_vars([("PARRAIN_LOG_LEVEL", None::<String>)], || {
            let cases = [
                (vec!["parrain"], Level::ERROR),
                (vec!["parrain", "-v"], Level::WARN),
                (vec!["parrain", "-vvv"], Level::DEBUG),
                (vec!["parrain", "-vvvvvvv"], Level::TRACE),
            ];
            for (args, expected) in cases {
                assert_eq!(level(&command().get_matches_from(args)), expected);
            }
        });
    }

    #[test]
    fn format_defaults_to_text() {
        temp_env::with_vars([("PARRAIN_LOG_FORMAT", None::<String>)], || {
            let matches = command().get_matches_from(["parrain"]);
            assert_eq!(format(&matches), LogFormat::Text);

            let matches = command().get_matches_from(["parrain", "--log-format", "json"]);
            assert_eq!(format(&matches), LogFormat::Json);
        });
    }
}
