//! `-v` / `ACCOUNTS_LOG_LEVEL` handling.

use clap::{Arg, ArgAction, Command, builder::ValueParser};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names in verbosity order; the index is the equivalent `-v` count.
const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept a level name (any case) or its numeric verbosity.
fn parse_level(level: &str) -> Result<u8, String> {
    let level = level.trim();
    let index = match level.parse::<usize>() {
        Ok(count) => (count < LEVEL_NAMES.len()).then_some(count),
        Err(_) => LEVEL_NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(level)),
    };

    index
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| {
            format!(
                "invalid log level '{level}', expected one of: {}",
                LEVEL_NAMES.join(", ")
            )
        })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("ACCOUNTS_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(parse_level)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_names_and_numbers() {
        for (index, name) in LEVEL_NAMES.iter().enumerate() {
            let expected = u8::try_from(index).ok();
            assert_eq!(parse_level(name).ok(), expected);
            assert_eq!(parse_level(&name.to_uppercase()).ok(), expected);
            assert_eq!(parse_level(&index.to_string()).ok(), expected);
        }
        assert_eq!(parse_level(" debug ").ok(), Some(3));
    }

    #[test]
    fn parse_level_rejects_unknown() {
        assert!(parse_level("verbose").is_err());
        assert!(parse_level("5").is_err());
        assert!(parse_level("").is_err());
        if let Err(message) = parse_level("loud") {
            assert!(message.contains("error, warn, info, debug, trace"));
        }
    }
}
