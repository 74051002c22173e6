use crate::api::{DEFAULT_SESSION_TTL_SECONDS, MAX_SESSION_TTL_SECONDS};
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";
pub const ARG_ADMIN_EMAIL: &str = "admin-email";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("Secret used to sign session tokens")
                .env("ACCOUNTS_SESSION_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session token and cookie TTL in seconds (default: 30 days, max: 10 years)")
                .env("ACCOUNTS_SESSION_TTL_SECONDS")
                .value_parser(clap::value_parser!(i64).range(1..=MAX_SESSION_TTL_SECONDS)),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark the session cookie Secure (HTTPS only)")
                .env("ACCOUNTS_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_ADMIN_EMAIL)
                .long(ARG_ADMIN_EMAIL)
                .help("Email of the account granted admin rights at startup and on registration")
                .env("ACCOUNTS_ADMIN_EMAIL"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub session_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub cookie_secure: bool,
    pub admin_email: Option<String>,
}

impl Options {
    /// # Errors
    /// Returns an error if the session secret is missing or blank.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let secret = matches
            .get_one::<String>(ARG_SESSION_SECRET)
            .map(|secret| secret.trim())
            .filter(|secret| !secret.is_empty())
            .context("missing required argument: --session-secret")?;

        Ok(Self {
            session_secret: SecretString::from(secret.to_string()),
            session_ttl_seconds: matches
                .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(DEFAULT_SESSION_TTL_SECONDS),
            cookie_secure: matches.get_flag(ARG_COOKIE_SECURE),
            admin_email: matches
                .get_one::<String>(ARG_ADMIN_EMAIL)
                .map(|email| email.trim().to_lowercase())
                .filter(|email| !email.is_empty()),
        })
    }
}
