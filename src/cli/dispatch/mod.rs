//! Maps validated CLI arguments to the action the binary executes.

use crate::cli::{
    actions::{Action, server::Args},
    commands::{ARG_DSN, ARG_PORT, auth},
};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        session_secret: auth_opts.session_secret,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        cookie_secure: auth_opts.cookie_secure,
        admin_email: auth_opts.admin_email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn builds_server_action() {
        temp_env::with_vars(
            [
                ("ACCOUNTS_PORT", None::<&str>),
                ("ACCOUNTS_SESSION_TTL_SECONDS", None),
                ("ACCOUNTS_COOKIE_SECURE", None),
                ("ACCOUNTS_ADMIN_EMAIL", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec![
                    "accounts",
                    "--dsn",
                    "memory://",
                    "--session-secret",
                    "  s3cr3t  ",
                ]);
                let result = handler(&matches);
                assert!(result.is_ok());
                if let Ok(Action::Server(args)) = result {
                    assert_eq!(args.port, 8080);
                    assert_eq!(args.dsn, "memory://");
                    assert_eq!(args.session_secret.expose_secret(), "s3cr3t");
                    assert_eq!(args.session_ttl_seconds, 2_592_000);
                    assert!(!args.cookie_secure);
                    assert_eq!(args.admin_email, None);
                }
            },
        );
    }

    #[test]
    fn blank_session_secret_is_rejected() {
        temp_env::with_vars([("ACCOUNTS_SESSION_SECRET", None::<&str>)], || {
            let matches = crate::cli::commands::new().get_matches_from(vec![
                "accounts",
                "--dsn",
                "memory://",
                "--session-secret",
                "   ",
            ]);
            let result = handler(&matches);
            assert!(result.is_err());
            if let Err(err) = result {
                assert!(
                    err.to_string()
                        .contains("missing required argument: --session-secret")
                );
            }
        });
    }
}
