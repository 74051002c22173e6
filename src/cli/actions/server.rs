use crate::{
    api::{self, AuthConfig, AuthState},
    store::{MemoryUserStore, PgUserStore, SharedStore, UserStore},
};
use anyhow::{Context, Result, anyhow};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

const MEMORY_DSN: &str = "memory://";

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub session_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub cookie_secure: bool,
    pub admin_email: Option<String>,
}

/// Where user records live, decided from the DSN.
#[derive(Debug, PartialEq, Eq)]
enum Backend {
    Memory,
    Postgres(String),
}

fn backend(dsn: &str) -> Result<Backend> {
    if dsn.trim() == MEMORY_DSN {
        return Ok(Backend::Memory);
    }

    let url = Url::parse(dsn).context("Invalid database DSN")?;
    match url.scheme() {
        "postgres" | "postgresql" => Ok(Backend::Postgres(dsn.to_string())),
        other => Err(anyhow!(
            "Unsupported DSN scheme '{other}', expected postgres:// or {MEMORY_DSN}"
        )),
    }
}

/// Grant admin rights to an already registered account, if it exists.
async fn promote_admin(store: &dyn UserStore, email: &str) -> Result<bool> {
    let Some(mut user) = store
        .find_by_email(email)
        .await
        .context("Failed to look up admin account")?
    else {
        return Ok(false);
    };
    if !user.is_admin {
        user.is_admin = true;
        store
            .save(&user)
            .await
            .context("Failed to promote admin account")?;
    }
    Ok(true)
}

/// Execute the server action.
/// # Errors
/// Returns an error if the store cannot be reached or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let pg = match backend(&args.dsn)? {
        Backend::Memory => None,
        Backend::Postgres(dsn) => Some(Arc::new(
            PgUserStore::connect(&dsn)
                .await
                .context("Failed to connect to database")?,
        )),
    };
    let store: SharedStore = if let Some(pg) = &pg {
        pg.clone()
    } else {
        warn!("Using in-memory user store, accounts are lost on restart");
        Arc::new(MemoryUserStore::new())
    };

    if let Some(email) = &args.admin_email {
        if promote_admin(store.as_ref(), email).await? {
            info!(admin_email = %email, "Admin account promoted");
        } else {
            info!(admin_email = %email, "Admin account will be promoted on registration");
        }
    }

    let auth_config = AuthConfig::new(args.session_secret)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_session_cookie_secure(args.cookie_secure)
        .with_admin_email(args.admin_email);
    let auth_state = Arc::new(AuthState::new(auth_config));

    info!(
        port = args.port,
        session_ttl_seconds = args.session_ttl_seconds,
        cookie_secure = args.cookie_secure,
        "Starting accounts server"
    );

    let served = api::new(args.port, store, auth_state).await;

    if let Some(pg) = pg {
        pg.close().await;
    }

    served
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewUser;

    #[tokio::test]
    async fn promote_admin_flags_existing_account() -> Result<()> {
        let store = MemoryUserStore::new();
        assert!(!promote_admin(&store, "root@example.com").await?);

        store
            .create(NewUser {
                name: "Root".to_string(),
                email: "root@example.com".to_string(),
                password_hash: "$argon2id$v=19$stub".to_string(),
            })
            .await?;
        assert!(promote_admin(&store, "root@example.com").await?);

        let root = store
            .find_by_email("root@example.com")
            .await?
            .context("root missing")?;
        assert!(root.is_admin);
        Ok(())
    }

    #[test]
    fn backend_from_dsn() {
        assert_eq!(backend("memory://").ok(), Some(Backend::Memory));
        assert_eq!(
            backend("postgres://user@localhost:5432/accounts").ok(),
            Some(Backend::Postgres(
                "postgres://user@localhost:5432/accounts".to_string()
            ))
        );
        assert!(backend("postgresql://localhost/accounts").is_ok());
        assert!(backend("mysql://localhost/accounts").is_err());
        assert!(backend("not a url").is_err());
    }
}
