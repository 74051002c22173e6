//! Auth configuration and the shared auth state injected into handlers.

use secrecy::SecretString;

use super::token::SessionKeys;

/// 30 days, matching the cookie `Max-Age`.
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Upper bound for configured session lifetimes (10 years).
pub const MAX_SESSION_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Clone)]
pub struct AuthConfig {
    session_secret: SecretString,
    session_ttl_seconds: i64,
    session_cookie_secure: bool,
    admin_email: Option<String>,
}

impl AuthConfig {
    #[must_use]
    pub fn new(session_secret: SecretString) -> Self {
        Self {
            session_secret,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure: false,
            admin_email: None,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    /// Accounts registering with this email are created as admins.
    #[must_use]
    pub fn with_admin_email(mut self, email: Option<String>) -> Self {
        self.admin_email = email
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty());
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }

    /// Whether `email` (already normalized) is the configured admin account.
    #[must_use]
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_email.as_deref() == Some(email)
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_secret", &"***")
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("session_cookie_secure", &self.session_cookie_secure)
            .field("admin_email", &self.admin_email)
            .finish()
    }
}

pub struct AuthState {
    config: AuthConfig,
    keys: SessionKeys,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let keys = SessionKeys::from_secret(&config.session_secret);
        Self { config, keys }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(super) fn keys(&self) -> &SessionKeys {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new(SecretString::from("secret".to_string()));
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(config.session_ttl_seconds(), 2_592_000);
        assert!(!config.session_cookie_secure());

        let config = config
            .with_session_ttl_seconds(60)
            .with_session_cookie_secure(true);
        assert_eq!(config.session_ttl_seconds(), 60);
        assert!(config.session_cookie_secure());
    }

    #[test]
    fn auth_config_admin_email_is_normalized() {
        let config = AuthConfig::new(SecretString::from("secret".to_string()));
        assert!(!config.is_admin_email("root@example.com"));

        let config = config.with_admin_email(Some(" Root@Example.com ".to_string()));
        assert!(config.is_admin_email("root@example.com"));
        assert!(!config.is_admin_email("ada@example.com"));

        let config = config.with_admin_email(Some("   ".to_string()));
        assert!(!config.is_admin_email(""));
    }

    #[test]
    fn auth_config_debug_hides_secret() {
        let config = AuthConfig::new(SecretString::from("super-secret".to_string()));
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
    }
}
