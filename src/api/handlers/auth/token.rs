//! Signed, time-bounded session tokens (HS256 JWT).
//!
//! The token is the whole session: there is no server-side session table, so
//! verification is signature + expiry + a well-formed subject.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// User id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("invalid subject")]
    InvalidSubject,
    #[error("failed to sign token: {0}")]
    Sign(String),
}

pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionKeys {
    #[must_use]
    pub fn from_secret(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Sign a token for `user_id` valid for `ttl_seconds` from now.
    ///
    /// # Errors
    /// Returns [`TokenError::Sign`] if the expiry overflows or encoding fails.
    pub fn issue(&self, user_id: Uuid, ttl_seconds: i64) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let exp = now
            .checked_add(ttl_seconds)
            .ok_or_else(|| TokenError::Sign(format!("session ttl out of range: {ttl_seconds}")))?;
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now,
            exp,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenError::Sign(err.to_string()))
    }

    /// Check signature and expiry and return the user id the token was issued for.
    ///
    /// # Errors
    /// Returns [`TokenError::Expired`] for expired tokens and
    /// [`TokenError::Invalid`] for anything malformed or wrongly signed.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::InvalidSubject)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn keys(secret: &str) -> SessionKeys {
        SessionKeys::from_secret(&SecretString::from(secret.to_string()))
    }

    #[test]
    fn issue_then_verify_returns_user_id() {
        let keys = keys("test-secret");
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id, 60).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(keys.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = keys("test-secret");
        let token = keys.issue(Uuid::new_v4(), -120).unwrap();
        assert!(matches!(keys.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn issue_rejects_overflowing_ttl() {
        let keys = keys("test-secret");
        assert!(matches!(
            keys.issue(Uuid::new_v4(), i64::MAX),
            Err(TokenError::Sign(_))
        ));
    }

    #[test]
    fn issue_accepts_max_configured_ttl() {
        let keys = keys("test-secret");
        let user_id = Uuid::new_v4();
        let token = keys
            .issue(user_id, crate::api::MAX_SESSION_TTL_SECONDS)
            .unwrap();
        assert_eq!(keys.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn verify_rejects_other_secret() {
        let token = keys("secret-a").issue(Uuid::new_v4(), 60).unwrap();
        assert!(matches!(
            keys("secret-b").verify(&token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let keys = keys("test-secret");
        let token = keys.issue(Uuid::new_v4(), 60).unwrap();
        let other = keys.issue(Uuid::new_v4(), 60).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);
        assert!(keys.verify(&forged).is_err());
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = keys("test-secret");
        assert!(matches!(keys.verify(""), Err(TokenError::Invalid)));
        assert!(matches!(
            keys.verify("not.a.token"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn verify_rejects_non_uuid_subject() {
        let secret = "test-secret";
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: "not-a-uuid".to_string(),
            iat: now,
            exp: now + 60,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            keys(secret).verify(&token),
            Err(TokenError::InvalidSubject)
        ));
    }
}
