//! Credential store: the only owner of persisted user records.
//!
//! Handlers never touch rows directly; they go through [`UserStore`], which has
//! a PostgreSQL implementation for deployments and a process-local one for
//! development and tests.

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Shared handle injected into request handlers.
pub type SharedStore = Arc<dyn UserStore>;

/// A persisted user. `password` always holds an Argon2 PHC string.
#[derive(Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .field("is_admin", &self.is_admin)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Input for [`UserStore::create`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    /// Reject records with missing required fields before they reach storage.
    ///
    /// # Errors
    /// Returns [`StoreError::Validation`] naming the first empty field.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation("Name is required"));
        }
        if self.email.trim().is_empty() {
            return Err(StoreError::Validation("Email is required"));
        }
        if self.password_hash.is_empty() {
            return Err(StoreError::Validation("Password is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("email already registered")]
    Conflict,
    #[error("user not found")]
    NotFound,
    #[error("{0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            Self::Conflict
        } else {
            Self::Backend(err.to_string())
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Every user, oldest first. Unbounded.
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;

    /// Insert a new user; the store assigns `id` and both timestamps.
    ///
    /// Fails with [`StoreError::Conflict`] when the email is already taken.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    /// Persist in-place mutations of an existing user and bump `updated_at`.
    async fn save(&self, user: &User) -> Result<User, StoreError>;

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError>;

    /// Cheap liveness check used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    fn new_user(name: &str, email: &str, hash: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash.to_string(),
        }
    }

    #[test]
    fn new_user_validate_rejects_empty_fields() {
        assert!(matches!(
            new_user(" ", "a@example.com", "$argon2id$x").validate(),
            Err(StoreError::Validation("Name is required"))
        ));
        assert!(matches!(
            new_user("Ann", "", "$argon2id$x").validate(),
            Err(StoreError::Validation("Email is required"))
        ));
        assert!(matches!(
            new_user("Ann", "a@example.com", "").validate(),
            Err(StoreError::Validation("Password is required"))
        ));
        assert!(new_user("Ann", "a@example.com", "$argon2id$x").validate().is_ok());
    }

    #[test]
    fn user_debug_masks_password() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            password: "$argon2id$secret".to_string(),
            is_admin: false,
            created_at: now,
            updated_at: now,
        };
        let debug = format!("{user:?}");
        assert!(!debug.contains("$argon2id$secret"));
        assert!(debug.contains("***"));
    }

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(matches!(StoreError::from(err), StoreError::Conflict));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(matches!(StoreError::from(err), StoreError::Backend(_)));

        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Backend(_)
        ));
    }
}
