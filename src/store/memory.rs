//! Process-local user store for development (`--dsn memory://`) and tests.
//!
//! Uniqueness of emails is checked and applied under the same write lock, so
//! two concurrent `create` calls for one address cannot both succeed.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewUser, StoreError, User, UserStore};

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let mut all: Vec<User> = self.users.read().await.values().cloned().collect();
        all.sort_by_key(|user| user.created_at);
        Ok(all)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        user.validate()?;
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict);
        }

        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password: user.password_hash,
            is_admin: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn save(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|existing| existing.id != user.id && existing.email == user.email)
        {
            return Err(StoreError::Conflict);
        }

        let stored = users.get_mut(&user.id).ok_or(StoreError::NotFound)?;
        stored.name.clone_from(&user.name);
        stored.email.clone_from(&user.email);
        stored.password.clone_from(&user.password);
        stored.is_admin = user.is_admin;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ann".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$stub".to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let store = MemoryUserStore::new();
        let user = store.create(new_user("ann@example.com")).await.unwrap();
        assert!(!user.is_admin);
        assert_eq!(user.created_at, user.updated_at);

        let found = store.find_by_email("ann@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let store = MemoryUserStore::new();
        store.create(new_user("ann@example.com")).await.unwrap();
        let second = store.create(new_user("ann@example.com")).await;
        assert!(matches!(second, Err(StoreError::Conflict)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_creates_for_same_email_yield_one_record() {
        let store = std::sync::Arc::new(MemoryUserStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(new_user("race@example.com")).await
            }));
        }
        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn create_validates_required_fields() {
        let store = MemoryUserStore::new();
        let mut input = new_user("ann@example.com");
        input.name = String::new();
        assert!(matches!(
            store.create(input).await,
            Err(StoreError::Validation(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn save_updates_fields_and_timestamp() {
        let store = MemoryUserStore::new();
        let mut user = store.create(new_user("ann@example.com")).await.unwrap();
        user.name = "Annie".to_string();
        let saved = store.save(&user).await.unwrap();
        assert_eq!(saved.name, "Annie");
        assert_eq!(saved.email, "ann@example.com");
        assert!(saved.updated_at >= saved.created_at);
    }

    #[tokio::test]
    async fn save_rejects_email_taken_by_other_user() {
        let store = MemoryUserStore::new();
        store.create(new_user("ann@example.com")).await.unwrap();
        let mut bob = store.create(new_user("bob@example.com")).await.unwrap();
        bob.email = "ann@example.com".to_string();
        assert!(matches!(store.save(&bob).await, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn save_missing_user_is_not_found() {
        let store = MemoryUserStore::new();
        let user = store.create(new_user("ann@example.com")).await.unwrap();
        store.delete_by_id(user.id).await.unwrap();
        assert!(matches!(store.save(&user).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn delete_by_id_reports_missing() {
        let store = MemoryUserStore::new();
        assert!(matches!(
            store.delete_by_id(Uuid::new_v4()).await,
            Err(StoreError::NotFound)
        ));
    }
}
