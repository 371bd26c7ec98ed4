/*
 * Responsibility
 * - Account store collaborator: lookup by email (identity resolution),
 *   lookup by id, CRUD with email uniqueness
 * - In-memory implementation; the trait is the contract the gate and the
 *   handlers depend on
 */
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::error::RepoError;
use crate::services::auth::Role;

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_digest: String,
    pub about: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_digest: String,
    pub about: String,
    pub role: Role,
}

/// Full replacement of the mutable profile fields.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_digest: String,
    pub about: String,
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Account lookup keyed by subject (email). Consulted by the
    /// authentication gate on every non-allow-listed request.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;

    /// `Err(Conflict)` when the email is already registered.
    async fn insert(&self, user: NewUser) -> Result<User, RepoError>;

    /// `Ok(None)` when the id does not exist; `Err(Conflict)` when the new
    /// email belongs to a different account.
    async fn update(&self, id: i64, update: UserUpdate) -> Result<Option<User>, RepoError>;

    /// Returns the removed record, if any.
    async fn delete(&self, id: i64) -> Result<Option<User>, RepoError>;

    async fn list(&self) -> Result<Vec<User>, RepoError>;
}

#[derive(Default)]
pub struct InMemoryUserRepo {
    users: RwLock<HashMap<i64, User>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Conflict { value: user.email });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let stored = User {
            id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_digest: user.password_digest,
            about: user.about,
            role: user.role,
        };
        users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, update: UserUpdate) -> Result<Option<User>, RepoError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email == update.email && u.id != id)
        {
            return Err(RepoError::Conflict {
                value: update.email,
            });
        }

        match users.get_mut(&id) {
            Some(user) => {
                user.first_name = update.first_name;
                user.last_name = update.last_name;
                user.email = update.email;
                user.password_digest = update.password_digest;
                user.about = update.about;
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<Option<User>, RepoError> {
        let mut users = self.users.write().await;
        Ok(users.remove(&id))
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|u| u.id);
        Ok(all)
    }
}
