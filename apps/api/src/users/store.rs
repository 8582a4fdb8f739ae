//! User persistence.
//!
//! `UserStore` is the seam between the user service and the database.
//! `PgUserStore` keeps accounts in a `users` table with a unique email index;
//! extra signup fields live in a JSONB `profile` column.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::users::models::{NewUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a user with this email already exists")]
    Duplicate,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new account. Fails with [`StoreError::Duplicate`] if the email is taken.
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Looks up an account by its normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `users` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id            UUID PRIMARY KEY,
                email         TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                profile       JSONB NOT NULL DEFAULT '{}'::jsonb,
                created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("users table ready");
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, profile)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, profile, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.profile)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            e => StoreError::Database(e),
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, profile, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[cfg(test)]
pub mod memory {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    /// In-process store with the same uniqueness rule as the `users` table.
    #[derive(Default)]
    pub struct MemoryUserStore {
        users: Mutex<Vec<User>>,
    }

    impl MemoryUserStore {
        pub fn len(&self) -> usize {
            self.users.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == new_user.email) {
                return Err(StoreError::Duplicate);
            }
            let user = User {
                id: Uuid::new_v4(),
                email: new_user.email,
                password_hash: new_user.password_hash,
                profile: new_user.profile,
                created_at: Utc::now(),
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.email == email).cloned())
        }
    }
}
