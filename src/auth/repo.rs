use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User, UserStatus};
use crate::store::StoreResult;

/// Credential store. Each call touches a single document.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Fails with `StoreError::Duplicate` when the email is taken.
    async fn insert(&self, user: NewUser) -> StoreResult<User>;
    /// Returns `false` when no user has this email.
    async fn set_status(&self, email: &str, status: UserStatus) -> StoreResult<bool>;
    async fn set_password_hash(&self, email: &str, password_hash: &str) -> StoreResult<bool>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, photo, status
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, photo, status
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, photo)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password_hash, photo, status
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.photo)
        .fetch_one(&self.db)
        .await?;
        Ok(created)
    }

    async fn set_status(&self, email: &str, status: UserStatus) -> StoreResult<bool> {
        let res = sqlx::query("UPDATE users SET status = $1 WHERE email = $2")
            .bind(status)
            .bind(email)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_password_hash(&self, email: &str, password_hash: &str) -> StoreResult<bool> {
        let res = sqlx::query("UPDATE users SET password_hash = $1 WHERE email = $2")
            .bind(password_hash)
            .bind(email)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
