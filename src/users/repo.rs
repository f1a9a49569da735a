use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::error::StoreError;
use crate::users::repo_types::{NewUser, User, UserPatch};

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence seam for users. Row counts are "rows matched".
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn email_exists(&self, email: &str) -> StoreResult<bool>;
    async fn insert(&self, user: &NewUser) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<User>>;
    async fn update(&self, id: i32, patch: &UserPatch) -> StoreResult<u64>;
    async fn delete(&self, id: i32) -> StoreResult<u64>;
    async fn ping(&self) -> StoreResult<()>;
}

/// Postgres-backed store. Every call checks out its own pooled connection,
/// which goes back to the pool when it is dropped.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let row: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let mut conn = self.pool.acquire().await?;
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;
        debug!(count = users.len(), "listed users");
        Ok(users)
    }

    async fn update(&self, id: i32, patch: &UserPatch) -> StoreResult<u64> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($1, name),
                email = COALESCE($2, email),
                password = COALESCE($3, password)
            WHERE id = $4
            "#,
        )
        .bind(patch.name.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.password.as_deref())
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i32) -> StoreResult<u64> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        Ok(())
    }
}
