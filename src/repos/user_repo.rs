/*
 * Responsibility
 * - users テーブル向け SQLx 操作
 * - PgPool を受け取り CRUD を提供
 * - DB エラーは RepoError に変換して返す
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::domain::{Role, User, UserDraft};
use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub fu_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub department: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| RepoError::InvalidRow(e.to_string()))?;

        Ok(User {
            fu_id: row.fu_id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone_number: row.phone_number,
            department: row.department,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> RepoResult<Vec<User>>;

    async fn get(&self, fu_id: &str) -> RepoResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Fails with `RepoError::Conflict` when `fu_id` or `email` is taken.
    async fn create(&self, fu_id: &str, draft: &UserDraft) -> RepoResult<User>;

    /// Full replacement of the writable fields. `Ok(None)` when the user does not exist.
    async fn update(&self, fu_id: &str, draft: &UserDraft) -> RepoResult<Option<User>>;

    /// `Ok(false)` when nothing was deleted.
    async fn delete(&self, fu_id: &str) -> RepoResult<bool>;
}

#[derive(Clone, Debug)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list(&self) -> RepoResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT fu_id, email, first_name, last_name, phone_number, department, role,
                   created_at, updated_at
            FROM users
            ORDER BY created_at DESC, fu_id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn get(&self, fu_id: &str) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT fu_id, email, first_name, last_name, phone_number, department, role,
                   created_at, updated_at
            FROM users
            WHERE fu_id = $1
            "#,
        )
        .bind(fu_id)
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT fu_id, email, first_name, last_name, phone_number, department, role,
                   created_at, updated_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        row.map(User::try_from).transpose()
    }

    async fn create(&self, fu_id: &str, draft: &UserDraft) -> RepoResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (fu_id, email, first_name, last_name, phone_number, department, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING fu_id, email, first_name, last_name, phone_number, department, role,
                      created_at, updated_at
            "#,
        )
        .bind(fu_id)
        .bind(&draft.email)
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(draft.phone_number.as_deref())
        .bind(draft.department.as_deref())
        .bind(draft.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        User::try_from(row)
    }

    async fn update(&self, fu_id: &str, draft: &UserDraft) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET
                email = $2,
                first_name = $3,
                last_name = $4,
                phone_number = $5,
                department = $6,
                role = $7,
                updated_at = now()
            WHERE fu_id = $1
            RETURNING fu_id, email, first_name, last_name, phone_number, department, role,
                      created_at, updated_at
            "#,
        )
        .bind(fu_id)
        .bind(&draft.email)
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(draft.phone_number.as_deref())
        .bind(draft.department.as_deref())
        .bind(draft.role.as_str())
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        row.map(User::try_from).transpose()
    }

    async fn delete(&self, fu_id: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE fu_id = $1
            "#,
        )
        .bind(fu_id)
        .execute(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }
}
