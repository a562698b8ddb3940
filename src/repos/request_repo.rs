/*
 * Responsibility
 * - requests CRUD
 * - exam_slot_id の FK 違反は ReferenceViolation として返す
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::domain::{Request, RequestDraft};
use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, FromRow)]
pub struct RequestRow {
    pub id: i64,
    pub exam_slot_id: i64,
    pub created_by: String,
    pub updated_by: String,
    pub reason: Option<String>,
    pub status: i32,
    pub request_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RequestRow> for Request {
    fn from(row: RequestRow) -> Self {
        Request {
            id: row.id,
            exam_slot_id: row.exam_slot_id,
            created_by: row.created_by,
            updated_by: row.updated_by,
            reason: row.reason,
            status: row.status,
            request_type: row.request_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn list(&self) -> RepoResult<Vec<Request>>;

    async fn get(&self, id: i64) -> RepoResult<Option<Request>>;

    async fn create(&self, draft: &RequestDraft, actor: &str) -> RepoResult<Request>;

    async fn update(
        &self,
        id: i64,
        draft: &RequestDraft,
        actor: &str,
    ) -> RepoResult<Option<Request>>;

    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

#[derive(Clone, Debug)]
pub struct PgRequestRepository {
    db: PgPool,
}

impl PgRequestRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RequestRepository for PgRequestRepository {
    async fn list(&self) -> RepoResult<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(
            r#"
            SELECT id, exam_slot_id, created_by, updated_by, reason, status, request_type,
                   created_at, updated_at
            FROM requests
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(rows.into_iter().map(Request::from).collect())
    }

    async fn get(&self, id: i64) -> RepoResult<Option<Request>> {
        let row = sqlx::query_as::<_, RequestRow>(
            r#"
            SELECT id, exam_slot_id, created_by, updated_by, reason, status, request_type,
                   created_at, updated_at
            FROM requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row.map(Request::from))
    }

    async fn create(&self, draft: &RequestDraft, actor: &str) -> RepoResult<Request> {
        let row = sqlx::query_as::<_, RequestRow>(
            r#"
            INSERT INTO requests
                (exam_slot_id, created_by, updated_by, reason, status, request_type)
            VALUES ($1, $2, $2, $3, $4, $5)
            RETURNING id, exam_slot_id, created_by, updated_by, reason, status, request_type,
                      created_at, updated_at
            "#,
        )
        .bind(draft.exam_slot_id)
        .bind(actor)
        .bind(draft.reason.as_deref())
        .bind(draft.status)
        .bind(&draft.request_type)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: i64,
        draft: &RequestDraft,
        actor: &str,
    ) -> RepoResult<Option<Request>> {
        let row = sqlx::query_as::<_, RequestRow>(
            r#"
            UPDATE requests
            SET
                exam_slot_id = $2,
                reason = $3,
                status = $4,
                request_type = $5,
                updated_by = $6,
                updated_at = now()
            WHERE id = $1
            RETURNING id, exam_slot_id, created_by, updated_by, reason, status, request_type,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(draft.exam_slot_id)
        .bind(draft.reason.as_deref())
        .bind(draft.status)
        .bind(&draft.request_type)
        .bind(actor)
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row.map(Request::from))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }
}
