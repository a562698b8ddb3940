/*
 * Responsibility
 * - exam_slots CRUD
 * - created_by / updated_by は users.fu_id への FK (存在しない actor は ReferenceViolation)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::domain::{ExamSlot, ExamSlotDraft};
use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, FromRow)]
pub struct ExamSlotRow {
    pub id: i64,
    pub subject_exam_id: i64,
    pub status: i32,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl From<ExamSlotRow> for ExamSlot {
    fn from(row: ExamSlotRow) -> Self {
        ExamSlot {
            id: row.id,
            subject_exam_id: row.subject_exam_id,
            status: row.status,
            created_by: row.created_by,
            updated_by: row.updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            start_at: row.start_at,
            end_at: row.end_at,
        }
    }
}

#[async_trait]
pub trait ExamSlotRepository: Send + Sync {
    async fn list(&self) -> RepoResult<Vec<ExamSlot>>;

    async fn get(&self, id: i64) -> RepoResult<Option<ExamSlot>>;

    async fn create(&self, draft: &ExamSlotDraft, actor: &str) -> RepoResult<ExamSlot>;

    async fn update(
        &self,
        id: i64,
        draft: &ExamSlotDraft,
        actor: &str,
    ) -> RepoResult<Option<ExamSlot>>;

    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

#[derive(Clone, Debug)]
pub struct PgExamSlotRepository {
    db: PgPool,
}

impl PgExamSlotRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ExamSlotRepository for PgExamSlotRepository {
    async fn list(&self) -> RepoResult<Vec<ExamSlot>> {
        let rows = sqlx::query_as::<_, ExamSlotRow>(
            r#"
            SELECT id, subject_exam_id, status, created_by, updated_by,
                   created_at, updated_at, start_at, end_at
            FROM exam_slots
            ORDER BY start_at, id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(rows.into_iter().map(ExamSlot::from).collect())
    }

    async fn get(&self, id: i64) -> RepoResult<Option<ExamSlot>> {
        let row = sqlx::query_as::<_, ExamSlotRow>(
            r#"
            SELECT id, subject_exam_id, status, created_by, updated_by,
                   created_at, updated_at, start_at, end_at
            FROM exam_slots
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row.map(ExamSlot::from))
    }

    async fn create(&self, draft: &ExamSlotDraft, actor: &str) -> RepoResult<ExamSlot> {
        let row = sqlx::query_as::<_, ExamSlotRow>(
            r#"
            INSERT INTO exam_slots
                (subject_exam_id, status, created_by, updated_by, start_at, end_at)
            VALUES ($1, $2, $3, $3, $4, $5)
            RETURNING id, subject_exam_id, status, created_by, updated_by,
                      created_at, updated_at, start_at, end_at
            "#,
        )
        .bind(draft.subject_exam_id)
        .bind(draft.status)
        .bind(actor)
        .bind(draft.start_at)
        .bind(draft.end_at)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: i64,
        draft: &ExamSlotDraft,
        actor: &str,
    ) -> RepoResult<Option<ExamSlot>> {
        let row = sqlx::query_as::<_, ExamSlotRow>(
            r#"
            UPDATE exam_slots
            SET
                subject_exam_id = $2,
                status = $3,
                start_at = $4,
                end_at = $5,
                updated_by = $6,
                updated_at = now()
            WHERE id = $1
            RETURNING id, subject_exam_id, status, created_by, updated_by,
                      created_at, updated_at, start_at, end_at
            "#,
        )
        .bind(id)
        .bind(draft.subject_exam_id)
        .bind(draft.status)
        .bind(draft.start_at)
        .bind(draft.end_at)
        .bind(actor)
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row.map(ExamSlot::from))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        // requests.exam_slot_id cascades
        let result = sqlx::query(
            r#"
            DELETE FROM exam_slots
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
