/*
 * Responsibility
 * - ExamSlots の request/response DTO
 * - id は公開 ID (encode 済み) を返す (内部 ID を漏らさない)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ExamSlotDraft;

/// Body of both create and update (full replacement).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExamSlotRequest {
    pub subject_exam_id: i64,
    pub status: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl ExamSlotRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.subject_exam_id <= 0 {
            return Err("subjectExamId must be positive");
        }
        if self.status < 0 {
            return Err("status must be non-negative");
        }
        if self.end_at <= self.start_at {
            return Err("endAt must be after startAt");
        }
        Ok(())
    }

    pub fn into_draft(self) -> ExamSlotDraft {
        ExamSlotDraft {
            subject_exam_id: self.subject_exam_id,
            status: self.status,
            start_at: self.start_at,
            end_at: self.end_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExamSlotResponse {
    pub id: String, // encoded
    pub subject_exam_id: i64,
    pub status: i32,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn slot(hours: i64) -> ExamSlotRequest {
        let start_at = Utc::now();
        ExamSlotRequest {
            subject_exam_id: 7,
            status: 0,
            start_at,
            end_at: start_at + Duration::hours(hours),
        }
    }

    #[test]
    fn slot_must_end_after_it_starts() {
        assert_eq!(slot(2).validate(), Ok(()));
        assert_eq!(slot(0).validate(), Err("endAt must be after startAt"));
        assert_eq!(slot(-1).validate(), Err("endAt must be after startAt"));
    }

    #[test]
    fn subject_exam_must_be_positive() {
        let mut req = slot(1);
        req.subject_exam_id = 0;
        assert!(req.validate().is_err());
    }
}
