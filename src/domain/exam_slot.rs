use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSlot {
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

/// Client-controlled fields of an exam slot.
/// `created_by`/`updated_by` come from the authenticated caller instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSlotDraft {
    pub subject_exam_id: i64,
    pub status: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}
