use chrono::{DateTime, Utc};

/// A request raised against an exam slot (swap, absence, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    pub exam_slot_id: i64,
    pub reason: Option<String>,
    pub status: i32,
    pub request_type: String,
}
