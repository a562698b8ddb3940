/*
 * Responsibility
 * - Requests の request/response DTO
 * - examSlotId は公開 ID のまま受け取り、handler で decode する
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const MAX_REQUEST_TYPE_LEN: usize = 50;
const MAX_REASON_LEN: usize = 1000;

/// Body of both create and update (full replacement).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    /// Public id of the exam slot
    pub exam_slot_id: String,
    pub reason: Option<String>,
    pub status: i32,
    pub request_type: String,
}

impl RequestPayload {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.exam_slot_id.trim().is_empty() {
            return Err("examSlotId is required");
        }
        let request_type = self.request_type.trim();
        if request_type.is_empty() {
            return Err("requestType is required");
        }
        if request_type.chars().count() > MAX_REQUEST_TYPE_LEN {
            return Err("requestType must be <= 50 chars");
        }
        if let Some(reason) = &self.reason
            && reason.chars().count() > MAX_REASON_LEN
        {
            return Err("reason must be <= 1000 chars");
        }
        if self.status < 0 {
            return Err("status must be non-negative");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
    pub id: String,           // encoded
    pub exam_slot_id: String, // encoded
    pub created_by: String,
    pub updated_by: String,
    pub reason: Option<String>,
    pub status: i32,
    pub request_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(request_type: &str) -> RequestPayload {
        RequestPayload {
            exam_slot_id: "abcdefghij".to_string(),
            reason: None,
            status: 0,
            request_type: request_type.to_string(),
        }
    }

    #[test]
    fn request_type_length_is_bounded() {
        assert_eq!(payload("SWAP_SLOT").validate(), Ok(()));
        assert_eq!(payload(&"x".repeat(50)).validate(), Ok(()));
        assert_eq!(
            payload(&"x".repeat(51)).validate(),
            Err("requestType must be <= 50 chars")
        );
        assert_eq!(payload(" ").validate(), Err("requestType is required"));
    }
}
