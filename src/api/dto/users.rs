/*
 * Responsibility
 * - Users の request/response DTO (JSON は camelCase)
 * - validate() で形式チェック, into_* で domain 型へ変換
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Role, User, UserDraft};

const MAX_FU_ID_LEN: usize = 32;
const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 100;
const MAX_PHONE_LEN: usize = 20;

fn validate_fu_id(fu_id: &str) -> Result<(), &'static str> {
    if fu_id.is_empty() {
        return Err("fuId is required");
    }
    if fu_id.len() > MAX_FU_ID_LEN {
        return Err("fuId must be <= 32 chars");
    }
    // fuId ends up in paths and the Location header
    if !fu_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("fuId may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}

/// Stored form of an email: trimmed and lowercased, matching the
/// `lower(email)` unique index.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.len() > MAX_EMAIL_LEN {
        return Err("email must be <= 254 chars");
    }
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace) =>
        {
            Ok(())
        }
        _ => Err("email is invalid"),
    }
}

fn validate_profile(
    email: &str,
    first_name: &str,
    last_name: &str,
    phone_number: Option<&str>,
    department: Option<&str>,
) -> Result<(), &'static str> {
    validate_email(email)?;
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err("firstName and lastName are required");
    }
    if first_name.len() > MAX_NAME_LEN || last_name.len() > MAX_NAME_LEN {
        return Err("names must be <= 100 chars");
    }
    if let Some(phone) = phone_number
        && (phone.len() > MAX_PHONE_LEN
            || !phone
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-')))
    {
        return Err("phoneNumber is invalid");
    }
    if let Some(department) = department
        && department.len() > MAX_NAME_LEN
    {
        return Err("department must be <= 100 chars");
    }
    Ok(())
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub fu_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub department: Option<String>,
    pub role: Role,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_fu_id(&self.fu_id)?;
        validate_profile(
            &self.email,
            &self.first_name,
            &self.last_name,
            self.phone_number.as_deref(),
            self.department.as_deref(),
        )
    }

    pub fn into_parts(self) -> (String, UserDraft) {
        let draft = UserDraft {
            email: normalize_email(&self.email),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone_number: self.phone_number,
            department: self.department,
            role: self.role,
        };
        (self.fu_id, draft)
    }
}

/// Full replacement of a user's writable fields; the fuId comes from the path.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub department: Option<String>,
    pub role: Role,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_profile(
            &self.email,
            &self.first_name,
            &self.last_name,
            self.phone_number.as_deref(),
            self.department.as_deref(),
        )
    }

    pub fn into_draft(self) -> UserDraft {
        UserDraft {
            email: normalize_email(&self.email),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone_number: self.phone_number,
            department: self.department,
            role: self.role,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub fu_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub department: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            fu_id: user.fu_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            department: user.department,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
