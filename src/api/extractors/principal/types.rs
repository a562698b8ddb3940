/*
 * Responsibility
 * - Handler から見える「認証済み主体」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 * - リクエスト終了とともに破棄される (セッションには保存しない)
 */
use chrono::{DateTime, Utc};

use crate::services::auth::VerifiedAccessToken;

/// Identity of the caller for the duration of one request.
///
/// - `subject` is the user's fuId
/// - `roles` are carried but not enforced by any endpoint
/// - `jti` is for audit/correlation only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub roles: Vec<String>,
    pub jti: Option<String>,
}

impl From<VerifiedAccessToken> for Principal {
    fn from(token: VerifiedAccessToken) -> Self {
        Self {
            subject: token.subject,
            issued_at: token.issued_at,
            expires_at: token.expires_at,
            roles: token.roles,
            jti: token.jti,
        }
    }
}
