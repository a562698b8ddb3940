#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

//! Shared harness for router tests: an in-memory store standing in for
//! Postgres (same conflict / reference rules as the schema, including the
//! `lower(email)` unique index), fixture keys,
//! and request helpers.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request as HttpRequest, header},
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use eims_api::{
    app,
    domain::{ExamSlot, ExamSlotDraft, Request, RequestDraft, Role, User, UserDraft},
    repos::{ExamSlotRepository, RepoError, RepoResult, RequestRepository, UserRepository},
    services::{
        auth::{AccessPolicy, AuthService, IdTokenVerifier, JwtIssuer},
        id_codec::IdCodec,
    },
    state::AppState,
};

pub const ISSUER: &str = "https://auth.eims.test";
pub const AUDIENCE: &str = "eims-api";
pub const TTL_SECONDS: u64 = 600;

const ACCESS_PRIVATE_PEM: &str = include_str!("../fixtures/access_ed25519_private.pem");
const ACCESS_PUBLIC_PEM: &str = include_str!("../fixtures/access_ed25519_public.pem");
const FOREIGN_PRIVATE_PEM: &str = include_str!("../fixtures/foreign_ed25519_private.pem");
const UPSTREAM_PRIVATE_PEM: &str = include_str!("../fixtures/upstream_ed25519_private.pem");
const UPSTREAM_PUBLIC_PEM: &str = include_str!("../fixtures/upstream_ed25519_public.pem");

pub const UPSTREAM_ISSUER: &str = "https://accounts.example.test";
pub const UPSTREAM_CLIENT_ID: &str = "eims-web";

const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    exam_slots: Vec<ExamSlot>,
    requests: Vec<Request>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_exists(&self, fu_id: &str) -> bool {
        self.users.iter().any(|u| u.fu_id == fu_id)
    }

    fn user_referenced(&self, fu_id: &str) -> bool {
        self.exam_slots
            .iter()
            .any(|s| s.created_by == fu_id || s.updated_by == fu_id)
            || self
                .requests
                .iter()
                .any(|r| r.created_by == fu_id || r.updated_by == fu_id)
    }
}

#[derive(Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
}

impl MemoryDb {
    pub fn seed_user(&self, fu_id: &str, email: &str, role: Role) {
        let now = Utc::now();
        self.tables.lock().unwrap().users.push(User {
            fu_id: fu_id.to_string(),
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: fu_id.to_string(),
            phone_number: None,
            department: None,
            role,
            created_at: now,
            updated_at: now,
        });
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }

    pub fn request_count(&self) -> usize {
        self.tables.lock().unwrap().requests.len()
    }
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn list(&self) -> RepoResult<Vec<User>> {
        Ok(self.tables.lock().unwrap().users.clone())
    }

    async fn get(&self, fu_id: &str) -> RepoResult<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.fu_id == fu_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.to_lowercase() == email.to_lowercase())
            .cloned())
    }

    async fn create(&self, fu_id: &str, draft: &UserDraft) -> RepoResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .users
            .iter()
            .any(|u| u.fu_id == fu_id || u.email.to_lowercase() == draft.email.to_lowercase())
        {
            return Err(RepoError::Conflict);
        }

        let now = Utc::now();
        let user = User {
            fu_id: fu_id.to_string(),
            email: draft.email.clone(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            phone_number: draft.phone_number.clone(),
            department: draft.department.clone(),
            role: draft.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, fu_id: &str, draft: &UserDraft) -> RepoResult<Option<User>> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .users
            .iter()
            .any(|u| u.fu_id != fu_id && u.email.to_lowercase() == draft.email.to_lowercase())
        {
            return Err(RepoError::Conflict);
        }

        let Some(user) = tables.users.iter_mut().find(|u| u.fu_id == fu_id) else {
            return Ok(None);
        };
        user.email = draft.email.clone();
        user.first_name = draft.first_name.clone();
        user.last_name = draft.last_name.clone();
        user.phone_number = draft.phone_number.clone();
        user.department = draft.department.clone();
        user.role = draft.role;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, fu_id: &str) -> RepoResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        if tables.user_referenced(fu_id) {
            return Err(RepoError::ReferenceViolation);
        }
        let before = tables.users.len();
        tables.users.retain(|u| u.fu_id != fu_id);
        Ok(tables.users.len() != before)
    }
}

#[async_trait]
impl ExamSlotRepository for MemoryDb {
    async fn list(&self) -> RepoResult<Vec<ExamSlot>> {
        Ok(self.tables.lock().unwrap().exam_slots.clone())
    }

    async fn get(&self, id: i64) -> RepoResult<Option<ExamSlot>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.exam_slots.iter().find(|s| s.id == id).cloned())
    }

    async fn create(&self, draft: &ExamSlotDraft, actor: &str) -> RepoResult<ExamSlot> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.user_exists(actor) {
            return Err(RepoError::ReferenceViolation);
        }

        let now = Utc::now();
        let slot = ExamSlot {
            id: tables.next_id(),
            subject_exam_id: draft.subject_exam_id,
            status: draft.status,
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
            created_at: now,
            updated_at: now,
            start_at: draft.start_at,
            end_at: draft.end_at,
        };
        tables.exam_slots.push(slot.clone());
        Ok(slot)
    }

    async fn update(
        &self,
        id: i64,
        draft: &ExamSlotDraft,
        actor: &str,
    ) -> RepoResult<Option<ExamSlot>> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.user_exists(actor) {
            return Err(RepoError::ReferenceViolation);
        }

        let Some(slot) = tables.exam_slots.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        slot.subject_exam_id = draft.subject_exam_id;
        slot.status = draft.status;
        slot.start_at = draft.start_at;
        slot.end_at = draft.end_at;
        slot.updated_by = actor.to_string();
        slot.updated_at = Utc::now();
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.exam_slots.len();
        tables.exam_slots.retain(|s| s.id != id);
        // ON DELETE CASCADE
        tables.requests.retain(|r| r.exam_slot_id != id);
        Ok(tables.exam_slots.len() != before)
    }
}

#[async_trait]
impl RequestRepository for MemoryDb {
    async fn list(&self) -> RepoResult<Vec<Request>> {
        Ok(self.tables.lock().unwrap().requests.clone())
    }

    async fn get(&self, id: i64) -> RepoResult<Option<Request>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, draft: &RequestDraft, actor: &str) -> RepoResult<Request> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.user_exists(actor) || !tables.exam_slots.iter().any(|s| s.id == draft.exam_slot_id)
        {
            return Err(RepoError::ReferenceViolation);
        }

        let now = Utc::now();
        let request = Request {
            id: tables.next_id(),
            exam_slot_id: draft.exam_slot_id,
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
            reason: draft.reason.clone(),
            status: draft.status,
            request_type: draft.request_type.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.requests.push(request.clone());
        Ok(request)
    }

    async fn update(
        &self,
        id: i64,
        draft: &RequestDraft,
        actor: &str,
    ) -> RepoResult<Option<Request>> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.user_exists(actor) || !tables.exam_slots.iter().any(|s| s.id == draft.exam_slot_id)
        {
            return Err(RepoError::ReferenceViolation);
        }

        let Some(request) = tables.requests.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        request.exam_slot_id = draft.exam_slot_id;
        request.reason = draft.reason.clone();
        request.status = draft.status;
        request.request_type = draft.request_type.clone();
        request.updated_by = actor.to_string();
        request.updated_at = Utc::now();
        Ok(Some(request.clone()))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.requests.len();
        tables.requests.retain(|r| r.id != id);
        Ok(tables.requests.len() != before)
    }
}

pub struct TestApp {
    pub db: Arc<MemoryDb>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let db = Arc::new(MemoryDb::default());

        let issuer = JwtIssuer::new(
            ACCESS_PRIVATE_PEM,
            ISSUER.to_string(),
            AUDIENCE.to_string(),
            TTL_SECONDS,
        )
        .expect("issuer");
        let auth = AuthService::new(issuer, ACCESS_PUBLIC_PEM, 0).expect("auth service");
        let id_tokens = IdTokenVerifier::new(
            UPSTREAM_PUBLIC_PEM,
            Algorithm::EdDSA,
            UPSTREAM_ISSUER,
            UPSTREAM_CLIENT_ID,
            0,
        )
        .expect("id token verifier");
        let policy = AccessPolicy::with_defaults(&[]).expect("policy");
        let id_codec = IdCodec::new(10, ALPHABET).expect("id codec");

        let state = AppState::new(
            db.clone(),
            db.clone(),
            db.clone(),
            Arc::new(auth),
            Arc::new(id_tokens),
            Arc::new(policy),
            id_codec,
        );

        Self { db, state }
    }

    pub fn router(&self) -> Router {
        app::router(self.state.clone())
    }

    pub fn token_for(&self, subject: &str) -> String {
        self.state
            .auth
            .issuer()
            .issue(subject, &["ADMIN".to_string()])
            .expect("issue")
            .token
    }

    pub fn expired_token_for(&self, subject: &str) -> String {
        let issued_at = Utc::now() - Duration::seconds(TTL_SECONDS as i64 + 1);
        self.state
            .auth
            .issuer()
            .issue_at(subject, &["ADMIN".to_string()], issued_at)
            .expect("issue")
            .token
    }

    pub fn public_id(&self, id: i64) -> String {
        self.state.id_codec.encode(id).expect("encode")
    }
}

/// Same claims and issuer, signed with a key the service does not trust.
pub fn foreign_token_for(subject: &str) -> String {
    JwtIssuer::new(
        FOREIGN_PRIVATE_PEM,
        ISSUER.to_string(),
        AUDIENCE.to_string(),
        TTL_SECONDS,
    )
    .expect("issuer")
    .issue(subject, &["ADMIN".to_string()])
    .expect("issue")
    .token
}

fn sign_id_token(private_pem: &str, claims: serde_json::Value) -> String {
    let key = EncodingKey::from_ed_pem(private_pem.as_bytes()).expect("upstream key");
    jsonwebtoken::encode(&Header::new(Algorithm::EdDSA), &claims, &key).expect("sign id_token")
}

/// Claims an upstream provider would put in an id_token for `email`,
/// for tests to tweak before signing.
pub fn id_token_claims(email: &str) -> serde_json::Value {
    let now = Utc::now().timestamp();
    serde_json::json!({
        "iss": UPSTREAM_ISSUER,
        "aud": UPSTREAM_CLIENT_ID,
        "sub": "upstream-1029384756",
        "email": email,
        "email_verified": true,
        "iat": now,
        "exp": now + 300,
    })
}

/// id_token signed by the trusted upstream provider.
pub fn upstream_id_token(claims: serde_json::Value) -> String {
    sign_id_token(UPSTREAM_PRIVATE_PEM, claims)
}

pub fn id_token_for(email: &str) -> String {
    upstream_id_token(id_token_claims(email))
}

/// Well-formed id_token for `email` signed with a key nobody trusts.
pub fn foreign_id_token_for(email: &str) -> String {
    sign_id_token(FOREIGN_PRIVATE_PEM, id_token_claims(email))
}

pub fn request(method: Method, uri: &str, token: Option<&str>) -> HttpRequest<Body> {
    let mut builder = HttpRequest::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> HttpRequest<Body> {
    let mut builder = HttpRequest::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
