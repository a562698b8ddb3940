/*
 * Responsibility
 * - SQLx 操作 (users / exam_slots / requests)
 * - 各 repo は trait + PgPool 実装を持つ (handler は trait object 越しに使う)
 * - row -> domain の変換はここで閉じる
 */
pub mod error;
pub mod exam_slot_repo;
pub mod request_repo;
pub mod user_repo;

pub use error::{RepoError, RepoResult};
pub use exam_slot_repo::{ExamSlotRepository, PgExamSlotRepository};
pub use request_repo::{PgRequestRepository, RequestRepository};
pub use user_repo::{PgUserRepository, UserRepository};
