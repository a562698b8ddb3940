/*
 * Responsibility
 * - In-memory domain structs (User / ExamSlot / Request)
 * - repos map rows into these, handlers map these into DTOs
 */
pub mod exam_slot;
pub mod request;
pub mod user;

pub use exam_slot::{ExamSlot, ExamSlotDraft};
pub use request::{Request, RequestDraft};
pub use user::{Role, User, UserDraft};
