pub mod docs;
pub mod exam_slots;
pub mod health;
pub mod oauth;
pub mod requests;
pub mod users;
