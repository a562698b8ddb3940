pub mod exam_slots;
pub mod oauth;
pub mod requests;
pub mod users;
