pub mod principal;
pub mod public_id;

pub use principal::{CurrentPrincipal, Principal};
pub use public_id::{PublicExamSlotId, PublicRequestId};
