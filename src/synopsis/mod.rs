//! Synopsis Module
//!
//! Study request types, protocol field assembly and template rendering.

mod fields;
mod request;
mod template;

pub use fields::{build_fields, protocol_id, rationale_text, SynopsisInputs};
pub use request::{IntakeMode, StudyRequest};
pub use template::SynopsisTemplate;
