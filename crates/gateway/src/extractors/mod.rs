//! Custom request extractors and field validators.

mod validated_json;
mod validators;

pub use validated_json::ValidatedJson;
pub use validators::validate_phone;
