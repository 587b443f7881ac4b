//! Field validators used by request payloads.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// Optional leading `+`, then digits with common separators.
static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ().-]{5,22}[0-9]$").unwrap());

/// Accepts formatted international numbers like `+1 (555) 010-2030`.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone) {
        Ok(())
    } else {
        let mut error = ValidationError::new("phone");
        error.message = Some("Invalid phone number".into());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_numbers_accepted() {
        assert!(validate_phone("+1 (555) 010-2030").is_ok());
        assert!(validate_phone("5511999990000").is_ok());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("12").is_err());
        assert!(validate_phone("+1 555 010 2030 x").is_err());
    }
}
