//! WhatsApp click-to-chat links for payment follow-up.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::constants::WHATSAPP_BASE_URL;
use crate::error::{DomainError, DomainResult};

/// Minimum digits in an international phone number (country code + subscriber)
const MIN_PHONE_DIGITS: usize = 7;

/// Maximum digits allowed by E.164
const MAX_PHONE_DIGITS: usize = 15;

/// Everything outside the RFC 3986 unreserved set
const MESSAGE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A `https://wa.me/<phone>?text=<message>` link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WhatsAppLink {
    /// Phone number as digits only
    pub phone: String,
    /// Unencoded message text
    pub message: String,
    /// Full deep link
    pub url: String,
}

impl WhatsAppLink {
    /// Build a link. The phone may contain `+`, spaces, dashes and parentheses.
    pub fn new(phone: &str, message: &str) -> DomainResult<Self> {
        let digits = phone_digits(phone)?;
        let url = format!(
            "{}{}?text={}",
            WHATSAPP_BASE_URL,
            digits,
            utf8_percent_encode(message, MESSAGE_ENCODE_SET)
        );
        Ok(Self {
            phone: digits,
            message: message.to_string(),
            url,
        })
    }
}

/// Strip formatting from a phone number, leaving only digits.
fn phone_digits(phone: &str) -> DomainResult<String> {
    let mut digits = String::with_capacity(phone.len());
    for c in phone.chars() {
        match c {
            '0'..='9' => digits.push(c),
            '+' | ' ' | '-' | '(' | ')' | '.' => {}
            _ => {
                return Err(DomainError::validation(format!(
                    "Invalid character '{}' in phone number",
                    c
                )))
            }
        }
    }

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(DomainError::validation(format!(
            "Phone number must have between {} and {} digits",
            MIN_PHONE_DIGITS, MAX_PHONE_DIGITS
        )));
    }
    Ok(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_strips_phone_formatting() {
        let link = WhatsAppLink::new("+1 (555) 010-2030", "hi").unwrap();
        assert_eq!(link.phone, "15550102030");
        assert_eq!(link.url, "https://wa.me/15550102030?text=hi");
    }

    #[test]
    fn test_message_is_percent_encoded() {
        let link = WhatsAppLink::new("5511999990000", "Paid 10.00 USD & thanks!").unwrap();
        assert_eq!(
            link.url,
            "https://wa.me/5511999990000?text=Paid%2010.00%20USD%20%26%20thanks%21"
        );
    }

    #[test]
    fn test_utf8_is_encoded_per_byte() {
        let link = WhatsAppLink::new("5511999990000", "olá").unwrap();
        assert!(link.url.ends_with("ol%C3%A1"));
    }

    #[test]
    fn test_unreserved_marks_stay_literal() {
        let link = WhatsAppLink::new("5511999990000", "a-b_c.d~e/f").unwrap();
        assert!(link.url.ends_with("?text=a-b_c.d~e%2Ff"));
    }

    #[test]
    fn test_invalid_phone_rejected() {
        assert!(WhatsAppLink::new("call me", "hi").is_err());
        assert!(WhatsAppLink::new("123", "hi").is_err());
        assert!(WhatsAppLink::new("1234567890123456", "hi").is_err());
    }
}
