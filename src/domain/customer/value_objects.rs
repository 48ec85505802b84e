use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use super::errors::CustomerError;

// ============================================================================
// Customer Value Objects
// ============================================================================

pub const NAME_MAX_LEN: usize = 100;
pub const PHONE_NUMBER_MAX_LEN: usize = 16;
pub const EMAIL_MAX_LEN: usize = 254;

static PHONE_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?1?\d{8,15}$").expect("phone number pattern compiles"));

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Customer phone number, optionally prefixed with `+` and a leading `1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, CustomerError> {
        let phone = raw.trim();
        if !PHONE_NUMBER_PATTERN.is_match(phone) {
            return Err(CustomerError::InvalidPhoneNumber(phone.to_string()));
        }
        // "+1" plus fifteen digits passes the pattern but not the column width
        if phone.len() > PHONE_NUMBER_MAX_LEN {
            return Err(CustomerError::PhoneNumberTooLong(phone.len()));
        }
        Ok(Self(phone.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Customer email address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, CustomerError> {
        let email = raw.trim();
        if email.is_empty() {
            return Err(CustomerError::EmptyEmail);
        }
        if email.chars().count() > EMAIL_MAX_LEN {
            return Err(CustomerError::EmailTooLong(email.chars().count()));
        }
        if !EMAIL_PATTERN.is_match(email) {
            return Err(CustomerError::InvalidEmail(email.to_string()));
        }
        Ok(Self(email.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a customer display name.
pub fn parse_name(raw: &str) -> Result<String, CustomerError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CustomerError::EmptyName);
    }
    let len = name.chars().count();
    if len > NAME_MAX_LEN {
        return Err(CustomerError::NameTooLong(len));
    }
    Ok(name.to_string())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_number_accepts_plain_and_prefixed_forms() {
        for raw in ["12345678", "+79991234567", "+1234567890123", "123456789012345"] {
            let phone = PhoneNumber::parse(raw).unwrap();
            assert_eq!(phone.as_str(), raw);
        }
    }

    #[test]
    fn test_phone_number_rejects_malformed_input() {
        for raw in ["1234567", "+12-3456-7890", "phone", "", "++12345678"] {
            let result = PhoneNumber::parse(raw);
            assert!(matches!(result, Err(CustomerError::InvalidPhoneNumber(_))), "{raw}");
        }
    }

    #[test]
    fn test_phone_number_rejects_column_overflow() {
        // sixteen digits after "+1" match the pattern but exceed sixteen characters
        let result = PhoneNumber::parse("+1123456789012345");
        assert_eq!(result, Err(CustomerError::PhoneNumberTooLong(17)));
    }

    #[test]
    fn test_phone_number_is_trimmed() {
        let phone = PhoneNumber::parse("  +79991234567 ").unwrap();
        assert_eq!(phone.as_str(), "+79991234567");
    }

    #[test]
    fn test_email_validation() {
        assert!(Email::parse("anna@example.com").is_ok());
        assert_eq!(Email::parse("   "), Err(CustomerError::EmptyEmail));
        assert!(matches!(Email::parse("anna.example.com"), Err(CustomerError::InvalidEmail(_))));
        assert!(matches!(Email::parse("anna@localhost"), Err(CustomerError::InvalidEmail(_))));
        assert!(matches!(Email::parse("an na@example.com"), Err(CustomerError::InvalidEmail(_))));
    }

    #[test]
    fn test_email_length_limit() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(Email::parse(&long), Err(CustomerError::EmailTooLong(_))));
    }

    #[test]
    fn test_name_validation() {
        assert_eq!(parse_name(" Anna ").unwrap(), "Anna");
        assert_eq!(parse_name(""), Err(CustomerError::EmptyName));
        assert_eq!(parse_name(&"x".repeat(101)), Err(CustomerError::NameTooLong(101)));
        assert!(parse_name(&"я".repeat(100)).is_ok());
    }
}
