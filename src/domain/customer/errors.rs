use crate::domain::FieldError;

// ============================================================================
// Customer Validation Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CustomerError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name is too long ({0} characters, at most 100)")]
    NameTooLong(usize),

    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    #[error("Phone number is too long ({0} characters, at most 16)")]
    PhoneNumberTooLong(usize),

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Email is too long ({0} characters, at most 254)")]
    EmailTooLong(usize),
}

impl FieldError for CustomerError {
    fn field(&self) -> &'static str {
        match self {
            CustomerError::EmptyName | CustomerError::NameTooLong(_) => "name",
            CustomerError::InvalidPhoneNumber(_) | CustomerError::PhoneNumberTooLong(_) => {
                "phone_number"
            }
            CustomerError::EmptyEmail
            | CustomerError::InvalidEmail(_)
            | CustomerError::EmailTooLong(_) => "email",
        }
    }
}
