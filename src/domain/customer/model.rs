use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::CustomerError;
use super::value_objects::{parse_name, Email, PhoneNumber};

// ============================================================================
// Customer Model
// ============================================================================

/// A persisted customer row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}, {}", self.name, self.phone_number, self.email)
    }
}

/// Raw customer form as submitted by staff.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerForm {
    pub name: String,
    pub phone_number: String,
    pub email: String,
}

/// A validated customer, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub phone_number: PhoneNumber,
    pub email: Email,
}

impl NewCustomer {
    /// Validate every field of the form, reporting all failing fields at once.
    pub fn from_form(form: &CustomerForm) -> Result<Self, Vec<CustomerError>> {
        match (
            parse_name(&form.name),
            PhoneNumber::parse(&form.phone_number),
            Email::parse(&form.email),
        ) {
            (Ok(name), Ok(phone_number), Ok(email)) => Ok(Self {
                name,
                phone_number,
                email,
            }),
            (name, phone_number, email) => Err([name.err(), phone_number.err(), email.err()]
                .into_iter()
                .flatten()
                .collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldError;

    fn form(name: &str, phone: &str, email: &str) -> CustomerForm {
        CustomerForm {
            name: name.to_string(),
            phone_number: phone.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let customer = NewCustomer::from_form(&form("Anna", "+79991234567", "anna@example.com"))
            .unwrap();
        assert_eq!(customer.name, "Anna");
        assert_eq!(customer.phone_number.as_str(), "+79991234567");
        assert_eq!(customer.email.as_str(), "anna@example.com");
    }

    #[test]
    fn test_every_invalid_field_is_reported() {
        let errors = NewCustomer::from_form(&form("", "12", "nope")).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["name", "phone_number", "email"]);
    }

    #[test]
    fn test_single_invalid_field() {
        let errors = NewCustomer::from_form(&form("Anna", "call me", "anna@example.com"))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field(), "phone_number");
    }

    #[test]
    fn test_display() {
        let now = Utc::now();
        let customer = Customer {
            id: 1,
            name: "Anna".to_string(),
            phone_number: "+79991234567".to_string(),
            email: "anna@example.com".to_string(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(customer.to_string(), "Anna: +79991234567, anna@example.com");
    }
}
