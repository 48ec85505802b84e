use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::FieldError;
use crate::store::StoreError;

// ============================================================================
// Admin Errors - what staff sees when a request fails
// ============================================================================

/// Form errors keyed by field name, rendered as `{ "field": ["message"] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn from_errors<E: FieldError>(errors: &[E]) -> Self {
        let mut map = Self::default();
        for error in errors {
            map.push(error.field(), error.to_string());
        }
        map
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut map = Self::default();
        map.push(field, message.into());
        map
    }

    fn push(&mut self, field: &str, message: String) {
        self.0.entry(field.to_string()).or_default().push(message);
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Invalid {entity} form")]
    Validation {
        entity: &'static str,
        errors: FieldErrors,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for AdminError {
    fn status_code(&self) -> StatusCode {
        match self {
            AdminError::Validation { .. } => StatusCode::BAD_REQUEST,
            AdminError::Store(StoreError::DuplicatePhoneNumber(_)) => StatusCode::BAD_REQUEST,
            AdminError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AdminError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            AdminError::Validation { errors, .. } => {
                response.json(serde_json::json!({ "errors": errors }))
            }
            AdminError::Store(StoreError::DuplicatePhoneNumber(_)) => {
                let errors = FieldErrors::single(
                    "phone_number",
                    "Customer with this phone number already exists.",
                );
                response.json(serde_json::json!({ "errors": errors }))
            }
            AdminError::Store(e @ StoreError::NotFound { .. }) => {
                response.json(serde_json::json!({ "detail": e.to_string() }))
            }
            AdminError::Store(e) => {
                tracing::error!(error = %e, "Admin request failed in store");
                response.json(serde_json::json!({ "detail": "Internal server error" }))
            }
        }
    }
}
