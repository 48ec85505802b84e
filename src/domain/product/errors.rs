use crate::domain::FieldError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProductError {
    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title is too long ({0} characters, at most 250)")]
    TitleTooLong(usize),
}

impl FieldError for ProductError {
    fn field(&self) -> &'static str {
        "title"
    }
}
