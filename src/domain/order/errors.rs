use rust_decimal::Decimal;

use crate::domain::FieldError;

// ============================================================================
// Order Validation Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Delivery address cannot be empty")]
    EmptyAddress,

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Price cannot be negative: {0}")]
    NegativePrice(Decimal),

    #[error("Price has more than 2 decimal places: {0}")]
    TooManyDecimalPlaces(Decimal),

    #[error("Price has more than 8 digits before the decimal point: {0}")]
    PriceTooLarge(Decimal),
}

impl FieldError for OrderError {
    fn field(&self) -> &'static str {
        match self {
            OrderError::EmptyAddress => "address",
            OrderError::UnknownStatus(_) => "status",
            OrderError::InvalidQuantity(_) => "quantity",
            OrderError::NegativePrice(_)
            | OrderError::TooManyDecimalPlaces(_)
            | OrderError::PriceTooLarge(_) => "price",
        }
    }
}
