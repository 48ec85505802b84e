use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Lifecycle status of an order. Persisted as a two-letter code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Created,
    Assembling,
    Delivering,
    Delivered,
    Issued,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Created,
        OrderStatus::Assembling,
        OrderStatus::Delivering,
        OrderStatus::Delivered,
        OrderStatus::Issued,
        OrderStatus::Canceled,
    ];

    pub fn code(self) -> &'static str {
        match self {
            OrderStatus::Created => "CR",
            OrderStatus::Assembling => "AS",
            OrderStatus::Delivering => "DG",
            OrderStatus::Delivered => "DD",
            OrderStatus::Issued => "IS",
            OrderStatus::Canceled => "CA",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Created => "Created",
            OrderStatus::Assembling => "Assembling",
            OrderStatus::Delivering => "Delivering",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Issued => "Issued",
            OrderStatus::Canceled => "Canceled",
        }
    }

    /// Accepts either the stored code or the label, ignoring case.
    pub fn parse(raw: &str) -> Result<Self, OrderError> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.code().eq_ignore_ascii_case(raw) || s.label().eq_ignore_ascii_case(raw))
            .ok_or_else(|| OrderError::UnknownStatus(raw.to_string()))
    }

    /// The only transition staff can trigger. Unconditional.
    pub fn cancel(self) -> Self {
        OrderStatus::Canceled
    }

    pub fn is_canceled(self) -> bool {
        self == OrderStatus::Canceled
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Line total of an order item: non-negative, two fractional digits,
/// at most ten digits overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    pub const SCALE: u32 = 2;
    const MAX_INTEGRAL: i64 = 100_000_000;

    pub fn parse(raw: Decimal) -> Result<Self, OrderError> {
        if raw.is_sign_negative() && !raw.is_zero() {
            return Err(OrderError::NegativePrice(raw));
        }
        if raw.normalize().scale() > Self::SCALE {
            return Err(OrderError::TooManyDecimalPlaces(raw));
        }
        if raw >= Decimal::from(Self::MAX_INTEGRAL) {
            return Err(OrderError::PriceTooLarge(raw));
        }
        let mut value = raw.abs();
        value.rescale(Self::SCALE);
        Ok(Self(value))
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

/// Number of units on a line item. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(i32);

impl Quantity {
    pub fn parse(raw: i32) -> Result<Self, OrderError> {
        if raw < 0 {
            return Err(OrderError::InvalidQuantity(raw));
        }
        Ok(Self(raw))
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_created() {
        assert_eq!(OrderStatus::default(), OrderStatus::Created);
    }

    #[test]
    fn test_status_codes_are_distinct() {
        let mut codes: Vec<_> = OrderStatus::ALL.iter().map(|s| s.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), OrderStatus::ALL.len());
    }

    #[test]
    fn test_status_parse_accepts_code_and_label() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.code()).unwrap(), status);
            assert_eq!(OrderStatus::parse(status.label()).unwrap(), status);
        }
        assert_eq!(OrderStatus::parse("ca").unwrap(), OrderStatus::Canceled);
        assert_eq!(OrderStatus::parse("delivering").unwrap(), OrderStatus::Delivering);
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert_eq!(
            OrderStatus::parse("Lost"),
            Err(OrderError::UnknownStatus("Lost".to_string()))
        );
    }

    #[test]
    fn test_cancel_from_any_state() {
        for status in OrderStatus::ALL {
            assert_eq!(status.cancel(), OrderStatus::Canceled);
        }
        assert_eq!(OrderStatus::Canceled.cancel().cancel(), OrderStatus::Canceled);
    }

    #[test]
    fn test_price_is_rescaled_to_two_places() {
        let price = Price::parse(Decimal::new(455, 1)).unwrap();
        assert_eq!(price.value().to_string(), "45.50");

        // trailing zeros beyond two places are not significant
        let price = Price::parse(Decimal::new(30000, 3)).unwrap();
        assert_eq!(price.value().to_string(), "30.00");
    }

    #[test]
    fn test_price_rules() {
        assert!(matches!(Price::parse(Decimal::new(-1, 0)), Err(OrderError::NegativePrice(_))));
        assert!(matches!(
            Price::parse(Decimal::new(12345, 3)),
            Err(OrderError::TooManyDecimalPlaces(_))
        ));
        assert!(matches!(
            Price::parse(Decimal::new(100_000_000, 0)),
            Err(OrderError::PriceTooLarge(_))
        ));
        assert!(Price::parse(Decimal::new(9_999_999_999, 2)).is_ok());
        assert_eq!(Price::parse(Decimal::ZERO).unwrap().value(), Decimal::ZERO);
    }

    #[test]
    fn test_quantity_rules() {
        assert_eq!(Quantity::parse(0).unwrap().value(), 0);
        assert_eq!(Quantity::parse(3).unwrap().value(), 3);
        assert_eq!(Quantity::parse(-2), Err(OrderError::InvalidQuantity(-2)));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&OrderStatus::Canceled).unwrap();
        assert_eq!(json, "\"Canceled\"");
        let status: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, OrderStatus::Canceled);
    }
}
