use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::cost_bucket::CostBucket;
use super::errors::OrderError;
use super::value_objects::{OrderStatus, Price, Quantity};

// ============================================================================
// Order Model
// ============================================================================

/// A persisted order row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub address: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted line item. `order_id` is cleared when its order is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub product_id: i64,
    pub order_id: Option<i64>,
    pub quantity: i32,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderForm {
    pub customer_id: i64,
    pub address: String,
}

/// A validated order. New orders always start out `Created`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_id: i64,
    pub address: String,
    pub status: OrderStatus,
}

impl NewOrder {
    pub fn from_form(form: &OrderForm) -> Result<Self, Vec<OrderError>> {
        let address = form.address.trim();
        if address.is_empty() {
            return Err(vec![OrderError::EmptyAddress]);
        }
        Ok(Self {
            customer_id: form.customer_id,
            address: address.to_string(),
            status: OrderStatus::default(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemForm {
    pub product_id: i64,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub order_id: Option<i64>,
    pub quantity: Quantity,
    pub price: Price,
}

impl NewOrderItem {
    pub fn from_form(form: &OrderItemForm) -> Result<Self, Vec<OrderError>> {
        match (Quantity::parse(form.quantity), Price::parse(form.price)) {
            (Ok(quantity), Ok(price)) => Ok(Self {
                product_id: form.product_id,
                order_id: form.order_id,
                quantity,
                price,
            }),
            (quantity, price) => Err([quantity.err(), price.err()].into_iter().flatten().collect()),
        }
    }
}

// ============================================================================
// Read Models
// ============================================================================

/// Filter for the order list: exact id and/or a cost bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub id: Option<i64>,
    pub bucket: Option<CostBucket>,
}

impl OrderFilter {
    pub fn matches(&self, order_id: i64, total: Decimal) -> bool {
        self.id.map_or(true, |id| id == order_id)
            && self.bucket.map_or(true, |bucket| bucket.matches(total))
    }

    /// Upper bound on the total, if a bucket is selected.
    pub fn max_total(&self) -> Option<Decimal> {
        self.bucket.map(CostBucket::threshold)
    }
}

/// An order joined with its customer and its computed total.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub order: Order,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub total: Decimal,
}

impl fmt::Display for OrderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.customer_name,
            self.order.address,
            self.order.status.code()
        )
    }
}

/// A line item joined with its product title.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemDetail {
    pub item: OrderItem,
    pub product_title: String,
}

impl fmt::Display for OrderItemDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}rub",
            self.item.quantity, self.product_title, self.item.price
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldError;

    #[test]
    fn test_new_order_starts_created() {
        let order = NewOrder::from_form(&OrderForm {
            customer_id: 7,
            address: " Lenina 1 ".to_string(),
        })
        .unwrap();
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.address, "Lenina 1");
    }

    #[test]
    fn test_blank_address_rejected() {
        let errors = NewOrder::from_form(&OrderForm {
            customer_id: 7,
            address: "  ".to_string(),
        })
        .unwrap_err();
        assert_eq!(errors, vec![OrderError::EmptyAddress]);
    }

    #[test]
    fn test_item_form_reports_both_fields() {
        let errors = NewOrderItem::from_form(&OrderItemForm {
            product_id: 1,
            order_id: None,
            quantity: -1,
            price: Decimal::new(-100, 2),
        })
        .unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["quantity", "price"]);
    }

    #[test]
    fn test_item_form_defaults() {
        let form: OrderItemForm =
            serde_json::from_str(r#"{"product_id": 3, "price": "30.00"}"#).unwrap();
        let item = NewOrderItem::from_form(&form).unwrap();
        assert_eq!(item.quantity.value(), 0);
        assert_eq!(item.order_id, None);
        assert_eq!(item.price.value(), Decimal::new(3000, 2));
    }

    #[test]
    fn test_filter_matches() {
        let filter = OrderFilter { id: None, bucket: Some(CostBucket::UpTo100) };
        assert!(filter.matches(1, Decimal::ZERO));
        assert!(filter.matches(1, Decimal::from(100)));
        assert!(!filter.matches(1, Decimal::new(10001, 2)));
        assert_eq!(filter.max_total(), Some(Decimal::from(100)));
        assert!(OrderFilter::default().matches(42, Decimal::from(1_000_000)));
        assert_eq!(OrderFilter::default().max_total(), None);

        let by_id = OrderFilter { id: Some(5), bucket: None };
        assert!(by_id.matches(5, Decimal::ZERO));
        assert!(!by_id.matches(6, Decimal::ZERO));
    }

    #[test]
    fn test_item_display() {
        let now = Utc::now();
        let detail = OrderItemDetail {
            item: OrderItem {
                id: 1,
                product_id: 2,
                order_id: Some(3),
                quantity: 2,
                price: Decimal::new(3000, 2),
                created_at: now,
                updated_at: now,
            },
            product_title: "Kettle".to_string(),
        };
        assert_eq!(detail.to_string(), "2 Kettle: 30.00rub");
    }
}
