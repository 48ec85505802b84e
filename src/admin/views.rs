use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::customer::Customer;
use crate::domain::order::{CostBucket, OrderFilter, OrderItemDetail, OrderStatus, OrderSummary};
use crate::domain::product::{Product, ProductFilter};
use crate::store::{Store, StoreError};

// ============================================================================
// Admin Views - list and detail rows as staff sees them
// ============================================================================
//
// Every computed column (customer fields, item list, total cost) is filled
// in here from plain store queries.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRow {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub email: String,
}

impl From<&Customer> for CustomerRow {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
            phone_number: customer.phone_number.clone(),
            email: customer.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            description: product.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemRow {
    pub id: i64,
    pub product_id: i64,
    pub product_title: String,
    pub quantity: i32,
    pub price: Decimal,
    pub display: String,
}

impl From<&OrderItemDetail> for OrderItemRow {
    fn from(detail: &OrderItemDetail) -> Self {
        Self {
            id: detail.item.id,
            product_id: detail.item.product_id,
            product_title: detail.product_title.clone(),
            quantity: detail.item.quantity,
            price: detail.item.price,
            display: detail.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRow {
    pub id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub address: String,
    pub created_at: NaiveDate,
    pub status: OrderStatus,
    pub items: Vec<OrderItemRow>,
    pub total_cost: Decimal,
    pub display: String,
}

impl OrderRow {
    fn new(summary: &OrderSummary, items: Vec<OrderItemRow>) -> Self {
        Self {
            id: summary.order.id,
            customer_id: summary.order.customer_id,
            customer_name: summary.customer_name.clone(),
            customer_phone: summary.customer_phone.clone(),
            customer_email: summary.customer_email.clone(),
            address: summary.order.address.clone(),
            created_at: summary.order.created_at.date_naive(),
            status: summary.order.status,
            items,
            total_cost: summary.total,
            display: summary.to_string(),
        }
    }
}

/// Order change view. The cancel button disappears once the order is canceled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderRow,
    pub show_cancel_button: bool,
}

// ============================================================================
// List Queries
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListQuery {
    pub q: Option<String>,
    pub id: Option<i64>,
}

impl ProductListQuery {
    pub fn to_filter(&self) -> ProductFilter {
        ProductFilter {
            search: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            id: self.id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListQuery {
    pub order_total_cost: Option<String>,
    pub id: Option<i64>,
}

impl OrderListQuery {
    pub fn bucket(&self) -> Option<CostBucket> {
        CostBucket::from_param(self.order_total_cost.as_deref())
    }

    pub fn to_filter(&self) -> OrderFilter {
        OrderFilter {
            id: self.id,
            bucket: self.bucket(),
        }
    }
}

// ============================================================================
// View Functions
// ============================================================================

pub async fn customer_rows(store: &dyn Store) -> Result<Vec<CustomerRow>, StoreError> {
    let customers = store.list_customers().await?;
    Ok(customers.iter().map(CustomerRow::from).collect())
}

pub async fn product_rows(
    store: &dyn Store,
    query: &ProductListQuery,
) -> Result<Vec<ProductRow>, StoreError> {
    let products = store.list_products(&query.to_filter()).await?;
    Ok(products.iter().map(ProductRow::from).collect())
}

/// Orders with customer columns, line items and totals. Two store round
/// trips regardless of how many orders are listed.
pub async fn order_rows(
    store: &dyn Store,
    filter: &OrderFilter,
) -> Result<Vec<OrderRow>, StoreError> {
    let summaries = store.list_orders(filter).await?;
    if summaries.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i64> = summaries.iter().map(|s| s.order.id).collect();
    let mut items_by_order: HashMap<i64, Vec<OrderItemRow>> = HashMap::new();
    for detail in store.order_items(&order_ids).await? {
        if let Some(order_id) = detail.item.order_id {
            items_by_order
                .entry(order_id)
                .or_default()
                .push(OrderItemRow::from(&detail));
        }
    }

    Ok(summaries
        .iter()
        .map(|summary| {
            let items = items_by_order.remove(&summary.order.id).unwrap_or_default();
            OrderRow::new(summary, items)
        })
        .collect())
}

pub async fn order_detail(store: &dyn Store, id: i64) -> Result<OrderDetail, StoreError> {
    let filter = OrderFilter {
        id: Some(id),
        bucket: None,
    };
    let order = order_rows(store, &filter)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::not_found("order", id))?;

    Ok(OrderDetail {
        show_cancel_button: !order.status.is_canceled(),
        order,
    })
}
