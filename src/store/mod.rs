// ============================================================================
// Store - Persistence for the four shop tables
// ============================================================================
//
// `Store` is the single seam between the admin surface and storage.
//
// - `PgStore`     : PostgreSQL via sqlx; foreign key actions live in the schema
// - `MemoryStore` : in-process tables; foreign key actions run as explicit
//                   pre-delete hooks
//
// Delete rules (both implementations):
// - customer → orders      : cascade
// - product  → order items : cascade
// - order    → order items : set null
//
// ============================================================================

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::customer::{Customer, NewCustomer};
use crate::domain::order::{
    NewOrder, NewOrderItem, Order, OrderFilter, OrderItem, OrderItemDetail, OrderStatus,
    OrderSummary,
};
use crate::domain::product::{NewProduct, Product, ProductFilter};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Customer with phone number {0} already exists")]
    DuplicatePhoneNumber(String),

    #[error("Stored row is malformed: {0}")]
    MalformedRow(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        StoreError::NotFound { entity, id }
    }
}

/// All lists come back newest first.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError>;
    async fn get_customer(&self, id: i64) -> Result<Customer, StoreError>;
    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError>;
    /// Deletes the customer's orders too.
    async fn delete_customer(&self, id: i64) -> Result<(), StoreError>;

    async fn create_product(&self, product: NewProduct) -> Result<Product, StoreError>;
    async fn get_product(&self, id: i64) -> Result<Product, StoreError>;
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError>;
    /// Deletes every line item of the product too.
    async fn delete_product(&self, id: i64) -> Result<(), StoreError>;

    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError>;
    async fn get_order(&self, id: i64) -> Result<Order, StoreError>;
    /// Orders joined with their customer and their total at query time.
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>, StoreError>;
    /// Sum of item prices for an existing order, zero without items.
    async fn order_total(&self, id: i64) -> Result<Decimal, StoreError>;
    /// Returns the number of orders that exist among `ids`.
    async fn set_order_status(&self, ids: &[i64], status: OrderStatus) -> Result<u64, StoreError>;
    /// Line items survive with their order reference cleared.
    async fn delete_order(&self, id: i64) -> Result<(), StoreError>;

    async fn create_order_item(&self, item: NewOrderItem) -> Result<OrderItem, StoreError>;
    async fn get_order_item(&self, id: i64) -> Result<OrderItem, StoreError>;
    /// Items of the given orders with product titles, oldest first.
    async fn order_items(&self, order_ids: &[i64]) -> Result<Vec<OrderItemDetail>, StoreError>;
    async fn delete_order_item(&self, id: i64) -> Result<(), StoreError>;
}
