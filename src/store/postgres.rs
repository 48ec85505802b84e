use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{FromRow, Row};

use crate::domain::customer::{Customer, NewCustomer};
use crate::domain::order::{
    money, NewOrder, NewOrderItem, Order, OrderFilter, OrderItem, OrderItemDetail, OrderStatus,
    OrderSummary,
};
use crate::domain::product::{NewProduct, Product, ProductFilter};

use super::{Store, StoreError};

// ============================================================================
// PostgreSQL Store
// ============================================================================
//
// Foreign key actions (cascade / set null) and the unique phone number are
// enforced by the schema in `migrations/`. Totals are aggregated in SQL so
// the list and the bucket filter always see current items.
//
// ============================================================================

const ORDER_COLUMNS: &str = "o.id, o.customer_id, o.address, o.status, o.created_at, o.updated_at";
const ITEM_COLUMNS: &str =
    "i.id, i.product_id, i.order_id, i.quantity, i.price, i.created_at, i.updated_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn delete_by_id(&self, table: &'static str, entity: &'static str, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", table))
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(entity, id));
        }
        tracing::debug!(table = table, id = id, "Deleted row");
        Ok(())
    }
}

/// Name of the violated constraint when `err` is a foreign key violation.
/// `ILIKE` pattern matching `search` as a literal substring.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn foreign_key_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            Some(db.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

// ============================================================================
// Row Mapping
// ============================================================================

impl<'r> FromRow<'r, PgRow> for Customer {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            phone_number: row.try_get("phone_number")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Product {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let code: String = row.try_get("status")?;
        let status = OrderStatus::parse(&code).map_err(|e| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: Box::new(e),
        })?;
        Ok(Self {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            address: row.try_get("address")?,
            status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItem {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            order_id: row.try_get("order_id")?,
            quantity: row.try_get("quantity")?,
            price: row.try_get("price")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderSummary {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            order: Order::from_row(row)?,
            customer_name: row.try_get("customer_name")?,
            customer_phone: row.try_get("customer_phone")?,
            customer_email: row.try_get("customer_email")?,
            total: money(row.try_get("total")?),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemDetail {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            item: OrderItem::from_row(row)?,
            product_title: row.try_get("product_title")?,
        })
    }
}

// ============================================================================
// Store Implementation
// ============================================================================

#[async_trait]
impl Store for PgStore {
    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError> {
        let phone_number = customer.phone_number.into_inner();
        let result = sqlx::query_as::<_, Customer>(
            "INSERT INTO customers (name, phone_number, email)
             VALUES ($1, $2, $3)
             RETURNING id, name, phone_number, email, created_at, updated_at",
        )
        .bind(&customer.name)
        .bind(&phone_number)
        .bind(customer.email.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicatePhoneNumber(phone_number)),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_customer(&self, id: i64) -> Result<Customer, StoreError> {
        sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone_number, email, created_at, updated_at
             FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("customer", id))
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        Ok(sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone_number, email, created_at, updated_at
             FROM customers ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_customer(&self, id: i64) -> Result<(), StoreError> {
        self.delete_by_id("customers", "customer", id).await
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        Ok(sqlx::query_as::<_, Product>(
            "INSERT INTO products (title, description)
             VALUES ($1, $2)
             RETURNING id, title, description, created_at, updated_at",
        )
        .bind(&product.title)
        .bind(&product.description)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_product(&self, id: i64) -> Result<Product, StoreError> {
        sqlx::query_as::<_, Product>(
            "SELECT id, title, description, created_at, updated_at
             FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("product", id))
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let pattern = filter.search.as_deref().map(contains_pattern);
        Ok(sqlx::query_as::<_, Product>(
            "SELECT id, title, description, created_at, updated_at
             FROM products
             WHERE ($1::TEXT IS NULL OR title ILIKE $1 ESCAPE '\\')
               AND ($2::BIGINT IS NULL OR id = $2)
             ORDER BY id DESC",
        )
        .bind(pattern)
        .bind(filter.id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_product(&self, id: i64) -> Result<(), StoreError> {
        self.delete_by_id("products", "product", id).await
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let result = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (customer_id, address, status)
             VALUES ($1, $2, $3)
             RETURNING id, customer_id, address, status, created_at, updated_at",
        )
        .bind(order.customer_id)
        .bind(&order.address)
        .bind(order.status.code())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(e) if foreign_key_violation(&e).is_some() => {
                Err(StoreError::not_found("customer", order.customer_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_order(&self, id: i64) -> Result<Order, StoreError> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders o WHERE o.id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("order", id))
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>, StoreError> {
        let query = format!(
            "SELECT {},
                    c.name AS customer_name,
                    c.phone_number AS customer_phone,
                    c.email AS customer_email,
                    COALESCE(SUM(i.price), 0) AS total
             FROM orders o
             JOIN customers c ON c.id = o.customer_id
             LEFT JOIN order_items i ON i.order_id = o.id
             WHERE ($1::BIGINT IS NULL OR o.id = $1)
             GROUP BY o.id, c.id
             HAVING ($2::NUMERIC IS NULL OR COALESCE(SUM(i.price), 0) <= $2)
             ORDER BY o.id DESC",
            ORDER_COLUMNS
        );
        Ok(sqlx::query_as::<_, OrderSummary>(&query)
            .bind(filter.id)
            .bind(filter.max_total())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn order_total(&self, id: i64) -> Result<Decimal, StoreError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(i.price), 0) AS total
             FROM orders o
             LEFT JOIN order_items i ON i.order_id = o.id
             WHERE o.id = $1
             GROUP BY o.id",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("order", id))?;
        Ok(money(row.try_get("total")?))
    }

    async fn set_order_status(&self, ids: &[i64], status: OrderStatus) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $1, updated_at = now() WHERE id = ANY($2)",
        )
        .bind(status.code())
        .bind(ids)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            status = %status,
            requested = ids.len(),
            updated = result.rows_affected(),
            "Updated order status"
        );
        Ok(result.rows_affected())
    }

    async fn delete_order(&self, id: i64) -> Result<(), StoreError> {
        self.delete_by_id("orders", "order", id).await
    }

    async fn create_order_item(&self, item: NewOrderItem) -> Result<OrderItem, StoreError> {
        let result = sqlx::query_as::<_, OrderItem>(
            "INSERT INTO order_items (product_id, order_id, quantity, price)
             VALUES ($1, $2, $3, $4)
             RETURNING id, product_id, order_id, quantity, price, created_at, updated_at",
        )
        .bind(item.product_id)
        .bind(item.order_id)
        .bind(item.quantity.value())
        .bind(item.price.value())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(e) => match (foreign_key_violation(&e), item.order_id) {
                (Some(constraint), Some(order_id)) if constraint.contains("order_id") => {
                    Err(StoreError::not_found("order", order_id))
                }
                (Some(_), _) => Err(StoreError::not_found("product", item.product_id)),
                (None, _) => Err(e.into()),
            },
        }
    }

    async fn get_order_item(&self, id: i64) -> Result<OrderItem, StoreError> {
        sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {} FROM order_items i WHERE i.id = $1",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("order item", id))
    }

    async fn order_items(&self, order_ids: &[i64]) -> Result<Vec<OrderItemDetail>, StoreError> {
        let query = format!(
            "SELECT {}, p.title AS product_title
             FROM order_items i
             JOIN products p ON p.id = i.product_id
             WHERE i.order_id = ANY($1)
             ORDER BY i.id",
            ITEM_COLUMNS
        );
        Ok(sqlx::query_as::<_, OrderItemDetail>(&query)
            .bind(order_ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete_order_item(&self, id: i64) -> Result<(), StoreError> {
        self.delete_by_id("order_items", "order item", id).await
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
