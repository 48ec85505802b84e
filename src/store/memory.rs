use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::customer::{Customer, NewCustomer};
use crate::domain::order::{
    order_total, NewOrder, NewOrderItem, Order, OrderFilter, OrderItem, OrderItemDetail,
    OrderStatus, OrderSummary,
};
use crate::domain::product::{NewProduct, Product, ProductFilter};

use super::{Store, StoreError};

// ============================================================================
// In-Memory Store
// ============================================================================
//
// Tables are ordered maps keyed by surrogate id. Ids are never reused.
// Foreign key actions run as pre-delete hooks under the same write lock as
// the delete itself.
//
// ============================================================================

#[derive(Default)]
struct Tables {
    last_id: i64,
    customers: BTreeMap<i64, Customer>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, Order>,
    order_items: BTreeMap<i64, OrderItem>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// customer → orders: cascade
    fn before_customer_delete(&mut self, customer_id: i64) {
        let orders: Vec<i64> = self
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .map(|o| o.id)
            .collect();
        for order_id in orders {
            self.before_order_delete(order_id);
            self.orders.remove(&order_id);
        }
        tracing::debug!(customer_id = customer_id, "Cascaded customer delete to orders");
    }

    /// product → order items: cascade
    fn before_product_delete(&mut self, product_id: i64) {
        let before = self.order_items.len();
        self.order_items.retain(|_, item| item.product_id != product_id);
        tracing::debug!(
            product_id = product_id,
            removed = before - self.order_items.len(),
            "Cascaded product delete to order items"
        );
    }

    /// order → order items: set null
    fn before_order_delete(&mut self, order_id: i64) {
        for item in self.order_items.values_mut() {
            if item.order_id == Some(order_id) {
                item.order_id = None;
            }
        }
    }

    fn summary(&self, order: &Order) -> Result<OrderSummary, StoreError> {
        let customer = self.customers.get(&order.customer_id).ok_or_else(|| {
            StoreError::MalformedRow(format!(
                "order {} references missing customer {}",
                order.id, order.customer_id
            ))
        })?;
        Ok(OrderSummary {
            order: order.clone(),
            customer_name: customer.name.clone(),
            customer_phone: customer.phone_number.clone(),
            customer_email: customer.email.clone(),
            total: order_total(order.id, self.order_items.values()),
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError> {
        let mut tables = self.tables.write().await;
        let phone_number = customer.phone_number.into_inner();
        if tables
            .customers
            .values()
            .any(|c| c.phone_number == phone_number)
        {
            return Err(StoreError::DuplicatePhoneNumber(phone_number));
        }

        let now = Utc::now();
        let row = Customer {
            id: tables.next_id(),
            name: customer.name,
            phone_number,
            email: customer.email.into_inner(),
            created_at: now,
            updated_at: now,
        };
        tables.customers.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_customer(&self, id: i64) -> Result<Customer, StoreError> {
        let tables = self.tables.read().await;
        tables
            .customers
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("customer", id))
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.customers.values().rev().cloned().collect())
    }

    async fn delete_customer(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.customers.contains_key(&id) {
            return Err(StoreError::not_found("customer", id));
        }
        tables.before_customer_delete(id);
        tables.customers.remove(&id);
        Ok(())
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let row = Product {
            id: tables.next_id(),
            title: product.title,
            description: product.description,
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_product(&self, id: i64) -> Result<Product, StoreError> {
        let tables = self.tables.read().await;
        tables
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("product", id))
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .rev()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn delete_product(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&id) {
            return Err(StoreError::not_found("product", id));
        }
        tables.before_product_delete(id);
        tables.products.remove(&id);
        Ok(())
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.customers.contains_key(&order.customer_id) {
            return Err(StoreError::not_found("customer", order.customer_id));
        }

        let now = Utc::now();
        let row = Order {
            id: tables.next_id(),
            customer_id: order.customer_id,
            address: order.address,
            status: order.status,
            created_at: now,
            updated_at: now,
        };
        tables.orders.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_order(&self, id: i64) -> Result<Order, StoreError> {
        let tables = self.tables.read().await;
        tables
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("order", id))
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>, StoreError> {
        let tables = self.tables.read().await;
        let mut summaries = Vec::new();
        for order in tables.orders.values().rev() {
            let summary = tables.summary(order)?;
            if filter.matches(order.id, summary.total) {
                summaries.push(summary);
            }
        }
        Ok(summaries)
    }

    async fn order_total(&self, id: i64) -> Result<Decimal, StoreError> {
        let tables = self.tables.read().await;
        if !tables.orders.contains_key(&id) {
            return Err(StoreError::not_found("order", id));
        }
        Ok(order_total(id, tables.order_items.values()))
    }

    async fn set_order_status(&self, ids: &[i64], status: OrderStatus) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut updated = 0;
        for id in ids {
            if let Some(order) = tables.orders.get_mut(id) {
                order.status = status;
                order.updated_at = now;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete_order(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.orders.contains_key(&id) {
            return Err(StoreError::not_found("order", id));
        }
        tables.before_order_delete(id);
        tables.orders.remove(&id);
        Ok(())
    }

    async fn create_order_item(&self, item: NewOrderItem) -> Result<OrderItem, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&item.product_id) {
            return Err(StoreError::not_found("product", item.product_id));
        }
        if let Some(order_id) = item.order_id {
            if !tables.orders.contains_key(&order_id) {
                return Err(StoreError::not_found("order", order_id));
            }
        }

        let now = Utc::now();
        let row = OrderItem {
            id: tables.next_id(),
            product_id: item.product_id,
            order_id: item.order_id,
            quantity: item.quantity.value(),
            price: item.price.value(),
            created_at: now,
            updated_at: now,
        };
        tables.order_items.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_order_item(&self, id: i64) -> Result<OrderItem, StoreError> {
        let tables = self.tables.read().await;
        tables
            .order_items
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("order item", id))
    }

    async fn order_items(&self, order_ids: &[i64]) -> Result<Vec<OrderItemDetail>, StoreError> {
        let tables = self.tables.read().await;
        tables
            .order_items
            .values()
            .filter(|item| item.order_id.is_some_and(|id| order_ids.contains(&id)))
            .map(|item| {
                let product = tables.products.get(&item.product_id).ok_or_else(|| {
                    StoreError::MalformedRow(format!(
                        "order item {} references missing product {}",
                        item.id, item.product_id
                    ))
                })?;
                Ok(OrderItemDetail {
                    item: item.clone(),
                    product_title: product.title.clone(),
                })
            })
            .collect()
    }

    async fn delete_order_item(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .order_items
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("order item", id))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::CustomerForm;
    use crate::domain::order::{CostBucket, OrderForm, OrderItemForm};
    use crate::domain::product::ProductForm;

    async fn customer(store: &MemoryStore, phone: &str) -> Customer {
        let form = CustomerForm {
            name: "Anna".to_string(),
            phone_number: phone.to_string(),
            email: "anna@example.com".to_string(),
        };
        store
            .create_customer(NewCustomer::from_form(&form).unwrap())
            .await
            .unwrap()
    }

    async fn product(store: &MemoryStore, title: &str) -> Product {
        let form = ProductForm {
            title: title.to_string(),
            description: None,
        };
        store
            .create_product(NewProduct::from_form(&form).unwrap())
            .await
            .unwrap()
    }

    async fn order(store: &MemoryStore, customer_id: i64) -> Order {
        let form = OrderForm {
            customer_id,
            address: "Lenina 1".to_string(),
        };
        store
            .create_order(NewOrder::from_form(&form).unwrap())
            .await
            .unwrap()
    }

    async fn item(store: &MemoryStore, product_id: i64, order_id: Option<i64>, cents: i64) -> OrderItem {
        let form = OrderItemForm {
            product_id,
            order_id,
            quantity: 1,
            price: Decimal::new(cents, 2),
        };
        store
            .create_order_item(NewOrderItem::from_form(&form).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_phone_number_rejected() {
        let store = MemoryStore::new();
        customer(&store, "+79991234567").await;

        let form = CustomerForm {
            name: "Boris".to_string(),
            phone_number: "+79991234567".to_string(),
            email: "boris@example.com".to_string(),
        };
        let result = store
            .create_customer(NewCustomer::from_form(&form).unwrap())
            .await;
        assert!(matches!(result, Err(StoreError::DuplicatePhoneNumber(_))));
    }

    #[tokio::test]
    async fn test_order_requires_existing_customer() {
        let store = MemoryStore::new();
        let form = OrderForm { customer_id: 77, address: "Nowhere".to_string() };
        let result = store.create_order(NewOrder::from_form(&form).unwrap()).await;
        assert!(matches!(result, Err(StoreError::NotFound { entity: "customer", id: 77 })));
    }

    #[tokio::test]
    async fn test_item_requires_existing_product_and_order() {
        let store = MemoryStore::new();
        let p = product(&store, "Kettle").await;

        let missing_product = OrderItemForm {
            product_id: 500,
            order_id: None,
            quantity: 1,
            price: Decimal::ONE,
        };
        let result = store
            .create_order_item(NewOrderItem::from_form(&missing_product).unwrap())
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { entity: "product", .. })));

        let missing_order = OrderItemForm { product_id: p.id, order_id: Some(600), ..missing_product };
        let result = store
            .create_order_item(NewOrderItem::from_form(&missing_order).unwrap())
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { entity: "order", id: 600 })));
    }

    #[tokio::test]
    async fn test_order_total_example() {
        let store = MemoryStore::new();
        let c = customer(&store, "+79991234567").await;
        let p = product(&store, "Kettle").await;
        let o = order(&store, c.id).await;
        item(&store, p.id, Some(o.id), 3000).await;
        item(&store, p.id, Some(o.id), 4550).await;

        assert_eq!(store.order_total(o.id).await.unwrap(), Decimal::new(7550, 2));

        for bucket in [CostBucket::UpTo100, CostBucket::UpTo500] {
            let filter = OrderFilter { id: None, bucket: Some(bucket) };
            let rows = store.list_orders(&filter).await.unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].order.id, o.id);
        }
    }

    #[tokio::test]
    async fn test_empty_order_total_is_zero_and_always_listed() {
        let store = MemoryStore::new();
        let c = customer(&store, "+79991234567").await;
        let o = order(&store, c.id).await;

        assert_eq!(store.order_total(o.id).await.unwrap(), Decimal::ZERO);
        for bucket in CostBucket::ALL {
            let filter = OrderFilter { id: None, bucket: Some(bucket) };
            let rows = store.list_orders(&filter).await.unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].total, Decimal::ZERO);
        }
    }

    #[tokio::test]
    async fn test_bucket_returns_exactly_orders_under_threshold() {
        let store = MemoryStore::new();
        let c = customer(&store, "+79991234567").await;
        let p = product(&store, "Kettle").await;

        let cheap = order(&store, c.id).await;
        item(&store, p.id, Some(cheap.id), 10000).await;
        let mid = order(&store, c.id).await;
        item(&store, p.id, Some(mid.id), 10001).await;
        let pricey = order(&store, c.id).await;
        item(&store, p.id, Some(pricey.id), 500000).await;
        item(&store, p.id, Some(pricey.id), 400000).await;

        let ids = |rows: Vec<OrderSummary>| rows.into_iter().map(|r| r.order.id).collect::<Vec<_>>();

        let filter = OrderFilter { id: None, bucket: Some(CostBucket::UpTo100) };
        assert_eq!(ids(store.list_orders(&filter).await.unwrap()), vec![cheap.id]);

        let filter = OrderFilter { id: None, bucket: Some(CostBucket::UpTo500) };
        assert_eq!(ids(store.list_orders(&filter).await.unwrap()), vec![mid.id, cheap.id]);

        let filter = OrderFilter { id: None, bucket: Some(CostBucket::UpTo10000) };
        assert_eq!(
            ids(store.list_orders(&filter).await.unwrap()),
            vec![pricey.id, mid.id, cheap.id]
        );

        let filter = OrderFilter { id: None, bucket: Some(CostBucket::UpTo1000) };
        assert_eq!(ids(store.list_orders(&filter).await.unwrap()), vec![mid.id, cheap.id]);
    }

    #[tokio::test]
    async fn test_delete_product_cascades_to_items() {
        let store = MemoryStore::new();
        let c = customer(&store, "+79991234567").await;
        let kettle = product(&store, "Kettle").await;
        let toaster = product(&store, "Toaster").await;
        let o = order(&store, c.id).await;
        let doomed = item(&store, kettle.id, Some(o.id), 1000).await;
        let kept = item(&store, toaster.id, Some(o.id), 2000).await;

        store.delete_product(kettle.id).await.unwrap();

        assert!(matches!(
            store.get_order_item(doomed.id).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(store.get_order_item(kept.id).await.is_ok());
        assert_eq!(store.order_total(o.id).await.unwrap(), Decimal::new(2000, 2));
    }

    #[tokio::test]
    async fn test_delete_customer_cascades_to_orders() {
        let store = MemoryStore::new();
        let anna = customer(&store, "+79991234567").await;
        let boris = customer(&store, "+79997654321").await;
        let p = product(&store, "Kettle").await;
        let annas = order(&store, anna.id).await;
        let boriss = order(&store, boris.id).await;
        let line = item(&store, p.id, Some(annas.id), 1000).await;

        store.delete_customer(anna.id).await.unwrap();

        assert!(store.get_order(annas.id).await.is_err());
        assert!(store.get_order(boriss.id).await.is_ok());
        // the cascaded order's items follow the order's set-null rule
        assert_eq!(store.get_order_item(line.id).await.unwrap().order_id, None);
    }

    #[tokio::test]
    async fn test_delete_order_nulls_item_reference() {
        let store = MemoryStore::new();
        let c = customer(&store, "+79991234567").await;
        let p = product(&store, "Kettle").await;
        let o = order(&store, c.id).await;
        let line = item(&store, p.id, Some(o.id), 1000).await;

        store.delete_order(o.id).await.unwrap();

        let survivor = store.get_order_item(line.id).await.unwrap();
        assert_eq!(survivor.order_id, None);
        assert_eq!(survivor.price, Decimal::new(1000, 2));
        assert!(store.list_orders(&OrderFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_status_touches_updated_at() {
        let store = MemoryStore::new();
        let c = customer(&store, "+79991234567").await;
        let o = order(&store, c.id).await;

        let updated = store
            .set_order_status(&[o.id, 12345], OrderStatus::Canceled)
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let reloaded = store.get_order(o.id).await.unwrap();
        assert_eq!(reloaded.status, OrderStatus::Canceled);
        assert!(reloaded.updated_at >= o.updated_at);
        assert_eq!(reloaded.created_at, o.created_at);
    }

    #[tokio::test]
    async fn test_order_items_carry_product_titles() {
        let store = MemoryStore::new();
        let c = customer(&store, "+79991234567").await;
        let p = product(&store, "Kettle").await;
        let first = order(&store, c.id).await;
        let second = order(&store, c.id).await;
        item(&store, p.id, Some(first.id), 1000).await;
        item(&store, p.id, Some(second.id), 2000).await;
        item(&store, p.id, None, 3000).await;

        let details = store.order_items(&[first.id]).await.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].product_title, "Kettle");

        let details = store.order_items(&[first.id, second.id]).await.unwrap();
        assert_eq!(details.len(), 2);
    }

    #[tokio::test]
    async fn test_lists_are_newest_first() {
        let store = MemoryStore::new();
        let first = product(&store, "Kettle").await;
        let second = product(&store, "Toaster").await;

        let rows = store.list_products(&ProductFilter::default()).await.unwrap();
        assert_eq!(rows.iter().map(|p| p.id).collect::<Vec<_>>(), vec![second.id, first.id]);
    }
}
