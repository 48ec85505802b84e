use actix_web::{error, web, HttpResponse};
use serde::Deserialize;

use crate::domain::customer::{CustomerForm, NewCustomer};
use crate::domain::order::{
    CostBucket, NewOrder, NewOrderItem, OrderCommand, OrderCommandHandler, OrderForm,
    OrderItemForm, COST_BUCKET_PARAM,
};
use crate::domain::product::{NewProduct, ProductForm};
use crate::domain::FieldError;

use super::errors::{AdminError, FieldErrors};
use super::views::{self, CustomerRow, OrderListQuery, ProductListQuery, ProductRow};
use super::AdminState;

type AdminResult = Result<HttpResponse, AdminError>;

const NOTHING_SELECTED: &str =
    "Items must be selected in order to perform actions on them. No items have been changed.";

/// Mount every admin route under `/admin`.
pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/admin")
            .route("/customers", web::get().to(list_customers))
            .route("/customers", web::post().to(create_customer))
            .route("/customers/{id}", web::get().to(customer_detail))
            .route("/customers/{id}", web::delete().to(delete_customer))
            .route("/products", web::get().to(list_products))
            .route("/products", web::post().to(create_product))
            .route("/products/{id}", web::get().to(product_detail))
            .route("/products/{id}", web::delete().to(delete_product))
            .route("/orders", web::get().to(list_orders))
            .route("/orders", web::post().to(create_order))
            .route("/orders/filters", web::get().to(order_filters))
            .route("/orders/actions/cancel", web::post().to(cancel_orders))
            .route("/orders/{id}", web::get().to(order_detail))
            .route("/orders/{id}", web::delete().to(delete_order))
            .route("/orders/{id}/cancel", web::post().to(cancel_order))
            .route("/order-items", web::post().to(create_order_item))
            .route("/order-items/{id}", web::delete().to(delete_order_item)),
    );
}

/// Malformed JSON bodies get the same `{ "detail": ... }` shape as other errors.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(serde_json::json!({ "detail": detail })),
        )
        .into()
    })
}

impl AdminState {
    fn reject<E: FieldError>(&self, entity: &'static str, errors: &[E]) -> AdminError {
        for e in errors {
            self.metrics.record_validation_failure(entity, e.field());
        }
        let errors = FieldErrors::from_errors(errors);
        tracing::debug!(
            entity = entity,
            fields = ?errors.fields().collect::<Vec<_>>(),
            "Rejected admin form"
        );
        AdminError::Validation { entity, errors }
    }
}

// ============================================================================
// Customers
// ============================================================================

async fn list_customers(state: web::Data<AdminState>) -> AdminResult {
    state.metrics.record_request("customers.list");
    let rows = views::customer_rows(state.store.as_ref()).await?;
    Ok(HttpResponse::Ok().json(rows))
}

async fn create_customer(state: web::Data<AdminState>, form: web::Json<CustomerForm>) -> AdminResult {
    state.metrics.record_request("customers.create");
    let customer = NewCustomer::from_form(&form).map_err(|e| state.reject("customer", &e))?;
    let customer = state.store.create_customer(customer).await?;

    tracing::info!(customer_id = customer.id, customer = %customer, "Customer created");
    Ok(HttpResponse::Created().json(CustomerRow::from(&customer)))
}

async fn customer_detail(state: web::Data<AdminState>, path: web::Path<i64>) -> AdminResult {
    state.metrics.record_request("customers.detail");
    let customer = state.store.get_customer(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CustomerRow::from(&customer)))
}

async fn delete_customer(state: web::Data<AdminState>, path: web::Path<i64>) -> AdminResult {
    state.metrics.record_request("customers.delete");
    let id = path.into_inner();
    state.store.delete_customer(id).await?;

    tracing::info!(customer_id = id, "Customer deleted with their orders");
    Ok(HttpResponse::NoContent().finish())
}

// ============================================================================
// Products
// ============================================================================

async fn list_products(state: web::Data<AdminState>, query: web::Query<ProductListQuery>) -> AdminResult {
    state.metrics.record_request("products.list");
    let rows = views::product_rows(state.store.as_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(rows))
}

async fn create_product(state: web::Data<AdminState>, form: web::Json<ProductForm>) -> AdminResult {
    state.metrics.record_request("products.create");
    let product = NewProduct::from_form(&form).map_err(|e| state.reject("product", &e))?;
    let product = state.store.create_product(product).await?;

    tracing::info!(product_id = product.id, product = %product, "Product created");
    Ok(HttpResponse::Created().json(ProductRow::from(&product)))
}

async fn product_detail(state: web::Data<AdminState>, path: web::Path<i64>) -> AdminResult {
    state.metrics.record_request("products.detail");
    let product = state.store.get_product(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProductRow::from(&product)))
}

async fn delete_product(state: web::Data<AdminState>, path: web::Path<i64>) -> AdminResult {
    state.metrics.record_request("products.delete");
    let id = path.into_inner();
    state.store.delete_product(id).await?;

    tracing::info!(product_id = id, "Product deleted with its order items");
    Ok(HttpResponse::NoContent().finish())
}

// ============================================================================
// Orders
// ============================================================================

async fn list_orders(state: web::Data<AdminState>, query: web::Query<OrderListQuery>) -> AdminResult {
    state.metrics.record_request("orders.list");
    let bucket = query.bucket();
    let _timer = state
        .metrics
        .order_list_duration
        .with_label_values(&[if bucket.is_some() { "true" } else { "false" }])
        .start_timer();

    let rows = views::order_rows(state.store.as_ref(), &query.to_filter()).await?;

    tracing::debug!(
        bucket = ?bucket.map(CostBucket::param),
        id = ?query.id,
        count = rows.len(),
        "Listed orders"
    );
    Ok(HttpResponse::Ok().json(rows))
}

async fn order_filters(state: web::Data<AdminState>) -> AdminResult {
    state.metrics.record_request("orders.filters");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "title": "Order Total sum",
        "parameter_name": COST_BUCKET_PARAM,
        "choices": CostBucket::choices(),
    })))
}

async fn order_detail(state: web::Data<AdminState>, path: web::Path<i64>) -> AdminResult {
    state.metrics.record_request("orders.detail");
    let detail = views::order_detail(state.store.as_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

async fn create_order(state: web::Data<AdminState>, form: web::Json<OrderForm>) -> AdminResult {
    state.metrics.record_request("orders.create");
    let order = NewOrder::from_form(&form).map_err(|e| state.reject("order", &e))?;
    let order = state.store.create_order(order).await?;
    let detail = views::order_detail(state.store.as_ref(), order.id).await?;

    tracing::info!(order_id = order.id, customer_id = order.customer_id, "Order created");
    Ok(HttpResponse::Created().json(detail))
}

async fn delete_order(state: web::Data<AdminState>, path: web::Path<i64>) -> AdminResult {
    state.metrics.record_request("orders.delete");
    let id = path.into_inner();
    state.store.delete_order(id).await?;

    tracing::info!(order_id = id, "Order deleted, its items were detached");
    Ok(HttpResponse::NoContent().finish())
}

/// "Cancel" button on the order change view.
async fn cancel_order(state: web::Data<AdminState>, path: web::Path<i64>) -> AdminResult {
    state.metrics.record_request("orders.cancel");
    let order_id = path.into_inner();

    let outcome = OrderCommandHandler::new(state.store.clone())
        .handle(OrderCommand::CancelOrder { order_id })
        .await?;
    state.metrics.orders_canceled_total.inc_by(outcome.updated);

    let detail = views::order_detail(state.store.as_ref(), order_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": outcome.message,
        "order": detail,
    })))
}

#[derive(Debug, Deserialize)]
struct OrderSelection {
    #[serde(default)]
    ids: Vec<i64>,
}

/// "Cancel Orders" bulk action.
async fn cancel_orders(state: web::Data<AdminState>, selection: web::Json<OrderSelection>) -> AdminResult {
    state.metrics.record_request("orders.bulk_cancel");
    let order_ids = selection.into_inner().ids;
    if order_ids.is_empty() {
        state.metrics.record_validation_failure("order", "ids");
        return Err(AdminError::Validation {
            entity: "order",
            errors: FieldErrors::single("ids", NOTHING_SELECTED),
        });
    }

    let outcome = OrderCommandHandler::new(state.store.clone())
        .handle(OrderCommand::CancelOrders { order_ids })
        .await?;
    state.metrics.orders_canceled_total.inc_by(outcome.updated);

    Ok(HttpResponse::Ok().json(outcome))
}

// ============================================================================
// Order Items
// ============================================================================

async fn create_order_item(state: web::Data<AdminState>, form: web::Json<OrderItemForm>) -> AdminResult {
    state.metrics.record_request("order_items.create");
    let item = NewOrderItem::from_form(&form).map_err(|e| state.reject("order item", &e))?;
    let item = state.store.create_order_item(item).await?;

    tracing::info!(
        item_id = item.id,
        order_id = ?item.order_id,
        product_id = item.product_id,
        price = %item.price,
        "Order item created"
    );
    Ok(HttpResponse::Created().json(item))
}

async fn delete_order_item(state: web::Data<AdminState>, path: web::Path<i64>) -> AdminResult {
    state.metrics.record_request("order_items.delete");
    let id = path.into_inner();
    state.store.delete_order_item(id).await?;

    tracing::info!(item_id = id, "Order item deleted");
    Ok(HttpResponse::NoContent().finish())
}
