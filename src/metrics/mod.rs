// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

pub use server::configure_metrics_routes;

// ============================================================================
// Metrics Module - Prometheus metrics for the admin service
// ============================================================================
//
// - Requests per admin route
// - Validation failures per entity and field
// - Orders canceled (button and bulk action)
// - Order list latency, split by whether a cost bucket was applied
//
// Scraped via GET /metrics on the admin server.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub admin_requests_total: IntCounterVec,
    pub validation_failures_total: IntCounterVec,
    pub orders_canceled_total: IntCounter,
    pub order_list_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let admin_requests_total = IntCounterVec::new(
            Opts::new("admin_requests_total", "Total admin requests by route"),
            &["route"],
        )?;
        registry.register(Box::new(admin_requests_total.clone()))?;

        let validation_failures_total = IntCounterVec::new(
            Opts::new(
                "validation_failures_total",
                "Form fields rejected by validation",
            ),
            &["entity", "field"],
        )?;
        registry.register(Box::new(validation_failures_total.clone()))?;

        let orders_canceled_total = IntCounter::new(
            "orders_canceled_total",
            "Orders moved to Canceled by staff",
        )?;
        registry.register(Box::new(orders_canceled_total.clone()))?;

        let order_list_duration = HistogramVec::new(
            HistogramOpts::new(
                "order_list_duration_seconds",
                "Time to build the order list with totals",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["bucketed"],
        )?;
        registry.register(Box::new(order_list_duration.clone()))?;

        Ok(Self {
            registry,
            admin_requests_total,
            validation_failures_total,
            orders_canceled_total,
            order_list_duration,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_request(&self, route: &str) {
        self.admin_requests_total.with_label_values(&[route]).inc();
    }

    pub fn record_validation_failure(&self, entity: &str, field: &str) {
        self.validation_failures_total
            .with_label_values(&[entity, field])
            .inc();
    }
}
