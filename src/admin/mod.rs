// ============================================================================
// Admin Module - staff-facing HTTP surface
// ============================================================================
//
// Structure:
// - views    : row types and the query functions that fill computed columns
// - handlers : actix-web routes under /admin
// - errors   : AdminError → HTTP status + JSON body
//
// ============================================================================

mod errors;
mod handlers;
mod views;

use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use crate::metrics::{configure_metrics_routes, Metrics};
use crate::store::Store;

pub use handlers::configure_admin_routes;

/// Shared by every admin request.
pub struct AdminState {
    pub store: Arc<dyn Store>,
    pub metrics: Arc<Metrics>,
}

/// Run the admin server until it is shut down.
pub async fn serve(bind_addr: &str, store: Arc<dyn Store>, metrics: Arc<Metrics>) -> std::io::Result<()> {
    tracing::info!("🛠️  Starting admin server on http://{}/admin", bind_addr);

    let state = web::Data::new(AdminState {
        store,
        metrics: metrics.clone(),
    });
    let metrics = web::Data::new(metrics);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(metrics.clone())
            .configure(configure_admin_routes)
            .configure(configure_metrics_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
