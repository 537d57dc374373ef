use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn dashboard_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/stats", get(handlers::get_stats))
        .route("/basic-stats", get(handlers::get_basic_stats))
        .route("/appointments-by-month", get(handlers::get_appointments_by_month))
        .route("/upcoming-appointments", get(handlers::get_upcoming_appointments))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
