use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use dashboard_cell::router::dashboard_routes;
use dentist_cell::router::dentist_routes;
use patient_cell::router::patient_routes;
use shared_config::AppConfig;
use shared_utils::extractor::error_path_middleware;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Dental Clinic API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/dentists", dentist_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/dashboard", dashboard_routes(state))
        .layer(middleware::from_fn(error_path_middleware))
}
