use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn dentist_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::create_dentist).get(handlers::list_dentists))
        .route("/check-email", get(handlers::check_email))
        .route("/check-registration", get(handlers::check_registration))
        .route("/registration/{registration_number}", get(handlers::get_dentist_by_registration))
        .route(
            "/{dentist_id}",
            get(handlers::get_dentist)
                .put(handlers::update_dentist)
                .delete(handlers::delete_dentist),
        )
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
