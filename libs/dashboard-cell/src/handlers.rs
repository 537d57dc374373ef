use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;

use crate::models::{BasicStats, DashboardStats, MonthlyAppointments, UpcomingAppointments};
use crate::services::DashboardService;

#[axum::debug_handler]
pub async fn get_stats(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DashboardStats>, AppError> {
    user.require_any(&[Role::Admin])?;
    let stats = DashboardService::new(&config).stats().await?;
    Ok(Json(stats))
}

#[axum::debug_handler]
pub async fn get_basic_stats(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<BasicStats>, AppError> {
    user.require_any(&[Role::Admin])?;
    let stats = DashboardService::new(&config).basic_stats().await?;
    Ok(Json(stats))
}

#[axum::debug_handler]
pub async fn get_appointments_by_month(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MonthlyAppointments>, AppError> {
    user.require_any(&[Role::Admin])?;
    let histogram = DashboardService::new(&config).appointments_by_month().await?;
    Ok(Json(histogram))
}

#[axum::debug_handler]
pub async fn get_upcoming_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UpcomingAppointments>, AppError> {
    user.require_any(&[Role::Admin])?;
    let upcoming = DashboardService::new(&config).upcoming_appointments().await?;
    Ok(Json(upcoming))
}
