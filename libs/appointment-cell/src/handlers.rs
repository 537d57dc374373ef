use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;
use shared_models::pagination::Page;
use shared_utils::extractor::{AppJson, AppPath, AppQuery};

use crate::models::{
    AppointmentDto, AppointmentError, AppointmentRequest, AppointmentSearchQuery, StatusUpdateRequest,
    UpdateAppointmentRequest,
};
use crate::services::schedule::parse_status_patch;
use crate::services::AppointmentService;

const STAFF: &[Role] = &[Role::Admin, Role::Dentist];

#[axum::debug_handler]
pub async fn create_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(_user): Extension<AuthUser>,
    AppJson(request): AppJson<AppointmentRequest>,
) -> Result<Json<AppointmentDto>, AppError> {
    let appointment = AppointmentService::new(&config).save(request).await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Vec<AppointmentDto>>, AppError> {
    let appointments = AppointmentService::new(&config).find_all().await?;
    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(_user): Extension<AuthUser>,
    AppQuery(query): AppQuery<AppointmentSearchQuery>,
) -> Result<Json<Page<AppointmentDto>>, AppError> {
    let page = AppointmentService::new(&config).search(query).await?;
    Ok(Json(page))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    AppPath(appointment_id): AppPath<i64>,
) -> Result<Json<AppointmentDto>, AppError> {
    user.require_any(STAFF)?;

    let appointment = AppointmentService::new(&config)
        .find_by_id(appointment_id)
        .await?
        .ok_or(AppointmentError::NotFound(appointment_id))?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    AppPath(appointment_id): AppPath<i64>,
    AppJson(request): AppJson<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentDto>, AppError> {
    user.require_any(STAFF)?;

    let appointment = AppointmentService::new(&config)
        .update(appointment_id, request)
        .await?;

    Ok(Json(appointment))
}

/// Update addressed by the `id` carried in the body.
#[axum::debug_handler]
pub async fn update_appointment_by_body(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    AppJson(request): AppJson<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentDto>, AppError> {
    user.require_any(STAFF)?;

    let appointment_id = request
        .id
        .ok_or_else(|| AppointmentError::ValidationError("Appointment id is required".to_string()))?;

    let appointment = AppointmentService::new(&config)
        .update(appointment_id, request)
        .await?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    AppPath(appointment_id): AppPath<i64>,
    AppJson(request): AppJson<StatusUpdateRequest>,
) -> Result<Json<AppointmentDto>, AppError> {
    user.require_any(STAFF)?;

    let status = parse_status_patch(request.status.as_deref())?;
    let appointment = AppointmentService::new(&config)
        .update_status(appointment_id, status)
        .await?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    AppPath(appointment_id): AppPath<i64>,
) -> Result<Json<AppointmentDto>, AppError> {
    user.require_any(&[Role::Admin])?;

    let appointment = AppointmentService::new(&config).delete(appointment_id).await?;

    Ok(Json(appointment))
}
