use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;
use shared_utils::extractor::{AppJson, AppPath, AppQuery};

use crate::models::{
    CardIdentityQuery, CreatePatientRequest, EmailQuery, PatientDto, PatientError, UpdatePatientRequest,
};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn create_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(_user): Extension<AuthUser>,
    AppJson(request): AppJson<CreatePatientRequest>,
) -> Result<(StatusCode, Json<PatientDto>), AppError> {
    let service = PatientService::new(&config);

    let patient = service.save(request).await?;

    Ok((StatusCode::CREATED, Json(patient)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    AppPath(patient_id): AppPath<i64>,
    AppJson(request): AppJson<UpdatePatientRequest>,
) -> Result<Json<PatientDto>, AppError> {
    let service = PatientService::new(&config);

    let existing = service
        .find_by_id(patient_id)
        .await?
        .ok_or(PatientError::NotFound(patient_id))?;
    user.require_admin_or_self(Some(&existing.email))?;

    let patient = service.update(patient_id, request).await?;

    Ok(Json(patient))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    AppPath(patient_id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    user.require_any(&[Role::Admin])?;

    PatientService::new(&config).delete(patient_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(_user): Extension<AuthUser>,
    AppPath(patient_id): AppPath<i64>,
) -> Result<Json<PatientDto>, AppError> {
    let patient = PatientService::new(&config)
        .find_by_id(patient_id)
        .await?
        .ok_or(PatientError::NotFound(patient_id))?;

    Ok(Json(patient))
}

#[axum::debug_handler]
pub async fn list_patients(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<PatientDto>>, AppError> {
    user.require_any(&[Role::Admin, Role::Dentist])?;

    let patients = PatientService::new(&config).find_all().await?;

    Ok(Json(patients))
}

#[axum::debug_handler]
pub async fn check_email(
    State(config): State<Arc<AppConfig>>,
    AppQuery(query): AppQuery<EmailQuery>,
) -> Result<Json<bool>, AppError> {
    let exists = PatientService::new(&config).exists_by_email(&query.email).await?;
    Ok(Json(exists))
}

#[axum::debug_handler]
pub async fn check_card_identity(
    State(config): State<Arc<AppConfig>>,
    AppQuery(query): AppQuery<CardIdentityQuery>,
) -> Result<Json<bool>, AppError> {
    let exists = PatientService::new(&config)
        .exists_by_card_identity(query.card_identity)
        .await?;
    Ok(Json(exists))
}
