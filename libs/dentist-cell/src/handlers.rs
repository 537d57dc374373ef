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
    CreateDentistRequest, DentistDto, DentistError, EmailQuery, RegistrationQuery, UpdateDentistRequest,
};
use crate::services::DentistService;

#[axum::debug_handler]
pub async fn create_dentist(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    AppJson(request): AppJson<CreateDentistRequest>,
) -> Result<(StatusCode, Json<DentistDto>), AppError> {
    user.require_any(&[Role::Admin])?;

    let dentist = DentistService::new(&config).save(request).await?;

    Ok((StatusCode::CREATED, Json(dentist)))
}

#[axum::debug_handler]
pub async fn update_dentist(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    AppPath(dentist_id): AppPath<i64>,
    AppJson(request): AppJson<UpdateDentistRequest>,
) -> Result<Json<DentistDto>, AppError> {
    let service = DentistService::new(&config);

    let existing = service
        .find_by_id(dentist_id)
        .await?
        .ok_or(DentistError::NotFound(dentist_id))?;
    user.require_admin_or_self(Some(&existing.email))?;

    let dentist = service.update(dentist_id, request).await?;

    Ok(Json(dentist))
}

#[axum::debug_handler]
pub async fn delete_dentist(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    AppPath(dentist_id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    user.require_any(&[Role::Admin])?;

    DentistService::new(&config).delete(dentist_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn get_dentist(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    AppPath(dentist_id): AppPath<i64>,
) -> Result<Json<DentistDto>, AppError> {
    user.require_any(&[Role::Admin])?;

    let dentist = DentistService::new(&config)
        .find_by_id(dentist_id)
        .await?
        .ok_or(DentistError::NotFound(dentist_id))?;

    Ok(Json(dentist))
}

#[axum::debug_handler]
pub async fn list_dentists(
    State(config): State<Arc<AppConfig>>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Vec<DentistDto>>, AppError> {
    let dentists = DentistService::new(&config).find_all().await?;
    Ok(Json(dentists))
}

#[axum::debug_handler]
pub async fn get_dentist_by_registration(
    State(config): State<Arc<AppConfig>>,
    Extension(_user): Extension<AuthUser>,
    AppPath(registration_number): AppPath<i64>,
) -> Result<Json<DentistDto>, AppError> {
    let dentist = DentistService::new(&config)
        .find_by_registration_number(registration_number)
        .await?
        .ok_or(DentistError::RegistrationNotFound(registration_number))?;

    Ok(Json(dentist))
}

#[axum::debug_handler]
pub async fn check_email(
    State(config): State<Arc<AppConfig>>,
    AppQuery(query): AppQuery<EmailQuery>,
) -> Result<Json<bool>, AppError> {
    let exists = DentistService::new(&config).exists_by_email(&query.email).await?;
    Ok(Json(exists))
}

#[axum::debug_handler]
pub async fn check_registration(
    State(config): State<Arc<AppConfig>>,
    AppQuery(query): AppQuery<RegistrationQuery>,
) -> Result<Json<bool>, AppError> {
    let exists = DentistService::new(&config)
        .exists_by_registration_number(query.registration_number)
        .await?;
    Ok(Json(exists))
}
