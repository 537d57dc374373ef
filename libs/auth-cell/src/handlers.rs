use std::sync::Arc;

use axum::{
    extract::State,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::TokenResponse;
use shared_models::error::AppError;
use shared_utils::extractor::{AppJson, AppQuery};
use shared_utils::jwt::validate_token;

use crate::models::{AuthenticationResponse, EmailQuery, LoginRequest, RegisterRequest};
use crate::services::RegistrationService;

#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<Json<AuthenticationResponse>, AppError> {
    let response = RegistrationService::new(&config).register(request).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<AuthenticationResponse>, AppError> {
    let response = RegistrationService::new(&config).login(request).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn check_email(
    State(config): State<Arc<AppConfig>>,
    AppQuery(query): AppQuery<EmailQuery>,
) -> Result<Json<bool>, AppError> {
    let exists = RegistrationService::new(&config).exists_by_email(&query.email).await?;
    Ok(Json(exists))
}

#[axum::debug_handler]
pub async fn validate(
    State(config): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let TypedHeader(auth) = auth.ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;
    let user = validate_token(auth.token(), &config.jwt_secret).map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id.to_string(),
        email: Some(user.email),
        role: Some(user.role.to_string()),
    }))
}

#[axum::debug_handler]
pub async fn verify(
    State(config): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Json<Value> {
    debug!("Verifying token");

    let valid = auth
        .map(|TypedHeader(auth)| validate_token(auth.token(), &config.jwt_secret).is_ok())
        .unwrap_or(false);

    Json(json!({ "valid": valid }))
}
