use serde::{Deserialize, Serialize};

use shared_models::error::AppError;

pub const DENTIST_COLUMNS: &str = "id,first_name,last_name,email,registration_number";

#[derive(Debug, Clone, Deserialize)]
pub struct DentistRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub registration_number: Option<i64>,
}

impl DentistRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DentistDto {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub registration_number: Option<i64>,
}

impl From<DentistRecord> for DentistDto {
    fn from(record: DentistRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            registration_number: record.registration_number,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDentistRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub registration_number: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDentistRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub registration_number: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewDentist {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub registration_number: i64,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationQuery {
    pub registration_number: i64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DentistError {
    #[error("Dentist not found with id: {0}")]
    NotFound(i64),

    #[error("Dentist not found with registration number: {0}")]
    RegistrationNotFound(i64),

    #[error("Email is already registered")]
    EmailAlreadyExists,

    #[error("Registration number is already registered")]
    RegistrationAlreadyExists,

    #[error("{0}")]
    ValidationError(String),
}

impl From<DentistError> for AppError {
    fn from(err: DentistError) -> Self {
        match err {
            DentistError::NotFound(_) | DentistError::RegistrationNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            DentistError::EmailAlreadyExists | DentistError::RegistrationAlreadyExists => {
                AppError::Conflict(err.to_string())
            }
            DentistError::ValidationError(msg) => AppError::BadRequest(msg),
        }
    }
}
