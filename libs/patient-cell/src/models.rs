use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_models::error::AppError;

/// Columns read for a patient; the password never leaves storage.
pub const PATIENT_COLUMNS: &str =
    "id,first_name,last_name,email,card_identity,admission_date,address:addresses(street,number,location,province)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub number: Option<String>,
    pub location: Option<String>,
    pub province: Option<String>,
}

/// A patient as stored in `users` with its embedded address.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub card_identity: Option<i64>,
    pub admission_date: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<Address>,
}

impl PatientRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDto {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub card_identity: Option<i64>,
    pub admission_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address: Option<Address>,
}

impl From<PatientRecord> for PatientDto {
    fn from(record: PatientRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            card_identity: record.card_identity,
            admission_date: record.admission_date,
            address: record.address,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub card_identity: Option<i64>,
    pub admission_date: Option<NaiveDate>,
    pub address: Option<Address>,
}

/// Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub card_identity: Option<i64>,
    pub admission_date: Option<NaiveDate>,
    pub address: Option<Address>,
}

/// Validated patient ready to be written. `password_hash` is already encoded.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub card_identity: i64,
    pub admission_date: NaiveDate,
    pub address: Option<Address>,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardIdentityQuery {
    pub card_identity: i64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found with id: {0}")]
    NotFound(i64),

    #[error("Email is already registered")]
    EmailAlreadyExists,

    #[error("Card identity number is already registered")]
    CardIdentityAlreadyExists,

    #[error("{0}")]
    ValidationError(String),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(_) => AppError::NotFound(err.to_string()),
            PatientError::EmailAlreadyExists | PatientError::CardIdentityAlreadyExists => {
                AppError::Conflict(err.to_string())
            }
            PatientError::ValidationError(msg) => AppError::BadRequest(msg),
        }
    }
}
