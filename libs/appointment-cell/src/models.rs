use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use shared_models::error::AppError;

pub const APPOINTMENT_COLUMNS: &str = "id,patient_id,dentist_id,date,time,description,status";
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppointmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SCHEDULED" => Ok(AppointmentStatus::Scheduled),
            "CONFIRMED" => Ok(AppointmentStatus::Confirmed),
            "COMPLETED" => Ok(AppointmentStatus::Completed),
            "CANCELLED" => Ok(AppointmentStatus::Cancelled),
            "NO_SHOW" => Ok(AppointmentStatus::NoShow),
            _ => Err(AppointmentError::InvalidStatus),
        }
    }
}

/// Row of the `appointments` table.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentRecord {
    pub id: i64,
    pub patient_id: i64,
    pub dentist_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub description: Option<String>,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDto {
    pub id: i64,
    pub patient_id: i64,
    pub dentist_id: i64,
    pub date: String,
    pub time: String,
    pub description: Option<String>,
    pub status: AppointmentStatus,
}

impl From<AppointmentRecord> for AppointmentDto {
    fn from(record: AppointmentRecord) -> Self {
        Self {
            id: record.id,
            patient_id: record.patient_id,
            dentist_id: record.dentist_id,
            date: record.date.format("%Y-%m-%d").to_string(),
            time: record.time.format("%H:%M").to_string(),
            description: record.description,
            status: record.status,
        }
    }
}

/// Body of a booking. Dates are `yyyy-MM-dd`, times `HH:mm`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub patient_id: Option<i64>,
    pub dentist_id: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// Absent fields keep their stored value. `description: null` clears it,
/// which is why it is the only doubly optional field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub id: Option<i64>,
    pub patient_id: Option<i64>,
    pub dentist_id: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSearchQuery {
    pub patient: Option<String>,
    pub dentist: Option<String>,
    pub status: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found with id: {0}")]
    NotFound(i64),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Appointment date cannot be earlier than today")]
    DateInPast,

    #[error("status is required")]
    MissingStatus,

    #[error("invalid status")]
    InvalidStatus,

    #[error("{0}")]
    ValidationError(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound(_) => AppError::NotFound(err.to_string()),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}
