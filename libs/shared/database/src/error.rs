use reqwest::header::InvalidHeaderValue;
use serde::Deserialize;
use thiserror::Error;

use shared_models::error::AppError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("Storage rejected credentials: {0}")]
    Unauthorized(String),

    #[error("Storage resource not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Error payload returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

impl DatabaseError {
    /// Classifies a failed PostgREST response by status and SQLSTATE code.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: PostgrestError = serde_json::from_str(body).unwrap_or_default();
        let message = match (&parsed.message, &parsed.details) {
            (Some(message), Some(details)) => format!("{} {}", message, details),
            (Some(message), None) => message.clone(),
            _ => body.to_string(),
        };

        match parsed.code.as_deref() {
            Some(UNIQUE_VIOLATION) => return DatabaseError::UniqueViolation(message),
            Some(FOREIGN_KEY_VIOLATION) => return DatabaseError::ForeignKeyViolation(message),
            _ => {}
        }

        match status {
            401 | 403 => DatabaseError::Unauthorized(message),
            404 => DatabaseError::NotFound(message),
            _ => DatabaseError::Api { status, message },
        }
    }

    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation(_) | DatabaseError::ForeignKeyViolation(_))
    }
}

/// Maps a storage constraint message onto the client-facing wording.
pub fn integrity_message(violation: &str) -> &'static str {
    let lowered = violation.to_ascii_lowercase();
    if lowered.contains("email") {
        "Email is already registered"
    } else if lowered.contains("card_identity") {
        "Card identity number is already registered"
    } else if lowered.contains("registration_number") {
        "Registration number is already registered"
    } else {
        "Duplicate data"
    }
}

fn reference_message(violation: &str) -> &'static str {
    if violation.to_ascii_lowercase().contains("still referenced") {
        "Record is still referenced by other records"
    } else {
        "Referenced record does not exist"
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation(msg) => {
                tracing::warn!("Integrity violation: {}", msg);
                AppError::BadRequest(integrity_message(&msg).to_string())
            }
            DatabaseError::ForeignKeyViolation(msg) => {
                tracing::warn!("Reference violation: {}", msg);
                AppError::BadRequest(reference_message(&msg).to_string())
            }
            other => AppError::Database(other.to_string()),
        }
    }
}
