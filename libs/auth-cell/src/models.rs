use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use patient_cell::models::Address;
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::validation::require_text;

/// Registration body as sent by clients; `role` selects which fields apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub card_identity: Option<i64>,
    pub admission_date: Option<NaiveDate>,
    pub address: Option<Address>,
    pub registration_number: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub password: Option<String>,
}

/// A registration checked for the fields its role needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    Admin {
        person: Person,
    },
    Patient {
        person: Person,
        card_identity: i64,
        admission_date: Option<NaiveDate>,
        address: Option<Address>,
    },
    Dentist {
        person: Person,
        registration_number: i64,
    },
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = AppError;

    fn try_from(request: RegisterRequest) -> Result<Self, Self::Error> {
        let role = request
            .role
            .ok_or_else(|| AuthError::ValidationError("Role is required".to_string()))?;

        let person = Person {
            first_name: require_text(request.first_name.as_deref(), "First name")?,
            last_name: require_text(request.last_name.as_deref(), "Last name")?,
            password: request
                .password
                .filter(|password| !password.trim().is_empty()),
        };

        match role {
            Role::Admin => {
                if person.password.is_none() {
                    return Err(AuthError::ValidationError("Password is required".to_string()).into());
                }
                Ok(Registration::Admin { person })
            }
            Role::Patient => Ok(Registration::Patient {
                person,
                card_identity: request
                    .card_identity
                    .ok_or_else(|| AuthError::ValidationError("Card identity is required".to_string()))?,
                admission_date: request.admission_date,
                address: request.address,
            }),
            Role::Dentist => Ok(Registration::Dentist {
                person,
                registration_number: request
                    .registration_number
                    .ok_or_else(|| AuthError::ValidationError("Registration number is required".to_string()))?,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    pub token: String,
    pub role: Role,
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Login view of a `users` row, including the stored hash.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email is already registered")]
    EmailAlreadyExists,

    #[error("{0}")]
    ValidationError(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Auth(err.to_string()),
            AuthError::EmailAlreadyExists => AppError::BadRequest(err.to_string()),
            AuthError::ValidationError(msg) => AppError::BadRequest(msg),
        }
    }
}
