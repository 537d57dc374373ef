use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use dentist_cell::models::NewDentist;
use dentist_cell::services::DentistService;
use patient_cell::models::NewPatient;
use patient_cell::services::PatientService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::jwt::{issue_token, TokenSubject};
use shared_utils::password::PasswordService;
use shared_utils::validation::require_email;

use crate::models::{AuthError, AuthenticationResponse, Credentials, LoginRequest, Registration, RegisterRequest};

const CREDENTIAL_COLUMNS: &str = "id,first_name,last_name,email,password,role";

/// Columns echoed back after inserting an admin.
#[derive(Debug, Deserialize)]
struct AdminRecord {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
}

pub struct RegistrationService {
    supabase: SupabaseClient,
    passwords: PasswordService,
    patients: PatientService,
    dentists: DentistService,
    jwt_secret: String,
    jwt_expiration_hours: i64,
}

impl RegistrationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            passwords: PasswordService::new(config.allow_default_passwords),
            patients: PatientService::new(config),
            dentists: DentistService::new(config),
            jwt_secret: config.jwt_secret.clone(),
            jwt_expiration_hours: config.jwt_expiration_hours,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthenticationResponse, AppError> {
        self.register_on(request, Local::now().date_naive()).await
    }

    /// Registers a user of any role; patients without an admission date are admitted on `today`.
    pub async fn register_on(
        &self,
        request: RegisterRequest,
        today: NaiveDate,
    ) -> Result<AuthenticationResponse, AppError> {
        let email = require_email(request.email.as_deref())?;
        debug!("Registering {}", email);

        if self.exists_by_email(&email).await? {
            warn!("Registration rejected, {} already exists", email);
            return Err(AuthError::EmailAlreadyExists.into());
        }

        match Registration::try_from(request)? {
            Registration::Admin { person } => {
                let password = person
                    .password
                    .as_deref()
                    .ok_or_else(|| AuthError::ValidationError("Password is required".to_string()))?;

                let body = json!({
                    "first_name": person.first_name,
                    "last_name": person.last_name,
                    "email": email,
                    "password": self.passwords.ensure_encoded(password)?,
                    "role": Role::Admin.as_str(),
                });
                let admin: AdminRecord = self
                    .supabase
                    .insert("/rest/v1/users?select=id,first_name,last_name,email", body)
                    .await?;

                info!("Admin {} registered", admin.id);
                self.respond(admin.id, Role::Admin, admin.first_name, admin.last_name, admin.email)
            }
            Registration::Patient {
                person,
                card_identity,
                admission_date,
                address,
            } => {
                let password_hash = self.passwords.resolve_password(
                    person.password.as_deref(),
                    &person.first_name,
                    &person.last_name,
                    card_identity,
                )?;

                let patient = self
                    .patients
                    .insert_patient(NewPatient {
                        first_name: person.first_name,
                        last_name: person.last_name,
                        email,
                        password_hash,
                        card_identity,
                        admission_date: admission_date.unwrap_or(today),
                        address,
                    })
                    .await?;

                self.respond(patient.id, Role::Patient, patient.first_name, patient.last_name, patient.email)
            }
            Registration::Dentist {
                person,
                registration_number,
            } => {
                let password_hash = self.passwords.resolve_password(
                    person.password.as_deref(),
                    &person.first_name,
                    &person.last_name,
                    registration_number,
                )?;

                let dentist = self
                    .dentists
                    .insert_dentist(NewDentist {
                        first_name: person.first_name,
                        last_name: person.last_name,
                        email,
                        password_hash,
                        registration_number,
                    })
                    .await?;

                self.respond(dentist.id, Role::Dentist, dentist.first_name, dentist.last_name, dentist.email)
            }
        }
    }

    /// Every failure reads the same to the caller.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthenticationResponse, AppError> {
        let (Some(email), Some(password)) = (request.email.as_deref(), request.password.as_deref()) else {
            return Err(AuthError::InvalidCredentials.into());
        };
        let email = email.trim().to_lowercase();

        let path = format!(
            "/rest/v1/users?email=eq.{}&select={}",
            urlencoding::encode(&email),
            CREDENTIAL_COLUMNS
        );
        let credentials: Option<Credentials> = self.supabase.fetch_one(&path).await?;

        let Some(user) = credentials.filter(|user| self.passwords.verify(password, &user.password)) else {
            warn!("Failed login for {}", email);
            return Err(AuthError::InvalidCredentials.into());
        };

        info!("User {} logged in", user.id);
        self.respond(user.id, user.role, user.first_name, user.last_name, user.email)
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        self.patients.exists_by_email(email).await
    }

    fn respond(
        &self,
        id: i64,
        role: Role,
        first_name: String,
        last_name: String,
        email: String,
    ) -> Result<AuthenticationResponse, AppError> {
        let subject = TokenSubject {
            id,
            email: &email,
            role,
            first_name: &first_name,
            last_name: &last_name,
        };
        let token = issue_token(&subject, &self.jwt_secret, self.jwt_expiration_hours)?;

        Ok(AuthenticationResponse {
            token,
            role,
            id,
            first_name,
            last_name,
            email,
        })
    }
}
