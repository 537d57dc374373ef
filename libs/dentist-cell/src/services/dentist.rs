use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::error::AppError;
use shared_utils::password::PasswordService;
use shared_utils::validation::{require_email, require_text};

use crate::models::{
    CreateDentistRequest, DentistDto, DentistError, DentistRecord, NewDentist, UpdateDentistRequest, DENTIST_COLUMNS,
};

pub struct DentistService {
    supabase: SupabaseClient,
    passwords: PasswordService,
}

impl DentistService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            passwords: PasswordService::new(config.allow_default_passwords),
        }
    }

    pub async fn save(&self, request: CreateDentistRequest) -> Result<DentistDto, AppError> {
        let first_name = require_text(request.first_name.as_deref(), "First name")?;
        let last_name = require_text(request.last_name.as_deref(), "Last name")?;
        let email = require_email(request.email.as_deref())?;
        let registration_number = request
            .registration_number
            .ok_or_else(|| DentistError::ValidationError("Registration number is required".to_string()))?;

        debug!("Creating dentist {} ({})", email, registration_number);

        if self.exists_by_email(&email).await? {
            warn!("Rejected dentist with duplicate email {}", email);
            return Err(DentistError::EmailAlreadyExists.into());
        }
        if self.exists_by_registration_number(registration_number).await? {
            warn!("Rejected dentist with duplicate registration number {}", registration_number);
            return Err(DentistError::RegistrationAlreadyExists.into());
        }

        let password_hash = self.passwords.resolve_password(
            request.password.as_deref(),
            &first_name,
            &last_name,
            registration_number,
        )?;

        self.insert_dentist(NewDentist {
            first_name,
            last_name,
            email,
            password_hash,
            registration_number,
        })
        .await
    }

    /// Writes an already validated dentist.
    pub async fn insert_dentist(&self, dentist: NewDentist) -> Result<DentistDto, AppError> {
        let user_data = json!({
            "first_name": dentist.first_name,
            "last_name": dentist.last_name,
            "email": dentist.email,
            "password": dentist.password_hash,
            "role": "DENTIST",
            "registration_number": dentist.registration_number,
        });

        let path = format!("/rest/v1/users?select={}", DENTIST_COLUMNS);
        let record: DentistRecord = self.supabase.insert(&path, user_data).await?;

        info!("Dentist {} created", record.id);
        Ok(record.into())
    }

    pub async fn update(&self, id: i64, request: UpdateDentistRequest) -> Result<DentistDto, AppError> {
        debug!("Updating dentist {}", id);

        let mut update_data = Map::new();
        if let Some(first_name) = request.first_name {
            update_data.insert("first_name".to_string(), json!(require_text(Some(&first_name), "First name")?));
        }
        if let Some(last_name) = request.last_name {
            update_data.insert("last_name".to_string(), json!(require_text(Some(&last_name), "Last name")?));
        }
        if let Some(email) = request.email {
            update_data.insert("email".to_string(), json!(require_email(Some(&email))?));
        }
        if let Some(registration_number) = request.registration_number {
            update_data.insert("registration_number".to_string(), json!(registration_number));
        }
        if let Some(password) = request.password.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            update_data.insert("password".to_string(), json!(self.passwords.ensure_encoded(password)?));
        }

        if update_data.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| DentistError::NotFound(id).into());
        }

        let path = format!("/rest/v1/users?id=eq.{}&role=eq.DENTIST&select={}", id, DENTIST_COLUMNS);
        let updated: Vec<DentistRecord> = self
            .supabase
            .write_returning(Method::PATCH, &path, Some(Value::Object(update_data)))
            .await?;

        let record = updated.into_iter().next().ok_or(DentistError::NotFound(id))?;
        info!("Dentist {} updated", id);
        Ok(record.into())
    }

    /// Fails while appointments still reference the dentist.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let path = format!("/rest/v1/users?id=eq.{}&role=eq.DENTIST&select=id", id);
        let deleted: Vec<Value> = self.supabase.write_returning(Method::DELETE, &path, None).await?;

        if deleted.is_empty() {
            return Err(DentistError::NotFound(id).into());
        }

        info!("Dentist {} deleted", id);
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<DentistDto>, AppError> {
        Ok(self.find_record(id).await?.map(DentistDto::from))
    }

    async fn find_record(&self, id: i64) -> Result<Option<DentistRecord>, AppError> {
        let path = format!("/rest/v1/users?id=eq.{}&role=eq.DENTIST&select={}", id, DENTIST_COLUMNS);
        Ok(self.supabase.fetch_one(&path).await?)
    }

    /// Existence check used by other cells; fails with the not-found message.
    pub async fn require(&self, id: i64) -> Result<DentistRecord, AppError> {
        self.find_record(id)
            .await?
            .ok_or_else(|| DentistError::NotFound(id).into())
    }

    pub async fn find_all(&self) -> Result<Vec<DentistDto>, AppError> {
        let path = format!("/rest/v1/users?role=eq.DENTIST&select={}&order=id.asc", DENTIST_COLUMNS);
        let records: Vec<DentistRecord> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(records.into_iter().map(DentistDto::from).collect())
    }

    pub async fn find_by_registration_number(&self, registration_number: i64) -> Result<Option<DentistDto>, AppError> {
        let path = format!(
            "/rest/v1/users?registration_number=eq.{}&role=eq.DENTIST&select={}",
            registration_number, DENTIST_COLUMNS
        );
        let record: Option<DentistRecord> = self.supabase.fetch_one(&path).await?;
        Ok(record.map(DentistDto::from))
    }

    /// Emails are unique across every role, so the check spans all users.
    pub async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let path = format!(
            "/rest/v1/users?email=eq.{}&select=id",
            urlencoding::encode(&email.trim().to_lowercase())
        );
        Ok(self.supabase.exists(&path).await?)
    }

    pub async fn exists_by_registration_number(&self, registration_number: i64) -> Result<bool, AppError> {
        let path = format!("/rest/v1/users?registration_number=eq.{}&select=id", registration_number);
        Ok(self.supabase.exists(&path).await?)
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        Ok(self.supabase.count("/rest/v1/users?role=eq.DENTIST").await?)
    }
}
