use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::error::AppError;
use shared_utils::password::PasswordService;
use shared_utils::validation::{require_email, require_text};

use crate::models::{
    Address, CreatePatientRequest, NewPatient, PatientDto, PatientError, PatientRecord, UpdatePatientRequest,
    PATIENT_COLUMNS,
};

pub struct PatientService {
    supabase: SupabaseClient,
    passwords: PasswordService,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            passwords: PasswordService::new(config.allow_default_passwords),
        }
    }

    pub async fn save(&self, request: CreatePatientRequest) -> Result<PatientDto, AppError> {
        let first_name = require_text(request.first_name.as_deref(), "First name")?;
        let last_name = require_text(request.last_name.as_deref(), "Last name")?;
        let email = require_email(request.email.as_deref())?;
        let card_identity = request
            .card_identity
            .ok_or_else(|| PatientError::ValidationError("Card identity is required".to_string()))?;
        let admission_date = request
            .admission_date
            .ok_or_else(|| PatientError::ValidationError("Admission date is required".to_string()))?;

        debug!("Creating patient {}", email);

        if self.exists_by_email(&email).await? {
            warn!("Rejected patient with duplicate email {}", email);
            return Err(PatientError::EmailAlreadyExists.into());
        }
        if self.exists_by_card_identity(card_identity).await? {
            warn!("Rejected patient with duplicate card identity {}", card_identity);
            return Err(PatientError::CardIdentityAlreadyExists.into());
        }

        let password_hash = self.passwords.resolve_password(
            request.password.as_deref(),
            &first_name,
            &last_name,
            card_identity,
        )?;

        self.insert_patient(NewPatient {
            first_name,
            last_name,
            email,
            password_hash,
            card_identity,
            admission_date,
            address: request.address,
        })
        .await
    }

    /// Writes an already validated patient and its address.
    pub async fn insert_patient(&self, patient: NewPatient) -> Result<PatientDto, AppError> {
        let user_data = json!({
            "first_name": patient.first_name,
            "last_name": patient.last_name,
            "email": patient.email,
            "password": patient.password_hash,
            "role": "PATIENT",
            "card_identity": patient.card_identity,
            "admission_date": patient.admission_date.format("%Y-%m-%d").to_string(),
        });

        let path = format!("/rest/v1/users?select={}", PATIENT_COLUMNS);
        let mut record: PatientRecord = self.supabase.insert(&path, user_data).await?;

        if let Some(address) = patient.address {
            match self.upsert_address(record.id, &address).await {
                Ok(()) => record.address = Some(address),
                Err(e) => {
                    warn!("Address for patient {} could not be stored, rolling back", record.id);
                    let rollback = format!("/rest/v1/users?id=eq.{}", record.id);
                    if let Err(rollback_err) = self
                        .supabase
                        .write_returning::<Value>(Method::DELETE, &rollback, None)
                        .await
                    {
                        warn!("Rollback of patient {} failed: {}", record.id, rollback_err);
                    }
                    return Err(e);
                }
            }
        }

        info!("Patient {} created", record.id);
        Ok(record.into())
    }

    async fn upsert_address(&self, patient_id: i64, address: &Address) -> Result<(), AppError> {
        let body = json!({
            "patient_id": patient_id,
            "street": address.street,
            "number": address.number,
            "location": address.location,
            "province": address.province,
        });

        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
        );

        let _: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/addresses?on_conflict=patient_id",
                Some(body),
                Some(headers),
            )
            .await?;
        Ok(())
    }

    pub async fn update(&self, id: i64, request: UpdatePatientRequest) -> Result<PatientDto, AppError> {
        debug!("Updating patient {}", id);

        if self.find_record(id).await?.is_none() {
            return Err(PatientError::NotFound(id).into());
        }

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
        if let Some(card_identity) = request.card_identity {
            update_data.insert("card_identity".to_string(), json!(card_identity));
        }
        if let Some(admission_date) = request.admission_date {
            update_data.insert(
                "admission_date".to_string(),
                json!(admission_date.format("%Y-%m-%d").to_string()),
            );
        }
        if let Some(password) = request.password.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            update_data.insert("password".to_string(), json!(self.passwords.ensure_encoded(password)?));
        }

        if !update_data.is_empty() {
            let path = format!("/rest/v1/users?id=eq.{}&role=eq.PATIENT", id);
            let _: Vec<Value> = self
                .supabase
                .write_returning(Method::PATCH, &path, Some(Value::Object(update_data)))
                .await?;
        }

        if let Some(address) = request.address {
            self.upsert_address(id, &address).await?;
        }

        info!("Patient {} updated", id);
        self.find_by_id(id)
            .await?
            .ok_or_else(|| PatientError::NotFound(id).into())
    }

    /// Address and appointments go with the patient.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let path = format!("/rest/v1/users?id=eq.{}&role=eq.PATIENT&select=id", id);
        let deleted: Vec<Value> = self.supabase.write_returning(Method::DELETE, &path, None).await?;

        if deleted.is_empty() {
            return Err(PatientError::NotFound(id).into());
        }

        info!("Patient {} deleted", id);
        Ok(())
    }

    async fn find_record(&self, id: i64) -> Result<Option<PatientRecord>, AppError> {
        let path = format!("/rest/v1/users?id=eq.{}&role=eq.PATIENT&select={}", id, PATIENT_COLUMNS);
        Ok(self.supabase.fetch_one(&path).await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<PatientDto>, AppError> {
        Ok(self.find_record(id).await?.map(PatientDto::from))
    }

    /// Existence check used by other cells; fails with the not-found message.
    pub async fn require(&self, id: i64) -> Result<PatientRecord, AppError> {
        self.find_record(id)
            .await?
            .ok_or_else(|| PatientError::NotFound(id).into())
    }

    pub async fn find_all(&self) -> Result<Vec<PatientDto>, AppError> {
        let path = format!("/rest/v1/users?role=eq.PATIENT&select={}&order=id.asc", PATIENT_COLUMNS);
        let records: Vec<PatientRecord> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(records.into_iter().map(PatientDto::from).collect())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<PatientDto>, AppError> {
        let path = format!(
            "/rest/v1/users?email=eq.{}&role=eq.PATIENT&select={}",
            urlencoding::encode(&email.trim().to_lowercase()),
            PATIENT_COLUMNS
        );
        let record: Option<PatientRecord> = self.supabase.fetch_one(&path).await?;
        Ok(record.map(PatientDto::from))
    }

    /// Emails are unique across every role, so the check spans all users.
    pub async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let path = format!(
            "/rest/v1/users?email=eq.{}&select=id",
            urlencoding::encode(&email.trim().to_lowercase())
        );
        Ok(self.supabase.exists(&path).await?)
    }

    pub async fn exists_by_card_identity(&self, card_identity: i64) -> Result<bool, AppError> {
        let path = format!("/rest/v1/users?card_identity=eq.{}&select=id", card_identity);
        Ok(self.supabase.exists(&path).await?)
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        Ok(self.supabase.count("/rest/v1/users?role=eq.PATIENT").await?)
    }
}
