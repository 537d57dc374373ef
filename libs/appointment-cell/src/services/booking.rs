use chrono::{Local, NaiveDate};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use dentist_cell::services::DentistService;
use patient_cell::services::PatientService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::error::AppError;
use shared_models::pagination::Page;

use crate::models::{
    AppointmentDto, AppointmentError, AppointmentRecord, AppointmentRequest, AppointmentSearchQuery,
    AppointmentStatus, UpdateAppointmentRequest, APPOINTMENT_COLUMNS,
};
use crate::services::schedule::{
    check_description, ensure_not_past, parse_date, parse_time, status_for_save, status_for_update,
};
use crate::services::search::AppointmentSearch;

pub struct AppointmentService {
    supabase: SupabaseClient,
    patients: PatientService,
    dentists: DentistService,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            patients: PatientService::new(config),
            dentists: DentistService::new(config),
        }
    }

    pub async fn save(&self, request: AppointmentRequest) -> Result<AppointmentDto, AppError> {
        self.save_on(request, Local::now().date_naive()).await
    }

    /// Books an appointment as of `today`. Nothing is written unless every
    /// reference and field checks out.
    pub async fn save_on(&self, request: AppointmentRequest, today: NaiveDate) -> Result<AppointmentDto, AppError> {
        let patient_id = request
            .patient_id
            .ok_or_else(|| AppointmentError::ValidationError("Patient id is required".to_string()))?;
        let dentist_id = request
            .dentist_id
            .ok_or_else(|| AppointmentError::ValidationError("Dentist id is required".to_string()))?;

        debug!("Booking appointment for patient {} with dentist {}", patient_id, dentist_id);

        self.patients.require(patient_id).await?;
        self.dentists.require(dentist_id).await?;

        let date = parse_date(request.date.as_deref())?;
        if let Err(e) = ensure_not_past(date, today) {
            warn!("Rejected appointment on {} for patient {}", date, patient_id);
            return Err(e.into());
        }
        let time = parse_time(request.time.as_deref())?;
        let description = check_description(request.description)?;
        let status = status_for_save(request.status.as_deref());

        let body = json!({
            "patient_id": patient_id,
            "dentist_id": dentist_id,
            "date": date.format("%Y-%m-%d").to_string(),
            "time": time.format("%H:%M:%S").to_string(),
            "description": description,
            "status": status.as_str(),
        });

        let path = format!("/rest/v1/appointments?select={}", APPOINTMENT_COLUMNS);
        let record: AppointmentRecord = self.supabase.insert(&path, body).await?;

        info!("Appointment {} booked on {} at {}", record.id, record.date, record.time);
        Ok(record.into())
    }

    pub async fn update(&self, id: i64, request: UpdateAppointmentRequest) -> Result<AppointmentDto, AppError> {
        self.update_on(id, request, Local::now().date_naive()).await
    }

    /// Rewrites an appointment. Absent fields keep their stored values.
    pub async fn update_on(
        &self,
        id: i64,
        request: UpdateAppointmentRequest,
        today: NaiveDate,
    ) -> Result<AppointmentDto, AppError> {
        debug!("Updating appointment {}", id);

        let existing = self.find_record(id).await?.ok_or(AppointmentError::NotFound(id))?;

        let patient_id = request.patient_id.unwrap_or(existing.patient_id);
        let dentist_id = request.dentist_id.unwrap_or(existing.dentist_id);
        self.patients.require(patient_id).await?;
        self.dentists.require(dentist_id).await?;

        let date = match request.date.as_deref() {
            Some(raw) => {
                let date = parse_date(Some(raw))?;
                if let Err(e) = ensure_not_past(date, today) {
                    warn!("Rejected move of appointment {} to {}", id, date);
                    return Err(e.into());
                }
                date
            }
            None => existing.date,
        };
        let time = match request.time.as_deref() {
            Some(raw) => parse_time(Some(raw))?,
            None => existing.time,
        };
        let description = match request.description {
            Some(description) => check_description(description)?,
            None => existing.description,
        };
        let status = status_for_update(request.status.as_deref(), existing.status);

        let body = json!({
            "patient_id": patient_id,
            "dentist_id": dentist_id,
            "date": date.format("%Y-%m-%d").to_string(),
            "time": time.format("%H:%M:%S").to_string(),
            "description": description,
            "status": status.as_str(),
        });

        let record = self.patch_one(id, body).await?;

        info!("Appointment {} updated", id);
        Ok(record.into())
    }

    pub async fn update_status(&self, id: i64, status: AppointmentStatus) -> Result<AppointmentDto, AppError> {
        debug!("Setting status of appointment {} to {}", id, status);

        let record = self.patch_one(id, json!({ "status": status.as_str() })).await?;

        info!("Appointment {} is now {}", id, status);
        Ok(record.into())
    }

    async fn patch_one(&self, id: i64, body: Value) -> Result<AppointmentRecord, AppError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&select={}", id, APPOINTMENT_COLUMNS);
        let rows: Vec<AppointmentRecord> = self.supabase.write_returning(Method::PATCH, &path, Some(body)).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppointmentError::NotFound(id).into())
    }

    /// Returns the removed appointment.
    pub async fn delete(&self, id: i64) -> Result<AppointmentDto, AppError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&select={}", id, APPOINTMENT_COLUMNS);
        let rows: Vec<AppointmentRecord> = self.supabase.write_returning(Method::DELETE, &path, None).await?;

        let record = rows.into_iter().next().ok_or(AppointmentError::NotFound(id))?;

        info!("Appointment {} deleted", id);
        Ok(record.into())
    }

    async fn find_record(&self, id: i64) -> Result<Option<AppointmentRecord>, AppError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&select={}", id, APPOINTMENT_COLUMNS);
        Ok(self.supabase.fetch_one(&path).await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<AppointmentDto>, AppError> {
        Ok(self.find_record(id).await?.map(AppointmentDto::from))
    }

    pub async fn find_all(&self) -> Result<Vec<AppointmentDto>, AppError> {
        let path = format!("/rest/v1/appointments?select={}&order=id.asc", APPOINTMENT_COLUMNS);
        let records: Vec<AppointmentRecord> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(records.into_iter().map(AppointmentDto::from).collect())
    }

    pub async fn search(&self, query: AppointmentSearchQuery) -> Result<Page<AppointmentDto>, AppError> {
        let search = AppointmentSearch::from_query(query)?;
        debug!("Searching appointments on the {} path", search.path_label());

        let (records, total) = self
            .supabase
            .fetch_page::<AppointmentRecord>(&search.to_path())
            .await?;

        Ok(Page::new(records, search.page, total).map(AppointmentDto::from))
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        Ok(self.supabase.count("/rest/v1/appointments").await?)
    }

    /// Appointments dated within `from..=to`.
    pub async fn count_between(&self, from: NaiveDate, to: NaiveDate) -> Result<u64, AppError> {
        let path = format!(
            "/rest/v1/appointments?date=gte.{}&date=lte.{}",
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );
        Ok(self.supabase.count(&path).await?)
    }
}
