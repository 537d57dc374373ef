use chrono::{Datelike, Local, Months, NaiveDate};
use reqwest::Method;
use tracing::debug;

use appointment_cell::services::AppointmentService;
use dentist_cell::services::DentistService;
use patient_cell::services::PatientService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::error::AppError;

use crate::models::{
    BasicStats, DashboardStats, MonthlyAppointments, UpcomingAppointment, UpcomingAppointments, UpcomingRow,
};

pub const HISTOGRAM_MONTHS: u32 = 6;

const UPCOMING_COLUMNS: &str = "id,date,time,status,\
patient:users!appointments_patient_id_fkey(full_name),\
dentist:users!appointments_dentist_id_fkey(full_name)";

/// One calendar month, both ends inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthWindow {
    pub label: String,
    pub first: NaiveDate,
    pub last: NaiveDate,
}

/// The `count` calendar months ending with the month of `today`, oldest first.
pub fn trailing_months(today: NaiveDate, count: u32) -> Vec<MonthWindow> {
    let Some(current) = today.with_day(1) else {
        return Vec::new();
    };

    (0..count)
        .rev()
        .filter_map(|back| {
            let first = current.checked_sub_months(Months::new(back))?;
            let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
            Some(MonthWindow {
                label: first.format("%b %Y").to_string(),
                first,
                last,
            })
        })
        .collect()
}

pub struct DashboardService {
    supabase: SupabaseClient,
    patients: PatientService,
    dentists: DentistService,
    appointments: AppointmentService,
}

impl DashboardService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            patients: PatientService::new(config),
            dentists: DentistService::new(config),
            appointments: AppointmentService::new(config),
        }
    }

    pub async fn basic_stats(&self) -> Result<BasicStats, AppError> {
        Ok(BasicStats {
            total_appointments: self.appointments.count().await?,
            total_dentists: self.dentists.count().await?,
            total_patients: self.patients.count().await?,
        })
    }

    pub async fn stats(&self) -> Result<DashboardStats, AppError> {
        self.stats_on(Local::now().date_naive()).await
    }

    pub async fn stats_on(&self, today: NaiveDate) -> Result<DashboardStats, AppError> {
        debug!("Computing dashboard totals for {}", today);

        let basic = self.basic_stats().await?;
        let today_appointments = self.appointments.count_between(today, today).await?;

        Ok(DashboardStats {
            total_appointments: basic.total_appointments,
            total_dentists: basic.total_dentists,
            total_patients: basic.total_patients,
            today_appointments,
            last_updated: today,
        })
    }

    pub async fn appointments_by_month(&self) -> Result<MonthlyAppointments, AppError> {
        self.appointments_by_month_on(Local::now().date_naive()).await
    }

    pub async fn appointments_by_month_on(&self, today: NaiveDate) -> Result<MonthlyAppointments, AppError> {
        let windows = trailing_months(today, HISTOGRAM_MONTHS);

        let mut months = Vec::with_capacity(windows.len());
        let mut appointment_counts = Vec::with_capacity(windows.len());
        for window in windows {
            appointment_counts.push(self.appointments.count_between(window.first, window.last).await?);
            months.push(window.label);
        }

        Ok(MonthlyAppointments {
            months,
            appointment_counts,
        })
    }

    pub async fn upcoming_appointments(&self) -> Result<UpcomingAppointments, AppError> {
        self.upcoming_appointments_on(Local::now().date_naive()).await
    }

    /// Appointments from `today` on, soonest first.
    pub async fn upcoming_appointments_on(&self, today: NaiveDate) -> Result<UpcomingAppointments, AppError> {
        let path = format!(
            "/rest/v1/appointments?select={}&date=gte.{}&order=date.asc,time.asc",
            UPCOMING_COLUMNS,
            today.format("%Y-%m-%d")
        );
        let rows: Vec<UpcomingRow> = self.supabase.request(Method::GET, &path, None).await?;

        let upcoming: Vec<UpcomingAppointment> = rows.into_iter().map(UpcomingAppointment::from).collect();
        Ok(UpcomingAppointments {
            count: upcoming.len(),
            upcoming_appointments: upcoming,
        })
    }
}
