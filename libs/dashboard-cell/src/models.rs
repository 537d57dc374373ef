use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use appointment_cell::models::AppointmentStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_appointments: u64,
    pub total_dentists: u64,
    pub total_patients: u64,
    pub today_appointments: u64,
    pub last_updated: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicStats {
    pub total_appointments: u64,
    pub total_dentists: u64,
    pub total_patients: u64,
}

/// Parallel lists, oldest month first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAppointments {
    pub months: Vec<String>,
    pub appointment_counts: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingAppointment {
    pub id: i64,
    pub time: String,
    pub patient_name: String,
    pub dentist_name: String,
    pub date: String,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingAppointments {
    pub upcoming_appointments: Vec<UpcomingAppointment>,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartyName {
    pub full_name: String,
}

/// Appointment row with both parties' names embedded.
#[derive(Debug, Clone, Deserialize)]
pub struct UpcomingRow {
    pub id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub patient: Option<PartyName>,
    pub dentist: Option<PartyName>,
}

impl From<UpcomingRow> for UpcomingAppointment {
    fn from(row: UpcomingRow) -> Self {
        Self {
            id: row.id,
            time: row.time.format("%H:%M").to_string(),
            patient_name: row.patient.map(|p| p.full_name).unwrap_or_default(),
            dentist_name: row.dentist.map(|d| d.full_name).unwrap_or_default(),
            date: row.date.format("%Y-%m-%d").to_string(),
            status: row.status,
        }
    }
}
