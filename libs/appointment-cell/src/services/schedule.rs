use chrono::{NaiveDate, NaiveTime};

use crate::models::{AppointmentError, AppointmentStatus, MAX_DESCRIPTION_LENGTH};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Parses a `yyyy-MM-dd` date. Single-digit months or days are rejected.
pub fn parse_date(raw: Option<&str>) -> Result<NaiveDate, AppointmentError> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppointmentError::ValidationError("Date is required".to_string()))?;

    if raw.len() != 10 {
        return Err(AppointmentError::InvalidDate(raw.to_string()));
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| AppointmentError::InvalidDate(raw.to_string()))
}

/// Parses an `HH:mm` time.
pub fn parse_time(raw: Option<&str>) -> Result<NaiveTime, AppointmentError> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppointmentError::ValidationError("Time is required".to_string()))?;

    if raw.len() != 5 {
        return Err(AppointmentError::InvalidTime(raw.to_string()));
    }

    NaiveTime::parse_from_str(raw, TIME_FORMAT).map_err(|_| AppointmentError::InvalidTime(raw.to_string()))
}

/// Today is still bookable.
pub fn ensure_not_past(date: NaiveDate, today: NaiveDate) -> Result<(), AppointmentError> {
    if date < today {
        return Err(AppointmentError::DateInPast);
    }
    Ok(())
}

/// Status for a new appointment: anything unrecognized falls back to `SCHEDULED`.
pub fn status_for_save(raw: Option<&str>) -> AppointmentStatus {
    raw.and_then(|value| value.parse().ok()).unwrap_or_default()
}

/// Status for an update: absent keeps `current`, unrecognized falls back to `SCHEDULED`.
pub fn status_for_update(raw: Option<&str>, current: AppointmentStatus) -> AppointmentStatus {
    match raw {
        None => current,
        Some(value) => value.parse().unwrap_or_default(),
    }
}

/// Status sent to the dedicated status endpoint, which is strict.
pub fn parse_status_patch(raw: Option<&str>) -> Result<AppointmentStatus, AppointmentError> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AppointmentError::MissingStatus)?;
    raw.parse()
}

pub fn check_description(description: Option<String>) -> Result<Option<String>, AppointmentError> {
    match description {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LENGTH => Err(AppointmentError::ValidationError(
            format!("Description must be at most {} characters", MAX_DESCRIPTION_LENGTH),
        )),
        other => Ok(other),
    }
}
