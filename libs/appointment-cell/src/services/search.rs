use chrono::NaiveDate;

use shared_models::pagination::PageRequest;

use crate::models::{AppointmentError, AppointmentSearchQuery, AppointmentStatus, APPOINTMENT_COLUMNS};

/// How one side of an appointment (patient or dentist) is filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartyFilter {
    Id(i64),
    Name(String),
    Any,
}

impl PartyFilter {
    /// Digits select by id, any other text is a name fragment, blank means no filter.
    pub fn classify(raw: Option<&str>) -> Self {
        let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return PartyFilter::Any;
        };

        if value.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = value.parse::<i64>() {
                return PartyFilter::Id(id);
            }
        }

        PartyFilter::Name(value.to_string())
    }

    pub fn label(&self) -> &'static str {
        match self {
            PartyFilter::Id(_) => "id",
            PartyFilter::Name(_) => "name",
            PartyFilter::Any => "any",
        }
    }
}

/// Which foreign key an embedded party is joined through.
#[derive(Debug, Clone, Copy)]
enum Party {
    Patient,
    Dentist,
}

impl Party {
    fn column(self) -> &'static str {
        match self {
            Party::Patient => "patient_id",
            Party::Dentist => "dentist_id",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            Party::Patient => "patient",
            Party::Dentist => "dentist",
        }
    }

    fn embed(self) -> String {
        format!("{}:users!appointments_{}_fkey!inner(full_name)", self.alias(), self.column())
    }
}

/// A validated search. Every patient × dentist combination compiles into one
/// PostgREST query; inactive filters add no predicate.
#[derive(Debug, Clone)]
pub struct AppointmentSearch {
    pub patient: PartyFilter,
    pub dentist: PartyFilter,
    pub status: Option<AppointmentStatus>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub page: PageRequest,
}

impl AppointmentSearch {
    pub fn from_query(query: AppointmentSearchQuery) -> Result<Self, AppointmentError> {
        let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<AppointmentStatus>()?),
            None => None,
        };

        Ok(Self {
            patient: PartyFilter::classify(query.patient.as_deref()),
            dentist: PartyFilter::classify(query.dentist.as_deref()),
            status,
            from_date: query.from_date,
            to_date: query.to_date,
            page: PageRequest::new(query.page, query.size),
        })
    }

    /// Short name of the filter combination, e.g. `id×name`.
    pub fn path_label(&self) -> String {
        format!("{}×{}", self.patient.label(), self.dentist.label())
    }

    pub fn to_path(&self) -> String {
        let mut select = APPOINTMENT_COLUMNS.to_string();
        let mut filters = Vec::new();

        for (party, filter) in [(Party::Patient, &self.patient), (Party::Dentist, &self.dentist)] {
            match filter {
                PartyFilter::Id(id) => filters.push(format!("{}=eq.{}", party.column(), id)),
                PartyFilter::Name(name) => {
                    select.push(',');
                    select.push_str(&party.embed());
                    filters.push(format!("{}.full_name=ilike.*{}*", party.alias(), name_pattern(name)));
                }
                PartyFilter::Any => {}
            }
        }

        if let Some(status) = self.status {
            filters.push(format!("status=eq.{}", status.as_str()));
        }
        if let Some(from) = self.from_date {
            filters.push(format!("date=gte.{}", from.format("%Y-%m-%d")));
        }
        if let Some(to) = self.to_date {
            filters.push(format!("date=lte.{}", to.format("%Y-%m-%d")));
        }

        let mut path = format!("/rest/v1/appointments?select={}", select);
        for filter in filters {
            path.push('&');
            path.push_str(&filter);
        }
        path.push_str(&format!(
            "&order=id.asc&limit={}&offset={}",
            self.page.size,
            self.page.offset()
        ));
        path
    }
}

/// User text is matched literally: `*` and `%` are dropped, while `_` and `\`
/// are escaped for `ilike` before encoding.
fn name_pattern(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '*' | '%' => {}
            '_' | '\\' => {
                cleaned.push('\\');
                cleaned.push(c);
            }
            other => cleaned.push(other),
        }
    }
    urlencoding::encode(&cleaned).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(patient: Option<&str>, dentist: Option<&str>) -> AppointmentSearch {
        AppointmentSearch::from_query(AppointmentSearchQuery {
            patient: patient.map(str::to_string),
            dentist: dentist.map(str::to_string),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn classify_party_filters() {
        assert_eq!(PartyFilter::classify(Some("5")), PartyFilter::Id(5));
        assert_eq!(PartyFilter::classify(Some(" 42 ")), PartyFilter::Id(42));
        assert_eq!(PartyFilter::classify(Some("smith")), PartyFilter::Name("smith".to_string()));
        assert_eq!(PartyFilter::classify(Some("-5")), PartyFilter::Name("-5".to_string()));
        assert_eq!(
            PartyFilter::classify(Some("99999999999999999999")),
            PartyFilter::Name("99999999999999999999".to_string())
        );
        assert_eq!(PartyFilter::classify(Some("   ")), PartyFilter::Any);
        assert_eq!(PartyFilter::classify(None), PartyFilter::Any);
    }

    #[test]
    fn id_by_name_query() {
        let search = search(Some("5"), Some("smith"));
        let path = search.to_path();

        assert_eq!(search.path_label(), "id×name");
        assert!(path.contains("&patient_id=eq.5"));
        assert!(path.contains("dentist:users!appointments_dentist_id_fkey!inner(full_name)"));
        assert!(path.contains("&dentist.full_name=ilike.*smith*"));
        assert!(!path.contains("patient:users"));
        assert!(path.ends_with("&order=id.asc&limit=10&offset=0"));
    }

    #[test]
    fn nine_distinct_combinations() {
        let sides = [Some("7"), Some("ana"), None];
        let mut labels = std::collections::HashSet::new();
        for patient in sides {
            for dentist in sides {
                labels.insert(search(patient, dentist).path_label());
            }
        }
        assert_eq!(labels.len(), 9);
    }

    #[test]
    fn unfiltered_query_has_no_predicates() {
        let path = search(None, Some("")).to_path();
        assert_eq!(
            path,
            format!("/rest/v1/appointments?select={}&order=id.asc&limit=10&offset=0", APPOINTMENT_COLUMNS)
        );
    }

    #[test]
    fn status_dates_and_paging() {
        let search = AppointmentSearch::from_query(AppointmentSearchQuery {
            status: Some("confirmed".to_string()),
            from_date: NaiveDate::from_ymd_opt(2026, 11, 1),
            to_date: NaiveDate::from_ymd_opt(2026, 11, 30),
            page: Some(2),
            size: Some(5),
            ..Default::default()
        })
        .unwrap();
        let path = search.to_path();

        assert!(path.contains("&status=eq.CONFIRMED"));
        assert!(path.contains("&date=gte.2026-11-01"));
        assert!(path.contains("&date=lte.2026-11-30"));
        assert!(path.ends_with("&limit=5&offset=10"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = AppointmentSearch::from_query(AppointmentSearchQuery {
            status: Some("late".to_string()),
            ..Default::default()
        });
        assert_eq!(result.unwrap_err(), AppointmentError::InvalidStatus);
    }

    #[test]
    fn names_are_encoded_and_wildcards_dropped() {
        let path = search(Some("María *López%"), None).to_path();
        assert!(path.contains("patient.full_name=ilike.*Mar%C3%ADa%20L%C3%B3pez*"));
    }

    #[test]
    fn single_character_wildcard_is_escaped() {
        let path = search(None, Some("a_b")).to_path();
        assert!(path.contains("dentist.full_name=ilike.*a%5C_b*"));
    }
}
