use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::models::RegisterRequest;
use auth_cell::services::RegistrationService;
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

async fn mount_free_email(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("select", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn patient_admission_defaults_to_today() {
    let mock_server = MockServer::start().await;
    let service = RegistrationService::new(&TestConfig::with_supabase_url(&mock_server.uri()).to_app_config());

    mount_free_email(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_partial_json(json!({ "admission_date": "2026-10-18" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::patient_row(4, "ana@clinic.com", 555)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = RegisterRequest {
        first_name: Some("Ana".to_string()),
        last_name: Some("Lopez".to_string()),
        email: Some("ana@clinic.com".to_string()),
        role: Some(Role::Patient),
        card_identity: Some(555),
        ..Default::default()
    };
    let response = service.register_on(request, today()).await.unwrap();

    assert_eq!(response.id, 4);
    assert_eq!(response.role, Role::Patient);
}

#[tokio::test]
async fn dentist_registration() {
    let mock_server = MockServer::start().await;
    let service = RegistrationService::new(&TestConfig::with_supabase_url(&mock_server.uri()).to_app_config());

    mount_free_email(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_partial_json(json!({ "role": "DENTIST", "registration_number": 4321 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::dentist_row(6, "john.smith@clinic.com", 4321)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = RegisterRequest {
        first_name: Some("John".to_string()),
        last_name: Some("Smith".to_string()),
        email: Some("john.smith@clinic.com".to_string()),
        password: Some("secret123".to_string()),
        role: Some(Role::Dentist),
        registration_number: Some(4321),
        ..Default::default()
    };
    let response = service.register_on(request, today()).await.unwrap();

    assert_eq!(response.role, Role::Dentist);
    assert_eq!(response.last_name, "Smith");
}

#[tokio::test]
async fn defaults_can_be_disabled() {
    let mock_server = MockServer::start().await;
    let mut config = TestConfig::with_supabase_url(&mock_server.uri());
    config.allow_default_passwords = false;
    let service = RegistrationService::new(&config.to_app_config());

    mount_free_email(&mock_server).await;

    let request = RegisterRequest {
        first_name: Some("John".to_string()),
        last_name: Some("Smith".to_string()),
        email: Some("john.smith@clinic.com".to_string()),
        role: Some(Role::Dentist),
        registration_number: Some(4321),
        ..Default::default()
    };
    let result = service.register_on(request, today()).await;

    assert_matches!(result, Err(AppError::BadRequest(msg)) if msg == "Password is required");
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let mock_server = MockServer::start().await;
    let service = RegistrationService::new(&TestConfig::with_supabase_url(&mock_server.uri()).to_app_config());

    let request = RegisterRequest {
        email: Some("not-an-email".to_string()),
        role: Some(Role::Admin),
        ..Default::default()
    };
    let result = service.register_on(request, today()).await;

    assert_matches!(result, Err(AppError::BadRequest(msg)) if msg.starts_with("Invalid email"));
}
