use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

const FUTURE_DATE: &str = "2099-05-10";

fn create_test_app(server: &MockServer) -> (Router, TestConfig) {
    let config = TestConfig::with_supabase_url(&server.uri());
    (appointment_routes(config.to_arc()), config)
}

fn json_request(method: &str, uri: &str, auth: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", auth)
        .header("Content-Type", "application/json");
    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn mount_parties(server: &MockServer, patient_id: i64, dentist_id: i64) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", patient_id)))
        .and(query_param("role", "eq.PATIENT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::patient_row(patient_id, "ana@clinic.com", 30111222)
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", dentist_id)))
        .and(query_param("role", "eq.DENTIST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::dentist_row(dentist_id, "john.smith@clinic.com", 1234)
        ])))
        .mount(server)
        .await;
}

async fn forbid_inserts(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_book_appointment() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::patient("ana@clinic.com"), &config.jwt_secret);

    mount_parties(&mock_server, 5, 7).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({
            "patient_id": 5,
            "dentist_id": 7,
            "date": FUTURE_DATE,
            "time": "10:30:00",
            "status": "SCHEDULED"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::appointment_row(11, 5, 7, FUTURE_DATE, "SCHEDULED")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = json_request(
        "POST",
        "/",
        &auth,
        Some(json!({
            "patient_id": 5,
            "dentist_id": 7,
            "date": FUTURE_DATE,
            "time": "10:30",
            "description": "Routine checkup",
            "status": "unheard-of"
        })),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], 11);
    assert_eq!(body["date"], FUTURE_DATE);
    assert_eq!(body["time"], "10:30");
    assert_eq!(body["status"], "SCHEDULED");
}

#[tokio::test]
async fn test_past_date_is_rejected_without_write() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::admin("admin@clinic.com"), &config.jwt_secret);

    mount_parties(&mock_server, 5, 7).await;
    forbid_inserts(&mock_server).await;

    let request = json_request(
        "POST",
        "/",
        &auth,
        Some(json!({ "patient_id": 5, "dentist_id": 7, "date": "2000-01-01", "time": "10:30" })),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Appointment date cannot be earlier than today");
    assert_eq!(body["error"], "Invalid argument");
}

#[tokio::test]
async fn test_missing_patient_is_not_found_without_write() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::admin("admin@clinic.com"), &config.jwt_secret);

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "eq.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    forbid_inserts(&mock_server).await;

    let request = json_request(
        "POST",
        "/",
        &auth,
        Some(json!({ "patient_id": 9, "dentist_id": 7, "date": FUTURE_DATE, "time": "10:30" })),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Patient not found with id: 9");
}

#[tokio::test]
async fn test_invalid_time_is_rejected() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::admin("admin@clinic.com"), &config.jwt_secret);

    mount_parties(&mock_server, 5, 7).await;
    forbid_inserts(&mock_server).await;

    let request = json_request(
        "POST",
        "/",
        &auth,
        Some(json!({ "patient_id": 5, "dentist_id": 7, "date": FUTURE_DATE, "time": "25:99" })),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid time: 25:99");
}

#[tokio::test]
async fn test_search_by_patient_id_and_dentist_name() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::dentist("john.smith@clinic.com"), &config.jwt_secret);

    let mut row = MockSupabaseResponses::appointment_row(11, 5, 7, FUTURE_DATE, "CONFIRMED");
    row["dentist"] = json!({ "full_name": "John Smith" });

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("patient_id", "eq.5"))
        .and(query_param("dentist.full_name", "ilike.*smith*"))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Range", "0-0/1")
                .set_body_json(json!([row])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = json_request("GET", "/search?patient=5&dentist=smith", &auth, None);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["totalElements"], 1);
    assert_eq!(body["totalPages"], 1);
    assert_eq!(body["first"], true);
    assert_eq!(body["last"], true);
    assert_eq!(body["content"][0]["patient_id"], 5);
    assert_eq!(body["content"][0]["status"], "CONFIRMED");
    assert!(body["content"][0].get("dentist").is_none());
}

#[tokio::test]
async fn test_search_with_unknown_status() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::admin("admin@clinic.com"), &config.jwt_secret);

    let request = json_request("GET", "/search?status=LATE", &auth, None);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "invalid status");
}

#[tokio::test]
async fn test_status_patch_messages() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::dentist("john.smith@clinic.com"), &config.jwt_secret);

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.11"))
        .and(body_partial_json(json!({ "status": "COMPLETED" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_row(11, 5, 7, FUTURE_DATE, "COMPLETED")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let missing = json_request("PATCH", "/11/status", &auth, Some(json!({})));
    let response = app.clone().oneshot(missing).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "status is required");

    let unknown = json_request("PATCH", "/11/status", &auth, Some(json!({ "status": "LATE" })));
    let response = app.clone().oneshot(unknown).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "invalid status");

    let valid = json_request("PATCH", "/11/status", &auth, Some(json!({ "status": "completed" })));
    let response = app.oneshot(valid).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "COMPLETED");
}

#[tokio::test]
async fn test_patient_cannot_read_by_id() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::patient("ana@clinic.com"), &config.jwt_secret);

    let request = json_request("GET", "/11", &auth, None);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_get_missing_appointment() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::admin("admin@clinic.com"), &config.jwt_secret);

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let request = json_request("GET", "/404", &auth, None);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Appointment not found with id: 404");
}

#[tokio::test]
async fn test_delete_returns_removed_appointment() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let admin = JwtTestUtils::bearer(&TestUser::admin("admin@clinic.com"), &config.jwt_secret);
    let dentist = JwtTestUtils::bearer(&TestUser::dentist("john.smith@clinic.com"), &config.jwt_secret);

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_row(11, 5, 7, FUTURE_DATE, "CANCELLED")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let denied = json_request("DELETE", "/11", &dentist, None);
    let response = app.clone().oneshot(denied).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = json_request("DELETE", "/11", &admin, None);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], 11);
    assert_eq!(body["status"], "CANCELLED");
}

#[tokio::test]
async fn test_update_by_body_requires_id() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::admin("admin@clinic.com"), &config.jwt_secret);

    let request = json_request("PUT", "/", &auth, Some(json!({ "patient_id": 5, "dentist_id": 7 })));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Appointment id is required");
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let mock_server = MockServer::start().await;
    let (app, _) = create_test_app(&mock_server);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_patch_on_unknown_appointment() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::admin("admin@clinic.com"), &config.jwt_secret);

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = json_request("PATCH", "/404/status", &auth, Some(json!({ "status": "CONFIRMED" })));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Appointment not found with id: 404");
}

#[tokio::test]
async fn test_update_to_past_date_is_rejected_without_write() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::admin("admin@clinic.com"), &config.jwt_secret);

    mount_parties(&mock_server, 5, 7).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_row(11, 5, 7, FUTURE_DATE, "SCHEDULED")
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let request = json_request("PUT", "/11", &auth, Some(json!({ "date": "2000-01-01" })));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Appointment date cannot be earlier than today"
    );
}

#[tokio::test]
async fn test_delete_unknown_appointment() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::admin("admin@clinic.com"), &config.jwt_secret);

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = json_request("DELETE", "/404", &auth, None);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Appointment not found with id: 404");
}

async fn assert_bad_request_envelope(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["error"], "Invalid argument");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    assert!(body.get("timestamp").is_some());
    assert!(body.get("path").is_some());
}

#[tokio::test]
async fn test_non_numeric_id_answers_with_error_body() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::admin("admin@clinic.com"), &config.jwt_secret);

    let response = app.oneshot(json_request("GET", "/abc", &auth, None)).await.unwrap();

    assert_bad_request_envelope(response).await;
}

#[tokio::test]
async fn test_malformed_search_query_answers_with_error_body() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::admin("admin@clinic.com"), &config.jwt_secret);

    let request = json_request("GET", "/search?fromDate=2026-13-01", &auth, None);
    let response = app.oneshot(request).await.unwrap();

    assert_bad_request_envelope(response).await;
}

#[tokio::test]
async fn test_malformed_body_answers_with_error_body() {
    let mock_server = MockServer::start().await;
    let (app, config) = create_test_app(&mock_server);
    let auth = JwtTestUtils::bearer(&TestUser::admin("admin@clinic.com"), &config.jwt_secret);
    forbid_inserts(&mock_server).await;

    let broken = Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", &auth)
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(broken).await.unwrap();
    assert_bad_request_envelope(response).await;

    // A type mismatch would be a 422 from plain `Json`.
    let mistyped = json_request("POST", "/", &auth, Some(json!({ "patient_id": "five" })));
    let response = app.oneshot(mistyped).await.unwrap();
    assert_bad_request_envelope(response).await;
}
