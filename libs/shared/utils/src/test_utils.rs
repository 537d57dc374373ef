use std::sync::Arc;

use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Role};

use crate::jwt::{issue_token, TokenSubject};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub allow_default_passwords: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
            allow_default_passwords: true,
        }
    }
}

impl TestConfig {
    /// Config pointing PostgREST calls at a mock server.
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            jwt_expiration_hours: 24,
            allow_default_passwords: self.allow_default_passwords,
            server_port: 3000,
            firestore_migrate: false,
            firestore_project_id: String::new(),
            firestore_access_token: String::new(),
            firestore_base_url: String::new(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new(1, "test@example.com", Role::Patient)
    }
}

impl TestUser {
    pub fn new(id: i64, email: &str, role: Role) -> Self {
        Self {
            id,
            email: email.to_string(),
            role,
        }
    }

    pub fn admin(email: &str) -> Self {
        Self::new(1, email, Role::Admin)
    }

    pub fn dentist(email: &str) -> Self {
        Self::new(2, email, Role::Dentist)
    }

    pub fn patient(email: &str) -> Self {
        Self::new(3, email, Role::Patient)
    }

    pub fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
            first_name: Some("Test".to_string()),
            last_name: Some("User".to_string()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let subject = TokenSubject {
            id: user.id,
            email: &user.email,
            role: user.role,
            first_name: "Test",
            last_name: "User",
        };
        issue_token(&subject, secret, exp_hours.unwrap_or(24)).unwrap()
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }

    pub fn bearer(user: &TestUser, secret: &str) -> String {
        format!("Bearer {}", Self::create_test_token(user, secret, Some(24)))
    }
}

/// Row shapes as PostgREST returns them for the clinic tables.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn patient_row(id: i64, email: &str, card_identity: i64) -> Value {
        json!({
            "id": id,
            "first_name": "Ana",
            "last_name": "Lopez",
            "email": email,
            "role": "PATIENT",
            "card_identity": card_identity,
            "admission_date": "2026-01-15",
            "registration_number": null,
            "address": null
        })
    }

    pub fn dentist_row(id: i64, email: &str, registration_number: i64) -> Value {
        json!({
            "id": id,
            "first_name": "John",
            "last_name": "Smith",
            "email": email,
            "role": "DENTIST",
            "card_identity": null,
            "admission_date": null,
            "registration_number": registration_number
        })
    }

    pub fn user_row(id: i64, email: &str, role: Role, password_hash: &str) -> Value {
        json!({
            "id": id,
            "first_name": "Test",
            "last_name": "User",
            "email": email,
            "password": password_hash,
            "role": role.as_str(),
            "card_identity": null,
            "admission_date": null,
            "registration_number": null
        })
    }

    pub fn address_row(patient_id: i64) -> Value {
        json!({
            "id": 100 + patient_id,
            "patient_id": patient_id,
            "street": "Main Street",
            "number": "123",
            "location": "Springfield",
            "province": "Buenos Aires"
        })
    }

    pub fn appointment_row(id: i64, patient_id: i64, dentist_id: i64, date: &str, status: &str) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "dentist_id": dentist_id,
            "date": date,
            "time": "10:30:00",
            "description": "Routine checkup",
            "status": status
        })
    }

    pub fn postgrest_error(code: &str, message: &str) -> Value {
        json!({
            "code": code,
            "message": message,
            "details": null,
            "hint": null
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::validate_token;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_service_key, "test-service-key");
        assert!(app_config.is_configured());
    }

    #[test]
    fn test_jwt_token_creation() {
        let config = TestConfig::default();
        let user = TestUser::dentist("doc@example.com");
        let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

        assert_eq!(token.split('.').count(), 3);
        let validated = validate_token(&token, &config.jwt_secret).unwrap();
        assert_eq!(validated.role, Role::Dentist);
        assert_eq!(validated.email, "doc@example.com");
    }
}
