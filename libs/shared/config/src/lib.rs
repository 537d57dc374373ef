use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub allow_default_passwords: bool,
    pub server_port: u16,
    pub firestore_migrate: bool,
    pub firestore_project_id: String,
    pub firestore_access_token: String,
    pub firestore_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS", 24),
            allow_default_passwords: parse_flag("ALLOW_DEFAULT_PASSWORDS", true),
            server_port: parse_var("SERVER_PORT", 3000),
            firestore_migrate: parse_flag("FIRESTORE_MIGRATE", false),
            firestore_project_id: env::var("FIRESTORE_PROJECT_ID").unwrap_or_default(),
            firestore_access_token: env::var("FIRESTORE_ACCESS_TOKEN").unwrap_or_default(),
            firestore_base_url: env::var("FIRESTORE_BASE_URL")
                .unwrap_or_else(|_| "https://firestore.googleapis.com/v1".to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        if config.firestore_migrate && !config.is_migration_configured() {
            warn!("FIRESTORE_MIGRATE is enabled but FIRESTORE_PROJECT_ID or FIRESTORE_ACCESS_TOKEN is missing");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_service_key.is_empty()
            && !self.jwt_secret.is_empty()
    }

    pub fn is_migration_configured(&self) -> bool {
        !self.firestore_project_id.is_empty()
            && !self.firestore_access_token.is_empty()
            && !self.firestore_base_url.is_empty()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value '{}', using default", name, raw);
            default
        }),
        Err(_) => default,
    }
}

fn parse_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(raw) => raw.trim().eq_ignore_ascii_case("true") || raw.trim() == "1",
        Err(_) => default,
    }
}
