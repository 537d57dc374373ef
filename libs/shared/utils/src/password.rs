use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use regex::Regex;
use tracing::{debug, warn};

use shared_models::error::AppError;

const ARGON2_PHC_PATTERN: &str = r"^\$argon2(id|i|d)\$v=\d+\$m=\d+,t=\d+,p=\d+\$[A-Za-z0-9+/]+\$[A-Za-z0-9+/]+$";

/// Argon2 hashing plus the clinic's default-password policy.
pub struct PasswordService {
    phc_pattern: Option<Regex>,
    allow_default_passwords: bool,
}

impl PasswordService {
    pub fn new(allow_default_passwords: bool) -> Self {
        Self {
            phc_pattern: Regex::new(ARGON2_PHC_PATTERN).ok(),
            allow_default_passwords,
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Any malformed stored hash counts as a mismatch.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            debug!("Stored password is not a valid PHC string");
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    pub fn is_encoded(&self, value: &str) -> bool {
        match &self.phc_pattern {
            Some(pattern) => pattern.is_match(value),
            None => PasswordHash::new(value).is_ok(),
        }
    }

    /// Hashes `password` unless it already is an argon2 PHC string.
    pub fn ensure_encoded(&self, password: &str) -> Result<String, AppError> {
        if self.is_encoded(password) {
            Ok(password.to_string())
        } else {
            self.hash(password)
        }
    }

    /// Picks the password to store: the given one, or the generated default
    /// when none was supplied and defaults are allowed.
    pub fn resolve_password(
        &self,
        password: Option<&str>,
        first_name: &str,
        last_name: &str,
        number: i64,
    ) -> Result<String, AppError> {
        match password.map(str::trim).filter(|p| !p.is_empty()) {
            Some(given) => self.ensure_encoded(given),
            None if self.allow_default_passwords => {
                warn!("No password supplied for {} {}; assigning the default password", first_name.trim(), last_name.trim());
                self.hash(&default_password(first_name, last_name, number))
            }
            None => Err(AppError::BadRequest("Password is required".to_string())),
        }
    }
}

/// First name, last name and the last three digits of `number`, zero padded.
pub fn default_password(first_name: &str, last_name: &str, number: i64) -> String {
    format!(
        "{}{}{:03}",
        first_name.trim(),
        last_name.trim(),
        number.unsigned_abs() % 1000
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn default_password_uses_last_three_digits() {
        assert_eq!(default_password(" Ana ", "Smith", 1234567), "AnaSmith567");
        assert_eq!(default_password("Ana", "Smith", 7), "AnaSmith007");
        assert_eq!(default_password("Ana", "Smith", -42), "AnaSmith042");
    }

    #[test]
    fn hash_then_verify() {
        let service = PasswordService::new(true);
        let hash = service.hash("s3cret").unwrap();

        assert!(service.is_encoded(&hash));
        assert!(service.verify("s3cret", &hash));
        assert!(!service.verify("wrong", &hash));
        assert!(!service.verify("s3cret", "plain-text"));
    }

    #[test]
    fn encoded_passwords_are_kept() {
        let service = PasswordService::new(true);
        let hash = service.hash("s3cret").unwrap();

        assert_eq!(service.ensure_encoded(&hash).unwrap(), hash);
        assert_ne!(service.ensure_encoded("s3cret").unwrap(), "s3cret");
    }

    #[test]
    fn missing_password_follows_policy() {
        let lenient = PasswordService::new(true);
        let stored = lenient.resolve_password(None, "Ana", "Smith", 12).unwrap();
        assert!(lenient.verify("AnaSmith012", &stored));

        let strict = PasswordService::new(false);
        assert_matches!(
            strict.resolve_password(Some("  "), "Ana", "Smith", 12),
            Err(AppError::BadRequest(msg)) if msg == "Password is required"
        );
    }
}
