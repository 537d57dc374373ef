use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::{AuthUser, JwtClaims, JwtHeader, Role};
use shared_models::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

/// Identity data that goes into a freshly issued token.
#[derive(Debug, Clone)]
pub struct TokenSubject<'a> {
    pub id: i64,
    pub email: &'a str,
    pub role: Role,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

pub fn build_claims(subject: &TokenSubject<'_>, expiration_hours: i64) -> JwtClaims {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours);

    JwtClaims {
        sub: subject.id.to_string(),
        exp: Some(exp.timestamp().max(0) as u64),
        iat: Some(now.timestamp().max(0) as u64),
        email: Some(subject.email.to_string()),
        role: Some(subject.role.as_str().to_string()),
        first_name: Some(subject.first_name.to_string()),
        last_name: Some(subject.last_name.to_string()),
        jti: Some(Uuid::new_v4().to_string()),
    }
}

fn sign(signing_input: &str, jwt_secret: &str) -> Result<Vec<u8>, String> {
    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

pub fn encode_claims(claims: &JwtClaims, jwt_secret: &str) -> Result<String, AppError> {
    if jwt_secret.is_empty() {
        return Err(AppError::Internal("JWT secret is not set".to_string()));
    }

    let header = JwtHeader {
        alg: ALGORITHM.to_string(),
        typ: "JWT".to_string(),
    };
    let header_json = serde_json::to_vec(&header).map_err(|e| AppError::Internal(e.to_string()))?;
    let claims_json = serde_json::to_vec(claims).map_err(|e| AppError::Internal(e.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );
    let signature = sign(&signing_input, jwt_secret).map_err(AppError::Internal)?;

    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

/// Issues a signed HS256 token for the given identity.
pub fn issue_token(subject: &TokenSubject<'_>, jwt_secret: &str, expiration_hours: i64) -> Result<String, AppError> {
    let claims = build_claims(subject, expiration_hours);
    debug!("Issuing token for user {} ({})", subject.id, subject.role);
    encode_claims(&claims, jwt_secret)
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<AuthUser, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let (header_b64, claims_b64, signature_b64) = (parts[0], parts[1], parts[2]);

    let header: JwtHeader = URL_SAFE_NO_PAD
        .decode(header_b64)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .ok_or_else(|| "Invalid token header".to_string())?;
    if header.alg != ALGORITHM {
        debug!("Rejected token signed with {}", header.alg);
        return Err("Unsupported token algorithm".to_string());
    }

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
        debug!("Failed to decode signature: {}", e);
        "Invalid signature encoding".to_string()
    })?;

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());
    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_bytes = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .map_err(|_| "Invalid claims encoding".to_string())?;
    let claims: JwtClaims = serde_json::from_slice(&claims_bytes).map_err(|e| {
        debug!("Failed to parse claims: {}", e);
        "Invalid claims format".to_string()
    })?;

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp().max(0) as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| "Invalid token subject".to_string())?;
    let email = claims.email.ok_or_else(|| "Token has no email".to_string())?;
    let role = claims
        .role
        .as_deref()
        .ok_or_else(|| "Token has no role".to_string())?
        .parse::<Role>()
        .map_err(|_| "Invalid token role".to_string())?;

    let user = AuthUser {
        id,
        email,
        role,
        first_name: claims.first_name,
        last_name: claims.last_name,
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}
