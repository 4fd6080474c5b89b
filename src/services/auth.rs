//! Admin authentication helpers
//!
//! bcrypt for password storage, HS256 bearer tokens for the admin API.
//! Tokens carry the username and role and expire after 24 hours; every
//! protected request still re-loads the account row, so a deactivated
//! admin loses access immediately rather than at token expiry.

use axum::http::{header, HeaderMap};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::models::AdminRow;
use crate::models::auth::AdminRole;

/// Token lifetime in hours
pub const TOKEN_TTL_HOURS: i64 = 24;

/// JWT claims for admin tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: AdminRole,
    pub exp: i64,
}

/// Issue a signed token for an admin account
pub fn issue_token(admin: &AdminRow, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: admin.username.clone(),
        role: admin.role(),
        exp: (Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate a token; None for anything invalid or expired
pub fn decode_token(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// Extract the bearer token from an Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Verify a password against a stored hash. Malformed hashes verify false.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_admin() -> AdminRow {
        AdminRow {
            id: 1,
            username: "ops".to_string(),
            password_hash: String::new(),
            role: "superadmin".to_string(),
            is_active: true,
            created_by: None,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn token_round_trip() {
        let token = issue_token(&sample_admin(), "test-secret").unwrap();
        let claims = decode_token(&token, "test-secret").expect("token should decode");
        assert_eq!(claims.sub, "ops");
        assert_eq!(claims.role, AdminRole::Superadmin);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(&sample_admin(), "test-secret").unwrap();
        assert!(decode_token(&token, "other-secret").is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            sub: "ops".to_string(),
            role: AdminRole::Admin,
            exp: (Utc::now() - chrono::Duration::hours(2)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(decode_token(&token, "test-secret").is_none());
    }

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, "Basic dXNlcg==".parse().unwrap());
        assert!(bearer_token(&headers).is_none());
    }

    #[test]
    fn password_verify() {
        // Low cost to keep the test fast
        let hash = bcrypt::hash("hunter2", 4).unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
    }
}
