use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;
use crate::database::models::{Role, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i32, email: String, role: Role) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            role,
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn for_user(user: &User) -> Self {
        Self::new(user.id, user.email.clone(), user.role)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("{0}")]
    InvalidToken(String),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Password hashing task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

fn secret() -> Result<&'static str, AuthError> {
    let secret = config::config().security.jwt_secret.as_str();
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }
    Ok(secret)
}

pub fn generate_jwt(claims: &Claims) -> Result<String, AuthError> {
    let encoding_key = EncodingKey::from_secret(secret()?.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str) -> Result<Claims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret()?.as_bytes());

    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AuthError::InvalidToken(format!("Invalid JWT token: {}", e)))?;

    Ok(token_data.claims)
}

// bcrypt work runs on the blocking pool, never on a runtime worker.

pub async fn hash_password(plain: &str) -> Result<String, AuthError> {
    hash_password_with_cost(plain, config::config().security.bcrypt_cost).await
}

pub async fn hash_password_with_cost(plain: &str, cost: u32) -> Result<String, AuthError> {
    let plain = plain.to_string();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost)).await??;
    Ok(hashed)
}

/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(plain: &str, hashed: &str) -> Result<bool, AuthError> {
    let (plain, hashed) = (plain.to_string(), hashed.to_string());
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hashed).unwrap_or(false)).await?;
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_claims() {
        let claims = Claims::new(42, "teacher@foo.com".to_string(), Role::Teacher);
        let token = generate_jwt(&claims).unwrap();
        let decoded = validate_jwt(&token).unwrap();
        assert_eq!(decoded.sub, 42);
        assert_eq!(decoded.email, "teacher@foo.com");
        assert_eq!(decoded.role, Role::Teacher);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let claims = Claims::new(1, "admin@foo.com".to_string(), Role::Admin);
        let mut token = generate_jwt(&claims).unwrap();
        token.push('x');
        assert!(matches!(validate_jwt(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = Claims::new(1, "admin@foo.com".to_string(), Role::Admin);
        claims.iat -= 7200;
        claims.exp = Utc::now().timestamp() - 3600;
        let token = generate_jwt(&claims).unwrap();
        assert!(validate_jwt(&token).is_err());
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hashed = hash_password_with_cost("changeme", 4).await.unwrap();
        assert!(verify_password("changeme", &hashed).await.unwrap());
        assert!(!verify_password("changeMe", &hashed).await.unwrap());
        assert!(!verify_password("changeme", "not-a-bcrypt-hash").await.unwrap());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn hashing_leaves_the_runtime_thread_free() {
        let hashing = hash_password_with_cost("changeme", 12);
        let tick = tokio::time::sleep(std::time::Duration::from_millis(5));

        let tick_first = tokio::select! {
            biased;
            _ = hashing => false,
            _ = tick => true,
        };
        assert!(tick_first, "a cost-12 hash finished before a 5ms timer on a single-threaded runtime");
    }
}
