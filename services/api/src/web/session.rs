//! services/api/src/web/session.rs
//!
//! Signed session tokens: issuing them at login and verifying the
//! `Authorization: Bearer <token>` header on protected requests.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Why a request could not be authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    Missing,
    #[error("invalid Authorization header")]
    Malformed,
    #[error("invalid token")]
    Invalid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// The caller resolved by the auth middleware, valid for one request only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

/// HS256 keys derived from the process-wide secret.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue_token(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id,
            iat: now,
            exp: now.saturating_add(i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::Invalid)
    }

    /// Resolves the caller from a raw `Authorization` header value.
    pub fn authenticate(&self, header: Option<&str>) -> Result<Uuid, AuthError> {
        let token = bearer_token(header)?;
        Ok(self.verify_token(token)?.user_id)
    }
}

fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let raw = header.ok_or(AuthError::Missing)?;
    if raw.trim().is_empty() {
        return Err(AuthError::Missing);
    }
    let (scheme, token) = raw.split_once(' ').ok_or(AuthError::Malformed)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::Malformed);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn issued_token_round_trips_with_a_day_of_validity() {
        let keys = SessionKeys::new("test-secret", DAY);
        let user_id = Uuid::new_v4();
        let token = keys.issue_token(user_id).unwrap();

        let claims = keys.verify_token(&token).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);

        let header = format!("Bearer {}", token);
        assert_eq!(keys.authenticate(Some(&header)), Ok(user_id));
        let lower = format!("bearer {}", token);
        assert_eq!(keys.authenticate(Some(&lower)), Ok(user_id));
    }

    #[test]
    fn header_shapes_are_classified() {
        let keys = SessionKeys::new("test-secret", DAY);
        assert_eq!(keys.authenticate(None), Err(AuthError::Missing));
        assert_eq!(keys.authenticate(Some("")), Err(AuthError::Missing));
        assert_eq!(keys.authenticate(Some("Basic xyz")), Err(AuthError::Malformed));
        assert_eq!(keys.authenticate(Some("Bearer")), Err(AuthError::Malformed));
        assert_eq!(keys.authenticate(Some("Bearer ")), Err(AuthError::Malformed));
        assert_eq!(keys.authenticate(Some("Bearer not.a.jwt")), Err(AuthError::Invalid));
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let ours = SessionKeys::new("test-secret", DAY);
        let theirs = SessionKeys::new("other-secret", DAY);
        let token = theirs.issue_token(Uuid::new_v4()).unwrap();
        assert_eq!(ours.verify_token(&token).unwrap_err(), AuthError::Invalid);
    }

    #[test]
    fn expired_token_is_invalid() {
        let keys = SessionKeys::new("test-secret", DAY);
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: Uuid::new_v4(),
            iat: now - 2 * 86_400,
            exp: now - 86_400,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(keys.verify_token(&token).unwrap_err(), AuthError::Invalid);
    }

    #[test]
    fn huge_ttl_saturates_instead_of_expiring() {
        let keys = SessionKeys::new("test-secret", Duration::MAX);
        let token = keys.issue_token(Uuid::new_v4()).unwrap();
        let claims = keys.verify_token(&token).unwrap();
        assert_eq!(claims.exp, i64::MAX);
        assert!(claims.exp > claims.iat);
    }
}
