//! Bearer-token authentication and password hashing.
//!
//! Tokens are HS256 JWTs signed with the configured shared secret and carry
//! the account id as `sub`. Passwords are stored as Argon2id PHC strings.
//!
//! Every request through [`require_auth`] ends in exactly one of three
//! outcomes: no credential (401), an invalid credential (401), or a valid
//! credential whose identity is attached to the request before it continues.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::State;
use axum::http::{header, HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ServerError;

/// Identity of the authenticated caller, inserted into request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    /// `None` when the requested lifetime does not fit a `Duration`.
    ttl: Option<Duration>,
}

impl TokenService {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::try_days(ttl_days),
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, ServerError> {
        let now = Utc::now();
        let expires = self
            .ttl
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| ServerError::Internal("Token lifetime out of range".to_string()))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, ServerError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| ServerError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Check signature and expiry, returning the caller identity.
    pub fn verify(&self, token: &str) -> Result<AuthUser, ServerError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                debug!(error = %e, "Token verification failed");
                ServerError::Unauthorized("invalid token".to_string())
            })?;

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| ServerError::Unauthorized("invalid token".to_string()))?;
        Ok(AuthUser { user_id })
    }
}

/// What the `Authorization` header holds.
#[derive(Debug, PartialEq, Eq)]
enum BearerCredential<'a> {
    Missing,
    Malformed,
    Token(&'a str),
}

fn bearer_credential(headers: &HeaderMap) -> BearerCredential<'_> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return BearerCredential::Missing;
    };
    let Ok(value) = value.to_str() else {
        return BearerCredential::Malformed;
    };
    let value = value.trim();
    if value.is_empty() {
        return BearerCredential::Missing;
    }
    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return BearerCredential::Malformed;
    }
    match token.trim() {
        "" => BearerCredential::Missing,
        token => BearerCredential::Token(token),
    }
}

pub fn authenticate(tokens: &TokenService, headers: &HeaderMap) -> Result<AuthUser, ServerError> {
    match bearer_credential(headers) {
        BearerCredential::Missing => {
            Err(ServerError::Unauthorized("no token provided".to_string()))
        }
        BearerCredential::Malformed => Err(ServerError::Unauthorized(
            "expected 'Bearer <token>'".to_string(),
        )),
        BearerCredential::Token(token) => tokens.verify(token),
    }
}

/// Route layer for endpoints that need a caller identity.
pub async fn require_auth(
    State(tokens): State<TokenService>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let user = authenticate(&tokens, req.headers())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

// ---------------------------------------------------------------------------
// Passwords
// ---------------------------------------------------------------------------

/// Hash a password with Argon2id. CPU-heavy: call from a blocking task.
pub fn hash_password(password: &str) -> Result<String, ServerError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServerError::Internal(format!("Failed to hash password: {e}")))
}

/// Returns `false` on mismatch. Errors only on an unreadable stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServerError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| ServerError::Internal("Invalid stored password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn test_bearer_credential_states() {
        assert_eq!(bearer_credential(&HeaderMap::new()), BearerCredential::Missing);
        assert_eq!(bearer_credential(&headers("Bearer ")), BearerCredential::Missing);
        assert_eq!(bearer_credential(&headers("Basic abc")), BearerCredential::Malformed);
        assert_eq!(bearer_credential(&headers("Bearerabc")), BearerCredential::Malformed);
        assert_eq!(
            bearer_credential(&headers("Bearer abc.def")),
            BearerCredential::Token("abc.def")
        );
        assert_eq!(
            bearer_credential(&headers("bearer abc")),
            BearerCredential::Token("abc")
        );
    }

    #[test]
    fn test_token_round_trip() {
        let tokens = TokenService::new("secret", 30);
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id).unwrap();

        let user = authenticate(&tokens, &headers(&format!("Bearer {token}"))).unwrap();
        assert_eq!(user.user_id, user_id);
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = TokenService::new("secret-a", 30).issue(Uuid::new_v4()).unwrap();
        let err = TokenService::new("secret-b", 30).verify(&token).unwrap_err();
        assert!(matches!(err, ServerError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new("secret", 30);
        let now = Utc::now().timestamp();
        let token = tokens
            .sign(&Claims {
                sub: Uuid::new_v4().to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let tokens = TokenService::new("secret", 30);
        let now = Utc::now().timestamp();
        let token = tokens
            .sign(&Claims {
                sub: "admin".into(),
                iat: now,
                exp: now + 3600,
            })
            .unwrap();
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn test_out_of_range_ttl_is_an_error() {
        for days in [100_000_000, i64::MAX] {
            let err = TokenService::new("secret", days)
                .issue(Uuid::new_v4())
                .unwrap_err();
            assert!(matches!(err, ServerError::Internal(_)), "{days}");
        }
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let tokens = TokenService::new("secret", 30);
        let err = authenticate(&tokens, &HeaderMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "Not authorized - no token provided");
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
        assert!(verify_password("hunter22", "not-a-hash").is_err());
    }
}
