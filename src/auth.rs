use std::sync::Arc;
use std::time::Duration;

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher,
        PasswordVerifier, SaltString,
    },
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::UserRole;

/// Identity carried by a session token and attached to every authenticated
/// request as an extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    name: String,
    username: String,
    role: UserRole,
    iat: i64,
    exp: i64,
}

pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl AuthManager {
    pub fn new(secret: &[u8], token_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            token_ttl,
        }
    }

    pub fn issue_token(&self, user: &SessionUser) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.token_ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            role: user.role,
            iat: now,
            exp: now.saturating_add(ttl),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign token: {e}")))
    }

    pub fn validate_token(&self, token: &str) -> Result<SessionUser, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            tracing::debug!(error = %err, "Rejected session token");
            AppError::Unauthorized("Sesi tidak valid, silakan masuk kembali".into())
        })?;
        let claims = data.claims;
        Ok(SessionUser {
            id: claims.sub,
            name: claims.name,
            username: claims.username,
            role: claims.role,
        })
    }

    pub fn expires_in(&self) -> Duration {
        self.token_ttl
    }
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Returns `Ok(false)` on a mismatch; a malformed stored hash is an error.
pub fn verify_password(candidate: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid stored password hash: {e}")))?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(other) => Err(AppError::Internal(anyhow::anyhow!(
            "Password verification failed: {other}"
        ))),
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

pub async fn require_session(
    State(auth): State<Arc<AuthManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or_else(|| AppError::Unauthorized("Silakan masuk terlebih dahulu".into()))?;
    let session = auth.validate_token(token)?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(ttl: Duration) -> AuthManager {
        AuthManager::new(b"0123456789abcdef0123456789abcdef", ttl)
    }

    fn session() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            name: "SUPER ADMIN".into(),
            username: "admin".into(),
            role: UserRole::Admin,
        }
    }

    #[test]
    fn issued_token_carries_the_session() {
        let auth = manager(Duration::from_secs(60));
        let user = session();
        let token = auth.issue_token(&user).unwrap();
        assert_eq!(auth.validate_token(&token).unwrap(), user);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = manager(Duration::from_secs(60)).issue_token(&session()).unwrap();
        let other = AuthManager::new(b"ffffffffffffffffffffffffffffffff", Duration::from_secs(60));
        assert!(matches!(other.validate_token(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = manager(Duration::from_secs(60));
        let user = session();
        let issued = Utc::now().timestamp() - 3600;
        let claims = Claims {
            sub: user.id,
            name: user.name,
            username: user.username,
            role: user.role,
            iat: issued,
            exp: issued + 60,
        };
        let token = encode(&Header::default(), &claims, &auth.encoding_key).unwrap();
        assert!(matches!(auth.validate_token(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let auth = manager(Duration::from_secs(60));
        let mut token = auth.issue_token(&session()).unwrap();
        token.push('x');
        assert!(auth.validate_token(&token).is_err());
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("petugas").unwrap();
        assert!(verify_password("petugas", &hash).unwrap());
        assert!(!verify_password("salah", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_internal_error() {
        assert!(matches!(
            verify_password("admin", "not-a-phc-string"),
            Err(AppError::Internal(_))
        ));
    }
}
