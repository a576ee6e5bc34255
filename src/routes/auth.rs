use std::sync::Arc;

use axum::{extract::State, response::Json, Extension};
use serde_json::{json, Value};

use crate::auth::{verify_password, AuthManager, SessionUser};
use crate::database::Database;
use crate::error::{ApiResult, AppError};
use crate::extract::ApiJson;
use crate::models::user::{SigninRequest, User};
use crate::routes::success;

pub async fn signin(
    State(db): State<Database>,
    State(auth): State<Arc<AuthManager>>,
    ApiJson(payload): ApiJson<SigninRequest>,
) -> ApiResult<Json<Value>> {
    // Validasi input
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::validation(
            "Nama pengguna dan kata sandi harus diisi",
        ));
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, username, password_hash, role, created_at, updated_at \
         FROM users WHERE username = $1",
    )
    .bind(payload.username.trim())
    .fetch_optional(&db)
    .await?
    .ok_or_else(|| {
        AppError::Unauthorized("Tidak ditemukan pengguna dengan nama pengguna tersebut".into())
    })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        tracing::warn!(username = %user.username, "Sign-in with wrong password");
        return Err(AppError::Unauthorized(
            "Kata sandi yang dimasukkan salah".into(),
        ));
    }

    let session = SessionUser {
        id: user.id,
        name: user.name,
        username: user.username,
        role: user.role,
    };
    let token = auth.issue_token(&session)?;

    tracing::info!(username = %session.username, role = ?session.role, "User signed in");
    Ok(Json(json!({
        "status": "success",
        "message": "Login berhasil!",
        "token": token,
        "tokenType": "Bearer",
        "expiresIn": auth.expires_in().as_secs(),
        "user": session
    })))
}

/// The identity decoded from the caller's bearer token.
pub async fn get_session(Extension(session): Extension<SessionUser>) -> Json<Value> {
    success(session)
}
