use axum::{
    extract::State,
    response::Json,
    routing::get,
    Extension, Router,
};
use serde_json::Value;

use crate::app::AppState;
use crate::auth::SessionUser;
use crate::database::Database;
use crate::error::{ApiResult, AppError};
use crate::extract::ApiJson;
use crate::models::user::{UpdateCurrentUserRequest, UserProfile};
use crate::routes::{success, success_with_message};
use crate::validation::required_text;

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(get_current_user).put(update_current_user))
}

pub async fn get_current_user(
    State(db): State<Database>,
    Extension(session): Extension<SessionUser>,
) -> ApiResult<Json<Value>> {
    let user = sqlx::query_as::<_, UserProfile>(
        "SELECT id, name, username, role FROM users WHERE id = $1",
    )
    .bind(session.id)
    .fetch_optional(&db)
    .await?
    .ok_or_else(|| AppError::not_found("Kesalahan: Pengguna tidak ditemukan"))?;

    Ok(success(user))
}

pub async fn update_current_user(
    State(db): State<Database>,
    Extension(session): Extension<SessionUser>,
    ApiJson(payload): ApiJson<UpdateCurrentUserRequest>,
) -> ApiResult<Json<Value>> {
    let name = required_text(&payload.name, "Nama wajib diisi")?;

    let user = sqlx::query_as::<_, UserProfile>(
        "UPDATE users SET name = $1, updated_at = NOW() WHERE id = $2 \
         RETURNING id, name, username, role",
    )
    .bind(&name)
    .bind(session.id)
    .fetch_optional(&db)
    .await?
    .ok_or_else(|| AppError::not_found("Kesalahan: Pengguna tidak ditemukan"))?;

    tracing::info!(id = %user.id, "User profile updated");
    Ok(success_with_message("Profil berhasil diupdate!", user))
}
