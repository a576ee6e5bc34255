use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::Value;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::Database;
use crate::error::{ApiResult, AppError};
use crate::extract::{ApiJson, ApiPath};
use crate::models::periode::{ZakatPeriod, ZakatPeriodRequest};
use crate::query::{ListInput, ListSpec};
use crate::routes::{success, success_list, success_with_message};
use crate::validation::{join_ids, missing_ids, required_text};

pub const LIST: ListSpec = ListSpec {
    columns: "id, name, created_at, updated_at",
    from: "zakat_periods",
    search_columns: &["name"],
    sort_columns: &[
        ("name", "name"),
        ("createdAt", "created_at"),
        ("updatedAt", "updated_at"),
    ],
    default_order: "created_at DESC",
    id_column: "id",
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all_periode).post(create_periode))
        .route("/list", post(get_list_periode))
        .route("/delete", post(delete_periode))
        .route("/:id", get(get_periode_by_id).put(update_periode))
}

pub async fn get_list_periode(
    State(db): State<Database>,
    ApiJson(input): ApiJson<ListInput>,
) -> ApiResult<Json<Value>> {
    let (rows, meta) = LIST.fetch_page::<ZakatPeriod>(&db, &input, None).await?;
    Ok(success_list(rows, meta))
}

pub async fn get_all_periode(State(db): State<Database>) -> ApiResult<Json<Value>> {
    let rows = LIST.fetch_all::<ZakatPeriod>(&db).await?;
    Ok(success(rows))
}

pub async fn get_periode_by_id(
    State(db): State<Database>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let periode = LIST
        .fetch_one::<ZakatPeriod>(&db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Kesalahan: Periode tidak ditemukan"))?;
    Ok(success(periode))
}

pub async fn create_periode(
    State(db): State<Database>,
    ApiJson(payload): ApiJson<ZakatPeriodRequest>,
) -> ApiResult<Json<Value>> {
    let name = required_text(&payload.name, "Nama periode wajib diisi")?;

    let periode = sqlx::query_as::<_, ZakatPeriod>(
        "INSERT INTO zakat_periods (id, name) VALUES ($1, $2) \
         RETURNING id, name, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(&name)
    .fetch_one(&db)
    .await?;

    tracing::info!(id = %periode.id, "Zakat period created");
    Ok(success_with_message("Periode berhasil dibuat!", periode))
}

pub async fn update_periode(
    State(db): State<Database>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ZakatPeriodRequest>,
) -> ApiResult<Json<Value>> {
    let name = required_text(&payload.name, "Nama periode wajib diisi")?;

    let periode = sqlx::query_as::<_, ZakatPeriod>(
        "UPDATE zakat_periods SET name = $1, updated_at = NOW() WHERE id = $2 \
         RETURNING id, name, created_at, updated_at",
    )
    .bind(&name)
    .bind(id)
    .fetch_optional(&db)
    .await?
    .ok_or_else(|| AppError::not_found("Kesalahan: Periode tidak ditemukan"))?;

    tracing::info!(%id, "Zakat period updated");
    Ok(success_with_message("Periode berhasil diupdate!", periode))
}

pub async fn delete_periode(
    State(db): State<Database>,
    ApiJson(ids): ApiJson<Vec<Uuid>>,
) -> ApiResult<Json<Value>> {
    if ids.is_empty() {
        return Err(AppError::validation("Kesalahan: Tidak ada data yang dipilih"));
    }

    let mut tx = db.begin().await?;

    // Periode tidak bisa dihapus selama masih dipakai penerimaan zakat
    let in_use: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM zakat_records WHERE period_id = ANY($1))",
    )
    .bind(&ids)
    .fetch_one(&mut *tx)
    .await?;

    if in_use {
        return Err(AppError::conflict(
            "Kesalahan: Data tidak bisa dihapus karena masih ada data penerimaan zakat yang terkait",
        ));
    }

    let missing = missing_ids(&mut *tx, "zakat_periods", &ids).await?;
    if !missing.is_empty() {
        return Err(AppError::not_found(format!(
            "Kesalahan: Periode dengan id {} tidak ditemukan",
            join_ids(&missing)
        )));
    }

    sqlx::query("DELETE FROM zakat_periods WHERE id = ANY($1)")
        .bind(&ids)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(count = ids.len(), "Zakat periods deleted");
    Ok(success_with_message("Periode berhasil dihapus!", Value::Null))
}
