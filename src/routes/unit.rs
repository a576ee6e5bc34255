use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::Database;
use crate::error::{ApiResult, AppError};
use crate::extract::{ApiJson, ApiPath};
use crate::models::unit::{ZakatUnit, ZakatUnitRequest};
use crate::models::ZakatType;
use crate::query::{ListInput, ListSpec};
use crate::routes::{success, success_list, success_with_message};
use crate::validation::{join_ids, missing_ids, positive_amount, required_text};

const RETURNING: &str = "RETURNING id, name, type, conversion_rate, created_at, updated_at";

pub const LIST: ListSpec = ListSpec {
    columns: "id, name, type, conversion_rate, created_at, updated_at",
    from: "zakat_units",
    search_columns: &["name"],
    sort_columns: &[
        ("name", "name"),
        ("type", "type"),
        ("conversionRate", "conversion_rate"),
        ("createdAt", "created_at"),
        ("updatedAt", "updated_at"),
    ],
    default_order: "created_at DESC",
    id_column: "id",
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all_unit).post(create_unit))
        .route("/list", post(get_list_unit))
        .route("/delete", post(delete_unit))
        .route("/:id", get(get_unit_by_id).put(update_unit))
}

fn validate(payload: &ZakatUnitRequest) -> ApiResult<(String, ZakatType, Decimal)> {
    let name = required_text(&payload.name, "Nama unit wajib diisi")?;
    let rate = positive_amount(payload.conversion_rate, "Nilai konversi harus lebih dari 0")?;
    Ok((name, payload.zakat_type, rate))
}

pub async fn get_list_unit(
    State(db): State<Database>,
    ApiJson(input): ApiJson<ListInput>,
) -> ApiResult<Json<Value>> {
    let (rows, meta) = LIST.fetch_page::<ZakatUnit>(&db, &input, None).await?;
    Ok(success_list(rows, meta))
}

pub async fn get_all_unit(State(db): State<Database>) -> ApiResult<Json<Value>> {
    let rows = LIST.fetch_all::<ZakatUnit>(&db).await?;
    Ok(success(rows))
}

pub async fn get_unit_by_id(
    State(db): State<Database>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let unit = LIST
        .fetch_one::<ZakatUnit>(&db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Kesalahan: Unit tidak ditemukan"))?;
    Ok(success(unit))
}

pub async fn create_unit(
    State(db): State<Database>,
    ApiJson(payload): ApiJson<ZakatUnitRequest>,
) -> ApiResult<Json<Value>> {
    let (name, zakat_type, rate) = validate(&payload)?;

    let unit = sqlx::query_as::<_, ZakatUnit>(&format!(
        "INSERT INTO zakat_units (id, name, type, conversion_rate) VALUES ($1, $2, $3, $4) {RETURNING}"
    ))
    .bind(Uuid::new_v4())
    .bind(&name)
    .bind(zakat_type)
    .bind(rate)
    .fetch_one(&db)
    .await?;

    tracing::info!(id = %unit.id, "Zakat unit created");
    Ok(success_with_message("Unit berhasil dibuat!", unit))
}

pub async fn update_unit(
    State(db): State<Database>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ZakatUnitRequest>,
) -> ApiResult<Json<Value>> {
    let (name, zakat_type, rate) = validate(&payload)?;

    let unit = sqlx::query_as::<_, ZakatUnit>(&format!(
        "UPDATE zakat_units SET name = $1, type = $2, conversion_rate = $3, updated_at = NOW() \
         WHERE id = $4 {RETURNING}"
    ))
    .bind(&name)
    .bind(zakat_type)
    .bind(rate)
    .bind(id)
    .fetch_optional(&db)
    .await?
    .ok_or_else(|| AppError::not_found("Kesalahan: Unit tidak ditemukan"))?;

    tracing::info!(%id, "Zakat unit updated");
    Ok(success_with_message("Unit berhasil diupdate!", unit))
}

pub async fn delete_unit(
    State(db): State<Database>,
    ApiJson(ids): ApiJson<Vec<Uuid>>,
) -> ApiResult<Json<Value>> {
    if ids.is_empty() {
        return Err(AppError::validation("Kesalahan: Tidak ada data yang dipilih"));
    }

    let mut tx = db.begin().await?;

    let missing = missing_ids(&mut *tx, "zakat_units", &ids).await?;
    if !missing.is_empty() {
        return Err(AppError::not_found(format!(
            "Kesalahan: Unit dengan id {} tidak ditemukan",
            join_ids(&missing)
        )));
    }

    sqlx::query("DELETE FROM zakat_units WHERE id = ANY($1)")
        .bind(&ids)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(count = ids.len(), "Zakat units deleted");
    Ok(success_with_message("Unit berhasil dihapus!", Value::Null))
}
