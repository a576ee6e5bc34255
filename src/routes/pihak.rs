//! Handlers shared by muzakki (donors) and mustahik (recipients). Both are a
//! named party with a category, optional email/phone, and an address.

use axum::{
    extract::State,
    response::Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{ApiResult, AppError};
use crate::extract::{ApiJson, ApiPath};
use crate::models::pihak::{Pihak, PihakRequest};
use crate::query::{ListInput, ListSpec};
use crate::routes::{success, success_list, success_with_message};
use crate::validation::{
    ensure_exists, join_ids, missing_ids, optional_email, optional_text, required_text,
};

pub trait PartyKind: Send + Sync + 'static {
    const TABLE: &'static str;
    const CATEGORY_TABLE: &'static str;
    const CATEGORY_COLUMN: &'static str;
    const LABEL: &'static str;
    const LIST: ListSpec;
}

struct ValidPihak {
    name: String,
    category_id: Uuid,
    email: Option<String>,
    phone: Option<String>,
    address: String,
}

async fn validate<K: PartyKind>(db: &Database, payload: PihakRequest) -> ApiResult<ValidPihak> {
    let name = required_text(&payload.name, &format!("Nama {} wajib diisi", K::LABEL))?;
    let address = required_text(&payload.address, "Alamat wajib diisi")?;
    let email = optional_email(payload.email.as_deref())?;
    let phone = optional_text(payload.phone.as_deref());
    let category_id = payload
        .category_id
        .ok_or_else(|| AppError::validation("Kategori wajib dipilih"))?;
    ensure_exists(db, K::CATEGORY_TABLE, category_id, "Kesalahan: Kategori tidak ditemukan")
        .await?;

    Ok(ValidPihak {
        name,
        category_id,
        email,
        phone,
        address,
    })
}

fn not_found<K: PartyKind>() -> AppError {
    AppError::not_found(format!("Kesalahan: {} tidak ditemukan", K::LABEL))
}

async fn load<K: PartyKind>(db: &Database, id: Uuid) -> ApiResult<Pihak> {
    K::LIST
        .fetch_one::<Pihak>(db, id)
        .await?
        .ok_or_else(not_found::<K>)
}

pub async fn get_list<K: PartyKind>(
    State(db): State<Database>,
    ApiJson(input): ApiJson<ListInput>,
) -> ApiResult<Json<Value>> {
    let (rows, meta) = K::LIST.fetch_page::<Pihak>(&db, &input, None).await?;
    Ok(success_list(rows, meta))
}

pub async fn get_all<K: PartyKind>(State(db): State<Database>) -> ApiResult<Json<Value>> {
    let rows = K::LIST.fetch_all::<Pihak>(&db).await?;
    Ok(success(rows))
}

pub async fn get_detail<K: PartyKind>(
    State(db): State<Database>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    Ok(success(load::<K>(&db, id).await?))
}

pub async fn create<K: PartyKind>(
    State(db): State<Database>,
    ApiJson(payload): ApiJson<PihakRequest>,
) -> ApiResult<Json<Value>> {
    let valid = validate::<K>(&db, payload).await?;
    let id = Uuid::new_v4();

    sqlx::query(&format!(
        "INSERT INTO {} (id, name, {}, email, phone, address) VALUES ($1, $2, $3, $4, $5, $6)",
        K::TABLE,
        K::CATEGORY_COLUMN
    ))
    .bind(id)
    .bind(&valid.name)
    .bind(valid.category_id)
    .bind(&valid.email)
    .bind(&valid.phone)
    .bind(&valid.address)
    .execute(&db)
    .await?;

    tracing::info!(table = K::TABLE, %id, "Party created");
    Ok(success_with_message(
        &format!("{} berhasil dibuat!", K::LABEL),
        load::<K>(&db, id).await?,
    ))
}

pub async fn update<K: PartyKind>(
    State(db): State<Database>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<PihakRequest>,
) -> ApiResult<Json<Value>> {
    let valid = validate::<K>(&db, payload).await?;

    let result = sqlx::query(&format!(
        "UPDATE {} SET name = $1, {} = $2, email = $3, phone = $4, address = $5, \
         updated_at = NOW() WHERE id = $6",
        K::TABLE,
        K::CATEGORY_COLUMN
    ))
    .bind(&valid.name)
    .bind(valid.category_id)
    .bind(&valid.email)
    .bind(&valid.phone)
    .bind(&valid.address)
    .bind(id)
    .execute(&db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found::<K>());
    }

    tracing::info!(table = K::TABLE, %id, "Party updated");
    Ok(success_with_message(
        &format!("{} berhasil diupdate!", K::LABEL),
        load::<K>(&db, id).await?,
    ))
}

pub async fn delete_many<K: PartyKind>(
    State(db): State<Database>,
    ApiJson(ids): ApiJson<Vec<Uuid>>,
) -> ApiResult<Json<Value>> {
    if ids.is_empty() {
        return Err(AppError::validation("Kesalahan: Tidak ada data yang dipilih"));
    }

    let mut tx = db.begin().await?;

    let missing = missing_ids(&mut *tx, K::TABLE, &ids).await?;
    if !missing.is_empty() {
        return Err(AppError::not_found(format!(
            "Kesalahan: {} dengan id {} tidak ditemukan",
            K::LABEL,
            join_ids(&missing)
        )));
    }

    sqlx::query(&format!("DELETE FROM {} WHERE id = ANY($1)", K::TABLE))
        .bind(&ids)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(table = K::TABLE, count = ids.len(), "Parties deleted");
    Ok(success_with_message(
        &format!("{} berhasil dihapus!", K::LABEL),
        Value::Null,
    ))
}

pub async fn total<K: PartyKind>(State(db): State<Database>) -> ApiResult<Json<Value>> {
    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", K::TABLE))
        .fetch_one(&db)
        .await?;
    Ok(success(total))
}
