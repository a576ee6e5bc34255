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
use crate::models::kategori::{Kategori, KategoriRequest};
use crate::query::{ListInput, ListSpec};
use crate::routes::{success, success_list, success_with_message};
use crate::validation::{join_ids, missing_ids, required_text};

/// Muzakki and mustahik categories differ only in their tables and in which
/// party table references them.
pub trait CategoryKind: Send + Sync + 'static {
    const TABLE: &'static str;
    const DEPENDENT_TABLE: &'static str;
    const DEPENDENT_COLUMN: &'static str;
    const LABEL: &'static str;
    const DEPENDENT_LABEL: &'static str;
    const LIST: ListSpec;
}

pub struct MuzakkiCategories;
pub struct MustahikCategories;

const SORT_COLUMNS: &[(&str, &str)] = &[
    ("name", "name"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

impl CategoryKind for MuzakkiCategories {
    const TABLE: &'static str = "muzakki_categories";
    const DEPENDENT_TABLE: &'static str = "muzakki";
    const DEPENDENT_COLUMN: &'static str = "muzakki_category_id";
    const LABEL: &'static str = "Kategori Muzakki";
    const DEPENDENT_LABEL: &'static str = "muzakki";
    const LIST: ListSpec = ListSpec {
        columns: "id, name, created_at, updated_at",
        from: "muzakki_categories",
        search_columns: &["name"],
        sort_columns: SORT_COLUMNS,
        default_order: "name ASC",
        id_column: "id",
    };
}

impl CategoryKind for MustahikCategories {
    const TABLE: &'static str = "mustahik_categories";
    const DEPENDENT_TABLE: &'static str = "mustahik";
    const DEPENDENT_COLUMN: &'static str = "mustahik_category_id";
    const LABEL: &'static str = "Kategori Mustahik";
    const DEPENDENT_LABEL: &'static str = "mustahik";
    const LIST: ListSpec = ListSpec {
        columns: "id, name, created_at, updated_at",
        from: "mustahik_categories",
        search_columns: &["name"],
        sort_columns: SORT_COLUMNS,
        default_order: "name ASC",
        id_column: "id",
    };
}

pub fn router<K: CategoryKind>() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all::<K>).post(create_kategori::<K>))
        .route("/list", post(get_list::<K>))
        .route("/delete", post(delete_many::<K>))
        .route("/:id", get(get_detail::<K>).put(update_kategori::<K>))
}

pub async fn get_list<K: CategoryKind>(
    State(db): State<Database>,
    ApiJson(input): ApiJson<ListInput>,
) -> ApiResult<Json<Value>> {
    let (rows, meta) = K::LIST.fetch_page::<Kategori>(&db, &input, None).await?;
    Ok(success_list(rows, meta))
}

pub async fn get_all<K: CategoryKind>(State(db): State<Database>) -> ApiResult<Json<Value>> {
    let rows = K::LIST.fetch_all::<Kategori>(&db).await?;
    Ok(success(rows))
}

pub async fn get_detail<K: CategoryKind>(
    State(db): State<Database>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let kategori = K::LIST
        .fetch_one::<Kategori>(&db, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Kesalahan: {} tidak ditemukan", K::LABEL)))?;
    Ok(success(kategori))
}

pub async fn create_kategori<K: CategoryKind>(
    State(db): State<Database>,
    ApiJson(payload): ApiJson<KategoriRequest>,
) -> ApiResult<Json<Value>> {
    let name = required_text(&payload.name, "Nama kategori wajib diisi.")?;

    let kategori = sqlx::query_as::<_, Kategori>(&format!(
        "INSERT INTO {} (id, name) VALUES ($1, $2) RETURNING id, name, created_at, updated_at",
        K::TABLE
    ))
    .bind(Uuid::new_v4())
    .bind(&name)
    .fetch_one(&db)
    .await?;

    tracing::info!(table = K::TABLE, id = %kategori.id, "Category created");
    Ok(success_with_message(
        &format!("{} berhasil dibuat!", K::LABEL),
        kategori,
    ))
}

pub async fn update_kategori<K: CategoryKind>(
    State(db): State<Database>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<KategoriRequest>,
) -> ApiResult<Json<Value>> {
    let name = required_text(&payload.name, "Nama kategori wajib diisi.")?;

    let kategori = sqlx::query_as::<_, Kategori>(&format!(
        "UPDATE {} SET name = $1, updated_at = NOW() WHERE id = $2 \
         RETURNING id, name, created_at, updated_at",
        K::TABLE
    ))
    .bind(&name)
    .bind(id)
    .fetch_optional(&db)
    .await?
    .ok_or_else(|| AppError::not_found(format!("Kesalahan: {} tidak ditemukan", K::LABEL)))?;

    tracing::info!(table = K::TABLE, %id, "Category updated");
    Ok(success_with_message(
        &format!("{} berhasil diupdate!", K::LABEL),
        kategori,
    ))
}

pub async fn delete_many<K: CategoryKind>(
    State(db): State<Database>,
    ApiJson(ids): ApiJson<Vec<Uuid>>,
) -> ApiResult<Json<Value>> {
    if ids.is_empty() {
        return Err(AppError::validation("Kesalahan: Tidak ada data yang dipilih"));
    }

    let mut tx = db.begin().await?;

    let in_use: bool = sqlx::query_scalar(&format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ANY($1))",
        K::DEPENDENT_TABLE,
        K::DEPENDENT_COLUMN
    ))
    .bind(&ids)
    .fetch_one(&mut *tx)
    .await?;

    if in_use {
        return Err(AppError::conflict(format!(
            "Kesalahan: Data tidak bisa dihapus karena masih ada data {} yang terkait",
            K::DEPENDENT_LABEL
        )));
    }

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

    tracing::info!(table = K::TABLE, count = ids.len(), "Categories deleted");
    Ok(success_with_message(
        &format!("{} berhasil dihapus!", K::LABEL),
        Value::Null,
    ))
}
