use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::Database;
use crate::error::{ApiResult, AppError};
use crate::extract::{ApiJson, ApiPath};
use crate::models::distribusi::{ZakatDistribution, ZakatDistributionRequest};
use crate::query::{ListInput, ListSpec};
use crate::routes::{success, success_list, success_with_message};
use crate::transaction_number::{insert_with_number, TransactionKind};
use crate::validation::{ensure_exists, join_ids, missing_ids, positive_amount};

const COLUMNS: &str = "d.id, d.transaction_number, d.mustahik_id, mh.name AS mustahik_name, \
                       d.zakat_record_id, r.transaction_number AS zakat_record_number, \
                       d.period_id, p.name AS period_name, d.amount, d.date_distribution, \
                       d.created_at, d.updated_at";

const FROM: &str = "zakat_distributions d \
                    JOIN mustahik mh ON mh.id = d.mustahik_id \
                    JOIN zakat_records r ON r.id = d.zakat_record_id \
                    JOIN zakat_periods p ON p.id = d.period_id";

const SORT_COLUMNS: &[(&str, &str)] = &[
    ("transactionNumber", "d.transaction_number"),
    ("amount", "d.amount"),
    ("dateDistribution", "d.date_distribution"),
    ("createdAt", "d.created_at"),
    ("updatedAt", "d.updated_at"),
    ("mustahik.name", "mh.name"),
    ("zakatRecord.transactionNumber", "r.transaction_number"),
    ("period.name", "p.name"),
];

pub const LIST: ListSpec = ListSpec {
    columns: COLUMNS,
    from: FROM,
    search_columns: &["d.transaction_number", "mh.name"],
    sort_columns: SORT_COLUMNS,
    default_order: "d.date_distribution DESC",
    id_column: "d.id",
};

/// Listing of one mustahik's distributions, searched by the numbers and
/// the period rather than by the (fixed) recipient name.
pub const BY_MUSTAHIK: ListSpec = ListSpec {
    columns: COLUMNS,
    from: FROM,
    search_columns: &["d.transaction_number", "p.name", "r.transaction_number"],
    sort_columns: SORT_COLUMNS,
    default_order: "d.date_distribution DESC",
    id_column: "d.id",
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all_distribusi).post(create_distribusi))
        .route("/list", post(get_list_distribusi))
        .route("/delete", post(delete_distribusi))
        .route("/total-amount", get(total_amount))
        .route("/:id", get(get_distribusi_by_id).put(update_distribusi))
}

#[derive(Clone)]
struct ValidDistribution {
    mustahik_id: Uuid,
    zakat_record_id: Uuid,
    period_id: Uuid,
    amount: Decimal,
    date_distribution: DateTime<Utc>,
}

async fn validate(db: &Database, payload: ZakatDistributionRequest) -> ApiResult<ValidDistribution> {
    let mustahik_id = payload
        .mustahik_id
        .ok_or_else(|| AppError::validation("Mustahik wajib dipilih"))?;
    let zakat_record_id = payload
        .zakat_record_id
        .ok_or_else(|| AppError::validation("Penerimaan zakat wajib dipilih"))?;
    let amount = positive_amount(payload.amount, "Jumlah harus lebih dari 0")?;

    ensure_exists(db, "mustahik", mustahik_id, "Kesalahan: Mustahik tidak ditemukan").await?;

    // Periode distribusi mengikuti periode penerimaan sumbernya
    let period_id: Uuid = sqlx::query_scalar("SELECT period_id FROM zakat_records WHERE id = $1")
        .bind(zakat_record_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::validation("Kesalahan: Penerimaan Zakat tidak ditemukan"))?;

    Ok(ValidDistribution {
        mustahik_id,
        zakat_record_id,
        period_id,
        amount,
        date_distribution: payload.date_distribution,
    })
}

async fn load(db: &Database, id: Uuid) -> ApiResult<ZakatDistribution> {
    LIST.fetch_one::<ZakatDistribution>(db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Kesalahan: Distribusi Zakat tidak ditemukan"))
}

pub async fn get_list_distribusi(
    State(db): State<Database>,
    ApiJson(input): ApiJson<ListInput>,
) -> ApiResult<Json<Value>> {
    let (rows, meta) = LIST.fetch_page::<ZakatDistribution>(&db, &input, None).await?;
    Ok(success_list(rows, meta))
}

pub async fn get_all_distribusi(State(db): State<Database>) -> ApiResult<Json<Value>> {
    let rows = LIST.fetch_all::<ZakatDistribution>(&db).await?;
    Ok(success(rows))
}

pub async fn get_distribusi_by_id(
    State(db): State<Database>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    Ok(success(load(&db, id).await?))
}

pub async fn create_distribusi(
    State(db): State<Database>,
    ApiJson(payload): ApiJson<ZakatDistributionRequest>,
) -> ApiResult<Json<Value>> {
    let valid = validate(&db, payload).await?;
    let id = Uuid::new_v4();

    insert_with_number(&db, TransactionKind::Distribution, |number| {
        let db = db.clone();
        let valid = valid.clone();
        async move {
            sqlx::query(
                "INSERT INTO zakat_distributions \
                 (id, transaction_number, mustahik_id, zakat_record_id, period_id, amount, date_distribution) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(id)
            .bind(&number)
            .bind(valid.mustahik_id)
            .bind(valid.zakat_record_id)
            .bind(valid.period_id)
            .bind(valid.amount)
            .bind(valid.date_distribution)
            .execute(&db)
            .await?;
            Ok::<(), AppError>(())
        }
    })
    .await?;

    let distribution = load(&db, id).await?;
    tracing::info!(%id, number = %distribution.transaction_number, "Zakat distribution created");
    Ok(success_with_message(
        "Distribusi zakat berhasil dibuat!",
        distribution,
    ))
}

pub async fn update_distribusi(
    State(db): State<Database>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ZakatDistributionRequest>,
) -> ApiResult<Json<Value>> {
    let valid = validate(&db, payload).await?;

    let result = sqlx::query(
        "UPDATE zakat_distributions SET mustahik_id = $1, zakat_record_id = $2, period_id = $3, \
         amount = $4, date_distribution = $5, updated_at = NOW() WHERE id = $6",
    )
    .bind(valid.mustahik_id)
    .bind(valid.zakat_record_id)
    .bind(valid.period_id)
    .bind(valid.amount)
    .bind(valid.date_distribution)
    .bind(id)
    .execute(&db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Kesalahan: Distribusi Zakat tidak ditemukan"));
    }

    tracing::info!(%id, "Zakat distribution updated");
    Ok(success_with_message(
        "Distribusi zakat berhasil diupdate!",
        load(&db, id).await?,
    ))
}

pub async fn delete_distribusi(
    State(db): State<Database>,
    ApiJson(ids): ApiJson<Vec<Uuid>>,
) -> ApiResult<Json<Value>> {
    if ids.is_empty() {
        return Err(AppError::validation("Kesalahan: Tidak ada data yang dipilih"));
    }

    let mut tx = db.begin().await?;

    let missing = missing_ids(&mut *tx, "zakat_distributions", &ids).await?;
    if !missing.is_empty() {
        return Err(AppError::not_found(format!(
            "Kesalahan: Distribusi Zakat dengan id {} tidak ditemukan",
            join_ids(&missing)
        )));
    }

    sqlx::query("DELETE FROM zakat_distributions WHERE id = ANY($1)")
        .bind(&ids)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(count = ids.len(), "Zakat distributions deleted");
    Ok(success_with_message(
        "Distribusi zakat berhasil dihapus!",
        Value::Null,
    ))
}

pub async fn total_amount(State(db): State<Database>) -> ApiResult<Json<Value>> {
    let total: Decimal =
        sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM zakat_distributions")
            .fetch_one(&db)
            .await?;
    Ok(success(total))
}
