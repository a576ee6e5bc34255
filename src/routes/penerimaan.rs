use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::SessionUser;
use crate::database::Database;
use crate::error::{ApiResult, AppError};
use crate::extract::{ApiJson, ApiPath};
use crate::models::penerimaan::{ZakatRecord, ZakatRecordRequest};
use crate::models::ZakatType;
use crate::query::{ListInput, ListSpec};
use crate::routes::{success, success_list, success_with_message};
use crate::transaction_number::{insert_with_number, TransactionKind};
use crate::validation::{ensure_exists, join_ids, missing_ids, positive_amount};

pub const LIST: ListSpec = ListSpec {
    columns: "r.id, r.transaction_number, r.user_id, u.name AS user_name, \
              r.muzakki_id, m.name AS muzakki_name, r.period_id, p.name AS period_name, \
              r.type, r.amount, r.date_received, r.created_at, r.updated_at",
    from: "zakat_records r \
           JOIN users u ON u.id = r.user_id \
           JOIN muzakki m ON m.id = r.muzakki_id \
           JOIN zakat_periods p ON p.id = r.period_id",
    search_columns: &["r.transaction_number", "u.name", "m.name", "p.name"],
    sort_columns: &[
        ("transactionNumber", "r.transaction_number"),
        ("type", "r.type"),
        ("amount", "r.amount"),
        ("dateReceived", "r.date_received"),
        ("createdAt", "r.created_at"),
        ("updatedAt", "r.updated_at"),
        ("user.name", "u.name"),
        ("muzakki.name", "m.name"),
        ("period.name", "p.name"),
    ],
    default_order: "r.date_received DESC",
    id_column: "r.id",
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all_penerimaan).post(create_penerimaan))
        .route("/list", post(get_list_penerimaan))
        .route("/delete", post(delete_penerimaan))
        .route("/total-amount", get(total_amount))
        .route("/:id", get(get_penerimaan_by_id).put(update_penerimaan))
}

#[derive(Clone)]
struct ValidRecord {
    user_id: Uuid,
    muzakki_id: Uuid,
    period_id: Uuid,
    zakat_type: ZakatType,
    amount: Decimal,
    date_received: DateTime<Utc>,
}

// Petugas pencatat default ke user yang sedang login
async fn validate(
    db: &Database,
    session: &SessionUser,
    payload: ZakatRecordRequest,
) -> ApiResult<ValidRecord> {
    let user_id = payload.user_id.unwrap_or(session.id);
    let muzakki_id = payload
        .muzakki_id
        .ok_or_else(|| AppError::validation("Muzakki wajib dipilih"))?;
    let period_id = payload
        .period_id
        .ok_or_else(|| AppError::validation("Periode wajib dipilih"))?;
    let amount = positive_amount(payload.amount, "Jumlah harus lebih dari 0")?;

    ensure_exists(db, "users", user_id, "Kesalahan: Petugas tidak ditemukan").await?;
    ensure_exists(db, "muzakki", muzakki_id, "Kesalahan: Muzakki tidak ditemukan").await?;
    ensure_exists(db, "zakat_periods", period_id, "Kesalahan: Periode tidak ditemukan").await?;

    Ok(ValidRecord {
        user_id,
        muzakki_id,
        period_id,
        zakat_type: payload.zakat_type,
        amount,
        date_received: payload.date_received,
    })
}

async fn load(db: &Database, id: Uuid) -> ApiResult<ZakatRecord> {
    LIST.fetch_one::<ZakatRecord>(db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Kesalahan: Penerimaan Zakat tidak ditemukan"))
}

pub async fn get_list_penerimaan(
    State(db): State<Database>,
    ApiJson(input): ApiJson<ListInput>,
) -> ApiResult<Json<Value>> {
    let (rows, meta) = LIST.fetch_page::<ZakatRecord>(&db, &input, None).await?;
    Ok(success_list(rows, meta))
}

pub async fn get_all_penerimaan(State(db): State<Database>) -> ApiResult<Json<Value>> {
    let rows = LIST.fetch_all::<ZakatRecord>(&db).await?;
    Ok(success(rows))
}

pub async fn get_penerimaan_by_id(
    State(db): State<Database>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    Ok(success(load(&db, id).await?))
}

pub async fn create_penerimaan(
    State(db): State<Database>,
    Extension(session): Extension<SessionUser>,
    ApiJson(payload): ApiJson<ZakatRecordRequest>,
) -> ApiResult<Json<Value>> {
    let valid = validate(&db, &session, payload).await?;
    let id = Uuid::new_v4();

    insert_with_number(&db, TransactionKind::Record, |number| {
        let db = db.clone();
        let valid = valid.clone();
        async move {
            sqlx::query(
                "INSERT INTO zakat_records \
                 (id, transaction_number, user_id, muzakki_id, period_id, type, amount, date_received) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(id)
            .bind(&number)
            .bind(valid.user_id)
            .bind(valid.muzakki_id)
            .bind(valid.period_id)
            .bind(valid.zakat_type)
            .bind(valid.amount)
            .bind(valid.date_received)
            .execute(&db)
            .await?;
            Ok::<(), AppError>(())
        }
    })
    .await?;

    let record = load(&db, id).await?;
    tracing::info!(%id, number = %record.transaction_number, by = %session.username, "Zakat record created");
    Ok(success_with_message("Penerimaan zakat berhasil dibuat!", record))
}

pub async fn update_penerimaan(
    State(db): State<Database>,
    Extension(session): Extension<SessionUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ZakatRecordRequest>,
) -> ApiResult<Json<Value>> {
    let valid = validate(&db, &session, payload).await?;

    let mut tx = db.begin().await?;

    let result = sqlx::query(
        "UPDATE zakat_records SET user_id = $1, muzakki_id = $2, period_id = $3, type = $4, \
         amount = $5, date_received = $6, updated_at = NOW() WHERE id = $7",
    )
    .bind(valid.user_id)
    .bind(valid.muzakki_id)
    .bind(valid.period_id)
    .bind(valid.zakat_type)
    .bind(valid.amount)
    .bind(valid.date_received)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Kesalahan: Penerimaan Zakat tidak ditemukan"));
    }

    // Sinkronkan periode distribusi dengan periode penerimaan
    sqlx::query(
        "UPDATE zakat_distributions SET period_id = $1, updated_at = NOW() \
         WHERE zakat_record_id = $2 AND period_id <> $1",
    )
    .bind(valid.period_id)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(%id, "Zakat record updated");
    Ok(success_with_message(
        "Penerimaan zakat berhasil diupdate!",
        load(&db, id).await?,
    ))
}

pub async fn delete_penerimaan(
    State(db): State<Database>,
    ApiJson(ids): ApiJson<Vec<Uuid>>,
) -> ApiResult<Json<Value>> {
    if ids.is_empty() {
        return Err(AppError::validation("Kesalahan: Tidak ada data yang dipilih"));
    }

    let mut tx = db.begin().await?;

    let missing = missing_ids(&mut *tx, "zakat_records", &ids).await?;
    if !missing.is_empty() {
        return Err(AppError::not_found(format!(
            "Kesalahan: Penerimaan Zakat dengan id {} tidak ditemukan",
            join_ids(&missing)
        )));
    }

    let distributed: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM zakat_distributions WHERE zakat_record_id = ANY($1))",
    )
    .bind(&ids)
    .fetch_one(&mut *tx)
    .await?;

    if distributed {
        return Err(AppError::conflict(
            "Kesalahan: Data tidak bisa dihapus karena masih ada data distribusi zakat yang terkait",
        ));
    }

    sqlx::query("DELETE FROM zakat_records WHERE id = ANY($1)")
        .bind(&ids)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(count = ids.len(), "Zakat records deleted");
    Ok(success_with_message(
        "Penerimaan zakat berhasil dihapus!",
        Value::Null,
    ))
}

pub async fn total_amount(State(db): State<Database>) -> ApiResult<Json<Value>> {
    let total: Decimal = sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM zakat_records")
        .fetch_one(&db)
        .await?;
    Ok(success(total))
}
