use axum::{
    extract::State,
    response::Json,
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::Database;
use crate::error::{ApiResult, AppError};
use crate::extract::ApiPath;
use crate::models::statistik::{DashboardSummary, PeriodStatistic};
use crate::routes::success;
use crate::validation::exists;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/period/:id", get(get_statistik_periode))
        .route("/dashboard", get(get_dashboard_data))
}

async fn sum_for_period(db: &Database, table: &'static str, period_id: Uuid) -> ApiResult<Decimal> {
    let total: Decimal = sqlx::query_scalar(&format!(
        "SELECT COALESCE(SUM(amount), 0) FROM {table} WHERE period_id = $1"
    ))
    .bind(period_id)
    .fetch_one(db)
    .await?;
    Ok(total)
}

pub fn period_statistics(penerimaan: Decimal, distribusi: Decimal) -> Vec<PeriodStatistic> {
    vec![
        PeriodStatistic {
            zakat: "Penerimaan",
            amount: penerimaan,
        },
        PeriodStatistic {
            zakat: "Distribusi",
            amount: distribusi,
        },
    ]
}

// Penerimaan vs distribusi dalam satu periode
pub async fn get_statistik_periode(
    State(db): State<Database>,
    ApiPath(period_id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    if !exists(&db, "zakat_periods", period_id).await? {
        return Err(AppError::not_found("Kesalahan: Periode tidak ditemukan"));
    }

    let penerimaan = sum_for_period(&db, "zakat_records", period_id).await?;
    let distribusi = sum_for_period(&db, "zakat_distributions", period_id).await?;

    Ok(success(period_statistics(penerimaan, distribusi)))
}

pub async fn get_dashboard_data(State(db): State<Database>) -> ApiResult<Json<Value>> {
    let total_muzakki: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM muzakki")
        .fetch_one(&db)
        .await?;
    let total_mustahik: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mustahik")
        .fetch_one(&db)
        .await?;
    let total_penerimaan: Decimal =
        sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM zakat_records")
            .fetch_one(&db)
            .await?;
    let total_distribusi: Decimal =
        sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM zakat_distributions")
            .fetch_one(&db)
            .await?;

    Ok(success(DashboardSummary {
        total_muzakki,
        total_mustahik,
        total_penerimaan,
        total_distribusi,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_statistics_lists_receipts_before_distributions() {
        let stats = period_statistics(Decimal::new(1500, 0), Decimal::ZERO);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].zakat, "Penerimaan");
        assert_eq!(stats[0].amount, Decimal::new(1500, 0));
        assert_eq!(stats[1].zakat, "Distribusi");
        assert_eq!(stats[1].amount, Decimal::ZERO);
    }
}
