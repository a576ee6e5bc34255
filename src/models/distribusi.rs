use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ZakatDistribution {
    pub id: Uuid,
    pub transaction_number: String,
    pub mustahik_id: Uuid,
    pub mustahik_name: String,
    pub zakat_record_id: Uuid,
    pub zakat_record_number: String,
    pub period_id: Uuid,
    pub period_name: String,
    pub amount: Decimal,
    pub date_distribution: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZakatDistributionRequest {
    pub mustahik_id: Option<Uuid>,
    pub zakat_record_id: Option<Uuid>,
    pub amount: Decimal,
    pub date_distribution: DateTime<Utc>,
}
