use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::ZakatType;

/// A zakat receipt with the names of its recorder, donor and period.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ZakatRecord {
    pub id: Uuid,
    pub transaction_number: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub muzakki_id: Uuid,
    pub muzakki_name: String,
    pub period_id: Uuid,
    pub period_name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub zakat_type: ZakatType,
    pub amount: Decimal,
    pub date_received: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZakatRecordRequest {
    pub user_id: Option<Uuid>,
    pub muzakki_id: Option<Uuid>,
    pub period_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub zakat_type: ZakatType,
    pub amount: Decimal,
    pub date_received: DateTime<Utc>,
}
