use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A muzakki (donor) or mustahik (recipient) joined with its category.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Pihak {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PihakRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "muzakkiCategoryId", alias = "mustahikCategoryId")]
    pub category_id: Option<Uuid>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub address: String,
}
