use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{ApiResult, AppError};

const AMOUNT_SCALE: u32 = 2;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Trims `value` and fails with `message` when nothing is left.
pub fn required_text(value: &str, message: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(message));
    }
    Ok(trimmed.to_string())
}

/// Empty input is stored as NULL.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn optional_email(value: Option<&str>) -> ApiResult<Option<String>> {
    match optional_text(value) {
        None => Ok(None),
        Some(email) if EMAIL.is_match(&email) => Ok(Some(email)),
        Some(_) => Err(AppError::validation("Email tidak valid")),
    }
}

/// Amounts are stored as `NUMERIC(18, 2)`; more decimals would be rounded
/// away on insert, so they are rejected here.
pub fn positive_amount(value: Decimal, message: &str) -> ApiResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(AppError::validation(message));
    }
    if value.normalize().scale() > AMOUNT_SCALE {
        return Err(AppError::validation(format!(
            "Kesalahan: Maksimal {AMOUNT_SCALE} angka di belakang koma"
        )));
    }
    Ok(value)
}

pub async fn exists(db: &Database, table: &'static str, id: Uuid) -> ApiResult<bool> {
    let exists: bool = sqlx::query_scalar(&format!(
        "SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1)"
    ))
    .bind(id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

/// Fails with a validation error when a referenced `id` is not a row of
/// `table`.
pub async fn ensure_exists(
    db: &Database,
    table: &'static str,
    id: Uuid,
    message: &str,
) -> ApiResult<()> {
    if !exists(db, table, id).await? {
        return Err(AppError::validation(message));
    }
    Ok(())
}

/// Returns the ids from `ids` that have no row in `table`, in input order.
pub async fn missing_ids<'c, E>(executor: E, table: &'static str, ids: &[Uuid]) -> ApiResult<Vec<Uuid>>
where
    E: sqlx::PgExecutor<'c>,
{
    let found: Vec<Uuid> = sqlx::query_scalar(&format!("SELECT id FROM {table} WHERE id = ANY($1)"))
        .bind(ids)
        .fetch_all(executor)
        .await?;
    Ok(ids.iter().filter(|id| !found.contains(id)).copied().collect())
}

pub fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("  Ahmad ", "x").unwrap(), "Ahmad");
        let err = required_text("   ", "Nama wajib diisi").unwrap_err();
        assert_eq!(err.to_string(), "Nama wajib diisi");
    }

    #[test]
    fn empty_email_becomes_none() {
        assert_eq!(optional_email(Some("")).unwrap(), None);
        assert_eq!(optional_email(None).unwrap(), None);
    }

    #[test]
    fn well_formed_email_is_kept() {
        assert_eq!(
            optional_email(Some(" budi@masjid.or.id ")).unwrap().as_deref(),
            Some("budi@masjid.or.id")
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        for bad in ["budi", "budi@", "@masjid.id", "budi@masjid", "bu di@masjid.id"] {
            let err = optional_email(Some(bad)).unwrap_err();
            assert_eq!(err.to_string(), "Email tidak valid", "{bad}");
        }
    }

    #[test]
    fn amounts_must_be_positive() {
        assert!(positive_amount(Decimal::new(25, 1), "x").is_ok());
        assert!(positive_amount(Decimal::ZERO, "x").is_err());
        assert!(positive_amount(Decimal::new(-1, 0), "x").is_err());
    }

    #[test]
    fn amounts_keep_at_most_two_decimals() {
        assert!(positive_amount(Decimal::new(1250, 2), "x").is_ok());
        assert!(positive_amount(Decimal::new(25000, 4), "x").is_ok());

        for value in [Decimal::new(1, 3), Decimal::new(2375, 3)] {
            let err = positive_amount(value, "x").unwrap_err();
            assert_eq!(err.to_string(), "Kesalahan: Maksimal 2 angka di belakang koma");
        }
    }

    #[test]
    fn joins_ids_with_commas() {
        let a = Uuid::nil();
        let b = Uuid::new_v4();
        assert_eq!(join_ids(&[a, b]), format!("{a}, {b}"));
    }
}
