//! Transaction numbers for receipts (`ZKT`) and distributions (`DST`).
//!
//! Format: prefix + `YYMMDD` + three random digits, e.g. `ZKT241016042`.
//! Candidates are checked against the table before use, and the column is
//! `UNIQUE`, so an insert that still collides is retried with a new number.

use std::future::Future;

use chrono::{Local, NaiveDate};
use rand::Rng;

use crate::database::Database;
use crate::error::{ApiResult, AppError};

const MAX_ATTEMPTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Record,
    Distribution,
}

impl TransactionKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Record => "ZKT",
            Self::Distribution => "DST",
        }
    }

    fn table(self) -> &'static str {
        match self {
            Self::Record => "zakat_records",
            Self::Distribution => "zakat_distributions",
        }
    }
}

pub fn format_number(kind: TransactionKind, date: NaiveDate, suffix: u16) -> String {
    format!("{}{}{:03}", kind.prefix(), date.format("%y%m%d"), suffix % 1000)
}

pub fn random_number(kind: TransactionKind, date: NaiveDate) -> String {
    let suffix = rand::thread_rng().gen_range(0..1000);
    format_number(kind, date, suffix)
}

/// Picks a number for today that no existing row uses yet.
pub async fn next_available(db: &Database, kind: TransactionKind) -> ApiResult<String> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE transaction_number = $1)",
        kind.table()
    );
    let today = Local::now().date_naive();

    for _ in 0..MAX_ATTEMPTS {
        let candidate = random_number(kind, today);
        let taken: bool = sqlx::query_scalar(&sql)
            .bind(&candidate)
            .fetch_one(db)
            .await?;
        if !taken {
            return Ok(candidate);
        }
        tracing::debug!(%candidate, "Transaction number already used, retrying");
    }

    Err(exhausted())
}

/// Runs `insert` with a fresh number, retrying when the insert loses a race
/// on the unique constraint.
pub async fn insert_with_number<T, F, Fut>(
    db: &Database,
    kind: TransactionKind,
    mut insert: F,
) -> ApiResult<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    for _ in 0..MAX_ATTEMPTS {
        let number = next_available(db, kind).await?;
        match insert(number).await {
            Err(err) if err.is_unique_violation() => {
                tracing::warn!(?kind, "Transaction number collided on insert, retrying");
            }
            other => return other,
        }
    }
    Err(exhausted())
}

fn exhausted() -> AppError {
    AppError::conflict("Kesalahan: Gagal membuat nomor transaksi, silakan coba lagi")
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::*;

    #[test]
    fn formats_prefix_date_and_padded_suffix() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_number(TransactionKind::Record, date, 5), "ZKT240307005");
        assert_eq!(format_number(TransactionKind::Distribution, date, 999), "DST240307999");
    }

    #[test]
    fn random_numbers_match_the_pattern() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let record = Regex::new(r"^ZKT251231\d{3}$").unwrap();
        let distribution = Regex::new(r"^DST251231\d{3}$").unwrap();
        for _ in 0..200 {
            assert!(record.is_match(&random_number(TransactionKind::Record, date)));
            assert!(distribution.is_match(&random_number(TransactionKind::Distribution, date)));
        }
    }
}
